//! # Validation Module
//!
//! Input validation utilities for Mostrador POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend                                                     │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate operator feedback                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (before any mutation or gateway call)            │
//! │  ├── Positive quantities/weights/amounts                               │
//! │  └── Rejecting here means NOTHING changed: no cart edit, no request    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Sales service (out of scope)                                 │
//! │  └── Stock checks, server-side constraints                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::Weight;
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit quantity for plain/variant cart lines.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
pub fn validate_unit_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an entered weight.
///
/// ## Rules
/// - Must be strictly positive; `w <= 0` is not addable
pub fn validate_weight(weight: Weight) -> ValidationResult<()> {
    if !weight.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "weight".to_string(),
        });
    }

    Ok(())
}

/// Validates a manual cash movement amount.
///
/// ## Rules
/// - Must be positive (> 0); direction is carried by the movement kind,
///   never by a signed amount
pub fn validate_movement_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

/// Validates the opening float for a cash session.
///
/// ## Rules
/// - Must be positive (> 0); a drawer never opens empty
pub fn validate_opening_float(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "opening float".to_string(),
        });
    }

    Ok(())
}

/// Validates the physically counted amount at session close.
///
/// ## Rules
/// - Must be zero or greater; an empty drawer is a legitimate count
pub fn validate_counted_amount(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "counted amount".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates the reason attached to a manual cash movement.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 3 and 255 characters (auditors read these)
pub fn validate_movement_reason(reason: &str) -> ValidationResult<()> {
    let reason = reason.trim();

    if reason.is_empty() {
        return Err(ValidationError::Required {
            field: "reason".to_string(),
        });
    }

    // Characters, not bytes: accented input must not shift the limits
    let length = reason.chars().count();

    if length < 3 {
        return Err(ValidationError::TooShort {
            field: "reason".to_string(),
            min: 3,
        });
    }

    if length > 255 {
        return Err(ValidationError::TooLong {
            field: "reason".to_string(),
            max: 255,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
