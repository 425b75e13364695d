//! # Error Types
//!
//! Domain-specific error types for mostrador-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  mostrador-core errors (this file)                                      │
//! │  ├── CoreError        - Cart and checkout precondition failures         │
//! │  ├── TillError        - Cash session state machine violations           │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  mostrador-register errors (separate crate)                             │
//! │  └── RegisterError    - Adds gateway failures + session gating          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError/TillError → RegisterError → UI       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (line id, amounts, etc.)
//! 3. Errors are enum variants, never String
//! 4. Input validation errors are rejected before any mutation happens

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart and checkout business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Cart line cannot be found by its id.
    #[error("Cart line not found: {0}")]
    LineNotFound(String),

    /// A weighed line's quantity was targeted by unit +/- controls.
    ///
    /// ## When This Occurs
    /// Weighed lines hold a scale reading, not a unit count. The only way
    /// to change one is to re-enter the full weight.
    #[error("Line {line_id} is sold by weight; re-enter the weight instead of adjusting units")]
    WeighedLineQuantity { line_id: String },

    /// The add request does not match the product's pricing mode
    /// (e.g., a weight entry for a plain product).
    #[error("Add request does not match pricing mode of product {product_id}")]
    PricingModeMismatch { product_id: String },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Checkout was attempted on an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cash tendered does not cover the cart total.
    ///
    /// ## User Workflow
    /// ```text
    /// Total $15.00, operator keys in $10.00
    ///      │
    ///      ▼
    /// InsufficientTender { total_cents: 1500, tendered_cents: 1000 }
    ///      │
    ///      ▼
    /// Confirm button stays disabled; amount is never clamped upward
    /// ```
    #[error("Tendered {tendered_cents} does not cover total {total_cents}")]
    InsufficientTender { total_cents: i64, tendered_cents: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Till Error
// =============================================================================

/// Cash session state machine violations.
///
/// These are precondition failures, distinct from business facts: a large
/// shortage at close is NOT an error, closing a session twice is.
#[derive(Debug, Error)]
pub enum TillError {
    /// A session is already open for this drawer/operator.
    #[error("A cash session is already open (id: {session_id}); close it before opening another")]
    AlreadyOpen { session_id: String },

    /// No open session exists for the requested operation.
    #[error("No open cash session; open the till first")]
    NotOpen,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Convenience type alias for Results with TillError.
pub type TillResult<T> = Result<T, TillError>;

// =============================================================================
// Unit Tests
// =============================================================================
