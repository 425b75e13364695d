//! # Register Error Type
//!
//! Unified error type for register operations, with machine-readable
//! codes for the frontend.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Error Flow in Mostrador POS                         │
//! │                                                                         │
//! │  mostrador-core                      mostrador-register                 │
//! │  ──────────────                      ──────────────────                 │
//! │  CoreError (cart/checkout) ────┐                                        │
//! │  TillError (session machine) ──┼──► RegisterError ──► code() ──► UI     │
//! │  SubmitFailure (sales svc) ────┤        │                               │
//! │  GatewayError (till svc) ──────┘        │                               │
//! │                                         ▼                               │
//! │          { code: "PAYMENT_UNAVAILABLE", message: "..." }                │
//! │                                                                         │
//! │  The code is what the frontend switches on: PAYMENT_UNAVAILABLE        │
//! │  offers the cash fallback, INSUFFICIENT_STOCK highlights the line,     │
//! │  SESSION_REQUIRED routes to the till screen.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

use mostrador_core::{CoreError, SubmitFailure, TillError, ValidationError};

use crate::gateway::GatewayError;

// =============================================================================
// Register Error
// =============================================================================

/// Any failure surfaced by a register operation.
#[derive(Debug, Error)]
pub enum RegisterError {
    /// Cart or checkout precondition failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Cash session state machine violation.
    #[error(transparent)]
    Till(#[from] TillError),

    /// Selling is gated on an open session; this is a blocking
    /// precondition, never a soft warning.
    #[error("No open cash session; open the till before selling")]
    SessionRequired,

    /// Classified failure from sale submission.
    #[error(transparent)]
    Submit(#[from] SubmitFailure),

    /// Till-side gateway failure.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Machine-readable error codes for the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Operator input rejected before anything changed (400-ish)
    ValidationError,

    /// Cart rule violation (line not found, weighed line +/- ...)
    CartError,

    /// Cash tendered does not cover the total
    InsufficientTender,

    /// Session state machine violation (double open, close while closed)
    TillError,

    /// Selling attempted with no open session
    SessionRequired,

    /// Another terminal sold the stock first; fix the cart and resubmit
    InsufficientStock,

    /// Payment subsystem degraded; offer the cash fallback
    PaymentUnavailable,

    /// Unrecoverable submission or gateway failure
    ServiceError,
}

impl RegisterError {
    /// Maps the error onto the code the frontend switches on.
    pub fn code(&self) -> ErrorCode {
        match self {
            RegisterError::Core(CoreError::Validation(_)) => ErrorCode::ValidationError,
            RegisterError::Core(CoreError::InsufficientTender { .. }) => {
                ErrorCode::InsufficientTender
            }
            RegisterError::Core(_) => ErrorCode::CartError,
            RegisterError::Till(TillError::Validation(_)) => ErrorCode::ValidationError,
            RegisterError::Till(_) => ErrorCode::TillError,
            RegisterError::SessionRequired => ErrorCode::SessionRequired,
            RegisterError::Submit(SubmitFailure::InsufficientStock { .. }) => {
                ErrorCode::InsufficientStock
            }
            RegisterError::Submit(SubmitFailure::PaymentUnavailable) => {
                ErrorCode::PaymentUnavailable
            }
            RegisterError::Submit(SubmitFailure::Validation(_)) => ErrorCode::ValidationError,
            RegisterError::Submit(SubmitFailure::Other(_)) => ErrorCode::ServiceError,
            RegisterError::Gateway(_) => ErrorCode::ServiceError,
        }
    }

    /// Checks if the operator may force cash and resubmit this checkout.
    pub fn cash_fallback_available(&self) -> bool {
        matches!(
            self,
            RegisterError::Submit(failure) if failure.cash_fallback_available()
        )
    }
}

impl From<ValidationError> for RegisterError {
    fn from(err: ValidationError) -> Self {
        RegisterError::Core(CoreError::Validation(err))
    }
}

/// Convenience type alias for register operations.
pub type RegisterResult<T> = Result<T, RegisterError>;

// =============================================================================
// Unit Tests
// =============================================================================
