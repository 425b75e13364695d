//! # Sales Gateway
//!
//! The async boundary between the register and the remote sales/till
//! service. Everything behind this trait (transport, authentication,
//! request timeouts, retry policy) is out of scope for this workspace;
//! the register only interprets the classified results.
//!
//! ## Boundary Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SalesGateway                                     │
//! │                                                                         │
//! │  submit_sale(request)          → SaleConfirmation   | SubmitFailure     │
//! │  open_session(float)           → OpenedSession      | GatewayError      │
//! │  session_status()              → Option<Snapshot>   | GatewayError      │
//! │  register_movement(id, mvmt)   → ()                 | GatewayError      │
//! │  close_session(id, counted)    → cash sales total   | GatewayError      │
//! │                                                                         │
//! │  The register performs NO retries through this trait; a failed call    │
//! │  surfaces to the operator with its classification intact.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use thiserror::Error;

use mostrador_core::{CashMovement, CheckoutRequest, SaleConfirmation, SubmitFailure};

// =============================================================================
// Gateway Error
// =============================================================================

/// Failure of a till-side gateway call.
///
/// Distinct from [`SubmitFailure`]: sale submission carries its own
/// richer taxonomy (stock, payment degradation); till calls only
/// distinguish "service unreachable" from "request rejected".
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// The service could not be reached or timed out.
    #[error("Sales service unavailable: {0}")]
    Unavailable(String),

    /// The service answered with a rejection.
    #[error("Request rejected by sales service: {0}")]
    Rejected(String),
}

// =============================================================================
// Gateway DTOs
// =============================================================================

/// Server-issued fields of a newly opened cash session.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenedSession {
    pub session_id: String,
    pub opened_at: DateTime<Utc>,
    pub opening_float_cents: i64,
}

/// The full state of an open session as the service reports it:
/// the open-time fields plus every movement registered so far.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub opened: OpenedSession,
    pub movements: Vec<CashMovement>,
}

// =============================================================================
// Trait
// =============================================================================

/// The remote sales/till service as seen by the register.
#[allow(async_fn_in_trait)]
pub trait SalesGateway {
    /// Submits a validated sale. On success the transaction is committed
    /// upstream (stock decrement and cash ledger included).
    async fn submit_sale(
        &self,
        request: &CheckoutRequest,
    ) -> Result<SaleConfirmation, SubmitFailure>;

    /// Opens a drawer session with the given float. The service
    /// serializes concurrent opens for the same drawer; a second open
    /// attempt is rejected there as well as locally.
    async fn open_session(&self, opening_float_cents: i64) -> Result<OpenedSession, GatewayError>;

    /// Queries whether a session is currently open for this drawer,
    /// returning its full state when one is. Called at terminal startup
    /// so the register can mirror a session it did not open itself.
    async fn session_status(&self) -> Result<Option<SessionSnapshot>, GatewayError>;

    /// Records a manual cash movement against an open session.
    async fn register_movement(
        &self,
        session_id: &str,
        movement: &CashMovement,
    ) -> Result<(), GatewayError>;

    /// Closes the session upstream and returns the session's cash sales
    /// total from the sales ledger, which feeds the local reconciliation.
    async fn close_session(
        &self,
        session_id: &str,
        counted_cents: i64,
    ) -> Result<i64, GatewayError>;
}
