//! # Till Module
//!
//! Cash session state machine and reconciliation calculator.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cash Session Lifecycle                             │
//! │                                                                         │
//! │            open(float > 0)              close(counted ≥ 0)              │
//! │  (no session) ──────────► OPEN ────────────────────────► CLOSED         │
//! │                            │  ▲                           (terminal)    │
//! │                            │  │                                         │
//! │                            ▼  │                                         │
//! │                   register_movement(kind, amount > 0, reason)           │
//! │                                                                         │
//! │  • A CLOSED session is immutable; reopening means a NEW session         │
//! │  • Selling is gated on OPEN (enforced by the register crate)           │
//! │  • close() always succeeds when its preconditions hold: variance is    │
//! │    a reported business fact, never a failure                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Reconciliation
//! ```text
//! expected = opening_float + Σ income − Σ expense + cash_sales_total
//! variance = counted − expected
//!
//! variance == 0 → Balanced    variance > 0 → Surplus    variance < 0 → Shortage
//! ```
//! `cash_sales_total` comes from the external sales ledger; this core only
//! combines it with the manual-movement subtotal it owns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{TillError, TillResult, ValidationError};
use crate::validation::{
    validate_counted_amount, validate_movement_amount, validate_movement_reason,
    validate_opening_float,
};

// =============================================================================
// Movements
// =============================================================================

/// Direction of a manual cash movement.
///
/// Wire names follow the till-service contract (`"INCOME"` / `"EXPENSE"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    /// Cash put into the drawer outside a sale (e.g., change replenishment).
    Income,
    /// Cash taken out of the drawer (e.g., paying a supplier).
    Expense,
}

/// A manual cash movement inside an open session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CashMovement {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub kind: MovementKind,

    /// Always positive; direction lives in `kind`.
    pub amount_cents: i64,

    /// Operator-entered justification (auditors read these).
    pub reason: String,

    #[ts(as = "String")]
    pub occurred_at: DateTime<Utc>,
}

// =============================================================================
// Session Status & Verdict
// =============================================================================

/// Whether the drawer is accepting activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Open,
    Closed,
}

/// Classification of the close variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Counted exactly matches expected.
    Balanced,
    /// More cash in the drawer than expected.
    Surplus,
    /// Less cash in the drawer than expected.
    Shortage,
}

impl Verdict {
    /// Classifies a variance figure.
    pub const fn from_variance(variance_cents: i64) -> Self {
        if variance_cents == 0 {
            Verdict::Balanced
        } else if variance_cents > 0 {
            Verdict::Surplus
        } else {
            Verdict::Shortage
        }
    }
}

// =============================================================================
// Reconciliation
// =============================================================================

/// The close report: expected vs counted, with the subtotals that fed it.
///
/// Reporting only; nothing here adjusts records. Alerting and audit
/// trails on large shortages are an external concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    pub session_id: String,
    pub opening_float_cents: i64,
    pub income_cents: i64,
    pub expense_cents: i64,
    /// Supplied by the external sales ledger at close time.
    pub cash_sales_cents: i64,
    pub expected_cents: i64,
    pub counted_cents: i64,
    /// `counted − expected`; positive = surplus, negative = shortage.
    pub variance_cents: i64,
    pub verdict: Verdict,
    #[ts(as = "String")]
    pub closed_at: DateTime<Utc>,
}

/// Running figures for an open session, for the pre-close screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TillPreview {
    pub session_id: String,
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,
    pub opening_float_cents: i64,
    pub income_cents: i64,
    pub expense_cents: i64,
    /// Expected cash BEFORE adding cash sales (the ledger figure arrives
    /// only at close).
    pub expected_before_sales_cents: i64,
    pub movement_count: usize,
}

// =============================================================================
// Cash Session
// =============================================================================

/// One open-to-close bracket of drawer activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashSession {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub opened_at: DateTime<Utc>,

    /// The float the drawer opened with; always positive.
    pub opening_float_cents: i64,

    /// Manual movements in registration order.
    pub movements: Vec<CashMovement>,

    pub status: SessionStatus,
}

impl CashSession {
    /// Opens a new session with the given float.
    ///
    /// The "at most one open session per drawer" invariant is enforced by
    /// the owner of the session slot (the register), not here: this is a
    /// constructor, it cannot see its siblings.
    pub fn open(opening_float_cents: i64) -> TillResult<Self> {
        validate_opening_float(opening_float_cents)?;

        Ok(CashSession {
            id: Uuid::new_v4().to_string(),
            opened_at: Utc::now(),
            opening_float_cents,
            movements: Vec::new(),
            status: SessionStatus::Open,
        })
    }

    /// Reconstructs a session from server-issued fields (status query /
    /// open response), so the register mirrors what the service created.
    pub fn from_parts(
        id: impl Into<String>,
        opened_at: DateTime<Utc>,
        opening_float_cents: i64,
        movements: Vec<CashMovement>,
    ) -> TillResult<Self> {
        validate_opening_float(opening_float_cents)?;

        Ok(CashSession {
            id: id.into(),
            opened_at,
            opening_float_cents,
            movements,
            status: SessionStatus::Open,
        })
    }

    /// Checks if the session accepts activity.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }

    /// Registers a manual movement while the session is open.
    pub fn register_movement(
        &mut self,
        kind: MovementKind,
        amount_cents: i64,
        reason: &str,
    ) -> TillResult<CashMovement> {
        if !self.is_open() {
            return Err(TillError::NotOpen);
        }
        validate_movement_amount(amount_cents)?;
        validate_movement_reason(reason)?;

        let movement = CashMovement {
            id: Uuid::new_v4().to_string(),
            kind,
            amount_cents,
            reason: reason.trim().to_string(),
            occurred_at: Utc::now(),
        };
        self.movements.push(movement.clone());
        Ok(movement)
    }

    /// Removes a movement by id; the undo half of the register's
    /// two-phase commit when the till service rejects a movement.
    pub fn retract_movement(&mut self, movement_id: &str) -> TillResult<()> {
        if !self.is_open() {
            return Err(TillError::NotOpen);
        }
        self.movements.retain(|m| m.id != movement_id);
        Ok(())
    }

    /// Sum of INCOME movements.
    pub fn income_cents(&self) -> i64 {
        self.movements
            .iter()
            .filter(|m| m.kind == MovementKind::Income)
            .map(|m| m.amount_cents)
            .sum()
    }

    /// Sum of EXPENSE movements.
    pub fn expense_cents(&self) -> i64 {
        self.movements
            .iter()
            .filter(|m| m.kind == MovementKind::Expense)
            .map(|m| m.amount_cents)
            .sum()
    }

    /// Expected cash excluding sales: `float + Σ income − Σ expense`.
    pub fn expected_before_sales_cents(&self) -> i64 {
        self.opening_float_cents + self.income_cents() - self.expense_cents()
    }

    /// Running figures for the pre-close screen.
    pub fn preview(&self) -> TillPreview {
        TillPreview {
            session_id: self.id.clone(),
            opened_at: self.opened_at,
            opening_float_cents: self.opening_float_cents,
            income_cents: self.income_cents(),
            expense_cents: self.expense_cents(),
            expected_before_sales_cents: self.expected_before_sales_cents(),
            movement_count: self.movements.len(),
        }
    }

    /// Closes the session and computes the reconciliation.
    ///
    /// `cash_sales_cents` is the session's cash sales total from the
    /// external ledger. Closing happens exactly once; afterwards the
    /// session is immutable and every mutating call returns `NotOpen`.
    pub fn close(
        &mut self,
        counted_cents: i64,
        cash_sales_cents: i64,
    ) -> TillResult<Reconciliation> {
        if !self.is_open() {
            return Err(TillError::NotOpen);
        }
        validate_counted_amount(counted_cents)?;
        if cash_sales_cents < 0 {
            return Err(TillError::Validation(ValidationError::MustBeNonNegative {
                field: "cash sales total".to_string(),
            }));
        }

        let income_cents = self.income_cents();
        let expense_cents = self.expense_cents();
        let expected_cents = self.expected_before_sales_cents() + cash_sales_cents;
        let variance_cents = counted_cents - expected_cents;

        self.status = SessionStatus::Closed;

        Ok(Reconciliation {
            session_id: self.id.clone(),
            opening_float_cents: self.opening_float_cents,
            income_cents,
            expense_cents,
            cash_sales_cents,
            expected_cents,
            counted_cents,
            variance_cents,
            verdict: Verdict::from_variance(variance_cents),
            closed_at: Utc::now(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// float 1000, +200 income, −50 expense, 300 cash sales → expected 1450
    fn session_with_movements() -> CashSession {
        let mut session = CashSession::open(1000).unwrap();
        session
            .register_movement(MovementKind::Income, 200, "change replenishment")
            .unwrap();
        session
            .register_movement(MovementKind::Expense, 50, "courier tip")
            .unwrap();
        session
    }

    #[test]
    fn test_open_requires_positive_float() {
        assert!(CashSession::open(1).is_ok());
        assert!(CashSession::open(0).is_err());
        assert!(CashSession::open(-100).is_err());
    }

    #[test]
    fn test_open_session_starts_empty() {
        let session = CashSession::open(1000).unwrap();
        assert!(session.is_open());
        assert!(session.movements.is_empty());
        assert_eq!(session.expected_before_sales_cents(), 1000);
    }

    #[test]
    fn test_movement_sums() {
        let session = session_with_movements();
        assert_eq!(session.income_cents(), 200);
        assert_eq!(session.expense_cents(), 50);
        assert_eq!(session.expected_before_sales_cents(), 1150);
    }

    #[test]
    fn test_movement_requires_positive_amount_and_reason() {
        let mut session = CashSession::open(1000).unwrap();
        assert!(session
            .register_movement(MovementKind::Income, 0, "valid reason")
            .is_err());
        assert!(session
            .register_movement(MovementKind::Income, -5, "valid reason")
            .is_err());
        assert!(session.register_movement(MovementKind::Income, 100, "").is_err());
        assert!(session.movements.is_empty());
    }

    #[test]
    fn test_reconciliation_balanced() {
        let mut session = session_with_movements();
        let result = session.close(1450, 300).unwrap();

        assert_eq!(result.expected_cents, 1450);
        assert_eq!(result.variance_cents, 0);
        assert_eq!(result.verdict, Verdict::Balanced);
        assert_eq!(result.income_cents, 200);
        assert_eq!(result.expense_cents, 50);
        assert_eq!(result.cash_sales_cents, 300);
        assert!(!session.is_open());
    }

    #[test]
    fn test_reconciliation_shortage() {
        let mut session = session_with_movements();
        let result = session.close(1400, 300).unwrap();
        assert_eq!(result.variance_cents, -50);
        assert_eq!(result.verdict, Verdict::Shortage);
    }

    #[test]
    fn test_reconciliation_surplus() {
        let mut session = session_with_movements();
        let result = session.close(1500, 300).unwrap();
        assert_eq!(result.variance_cents, 50);
        assert_eq!(result.verdict, Verdict::Surplus);
    }

    #[test]
    fn test_large_shortage_is_not_an_error() {
        let mut session = CashSession::open(100_000).unwrap();
        let result = session.close(0, 0).unwrap();
        assert_eq!(result.variance_cents, -100_000);
        assert_eq!(result.verdict, Verdict::Shortage);
    }

    #[test]
    fn test_close_rejects_negative_count_and_stays_open() {
        let mut session = CashSession::open(1000).unwrap();
        assert!(session.close(-1, 0).is_err());
        assert!(session.is_open());
    }

    #[test]
    fn test_closed_session_is_immutable() {
        let mut session = CashSession::open(1000).unwrap();
        session.close(1000, 0).unwrap();

        assert!(matches!(session.close(1000, 0), Err(TillError::NotOpen)));
        assert!(matches!(
            session.register_movement(MovementKind::Income, 100, "too late"),
            Err(TillError::NotOpen)
        ));
        assert!(matches!(session.retract_movement("any"), Err(TillError::NotOpen)));
    }

    #[test]
    fn test_retract_movement() {
        let mut session = CashSession::open(1000).unwrap();
        let movement = session
            .register_movement(MovementKind::Expense, 300, "supplier cash payment")
            .unwrap();
        assert_eq!(session.expense_cents(), 300);

        session.retract_movement(&movement.id).unwrap();
        assert_eq!(session.expense_cents(), 0);
        assert!(session.movements.is_empty());
    }

    #[test]
    fn test_preview() {
        let session = session_with_movements();
        let preview = session.preview();
        assert_eq!(preview.session_id, session.id);
        assert_eq!(preview.opening_float_cents, 1000);
        assert_eq!(preview.income_cents, 200);
        assert_eq!(preview.expense_cents, 50);
        assert_eq!(preview.expected_before_sales_cents, 1150);
        assert_eq!(preview.movement_count, 2);
    }

    #[test]
    fn test_verdict_classification() {
        assert_eq!(Verdict::from_variance(0), Verdict::Balanced);
        assert_eq!(Verdict::from_variance(1), Verdict::Surplus);
        assert_eq!(Verdict::from_variance(-1), Verdict::Shortage);
    }
}
