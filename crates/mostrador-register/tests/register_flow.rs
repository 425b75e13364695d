//! End-to-end register scenarios against a scripted in-memory gateway:
//! a full trading day, the cash fallback when the payment subsystem is
//! down, and the two-phase movement rollback.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::Notify;

use mostrador_core::{
    AddToCart, CashMovement, CheckoutRequest, MovementKind, PaymentMethod, PricingMode, Product,
    SaleConfirmation, SubmitFailure, TillError, Verdict, Weight,
};
use mostrador_register::{
    ErrorCode, GatewayError, OpenedSession, Register, RegisterError, SalesGateway, SelectionFlow,
    SessionSnapshot,
};

// =============================================================================
// Mock Gateway
// =============================================================================

/// In-memory sales/till service.
///
/// Sale submissions succeed by default; failures are scripted by pushing
/// onto `submit_failures` and are consumed one per call. Successful CASH
/// sales accumulate into a ledger that `close_session` reports back,
/// mirroring how the real service feeds reconciliation.
#[derive(Default)]
struct MockGateway {
    submit_failures: Mutex<VecDeque<SubmitFailure>>,
    submitted: Mutex<Vec<CheckoutRequest>>,
    cash_ledger: Mutex<i64>,
    reject_movements: Mutex<bool>,
    open_snapshot: Mutex<Option<SessionSnapshot>>,
}

impl MockGateway {
    fn new() -> Self {
        Self::default()
    }

    fn script_failure(&self, failure: SubmitFailure) {
        self.submit_failures.lock().unwrap().push_back(failure);
    }

    fn reject_movements(&self) {
        *self.reject_movements.lock().unwrap() = true;
    }

    fn report_open_session(&self, snapshot: SessionSnapshot) {
        *self.open_snapshot.lock().unwrap() = Some(snapshot);
    }

    fn submitted(&self) -> Vec<CheckoutRequest> {
        self.submitted.lock().unwrap().clone()
    }

    fn request_total_cents(request: &CheckoutRequest) -> i64 {
        request
            .items
            .iter()
            .map(|item| (item.quantity * item.unit_price_cents as f64).round() as i64)
            .sum()
    }
}

impl SalesGateway for MockGateway {
    async fn submit_sale(
        &self,
        request: &CheckoutRequest,
    ) -> Result<SaleConfirmation, SubmitFailure> {
        self.submitted.lock().unwrap().push(request.clone());

        if let Some(failure) = self.submit_failures.lock().unwrap().pop_front() {
            return Err(failure);
        }

        let total_cents = Self::request_total_cents(request);
        if request.payment_method.is_cash() {
            *self.cash_ledger.lock().unwrap() += total_cents;
        }
        Ok(SaleConfirmation {
            sale_id: format!("sale-{}", self.submitted.lock().unwrap().len()),
            total_cents,
        })
    }

    async fn open_session(&self, opening_float_cents: i64) -> Result<OpenedSession, GatewayError> {
        Ok(OpenedSession {
            session_id: "session-1".to_string(),
            opened_at: Utc::now(),
            opening_float_cents,
        })
    }

    async fn session_status(&self) -> Result<Option<SessionSnapshot>, GatewayError> {
        Ok(self.open_snapshot.lock().unwrap().clone())
    }

    async fn register_movement(
        &self,
        _session_id: &str,
        _movement: &CashMovement,
    ) -> Result<(), GatewayError> {
        if *self.reject_movements.lock().unwrap() {
            return Err(GatewayError::Rejected("movement refused".to_string()));
        }
        Ok(())
    }

    async fn close_session(
        &self,
        _session_id: &str,
        _counted_cents: i64,
    ) -> Result<i64, GatewayError> {
        Ok(*self.cash_ledger.lock().unwrap())
    }
}

/// Gateway whose first `open_session` parks until released, so a test
/// can land a second open while the first is still in flight.
#[derive(Default)]
struct GatedGateway {
    entered: Notify,
    gate: Notify,
    first_open_parks: Mutex<bool>,
    opens: Mutex<u32>,
}

impl GatedGateway {
    fn new() -> Self {
        GatedGateway {
            first_open_parks: Mutex::new(true),
            ..Default::default()
        }
    }
}

impl SalesGateway for GatedGateway {
    async fn submit_sale(
        &self,
        _request: &CheckoutRequest,
    ) -> Result<SaleConfirmation, SubmitFailure> {
        Err(SubmitFailure::Other("not under test".to_string()))
    }

    async fn open_session(&self, opening_float_cents: i64) -> Result<OpenedSession, GatewayError> {
        let ordinal = {
            let mut opens = self.opens.lock().unwrap();
            *opens += 1;
            *opens
        };
        let parked = std::mem::replace(&mut *self.first_open_parks.lock().unwrap(), false);
        if parked {
            self.entered.notify_one();
            self.gate.notified().await;
        }
        Ok(OpenedSession {
            session_id: format!("session-{}", ordinal),
            opened_at: Utc::now(),
            opening_float_cents,
        })
    }

    async fn session_status(&self) -> Result<Option<SessionSnapshot>, GatewayError> {
        Ok(None)
    }

    async fn register_movement(
        &self,
        _session_id: &str,
        _movement: &CashMovement,
    ) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn close_session(
        &self,
        _session_id: &str,
        _counted_cents: i64,
    ) -> Result<i64, GatewayError> {
        Ok(0)
    }
}

// =============================================================================
// Fixtures
// =============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn plain(id: &str, price_cents: i64) -> Product {
    Product {
        id: id.to_string(),
        name: format!("Product {}", id),
        price_cents,
        stock: 100,
        pricing: PricingMode::Plain,
    }
}

fn weighed(id: &str, price_per_kg_cents: i64) -> Product {
    Product {
        id: id.to_string(),
        name: format!("Per-kg {}", id),
        price_cents: price_per_kg_cents,
        stock: 50_000,
        pricing: PricingMode::Weighted,
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn checkout_is_blocked_without_an_open_session() {
    init_tracing();
    let register = Register::new(MockGateway::new());
    register
        .add_product(&plain("p1", 1500), AddToCart::one_unit())
        .unwrap();

    let err = register
        .checkout(Some(PaymentMethod::Cash), Some(2000))
        .await
        .unwrap_err();
    assert!(matches!(err, RegisterError::SessionRequired));
    assert_eq!(err.code(), ErrorCode::SessionRequired);

    // Nothing left the terminal, and the cart survived
    assert!(register.till_status().preview.is_none());
    assert_eq!(register.cart_view().totals.total_cents, 1500);
}

#[tokio::test]
async fn full_trading_day_reconciles_balanced() {
    init_tracing();
    let register = Register::new(MockGateway::new());

    // Open with a 1000.00 float
    let preview = register.open_session(100_000).await.unwrap();
    assert_eq!(preview.opening_float_cents, 100_000);
    assert!(register.till_status().open);

    // One cash sale: 30.00 total, 50.00 tendered
    register
        .add_product(&plain("p1", 1500), AddToCart::Unit { quantity: 2 })
        .unwrap();
    let outcome = register
        .checkout(Some(PaymentMethod::Cash), Some(5000))
        .await
        .unwrap();
    assert_eq!(outcome.confirmation.total_cents, 3000);
    assert_eq!(outcome.change_cents, 2000);
    assert!(register.cart_view().lines.is_empty());

    // Pay a courier 5.00 out of the drawer
    register
        .register_movement(MovementKind::Expense, 500, "courier delivery fee")
        .await
        .unwrap();
    let preview = register.till_status().preview.unwrap();
    assert_eq!(preview.expense_cents, 500);
    assert_eq!(preview.expected_before_sales_cents, 99_500);

    // Count 1025.00: float + sales - expense, drawer balances
    let report = register.close_session(102_500).await.unwrap();
    assert_eq!(report.cash_sales_cents, 3000);
    assert_eq!(report.expected_cents, 102_500);
    assert_eq!(report.variance_cents, 0);
    assert_eq!(report.verdict, Verdict::Balanced);

    // Closed means closed
    assert!(!register.till_status().open);
    let err = register.close_session(0).await.unwrap_err();
    assert!(matches!(err, RegisterError::Till(TillError::NotOpen)));
}

#[tokio::test]
async fn payment_outage_allows_forced_cash_resubmission() {
    init_tracing();
    let gateway = MockGateway::new();
    gateway.script_failure(SubmitFailure::PaymentUnavailable);
    let register = Register::new(gateway);

    register.open_session(50_000).await.unwrap();
    register
        .add_product(&plain("p1", 2500), AddToCart::one_unit())
        .unwrap();

    // Card attempt hits the outage; the cart must survive untouched
    let err = register
        .checkout(Some(PaymentMethod::Card), None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::PaymentUnavailable);
    assert!(err.cash_fallback_available());
    assert_eq!(register.cart_view().totals.total_cents, 2500);

    // Operator collects cash instead; same cart, new method
    let outcome = register
        .checkout(Some(PaymentMethod::Cash), Some(2500))
        .await
        .unwrap();
    assert_eq!(outcome.confirmation.total_cents, 2500);
    assert!(register.cart_view().lines.is_empty());

    // And the forced-cash sale lands in the cash ledger at close
    let report = register.close_session(52_500).await.unwrap();
    assert_eq!(report.cash_sales_cents, 2500);
    assert_eq!(report.verdict, Verdict::Balanced);
}

#[tokio::test]
async fn insufficient_stock_keeps_cart_for_correction() {
    init_tracing();
    let gateway = MockGateway::new();
    gateway.script_failure(SubmitFailure::InsufficientStock {
        product_id: "p1".to_string(),
    });
    let register = Register::new(gateway);

    register.open_session(50_000).await.unwrap();
    register
        .add_product(&plain("p1", 1000), AddToCart::Unit { quantity: 3 })
        .unwrap();

    let err = register
        .checkout(Some(PaymentMethod::Transfer), None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InsufficientStock);
    assert!(!err.cash_fallback_available());

    // Operator trims the line and resubmits successfully
    let line_id = register.cart_view().lines[0].line_id.clone();
    register.update_quantity(&line_id, -2).unwrap();
    let outcome = register
        .checkout(Some(PaymentMethod::Transfer), None)
        .await
        .unwrap();
    assert_eq!(outcome.confirmation.total_cents, 1000);
}

#[tokio::test]
async fn rejected_movement_is_retracted_locally() {
    init_tracing();
    let gateway = MockGateway::new();
    gateway.reject_movements();
    let register = Register::new(gateway);

    register.open_session(50_000).await.unwrap();
    let err = register
        .register_movement(MovementKind::Income, 10_000, "change replenishment")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ServiceError);

    // The optimistic local copy is gone; the preview shows no movements
    let preview = register.till_status().preview.unwrap();
    assert_eq!(preview.income_cents, 0);
    assert_eq!(preview.movement_count, 0);
}

#[tokio::test]
async fn second_open_is_rejected_while_a_session_runs() {
    init_tracing();
    let register = Register::new(MockGateway::new());

    register.open_session(50_000).await.unwrap();
    let err = register.open_session(60_000).await.unwrap_err();
    assert!(matches!(
        err,
        RegisterError::Till(TillError::AlreadyOpen { .. })
    ));

    // Closing frees the slot for a fresh session
    register.close_session(50_000).await.unwrap();
    register.open_session(60_000).await.unwrap();
    assert_eq!(
        register.till_status().preview.unwrap().opening_float_cents,
        60_000
    );
}

#[tokio::test]
async fn restarted_terminal_recovers_the_open_session() {
    init_tracing();
    let gateway = MockGateway::new();

    // Nothing to recover on a fresh drawer
    let register = Register::new(gateway);
    assert!(register.recover_session().await.unwrap().is_none());
    assert!(!register.till_status().open);

    // The service reports an open session with one expense
    register.gateway().report_open_session(SessionSnapshot {
        opened: OpenedSession {
            session_id: "session-9".to_string(),
            opened_at: Utc::now(),
            opening_float_cents: 80_000,
        },
        movements: vec![CashMovement {
            id: "mv-1".to_string(),
            kind: MovementKind::Expense,
            amount_cents: 2000,
            reason: "window cleaner".to_string(),
            occurred_at: Utc::now(),
        }],
    });

    let preview = register.recover_session().await.unwrap().unwrap();
    assert_eq!(preview.session_id, "session-9");
    assert_eq!(preview.expected_before_sales_cents, 78_000);
    assert_eq!(preview.movement_count, 1);

    // A second recover or open is rejected like any double open
    let err = register.open_session(10_000).await.unwrap_err();
    assert!(matches!(
        err,
        RegisterError::Till(TillError::AlreadyOpen { .. })
    ));
    assert!(register.recover_session().await.is_err());

    // The recovered movements feed the reconciliation
    let report = register.close_session(78_000).await.unwrap();
    assert_eq!(report.expense_cents, 2000);
    assert_eq!(report.verdict, Verdict::Balanced);
}

#[tokio::test]
async fn overlapping_opens_do_not_overwrite_the_session() {
    init_tracing();
    let register = Arc::new(Register::new(GatedGateway::new()));

    // First open passes the local check, then parks inside the gateway
    let parked_open = {
        let register = Arc::clone(&register);
        tokio::spawn(async move { register.open_session(40_000).await })
    };
    register.gateway().entered.notified().await;

    // Second open completes while the first is still in flight
    let preview = register.open_session(60_000).await.unwrap();
    assert_eq!(preview.opening_float_cents, 60_000);

    // The parked open returns and must not clobber the live session
    register.gateway().gate.notify_one();
    let err = parked_open.await.unwrap().unwrap_err();
    assert!(matches!(
        err,
        RegisterError::Till(TillError::AlreadyOpen { .. })
    ));
    assert_eq!(
        register.till_status().preview.unwrap().opening_float_cents,
        60_000
    );
}

#[tokio::test]
async fn cash_shortfall_never_reaches_the_gateway() {
    init_tracing();
    let register = Register::new(MockGateway::new());

    register.open_session(50_000).await.unwrap();
    register
        .add_product(&plain("p1", 1500), AddToCart::one_unit())
        .unwrap();

    let err = register
        .checkout(Some(PaymentMethod::Cash), Some(1000))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InsufficientTender);
    assert!(register.gateway().submitted().is_empty());
}

#[tokio::test]
async fn weighed_lines_go_on_the_wire_in_kilograms() {
    init_tracing();
    let register = Register::new(MockGateway::new());
    register.open_session(50_000).await.unwrap();

    // Drive the weighed product through the selection flow, as the UI would
    let mut flow = SelectionFlow::new();
    flow.begin(weighed("w1", 2000)).unwrap();
    flow.enter_weight(Weight::from_grams(500)).unwrap();
    let (product, request) = flow.take_priced().unwrap();
    register.add_product(&product, request).unwrap();

    let outcome = register
        .checkout(Some(PaymentMethod::Cash), Some(1000))
        .await
        .unwrap();
    assert_eq!(outcome.confirmation.total_cents, 1000);

    let submitted = register.gateway().submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].items[0].product_id, "w1");
    assert_eq!(submitted[0].items[0].quantity, 0.5);
    assert_eq!(submitted[0].items[0].unit_price_cents, 2000);
}
