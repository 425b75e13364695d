//! # Register Store
//!
//! The explicit state store the POS frontend talks to. It owns the cart
//! and the (at most one) open cash session, and drives every remote
//! effect through the injected [`SalesGateway`].
//!
//! ## Operation Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Register<G>                                      │
//! │                                                                         │
//! │  Cart (local only)           Till (two-phase with gateway)              │
//! │  ─────────────────           ─────────────────────────────              │
//! │  add_product                 open_session    gateway first, then local  │
//! │  update_quantity             register_movement  local first, retract    │
//! │  set_weight                                     on gateway rejection    │
//! │  remove_line                 close_session   gateway first (returns     │
//! │  clear_cart                                  cash sales), then local    │
//! │  cart_view                   till_status                                │
//! │                                                                         │
//! │  Checkout (gated on an open session)                                    │
//! │  ───────────────────────────────────                                    │
//! │  checkout: validate → submit → clear cart on success ONLY               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! `Mutex` over `RwLock`: register operations are quick and most of them
//! mutate. Guards are always dropped before awaiting the gateway, so a
//! slow network call never blocks cart edits on another thread.

use std::sync::Mutex;

use serde::Serialize;
use tracing::{debug, info, warn};

use mostrador_core::{
    validate_checkout, validate_counted_amount, validate_opening_float, AddToCart, Cart, CartLine,
    CashMovement, CashSession, MovementKind, PaymentMethod, Product, Reconciliation,
    SaleConfirmation, TillError, TillPreview, Weight,
};

use crate::error::{RegisterError, RegisterResult};
use crate::gateway::SalesGateway;

// =============================================================================
// View DTOs
// =============================================================================

/// Cart totals summary for the frontend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub line_count: usize,
    pub total_cents: i64,
}

/// A snapshot of the cart for rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
}

/// Till screen state: whether a session is open, and its running figures.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TillStatus {
    pub open: bool,
    pub preview: Option<TillPreview>,
}

/// Result of a completed checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOutcome {
    pub confirmation: SaleConfirmation,

    /// Change due for cash sales; zero for every other method.
    pub change_cents: i64,
}

// =============================================================================
// Register
// =============================================================================

/// The register store. One instance per terminal.
#[derive(Debug)]
pub struct Register<G: SalesGateway> {
    gateway: G,
    cart: Mutex<Cart>,
    session: Mutex<Option<CashSession>>,
}

impl<G: SalesGateway> Register<G> {
    /// Creates a register with an empty cart and no session.
    pub fn new(gateway: G) -> Self {
        Register {
            gateway,
            cart: Mutex::new(Cart::new()),
            session: Mutex::new(None),
        }
    }

    /// Access to the injected gateway (the transport layer configures it).
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    // -------------------------------------------------------------------------
    // Lock helpers
    // -------------------------------------------------------------------------

    fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&cart)
    }

    fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&mut cart)
    }

    fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Option<CashSession>) -> R,
    {
        let mut session = self.session.lock().expect("Session mutex poisoned");
        f(&mut session)
    }

    // -------------------------------------------------------------------------
    // Cart operations (local, synchronous)
    // -------------------------------------------------------------------------

    /// Adds a priced request to the cart, returning the touched line id.
    pub fn add_product(&self, product: &Product, request: AddToCart) -> RegisterResult<String> {
        let line_id = self.with_cart_mut(|cart| cart.add_item(product, request))?;
        debug!(product_id = %product.id, line_id = %line_id, "cart line added");
        Ok(line_id)
    }

    /// Applies a +/- delta to a line's unit quantity.
    pub fn update_quantity(&self, line_id: &str, delta: i64) -> RegisterResult<()> {
        self.with_cart_mut(|cart| cart.update_quantity(line_id, delta))?;
        debug!(line_id = %line_id, delta, "cart quantity updated");
        Ok(())
    }

    /// Replaces the weight of a weighed line.
    pub fn set_weight(&self, line_id: &str, weight: Weight) -> RegisterResult<()> {
        self.with_cart_mut(|cart| cart.set_weight(line_id, weight))?;
        debug!(line_id = %line_id, grams = weight.grams(), "cart weight replaced");
        Ok(())
    }

    /// Removes a line from the cart.
    pub fn remove_line(&self, line_id: &str) -> RegisterResult<()> {
        self.with_cart_mut(|cart| cart.remove_line(line_id))?;
        debug!(line_id = %line_id, "cart line removed");
        Ok(())
    }

    /// Empties the cart (explicit operator cancel).
    pub fn clear_cart(&self) {
        self.with_cart_mut(|cart| cart.clear());
        debug!("cart cleared");
    }

    /// Snapshot for rendering the cart panel.
    pub fn cart_view(&self) -> CartView {
        self.with_cart(|cart| CartView {
            lines: cart.lines.clone(),
            totals: CartTotals {
                line_count: cart.line_count(),
                total_cents: cart.total_cents(),
            },
        })
    }

    // -------------------------------------------------------------------------
    // Till operations (two-phase with the gateway)
    // -------------------------------------------------------------------------

    /// Opens a cash session with the given float.
    ///
    /// The gateway creates the session; the register then mirrors the
    /// server-issued id and timestamp. A second open while one is
    /// running is rejected locally (and the service rejects it too).
    pub async fn open_session(&self, opening_float_cents: i64) -> RegisterResult<TillPreview> {
        validate_opening_float(opening_float_cents).map_err(TillError::from)?;

        self.with_session_mut(|slot| match slot {
            Some(session) if session.is_open() => Err(RegisterError::Till(TillError::AlreadyOpen {
                session_id: session.id.clone(),
            })),
            _ => Ok(()),
        })?;

        let opened = self.gateway.open_session(opening_float_cents).await?;
        let session = CashSession::from_parts(
            opened.session_id,
            opened.opened_at,
            opened.opening_float_cents,
            Vec::new(),
        )?;
        let preview = session.preview();

        // The slot may have been taken by a concurrent open while the
        // gateway call was in flight; the loser must not overwrite it
        self.with_session_mut(|slot| {
            if let Some(existing) = slot.as_ref().filter(|s| s.is_open()) {
                return Err(RegisterError::Till(TillError::AlreadyOpen {
                    session_id: existing.id.clone(),
                }));
            }
            *slot = Some(session);
            Ok(())
        })?;

        info!(
            session_id = %preview.session_id,
            opening_float_cents,
            "cash session opened"
        );
        Ok(preview)
    }

    /// Queries the service for an already-open session and mirrors it
    /// locally (terminal restart). Returns `None` when the drawer has
    /// no open session to recover.
    pub async fn recover_session(&self) -> RegisterResult<Option<TillPreview>> {
        let Some(snapshot) = self.gateway.session_status().await? else {
            return Ok(None);
        };
        let preview = self.resume_session(snapshot.opened, snapshot.movements)?;
        Ok(Some(preview))
    }

    /// Adopts a session the service reports as open (terminal restart,
    /// status query on startup), so the register mirrors server state.
    pub fn resume_session(
        &self,
        opened: crate::gateway::OpenedSession,
        movements: Vec<CashMovement>,
    ) -> RegisterResult<TillPreview> {
        self.with_session_mut(|slot| {
            if let Some(session) = slot.as_ref().filter(|s| s.is_open()) {
                return Err(RegisterError::Till(TillError::AlreadyOpen {
                    session_id: session.id.clone(),
                }));
            }
            let session = CashSession::from_parts(
                opened.session_id,
                opened.opened_at,
                opened.opening_float_cents,
                movements,
            )?;
            let preview = session.preview();
            info!(session_id = %preview.session_id, "cash session resumed");
            *slot = Some(session);
            Ok(preview)
        })
    }

    /// Till screen state for rendering.
    pub fn till_status(&self) -> TillStatus {
        self.with_session_mut(|slot| match slot {
            Some(session) if session.is_open() => TillStatus {
                open: true,
                preview: Some(session.preview()),
            },
            _ => TillStatus {
                open: false,
                preview: None,
            },
        })
    }

    /// Records a manual cash movement.
    ///
    /// Applied locally first so the preview updates immediately, then
    /// pushed to the service. If the service rejects it, the local copy
    /// is retracted and the error surfaces unchanged.
    pub async fn register_movement(
        &self,
        kind: MovementKind,
        amount_cents: i64,
        reason: &str,
    ) -> RegisterResult<CashMovement> {
        let (session_id, movement) = self.with_session_mut(|slot| {
            let session = slot
                .as_mut()
                .filter(|s| s.is_open())
                .ok_or(RegisterError::Till(TillError::NotOpen))?;
            let movement = session.register_movement(kind, amount_cents, reason)?;
            Ok::<_, RegisterError>((session.id.clone(), movement))
        })?;

        if let Err(err) = self.gateway.register_movement(&session_id, &movement).await {
            warn!(
                movement_id = %movement.id,
                error = %err,
                "movement rejected upstream, retracting local copy"
            );
            self.with_session_mut(|slot| {
                if let Some(session) = slot.as_mut() {
                    let _ = session.retract_movement(&movement.id);
                }
            });
            return Err(err.into());
        }

        debug!(
            movement_id = %movement.id,
            kind = ?kind,
            amount_cents,
            "cash movement registered"
        );
        Ok(movement)
    }

    /// Closes the open session against a counted drawer amount.
    ///
    /// The gateway closes first and returns the session's cash sales
    /// total from the ledger; only then does the local session close and
    /// produce the reconciliation. A gateway failure leaves the session
    /// open on both sides.
    pub async fn close_session(&self, counted_cents: i64) -> RegisterResult<Reconciliation> {
        validate_counted_amount(counted_cents).map_err(TillError::from)?;

        let session_id = self.with_session_mut(|slot| {
            slot.as_ref()
                .filter(|s| s.is_open())
                .map(|s| s.id.clone())
                .ok_or(RegisterError::Till(TillError::NotOpen))
        })?;

        let cash_sales_cents = self.gateway.close_session(&session_id, counted_cents).await?;

        let reconciliation = self.with_session_mut(|slot| {
            let session = slot
                .as_mut()
                .filter(|s| s.is_open())
                .ok_or(RegisterError::Till(TillError::NotOpen))?;
            let reconciliation = session.close(counted_cents, cash_sales_cents)?;
            *slot = None;
            Ok::<_, RegisterError>(reconciliation)
        })?;

        info!(
            session_id = %reconciliation.session_id,
            expected_cents = reconciliation.expected_cents,
            counted_cents = reconciliation.counted_cents,
            variance_cents = reconciliation.variance_cents,
            verdict = ?reconciliation.verdict,
            "cash session closed"
        );
        Ok(reconciliation)
    }

    // -------------------------------------------------------------------------
    // Checkout
    // -------------------------------------------------------------------------

    /// Validates and submits the current cart as a sale.
    ///
    /// ## Behavior
    /// - Blocked unless a cash session is open
    /// - Preconditions checked locally before anything leaves the terminal
    /// - On success the cart is cleared; the sale is committed upstream
    /// - On ANY failure the cart stays intact; for `PaymentUnavailable`
    ///   the operator may call this again with `PaymentMethod::Cash`
    /// - No retries here; retry policy belongs to the transport
    pub async fn checkout(
        &self,
        method: Option<PaymentMethod>,
        tendered_cents: Option<i64>,
    ) -> RegisterResult<CheckoutOutcome> {
        self.with_session_mut(|slot| match slot {
            Some(session) if session.is_open() => Ok(()),
            _ => Err(RegisterError::SessionRequired),
        })?;

        let plan = self.with_cart(|cart| validate_checkout(cart, method, tendered_cents))?;
        debug!(
            items = plan.request.items.len(),
            total_cents = plan.total_cents,
            method = ?plan.request.payment_method,
            "submitting sale"
        );

        let confirmation = match self.gateway.submit_sale(&plan.request).await {
            Ok(confirmation) => confirmation,
            Err(failure) => {
                warn!(
                    error = %failure,
                    cart_recoverable = failure.cart_recoverable(),
                    cash_fallback = failure.cash_fallback_available(),
                    "sale submission failed, cart kept intact"
                );
                return Err(failure.into());
            }
        };

        self.with_cart_mut(|cart| cart.clear());
        info!(
            sale_id = %confirmation.sale_id,
            total_cents = confirmation.total_cents,
            change_cents = plan.change_cents,
            "sale completed"
        );
        Ok(CheckoutOutcome {
            confirmation,
            change_cents: plan.change_cents,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
// Gateway-driven behavior (sessions, checkout, rollback) is covered by
// the integration suite in tests/; these only exercise the synchronous
// cart surface and the view DTOs.
