//! # Checkout Module
//!
//! Checkout preconditions, payload building and submission-failure taxonomy.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout Pipeline                                │
//! │                                                                         │
//! │  Cart + method + tender                                                 │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  validate_checkout() ── empty cart? ──────────► blocked (EmptyCart)     │
//! │        │                method unset? ────────► blocked (Required)      │
//! │        │                cash tender < total? ─► blocked (Insufficient   │
//! │        │                                        Tender, NEVER clamped)  │
//! │        ▼                                                                │
//! │  CheckoutPlan { request, total, change }                                │
//! │        │                                                                │
//! │        ▼  (register crate submits through the gateway)                  │
//! │  Ok ──────► clear cart, sale committed upstream                         │
//! │  Err ─────► SubmitFailure taxonomy:                                     │
//! │             • PaymentUnavailable → operator may force CASH + resubmit   │
//! │             • Validation / InsufficientStock → cart kept for fixing     │
//! │             • Other → unrecoverable, surface as-is                      │
//! │                                                                         │
//! │  The core performs NO retries; retry policy belongs to transport.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::PaymentMethod;

// =============================================================================
// Submission Payload
// =============================================================================

/// One cart line stripped to what the sales service needs.
///
/// Variant labels, weight helpers and other client-only metadata are
/// intentionally dropped here; they do not round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    /// Product id (the line reference the sales service resolves).
    pub product_id: String,

    /// Units for plain/variant lines, kilograms for weighed lines.
    pub quantity: f64,

    /// Frozen unit price in cents (per-kilogram for weighed lines).
    pub unit_price_cents: i64,
}

/// The full submission payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
    pub payment_method: PaymentMethod,
}

/// Success response from the sales service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleConfirmation {
    pub sale_id: String,
    pub total_cents: i64,
}

/// A validated, ready-to-submit checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutPlan {
    /// The wire payload.
    pub request: CheckoutRequest,

    /// Cart total at validation time.
    pub total_cents: i64,

    /// Change due for cash sales (`tendered − total`, ≥ 0); zero otherwise.
    pub change_cents: i64,
}

// =============================================================================
// Validator
// =============================================================================

/// Builds the submission payload from the cart lines.
pub fn build_request(cart: &Cart, payment_method: PaymentMethod) -> CheckoutRequest {
    CheckoutRequest {
        items: cart
            .lines
            .iter()
            .map(|line| CheckoutItem {
                product_id: line.product_id.clone(),
                quantity: line.wire_quantity(),
                unit_price_cents: line.unit_price_cents,
            })
            .collect(),
        payment_method,
    }
}

/// Validates checkout preconditions and produces a submission plan.
///
/// ## Preconditions
/// - Cart is non-empty
/// - A payment method is selected
/// - For cash: tendered covers the total; a shortfall blocks confirmation
///   and is never silently bumped to the total
pub fn validate_checkout(
    cart: &Cart,
    method: Option<PaymentMethod>,
    tendered_cents: Option<i64>,
) -> CoreResult<CheckoutPlan> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let method = method.ok_or_else(|| ValidationError::Required {
        field: "payment method".to_string(),
    })?;

    let total_cents = cart.total_cents();

    let change_cents = if method.is_cash() {
        let tendered = tendered_cents.ok_or_else(|| ValidationError::Required {
            field: "tendered amount".to_string(),
        })?;
        let change = tendered - total_cents;
        if change < 0 {
            return Err(CoreError::InsufficientTender {
                total_cents,
                tendered_cents: tendered,
            });
        }
        change
    } else {
        0
    };

    Ok(CheckoutPlan {
        request: build_request(cart, method),
        total_cents,
        change_cents,
    })
}

/// Stacks a quick-tender bill onto the current tendered amount.
///
/// The cash keypad offers bill shortcuts; each tap ADDS to the running
/// tender rather than replacing it.
#[inline]
pub fn stack_tender(current_cents: i64, bill_cents: i64) -> i64 {
    current_cents + bill_cents
}

// =============================================================================
// Submission Failure Taxonomy
// =============================================================================

/// Classified failure from the sales service.
///
/// The classification is what the operator flow keys on: a degraded
/// payment gateway invites a cash fallback, stock/validation failures
/// keep the cart for correction, anything else is unrecoverable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitFailure {
    /// Server-side validation rejected the sale.
    #[error("Sale rejected: {0}")]
    Validation(String),

    /// Another terminal got there first; the line needs correcting.
    #[error("Insufficient stock for product {product_id}")]
    InsufficientStock { product_id: String },

    /// The payment subsystem is degraded (circuit open). Cash sales have
    /// no external dependency, so the operator may force CASH and resubmit.
    #[error("Payment subsystem unavailable; collect cash instead")]
    PaymentUnavailable,

    /// Anything else; not recoverable at the register.
    #[error("Sale submission failed: {0}")]
    Other(String),
}

impl SubmitFailure {
    /// Checks if the operator may force the method to cash and resubmit.
    pub fn cash_fallback_available(&self) -> bool {
        matches!(self, SubmitFailure::PaymentUnavailable)
    }

    /// Checks if the cart should be kept intact for operator correction.
    pub fn cart_recoverable(&self) -> bool {
        matches!(
            self,
            SubmitFailure::Validation(_) | SubmitFailure::InsufficientStock { .. }
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::AddToCart;
    use crate::types::{PricingMode, Product, Weight};

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

    fn cart_with_total_1500() -> Cart {
        let mut cart = Cart::new();
        cart.add_item(&plain("p1", 1500), AddToCart::one_unit()).unwrap();
        cart
    }

    #[test]
    fn test_empty_cart_blocks_checkout() {
        let cart = Cart::new();
        let err = validate_checkout(&cart, Some(PaymentMethod::Cash), Some(1000)).unwrap_err();
        assert!(matches!(err, CoreError::EmptyCart));
    }

    #[test]
    fn test_missing_method_blocks_checkout() {
        let cart = cart_with_total_1500();
        let err = validate_checkout(&cart, None, None).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::Required { .. })));
    }

    #[test]
    fn test_cash_shortfall_blocks_not_clamps() {
        let cart = cart_with_total_1500();
        let err = validate_checkout(&cart, Some(PaymentMethod::Cash), Some(1000)).unwrap_err();
        match err {
            CoreError::InsufficientTender { total_cents, tendered_cents } => {
                assert_eq!(total_cents, 1500);
                assert_eq!(tendered_cents, 1000);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_cash_change_computed() {
        let cart = cart_with_total_1500();
        let plan = validate_checkout(&cart, Some(PaymentMethod::Cash), Some(2000)).unwrap();
        assert_eq!(plan.total_cents, 1500);
        assert_eq!(plan.change_cents, 500);
    }

    #[test]
    fn test_exact_tender_is_valid() {
        let cart = cart_with_total_1500();
        let plan = validate_checkout(&cart, Some(PaymentMethod::Cash), Some(1500)).unwrap();
        assert_eq!(plan.change_cents, 0);
    }

    #[test]
    fn test_non_cash_ignores_tender() {
        let cart = cart_with_total_1500();
        let plan = validate_checkout(&cart, Some(PaymentMethod::Card), None).unwrap();
        assert_eq!(plan.change_cents, 0);
        assert_eq!(plan.request.payment_method, PaymentMethod::Card);
    }

    #[test]
    fn test_payload_strips_to_wire_fields() {
        let mut cart = Cart::new();
        cart.add_item(&plain("p1", 1000), AddToCart::Unit { quantity: 2 }).unwrap();
        cart.add_item(
            &weighed("w1", 2000),
            AddToCart::Weighed { weight: Weight::from_grams(500) },
        )
        .unwrap();

        let request = build_request(&cart, PaymentMethod::Cash);
        assert_eq!(request.items.len(), 2);

        assert_eq!(request.items[0].product_id, "p1");
        assert_eq!(request.items[0].quantity, 2.0);
        assert_eq!(request.items[0].unit_price_cents, 1000);

        // Weighed lines go on the wire in kilograms
        assert_eq!(request.items[1].product_id, "w1");
        assert_eq!(request.items[1].quantity, 0.5);
        assert_eq!(request.items[1].unit_price_cents, 2000);
    }

    #[test]
    fn test_payload_round_trips_wire_fields() {
        let mut cart = Cart::new();
        cart.add_item(&plain("p1", 1000), AddToCart::Unit { quantity: 3 }).unwrap();

        let request = build_request(&cart, PaymentMethod::Transfer);
        let json = serde_json::to_string(&request).unwrap();
        let parsed: CheckoutRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, request);
    }

    #[test]
    fn test_stack_tender() {
        let mut tendered = 0;
        tendered = stack_tender(tendered, 100_000);
        tendered = stack_tender(tendered, 50_000);
        assert_eq!(tendered, 150_000);
    }

    #[test]
    fn test_failure_classification() {
        assert!(SubmitFailure::PaymentUnavailable.cash_fallback_available());
        assert!(!SubmitFailure::PaymentUnavailable.cart_recoverable());

        let stock = SubmitFailure::InsufficientStock { product_id: "p1".to_string() };
        assert!(stock.cart_recoverable());
        assert!(!stock.cash_fallback_available());

        let validation = SubmitFailure::Validation("bad line".to_string());
        assert!(validation.cart_recoverable());

        let other = SubmitFailure::Other("boom".to_string());
        assert!(!other.cart_recoverable());
        assert!(!other.cash_fallback_available());
    }
}
