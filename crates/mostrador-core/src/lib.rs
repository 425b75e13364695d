//! # mostrador-core: Pure Business Logic for Mostrador POS
//!
//! This crate is the **heart** of Mostrador POS. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Mostrador POS Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                       POS Frontend                              │   │
//! │  │   Product Grid ──► Cart Panel ──► Payment ──► Till Screen      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   mostrador-register                            │   │
//! │  │    Register store: cart + session state, SalesGateway calls    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ mostrador-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │   till    │  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │ CashSess. │  │   │
//! │  │   │  Variant  │  │  Weight$  │  │ LineKey   │  │ Reconcile │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, PricingMode, Weight, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Line key resolution, weight pricing, cart aggregation
//! - [`checkout`] - Checkout preconditions, payload building, failure taxonomy
//! - [`till`] - Cash session state machine and reconciliation
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Integer Weight**: Weighed quantities are in grams (i64) for the same reason
//! 5. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod till;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use mostrador_core::Money` instead of
// `use mostrador_core::money::Money`

pub use cart::{price_weighed, AddToCart, Cart, CartLine, LineKey, LineKind, WeighedPricing};
pub use checkout::{
    build_request, stack_tender, validate_checkout, CheckoutItem, CheckoutPlan, CheckoutRequest,
    SaleConfirmation, SubmitFailure,
};
pub use error::{CoreError, TillError, ValidationError};
pub use money::Money;
pub use till::{
    CashMovement, CashSession, MovementKind, Reconciliation, SessionStatus, TillPreview, Verdict,
};
pub use types::*;
pub use validation::{
    validate_counted_amount, validate_movement_amount, validate_movement_reason,
    validate_opening_float, validate_unit_quantity, validate_weight,
};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
/// Can be made configurable per-store in future versions.
pub const MAX_CART_LINES: usize = 100;

/// Maximum unit quantity of a single cart line
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
/// Configurable per-store in future versions.
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Grams per kilogram, used by the weight pricing calculator.
pub const GRAMS_PER_KILOGRAM: i64 = 1000;
