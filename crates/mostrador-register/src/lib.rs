//! # mostrador-register: Register State and Gateway Boundary
//!
//! The stateful layer between the POS frontend and the pure rules in
//! `mostrador-core`. It owns the cart and the cash session, runs the
//! add-to-cart selection flow, and drives every remote effect through
//! the injected [`SalesGateway`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     mostrador-register                                  │
//! │                                                                         │
//! │  ┌──────────────┐     ┌──────────────────────────────────────────────┐ │
//! │  │ SelectionFlow│     │              Register<G>                     │ │
//! │  │  (dialogs)   │────►│  cart: Mutex<Cart>                           │ │
//! │  └──────────────┘     │  session: Mutex<Option<CashSession>>         │ │
//! │                       │  gateway: G                                  │ │
//! │                       └───────────────────┬──────────────────────────┘ │
//! │                                           │                             │
//! │                                           ▼                             │
//! │                       G: SalesGateway (implemented by the transport)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`register`] - The `Register` store: cart, session, checkout
//! - [`flow`] - Add-to-cart selection state machine
//! - [`gateway`] - The `SalesGateway` trait and its DTOs
//! - [`error`] - `RegisterError` and frontend error codes

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod flow;
pub mod gateway;
pub mod register;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{ErrorCode, RegisterError, RegisterResult};
pub use flow::{FlowError, FlowState, SelectionFlow};
pub use gateway::{GatewayError, OpenedSession, SalesGateway, SessionSnapshot};
pub use register::{CartTotals, CartView, CheckoutOutcome, Register, TillStatus};
