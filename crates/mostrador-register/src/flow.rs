//! # Selection Flow
//!
//! State machine for turning a product tap into a validated add request.
//!
//! ## States and Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Selection Flow                                   │
//! │                                                                         │
//! │                     begin(product)                                      │
//! │        ┌──────────────────┼──────────────────────┐                      │
//! │        │ Plain            │ Weighted             │ Variants             │
//! │        ▼                  ▼                      ▼                      │
//! │     Priced          EnteringWeight         PickingVariant               │
//! │   (1 unit, no        │                      │  choose_color            │
//! │    dialog)           │ enter_weight         │  choose_size             │
//! │        │             ▼                      │  set_quantity            │
//! │        │          Priced                    │ confirm_selection        │
//! │        │             │                      ▼                           │
//! │        │             │                   Priced                        │
//! │        └─────────────┴──────────────────────┘                           │
//! │                      │ take_priced()                                    │
//! │                      ▼                                                  │
//! │              (Product, AddToCart) ──► Cart::add_item                    │
//! │                                                                         │
//! │  cancel() from any state returns to Idle without touching the cart.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One enum instead of a pile of `show_variant_modal` / `show_weight_modal`
//! booleans: illegal combinations (two dialogs at once, a confirm with no
//! product) are unrepresentable, and every UI dialog renders off a single
//! `match` on the current state.

use thiserror::Error;
use tracing::debug;

use mostrador_core::{AddToCart, PricingMode, Product, VariantSelection, Weight};

// =============================================================================
// Flow Error
// =============================================================================

/// Violations of the selection flow's transition rules.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowError {
    /// The requested transition does not exist from the current state.
    #[error("Selection flow is not in a state that accepts this action")]
    InvalidTransition,

    /// Confirm pressed before both variant axes were picked.
    #[error("Pick a color and a size before confirming")]
    IncompleteSelection,

    /// The picked option is not one this product offers.
    #[error("Product does not offer option '{option}'")]
    UnknownOption { option: String },

    /// The chosen combination has no stock (or fewer units than requested).
    #[error("Only {available} in stock for {combination}")]
    InsufficientVariantStock { combination: String, available: i64 },

    /// Quantity must be at least one.
    #[error("Quantity must be at least 1")]
    QuantityTooSmall,
}

// =============================================================================
// Flow State
// =============================================================================

/// The current state of the add-to-cart dialog flow.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    /// Nothing in progress; product grid is interactive.
    Idle,

    /// Variant dialog open; axes picked one at a time.
    PickingVariant {
        product: Product,
        color: Option<String>,
        size: Option<String>,
        quantity: i64,
    },

    /// Weight dialog open, waiting on the scale reading.
    EnteringWeight { product: Product },

    /// A validated add request, ready to hand to the cart.
    Priced { product: Product, request: AddToCart },
}

/// The add-to-cart selection flow.
///
/// Owns no cart and performs no I/O; it only shepherds operator input
/// into a well-formed [`AddToCart`] request.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionFlow {
    state: FlowState,
}

impl SelectionFlow {
    pub fn new() -> Self {
        SelectionFlow { state: FlowState::Idle }
    }

    /// Read access for rendering; the UI matches on this.
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, FlowState::Idle)
    }

    /// Starts the flow for a tapped/scanned product.
    ///
    /// Plain products skip every dialog and go straight to `Priced` with
    /// one unit, which is what makes barcode scanning a single action.
    pub fn begin(&mut self, product: Product) -> Result<(), FlowError> {
        if !self.is_idle() {
            return Err(FlowError::InvalidTransition);
        }

        debug!(product_id = %product.id, "selection flow started");
        self.state = match product.pricing {
            PricingMode::Plain => FlowState::Priced {
                product,
                request: AddToCart::one_unit(),
            },
            PricingMode::Weighted => FlowState::EnteringWeight { product },
            PricingMode::Variants(_) => FlowState::PickingVariant {
                product,
                color: None,
                size: None,
                quantity: 1,
            },
        };
        Ok(())
    }

    /// Picks the color axis. Re-picking replaces the previous choice.
    pub fn choose_color(&mut self, choice: &str) -> Result<(), FlowError> {
        match &mut self.state {
            FlowState::PickingVariant { product, color, .. } => {
                let matrix = variant_matrix(product)?;
                if !matrix.colors.iter().any(|c| c == choice) {
                    return Err(FlowError::UnknownOption {
                        option: choice.to_string(),
                    });
                }
                *color = Some(choice.to_string());
                Ok(())
            }
            _ => Err(FlowError::InvalidTransition),
        }
    }

    /// Picks the size axis. Re-picking replaces the previous choice.
    pub fn choose_size(&mut self, choice: &str) -> Result<(), FlowError> {
        match &mut self.state {
            FlowState::PickingVariant { product, size, .. } => {
                let matrix = variant_matrix(product)?;
                if !matrix.sizes.iter().any(|s| s == choice) {
                    return Err(FlowError::UnknownOption {
                        option: choice.to_string(),
                    });
                }
                *size = Some(choice.to_string());
                Ok(())
            }
            _ => Err(FlowError::InvalidTransition),
        }
    }

    /// Sets the unit quantity in the variant dialog.
    pub fn set_quantity(&mut self, requested: i64) -> Result<(), FlowError> {
        match &mut self.state {
            FlowState::PickingVariant { quantity, .. } => {
                if requested < 1 {
                    return Err(FlowError::QuantityTooSmall);
                }
                *quantity = requested;
                Ok(())
            }
            _ => Err(FlowError::InvalidTransition),
        }
    }

    /// Stock remaining for the combination currently picked, if both axes
    /// are chosen. The dialog renders this next to the quantity stepper.
    pub fn selected_stock(&self) -> Option<i64> {
        match &self.state {
            FlowState::PickingVariant {
                product,
                color: Some(color),
                size: Some(size),
                ..
            } => product.variant_stock(&VariantSelection::new(color.clone(), size.clone())),
            _ => None,
        }
    }

    /// Confirms the variant dialog, checking stock for the combination.
    pub fn confirm_selection(&mut self) -> Result<(), FlowError> {
        let (product, selection, quantity) = match &self.state {
            FlowState::PickingVariant {
                product,
                color,
                size,
                quantity,
            } => {
                let (color, size) = match (color, size) {
                    (Some(c), Some(s)) => (c.clone(), s.clone()),
                    _ => return Err(FlowError::IncompleteSelection),
                };
                (product.clone(), VariantSelection::new(color, size), *quantity)
            }
            _ => return Err(FlowError::InvalidTransition),
        };

        let available = product.variant_stock(&selection).unwrap_or(0);
        if quantity > available {
            return Err(FlowError::InsufficientVariantStock {
                combination: selection.key_fragment(),
                available,
            });
        }

        debug!(
            product_id = %product.id,
            combination = %selection.key_fragment(),
            quantity,
            "variant selection confirmed"
        );
        self.state = FlowState::Priced {
            product,
            request: AddToCart::Variant { selection, quantity },
        };
        Ok(())
    }

    /// Accepts the scale reading and prices the weighed product.
    pub fn enter_weight(&mut self, weight: Weight) -> Result<(), FlowError> {
        match &self.state {
            FlowState::EnteringWeight { product } => {
                if !weight.is_positive() {
                    return Err(FlowError::InvalidTransition);
                }
                debug!(product_id = %product.id, grams = weight.grams(), "weight entered");
                self.state = FlowState::Priced {
                    product: product.clone(),
                    request: AddToCart::Weighed { weight },
                };
                Ok(())
            }
            _ => Err(FlowError::InvalidTransition),
        }
    }

    /// Takes the finished request out of the flow and resets to `Idle`.
    pub fn take_priced(&mut self) -> Result<(Product, AddToCart), FlowError> {
        match std::mem::replace(&mut self.state, FlowState::Idle) {
            FlowState::Priced { product, request } => Ok((product, request)),
            other => {
                // Not priced yet; put the state back untouched
                self.state = other;
                Err(FlowError::InvalidTransition)
            }
        }
    }

    /// Abandons whatever was in progress. Always succeeds.
    pub fn cancel(&mut self) {
        self.state = FlowState::Idle;
    }
}

impl Default for SelectionFlow {
    fn default() -> Self {
        Self::new()
    }
}

fn variant_matrix(product: &Product) -> Result<&mostrador_core::VariantMatrix, FlowError> {
    match &product.pricing {
        PricingMode::Variants(matrix) => Ok(matrix),
        _ => Err(FlowError::InvalidTransition),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
