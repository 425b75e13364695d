//! # Cart Module
//!
//! Line key resolution, weight pricing and cart aggregation.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Aggregation                                  │
//! │                                                                         │
//! │  Operator Action            Operation                Cart Change        │
//! │  ───────────────            ─────────                ───────────        │
//! │                                                                         │
//! │  Tap / scan product ──────► add_item() ────────────► push or merge     │
//! │                                                                         │
//! │  +/- on a line ───────────► update_quantity() ─────► qty += delta      │
//! │                                                      (≤0 removes line)  │
//! │                                                                         │
//! │  Re-weigh on the scale ───► set_weight() ──────────► weight replaced   │
//! │                                                                         │
//! │  Trash icon ──────────────► remove_line() ─────────► line deleted      │
//! │                                                                         │
//! │  Cancel / sale done ──────► clear() ───────────────► all lines gone    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Merge Asymmetry (Intentional)
//! Variant lines merge by line key: adding "Basic Tee red-M" twice yields
//! one line with the summed quantity. Plain and weighed products do NOT
//! merge: re-scanning the same barcode appends a second line, mirroring
//! how cashiers expect a ticket to grow scan by scan. Because of this,
//! plain/weighed line keys legitimately repeat within a cart, so every
//! line also carries its own `line_id` and all mutation operations
//! address lines by that id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{PricingMode, Product, VariantSelection, Weight};
use crate::validation::{validate_unit_quantity, validate_weight};
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

// =============================================================================
// Line Key
// =============================================================================

/// The merge-identity of a cart line.
///
/// - Plain / weighed product: the product id alone.
/// - Variant product: `productId-color-size`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
pub struct LineKey(String);

impl LineKey {
    /// Resolves the line key for a product plus an optional selection.
    ///
    /// Pure function, no side effects. A variant product REQUIRES a full
    /// selection; plain and weighed products ignore any selection passed.
    pub fn resolve(
        product: &Product,
        selection: Option<&VariantSelection>,
    ) -> Result<LineKey, ValidationError> {
        match &product.pricing {
            PricingMode::Variants(_) => {
                let selection = selection.ok_or_else(|| ValidationError::Required {
                    field: "variant selection".to_string(),
                })?;
                Ok(LineKey(format!("{}-{}", product.id, selection.key_fragment())))
            }
            PricingMode::Plain | PricingMode::Weighted => Ok(LineKey(product.id.clone())),
        }
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Weight Pricing Calculator
// =============================================================================

/// The priced outcome of weighing a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct WeighedPricing {
    /// The per-kilogram price, unchanged from the product.
    pub unit_price_cents: i64,

    /// The entered weight; becomes the line quantity.
    pub weight: Weight,

    /// `weight × price/kg`, rounded half-up once.
    pub subtotal_cents: i64,
}

/// Prices an entered weight against a per-kilogram price.
///
/// ## Edge Cases
/// - `weight <= 0` is rejected; the product is simply not addable
pub fn price_weighed(price_per_kg: Money, weight: Weight) -> Result<WeighedPricing, ValidationError> {
    validate_weight(weight)?;

    Ok(WeighedPricing {
        unit_price_cents: price_per_kg.cents(),
        weight,
        subtotal_cents: price_per_kg.for_weight(weight).cents(),
    })
}

// =============================================================================
// Add Request
// =============================================================================

/// A validated request to add a product to the cart.
///
/// The variant must agree with the product's pricing mode; `add_item`
/// rejects mismatches (a weight entry for a plain product, etc.).
#[derive(Debug, Clone, PartialEq)]
pub enum AddToCart {
    /// Add `quantity` discrete units of a plain product.
    Unit { quantity: i64 },
    /// Add a weighed product at the entered weight.
    Weighed { weight: Weight },
    /// Add `quantity` units of a specific variant combination.
    Variant {
        selection: VariantSelection,
        quantity: i64,
    },
}

impl AddToCart {
    /// Shorthand for the scan path: one unit of a plain product.
    pub const fn one_unit() -> Self {
        AddToCart::Unit { quantity: 1 }
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// The kind-specific payload of a cart line.
///
/// A tagged union instead of optional metadata fields: each kind carries
/// exactly what it needs and nothing can be half-populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum LineKind {
    /// Discrete units.
    Plain { quantity: i64 },
    /// Scale reading; only replaceable wholesale via `set_weight`.
    Weighted { weight: Weight },
    /// Discrete units of one color/size combination.
    Variant {
        selection: VariantSelection,
        quantity: i64,
    },
}

/// A line on the ticket.
///
/// ## Price Freezing
/// `unit_price_cents` is captured when the line is created. Catalog price
/// changes never retroactively alter an open cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Unique id of this line within the cart (UUID v4).
    ///
    /// Distinct from `line_key`: duplicate plain/weighed lines share a
    /// key but never an id, so mutations always hit the intended line.
    pub line_id: String,

    /// Merge identity (see [`LineKey`]).
    pub line_key: LineKey,

    /// Product this line refers to.
    pub product_id: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Price in cents at time of adding (frozen).
    /// Per-kilogram for weighed lines, per-unit otherwise.
    pub unit_price_cents: i64,

    /// Kind-specific payload.
    pub kind: LineKind,

    /// When this line was added.
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Unit quantity for plain/variant lines; `None` for weighed lines.
    pub fn unit_quantity(&self) -> Option<i64> {
        match &self.kind {
            LineKind::Plain { quantity } | LineKind::Variant { quantity, .. } => Some(*quantity),
            LineKind::Weighted { .. } => None,
        }
    }

    /// The scale reading for weighed lines; `None` otherwise.
    pub fn weight(&self) -> Option<Weight> {
        match &self.kind {
            LineKind::Weighted { weight } => Some(*weight),
            _ => None,
        }
    }

    /// Checks if this line is sold by weight.
    pub fn is_weighted(&self) -> bool {
        matches!(self.kind, LineKind::Weighted { .. })
    }

    /// The quantity as it goes on the wire: whole units, or kilograms.
    pub fn wire_quantity(&self) -> f64 {
        match &self.kind {
            LineKind::Plain { quantity } | LineKind::Variant { quantity, .. } => *quantity as f64,
            LineKind::Weighted { weight } => weight.kilograms(),
        }
    }

    /// Calculates the line total (quantity × unit price).
    pub fn line_total_cents(&self) -> i64 {
        let unit_price = Money::from_cents(self.unit_price_cents);
        match &self.kind {
            LineKind::Plain { quantity } | LineKind::Variant { quantity, .. } => {
                unit_price.multiply_quantity(*quantity).cents()
            }
            LineKind::Weighted { weight } => unit_price.for_weight(*weight).cents(),
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The ticket being built.
///
/// ## Invariants
/// - Every line quantity is strictly positive; driving one to zero or
///   below removes the line, it is never stored non-positive
/// - At most one variant line per line key (adds merge); plain/weighed
///   adds always append
/// - Weighed line quantities only change via `set_weight`
/// - Totals are recomputed from the lines on every call, never cached
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Lines in insertion order (order is display-only, not priced).
    pub lines: Vec<CartLine>,

    /// When the cart was created/last cleared.
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds a product to the cart, returning the id of the touched line.
    ///
    /// ## Behavior
    /// - Variant product + existing line with the same key: quantities merge
    /// - Everything else: a new line is appended
    /// - The request kind must match the product's pricing mode
    pub fn add_item(&mut self, product: &Product, request: AddToCart) -> CoreResult<String> {
        match (&product.pricing, request) {
            (PricingMode::Plain, AddToCart::Unit { quantity }) => {
                validate_unit_quantity(quantity)?;
                self.push_line(
                    product,
                    LineKey::resolve(product, None)?,
                    product.price_cents,
                    LineKind::Plain { quantity },
                )
            }
            (PricingMode::Weighted, AddToCart::Weighed { weight }) => {
                let pricing = price_weighed(product.price(), weight)?;
                self.push_line(
                    product,
                    LineKey::resolve(product, None)?,
                    pricing.unit_price_cents,
                    LineKind::Weighted { weight },
                )
            }
            (PricingMode::Variants(_), AddToCart::Variant { selection, quantity }) => {
                validate_unit_quantity(quantity)?;
                let key = LineKey::resolve(product, Some(&selection))?;

                // Merge path: one line per variant key, quantities sum
                if let Some(line) = self.lines.iter_mut().find(|l| l.line_key == key) {
                    let current = line.unit_quantity().unwrap_or(0);
                    let merged = current + quantity;
                    if merged > MAX_LINE_QUANTITY {
                        return Err(CoreError::QuantityTooLarge {
                            requested: merged,
                            max: MAX_LINE_QUANTITY,
                        });
                    }
                    line.kind = LineKind::Variant {
                        selection,
                        quantity: merged,
                    };
                    return Ok(line.line_id.clone());
                }

                self.push_line(
                    product,
                    key,
                    product.price_cents,
                    LineKind::Variant { selection, quantity },
                )
            }
            _ => Err(CoreError::PricingModeMismatch {
                product_id: product.id.clone(),
            }),
        }
    }

    fn push_line(
        &mut self,
        product: &Product,
        line_key: LineKey,
        unit_price_cents: i64,
        kind: LineKind,
    ) -> CoreResult<String> {
        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        let line_id = Uuid::new_v4().to_string();
        self.lines.push(CartLine {
            line_id: line_id.clone(),
            line_key,
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price_cents,
            kind,
            added_at: Utc::now(),
        });
        Ok(line_id)
    }

    /// Applies a signed delta to a line's unit quantity.
    ///
    /// ## Behavior
    /// - Resulting quantity ≤ 0: the line is removed entirely
    /// - Weighed lines reject unit deltas; use `set_weight`
    pub fn update_quantity(&mut self, line_id: &str, delta: i64) -> CoreResult<()> {
        let index = self.index_of(line_id)?;
        let line = &mut self.lines[index];

        let quantity = match &mut line.kind {
            LineKind::Weighted { .. } => {
                return Err(CoreError::WeighedLineQuantity {
                    line_id: line_id.to_string(),
                })
            }
            LineKind::Plain { quantity } | LineKind::Variant { quantity, .. } => quantity,
        };

        let updated = *quantity + delta;
        if updated <= 0 {
            self.lines.remove(index);
            return Ok(());
        }
        if updated > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: updated,
                max: MAX_LINE_QUANTITY,
            });
        }

        *quantity = updated;
        Ok(())
    }

    /// Replaces the weight of a weighed line (full re-entry from the scale).
    pub fn set_weight(&mut self, line_id: &str, weight: Weight) -> CoreResult<()> {
        validate_weight(weight)?;

        let index = self.index_of(line_id)?;
        let line = &mut self.lines[index];

        match &mut line.kind {
            LineKind::Weighted { weight: current } => {
                *current = weight;
                Ok(())
            }
            _ => Err(CoreError::PricingModeMismatch {
                product_id: line.product_id.clone(),
            }),
        }
    }

    /// Removes a line unconditionally.
    pub fn remove_line(&mut self, line_id: &str) -> CoreResult<()> {
        let index = self.index_of(line_id)?;
        self.lines.remove(index);
        Ok(())
    }

    /// Clears all lines; used after a completed sale or explicit cancel.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }

    /// The ticket total: `Σ (quantity × unit price)` over all lines,
    /// recomputed from scratch on every call.
    pub fn total_cents(&self) -> i64 {
        self.lines.iter().map(|l| l.line_total_cents()).sum()
    }

    /// Number of distinct lines (display figure, not priced).
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Finds a line by id.
    pub fn line(&self, line_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.line_id == line_id)
    }

    /// Finds the first line with a given merge key (unique for variants).
    pub fn line_by_key(&self, key: &LineKey) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.line_key == key)
    }

    fn index_of(&self, line_id: &str) -> CoreResult<usize> {
        self.lines
            .iter()
            .position(|l| l.line_id == line_id)
            .ok_or_else(|| CoreError::LineNotFound(line_id.to_string()))
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
