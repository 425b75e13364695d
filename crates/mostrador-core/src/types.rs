//! # Domain Types
//!
//! Core domain types used throughout Mostrador POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  PricingMode    │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  Plain          │   │  Cash           │       │
//! │  │  name           │   │  Weighted       │   │  Card           │       │
//! │  │  price_cents    │   │  Variants(..)   │   │  Transfer       │       │
//! │  │  stock          │   └─────────────────┘   │  Wallet         │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────┐                         │
//! │  │     Weight      │   │  VariantSelection   │                         │
//! │  │  ─────────────  │   │  ─────────────────  │                         │
//! │  │  grams (i64)    │   │  color, size        │                         │
//! │  └─────────────────┘   └─────────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The product carries a *pricing mode* instead of a free-form attribute
//! bag: a plain unit product, a weighed product (sold by the kilogram),
//! or an apparel-style product with a color/size variant matrix. Code
//! dispatches on the enum, never by probing optional fields.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Weight
// =============================================================================

/// A weighed quantity, stored as integer grams.
///
/// ## Why Grams?
/// Same reasoning as integer cents for money: the cart re-derives the
/// ticket total on every mutation, so any float representation of
/// "0.3 kg" would leak binary-fraction noise into totals. Scales report
/// grams natively anyway.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Weight(i64);

impl Weight {
    /// Creates a weight from integer grams.
    #[inline]
    pub const fn from_grams(grams: i64) -> Self {
        Weight(grams)
    }

    /// Returns the weight in grams.
    #[inline]
    pub const fn grams(&self) -> i64 {
        self.0
    }

    /// Returns the weight in kilograms (display / wire only, never math).
    #[inline]
    pub fn kilograms(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Checks if the weight is strictly positive.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03} kg", self.0 / 1000, (self.0 % 1000).abs())
    }
}

// =============================================================================
// Variant Selection & Matrix
// =============================================================================

/// A fully-resolved variant choice (both axes picked).
///
/// Partial selections never reach the core: the selection flow in the
/// register crate only produces this type once color AND size are chosen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VariantSelection {
    pub color: String,
    pub size: String,
}

impl VariantSelection {
    pub fn new(color: impl Into<String>, size: impl Into<String>) -> Self {
        VariantSelection {
            color: color.into(),
            size: size.into(),
        }
    }

    /// The `"color-size"` fragment used in line keys and stock maps.
    pub fn key_fragment(&self) -> String {
        format!("{}-{}", self.color, self.size)
    }
}

/// The variant axes and per-combination stock of an apparel product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VariantMatrix {
    /// Available colors, in display order.
    pub colors: Vec<String>,

    /// Available sizes, in display order.
    pub sizes: Vec<String>,

    /// Stock per `"color-size"` combination. Missing key = zero stock.
    pub stock: HashMap<String, i64>,
}

impl VariantMatrix {
    /// Stock available for a specific combination (0 if unknown).
    pub fn stock_for(&self, selection: &VariantSelection) -> i64 {
        self.stock
            .get(&selection.key_fragment())
            .copied()
            .unwrap_or(0)
    }

    /// Checks the selection names axes this product actually offers.
    pub fn offers(&self, selection: &VariantSelection) -> bool {
        self.colors.contains(&selection.color) && self.sizes.contains(&selection.size)
    }
}

// =============================================================================
// Pricing Mode
// =============================================================================

/// How a product is priced and added to a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    /// Discrete units at a fixed price (kiosk goods, scanned barcodes).
    Plain,
    /// Sold by weight; `price_cents` is the per-kilogram price.
    Weighted,
    /// Apparel-style: a color/size must be selected before pricing.
    Variants(VariantMatrix),
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// Read-only to this core: the catalog service owns it, the cart only
/// snapshots the fields it needs at add time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the operator and on the ticket.
    pub name: String,

    /// Price in cents. For weighed products this is the per-kilogram price.
    pub price_cents: i64,

    /// Current stock: units for plain products, grams for weighed products.
    /// Variant products track stock per combination in the matrix instead.
    pub stock: i64,

    /// How this product is priced and added to a cart.
    pub pricing: PricingMode,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks if this product is sold by weight.
    pub fn is_weighted(&self) -> bool {
        matches!(self.pricing, PricingMode::Weighted)
    }

    /// Checks if this product requires a variant selection.
    pub fn has_variants(&self) -> bool {
        matches!(self.pricing, PricingMode::Variants(_))
    }

    /// Stock for a variant combination; `None` when the product has no variants.
    pub fn variant_stock(&self, selection: &VariantSelection) -> Option<i64> {
        match &self.pricing {
            PricingMode::Variants(matrix) => Some(matrix.stock_for(selection)),
            _ => None,
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale is tendered.
///
/// Wire names follow the sales-service contract (`"CASH"`, `"CARD"`, ...).
/// Only `Cash` has core-side arithmetic (tender/change); the others are
/// settled by external integrations behind the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Physical cash; requires tendered >= total and computes change.
    Cash,
    /// Card on an external terminal.
    Card,
    /// Bank transfer.
    Transfer,
    /// QR / wallet payment via the payment gateway.
    Wallet,
}

impl PaymentMethod {
    /// Checks if this method moves physical cash through the drawer.
    #[inline]
    pub const fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
