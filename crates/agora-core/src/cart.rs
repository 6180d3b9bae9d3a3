//! # Cart Aggregate
//!
//! The line-item store: an ordered, id-unique collection of cart entries
//! with stock-clamped quantity mutation.
//!
//! ## Invariants
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cart Invariants                                    │
//! │                                                                         │
//! │  1. quantity ∈ [1, stock_limit] for every line item, always            │
//! │     - computed quantity below 1  → clamped to 1                        │
//! │     - computed quantity above stock_limit → clamped to stock_limit     │
//! │  2. No zero-quantity rows: removal is explicit (remove_item), never    │
//! │     a side effect of decrementing                                      │
//! │  3. Items unique by product_id; re-adding an id raises quantity        │
//! │  4. Insertion order is display order                                   │
//! │  5. clear() resets items, discount and coupon code atomically          │
//! │                                                                         │
//! │  Every mutation is all-or-nothing: a rejected call leaves the          │
//! │  aggregate exactly as it was.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::{Money, Rate};
use crate::types::PricePair;
use crate::validation;
use crate::MAX_CART_ITEMS;

// =============================================================================
// Line Item
// =============================================================================

/// One row of the cart.
///
/// Prices are frozen at add-time: if the listing changes afterwards, the
/// cart keeps displaying and totalling what the buyer saw when they added
/// it. Reconciliation against live prices happens at order submission,
/// outside this engine.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Product identifier, unique within the cart. Opaque to the engine.
    pub product_id: String,

    /// Display name at time of adding (frozen).
    pub name: String,

    /// Display image reference; opaque passthrough for the rendering layer.
    pub image_ref: Option<String>,

    /// Buyer/seller unit prices at time of adding (frozen).
    pub price: PricePair,

    /// Quantity in cart. Always within `[1, stock_limit]`.
    pub quantity: u32,

    /// Stock ceiling supplied at add-time. Never mutated by the engine.
    pub stock_limit: u32,

    /// Vendor, carried through for downstream analytics.
    pub vendor_id: Option<String>,

    /// Category, carried through for downstream analytics.
    pub category: Option<String>,

    /// When this item was added (price-freeze audit metadata).
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl LineItem {
    /// Line total in buyer currency (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price.buyer.times(self.quantity)
    }

    /// Line total in seller currency, when the listing carries one.
    #[inline]
    pub fn seller_line_total(&self) -> Option<Money> {
        self.price.seller.map(|p| p.times(self.quantity))
    }
}

/// Add-time payload for a new line item.
///
/// Everything except `quantity` is frozen verbatim onto the resulting
/// [`LineItem`]; `quantity` goes through the stock clamp first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLineItem {
    pub product_id: String,
    pub name: String,
    pub image_ref: Option<String>,
    pub price: PricePair,
    pub quantity: u32,
    pub stock_limit: u32,
    pub vendor_id: Option<String>,
    pub category: Option<String>,
}

/// Result of a quantity-affecting mutation.
///
/// `clamped` is the optional non-fatal "stock exceeded" signal: the write
/// succeeded, but at a different quantity than requested. The UI may show
/// a hint; nothing in the engine treats it as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityChange {
    /// The quantity now stored on the line item.
    pub quantity: u32,
    /// Whether the requested quantity was adjusted to fit `[1, stock_limit]`.
    pub clamped: bool,
}

/// The clamp every quantity write goes through.
///
/// `stock_limit` is at least 1 here (validated at add-time), so the range
/// is always well-formed.
#[inline]
fn clamp_quantity(requested: u32, stock_limit: u32) -> QuantityChange {
    let quantity = requested.clamp(1, stock_limit);
    QuantityChange {
        quantity,
        clamped: quantity != requested,
    }
}

// =============================================================================
// Cart Aggregate
// =============================================================================

/// The cart: ordered line items plus the whole-cart discount state.
///
/// Fields are private so every write path runs the invariants above; the
/// rendering layer reads through [`CartAggregate::items`] and the checkout
/// totals (see [`crate::checkout`]).
#[derive(Debug, Clone)]
pub struct CartAggregate {
    items: Vec<LineItem>,
    /// Whole-cart discount. Only ever set together with `coupon_code`
    /// through the voucher path ([`crate::voucher`]).
    discount: Rate,
    coupon_code: Option<String>,
    /// Buyer-facing currency code for all buyer amounts in this cart.
    currency: String,
    /// Seller currency for the seller-price passthrough, when known.
    seller_currency: Option<String>,
}

impl CartAggregate {
    /// Creates an empty cart denominated in the given buyer currency.
    pub fn new(currency: impl Into<String>) -> Self {
        CartAggregate {
            items: Vec::new(),
            discount: Rate::zero(),
            coupon_code: None,
            currency: currency.into(),
            seller_currency: None,
        }
    }

    /// Sets the seller currency used by the seller-price passthrough.
    pub fn set_seller_currency(&mut self, currency: impl Into<String>) {
        self.seller_currency = Some(currency.into());
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Adds a product to the cart, or raises its quantity if already present.
    ///
    /// ## Behavior
    /// - Existing id: `quantity = clamp(existing + new.quantity, 1, stock_limit)`
    ///   (the stock limit of the existing row wins; it was frozen at first add)
    /// - New id: inserted at the end with `quantity = clamp(new.quantity, 1, stock_limit)`
    ///
    /// Rejects (leaving the cart untouched) on empty/overlong product id,
    /// negative unit price, zero stock limit, or a full cart.
    pub fn add_item(&mut self, new: NewLineItem) -> CoreResult<QuantityChange> {
        validation::validate_product_id(&new.product_id)?;
        validation::validate_unit_price(new.price)?;

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == new.product_id) {
            let change = clamp_quantity(item.quantity.saturating_add(new.quantity), item.stock_limit);
            item.quantity = change.quantity;
            return Ok(change);
        }

        validation::validate_stock_limit(new.stock_limit)?;
        if self.items.len() >= MAX_CART_ITEMS {
            return Err(crate::error::CoreError::CartTooLarge { max: MAX_CART_ITEMS });
        }

        let change = clamp_quantity(new.quantity, new.stock_limit);
        self.items.push(LineItem {
            product_id: new.product_id,
            name: new.name,
            image_ref: new.image_ref,
            price: new.price,
            quantity: change.quantity,
            stock_limit: new.stock_limit,
            vendor_id: new.vendor_id,
            category: new.category,
            added_at: Utc::now(),
        });
        Ok(change)
    }

    /// Removes a line item. Absent id is a no-op, not an error.
    ///
    /// Returns whether a row was actually removed.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() != before
    }

    /// Sets an item's quantity, clamped to `[1, stock_limit]`.
    ///
    /// Never creates a row and never deletes one: `amount = 0` clamps to 1
    /// rather than removing, mirroring the +/- controls where removal is a
    /// separate explicit action. Absent id is a no-op (`None`).
    pub fn set_quantity(&mut self, product_id: &str, amount: u32) -> Option<QuantityChange> {
        let item = self.items.iter_mut().find(|i| i.product_id == product_id)?;
        let change = clamp_quantity(amount, item.stock_limit);
        item.quantity = change.quantity;
        Some(change)
    }

    /// Adjusts an item's quantity by a signed delta (the +/- controls).
    ///
    /// A delta that would take the quantity to 0 or below clamps to 1; a
    /// caller that means "remove" must call [`CartAggregate::remove_item`].
    pub fn change_by_delta(&mut self, product_id: &str, delta: i64) -> Option<QuantityChange> {
        let current = self
            .items
            .iter()
            .find(|i| i.product_id == product_id)
            .map(|i| i.quantity)?;
        let target = (current as i64).saturating_add(delta).clamp(0, u32::MAX as i64) as u32;
        self.set_quantity(product_id, target)
    }

    /// Empties the cart and resets discount state, atomically.
    pub fn clear(&mut self) {
        self.items.clear();
        self.discount = Rate::zero();
        self.coupon_code = None;
    }

    /// Sets discount and coupon code together. Crate-internal: the only
    /// caller is the voucher applier, which has already validated the code.
    pub(crate) fn set_discount(&mut self, discount: Rate, coupon_code: String) {
        self.discount = discount;
        self.coupon_code = Some(coupon_code);
    }

    /// Drops any applied voucher.
    pub fn clear_discount(&mut self) {
        self.discount = Rate::zero();
        self.coupon_code = None;
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Line items in display (insertion) order.
    #[inline]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Currently applied whole-cart discount.
    #[inline]
    pub fn discount(&self) -> Rate {
        self.discount
    }

    /// The voucher code behind the current discount, if any.
    #[inline]
    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon_code.as_deref()
    }

    /// Buyer currency code.
    #[inline]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Seller currency code, when set.
    #[inline]
    pub fn seller_currency(&self) -> Option<&str> {
        self.seller_currency.as_deref()
    }

    /// Pre-discount subtotal: Σ buyer unit price × quantity.
    pub fn subtotal(&self) -> Money {
        self.items
            .iter()
            .fold(Money::zero(), |acc, i| acc + i.line_total())
    }

    /// Seller-revenue passthrough: Σ seller unit price × quantity over the
    /// items that carry one. Never part of the buyer total.
    pub fn total_seller_price(&self) -> Money {
        self.items
            .iter()
            .filter_map(|i| i.seller_line_total())
            .fold(Money::zero(), |acc, t| acc + t)
    }

    /// Total unit count across all rows.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| i.quantity as u64).sum()
    }

    /// Number of distinct rows.
    #[inline]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Snapshot (session restore)
// =============================================================================

/// The persisted form of a cart, for session restore.
///
/// Only inputs are persisted: items, discount, coupon code, currencies.
/// Derived checkout values (subtotal, fee, total, shipping) are recomputed
/// on load and never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub items: Vec<LineItem>,
    /// Discount in basis points.
    pub discount: Rate,
    pub coupon_code: Option<String>,
    pub currency: String,
    pub seller_currency: Option<String>,
}

impl From<&CartAggregate> for CartSnapshot {
    fn from(cart: &CartAggregate) -> Self {
        CartSnapshot {
            items: cart.items.clone(),
            discount: cart.discount,
            coupon_code: cart.coupon_code.clone(),
            currency: cart.currency.clone(),
            seller_currency: cart.seller_currency.clone(),
        }
    }
}

impl CartAggregate {
    /// Rebuilds an aggregate from a persisted snapshot.
    ///
    /// Quantities are re-clamped on the way in: a snapshot written by an
    /// older session (or tampered with in local storage) must not be able
    /// to smuggle in an out-of-range row.
    pub fn restore(snapshot: CartSnapshot) -> Self {
        let mut items = snapshot.items;
        items.retain(|i| i.stock_limit > 0);
        for item in &mut items {
            item.quantity = clamp_quantity(item.quantity, item.stock_limit).quantity;
        }
        CartAggregate {
            items,
            discount: snapshot.discount,
            coupon_code: snapshot.coupon_code,
            currency: snapshot.currency,
            seller_currency: snapshot.seller_currency,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
