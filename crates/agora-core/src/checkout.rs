//! # Checkout Totals
//!
//! The total aggregator: one pure function from cart state + payment
//! method + last shipping quote to the final payable total.
//!
//! ## Folding Order (contract, do not reorder)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   1. subtotal   = Σ unit_price × quantity                               │
//! │   2. discounted = subtotal − subtotal·discount                          │
//! │   3. fee        = discounted · surcharge(payment_method)                │
//! │   4. total      = discounted + fee + shipping (0 while unquoted)        │
//! │                                                                         │
//! │   Discount BEFORE fee: the surcharge is a property of the amount        │
//! │   actually owed. Shipping is added LAST and is never discounted or      │
//! │   surcharged. Reordering changes the number whenever both a discount    │
//! │   and a fee are in play.                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `compute_totals` has no side effects and reads nothing but its
//! arguments, so snapshotting the same cart twice yields identical totals.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::CartAggregate;
use crate::money::{Money, Rate};
use crate::types::PaymentMethod;

// =============================================================================
// Checkout Totals
// =============================================================================

/// The derived price breakdown the rendering layer consumes.
///
/// Never persisted; recomputed after every mutation and on session restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutTotals {
    /// Pre-discount subtotal in buyer currency.
    pub subtotal: Money,
    /// The discount rate that was applied.
    pub discount: Rate,
    /// Discount in money terms (subtotal · discount).
    pub discount_amount: Money,
    /// Subtotal after discount, the base for the payment fee.
    pub discounted_subtotal: Money,
    /// Payment-method surcharge on the discounted subtotal.
    pub payment_fee: Money,
    /// Last known shipping cost; `None` until the first successful quote.
    pub shipping_cost: Option<Money>,
    /// Final payable total.
    pub total: Money,
    /// Seller-revenue passthrough (seller currency), for reporting.
    pub total_seller_price: Money,
    /// Σ quantity across all rows, for the cart badge.
    pub total_items: u64,
}

/// Computes the full checkout breakdown for the current cart state.
///
/// `shipping_cost` is whatever the shipping resolver last delivered
/// (possibly stale, possibly absent). Absent counts as zero in the total so
/// the rest of the breakdown stays displayable while a quote is pending.
pub fn compute_totals(
    cart: &CartAggregate,
    payment_method: PaymentMethod,
    shipping_cost: Option<Money>,
) -> CheckoutTotals {
    let subtotal = cart.subtotal();
    let discount = cart.discount();
    let discount_amount = subtotal.portion(discount);
    let discounted_subtotal = subtotal - discount_amount;
    let payment_fee = payment_method.fee_on(discounted_subtotal);
    let total = discounted_subtotal + payment_fee + shipping_cost.unwrap_or_else(Money::zero);

    CheckoutTotals {
        subtotal,
        discount,
        discount_amount,
        discounted_subtotal,
        payment_fee,
        shipping_cost,
        total,
        total_seller_price: cart.total_seller_price(),
        total_items: cart.total_quantity(),
    }
}

// =============================================================================
// Free Shipping Progress
// =============================================================================

/// Progress toward the free-shipping threshold, as a 0–100 percentage for
/// the progress bar. `None` threshold means the feature is inactive (0).
pub fn free_shipping_progress(subtotal: Money, threshold: Option<Money>) -> f64 {
    match threshold {
        Some(t) if t.minor() > 0 => {
            let ratio = subtotal.minor() as f64 / t.minor() as f64 * 100.0;
            ratio.clamp(0.0, 100.0)
        }
        // a non-positive threshold is vacuously met
        Some(_) => 100.0,
        None => 0.0,
    }
}

/// How much more the buyer must add to earn free shipping. Zero once the
/// threshold is met or when the feature is inactive.
pub fn remaining_for_free_shipping(subtotal: Money, threshold: Option<Money>) -> Money {
    match threshold {
        Some(t) if t > subtotal => t - subtotal,
        _ => Money::zero(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::NewLineItem;
    use crate::types::PricePair;
    use crate::voucher::VoucherBook;

    fn cart_with_subtotal_500() -> CartAggregate {
        // unit 100.00 × qty 5 = 500.00
        let mut cart = CartAggregate::new("USD");
        cart.add_item(NewLineItem {
            product_id: "1".to_string(),
            name: "Product 1".to_string(),
            image_ref: None,
            price: PricePair::buyer_only(Money::from_minor(10_000)),
            quantity: 5,
            stock_limit: 5,
            vendor_id: None,
            category: None,
        })
        .unwrap();
        cart
    }

    #[test]
    fn test_worked_checkout_scenario() {
        // subtotal 500.00, 10% voucher, escrow (3%), shipping 20.00
        // → discounted 450.00, fee 13.50, total 483.50
        let mut cart = cart_with_subtotal_500();
        VoucherBook::with_standard_codes()
            .apply(&mut cart, "SAVE10")
            .unwrap();

        let totals = compute_totals(
            &cart,
            PaymentMethod::Escrow,
            Some(Money::from_minor(2_000)),
        );

        assert_eq!(totals.subtotal.minor(), 50_000);
        assert_eq!(totals.discount_amount.minor(), 5_000);
        assert_eq!(totals.discounted_subtotal.minor(), 45_000);
        assert_eq!(totals.payment_fee.minor(), 1_350);
        assert_eq!(totals.total.minor(), 48_350);
    }

    #[test]
    fn test_discount_applied_before_fee() {
        // subtotal × 0.9 × 1.02, not subtotal × 1.02 × 0.9 with fee on the
        // undiscounted amount: fee must be 2% of 450.00 = 9.00
        let mut cart = cart_with_subtotal_500();
        VoucherBook::with_standard_codes()
            .apply(&mut cart, "SAVE10")
            .unwrap();

        let totals = compute_totals(&cart, PaymentMethod::Crypto, None);

        assert_eq!(totals.payment_fee.minor(), 900);
        assert_ne!(totals.payment_fee, totals.subtotal.portion(Rate::from_bps(200)));
        assert_eq!(totals.total.minor(), 45_900);
    }

    #[test]
    fn test_shipping_added_last_and_never_discounted() {
        let mut cart = cart_with_subtotal_500();
        VoucherBook::with_standard_codes()
            .apply(&mut cart, "SAVE10")
            .unwrap();

        let without = compute_totals(&cart, PaymentMethod::Fiat, None);
        let with = compute_totals(&cart, PaymentMethod::Fiat, Some(Money::from_minor(2_000)));

        // shipping enters the total at face value
        assert_eq!(with.total - without.total, Money::from_minor(2_000));
    }

    #[test]
    fn test_missing_quote_counts_as_zero() {
        let cart = cart_with_subtotal_500();
        let totals = compute_totals(&cart, PaymentMethod::Fiat, None);

        assert_eq!(totals.shipping_cost, None);
        assert_eq!(totals.total.minor(), 50_000);
    }

    #[test]
    fn test_totals_are_deterministic() {
        let mut cart = cart_with_subtotal_500();
        VoucherBook::with_standard_codes()
            .apply(&mut cart, "SAVE10")
            .unwrap();

        let a = compute_totals(&cart, PaymentMethod::Escrow, Some(Money::from_minor(2_000)));
        let b = compute_totals(&cart, PaymentMethod::Escrow, Some(Money::from_minor(2_000)));

        // pure function: exact equality, not epsilon equality
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_cart_totals() {
        let cart = CartAggregate::new("USD");
        let totals = compute_totals(&cart, PaymentMethod::Escrow, None);

        assert!(totals.subtotal.is_zero());
        assert!(totals.payment_fee.is_zero());
        assert!(totals.total.is_zero());
        assert_eq!(totals.total_items, 0);
    }

    #[test]
    fn test_free_shipping_progress() {
        // threshold 1000.00, subtotal 250.00 → 25%, remaining 750.00
        let subtotal = Money::from_minor(25_000);
        let threshold = Some(Money::from_minor(100_000));

        assert_eq!(free_shipping_progress(subtotal, threshold), 25.0);
        assert_eq!(
            remaining_for_free_shipping(subtotal, threshold).minor(),
            75_000
        );
    }

    #[test]
    fn test_free_shipping_caps_at_100() {
        let subtotal = Money::from_minor(250_000);
        let threshold = Some(Money::from_minor(100_000));

        assert_eq!(free_shipping_progress(subtotal, threshold), 100.0);
        assert!(remaining_for_free_shipping(subtotal, threshold).is_zero());
    }

    #[test]
    fn test_free_shipping_inactive_without_threshold() {
        let subtotal = Money::from_minor(25_000);
        assert_eq!(free_shipping_progress(subtotal, None), 0.0);
        assert!(remaining_for_free_shipping(subtotal, None).is_zero());
    }
}
