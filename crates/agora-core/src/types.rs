//! # Domain Types
//!
//! Shared domain types for the cart & pricing engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ PaymentMethod   │   │    Address      │   │ ShippingQuote   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Fiat    (0%)   │   │  country        │   │  shipping_cost  │       │
//! │  │  Crypto  (2%)   │   │  state          │   │  (minor units)  │       │
//! │  │  Escrow  (3%)   │   │  city           │   └─────────────────┘       │
//! │  └─────────────────┘   │  postal_code    │                             │
//! │                        └─────────────────┘   ┌─────────────────┐       │
//! │                                              │   PricePair     │       │
//! │                                              │  buyer/seller   │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, Rate};

// =============================================================================
// Payment Method
// =============================================================================

/// How the buyer intends to settle the order.
///
/// A closed set by design: the storefront's payment selector offers exactly
/// these, and each carries a fixed surcharge. Extending means adding a
/// variant and a row in [`PaymentMethod::surcharge_rate`]; there is no
/// open-ended method string anywhere in the engine, so an "unknown method"
/// cannot reach the fee calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Card / bank transfer. No surcharge.
    Fiat,
    /// Cryptocurrency settlement. 2% processing surcharge.
    Crypto,
    /// Escrow-held payment. 3% escrow service surcharge.
    Escrow,
}

impl PaymentMethod {
    /// The surcharge applied to the discounted subtotal for this method.
    ///
    /// Pure table lookup; switching methods re-derives the fee without
    /// touching any other checkout input.
    #[inline]
    pub const fn surcharge_rate(&self) -> Rate {
        match self {
            PaymentMethod::Fiat => Rate::zero(),
            PaymentMethod::Crypto => Rate::from_bps(200),
            PaymentMethod::Escrow => Rate::from_bps(300),
        }
    }

    /// Computes the payment fee on an already-discounted subtotal.
    ///
    /// The fee is a property of the amount actually owed before shipping,
    /// so discount is applied first and shipping never enters here.
    #[inline]
    pub fn fee_on(&self, discounted_subtotal: Money) -> Money {
        discounted_subtotal.portion(self.surcharge_rate())
    }
}

impl Default for PaymentMethod {
    /// The storefront preselects fiat.
    fn default() -> Self {
        PaymentMethod::Fiat
    }
}

// =============================================================================
// Shipping
// =============================================================================

/// Destination address, as forwarded to the external shipping quote service.
///
/// Opaque to the engine: it never inspects these fields, it only round-trips
/// them in the quote request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub country: String,
    pub state: String,
    pub city: String,
    pub postal_code: String,
}

/// A successful response from the external shipping quote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShippingQuote {
    /// Quoted shipping cost in minor units of the buyer currency.
    pub shipping_cost: Money,
}

// =============================================================================
// Price Pair
// =============================================================================

/// The two parallel prices a marketplace listing carries.
///
/// The buyer price is what all cart arithmetic runs on. The seller price
/// (in the seller's own currency, tracked per aggregate) is carried through
/// untouched so downstream seller-revenue reporting can sum it; it is
/// never folded into the buyer total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricePair {
    /// Unit price in the buyer currency. Non-negative by precondition.
    pub buyer: Money,
    /// Unit price in the seller currency, if the listing exposes it.
    pub seller: Option<Money>,
}

impl PricePair {
    /// A buyer-only price, for listings without a seller-side quotation.
    #[inline]
    pub const fn buyer_only(buyer: Money) -> Self {
        PricePair { buyer, seller: None }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surcharge_table() {
        assert_eq!(PaymentMethod::Fiat.surcharge_rate().bps(), 0);
        assert_eq!(PaymentMethod::Crypto.surcharge_rate().bps(), 200);
        assert_eq!(PaymentMethod::Escrow.surcharge_rate().bps(), 300);
    }

    #[test]
    fn test_fee_on_discounted_subtotal() {
        // 450.00 at 3% escrow = 13.50
        let discounted = Money::from_minor(45_000);
        assert_eq!(PaymentMethod::Escrow.fee_on(discounted).minor(), 1350);
        assert_eq!(PaymentMethod::Fiat.fee_on(discounted).minor(), 0);
    }

    #[test]
    fn test_payment_method_default_is_fiat() {
        assert_eq!(PaymentMethod::default(), PaymentMethod::Fiat);
    }

    #[test]
    fn test_payment_method_wire_format() {
        let json = serde_json::to_string(&PaymentMethod::Crypto).unwrap();
        assert_eq!(json, "\"crypto\"");
    }
}
