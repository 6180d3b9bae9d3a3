//! # agora-core: Pure Cart & Pricing Logic for Agora
//!
//! This crate is the computational heart of the Agora storefront: cart
//! line items, voucher discounts, payment surcharges and the total
//! aggregator, as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Agora Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Storefront UI (external)                        │   │
//! │  │    product cards ──► cart page ──► checkout summary            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ add / remove / ± / voucher / method    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  agora-engine (session layer)                   │   │
//! │  │    CartSession, async shipping quote boundary                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ agora-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │   cart    │  │  voucher  │  │ checkout  │  │   │
//! │  │   │ Money,Rate│  │ LineItem  │  │VoucherBook│  │  totals   │  │   │
//! │  │   └───────────┘  │ Aggregate │  └───────────┘  └───────────┘  │   │
//! │  │                  └───────────┘                                 │   │
//! │  │   NO I/O • NO ASYNC • NO CLOCK IN TOTALS • PURE FUNCTIONS      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer-minor-unit money and basis-point rates
//! - [`types`] - Payment methods, addresses, shipping quotes, price pairs
//! - [`cart`] - The line-item store with its clamp invariants
//! - [`voucher`] - Coupon code resolution and discount application
//! - [`checkout`] - The pure total aggregator and free-shipping progress
//! - [`validation`] - Caller precondition checks
//! - [`error`] - Typed domain errors
//!
//! ## Design Principles
//!
//! 1. **Pure totals**: the payable total is a function of
//!    (items, discount, payment method, shipping cost) and nothing else
//! 2. **No I/O**: shipping quotes and voucher services live a layer up
//! 3. **Integer money**: all amounts in minor units (i64), rates in bps
//! 4. **All-or-nothing mutations**: a rejected call changes nothing
//!
//! ## Example
//!
//! ```rust
//! use agora_core::cart::{CartAggregate, NewLineItem};
//! use agora_core::checkout::compute_totals;
//! use agora_core::money::Money;
//! use agora_core::types::{PaymentMethod, PricePair};
//! use agora_core::voucher::VoucherBook;
//!
//! let mut cart = CartAggregate::new("USD");
//! cart.add_item(NewLineItem {
//!     product_id: "sku-1".into(),
//!     name: "Walnut desk organizer".into(),
//!     image_ref: None,
//!     price: PricePair::buyer_only(Money::from_minor(10_000)), // 100.00
//!     quantity: 5,
//!     stock_limit: 5,
//!     vendor_id: None,
//!     category: None,
//! }).unwrap();
//!
//! VoucherBook::with_standard_codes().apply(&mut cart, "SAVE10").unwrap();
//!
//! let totals = compute_totals(&cart, PaymentMethod::Escrow, Some(Money::from_minor(2_000)));
//! assert_eq!(totals.total.minor(), 48_350); // 450.00 + 13.50 + 20.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;
pub mod voucher;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{CartAggregate, CartSnapshot, LineItem, NewLineItem, QuantityChange};
pub use checkout::{compute_totals, free_shipping_progress, remaining_for_free_shipping, CheckoutTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Rate};
pub use types::{Address, PaymentMethod, PricePair, ShippingQuote};
pub use voucher::VoucherBook;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct line items in a single cart.
///
/// ## Business Reason
/// Prevents runaway carts; the storefront's mini-cart and checkout review
/// are designed around reasonable order sizes.
pub const MAX_CART_ITEMS: usize = 100;
