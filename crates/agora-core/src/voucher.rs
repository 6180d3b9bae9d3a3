//! # Voucher Applier
//!
//! Resolves coupon codes to whole-cart discount percentages and folds them
//! into the aggregate.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  apply("SAVE10")                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  book lookup ── hit ──► discount + coupon_code set TOGETHER            │
//! │       │                                                                 │
//! │       └── miss ──► InvalidVoucher, aggregate byte-for-byte unchanged   │
//! │                                                                         │
//! │  A discount is only ever set through this path, so an unvalidated      │
//! │  percentage can never land on the cart.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The book here is the in-memory table the storefront seeds at startup; a
//! remote voucher service would populate the same table and is an external
//! collaborator.

use std::collections::HashMap;

use crate::cart::CartAggregate;
use crate::error::{CoreError, CoreResult};
use crate::money::Rate;
use crate::validation;

/// Known voucher codes and their discount rates.
#[derive(Debug, Clone, Default)]
pub struct VoucherBook {
    codes: HashMap<String, Rate>,
}

impl VoucherBook {
    /// An empty book. Every code is invalid until registered.
    pub fn new() -> Self {
        VoucherBook::default()
    }

    /// The storefront's stock campaign codes.
    pub fn with_standard_codes() -> Self {
        let mut book = VoucherBook::new();
        book.register("SAVE10", Rate::from_percent(10));
        book
    }

    /// Registers (or replaces) a code.
    pub fn register(&mut self, code: impl Into<String>, discount: Rate) {
        self.codes.insert(code.into(), discount);
    }

    /// Looks a code up without touching any cart.
    pub fn lookup(&self, code: &str) -> Option<Rate> {
        self.codes.get(code.trim()).copied()
    }

    /// Validates `code` and, on a hit, sets the cart's discount and coupon
    /// code together. On a miss the cart is left untouched and the caller
    /// gets [`CoreError::InvalidVoucher`] to surface inline.
    pub fn apply(&self, cart: &mut CartAggregate, code: &str) -> CoreResult<Rate> {
        validation::validate_voucher_code(code)?;

        let code = code.trim();
        match self.lookup(code) {
            Some(discount) => {
                cart.set_discount(discount, code.to_string());
                Ok(discount)
            }
            None => Err(CoreError::InvalidVoucher(code.to_string())),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
