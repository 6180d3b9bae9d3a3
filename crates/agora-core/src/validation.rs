//! # Validation Module
//!
//! Caller precondition checks for the cart engine.
//!
//! ## Where This Sits
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront UI                                                │
//! │  ├── form-level checks, immediate feedback                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (runs before any aggregate mutation)             │
//! │  ├── preconditions the engine treats as programmer errors:             │
//! │  │   negative prices, empty ids, zero stock ceilings                   │
//! │  └── rejected calls leave the aggregate untouched                      │
//! │                                                                         │
//! │  Quantity bounds are NOT validated here: out-of-range quantities        │
//! │  are clamped, not rejected, to match the +/- control UX.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::PricePair;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Upper bound on product id length; anything longer is a wiring bug.
const MAX_PRODUCT_ID_LEN: usize = 64;

/// Upper bound on voucher code length.
const MAX_VOUCHER_CODE_LEN: usize = 32;

/// Validates a product identifier.
///
/// Ids are opaque keys minted by the catalog; the engine only insists they
/// are present and of sane length.
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: "productId".to_string(),
        });
    }

    if id.len() > MAX_PRODUCT_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "productId".to_string(),
            max: MAX_PRODUCT_ID_LEN,
        });
    }

    Ok(())
}

/// Validates an add-time price pair.
///
/// A negative unit price can never come from the catalog; it is an
/// `InvariantViolation`-class programmer error. Debug builds assert,
/// release builds reject with a typed error so the aggregate stays intact.
pub fn validate_unit_price(price: PricePair) -> ValidationResult<()> {
    debug_assert!(!price.buyer.is_negative(), "negative buyer unit price");

    if price.buyer.is_negative() {
        return Err(ValidationError::NegativeAmount {
            field: "unitPrice".to_string(),
        });
    }

    if let Some(seller) = price.seller {
        debug_assert!(!seller.is_negative(), "negative seller unit price");
        if seller.is_negative() {
            return Err(ValidationError::NegativeAmount {
                field: "sellerUnitPrice".to_string(),
            });
        }
    }

    Ok(())
}

/// Validates a stock ceiling at add-time.
///
/// The quantity invariant is `1 <= quantity <= stock_limit`, which is
/// unsatisfiable for a zero ceiling: an out-of-stock listing must not be
/// addable in the first place.
pub fn validate_stock_limit(stock_limit: u32) -> ValidationResult<()> {
    if stock_limit == 0 {
        return Err(ValidationError::OutOfRange {
            field: "stockLimit".to_string(),
            min: 1,
            max: u32::MAX as i64,
        });
    }
    Ok(())
}

/// Validates the shape of a voucher code before lookup.
pub fn validate_voucher_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "voucherCode".to_string(),
        });
    }

    if code.len() > MAX_VOUCHER_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "voucherCode".to_string(),
            max: MAX_VOUCHER_CODE_LEN,
        });
    }

    if code.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "voucherCode".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
