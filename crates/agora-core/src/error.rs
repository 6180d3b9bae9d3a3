//! # Error Types
//!
//! Domain error types for agora-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  agora-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations (bad voucher, …)      │
//! │  └── ValidationError  - Caller precondition failures                   │
//! │                                                                         │
//! │  agora-engine errors (separate crate)                                  │
//! │  └── EngineError      - Shipping quote failures + Core passthrough     │
//! │                                                                         │
//! │  Recoverable by contract: a failed operation leaves the aggregate      │
//! │  exactly as it was. There are no partially-applied mutations.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, voucher code, …)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations in the cart & pricing engine.
///
/// All of these are recoverable: the UI surfaces a message and the
/// aggregate is untouched.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The voucher code is not in the voucher book.
    ///
    /// ## When This Occurs
    /// - User typos a code, or uses an expired/never-issued one
    ///
    /// The aggregate's `discount` and `coupon_code` are left byte-for-byte
    /// unchanged; the UI re-prompts inline.
    #[error("Voucher code not recognized: {0}")]
    InvalidVoucher(String),

    /// Cart has reached the maximum number of distinct line items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Caller precondition failure (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Caller precondition failures.
///
/// These are programmer errors on the calling side (a negative unit price,
/// an empty product id), caught before any mutation runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// A monetary amount that must be non-negative was negative.
    #[error("{field} must not be negative")]
    NegativeAmount { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., voucher code with whitespace).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
