//! # Engine Error Type
//!
//! Errors surfaced by the session layer.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  agora-core CoreError ───────────────┐                                  │
//! │  (bad voucher, full cart, …)         ├──► EngineError ──► UI message    │
//! │  shipping transport/timeout failure ─┘                                  │
//! │                                                                         │
//! │  Everything here is recoverable: a failed quote keeps the last known   │
//! │  shipping cost, a failed mutation leaves the aggregate unchanged.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use thiserror::Error;

use agora_core::CoreError;

/// Errors returned by [`crate::session::CartSession`] operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The external shipping quote call failed.
    ///
    /// Recoverable: the session keeps the last known shipping cost, totals
    /// stay computable, and the UI shows a transient notice.
    #[error("Shipping quote failed: {reason}")]
    ShippingQuoteFailure { reason: String },

    /// The external shipping quote call exceeded the engine's deadline.
    ///
    /// Same recovery as [`EngineError::ShippingQuoteFailure`]; split out so
    /// the UI can word the notice differently.
    #[error("Shipping quote timed out after {0:?}")]
    ShippingQuoteTimeout(Duration),

    /// Domain error from the pure core.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Convenience type alias for Results with EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
