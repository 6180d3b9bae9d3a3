//! # Shipping Quote Boundary
//!
//! The one asynchronous edge of the engine: quoting shipping against an
//! external service.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  calculateShipping({ methodId, address, cartTotal })                    │
//! │        │                                                                │
//! │        ├── Ok(quote)      → session applies it (if still the newest    │
//! │        │                    request; see session.rs seq guard)         │
//! │        ├── Err(transport) → ShippingQuoteFailure, last value retained  │
//! │        └── > 10 s         → ShippingQuoteTimeout, last value retained  │
//! │                                                                         │
//! │  While a request is pending the previous cost stays visible            │
//! │  (stale-but-present) so the displayed total does not flicker.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::timeout;
use tracing::warn;

use agora_core::{Address, Money, ShippingQuote};

use crate::error::{EngineError, EngineResult};

/// Deadline for one quote attempt. There is no automatic retry; the next
/// subtotal-changing mutation naturally re-triggers a quote.
pub const QUOTE_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// Quoter Seam
// =============================================================================

/// What the engine sends to the external quote service.
///
/// `cart_total` is the discounted subtotal: flat shipping tiers are
/// commonly a function of order value, and the order value is what the
/// buyer actually owes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingQuoteRequest {
    pub method_id: String,
    pub address: Address,
    pub cart_total: Money,
}

/// Transport-level failure from a quoter implementation.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct QuoteError(pub String);

/// The external shipping quote service, as the engine sees it.
///
/// Implementations own transport, auth and serialization; the engine only
/// cares about the request/response shapes and that failures come back as
/// [`QuoteError`] rather than panics.
#[async_trait]
pub trait ShippingQuoter: Send + Sync {
    async fn calculate_shipping(
        &self,
        request: ShippingQuoteRequest,
    ) -> Result<ShippingQuote, QuoteError>;
}

/// Runs one quote attempt under the engine deadline, normalizing both
/// failure shapes into [`EngineError`].
pub(crate) async fn fetch_quote<Q: ShippingQuoter + ?Sized>(
    quoter: &Q,
    request: ShippingQuoteRequest,
) -> EngineResult<ShippingQuote> {
    match timeout(QUOTE_TIMEOUT, quoter.calculate_shipping(request)).await {
        Ok(Ok(quote)) => Ok(quote),
        Ok(Err(err)) => {
            warn!(error = %err, "shipping quote failed");
            Err(EngineError::ShippingQuoteFailure {
                reason: err.to_string(),
            })
        }
        Err(_) => {
            warn!(deadline = ?QUOTE_TIMEOUT, "shipping quote timed out");
            Err(EngineError::ShippingQuoteTimeout(QUOTE_TIMEOUT))
        }
    }
}

// =============================================================================
// Flat-Rate Quoter
// =============================================================================

/// A local quoter with a flat rate and an optional free-shipping order
/// value: the weight-independent tier model small storefronts start with.
/// Also handy as a stand-in while the real carrier integration is offline.
#[derive(Debug, Clone)]
pub struct FlatRateQuoter {
    flat_rate: Money,
    free_above: Option<Money>,
}

impl FlatRateQuoter {
    pub fn new(flat_rate: Money) -> Self {
        FlatRateQuoter {
            flat_rate,
            free_above: None,
        }
    }

    /// Orders at or above `threshold` ship free.
    pub fn free_above(mut self, threshold: Money) -> Self {
        self.free_above = Some(threshold);
        self
    }
}

#[async_trait]
impl ShippingQuoter for FlatRateQuoter {
    async fn calculate_shipping(
        &self,
        request: ShippingQuoteRequest,
    ) -> Result<ShippingQuote, QuoteError> {
        let free = matches!(self.free_above, Some(t) if request.cart_total >= t);
        Ok(ShippingQuote {
            shipping_cost: if free { Money::zero() } else { self.flat_rate },
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
