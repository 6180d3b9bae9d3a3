//! # Cart Session
//!
//! The shopper-session handle around the pure cart core.
//!
//! ## Thread Safety
//! The session is wrapped in a `Mutex` because UI event handlers can fire
//! concurrently (rapid +/- clicks) and the aggregate requires a
//! single-writer discipline: one mutation runs to completion, recomputes
//! the derived totals, and only then does the next one start.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session Operations                                   │
//! │                                                                         │
//! │  UI intent            Session call            State change              │
//! │  ─────────            ────────────            ────────────              │
//! │  click "add"     ───► add_item()         ───► upsert row (clamped)     │
//! │  click +/-       ───► change_by_delta()  ───► quantity (clamped)       │
//! │  click remove    ───► remove_item()      ───► row dropped              │
//! │  enter voucher   ───► apply_voucher()    ───► discount + coupon set    │
//! │  pick method     ───► select_payment_method() (no re-quote)            │
//! │  subtotal change ───► refresh_shipping_quote() (async, seq-guarded)    │
//! │                                                                         │
//! │  Every call returns a fresh CartView, so the rendering layer always    │
//! │  observes totals consistent with the mutation it just made.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use agora_core::{
    compute_totals, free_shipping_progress, remaining_for_free_shipping, Address, CartAggregate,
    CartSnapshot, CheckoutTotals, LineItem, Money, NewLineItem, PaymentMethod, VoucherBook,
};

use crate::error::EngineResult;
use crate::shipping::{fetch_quote, ShippingQuoteRequest, ShippingQuoter};

// =============================================================================
// Cart View
// =============================================================================

/// The read-only snapshot the rendering layer consumes.
///
/// Everything the cart page shows is in here; the session is the only
/// write surface.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<LineItem>,
    pub currency: String,
    pub coupon_code: Option<String>,
    pub payment_method: PaymentMethod,
    pub totals: CheckoutTotals,
    /// 0–100, for the free-shipping progress bar.
    pub free_shipping_progress: f64,
    pub remaining_for_free_shipping: Money,
}

// =============================================================================
// Cart Session
// =============================================================================

/// Checkout inputs that live beside the aggregate but are not persisted
/// with it: the chosen payment method and the last shipping quote.
#[derive(Debug)]
struct SessionState {
    cart: CartAggregate,
    payment_method: PaymentMethod,
    /// Last successfully quoted cost. `None` until the first quote lands;
    /// retained as stale-but-present while a newer quote is pending or
    /// after a failed one.
    shipping_cost: Option<Money>,
    free_shipping_threshold: Option<Money>,
    /// Monotonic shipping-quote sequence. The newest issued request number
    /// is the only one whose response may land (last-request-wins).
    /// Lives under the same lock as `shipping_cost`: issuing a number and
    /// applying a response are each one critical section, so an older
    /// response can never slip in between the staleness check and the
    /// write.
    quote_seq: u64,
}

/// One shopper's cart session.
///
/// Owns the aggregate behind a single-writer lock, the voucher book, and
/// the request-sequence counter that orders shipping quotes.
#[derive(Debug)]
pub struct CartSession {
    state: Mutex<SessionState>,
    vouchers: VoucherBook,
}

impl CartSession {
    /// Creates an empty session in the given buyer currency.
    pub fn new(currency: impl Into<String>, vouchers: VoucherBook) -> Self {
        CartSession {
            state: Mutex::new(SessionState {
                cart: CartAggregate::new(currency),
                payment_method: PaymentMethod::default(),
                shipping_cost: None,
                free_shipping_threshold: None,
                quote_seq: 0,
            }),
            vouchers,
        }
    }

    /// Rebuilds a session from a persisted snapshot.
    ///
    /// Only aggregate inputs are restored; payment method and shipping
    /// cost are session-local and start fresh, totals are recomputed.
    pub fn restore(snapshot: CartSnapshot, vouchers: VoucherBook) -> Self {
        CartSession {
            state: Mutex::new(SessionState {
                cart: CartAggregate::restore(snapshot),
                payment_method: PaymentMethod::default(),
                shipping_cost: None,
                free_shipping_threshold: None,
                quote_seq: 0,
            }),
            vouchers,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().expect("cart session mutex poisoned")
    }

    fn view_of(state: &SessionState) -> CartView {
        let totals = compute_totals(&state.cart, state.payment_method, state.shipping_cost);
        CartView {
            items: state.cart.items().to_vec(),
            currency: state.cart.currency().to_string(),
            coupon_code: state.cart.coupon_code().map(str::to_string),
            payment_method: state.payment_method,
            free_shipping_progress: free_shipping_progress(
                totals.subtotal,
                state.free_shipping_threshold,
            ),
            remaining_for_free_shipping: remaining_for_free_shipping(
                totals.subtotal,
                state.free_shipping_threshold,
            ),
            totals,
        }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Current read-only snapshot.
    pub fn view(&self) -> CartView {
        Self::view_of(&self.lock())
    }

    /// Serializable snapshot of the aggregate inputs, for session restore.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::from(&self.lock().cart)
    }

    // -------------------------------------------------------------------------
    // Line item mutations
    // -------------------------------------------------------------------------

    /// Adds a product (or raises its quantity), then recomputes totals.
    pub fn add_item(&self, item: NewLineItem) -> EngineResult<CartView> {
        let mut state = self.lock();
        let product_id = item.product_id.clone();
        let change = state.cart.add_item(item)?;
        if change.clamped {
            debug!(product_id = %product_id, quantity = change.quantity, "quantity clamped to stock limit");
        }
        debug!(product_id = %product_id, quantity = change.quantity, "item added to cart");
        Ok(Self::view_of(&state))
    }

    /// Removes a line item; absent ids are a no-op.
    pub fn remove_item(&self, product_id: &str) -> CartView {
        let mut state = self.lock();
        let removed = state.cart.remove_item(product_id);
        debug!(product_id = %product_id, removed, "remove_item");
        Self::view_of(&state)
    }

    /// Sets an item's quantity (clamped); absent ids are a no-op.
    pub fn set_quantity(&self, product_id: &str, amount: u32) -> CartView {
        let mut state = self.lock();
        if let Some(change) = state.cart.set_quantity(product_id, amount) {
            if change.clamped {
                debug!(product_id = %product_id, quantity = change.quantity, "quantity clamped to stock limit");
            }
        }
        Self::view_of(&state)
    }

    /// Adjusts an item's quantity by a signed delta (the +/- controls).
    pub fn change_by_delta(&self, product_id: &str, delta: i64) -> CartView {
        let mut state = self.lock();
        if let Some(change) = state.cart.change_by_delta(product_id, delta) {
            debug!(product_id = %product_id, delta, quantity = change.quantity, "change_by_delta");
        }
        Self::view_of(&state)
    }

    /// Empties the cart, discount included, atomically.
    pub fn clear(&self) -> CartView {
        let mut state = self.lock();
        state.cart.clear();
        debug!("cart cleared");
        Self::view_of(&state)
    }

    // -------------------------------------------------------------------------
    // Discount / payment / threshold
    // -------------------------------------------------------------------------

    /// Validates a voucher code and applies its discount.
    ///
    /// Unknown codes surface `InvalidVoucher` and change nothing.
    pub fn apply_voucher(&self, code: &str) -> EngineResult<CartView> {
        let mut state = self.lock();
        let discount = self.vouchers.apply(&mut state.cart, code)?;
        debug!(code = %code.trim(), discount_bps = discount.bps(), "voucher applied");
        Ok(Self::view_of(&state))
    }

    /// Drops any applied voucher.
    pub fn clear_discount(&self) -> CartView {
        let mut state = self.lock();
        state.cart.clear_discount();
        Self::view_of(&state)
    }

    /// Switches the payment method and recomputes the fee synchronously.
    ///
    /// Does NOT re-trigger a shipping quote: shipping is independent of the
    /// payment method in this model.
    pub fn select_payment_method(&self, method: PaymentMethod) -> CartView {
        let mut state = self.lock();
        state.payment_method = method;
        debug!(?method, "payment method selected");
        Self::view_of(&state)
    }

    /// Sets (or disables) the free-shipping threshold used by the progress
    /// bar.
    pub fn set_free_shipping_threshold(&self, threshold: Option<Money>) -> CartView {
        let mut state = self.lock();
        state.free_shipping_threshold = threshold;
        Self::view_of(&state)
    }

    // -------------------------------------------------------------------------
    // Shipping quotes (the async boundary)
    // -------------------------------------------------------------------------

    /// Requests a fresh shipping quote and folds it into the totals.
    ///
    /// Call this whenever the subtotal changes. Ordering: every request
    /// takes the next sequence number at issue time, and only the response
    /// belonging to the newest issued request is applied, so a slow older
    /// response can never overwrite a newer subtotal's quote. While the
    /// request is in flight (and after a failure or a discarded stale
    /// response) the previous cost remains visible, so the total never
    /// flickers through zero.
    pub async fn refresh_shipping_quote<Q>(
        &self,
        quoter: &Q,
        method_id: &str,
        address: Address,
    ) -> EngineResult<CartView>
    where
        Q: ShippingQuoter + ?Sized,
    {
        let seq = self.begin_quote();
        let cart_total = {
            let state = self.lock();
            compute_totals(&state.cart, state.payment_method, None).discounted_subtotal
        };
        debug!(seq, cart_total = %cart_total, method_id, "requesting shipping quote");

        let request = ShippingQuoteRequest {
            method_id: method_id.to_string(),
            address,
            cart_total,
        };

        match fetch_quote(quoter, request).await {
            Ok(quote) => {
                self.apply_quote(seq, quote.shipping_cost);
                Ok(self.view())
            }
            // failure path: last known cost retained, recoverable error up
            Err(err) => Err(err),
        }
    }

    /// Issues the next quote sequence number.
    pub(crate) fn begin_quote(&self) -> u64 {
        let mut state = self.lock();
        state.quote_seq += 1;
        state.quote_seq
    }

    /// Applies a quote response if `seq` is still the newest issued
    /// request. The staleness check and the write happen under one lock
    /// acquisition. Returns whether it was applied.
    pub(crate) fn apply_quote(&self, seq: u64, shipping_cost: Money) -> bool {
        let mut state = self.lock();
        if seq != state.quote_seq {
            warn!(seq, "discarding stale shipping quote response");
            return false;
        }
        state.shipping_cost = Some(shipping_cost);
        debug!(seq, shipping_cost = %shipping_cost, "shipping quote applied");
        true
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time::sleep;

    use agora_core::{PricePair, ShippingQuote};

    use crate::error::EngineError;
    use crate::shipping::QuoteError;

    fn new_item(id: &str, price_minor: i64, quantity: u32, stock: u32) -> NewLineItem {
        NewLineItem {
            product_id: id.to_string(),
            name: format!("Product {}", id),
            image_ref: None,
            price: PricePair::buyer_only(Money::from_minor(price_minor)),
            quantity,
            stock_limit: stock,
            vendor_id: None,
            category: None,
        }
    }

    fn address() -> Address {
        Address {
            country: "US".to_string(),
            state: "NY".to_string(),
            city: "New York".to_string(),
            postal_code: "10001".to_string(),
        }
    }

    fn session_with_subtotal_500() -> CartSession {
        let session = CartSession::new("USD", VoucherBook::with_standard_codes());
        session.add_item(new_item("1", 10_000, 5, 5)).unwrap();
        session
    }

    /// Replays a scripted list of (delay, cost) responses in call order.
    struct ScriptedQuoter {
        responses: Mutex<VecDeque<(Duration, i64)>>,
    }

    impl ScriptedQuoter {
        fn new(responses: Vec<(Duration, i64)>) -> Self {
            ScriptedQuoter {
                responses: Mutex::new(responses.into_iter().collect()),
            }
        }
    }

    #[async_trait]
    impl ShippingQuoter for ScriptedQuoter {
        async fn calculate_shipping(
            &self,
            _request: ShippingQuoteRequest,
        ) -> Result<ShippingQuote, QuoteError> {
            let (delay, cost) = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| QuoteError("no scripted response".to_string()))?;
            sleep(delay).await;
            Ok(ShippingQuote {
                shipping_cost: Money::from_minor(cost),
            })
        }
    }

    struct FailingQuoter;

    #[async_trait]
    impl ShippingQuoter for FailingQuoter {
        async fn calculate_shipping(
            &self,
            _request: ShippingQuoteRequest,
        ) -> Result<ShippingQuote, QuoteError> {
            Err(QuoteError("boom".to_string()))
        }
    }

    #[test]
    fn test_mutations_return_consistent_views() {
        let session = session_with_subtotal_500();
        let view = session.view();
        assert_eq!(view.totals.subtotal.minor(), 50_000);
        assert_eq!(view.totals.total_items, 5);

        let view = session.change_by_delta("1", -2);
        assert_eq!(view.totals.subtotal.minor(), 30_000);

        let view = session.remove_item("1");
        assert!(view.items.is_empty());
        assert!(view.totals.total.is_zero());
    }

    #[test]
    fn test_voucher_then_payment_method_ordering() {
        let session = session_with_subtotal_500();
        session.apply_voucher("SAVE10").unwrap();
        let view = session.select_payment_method(PaymentMethod::Crypto);

        // fee is 2% of the discounted 450.00, not of 500.00
        assert_eq!(view.totals.payment_fee.minor(), 900);
        assert_eq!(view.totals.total.minor(), 45_900);
    }

    #[test]
    fn test_unknown_voucher_leaves_session_unchanged() {
        let session = session_with_subtotal_500();
        session.apply_voucher("SAVE10").unwrap();

        let err = session.apply_voucher("NOPE").unwrap_err();
        assert!(matches!(err, EngineError::Core(_)));

        let view = session.view();
        assert_eq!(view.coupon_code.as_deref(), Some("SAVE10"));
        assert_eq!(view.totals.discount_amount.minor(), 5_000);
    }

    #[test]
    fn test_payment_switch_keeps_shipping_cost() {
        let session = session_with_subtotal_500();
        let seq = session.begin_quote();
        assert!(session.apply_quote(seq, Money::from_minor(2_000)));

        let view = session.select_payment_method(PaymentMethod::Escrow);
        assert_eq!(view.totals.shipping_cost, Some(Money::from_minor(2_000)));
        // 500 + 3% fee + shipping
        assert_eq!(view.totals.total.minor(), 50_000 + 1_500 + 2_000);
    }

    #[test]
    fn test_free_shipping_progress_in_view() {
        let session = CartSession::new("USD", VoucherBook::new());
        session.add_item(new_item("1", 5_000, 5, 10)).unwrap(); // 250.00
        let view = session.set_free_shipping_threshold(Some(Money::from_minor(100_000)));

        assert_eq!(view.free_shipping_progress, 25.0);
        assert_eq!(view.remaining_for_free_shipping.minor(), 75_000);
    }

    #[test]
    fn test_stale_quote_response_is_discarded() {
        let session = session_with_subtotal_500();

        let first = session.begin_quote();
        let second = session.begin_quote();

        // the later-issued request resolves first and wins
        assert!(session.apply_quote(second, Money::from_minor(2_000)));
        // the older response arrives late and must not overwrite
        assert!(!session.apply_quote(first, Money::from_minor(9_999)));

        let view = session.view();
        assert_eq!(view.totals.shipping_cost, Some(Money::from_minor(2_000)));
    }

    #[test]
    fn test_superseded_response_rejected_even_if_newer_request_fails() {
        let session = session_with_subtotal_500();

        let first = session.begin_quote();
        let _second = session.begin_quote();

        // the newer request is outstanding (and may never succeed), so the
        // superseded response must not land even though nothing newer has
        assert!(!session.apply_quote(first, Money::from_minor(9_999)));

        let view = session.view();
        assert_eq!(view.totals.shipping_cost, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_request_wins_end_to_end() {
        let session = Arc::new(session_with_subtotal_500());
        // first request is slow (100ms → 10.00), second is fast (10ms → 20.00)
        let quoter = Arc::new(ScriptedQuoter::new(vec![
            (Duration::from_millis(100), 1_000),
            (Duration::from_millis(10), 2_000),
        ]));

        let slow = tokio::spawn({
            let session = Arc::clone(&session);
            let quoter = Arc::clone(&quoter);
            async move {
                session
                    .refresh_shipping_quote(&*quoter, "standard", address())
                    .await
            }
        });
        // let the slow request take its sequence number first
        sleep(Duration::from_millis(1)).await;
        let fast = tokio::spawn({
            let session = Arc::clone(&session);
            let quoter = Arc::clone(&quoter);
            async move {
                session
                    .refresh_shipping_quote(&*quoter, "standard", address())
                    .await
            }
        });

        slow.await.unwrap().unwrap();
        fast.await.unwrap().unwrap();

        // the later-issued quote (20.00) is in effect even though the
        // earlier request resolved after it
        let view = session.view();
        assert_eq!(view.totals.shipping_cost, Some(Money::from_minor(2_000)));
    }

    #[tokio::test]
    async fn test_failed_quote_retains_last_known_cost() {
        let session = session_with_subtotal_500();
        let seq = session.begin_quote();
        session.apply_quote(seq, Money::from_minor(2_000));

        let err = session
            .refresh_shipping_quote(&FailingQuoter, "standard", address())
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::ShippingQuoteFailure { .. }));
        // stale-but-present: total stays computable with the old quote
        let view = session.view();
        assert_eq!(view.totals.shipping_cost, Some(Money::from_minor(2_000)));
        assert_eq!(view.totals.total.minor(), 52_000);
    }

    #[tokio::test]
    async fn test_quote_uses_discounted_subtotal() {
        struct CaptureQuoter {
            seen: Mutex<Option<Money>>,
        }

        #[async_trait]
        impl ShippingQuoter for CaptureQuoter {
            async fn calculate_shipping(
                &self,
                request: ShippingQuoteRequest,
            ) -> Result<ShippingQuote, QuoteError> {
                *self.seen.lock().unwrap() = Some(request.cart_total);
                Ok(ShippingQuote {
                    shipping_cost: Money::from_minor(500),
                })
            }
        }

        let session = session_with_subtotal_500();
        session.apply_voucher("SAVE10").unwrap();

        let quoter = CaptureQuoter {
            seen: Mutex::new(None),
        };
        session
            .refresh_shipping_quote(&quoter, "standard", address())
            .await
            .unwrap();

        assert_eq!(*quoter.seen.lock().unwrap(), Some(Money::from_minor(45_000)));
    }

    #[test]
    fn test_snapshot_restore_recomputes_totals() {
        let session = session_with_subtotal_500();
        session.apply_voucher("SAVE10").unwrap();
        let seq = session.begin_quote();
        session.apply_quote(seq, Money::from_minor(2_000));

        let snapshot = session.snapshot();
        let restored = CartSession::restore(snapshot, VoucherBook::with_standard_codes());
        let view = restored.view();

        // aggregate inputs survive; session-local shipping does not
        assert_eq!(view.coupon_code.as_deref(), Some("SAVE10"));
        assert_eq!(view.totals.discounted_subtotal.minor(), 45_000);
        assert_eq!(view.totals.shipping_cost, None);
        assert_eq!(view.totals.total.minor(), 45_000);
    }
}
