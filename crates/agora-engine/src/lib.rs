//! # agora-engine: Session Layer for the Agora Cart Engine
//!
//! Wraps the pure cart core ([`agora_core`]) in a shopper-session handle
//! and owns the engine's single asynchronous boundary: the external
//! shipping quote service.
//!
//! ## Responsibilities
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         agora-engine                                    │
//! │                                                                         │
//! │  CartSession (session.rs)                                              │
//! │  ├── single-writer Mutex around the aggregate + checkout inputs        │
//! │  ├── every mutation recomputes and returns a consistent CartView       │
//! │  └── snapshot / restore for session persistence                        │
//! │                                                                         │
//! │  Shipping boundary (shipping.rs)                                       │
//! │  ├── ShippingQuoter async trait (the external service seam)            │
//! │  ├── 10 s deadline per attempt, no automatic retry                     │
//! │  └── last-request-wins ordering via a monotonic sequence number        │
//! │                                                                         │
//! │  The core itself never awaits anything; the async edge stops here.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use agora_core::{Money, NewLineItem, PaymentMethod, PricePair, VoucherBook};
//! use agora_engine::session::CartSession;
//!
//! let session = CartSession::new("USD", VoucherBook::with_standard_codes());
//! session.add_item(NewLineItem {
//!     product_id: "sku-1".into(),
//!     name: "Walnut desk organizer".into(),
//!     image_ref: None,
//!     price: PricePair::buyer_only(Money::from_minor(10_000)),
//!     quantity: 2,
//!     stock_limit: 5,
//!     vendor_id: None,
//!     category: None,
//! }).unwrap();
//!
//! let view = session.select_payment_method(PaymentMethod::Crypto);
//! assert_eq!(view.totals.payment_fee.minor(), 400); // 2% of 200.00
//! ```

pub mod error;
pub mod session;
pub mod shipping;

pub use error::{EngineError, EngineResult};
pub use session::{CartSession, CartView};
pub use shipping::{FlatRateQuoter, QuoteError, ShippingQuoteRequest, ShippingQuoter, QUOTE_TIMEOUT};
