// ============================================================================
// exchange-core
// ============================================================================

//! Deterministic matching core for a securities exchange.
//!
//! Each [`Security`] owns a four-queue order book (active and deactivated,
//! per side) and processes order requests against an [`AccountLedger`] that
//! enforces broker-credit and shareholder-position solvency. Matching is
//! price-time priority in continuous state and single-price uncross in
//! auction state.
//!
//! # Features
//!
//! - Limit, iceberg and stop-limit orders, with minimum execution quantity
//! - All-or-nothing request semantics: partial effects of a rejected order
//!   are rolled back trade by trade
//! - Buy orders reserve their full value against broker credit while resting
//! - Auction opening price maximizing tradable quantity, tie-broken by
//!   closeness to the last trade and then by the lower price
//!
//! # Example
//!
//! ```rust
//! use exchange_core::prelude::*;
//!
//! let mut ledger = AccountLedger::new();
//! ledger.add_broker(Broker::new(BrokerId::new(1), 10_000_000));
//! let mut holder = Shareholder::new(ShareholderId::new(1));
//! holder.increase_position("IRO1MAPN0001", 1_000);
//! ledger.add_shareholder(holder);
//!
//! let mut security = Security::new(
//!     SecurityConfig::new("IRO1MAPN0001").with_reference_price(15_800),
//! );
//!
//! let sell = OrderRequest::new(
//!     RequestId::new(1),
//!     OrderId::new(1),
//!     "IRO1MAPN0001",
//!     Side::Sell,
//!     100,
//!     15_750,
//!     BrokerId::new(1),
//!     ShareholderId::new(1),
//! );
//! assert!(security.new_order(&sell, &mut ledger).is_executed());
//!
//! let buy = OrderRequest::new(
//!     RequestId::new(2),
//!     OrderId::new(2),
//!     "IRO1MAPN0001",
//!     Side::Buy,
//!     40,
//!     15_800,
//!     BrokerId::new(1),
//!     ShareholderId::new(1),
//! );
//! let result = security.new_order(&buy, &mut ledger);
//! assert_eq!(result.trades().len(), 1);
//! // Trades execute at the resting order's price.
//! assert_eq!(result.trades()[0].price, 15_750);
//! assert_eq!(security.last_trade_price(), 15_750);
//! ```

pub mod domain;
pub mod engine;
pub mod errors;

pub use domain::{
    AccountLedger, Broker, BrokerId, MatchingState, Order, OrderBook, OrderId, OrderKind,
    OrderRequest, OrderStatus, Price, Quantity, RequestId, SecurityConfig, Shareholder,
    ShareholderId, Side, Trade, Value,
};
pub use engine::{Activation, MatchResult, MatchingOutcome, OpeningPrice, Security, StateChange};
pub use errors::RequestError;

/// Convenient glob import of the public API.
pub mod prelude {
    pub use crate::domain::{
        AccountLedger, Broker, BrokerId, MatchingState, Order, OrderBook, OrderId, OrderKind,
        OrderRequest, OrderStatus, Price, Quantity, RequestId, SecurityConfig, Shareholder,
        ShareholderId, Side, Trade, Value,
    };
    pub use crate::engine::{
        Activation, MatchResult, MatchingOutcome, OpeningPrice, Security, StateChange,
    };
    pub use crate::errors::RequestError;
}

// ============================================================================
// Integration Tests
// ============================================================================
