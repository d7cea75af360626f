// ============================================================================
// Domain Model
// ============================================================================

//! Core domain types: orders, order books, trades, accounts and security
//! configuration.

pub mod accounts;
pub mod config;
pub mod order;
pub mod order_book;
pub mod request;
pub mod trade;

pub use accounts::{AccountLedger, Broker, Shareholder};
pub use config::{MatchingState, SecurityConfig};
pub use order::{
    BrokerId, Order, OrderId, OrderKind, OrderStatus, Price, Quantity, RequestId, ShareholderId,
    Side, Value,
};
pub use order_book::OrderBook;
pub use request::OrderRequest;
pub use trade::Trade;
