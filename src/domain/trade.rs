// ============================================================================
// Trade Record
// ============================================================================

use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::order::{Order, Price, Quantity, Side, Value};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An executed trade between two orders.
///
/// The buy and sell sides are snapshots of the two orders as they were
/// immediately before the trade, so a trade record is self-contained and can
/// drive a rollback.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trade {
    pub id: Uuid,
    pub instrument: Arc<String>,
    pub price: Price,
    pub quantity: Quantity,
    pub buy: Order,
    pub sell: Order,
    pub executed_at: DateTime<Utc>,
}

impl Trade {
    /// Record a trade between two orders on opposite sides. Order of the two
    /// arguments does not matter.
    pub fn new(price: Price, quantity: Quantity, a: &Order, b: &Order) -> Self {
        debug_assert_ne!(a.side, b.side, "a trade needs a buyer and a seller");
        let (buy, sell) = if a.side == Side::Buy { (a, b) } else { (b, a) };
        Self {
            id: Uuid::new_v4(),
            instrument: Arc::clone(&buy.instrument),
            price,
            quantity,
            buy: buy.snapshot(),
            sell: sell.snapshot(),
            executed_at: Utc::now(),
        }
    }

    /// Money that changes hands: price × quantity.
    pub fn traded_value(&self) -> Value {
        self.price * self.quantity
    }
}
