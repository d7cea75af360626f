// ============================================================================
// Order Book
// ============================================================================

use crate::domain::order::{Order, OrderId, Price, Quantity, ShareholderId, Side};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-security order book.
///
/// Four queues: an active buy and sell queue in price-time priority, and a
/// deactivated buy and sell queue holding untriggered stop-limit orders in
/// trigger-closeness priority. All queues are kept sorted on insertion, so
/// the front of each queue is always the highest-priority order.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderBook {
    buy_queue: Vec<Order>,
    sell_queue: Vec<Order>,
    inactive_buy_queue: Vec<Order>,
    inactive_sell_queue: Vec<Order>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    fn queue(&self, side: Side) -> &Vec<Order> {
        match side {
            Side::Buy => &self.buy_queue,
            Side::Sell => &self.sell_queue,
        }
    }

    fn queue_mut(&mut self, side: Side) -> &mut Vec<Order> {
        match side {
            Side::Buy => &mut self.buy_queue,
            Side::Sell => &mut self.sell_queue,
        }
    }

    fn inactive_queue(&self, side: Side) -> &Vec<Order> {
        match side {
            Side::Buy => &self.inactive_buy_queue,
            Side::Sell => &self.inactive_sell_queue,
        }
    }

    fn inactive_queue_mut(&mut self, side: Side) -> &mut Vec<Order> {
        match side {
            Side::Buy => &mut self.inactive_buy_queue,
            Side::Sell => &mut self.inactive_sell_queue,
        }
    }

    // ========================================================================
    // Active queues
    // ========================================================================

    /// Insert into the active queue at price-time priority. The order is
    /// marked queued, which refreshes an iceberg's displayed slice.
    pub fn enqueue(&mut self, mut order: Order) {
        order.queue();
        let queue = self.queue_mut(order.side);
        let position = queue
            .iter()
            .position(|resting| order.queues_before(resting))
            .unwrap_or(queue.len());
        queue.insert(position, order);
    }

    /// Insert an untriggered stop-limit order into the deactivated queue at
    /// trigger-closeness priority.
    pub fn enqueue_inactive(&mut self, mut order: Order) {
        debug_assert!(order.stop_price().is_some());
        order.deactivate();
        order.mark_queued();
        let queue = self.inactive_queue_mut(order.side);
        let position = queue
            .iter()
            .position(|parked| order.triggers_before(parked))
            .unwrap_or(queue.len());
        queue.insert(position, order);
    }

    /// Best active order on `side`, if any.
    pub fn peek_best(&self, side: Side) -> Option<&Order> {
        self.queue(side).first()
    }

    /// Best active order on the side opposite to `order`'s.
    pub fn peek_best_opposite(&self, order: &Order) -> Option<&Order> {
        self.peek_best(order.side.opposite())
    }

    pub(crate) fn best_mut(&mut self, side: Side) -> Option<&mut Order> {
        self.queue_mut(side).first_mut()
    }

    /// Remove and return the best active order on `side`.
    pub fn remove_first(&mut self, side: Side) -> Option<Order> {
        let queue = self.queue_mut(side);
        if queue.is_empty() {
            None
        } else {
            Some(queue.remove(0))
        }
    }

    /// Re-insert an order at the front of its active queue, preserving its
    /// exact displayed slice. Only valid for an order that held the front
    /// position when it was removed.
    pub fn put_back(&mut self, mut order: Order) {
        order.mark_queued();
        self.queue_mut(order.side).insert(0, order);
    }

    /// Replace whatever state order `order.id` currently has with the given
    /// snapshot, at the front of its queue. Used when unwinding trades.
    pub fn restore(&mut self, order: Order) {
        self.remove_active(order.side, order.id);
        self.put_back(order);
    }

    // ========================================================================
    // Lookup and removal
    // ========================================================================

    /// Find an order by id on `side`, searching the active queue first and
    /// the deactivated queue second.
    pub fn find(&self, side: Side, id: OrderId) -> Option<&Order> {
        self.queue(side)
            .iter()
            .find(|order| order.id == id)
            .or_else(|| self.inactive_queue(side).iter().find(|order| order.id == id))
    }

    pub(crate) fn find_mut(&mut self, side: Side, id: OrderId) -> Option<&mut Order> {
        if self.queue(side).iter().any(|order| order.id == id) {
            return self.queue_mut(side).iter_mut().find(|order| order.id == id);
        }
        self.inactive_queue_mut(side)
            .iter_mut()
            .find(|order| order.id == id)
    }

    /// Remove an order by id from either the active or the deactivated queue.
    pub fn remove(&mut self, side: Side, id: OrderId) -> Option<Order> {
        self.remove_active(side, id).or_else(|| {
            let queue = self.inactive_queue_mut(side);
            let position = queue.iter().position(|order| order.id == id)?;
            Some(queue.remove(position))
        })
    }

    /// Remove an order by id from the active queue only.
    pub fn remove_active(&mut self, side: Side, id: OrderId) -> Option<Order> {
        let queue = self.queue_mut(side);
        let position = queue.iter().position(|order| order.id == id)?;
        Some(queue.remove(position))
    }

    /// Whether the order with this id sits in the deactivated queue.
    pub fn is_inactive_stop_order(&self, side: Side, id: OrderId) -> bool {
        self.inactive_queue(side).iter().any(|order| order.id == id)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn has_orders(&self, side: Side) -> bool {
        !self.queue(side).is_empty()
    }

    pub fn buy_orders(&self) -> &[Order] {
        &self.buy_queue
    }

    pub fn sell_orders(&self) -> &[Order] {
        &self.sell_queue
    }

    pub fn inactive_buy_orders(&self) -> &[Order] {
        &self.inactive_buy_queue
    }

    pub fn inactive_sell_orders(&self) -> &[Order] {
        &self.inactive_sell_queue
    }

    pub fn best_price(&self, side: Side) -> Option<Price> {
        self.peek_best(side).map(|order| order.price)
    }

    /// Total remaining sell quantity a shareholder has committed across the
    /// active and deactivated sell queues. Used for position solvency.
    pub fn total_sell_quantity_by(&self, shareholder: ShareholderId) -> Quantity {
        self.sell_queue
            .iter()
            .chain(self.inactive_sell_queue.iter())
            .filter(|order| order.shareholder == shareholder)
            .map(|order| order.total_quantity())
            .sum()
    }

    // ========================================================================
    // Stop activation
    // ========================================================================

    /// Pop one triggered stop order from the front of a deactivated queue,
    /// if any. Because the queues are ordered by trigger closeness, an
    /// untriggered front order means nothing behind it is triggered either.
    pub fn pop_triggered(&mut self, last_trade_price: Price) -> Option<Order> {
        for side in [Side::Buy, Side::Sell] {
            let queue = self.inactive_queue_mut(side);
            if let Some(front) = queue.first() {
                if front.stop_triggered(last_trade_price) {
                    return Some(queue.remove(0));
                }
            }
        }
        None
    }
}
