// ============================================================================
// Security
// ============================================================================

//! A tradable security: its book, session state and last-traded price, plus
//! the request-level operations (enter, update, delete, state change, stop
//! activation) that drive the matcher.

use std::sync::Arc;

use crate::domain::accounts::AccountLedger;
use crate::domain::config::{MatchingState, SecurityConfig};
use crate::domain::order::{Order, OrderId, OrderKind, Price, Quantity, RequestId, Side};
use crate::domain::order_book::OrderBook;
use crate::domain::request::OrderRequest;
use crate::domain::trade::Trade;
use crate::engine::match_result::{MatchResult, MatchingOutcome};
use crate::engine::matcher;
use crate::engine::price_calculator::{self, OpeningPrice};
use crate::errors::RequestError;

/// Result of a session state change: the new state and the trades an auction
/// uncross produced on the way out, if any.
#[derive(Debug)]
pub struct StateChange {
    pub state: MatchingState,
    pub trades: Vec<Trade>,
}

/// One stop-limit order activation and what its execution produced.
#[derive(Debug)]
pub struct Activation {
    pub order_id: OrderId,
    pub request_id: RequestId,
    pub result: MatchResult,
}

#[derive(Debug)]
pub struct Security {
    instrument: Arc<String>,
    tick_size: u64,
    lot_size: u64,
    book: OrderBook,
    state: MatchingState,
    last_trade_price: Price,
}

impl Security {
    pub fn new(config: SecurityConfig) -> Self {
        Self {
            instrument: Arc::new(config.instrument),
            tick_size: config.tick_size,
            lot_size: config.lot_size,
            book: OrderBook::new(),
            state: config.initial_state,
            last_trade_price: config.reference_price,
        }
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn tick_size(&self) -> u64 {
        self.tick_size
    }

    pub fn lot_size(&self) -> u64 {
        self.lot_size
    }

    pub fn state(&self) -> MatchingState {
        self.state
    }

    pub fn last_trade_price(&self) -> Price {
        self.last_trade_price
    }

    pub fn set_last_trade_price(&mut self, price: Price) {
        self.last_trade_price = price;
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn book_mut(&mut self) -> &mut OrderBook {
        &mut self.book
    }

    // ========================================================================
    // New orders
    // ========================================================================

    /// Process a new-order request: position check for sells, stop parking,
    /// then continuous matching or auction admission depending on state.
    pub fn new_order(&mut self, rq: &OrderRequest, ledger: &mut AccountLedger) -> MatchResult {
        debug_assert_eq!(rq.instrument, *self.instrument);

        if rq.side == Side::Sell {
            let committed = self.book.total_sell_quantity_by(rq.shareholder) + rq.quantity;
            if !ledger
                .shareholder(rq.shareholder)
                .has_enough_positions_on(&self.instrument, committed)
            {
                return MatchResult::not_enough_positions();
            }
        }

        let order = self.build_order(rq);
        self.enter_order(order, rq.minimum_execution_quantity, ledger)
    }

    fn build_order(&self, rq: &OrderRequest) -> Order {
        let kind = if rq.stop_price > 0 {
            OrderKind::StopLimit {
                stop_price: rq.stop_price,
                active: false,
            }
        } else if rq.peak_size > 0 {
            OrderKind::Iceberg {
                peak_size: rq.peak_size,
                displayed: rq.peak_size,
            }
        } else {
            OrderKind::Limit
        };
        Order::new(
            rq.order_id,
            rq.request_id,
            Arc::clone(&self.instrument),
            rq.side,
            rq.quantity,
            rq.price,
            rq.broker,
            rq.shareholder,
            rq.entry_time,
            kind,
        )
    }

    fn enter_order(
        &mut self,
        mut order: Order,
        minimum_execution_quantity: Quantity,
        ledger: &mut AccountLedger,
    ) -> MatchResult {
        if !order.stop_triggered(self.last_trade_price) {
            // Park the stop order. A buy reserves its full value so that
            // activation can never be underfunded by this order itself.
            if order.side == Side::Buy
                && !ledger.broker_mut(order.broker).try_decrease_credit(order.value())
            {
                return MatchResult::not_enough_credit();
            }
            tracing::debug!(
                order_id = %order.id,
                stop_price = ?order.stop_price(),
                "parking stop order"
            );
            self.book.enqueue_inactive(order);
            return MatchResult::deactivated();
        }
        if order.is_inactive_stop() {
            // Already triggered on arrival: behaves as a plain limit order.
            order.activate();
        }

        if self.state == MatchingState::Auction {
            if order.side == Side::Buy
                && !ledger.broker_mut(order.broker).try_decrease_credit(order.value())
            {
                return MatchResult::not_enough_credit();
            }
            self.book.enqueue(order);
            return MatchResult::opening_price_changed();
        }

        matcher::execute(self, ledger, order, minimum_execution_quantity)
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    /// Remove an order from whichever queue holds it, refunding a buy
    /// order's outstanding credit reservation.
    pub fn delete_order(
        &mut self,
        side: Side,
        order_id: OrderId,
        ledger: &mut AccountLedger,
    ) -> Result<(), RequestError> {
        let order = self
            .book
            .remove(side, order_id)
            .ok_or(RequestError::OrderNotFound)?;
        if order.side == Side::Buy {
            ledger.broker_mut(order.broker).increase_credit(order.value());
        }
        Ok(())
    }

    // ========================================================================
    // Updates
    // ========================================================================

    /// Process an update request against a resting or parked order.
    ///
    /// Priority-preserving updates (quantity decrease with unchanged price
    /// and peak) mutate in place; anything else removes the order and
    /// resubmits the updated version, restoring the original on failure.
    pub fn update_order(
        &mut self,
        rq: &OrderRequest,
        ledger: &mut AccountLedger,
    ) -> Result<MatchResult, RequestError> {
        let order = self
            .book
            .find(rq.side, rq.order_id)
            .ok_or(RequestError::OrderNotFound)?;

        match order.kind() {
            OrderKind::Iceberg { .. } if rq.peak_size == 0 => {
                return Err(RequestError::PeakSizeRequired)
            }
            OrderKind::Limit | OrderKind::StopLimit { .. } if rq.peak_size != 0 => {
                return Err(RequestError::PeakSizeNotAllowed)
            }
            OrderKind::Limit | OrderKind::Iceberg { .. } if rq.stop_price != 0 => {
                return Err(RequestError::StopPriceNotAllowed)
            }
            OrderKind::StopLimit { stop_price, active: true }
                if rq.stop_price > 0 && rq.stop_price != stop_price =>
            {
                return Err(RequestError::StopPriceImmutable)
            }
            _ => {}
        }

        if rq.side == Side::Sell {
            let committed = self.book.total_sell_quantity_by(order.shareholder)
                - order.total_quantity()
                + rq.quantity;
            if !ledger
                .shareholder(order.shareholder)
                .has_enough_positions_on(&self.instrument, committed)
            {
                return Ok(MatchResult::not_enough_positions());
            }
        }

        if order.is_inactive_stop() {
            Ok(self.update_parked_order(rq, ledger))
        } else {
            Ok(self.update_active_order(rq, ledger))
        }
    }

    /// Update an order in the deactivated queue. The queue position follows
    /// the stop price, so a changed stop re-sorts; a buy's reservation is
    /// swapped for the new value first and the update is refused outright if
    /// the broker cannot cover it.
    fn update_parked_order(&mut self, rq: &OrderRequest, ledger: &mut AccountLedger) -> MatchResult {
        let (side, order_id) = (rq.side, rq.order_id);
        let (broker, old_value, old_stop) = {
            let order = self
                .book
                .find(side, order_id)
                .unwrap_or_else(|| unreachable!("checked by update_order"));
            (order.broker, order.value(), order.stop_price())
        };

        if side == Side::Buy {
            ledger.broker_mut(broker).increase_credit(old_value);
            let new_value = rq.quantity * rq.price;
            if !ledger.broker_mut(broker).try_decrease_credit(new_value) {
                ledger.broker_mut(broker).decrease_credit(old_value);
                return MatchResult::not_enough_credit();
            }
        }

        let stop_changed = rq.stop_price > 0 && old_stop != Some(rq.stop_price);
        if stop_changed {
            let mut order = self
                .book
                .remove(side, order_id)
                .unwrap_or_else(|| unreachable!("checked by update_order"));
            order.update_from_request(rq);
            self.book.enqueue_inactive(order);
        } else {
            let order = self
                .book
                .find_mut(side, order_id)
                .unwrap_or_else(|| unreachable!("checked by update_order"));
            order.update_from_request(rq);
        }
        MatchResult::executed(None, Vec::new())
    }

    /// Update an order in the active book.
    fn update_active_order(&mut self, rq: &OrderRequest, ledger: &mut AccountLedger) -> MatchResult {
        let (side, order_id) = (rq.side, rq.order_id);
        let (broker, old_value, loses_priority) = {
            let order = self
                .book
                .find(side, order_id)
                .unwrap_or_else(|| unreachable!("checked by update_order"));
            let loses_priority = rq.quantity > order.total_quantity()
                || rq.price != order.price
                || matches!(order.kind(),
                    OrderKind::Iceberg { peak_size, .. } if rq.peak_size < peak_size);
            (order.broker, order.value(), loses_priority)
        };

        // The old reservation is released up front; each path below either
        // re-reserves through normal admission or puts the old one back.
        if side == Side::Buy {
            ledger.broker_mut(broker).increase_credit(old_value);
        }

        if !loses_priority {
            let order = self
                .book
                .find_mut(side, order_id)
                .unwrap_or_else(|| unreachable!("checked by update_order"));
            order.update_from_request(rq);
            let new_value = order.value();
            if side == Side::Buy {
                // Preserving priority implies the value did not grow.
                ledger.broker_mut(broker).decrease_credit(new_value);
            }
            return MatchResult::executed(None, Vec::new());
        }

        let mut order = self
            .book
            .remove_active(side, order_id)
            .unwrap_or_else(|| unreachable!("checked by update_order"));
        let original = order.snapshot();
        order.update_from_request(rq);
        order.mark_new();

        if self.state == MatchingState::Auction {
            if side == Side::Buy
                && !ledger.broker_mut(broker).try_decrease_credit(order.value())
            {
                self.restore_original(original, ledger);
                return MatchResult::not_enough_credit();
            }
            self.book.enqueue(order);
            return MatchResult::opening_price_changed();
        }

        let result = matcher::execute(self, ledger, order, rq.minimum_execution_quantity);
        if result.outcome() != MatchingOutcome::Executed {
            self.restore_original(original, ledger);
        }
        result
    }

    /// Put an order back after a failed priority-losing update, re-reserving
    /// a buy's original value (which the update path had refunded).
    fn restore_original(&mut self, original: Order, ledger: &mut AccountLedger) {
        if original.side == Side::Buy {
            ledger
                .broker_mut(original.broker)
                .decrease_credit(original.value());
        }
        self.book.enqueue(original);
    }

    // ========================================================================
    // Stop activation
    // ========================================================================

    /// Activate and execute triggered stop orders until none remain.
    ///
    /// Each activation releases the parked buy reservation and resubmits the
    /// order through normal matching, which may move the last-traded price
    /// and trigger further stops. The loop terminates because every popped
    /// order either trades, rests in the active book, or is rejected; none
    /// re-enters a deactivated queue.
    pub fn activate_stop_orders(&mut self, ledger: &mut AccountLedger) -> Vec<Activation> {
        let mut activations = Vec::new();
        while let Some(mut order) = self.book.pop_triggered(self.last_trade_price) {
            order.activate();
            order.mark_new();
            if order.side == Side::Buy {
                ledger.broker_mut(order.broker).increase_credit(order.value());
            }
            let order_id = order.id;
            let request_id = order.request_id;
            let result = self.enter_order(order, 0, ledger);
            activations.push(Activation {
                order_id,
                request_id,
                result,
            });
        }
        activations
    }

    // ========================================================================
    // Session state
    // ========================================================================

    /// Switch the session state. Leaving Auction uncrosses the book exactly
    /// once before the new state applies; entering Auction keeps the book as
    /// is. Setting the current state again behaves the same way, so
    /// Auction → Auction re-runs an uncross.
    pub fn change_state(&mut self, target: MatchingState, ledger: &mut AccountLedger) -> StateChange {
        let trades = if self.state == MatchingState::Auction {
            matcher::execute_auction(self, ledger).into_trades()
        } else {
            Vec::new()
        };
        tracing::debug!(instrument = %self.instrument, ?target, "matching state changed");
        self.state = target;
        StateChange {
            state: target,
            trades,
        }
    }

    // ========================================================================
    // Auction queries
    // ========================================================================

    /// The price the book would uncross at right now, if it is crossed.
    pub fn opening_price(&self) -> Option<OpeningPrice> {
        price_calculator::opening_price(&self.book, self.last_trade_price)
    }

    /// Quantity that would trade at `price`, zero when the book is not
    /// crossed at all.
    pub fn tradable_quantity_at(&self, price: Price) -> Quantity {
        match (self.book.best_price(Side::Buy), self.book.best_price(Side::Sell)) {
            (Some(bid), Some(ask)) if bid >= ask => {
                price_calculator::tradable_quantity_at(&self.book, price)
            }
            _ => 0,
        }
    }
}
