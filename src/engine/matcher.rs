// ============================================================================
// Matcher
// ============================================================================

//! Continuous and auction matching against a security's book, with
//! all-or-nothing rollback.
//!
//! Every trade appends a `MatchStep` to an undo log holding the trade and a
//! snapshot of the resting order as it was just before matching. Reversing
//! the log restores the book and broker credits to their exact pre-match
//! state; shareholder positions only settle after the whole order is
//! accepted, so they never need unwinding.

use crate::domain::accounts::AccountLedger;
use crate::domain::order::{Order, Quantity, Side};
use crate::domain::order_book::OrderBook;
use crate::domain::trade::Trade;
use crate::engine::match_result::MatchResult;
use crate::engine::price_calculator;
use crate::engine::security::Security;

/// One executed trade plus what it takes to undo it.
struct MatchStep {
    trade: Trade,
    resting_before: Order,
}

/// Run `order` through continuous matching and queue any remainder.
///
/// `minimum_execution_quantity` only applies when a remainder would rest: an
/// order that fills completely always stands, however little the caller
/// demanded.
pub fn execute(
    security: &mut Security,
    ledger: &mut AccountLedger,
    mut order: Order,
    minimum_execution_quantity: Quantity,
) -> MatchResult {
    let steps = match match_loop(security.book_mut(), ledger, &mut order) {
        Ok(steps) => steps,
        Err(()) => return MatchResult::not_enough_credit(),
    };

    if order.total_quantity() > 0 {
        let traded: Quantity = steps.iter().map(|step| step.trade.quantity).sum();
        if traded < minimum_execution_quantity {
            tracing::debug!(
                order_id = %order.id,
                traded,
                minimum_execution_quantity,
                "minimum execution quantity not met, rolling back"
            );
            rollback(security.book_mut(), ledger, order.side, steps);
            return MatchResult::minimum_quantity_not_met();
        }
        // The remainder rests in the book; a buy remainder reserves its full
        // value against the broker's credit.
        if order.side == Side::Buy
            && !ledger.broker_mut(order.broker).try_decrease_credit(order.value())
        {
            rollback(security.book_mut(), ledger, order.side, steps);
            return MatchResult::not_enough_credit();
        }
    }

    let trades: Vec<Trade> = steps.into_iter().map(|step| step.trade).collect();
    settle_positions(ledger, &trades);
    if let Some(last) = trades.last() {
        security.set_last_trade_price(last.price);
    }

    let remainder = if order.total_quantity() > 0 {
        let snapshot = order.snapshot();
        security.book_mut().enqueue(order);
        Some(snapshot)
    } else {
        Some(order)
    };
    MatchResult::executed(remainder, trades)
}

/// Match `incoming` against the opposite queue until it stops crossing or
/// runs out. Per-trade the buyer's broker is debited and the seller's
/// credited; a buyer that cannot cover a trade unwinds everything.
fn match_loop(
    book: &mut OrderBook,
    ledger: &mut AccountLedger,
    incoming: &mut Order,
) -> Result<Vec<MatchStep>, ()> {
    let mut steps: Vec<MatchStep> = Vec::new();

    while incoming.quantity() > 0 {
        let resting_before = match book.peek_best_opposite(incoming) {
            Some(best) if incoming.crosses(best.price) => best.snapshot(),
            _ => break,
        };

        // Trades execute at the resting order's price.
        let quantity = incoming.quantity().min(resting_before.quantity());
        let trade = Trade::new(resting_before.price, quantity, incoming, &resting_before);
        let value = trade.traded_value();
        tracing::trace!(
            incoming = %incoming.id,
            resting = %resting_before.id,
            price = trade.price,
            quantity,
            "trade"
        );

        if incoming.side == Side::Buy {
            if !ledger.broker(incoming.broker).has_enough_credit(value) {
                rollback(book, ledger, incoming.side, steps);
                return Err(());
            }
            ledger.broker_mut(incoming.broker).decrease_credit(value);
        }
        ledger.broker_mut(trade.sell.broker).increase_credit(value);

        if quantity == resting_before.quantity() {
            // The visible slice is fully consumed; an iceberg with hidden
            // remainder re-enters at the back of its price level.
            let mut resting = book
                .remove_first(resting_before.side)
                .unwrap_or_else(|| unreachable!("peeked order vanished"));
            resting.decrease_quantity(quantity);
            resting.replenish();
            if resting.quantity() > 0 {
                book.enqueue(resting);
            }
        } else {
            let resting = book
                .best_mut(resting_before.side)
                .unwrap_or_else(|| unreachable!("peeked order vanished"));
            resting.decrease_quantity(quantity);
        }

        incoming.decrease_quantity(quantity);
        steps.push(MatchStep {
            trade,
            resting_before,
        });
    }

    Ok(steps)
}

/// Undo every step in reverse: claw back the seller's proceeds, refund the
/// buyer when the incoming side bought, and restore each resting order's
/// snapshot to the front of its queue.
fn rollback(
    book: &mut OrderBook,
    ledger: &mut AccountLedger,
    incoming_side: Side,
    steps: Vec<MatchStep>,
) {
    tracing::debug!(steps = steps.len(), "rolling back trades");
    for step in steps.into_iter().rev() {
        let value = step.trade.traded_value();
        ledger.broker_mut(step.trade.sell.broker).decrease_credit(value);
        if incoming_side == Side::Buy {
            ledger.broker_mut(step.trade.buy.broker).increase_credit(value);
        }
        book.restore(step.resting_before);
    }
}

/// Uncross an auction book: compute the opening price and trade every
/// crossing pair at it, best orders first.
///
/// Buy-side brokers reserved their full limit value on admission, so each
/// trade refunds them the improvement `quantity × (limit − opening)` on top
/// of settling the seller. An empty or uncrossed book uncrosses to nothing.
pub fn execute_auction(security: &mut Security, ledger: &mut AccountLedger) -> MatchResult {
    let Some(opening) = price_calculator::opening_price(security.book(), security.last_trade_price())
    else {
        return MatchResult::executed(None, Vec::new());
    };
    let opening_price = opening.price;
    tracing::debug!(
        instrument = %security.instrument(),
        opening_price,
        tradable_quantity = opening.tradable_quantity,
        "uncrossing auction book"
    );

    let mut trades = Vec::new();
    loop {
        let (buy, sell) = {
            let book = security.book();
            let buy = book
                .peek_best(Side::Buy)
                .filter(|order| order.crosses(opening_price));
            let sell = book
                .peek_best(Side::Sell)
                .filter(|order| order.crosses(opening_price));
            match (buy, sell) {
                (Some(buy), Some(sell)) => (buy.snapshot(), sell.snapshot()),
                _ => break,
            }
        };

        let quantity = buy.quantity().min(sell.quantity());
        let trade = Trade::new(opening_price, quantity, &buy, &sell);
        ledger.broker_mut(sell.broker).increase_credit(trade.traded_value());
        ledger
            .broker_mut(buy.broker)
            .increase_credit(quantity * (buy.price - opening_price));

        consume(security.book_mut(), Side::Buy, quantity);
        consume(security.book_mut(), Side::Sell, quantity);
        trades.push(trade);
    }

    settle_positions(ledger, &trades);
    if let Some(last) = trades.last() {
        security.set_last_trade_price(last.price);
    }
    MatchResult::executed(None, trades)
}

/// Fill `quantity` from the front order on `side`, re-enqueueing a
/// replenished iceberg behind its price level.
fn consume(book: &mut OrderBook, side: Side, quantity: Quantity) {
    let front = book
        .best_mut(side)
        .unwrap_or_else(|| unreachable!("crossing side emptied mid-uncross"));
    if quantity == front.quantity() {
        let mut order = book
            .remove_first(side)
            .unwrap_or_else(|| unreachable!("crossing side emptied mid-uncross"));
        order.decrease_quantity(quantity);
        order.replenish();
        if order.quantity() > 0 {
            book.enqueue(order);
        }
    } else {
        front.decrease_quantity(quantity);
    }
}

fn settle_positions(ledger: &mut AccountLedger, trades: &[Trade]) {
    for trade in trades {
        ledger
            .shareholder_mut(trade.buy.shareholder)
            .increase_position(trade.instrument.as_str(), trade.quantity);
        ledger
            .shareholder_mut(trade.sell.shareholder)
            .decrease_position(trade.instrument.as_str(), trade.quantity);
    }
}
