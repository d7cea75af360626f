// ============================================================================
// Match Results
// ============================================================================

use crate::domain::order::{Order, Quantity};
use crate::domain::trade::Trade;

/// Terminal outcome of processing one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchingOutcome {
    /// The order was matched, queued, or both.
    Executed,
    /// The buyer's broker could not cover the order; all effects undone.
    NotEnoughCredit,
    /// The seller's positions could not cover the order.
    NotEnoughPositions,
    /// Less than the minimum execution quantity traded; all effects undone.
    MinimumQuantityNotMet,
    /// A stop-limit order was parked in the deactivated queue.
    Deactivated,
    /// The order was admitted to an auction book without matching.
    OpeningPriceChanged,
}

/// What happened to one order: the outcome, the trades it produced, and the
/// remainder that rests in the book (if any).
#[derive(Debug, Clone)]
pub struct MatchResult {
    outcome: MatchingOutcome,
    remainder: Option<Order>,
    trades: Vec<Trade>,
}

impl MatchResult {
    pub fn executed(remainder: Option<Order>, trades: Vec<Trade>) -> Self {
        Self {
            outcome: MatchingOutcome::Executed,
            remainder,
            trades,
        }
    }

    pub fn not_enough_credit() -> Self {
        Self {
            outcome: MatchingOutcome::NotEnoughCredit,
            remainder: None,
            trades: Vec::new(),
        }
    }

    pub fn not_enough_positions() -> Self {
        Self {
            outcome: MatchingOutcome::NotEnoughPositions,
            remainder: None,
            trades: Vec::new(),
        }
    }

    pub fn minimum_quantity_not_met() -> Self {
        Self {
            outcome: MatchingOutcome::MinimumQuantityNotMet,
            remainder: None,
            trades: Vec::new(),
        }
    }

    pub fn deactivated() -> Self {
        Self {
            outcome: MatchingOutcome::Deactivated,
            remainder: None,
            trades: Vec::new(),
        }
    }

    pub fn opening_price_changed() -> Self {
        Self {
            outcome: MatchingOutcome::OpeningPriceChanged,
            remainder: None,
            trades: Vec::new(),
        }
    }

    pub fn outcome(&self) -> MatchingOutcome {
        self.outcome
    }

    pub fn is_executed(&self) -> bool {
        self.outcome == MatchingOutcome::Executed
    }

    /// Remainder of the incoming order, zero-quantity if fully filled. `None`
    /// for rejections and for auction uncrosses.
    pub fn remainder(&self) -> Option<&Order> {
        self.remainder.as_ref()
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn into_trades(self) -> Vec<Trade> {
        self.trades
    }

    pub fn traded_quantity(&self) -> Quantity {
        self.trades.iter().map(|trade| trade.quantity).sum()
    }
}
