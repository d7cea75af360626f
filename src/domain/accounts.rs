// ============================================================================
// Brokers, Shareholders and the Account Ledger
// ============================================================================

use std::collections::HashMap;

use crate::domain::order::{BrokerId, Quantity, ShareholderId, Value};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A broker account holding the credit that backs its buy orders.
///
/// Credit is reserved whenever a buy order rests in a book (active or
/// deactivated) and released when the order trades, shrinks or is removed.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Broker {
    id: BrokerId,
    credit: Value,
}

impl Broker {
    pub fn new(id: BrokerId, credit: Value) -> Self {
        Self { id, credit }
    }

    pub fn id(&self) -> BrokerId {
        self.id
    }

    pub fn credit(&self) -> Value {
        self.credit
    }

    pub fn has_enough_credit(&self, amount: Value) -> bool {
        self.credit >= amount
    }

    pub fn increase_credit(&mut self, amount: Value) {
        self.credit += amount;
    }

    /// Unconditionally debit. Panics on underflow, which would mean a trade
    /// was admitted past a solvency check that should have rejected it.
    pub fn decrease_credit(&mut self, amount: Value) {
        assert!(
            self.credit >= amount,
            "broker {} credit underflow: {} < {}",
            self.id,
            self.credit,
            amount
        );
        self.credit -= amount;
    }

    /// Debit if covered, otherwise leave the account untouched.
    pub fn try_decrease_credit(&mut self, amount: Value) -> bool {
        if self.credit >= amount {
            self.credit -= amount;
            true
        } else {
            false
        }
    }
}

/// A shareholder account holding per-instrument positions.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Shareholder {
    id: ShareholderId,
    positions: HashMap<String, Quantity>,
}

impl Shareholder {
    pub fn new(id: ShareholderId) -> Self {
        Self {
            id,
            positions: HashMap::new(),
        }
    }

    pub fn id(&self) -> ShareholderId {
        self.id
    }

    pub fn position_on(&self, instrument: &str) -> Quantity {
        self.positions.get(instrument).copied().unwrap_or(0)
    }

    /// Whether the position covers `required` shares, counting every resting
    /// sell commitment the caller includes in `required`.
    pub fn has_enough_positions_on(&self, instrument: &str, required: Quantity) -> bool {
        self.position_on(instrument) >= required
    }

    pub fn increase_position(&mut self, instrument: &str, amount: Quantity) {
        *self.positions.entry(instrument.to_string()).or_insert(0) += amount;
    }

    pub fn decrease_position(&mut self, instrument: &str, amount: Quantity) {
        let position = self
            .positions
            .get_mut(instrument)
            .unwrap_or_else(|| panic!("shareholder {} has no position on {instrument}", self.id));
        assert!(
            *position >= amount,
            "shareholder {} position underflow on {instrument}: {} < {}",
            self.id,
            position,
            amount
        );
        *position -= amount;
    }
}

/// Registry of every broker and shareholder known to the engine.
///
/// Orders reference accounts by id; lookups of unknown ids panic, since an
/// order can only enter a book through a request that named a registered
/// account.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AccountLedger {
    brokers: HashMap<BrokerId, Broker>,
    shareholders: HashMap<ShareholderId, Shareholder>,
}

impl AccountLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_broker(&mut self, broker: Broker) {
        self.brokers.insert(broker.id(), broker);
    }

    pub fn add_shareholder(&mut self, shareholder: Shareholder) {
        self.shareholders.insert(shareholder.id(), shareholder);
    }

    pub fn broker(&self, id: BrokerId) -> &Broker {
        self.brokers
            .get(&id)
            .unwrap_or_else(|| panic!("unknown broker {id}"))
    }

    pub fn broker_mut(&mut self, id: BrokerId) -> &mut Broker {
        self.brokers
            .get_mut(&id)
            .unwrap_or_else(|| panic!("unknown broker {id}"))
    }

    pub fn shareholder(&self, id: ShareholderId) -> &Shareholder {
        self.shareholders
            .get(&id)
            .unwrap_or_else(|| panic!("unknown shareholder {id}"))
    }

    pub fn shareholder_mut(&mut self, id: ShareholderId) -> &mut Shareholder {
        self.shareholders
            .get_mut(&id)
            .unwrap_or_else(|| panic!("unknown shareholder {id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broker_credit_guards() {
        let mut broker = Broker::new(BrokerId::new(1), 1_000);
        assert!(broker.has_enough_credit(1_000));
        assert!(!broker.has_enough_credit(1_001));

        assert!(broker.try_decrease_credit(400));
        assert_eq!(broker.credit(), 600);
        assert!(!broker.try_decrease_credit(601));
        assert_eq!(broker.credit(), 600);

        broker.increase_credit(50);
        broker.decrease_credit(650);
        assert_eq!(broker.credit(), 0);
    }

    #[test]
    #[should_panic(expected = "credit underflow")]
    fn unconditional_debit_panics_on_underflow() {
        let mut broker = Broker::new(BrokerId::new(1), 10);
        broker.decrease_credit(11);
    }

    #[test]
    fn shareholder_positions_per_instrument() {
        let mut holder = Shareholder::new(ShareholderId::new(1));
        holder.increase_position("IRO1MAPN0001", 100_000);
        holder.increase_position("IRO1MSMI0001", 500);

        assert!(holder.has_enough_positions_on("IRO1MAPN0001", 100_000));
        assert!(!holder.has_enough_positions_on("IRO1MAPN0001", 100_001));
        assert_eq!(holder.position_on("IRO1ABSENT01"), 0);

        holder.decrease_position("IRO1MSMI0001", 500);
        assert_eq!(holder.position_on("IRO1MSMI0001"), 0);
    }

    #[test]
    #[should_panic(expected = "unknown broker")]
    fn unknown_broker_lookup_panics() {
        let ledger = AccountLedger::new();
        ledger.broker(BrokerId::new(42));
    }
}
