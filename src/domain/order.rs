// ============================================================================
// Order Domain Model
// ============================================================================

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Value Objects
// ============================================================================

/// Prices are integral minor currency units (the tick grid is integral).
pub type Price = u64;
/// Share quantities.
pub type Quantity = u64;
/// Monetary values (price × quantity).
pub type Value = u64;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name(u64);

        impl $name {
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            pub const fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Caller-assigned order identifier, unique per security and side.
    OrderId
);
id_type!(
    /// Identifier of the request that created or last touched an order.
    RequestId
);
id_type!(
    /// Identifier of the broker whose credit backs an order.
    BrokerId
);
id_type!(
    /// Identifier of the shareholder whose position backs an order.
    ShareholderId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Order lifecycle status.
///
/// A `Snapshot` is an immutable point-in-time copy taken before a mutating
/// operation; it is used for trade records and rollback and never re-enters
/// a book except through an explicit restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderStatus {
    New,
    Queued,
    Snapshot,
}

/// Variant payload distinguishing the order flavours.
///
/// Plain limit orders carry nothing extra. Icebergs track the peak size and
/// the currently displayed slice. Stop-limit orders carry the trigger price
/// and whether they have been activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderKind {
    Limit,
    Iceberg {
        peak_size: Quantity,
        displayed: Quantity,
    },
    StopLimit {
        stop_price: Price,
        active: bool,
    },
}

// ============================================================================
// Order Entity
// ============================================================================

/// A resting or incoming order for a single security.
///
/// `quantity` is the total remaining quantity; for a queued iceberg the
/// publicly visible quantity is the displayed slice (see [`Order::quantity`]).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Order {
    pub id: OrderId,
    pub request_id: RequestId,
    pub instrument: Arc<String>,
    pub side: Side,
    pub price: Price,
    quantity: Quantity,
    pub broker: BrokerId,
    pub shareholder: ShareholderId,
    pub entry_time: DateTime<Utc>,
    status: OrderStatus,
    kind: OrderKind,
}

impl Order {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: OrderId,
        request_id: RequestId,
        instrument: Arc<String>,
        side: Side,
        quantity: Quantity,
        price: Price,
        broker: BrokerId,
        shareholder: ShareholderId,
        entry_time: DateTime<Utc>,
        kind: OrderKind,
    ) -> Self {
        let kind = match kind {
            OrderKind::Iceberg { peak_size, .. } => OrderKind::Iceberg {
                peak_size,
                displayed: peak_size.min(quantity),
            },
            other => other,
        };
        Self {
            id,
            request_id,
            instrument,
            side,
            price,
            quantity,
            broker,
            shareholder,
            entry_time,
            status: OrderStatus::New,
            kind,
        }
    }

    /// Convenience constructor for a plain limit order.
    #[allow(clippy::too_many_arguments)]
    pub fn limit(
        id: OrderId,
        instrument: Arc<String>,
        side: Side,
        quantity: Quantity,
        price: Price,
        broker: BrokerId,
        shareholder: ShareholderId,
    ) -> Self {
        Self::new(
            id,
            RequestId::new(0),
            instrument,
            side,
            quantity,
            price,
            broker,
            shareholder,
            Utc::now(),
            OrderKind::Limit,
        )
    }

    /// Convenience constructor for an iceberg order.
    #[allow(clippy::too_many_arguments)]
    pub fn iceberg(
        id: OrderId,
        instrument: Arc<String>,
        side: Side,
        quantity: Quantity,
        price: Price,
        broker: BrokerId,
        shareholder: ShareholderId,
        peak_size: Quantity,
    ) -> Self {
        Self::new(
            id,
            RequestId::new(0),
            instrument,
            side,
            quantity,
            price,
            broker,
            shareholder,
            Utc::now(),
            OrderKind::Iceberg {
                peak_size,
                displayed: peak_size,
            },
        )
    }

    /// Convenience constructor for a stop-limit order (initially inactive).
    #[allow(clippy::too_many_arguments)]
    pub fn stop_limit(
        id: OrderId,
        request_id: RequestId,
        instrument: Arc<String>,
        side: Side,
        quantity: Quantity,
        price: Price,
        broker: BrokerId,
        shareholder: ShareholderId,
        stop_price: Price,
    ) -> Self {
        Self::new(
            id,
            request_id,
            instrument,
            side,
            quantity,
            price,
            broker,
            shareholder,
            Utc::now(),
            OrderKind::StopLimit {
                stop_price,
                active: false,
            },
        )
    }

    // ========================================================================
    // Quantity accounting
    // ========================================================================

    /// Publicly visible quantity: the displayed slice for a queued iceberg,
    /// the full remaining quantity otherwise.
    pub fn quantity(&self) -> Quantity {
        match self.kind {
            OrderKind::Iceberg { displayed, .. } if self.status != OrderStatus::New => displayed,
            _ => self.quantity,
        }
    }

    /// Total remaining quantity, hidden iceberg remainder included.
    pub fn total_quantity(&self) -> Quantity {
        self.quantity
    }

    /// Full remaining order value (price × total remaining quantity). This is
    /// the amount a buy order reserves against broker credit while resting.
    pub fn value(&self) -> Value {
        self.price * self.quantity
    }

    /// Reduce the remaining quantity by `amount`. For queued icebergs the
    /// displayed slice shrinks in lock step; `amount` must not exceed the
    /// visible quantity.
    pub fn decrease_quantity(&mut self, amount: Quantity) {
        if let OrderKind::Iceberg { displayed, .. } = &mut self.kind {
            if self.status != OrderStatus::New {
                assert!(
                    amount <= *displayed,
                    "iceberg fill {amount} exceeds displayed slice {displayed}"
                );
                *displayed -= amount;
            }
        }
        assert!(
            amount <= self.quantity,
            "fill {amount} exceeds remaining quantity {}",
            self.quantity
        );
        self.quantity -= amount;
    }

    /// Refill an iceberg's displayed slice from the hidden remainder. No-op
    /// for other kinds.
    pub fn replenish(&mut self) {
        if let OrderKind::Iceberg {
            peak_size,
            displayed,
        } = &mut self.kind
        {
            *displayed = (*peak_size).min(self.quantity);
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Transition to `Queued`, refreshing an iceberg's displayed slice.
    pub fn queue(&mut self) {
        self.status = OrderStatus::Queued;
        self.replenish();
    }

    /// Transition to `Queued` without touching the displayed slice. Used when
    /// restoring a snapshot, which must be bit-exact.
    pub fn mark_queued(&mut self) {
        self.status = OrderStatus::Queued;
    }

    pub fn mark_new(&mut self) {
        self.status = OrderStatus::New;
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn kind(&self) -> OrderKind {
        self.kind
    }

    /// Immutable point-in-time copy for trade records and rollback.
    pub fn snapshot(&self) -> Order {
        let mut copy = self.clone();
        copy.status = OrderStatus::Snapshot;
        copy
    }

    // ========================================================================
    // Priority and crossing
    // ========================================================================

    /// Active-book priority: strictly better price queues first; entry order
    /// breaks ties through stable insertion.
    pub fn queues_before(&self, other: &Order) -> bool {
        match self.side {
            Side::Buy => self.price > other.price,
            Side::Sell => self.price < other.price,
        }
    }

    /// Deactivated-queue priority: closer to triggering queues first
    /// (ascending stop price for buys, descending for sells).
    pub fn triggers_before(&self, other: &Order) -> bool {
        let (a, b) = match (self.stop_price(), other.stop_price()) {
            (Some(a), Some(b)) => (a, b),
            _ => return false,
        };
        match self.side {
            Side::Buy => a < b,
            Side::Sell => a > b,
        }
    }

    /// Whether this order crosses a resting order at `price` on the other
    /// side.
    pub fn crosses(&self, price: Price) -> bool {
        match self.side {
            Side::Buy => self.price >= price,
            Side::Sell => self.price <= price,
        }
    }

    // ========================================================================
    // Stop-limit behaviour
    // ========================================================================

    pub fn stop_price(&self) -> Option<Price> {
        match self.kind {
            OrderKind::StopLimit { stop_price, .. } => Some(stop_price),
            _ => None,
        }
    }

    pub fn peak_size(&self) -> Option<Quantity> {
        match self.kind {
            OrderKind::Iceberg { peak_size, .. } => Some(peak_size),
            _ => None,
        }
    }

    pub fn is_inactive_stop(&self) -> bool {
        matches!(self.kind, OrderKind::StopLimit { active: false, .. })
    }

    pub fn is_active_stop(&self) -> bool {
        matches!(self.kind, OrderKind::StopLimit { active: true, .. })
    }

    /// Whether this order may enter the active book at the given last-traded
    /// price. Trivially true for anything but an inactive stop-limit order.
    pub fn stop_triggered(&self, last_trade_price: Price) -> bool {
        match self.kind {
            OrderKind::StopLimit {
                stop_price,
                active: false,
            } => match self.side {
                Side::Buy => last_trade_price >= stop_price,
                Side::Sell => last_trade_price <= stop_price,
            },
            _ => true,
        }
    }

    pub fn activate(&mut self) {
        if let OrderKind::StopLimit { active, .. } = &mut self.kind {
            *active = true;
            tracing::debug!(order_id = %self.id, "stop order activated");
        }
    }

    pub fn deactivate(&mut self) {
        if let OrderKind::StopLimit { active, .. } = &mut self.kind {
            *active = false;
        }
    }

    // ========================================================================
    // Updates
    // ========================================================================

    /// Apply an update request in place. The caller is responsible for the
    /// priority and credit consequences.
    pub fn update_from_request(&mut self, rq: &crate::domain::request::OrderRequest) {
        self.quantity = rq.quantity;
        self.price = rq.price;
        self.request_id = rq.request_id;
        match &mut self.kind {
            OrderKind::Iceberg {
                peak_size,
                displayed,
            } => {
                // The displayed slice only ever shrinks here. Replenishment
                // happens on re-enqueue and costs time priority, so an
                // in-place update must not refill a partially eaten slice.
                *peak_size = rq.peak_size;
                *displayed = (*displayed).min(rq.quantity);
            }
            OrderKind::StopLimit { stop_price, .. } => {
                if rq.stop_price > 0 {
                    *stop_price = rq.stop_price;
                }
            }
            OrderKind::Limit => {}
        }
    }
}
