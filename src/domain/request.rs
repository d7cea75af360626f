// ============================================================================
// Order Requests
// ============================================================================

use chrono::{DateTime, Utc};

use crate::domain::order::{BrokerId, OrderId, Price, Quantity, RequestId, ShareholderId, Side};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of a new-order or update-order request.
///
/// A zero `peak_size` means a plain (non-iceberg) order and a zero
/// `stop_price` means no stop trigger; the two are mutually exclusive at the
/// gateway, which is not this crate's concern.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderRequest {
    pub request_id: RequestId,
    pub order_id: OrderId,
    pub instrument: String,
    pub side: Side,
    pub quantity: Quantity,
    pub price: Price,
    pub broker: BrokerId,
    pub shareholder: ShareholderId,
    pub entry_time: DateTime<Utc>,
    pub minimum_execution_quantity: Quantity,
    pub peak_size: Quantity,
    pub stop_price: Price,
}

impl OrderRequest {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        request_id: RequestId,
        order_id: OrderId,
        instrument: &str,
        side: Side,
        quantity: Quantity,
        price: Price,
        broker: BrokerId,
        shareholder: ShareholderId,
    ) -> Self {
        Self {
            request_id,
            order_id,
            instrument: instrument.to_string(),
            side,
            quantity,
            price,
            broker,
            shareholder,
            entry_time: Utc::now(),
            minimum_execution_quantity: 0,
            peak_size: 0,
            stop_price: 0,
        }
    }

    pub fn with_minimum_execution_quantity(mut self, quantity: Quantity) -> Self {
        self.minimum_execution_quantity = quantity;
        self
    }

    pub fn with_peak_size(mut self, peak_size: Quantity) -> Self {
        self.peak_size = peak_size;
        self
    }

    pub fn with_stop_price(mut self, stop_price: Price) -> Self {
        self.stop_price = stop_price;
        self
    }

    pub fn with_entry_time(mut self, entry_time: DateTime<Utc>) -> Self {
        self.entry_time = entry_time;
        self
    }
}
