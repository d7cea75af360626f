// ============================================================================
// Security Configuration
// ============================================================================

use crate::domain::order::Price;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Trading session state of a security.
///
/// Continuous matches each incoming order immediately; Auction accumulates
/// orders and trades them all at a single opening price on uncross.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MatchingState {
    Continuous,
    Auction,
}

/// Static parameters of a security.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SecurityConfig {
    pub instrument: String,
    pub tick_size: u64,
    pub lot_size: u64,
    /// Last-traded price the security starts with, used as the reference for
    /// stop triggers and opening-price closeness before any trade happens.
    pub reference_price: Price,
    pub initial_state: MatchingState,
}

impl SecurityConfig {
    pub fn new(instrument: &str) -> Self {
        Self {
            instrument: instrument.to_string(),
            tick_size: 1,
            lot_size: 1,
            reference_price: 0,
            initial_state: MatchingState::Continuous,
        }
    }

    pub fn with_tick_size(mut self, tick_size: u64) -> Self {
        self.tick_size = tick_size;
        self
    }

    pub fn with_lot_size(mut self, lot_size: u64) -> Self {
        self.lot_size = lot_size;
        self
    }

    pub fn with_reference_price(mut self, reference_price: Price) -> Self {
        self.reference_price = reference_price;
        self
    }

    pub fn with_initial_state(mut self, state: MatchingState) -> Self {
        self.initial_state = state;
        self
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self::new("")
    }
}
