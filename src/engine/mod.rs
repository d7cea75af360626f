// ============================================================================
// Matching Engine
// ============================================================================

//! The matching engine: per-security orchestration, the continuous and
//! auction matchers, opening-price calculation and match results.

pub mod match_result;
pub mod matcher;
pub mod price_calculator;
pub mod security;

pub use match_result::{MatchResult, MatchingOutcome};
pub use price_calculator::OpeningPrice;
pub use security::{Activation, Security, StateChange};
