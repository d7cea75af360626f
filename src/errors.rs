// ============================================================================
// Request Errors
// ============================================================================

use thiserror::Error;

/// Structural rejections of update and delete requests.
///
/// These are distinct from solvency outcomes: a request that is well formed
/// but underfunded comes back as a [`MatchingOutcome`], not an error.
///
/// [`MatchingOutcome`]: crate::engine::MatchingOutcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("order id not found")]
    OrderNotFound,
    #[error("an iceberg order must keep a positive peak size")]
    PeakSizeRequired,
    #[error("peak size cannot be set on a non-iceberg order")]
    PeakSizeNotAllowed,
    #[error("stop price cannot be set on a non-stop order")]
    StopPriceNotAllowed,
    #[error("stop price of an activated stop order cannot be changed")]
    StopPriceImmutable,
}
