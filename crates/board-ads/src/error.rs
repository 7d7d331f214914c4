//! Ad serving error types.

use thiserror::Error;

use crate::{Position, SlotUsage};

/// Errors raised by operator-side ad checks.
///
/// Selection itself never fails; these cover input parsing and capacity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdError {
    /// Placement name not recognised.
    #[error("Unknown ad position: {0}")]
    UnknownPosition(String),

    /// Placement already holds its maximum number of creatives.
    #[error("No free slot for {position}: {usage} in use")]
    SlotFull { position: Position, usage: SlotUsage },
}
