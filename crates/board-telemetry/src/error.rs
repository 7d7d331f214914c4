//! Collector error types.

use thiserror::Error;

/// Errors from delivering or parsing event batches.
#[derive(Error, Debug)]
pub enum CollectorError {
    /// The request could not be sent.
    #[error("Collector request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The collector answered with a non-success status.
    #[error("Collector returned HTTP {0}")]
    Status(u16),

    /// A detached send did not run to completion.
    #[error("Collector send aborted: {0}")]
    Aborted(String),

    /// The collector is not reachable.
    #[error("Collector unavailable: {0}")]
    Unavailable(String),

    /// Request body is not a valid payload.
    #[error("Invalid collector payload: {0}")]
    Payload(#[from] serde_json::Error),
}
