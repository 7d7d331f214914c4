//! CLI command implementations.

pub mod pick;
pub mod rank;
pub mod replay;
pub mod rotation;
pub mod slots;

use std::time::Duration;

use board_ads::Position;
use board_core::RotationConfig;
use chrono::{DateTime, Utc};
use clap::Args;

/// Arguments for the rank command.
#[derive(Args)]
pub struct RankArgs {
    /// JSON file with an array of listings.
    pub listings: String,

    /// Explicit sorter seed instead of the rotation key.
    #[arg(long, conflicts_with = "at")]
    pub seed: Option<u64>,

    /// Rank as of this instant (RFC 3339).
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,

    /// Override the rotation window length.
    #[arg(long)]
    pub window_minutes: Option<u64>,

    /// Page to show (1-indexed).
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Listings per page.
    #[arg(long, default_value_t = 20)]
    pub per_page: usize,
}

/// Arguments for the rotation command.
#[derive(Args)]
pub struct RotationArgs {
    /// Instant to inspect (RFC 3339); defaults to now.
    #[arg(long, conflicts_with = "watch")]
    pub at: Option<DateTime<Utc>>,

    /// Override the rotation window length.
    #[arg(long)]
    pub window_minutes: Option<u64>,

    /// Keep running and report each rotation as it happens.
    #[arg(long)]
    pub watch: bool,
}

/// Arguments for the pick command.
#[derive(Args)]
pub struct PickArgs {
    /// JSON file with an array of creatives.
    pub creatives: String,

    /// Placement to draw for (e.g. `inline_grid`).
    #[arg(short, long)]
    pub position: Position,

    /// Number of simulated draws.
    #[arg(short, long, default_value_t = 10_000)]
    pub draws: usize,

    /// RNG seed for a reproducible simulation.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Evaluate schedules as of this instant (RFC 3339).
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,
}

/// Arguments for the slots command.
#[derive(Args)]
pub struct SlotsArgs {
    /// JSON file with an array of creatives.
    pub creatives: String,

    /// Evaluate schedules as of this instant (RFC 3339).
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,
}

/// Arguments for the replay-events command.
#[derive(Args)]
pub struct ReplayEventsArgs {
    /// JSON file with a collector payload (batch or single event).
    pub events: String,

    /// Send to an in-memory collector instead of the configured endpoint.
    #[arg(long)]
    pub dry_run: bool,

    /// Collector endpoint, overriding the config.
    #[arg(long)]
    pub collector_url: Option<String>,
}

/// Rotation window from an explicit override or the config.
pub(crate) fn rotation_window(config: &RotationConfig, override_minutes: Option<u64>) -> Duration {
    match override_minutes {
        Some(minutes) => Duration::from_secs(minutes.max(1) * 60),
        None => config.window(),
    }
}
