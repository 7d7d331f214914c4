//! Core abstractions for the listing board.
//!
//! This crate provides the fundamental types shared by the ranking, ad
//! serving and telemetry crates:
//! - `Clock` - Injectable wall-clock source (`SystemClock`, `ManualClock`)
//! - `OneShot` / `Interval` - Deadline timers polled against a clock
//! - `ListingId` / `CreativeId` - Newtype identifiers
//! - `BoardConfig` - Rotation, ad and telemetry configuration

mod clock;
mod config;
mod error;
mod ids;
mod timer;

pub use clock::*;
pub use config::*;
pub use error::BoardError;
pub use ids::*;
pub use timer::*;
