//! Batched ad impression and click telemetry.
//!
//! This crate provides:
//! - `AdEvent` / `CollectorPayload` - Event records and the collector wire format
//! - `EventQueue` - Dedup, debounce and overflow batching state machine
//! - `Collector` - Transport trait (`HttpCollector`, `MemoryCollector`)
//! - `TelemetryPipeline` / `QueueDriver` - Async flushing on a tokio runtime
//! - `tally` - Per-creative counters from received events
//!
//! Telemetry is best effort: nothing here surfaces an error to the caller
//! of `enqueue`, and failed batches are logged and dropped.

mod collector;
mod error;
mod event;
mod pipeline;
mod queue;
mod tally;

pub use collector::*;
pub use error::CollectorError;
pub use event::*;
pub use pipeline::*;
pub use queue::*;
pub use tally::*;
