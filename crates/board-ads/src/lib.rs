//! Banner and popup ad serving.
//!
//! This crate provides:
//! - `Creative` / `Position` - Advertisement model and placements
//! - `select_weighted` - Priority-proportional random selection
//! - `AdRotator` - Per-slot initial draw plus periodic re-draw
//! - `slot_usage` / `ensure_capacity` - Read-side placement capacity checks
//! - `interleave` - Mixing ad cells into a listing grid

mod creative;
mod error;
mod layout;
mod rotator;
mod select;
mod slots;

pub use creative::*;
pub use error::AdError;
pub use layout::*;
pub use rotator::*;
pub use select::*;
pub use slots::*;
