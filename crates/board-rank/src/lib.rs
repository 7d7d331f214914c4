//! Rotating tiered ordering of listings.
//!
//! - `rotation_key` / `RotationWatcher` - Time-bucketed seed and change detection
//! - `sort_by_listing_type` - Tier, verification, then a seeded pseudo-random score
//! - `Pagination` / `paginate` - Slicing a ranked list into pages

mod listing;
mod pagination;
mod rotation;
mod sort;

pub use listing::*;
pub use pagination::*;
pub use rotation::*;
pub use sort::*;
