//! Tiered ordering with a rotating tie-break.
//!
//! Listings are ordered by tier, then verification, then a pseudo-random
//! score derived from the listing ID and a seed. Seeding with the rotation
//! key shuffles each tier once per window and keeps the order fixed in
//! between, so no listing holds the top of its tier forever and the page
//! does not reshuffle on every render.

use std::cmp::Reverse;
use std::time::Duration;

use board_core::Clock;

use crate::listing::{tier_rank, Rankable};
use crate::rotation::current_rotation_key;

/// 32-bit rolling hash (`h = h * 31 + unit`) over the UTF-16 code units of
/// `id` followed by the decimal `seed`.
pub fn rolling_hash(id: &str, seed: u64) -> i32 {
    let seed = seed.to_string();
    id.encode_utf16()
        .chain(seed.encode_utf16())
        .fold(0i32, |h, unit| {
            h.wrapping_shl(5).wrapping_sub(h).wrapping_add(unit as i32)
        })
}

/// Rolling hash mixed through the murmur3 32-bit finalizer, so adjacent
/// seeds give unrelated scores for the same ID.
pub fn rotation_hash(id: &str, seed: u64) -> u32 {
    let mut h = rolling_hash(id, seed) as u32;
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// Tie-break score in thousandths, `0..1000`.
pub fn rotation_score_millis(id: &str, seed: u64) -> u32 {
    rotation_hash(id, seed) % 1000
}

/// Tie-break score in `[0, 1)`.
pub fn rotation_score(id: &str, seed: u64) -> f64 {
    f64::from(rotation_score_millis(id, seed)) / 1000.0
}

/// Composite sort key; ascending order of the key is the display order.
fn rank_key<T: Rankable>(item: &T, seed: u64) -> (Reverse<u8>, Reverse<bool>, Reverse<u32>) {
    (
        Reverse(tier_rank(item.tier())),
        Reverse(item.is_verified()),
        Reverse(rotation_score_millis(item.rank_id(), seed)),
    )
}

/// Order listings by tier, verification and the seeded score.
///
/// Returns a new vector; the input is left untouched. Two listings whose
/// scores collide keep an unspecified relative order.
pub fn sort_by_listing_type<T: Rankable + Clone>(items: &[T], seed: u64) -> Vec<T> {
    let mut sorted = items.to_vec();
    sorted.sort_by_cached_key(|item| rank_key(item, seed));
    sorted
}

/// Order listings for the rotation window the clock is currently in.
pub fn sort_for_window<T: Rankable + Clone>(items: &[T], clock: &impl Clock, window: Duration) -> Vec<T> {
    let key = current_rotation_key(clock, window);
    sort_by_listing_type(items, key.value())
}
