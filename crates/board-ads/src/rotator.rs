//! Per-slot ad rotation.

use std::time::Duration;

use board_core::{AdConfig, Clock, Interval};
use rand::Rng;
use tracing::debug;

use crate::creative::{live_pool, Creative, Position};
use crate::select::select_weighted_with_default;

/// Rotates one rendered ad slot among the live creatives of its placement.
///
/// The first draw happens on [`start`](Self::start); afterwards the slot
/// re-draws every interval. Each rotator has its own randomness and is not
/// synchronized with other slots, tabs or users.
#[derive(Debug)]
pub struct AdRotator<C: Clock, R: Rng> {
    clock: C,
    rng: R,
    position: Position,
    pool: Vec<Creative>,
    default_weight: i64,
    redraw: Interval,
    current: Option<usize>,
}

impl<C: Clock, R: Rng> AdRotator<C, R> {
    /// Create a rotator for a placement.
    ///
    /// Creatives for other placements, inactive ones and ones outside their
    /// schedule are filtered out whenever a draw happens.
    pub fn new(clock: C, rng: R, position: Position, creatives: Vec<Creative>, config: &AdConfig) -> Self {
        Self {
            clock,
            rng,
            position,
            pool: creatives,
            default_weight: config.default_priority,
            redraw: Interval::new(config.redraw_interval()),
            current: None,
        }
    }

    /// Draw the initial creative and arm the re-draw interval.
    pub fn start(&mut self) -> Option<&Creative> {
        self.redraw.start(self.clock.now_ms());
        self.draw();
        self.current()
    }

    /// Re-draw if the interval has elapsed.
    ///
    /// Returns the freshly drawn creative when a re-draw happened, which is
    /// when the caller should record a new impression.
    pub fn poll(&mut self) -> Option<&Creative> {
        if !self.redraw.fire_if_due(self.clock.now_ms()) {
            return None;
        }
        self.draw();
        self.current()
    }

    /// Swap in a new set of creatives (e.g. after a refetch) and re-draw now.
    pub fn replace_pool(&mut self, creatives: Vec<Creative>) -> Option<&Creative> {
        self.pool = creatives;
        self.draw();
        self.current()
    }

    /// Creative currently shown.
    pub fn current(&self) -> Option<&Creative> {
        self.current.and_then(|i| self.pool.get(i))
    }

    /// Placement this rotator serves.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Re-draw interval.
    pub fn interval(&self) -> Duration {
        self.redraw.period()
    }

    /// Whether the re-draw interval is armed.
    pub fn is_running(&self) -> bool {
        self.redraw.is_running()
    }

    /// Stop re-drawing. The current creative stays selected.
    pub fn dispose(&mut self) {
        self.redraw.stop();
    }

    fn draw(&mut self) {
        let now = self.clock.now();
        let live = live_pool(&self.pool, self.position, now);
        let picked = select_weighted_with_default(&live, self.default_weight, &mut self.rng)
            .map(|c| c.id.clone());

        self.current = picked.and_then(|id| self.pool.iter().position(|c| c.id == id));
        debug!(
            position = %self.position,
            live = live.len(),
            creative = ?self.current().map(|c| c.id.as_str()),
            "ad slot drawn"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_core::ManualClock;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn creatives() -> Vec<Creative> {
        vec![
            Creative::new("a", Position::HeaderBanner),
            Creative::new("b", Position::HeaderBanner),
            Creative::new("c", Position::HeaderBanner),
            Creative::new("side", Position::SidebarLeft),
        ]
    }

    fn rotator(clock: &ManualClock, creatives: Vec<Creative>) -> AdRotator<ManualClock, StdRng> {
        AdRotator::new(
            clock.clone(),
            StdRng::seed_from_u64(11),
            Position::HeaderBanner,
            creatives,
            &AdConfig::default(),
        )
    }

    #[test]
    fn test_initial_draw_on_start() {
        let clock = ManualClock::new(1_700_000_000_000);
        let mut r = rotator(&clock, creatives());
        assert!(r.current().is_none());

        let picked = r.start().unwrap();
        assert_eq!(picked.position, Position::HeaderBanner);
        assert!(r.is_running());
    }

    #[test]
    fn test_redraw_only_after_interval() {
        let clock = ManualClock::new(1_700_000_000_000);
        let mut r = rotator(&clock, creatives());
        r.start();

        clock.advance_ms(29_999);
        assert!(r.poll().is_none());

        clock.advance_ms(1);
        assert!(r.poll().is_some());
    }

    #[test]
    fn test_rotation_visits_every_creative() {
        let clock = ManualClock::new(1_700_000_000_000);
        let mut r = rotator(&clock, creatives());
        let mut seen = HashSet::new();
        seen.insert(r.start().unwrap().id.clone());

        for _ in 0..60 {
            clock.advance(r.interval());
            seen.insert(r.poll().unwrap().id.clone());
        }
        let seen: HashSet<&str> = seen.iter().map(|id| id.as_str()).collect();
        assert_eq!(seen, HashSet::from(["a", "b", "c"]));
    }

    #[test]
    fn test_empty_pool_yields_nothing() {
        let clock = ManualClock::new(1_700_000_000_000);
        let mut r = rotator(&clock, vec![Creative::new("side", Position::SidebarLeft)]);
        assert!(r.start().is_none());

        clock.advance_ms(30_000);
        assert!(r.poll().is_none());
        assert!(r.current().is_none());
    }

    #[test]
    fn test_replace_pool_redraws() {
        let clock = ManualClock::new(1_700_000_000_000);
        let mut r = rotator(&clock, Vec::new());
        assert!(r.start().is_none());

        let picked = r.replace_pool(vec![Creative::new("fresh", Position::HeaderBanner)]);
        assert_eq!(picked.unwrap().id.as_str(), "fresh");
    }

    #[test]
    fn test_dispose_stops_redraws() {
        let clock = ManualClock::new(1_700_000_000_000);
        let mut r = rotator(&clock, creatives());
        let first = r.start().unwrap().id.clone();
        r.dispose();

        clock.advance_ms(10 * 30_000);
        assert!(r.poll().is_none());
        assert_eq!(r.current().unwrap().id, first);
    }
}
