//! Time-bucketed rotation keys.
//!
//! A rotation key is `floor(now / window)`. Every client computes it from
//! wall-clock time alone, so all visitors inside one window share the same
//! ordering and the ordering changes by itself when the window rolls over.

use std::fmt;
use std::time::Duration;

use board_core::{Clock, Interval, RotationConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Index of a rotation window since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RotationKey(pub u64);

impl RotationKey {
    /// Key value, used as the sorter seed.
    pub fn value(self) -> u64 {
        self.0
    }

    /// Half-open `[start, end)` bounds of this window in epoch millis.
    pub fn window_bounds(self, window: Duration) -> (u64, u64) {
        let w = window_millis(window);
        let start = self.0.saturating_mul(w);
        (start, start.saturating_add(w))
    }

    /// Start and end of this window as timestamps.
    pub fn window_span(self, window: Duration) -> (DateTime<Utc>, DateTime<Utc>) {
        let (start, end) = self.window_bounds(window);
        (
            board_core::millis_to_datetime(start),
            board_core::millis_to_datetime(end),
        )
    }
}

impl fmt::Display for RotationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn window_millis(window: Duration) -> u64 {
    (window.as_millis() as u64).max(1)
}

/// Rotation key for an instant. A zero window is treated as one millisecond.
pub fn rotation_key(now_ms: u64, window: Duration) -> RotationKey {
    RotationKey(now_ms / window_millis(window))
}

/// Rotation key for the clock's current instant.
pub fn current_rotation_key(clock: &impl Clock, window: Duration) -> RotationKey {
    rotation_key(clock.now_ms(), window)
}

/// Milliseconds until the next window starts.
pub fn time_until_rotation(now_ms: u64, window: Duration) -> Duration {
    let (_, end) = rotation_key(now_ms, window).window_bounds(window);
    Duration::from_millis(end - now_ms)
}

/// Detects when a long-lived client crosses into a new rotation window.
///
/// Checks at a fixed cadence rather than on every render; the first check
/// after a boundary reports the new key once.
#[derive(Debug)]
pub struct RotationWatcher<C: Clock> {
    clock: C,
    window: Duration,
    check: Interval,
    last: RotationKey,
}

impl<C: Clock> RotationWatcher<C> {
    /// Create a watcher. Call [`start`](Self::start) to begin checking.
    pub fn new(clock: C, window: Duration, check_every: Duration) -> Self {
        let last = current_rotation_key(&clock, window);
        Self {
            clock,
            window,
            check: Interval::new(check_every),
            last,
        }
    }

    /// Create a watcher from configuration.
    pub fn from_config(clock: C, config: &RotationConfig) -> Self {
        Self::new(clock, config.window(), config.check_interval())
    }

    /// Observe the current key and arm the periodic check.
    pub fn start(&mut self) -> RotationKey {
        let now = self.clock.now_ms();
        self.last = rotation_key(now, self.window);
        self.check.start(now);
        self.last
    }

    /// Run the periodic check if due.
    ///
    /// Returns the new key when a check observes a different window.
    pub fn poll(&mut self) -> Option<RotationKey> {
        let now = self.clock.now_ms();
        if !self.check.fire_if_due(now) {
            return None;
        }

        let key = rotation_key(now, self.window);
        if key == self.last {
            return None;
        }

        debug!(previous = %self.last, current = %key, "rotation window changed");
        self.last = key;
        Some(key)
    }

    /// Key observed by the last check.
    pub fn current(&self) -> RotationKey {
        self.last
    }

    /// Rotation window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Whether the periodic check is armed.
    pub fn is_running(&self) -> bool {
        self.check.is_running()
    }

    /// Stop checking.
    pub fn dispose(&mut self) {
        self.check.stop();
    }
}
