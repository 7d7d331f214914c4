//! Deadline timers evaluated against a [`Clock`](crate::Clock).
//!
//! Timers hold no callbacks. Owners poll them with the current time and do
//! the due work themselves, so a driver loop (or a test stepping a
//! `ManualClock`) decides when time passes.

use std::time::Duration;

/// Status of a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    /// Not armed.
    Idle,
    /// Armed, firing at the given instant (epoch millis).
    Armed(u64),
}

/// A single-shot deadline, used for debouncing.
#[derive(Debug, Clone)]
pub struct OneShot {
    delay_ms: u64,
    deadline: Option<u64>,
}

impl OneShot {
    /// Create an idle one-shot timer with the given delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay_ms: delay.as_millis() as u64,
            deadline: None,
        }
    }

    /// Arm the timer unless it is already armed.
    ///
    /// Returns `true` when this call armed it.
    pub fn arm_if_idle(&mut self, now_ms: u64) -> bool {
        if self.deadline.is_some() {
            return false;
        }
        self.deadline = Some(now_ms.saturating_add(self.delay_ms));
        true
    }

    /// Cancel the timer.
    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    /// Consume the deadline if it has passed.
    pub fn take_if_due(&mut self, now_ms: u64) -> bool {
        match self.deadline {
            Some(at) if now_ms >= at => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Whether the timer is armed.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Current status.
    pub fn status(&self) -> TimerStatus {
        match self.deadline {
            Some(at) => TimerStatus::Armed(at),
            None => TimerStatus::Idle,
        }
    }
}

/// A repeating deadline.
#[derive(Debug, Clone)]
pub struct Interval {
    period_ms: u64,
    next_at: Option<u64>,
}

impl Interval {
    /// Create a stopped interval with the given period (clamped to 1ms).
    pub fn new(period: Duration) -> Self {
        Self {
            period_ms: (period.as_millis() as u64).max(1),
            next_at: None,
        }
    }

    /// Start ticking; the first tick is one period from `now_ms`.
    pub fn start(&mut self, now_ms: u64) {
        self.next_at = Some(now_ms.saturating_add(self.period_ms));
    }

    /// Stop ticking.
    pub fn stop(&mut self) {
        self.next_at = None;
    }

    /// Whether the interval is running.
    pub fn is_running(&self) -> bool {
        self.next_at.is_some()
    }

    /// Returns `true` if a tick is due and schedules the next one.
    ///
    /// Missed ticks collapse into one: the next tick is scheduled a full
    /// period after `now_ms`.
    pub fn fire_if_due(&mut self, now_ms: u64) -> bool {
        match self.next_at {
            Some(at) if now_ms >= at => {
                self.next_at = Some(now_ms.saturating_add(self.period_ms));
                true
            }
            _ => false,
        }
    }

    /// Period of the interval.
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    /// Current status.
    pub fn status(&self) -> TimerStatus {
        match self.next_at {
            Some(at) => TimerStatus::Armed(at),
            None => TimerStatus::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_arms_once() {
        let mut t = OneShot::new(Duration::from_millis(300));
        assert!(t.arm_if_idle(1_000));
        assert!(!t.arm_if_idle(1_100));
        assert_eq!(t.status(), TimerStatus::Armed(1_300));

        assert!(!t.take_if_due(1_299));
        assert!(t.take_if_due(1_300));
        assert!(!t.is_armed());
        assert!(!t.take_if_due(5_000));
    }

    #[test]
    fn test_one_shot_disarm() {
        let mut t = OneShot::new(Duration::from_millis(300));
        t.arm_if_idle(0);
        t.disarm();
        assert_eq!(t.status(), TimerStatus::Idle);
        assert!(!t.take_if_due(10_000));
    }

    #[test]
    fn test_interval_ticks_and_reschedules() {
        let mut i = Interval::new(Duration::from_secs(10));
        assert!(!i.fire_if_due(100_000));

        i.start(0);
        assert!(!i.fire_if_due(9_999));
        assert!(i.fire_if_due(10_000));
        assert!(!i.fire_if_due(10_001));

        // Several missed periods fire once.
        assert!(i.fire_if_due(55_000));
        assert_eq!(i.status(), TimerStatus::Armed(65_000));

        i.stop();
        assert!(!i.fire_if_due(1_000_000));
    }

    #[test]
    fn test_interval_zero_period_clamped() {
        let i = Interval::new(Duration::ZERO);
        assert_eq!(i.period(), Duration::from_millis(1));
    }
}
