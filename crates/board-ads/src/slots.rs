//! Placement capacity accounting.
//!
//! Capacity is a read-side aggregate for the operator UI. There is no
//! reservation or locking: creating creatives is rare and last write wins.

use std::collections::BTreeMap;
use std::fmt;

use board_core::AdConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::creative::{Creative, Position};
use crate::AdError;

/// Occupied and maximum slots of one placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotUsage {
    pub used: u32,
    pub max: u32,
}

impl SlotUsage {
    /// Free slots left.
    pub fn remaining(&self) -> u32 {
        self.max.saturating_sub(self.used)
    }

    /// Whether no further creative fits.
    pub fn is_full(&self) -> bool {
        self.used >= self.max
    }
}

impl fmt::Display for SlotUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.used, self.max)
    }
}

/// Maximum concurrent creatives per placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotLimits {
    limits: BTreeMap<Position, u32>,
}

impl SlotLimits {
    /// Built-in capacities.
    pub fn new() -> Self {
        Self {
            limits: Position::ALL
                .into_iter()
                .map(|p| (p, p.default_capacity()))
                .collect(),
        }
    }

    /// Built-in capacities with the configured overrides applied.
    /// Unknown position names are logged and skipped.
    pub fn from_config(config: &AdConfig) -> Self {
        let mut limits = Self::new();
        for (name, max) in &config.capacity {
            match name.parse::<Position>() {
                Ok(position) => limits = limits.with_limit(position, *max),
                Err(err) => warn!(%err, "ignoring capacity override"),
            }
        }
        limits
    }

    /// Override one placement's capacity.
    pub fn with_limit(mut self, position: Position, max: u32) -> Self {
        self.limits.insert(position, max);
        self
    }

    /// Capacity of a placement.
    pub fn max_for(&self, position: Position) -> u32 {
        self.limits
            .get(&position)
            .copied()
            .unwrap_or_else(|| position.default_capacity())
    }
}

impl Default for SlotLimits {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a creative occupies a slot: active and not past its end date.
/// Creatives scheduled to start later already hold their slot.
fn occupies_slot(creative: &Creative, now: DateTime<Utc>) -> bool {
    creative.active && !creative.is_expired(now)
}

/// `used/max` for every placement.
pub fn slot_usage(
    creatives: &[Creative],
    limits: &SlotLimits,
    now: DateTime<Utc>,
) -> BTreeMap<Position, SlotUsage> {
    let mut usage: BTreeMap<Position, SlotUsage> = Position::ALL
        .into_iter()
        .map(|p| (p, SlotUsage { used: 0, max: limits.max_for(p) }))
        .collect();

    for creative in creatives.iter().filter(|c| occupies_slot(c, now)) {
        if let Some(slot) = usage.get_mut(&creative.position) {
            slot.used += 1;
        }
    }

    usage
}

/// Usage of a placement, or [`AdError::SlotFull`] if a new creative would
/// exceed its capacity.
pub fn ensure_capacity(
    creatives: &[Creative],
    limits: &SlotLimits,
    position: Position,
    now: DateTime<Utc>,
) -> Result<SlotUsage, AdError> {
    let used = creatives
        .iter()
        .filter(|c| c.position == position && occupies_slot(c, now))
        .count() as u32;
    let usage = SlotUsage {
        used,
        max: limits.max_for(position),
    };

    if usage.is_full() {
        return Err(AdError::SlotFull { position, usage });
    }
    Ok(usage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_usage_counts_active_unexpired() {
        let now = now();
        let creatives = vec![
            Creative::new("h1", Position::HeaderBanner),
            Creative::new("h2", Position::HeaderBanner)
                .scheduled(Some(now + Duration::days(3)), None),
            Creative::new("h3", Position::HeaderBanner).with_active(false),
            Creative::new("h4", Position::HeaderBanner)
                .scheduled(None, Some(now - Duration::days(1))),
            Creative::new("p1", Position::Popup),
        ];
        let usage = slot_usage(&creatives, &SlotLimits::new(), now);

        assert_eq!(usage[&Position::HeaderBanner], SlotUsage { used: 2, max: 3 });
        assert_eq!(usage[&Position::Popup].to_string(), "1/1");
        assert!(usage[&Position::Popup].is_full());
        assert_eq!(usage[&Position::InlineGrid].remaining(), 10);
        assert_eq!(usage.len(), Position::ALL.len());
    }

    #[test]
    fn test_ensure_capacity_blocks_full_placement() {
        let now = now();
        let creatives = vec![Creative::new("p1", Position::Popup)];

        let err = ensure_capacity(&creatives, &SlotLimits::new(), Position::Popup, now).unwrap_err();
        assert_eq!(
            err,
            AdError::SlotFull {
                position: Position::Popup,
                usage: SlotUsage { used: 1, max: 1 },
            }
        );
        assert_eq!(err.to_string(), "No free slot for popup: 1/1 in use");

        let ok = ensure_capacity(&creatives, &SlotLimits::new(), Position::SidebarRight, now).unwrap();
        assert_eq!(ok.remaining(), 5);
    }

    #[test]
    fn test_limits_from_config() {
        let mut config = AdConfig::default();
        config.capacity.insert("popup".to_string(), 2);
        config.capacity.insert("nowhere".to_string(), 9);

        let limits = SlotLimits::from_config(&config);
        assert_eq!(limits.max_for(Position::Popup), 2);
        assert_eq!(limits.max_for(Position::HeaderBanner), 3);
    }
}
