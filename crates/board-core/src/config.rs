//! Rotation, ad serving and telemetry configuration.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::BoardError;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Listing rotation settings.
    #[serde(default)]
    pub rotation: RotationConfig,

    /// Ad serving settings.
    #[serde(default)]
    pub ads: AdConfig,

    /// Ad event telemetry settings.
    #[serde(default)]
    pub telemetry: QueueConfig,
}

impl BoardConfig {
    /// Load config from a file. Paths ending in `.json` are parsed as JSON,
    /// anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BoardError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| BoardError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the timers meaningless.
    pub fn validate(&self) -> Result<(), BoardError> {
        if self.rotation.window_minutes == 0 {
            return Err(BoardError::InvalidValue {
                field: "rotation.window_minutes",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.telemetry.max_buffer == 0 {
            return Err(BoardError::InvalidValue {
                field: "telemetry.max_buffer",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Listing rotation window and check cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Length of one rotation window in minutes.
    #[serde(default = "default_window_minutes")]
    pub window_minutes: u64,

    /// How often a long-lived client checks for a new window.
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
}

fn default_window_minutes() -> u64 {
    30
}

fn default_check_interval_secs() -> u64 {
    60
}

impl RotationConfig {
    /// Rotation window as a duration.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_minutes * 60)
    }

    /// Rotation check interval as a duration.
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            window_minutes: default_window_minutes(),
            check_interval_secs: default_check_interval_secs(),
        }
    }
}

/// Ad selection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdConfig {
    /// How often a rendered slot re-draws among its creatives.
    #[serde(default = "default_redraw_interval_secs")]
    pub redraw_interval_secs: u64,

    /// Weight used for creatives with a missing or non-positive priority.
    #[serde(default = "default_priority")]
    pub default_priority: i64,

    /// Per-position capacity overrides, keyed by position slug
    /// (e.g. `header_banner = 4`).
    #[serde(default)]
    pub capacity: BTreeMap<String, u32>,
}

fn default_redraw_interval_secs() -> u64 {
    30
}

fn default_priority() -> i64 {
    50
}

impl AdConfig {
    /// Re-draw interval as a duration.
    pub fn redraw_interval(&self) -> Duration {
        Duration::from_secs(self.redraw_interval_secs)
    }
}

impl Default for AdConfig {
    fn default() -> Self {
        Self {
            redraw_interval_secs: default_redraw_interval_secs(),
            default_priority: default_priority(),
            capacity: BTreeMap::new(),
        }
    }
}

/// Event queue batching settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Collector endpoint receiving event batches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collector_url: Option<String>,

    /// Repeated `(ad, event)` pairs inside this window are dropped.
    #[serde(default = "default_dedup_window_ms")]
    pub dedup_window_ms: u64,

    /// Delay between the first buffered event and the flush.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Buffer size that forces an early flush.
    #[serde(default = "default_max_buffer")]
    pub max_buffer: usize,

    /// How often stale dedup entries are pruned.
    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,
}

fn default_dedup_window_ms() -> u64 {
    2_000
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_max_buffer() -> usize {
    200
}

fn default_sweep_interval_ms() -> u64 {
    10_000
}

impl QueueConfig {
    /// Set the collector endpoint.
    pub fn with_collector_url(mut self, url: impl Into<String>) -> Self {
        self.collector_url = Some(url.into());
        self
    }

    /// Set the dedup window.
    pub fn with_dedup_window(mut self, window: Duration) -> Self {
        self.dedup_window_ms = window.as_millis() as u64;
        self
    }

    /// Set the debounce delay.
    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debounce_ms = delay.as_millis() as u64;
        self
    }

    /// Set the maximum buffer size.
    pub fn with_max_buffer(mut self, max: usize) -> Self {
        self.max_buffer = max.max(1);
        self
    }

    /// Debounce delay as a duration.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Sweep interval as a duration.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            collector_url: None,
            dedup_window_ms: default_dedup_window_ms(),
            debounce_ms: default_debounce_ms(),
            max_buffer: default_max_buffer(),
            sweep_interval_ms: default_sweep_interval_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BoardConfig::default();
        assert_eq!(config.rotation.window(), Duration::from_secs(30 * 60));
        assert_eq!(config.rotation.check_interval(), Duration::from_secs(60));
        assert_eq!(config.ads.redraw_interval(), Duration::from_secs(30));
        assert_eq!(config.ads.default_priority, 50);
        assert_eq!(config.telemetry.dedup_window_ms, 2_000);
        assert_eq!(config.telemetry.debounce_ms, 300);
        assert_eq!(config.telemetry.max_buffer, 200);
        assert_eq!(config.telemetry.sweep_interval_ms, 10_000);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: BoardConfig = toml::from_str(
            r#"
            [rotation]
            window_minutes = 10

            [ads.capacity]
            popup = 2

            [telemetry]
            collector_url = "https://example.test/track"
            "#,
        )
        .unwrap();

        assert_eq!(config.rotation.window_minutes, 10);
        assert_eq!(config.rotation.check_interval_secs, 60);
        assert_eq!(config.ads.capacity.get("popup"), Some(&2));
        assert_eq!(
            config.telemetry.collector_url.as_deref(),
            Some("https://example.test/track")
        );
        assert_eq!(config.telemetry.max_buffer, 200);
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let mut config = BoardConfig::default();
        config.rotation.window_minutes = 0;
        assert!(matches!(
            config.validate(),
            Err(BoardError::InvalidValue { field: "rotation.window_minutes", .. })
        ));
    }

    #[test]
    fn test_queue_builder() {
        let config = QueueConfig::default()
            .with_debounce(Duration::from_millis(50))
            .with_dedup_window(Duration::from_secs(1))
            .with_max_buffer(0);
        assert_eq!(config.debounce(), Duration::from_millis(50));
        assert_eq!(config.dedup_window_ms, 1_000);
        assert_eq!(config.max_buffer, 1);
    }
}
