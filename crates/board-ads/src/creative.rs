//! Advertisement creatives and their placements.

use std::fmt;
use std::str::FromStr;

use board_core::CreativeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AdError;

/// Weight assumed for a creative whose priority is missing or not positive.
pub const DEFAULT_PRIORITY: i64 = 50;

/// Where on the page a creative is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    HeaderBanner,
    SidebarLeft,
    SidebarRight,
    InlineGrid,
    FooterBanner,
    Popup,
}

impl Position {
    /// Every placement, in page order.
    pub const ALL: [Position; 6] = [
        Position::HeaderBanner,
        Position::SidebarLeft,
        Position::SidebarRight,
        Position::InlineGrid,
        Position::FooterBanner,
        Position::Popup,
    ];

    /// Maximum concurrent creatives for the placement unless configured.
    pub fn default_capacity(self) -> u32 {
        match self {
            Self::HeaderBanner => 3,
            Self::SidebarLeft => 5,
            Self::SidebarRight => 5,
            Self::InlineGrid => 10,
            Self::FooterBanner => 3,
            Self::Popup => 1,
        }
    }

    /// Slug used in configuration and payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HeaderBanner => "header_banner",
            Self::SidebarLeft => "sidebar_left",
            Self::SidebarRight => "sidebar_right",
            Self::InlineGrid => "inline_grid",
            Self::FooterBanner => "footer_banner",
            Self::Popup => "popup",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = AdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| AdError::UnknownPosition(s.to_string()))
    }
}

fn default_active() -> bool {
    true
}

/// An advertisement creative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creative {
    pub id: CreativeId,
    pub position: Position,
    /// Selection weight; missing or non-positive values fall back to
    /// [`DEFAULT_PRIORITY`].
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
}

impl Creative {
    /// Create an active, unscheduled creative.
    pub fn new(id: impl Into<CreativeId>, position: Position) -> Self {
        Self {
            id: id.into(),
            position,
            priority: None,
            active: true,
            start_date: None,
            end_date: None,
            impressions: 0,
            clicks: 0,
            title: String::new(),
            image_url: None,
            link_url: None,
        }
    }

    /// Set the priority weight.
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the scheduling window.
    pub fn scheduled(mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Set the active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Priority used for selection.
    pub fn effective_priority(&self) -> i64 {
        effective_weight(self.priority, DEFAULT_PRIORITY)
    }

    /// Whether the scheduled end has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.end_date.is_some_and(|end| now > end)
    }

    /// Whether the scheduled start has been reached.
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.start_date.map_or(true, |start| start <= now)
    }

    /// Whether the creative may be displayed right now.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.active && self.has_started(now) && !self.is_expired(now)
    }

    /// Add tracked impressions and clicks to the running counters.
    pub fn record_events(&mut self, impressions: u64, clicks: u64) {
        self.impressions = self.impressions.saturating_add(impressions);
        self.clicks = self.clicks.saturating_add(clicks);
    }

    /// Click-through rate; zero before the first impression.
    pub fn ctr(&self) -> f64 {
        if self.impressions == 0 {
            0.0
        } else {
            self.clicks as f64 / self.impressions as f64
        }
    }
}

/// Largest weight a single creative can carry; larger priorities are capped.
pub const MAX_WEIGHT: i64 = u32::MAX as i64;

/// Resolve a raw weight, substituting `default` for missing or non-positive
/// values. The result is always in `1..=MAX_WEIGHT`.
pub fn effective_weight(raw: Option<i64>, default: i64) -> i64 {
    match raw {
        Some(w) if w > 0 => w.min(MAX_WEIGHT),
        _ => default.clamp(1, MAX_WEIGHT),
    }
}

/// Live creatives for one placement, in source order.
pub fn live_pool<'a>(
    creatives: &'a [Creative],
    position: Position,
    now: DateTime<Utc>,
) -> Vec<&'a Creative> {
    creatives
        .iter()
        .filter(|c| c.position == position && c.is_live(now))
        .collect()
}
