//! Ad events and the collector wire format.

use std::fmt;

use board_core::CreativeId;
use serde::{Deserialize, Serialize};

use crate::CollectorError;

/// Kind of tracked interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Impression,
    Click,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Impression => "impression",
            Self::Click => "click",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pending telemetry record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdEvent {
    pub ad_id: CreativeId,
    pub event_type: EventType,
}

impl AdEvent {
    pub fn new(ad_id: impl Into<CreativeId>, event_type: EventType) -> Self {
        Self {
            ad_id: ad_id.into(),
            event_type,
        }
    }

    pub fn impression(ad_id: impl Into<CreativeId>) -> Self {
        Self::new(ad_id, EventType::Impression)
    }

    pub fn click(ad_id: impl Into<CreativeId>) -> Self {
        Self::new(ad_id, EventType::Click)
    }
}

/// Body accepted by the collector endpoint.
///
/// Clients send the batch form; the single-event form is still accepted
/// from older clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CollectorPayload {
    Batch { events: Vec<AdEvent> },
    Single(AdEvent),
}

impl CollectorPayload {
    /// Batch payload.
    pub fn batch(events: Vec<AdEvent>) -> Self {
        Self::Batch { events }
    }

    /// Parse a request body in either form.
    pub fn from_json(body: &[u8]) -> Result<Self, CollectorError> {
        serde_json::from_slice(body).map_err(CollectorError::from)
    }

    /// Flatten to the contained events.
    pub fn into_events(self) -> Vec<AdEvent> {
        match self {
            Self::Batch { events } => events,
            Self::Single(event) => vec![event],
        }
    }

    /// Number of events carried.
    pub fn len(&self) -> usize {
        match self {
            Self::Batch { events } => events.len(),
            Self::Single(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
