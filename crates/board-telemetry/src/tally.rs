//! Collector-side aggregation of received events.

use std::collections::HashMap;

use board_core::CreativeId;
use serde::Serialize;

use crate::event::{AdEvent, EventType};

/// Impression and click counts for one creative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventCounts {
    pub impressions: u64,
    pub clicks: u64,
}

impl EventCounts {
    pub fn record(&mut self, event_type: EventType) {
        match event_type {
            EventType::Impression => self.impressions += 1,
            EventType::Click => self.clicks += 1,
        }
    }
}

/// Count events per creative.
pub fn tally<'a>(events: impl IntoIterator<Item = &'a AdEvent>) -> HashMap<CreativeId, EventCounts> {
    let mut counts: HashMap<CreativeId, EventCounts> = HashMap::new();
    for event in events {
        counts
            .entry(event.ad_id.clone())
            .or_default()
            .record(event.event_type);
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_counts_per_creative() {
        let events = vec![
            AdEvent::impression("a"),
            AdEvent::impression("a"),
            AdEvent::click("a"),
            AdEvent::impression("b"),
        ];
        let counts = tally(&events);

        assert_eq!(counts.len(), 2);
        assert_eq!(
            counts[&CreativeId::new("a")],
            EventCounts { impressions: 2, clicks: 1 }
        );
        assert_eq!(counts[&CreativeId::new("b")].clicks, 0);
    }

    #[test]
    fn test_tally_empty() {
        assert!(tally(&Vec::<AdEvent>::new()).is_empty());
    }
}
