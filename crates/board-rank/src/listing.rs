//! Listing model.

use board_core::ListingId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscription tier of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListingTier {
    Top,
    Premium,
    /// Free listing. Unknown tier names also land here.
    #[default]
    #[serde(other)]
    Basic,
}

impl ListingTier {
    /// Priority used by the sorter; higher sorts first.
    pub fn rank(self) -> u8 {
        match self {
            Self::Top => 3,
            Self::Premium => 2,
            Self::Basic => 1,
        }
    }

    /// Lowercase name as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Premium => "premium",
            Self::Top => "top",
        }
    }
}

/// Rank priority of an optional tier; unset counts as basic.
pub fn tier_rank(tier: Option<ListingTier>) -> u8 {
    tier.unwrap_or_default().rank()
}

/// Anything the sorter can order.
///
/// Only these three facts influence rank; every other attribute of the
/// implementing type is ignored.
pub trait Rankable {
    /// Stable identity used to seed the tie-break score.
    fn rank_id(&self) -> &str;

    /// Subscription tier, `None` when unset.
    fn tier(&self) -> Option<ListingTier>;

    /// Whether the listing carries a verification timestamp.
    fn is_verified(&self) -> bool;
}

/// A listing as returned by the listing source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    #[serde(default)]
    pub listing_type: Option<ListingTier>,
    #[serde(default)]
    pub verified_at: Option<DateTime<Utc>>,
    /// Display attributes (name, city, photos, ...), opaque to ranking.
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl Listing {
    /// Create a listing with no display attributes.
    pub fn new(id: impl Into<ListingId>, listing_type: Option<ListingTier>) -> Self {
        Self {
            id: id.into(),
            listing_type,
            verified_at: None,
            attributes: serde_json::Map::new(),
        }
    }

    /// Mark the listing as verified at the given instant.
    pub fn verified(mut self, at: DateTime<Utc>) -> Self {
        self.verified_at = Some(at);
        self
    }

    /// Attach a display attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

impl Rankable for Listing {
    fn rank_id(&self) -> &str {
        self.id.as_str()
    }

    fn tier(&self) -> Option<ListingTier> {
        self.listing_type
    }

    fn is_verified(&self) -> bool {
        self.verified_at.is_some()
    }
}

impl<T: Rankable + ?Sized> Rankable for &T {
    fn rank_id(&self) -> &str {
        (**self).rank_id()
    }

    fn tier(&self) -> Option<ListingTier> {
        (**self).tier()
    }

    fn is_verified(&self) -> bool {
        (**self).is_verified()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_rank() {
        assert_eq!(tier_rank(Some(ListingTier::Top)), 3);
        assert_eq!(tier_rank(Some(ListingTier::Premium)), 2);
        assert_eq!(tier_rank(Some(ListingTier::Basic)), 1);
        assert_eq!(tier_rank(None), 1);
    }

    #[test]
    fn test_listing_deserialize() {
        let json = r#"{
            "id": "p1",
            "listing_type": "premium",
            "verified_at": "2024-05-01T10:00:00Z",
            "name": "Anna",
            "city": "Lisbon"
        }"#;
        let listing: Listing = serde_json::from_str(json).unwrap();

        assert_eq!(listing.id.as_str(), "p1");
        assert_eq!(listing.listing_type, Some(ListingTier::Premium));
        assert!(listing.is_verified());
        assert_eq!(listing.attributes.get("city").unwrap(), "Lisbon");
    }

    #[test]
    fn test_missing_and_unknown_tier() {
        let missing: Listing = serde_json::from_str(r#"{"id": "a"}"#).unwrap();
        assert_eq!(missing.tier(), None);
        assert!(!missing.is_verified());

        let null: Listing =
            serde_json::from_str(r#"{"id": "b", "listing_type": null, "verified_at": null}"#).unwrap();
        assert_eq!(null.tier(), None);

        let unknown: Listing =
            serde_json::from_str(r#"{"id": "c", "listing_type": "gold"}"#).unwrap();
        assert_eq!(unknown.tier(), Some(ListingTier::Basic));
    }

    #[test]
    fn test_tier_names_round_trip() {
        for tier in [ListingTier::Top, ListingTier::Premium, ListingTier::Basic] {
            let json = serde_json::to_string(&tier).unwrap();
            assert_eq!(json, format!("\"{}\"", tier.as_str()));
            assert_eq!(serde_json::from_str::<ListingTier>(&json).unwrap(), tier);
        }
        assert_eq!(
            serde_json::from_str::<ListingTier>("\"legacy-gold\"").unwrap(),
            ListingTier::Basic
        );
        assert_eq!(ListingTier::default(), ListingTier::Basic);
    }
}
