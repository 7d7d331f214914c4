//! Newtype IDs for type-safe identifiers.
//!
//! Listings and creatives are both keyed by opaque strings from the
//! backing store; the newtypes keep a creative ID from being passed where a
//! listing ID is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Identifier of a listing (profile).
    ListingId
);
define_id!(
    /// Identifier of an advertisement creative.
    CreativeId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = ListingId::new("lst-123");
        assert_eq!(id.as_str(), "lst-123");
        assert_eq!(id.into_inner(), "lst-123");
    }

    #[test]
    fn test_id_from_str_and_display() {
        let id: CreativeId = "ad-456".into();
        assert_eq!(format!("{}", id), "ad-456");
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = CreativeId::new("ad-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ad-1\"");

        let back: CreativeId = serde_json::from_str("\"ad-1\"").unwrap();
        assert_eq!(back, id);
    }
}
