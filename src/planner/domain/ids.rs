//! Identifiers for transit stops and routes.
//!
//! Provider identifiers are case-sensitive (`place-pktrm`, `Green-B`), so
//! they are only trimmed, never normalised further. Ordering is plain
//! lexicographic byte order, which the search relies on for tie-breaks.

use super::PlannerDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! transit_id {
    ($(#[$meta:meta])* $name:ident, $empty:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a trimmed, non-empty identifier.
            ///
            /// # Errors
            ///
            #[doc = concat!("Returns [`PlannerDomainError::", stringify!($empty), "`] when the value is blank.")]
            pub fn new(value: impl Into<String>) -> Result<Self, PlannerDomainError> {
                let raw = value.into();
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(PlannerDomainError::$empty);
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = PlannerDomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

transit_id!(
    /// Identifier of a stop (station) in the transit network.
    StopId,
    EmptyStopId
);

transit_id!(
    /// Identifier of a route (line) in the transit network.
    RouteId,
    EmptyRouteId
);
