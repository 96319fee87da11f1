//! Opaque identifiers shared across the domain.
//!
//! Identifiers are issued by collaborators outside this crate (identity
//! provider, catalog, payment processor), so they are carried as strings and
//! never parsed.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

opaque_id!(
    /// Identity of a registered user (student or instructor).
    UserId
);
opaque_id!(
    /// Identity of a course in the catalog.
    CourseId
);
opaque_id!(
    /// Identity of a lesson inside a course.
    LessonId
);
opaque_id!(
    /// Checkout session token issued by the payment gateway.
    SessionId
);
