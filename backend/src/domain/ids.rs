//! Identifier newtypes.
//!
//! The store assigns opaque, monotonically increasing integer keys; these
//! wrappers keep the different id spaces from being mixed up in signatures.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            Serialize, Deserialize, ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw store key.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// The raw store key.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// An authenticated account identity.
    UserId
);
id_type!(
    /// A route (user-declared itinerary) identity.
    RouteId
);
id_type!(
    /// A rider link identity.
    LinkId
);
id_type!(
    /// A conversation identity.
    ConversationId
);
