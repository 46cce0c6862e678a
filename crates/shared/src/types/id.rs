//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `TripId` where a `BookingId` is expected.
//! IDs are ordered by their UUID so row locks can be taken in a deterministic order.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for a user.");
typed_id!(RouteId, "Unique identifier for a route between two ports.");
typed_id!(TripId, "Unique identifier for a scheduled sailing.");
typed_id!(PricingRuleId, "Unique identifier for a route-level pricing rule.");
typed_id!(BookingId, "Unique identifier for a booking.");
typed_id!(TicketId, "Unique identifier for a ticket.");
typed_id!(TransactionId, "Unique identifier for a ledger transaction.");
typed_id!(SubscriptionId, "Unique identifier for a subscription wallet.");
typed_id!(PlanId, "Unique identifier for a subscription plan.");
typed_id!(CashDeskId, "Unique identifier for a cash desk.");
typed_id!(CashSessionId, "Unique identifier for a cashier shift.");
