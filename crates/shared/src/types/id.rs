//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `PaymentId` where a `TransactionId` is expected.
//! Identifiers minted by this service are UUIDs; identifiers assigned by upstream
//! systems (orders, payments, items) are opaque strings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers for UUIDs minted by this service.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
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

/// Macro to generate wrappers for externally assigned string identifiers.
macro_rules! external_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Wraps an identifier assigned upstream.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

typed_id!(RefundId, "Unique identifier for a completed refund.");
typed_id!(AuditEntryId, "Unique identifier for an audit log entry.");

external_id!(TransactionId, "Identifier of a captured payment transaction.");
external_id!(PaymentId, "Identifier of a payment within a transaction.");
external_id!(ItemId, "Identifier of a line item, unique within its transaction.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_typed_ids_are_unique() {
        assert_ne!(RefundId::new(), RefundId::new());
    }

    #[test]
    fn test_typed_id_round_trips_through_string() {
        let id = RefundId::new();
        let parsed = RefundId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
        assert!(RefundId::from_str("not-a-uuid").is_err());
    }

    #[test]
    fn test_external_id_serializes_transparently() {
        let id = TransactionId::from("TXN-REG-001");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"TXN-REG-001\"");
        assert_eq!(id.as_str(), "TXN-REG-001");
        assert_eq!(id.to_string(), "TXN-REG-001");
    }
}
