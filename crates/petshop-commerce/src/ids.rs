//! Newtype IDs for type-safe identifiers.
//!
//! The storefront API hands out opaque string ids. Wrapping them keeps a
//! `LineItemId` from being passed where an `AddressId` is expected.

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

            /// Generate a new random ID.
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
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
                f.write_str(&self.0)
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
    /// Customer (user) identifier.
    UserId
);
define_id!(
    /// Cart identifier.
    CartId
);
define_id!(
    /// Cart line item identifier.
    LineItemId
);
define_id!(
    /// Product variant identifier.
    VariantId
);
define_id!(
    /// Store (seller) identifier.
    StoreId
);
define_id!(
    /// Delivery address identifier.
    AddressId
);
define_id!(
    /// Order identifier assigned by the order API.
    OrderId
);
define_id!(
    /// Key sent with order creation so the server can collapse retries of
    /// the same checkout attempt into one order.
    IdempotencyKey
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = LineItemId::new("item-123");
        assert_eq!(id.as_str(), "item-123");
    }

    #[test]
    fn test_id_generation() {
        let k1 = IdempotencyKey::generate();
        let k2 = IdempotencyKey::generate();
        assert_ne!(k1, k2);
        assert_eq!(k1.as_str().len(), 36);
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = AddressId::new("addr-7");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"addr-7\"");
        let back: AddressId = serde_json::from_str("\"addr-7\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_display() {
        let id = OrderId::new("ord-789");
        assert_eq!(format!("{}", id), "ord-789");
    }
}
