//! Cart and line item types.
//!
//! These mirror what `GET /Cart` returns. Nothing here mutates a cart
//! locally: the server owns coalescing, stock clamping and prices, so a
//! `Cart` value is always a snapshot of the last successful fetch.

use std::collections::BTreeMap;

use crate::error::CommerceError;
use crate::ids::{CartId, LineItemId, StoreId, UserId, VariantId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A shopping cart snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Unique cart identifier.
    pub id: CartId,
    /// Owning user.
    pub user_id: UserId,
    /// Items in server-returned order.
    #[serde(default)]
    pub items: Vec<CartLineItem>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new(id: CartId, user_id: UserId) -> Self {
        Self {
            id,
            user_id,
            items: Vec::new(),
        }
    }

    /// Replace the items.
    pub fn with_items(mut self, items: Vec<CartLineItem>) -> Self {
        self.items = items;
        self
    }

    /// Total over every item, selected or not.
    pub fn total(&self) -> Result<Money, CommerceError> {
        let lines = self
            .items
            .iter()
            .map(CartLineItem::line_total)
            .collect::<Result<Vec<_>, _>>()?;
        Money::try_sum(lines).ok_or(CommerceError::Overflow)
    }

    /// Get total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Get number of line items.
    pub fn unique_item_count(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get an item by ID.
    pub fn get_item(&self, line_item_id: &LineItemId) -> Option<&CartLineItem> {
        self.items.iter().find(|i| &i.id == line_item_id)
    }

    /// Check whether a line item is present.
    pub fn contains(&self, line_item_id: &LineItemId) -> bool {
        self.get_item(line_item_id).is_some()
    }

    /// Live line item ids, in cart order.
    pub fn item_ids(&self) -> impl Iterator<Item = &LineItemId> {
        self.items.iter().map(|i| &i.id)
    }
}

/// One product variant and quantity in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Line item identifier.
    pub id: LineItemId,
    /// Variant being purchased.
    #[serde(rename = "productVariantId")]
    pub variant_id: VariantId,
    /// Product name (denormalized for display).
    pub product_name: String,
    /// Variant attributes (size, color, ...), kept exactly as the server sent them.
    #[serde(default)]
    pub attributes: AttributeBlob,
    /// Unit price.
    #[serde(rename = "price")]
    pub unit_price: Money,
    /// Quantity, at least 1.
    pub quantity: i64,
    /// Product picture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
    /// Owning store.
    pub store_id: StoreId,
    /// Owning store display name.
    #[serde(default)]
    pub store_name: String,
    /// Owning store page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_url: Option<String>,
}

impl CartLineItem {
    /// `unit_price * quantity`.
    pub fn line_total(&self) -> Result<Money, CommerceError> {
        self.unit_price
            .checked_mul(self.quantity)
            .ok_or(CommerceError::Overflow)
    }
}

/// A request to add a variant to the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewLineItem {
    /// Variant to add.
    #[serde(rename = "productVariantId")]
    pub variant_id: VariantId,
    /// Quantity to add.
    pub quantity: i64,
}

impl NewLineItem {
    pub fn new(variant_id: impl Into<VariantId>, quantity: i64) -> Self {
        Self {
            variant_id: variant_id.into(),
            quantity,
        }
    }
}

/// Serialized variant attribute map.
///
/// The catalog decides which keys exist, so the cart and order layers treat
/// the value as an opaque string and echo it back verbatim. [`parse`] is a
/// best-effort view for display only.
///
/// [`parse`]: AttributeBlob::parse
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeBlob(String);

impl AttributeBlob {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Decode a JSON object of attributes. Non-string values are rendered as JSON.
    pub fn parse(&self) -> Option<BTreeMap<String, String>> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&self.0).ok()?;
        Some(
            map.into_iter()
                .map(|(k, v)| match v {
                    serde_json::Value::String(s) => (k, s),
                    other => (k, other.to_string()),
                })
                .collect(),
        )
    }

    /// Human-readable form, e.g. "color: Red, size: M".
    pub fn display(&self) -> String {
        match self.parse() {
            Some(map) => map
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect::<Vec<_>>()
                .join(", "),
            None => self.0.clone(),
        }
    }
}
