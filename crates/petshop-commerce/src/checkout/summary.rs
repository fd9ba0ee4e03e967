//! Checkout totals.

use crate::cart::{Cart, SelectionSet};
use crate::error::CommerceError;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Totals shown next to the place-order button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    /// Selected units.
    pub item_count: i64,
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub total: Money,
}

impl CheckoutSummary {
    /// Totals for the selected part of `cart`.
    pub fn compute(
        cart: &Cart,
        selection: &SelectionSet,
        shipping_fee: Money,
    ) -> Result<Self, CommerceError> {
        let subtotal = selection.selected_subtotal(cart)?;
        let total = subtotal
            .checked_add(shipping_fee)
            .ok_or(CommerceError::Overflow)?;
        Ok(Self {
            item_count: selection.selected_quantity(cart),
            subtotal,
            shipping_fee,
            total,
        })
    }
}
