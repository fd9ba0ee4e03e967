//! Checkout selection.
//!
//! A [`SelectionSet`] is the subset of line items the user intends to buy in
//! one checkout attempt. It travels from the cart view to the checkout view
//! as a [`SelectionPayload`] and is always re-validated against the live
//! cart: ids of items deleted in between are dropped, never reported.

use std::collections::BTreeSet;

use crate::cart::{Cart, CartLineItem};
use crate::error::CommerceError;
use crate::ids::LineItemId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Set of selected line item ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<LineItemId>,
}

impl SelectionSet {
    /// An empty selection.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Select every item currently in the cart.
    pub fn initialize(cart: &Cart) -> Self {
        Self {
            ids: cart.item_ids().cloned().collect(),
        }
    }

    /// Keep only the supplied ids that are still in the cart.
    pub fn restore<I, T>(ids: I, cart: &Cart) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<LineItemId>,
    {
        Self {
            ids: ids
                .into_iter()
                .map(Into::into)
                .filter(|id| cart.contains(id))
                .collect(),
        }
    }

    /// Flip one id. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: &LineItemId) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    pub fn select_all(&mut self, cart: &Cart) {
        self.ids = cart.item_ids().cloned().collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop ids no longer in the cart; returns how many were dropped.
    pub fn retain_live(&mut self, cart: &Cart) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| cart.contains(id));
        before - self.ids.len()
    }

    pub fn contains(&self, id: &LineItemId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineItemId> {
        self.ids.iter()
    }

    /// Whether every cart item is selected (and the cart is non-empty).
    pub fn is_all_selected(&self, cart: &Cart) -> bool {
        !cart.is_empty() && cart.item_ids().all(|id| self.ids.contains(id))
    }

    /// Selected items present in the cart, in cart order.
    pub fn selected_items<'a>(&'a self, cart: &'a Cart) -> impl Iterator<Item = &'a CartLineItem> {
        cart.items.iter().filter(move |i| self.ids.contains(&i.id))
    }

    /// Sum of `unit_price * quantity` over the selected items.
    pub fn selected_subtotal(&self, cart: &Cart) -> Result<Money, CommerceError> {
        let lines = self
            .selected_items(cart)
            .map(CartLineItem::line_total)
            .collect::<Result<Vec<_>, _>>()?;
        Money::try_sum(lines).ok_or(CommerceError::Overflow)
    }

    /// Sum of quantities over the selected items.
    pub fn selected_quantity(&self, cart: &Cart) -> i64 {
        self.selected_items(cart).map(|i| i.quantity).sum()
    }

    /// Navigation payload handed to the checkout view, in cart order.
    pub fn to_payload(&self, cart: &Cart) -> SelectionPayload {
        SelectionPayload {
            selected_items: self
                .selected_items(cart)
                .map(|i| i.id.as_str().to_string())
                .collect(),
        }
    }
}

impl FromIterator<LineItemId> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = LineItemId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Router state carried from the cart view to the checkout view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionPayload {
    #[serde(default)]
    pub selected_items: Vec<String>,
}

impl SelectionPayload {
    pub fn new<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            selected_items: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Restore a selection from an optional payload.
    ///
    /// A missing payload is an empty selection, not "everything": the
    /// checkout view must refuse to proceed rather than guess.
    pub fn restore(payload: Option<&SelectionPayload>, cart: &Cart) -> SelectionSet {
        match payload {
            Some(p) => SelectionSet::restore(p.selected_items.iter().map(String::as_str), cart),
            None => SelectionSet::empty(),
        }
    }
}
