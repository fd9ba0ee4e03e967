//! Shopping cart module.
//!
//! Contains the cart snapshot, the checkout selection, the header badge
//! counter and the store that keeps them in sync with the server.

mod badge;
mod cart;
mod selection;
mod store;

pub use badge::{BadgeState, CartBadge};
pub use cart::{AttributeBlob, Cart, CartLineItem, NewLineItem};
pub use selection::{SelectionPayload, SelectionSet};
pub use store::CartStore;
