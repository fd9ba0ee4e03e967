//! Cart store.
//!
//! Mirrors the server cart into local state. Every mutation is "fire, then
//! refetch": the store never applies its own arithmetic to the snapshot
//! because prices, stock clamping and same-variant coalescing live on the
//! server. A failed operation leaves the previous snapshot untouched.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, instrument, warn};

use crate::api::CartApi;
use crate::cart::badge::badge_units;
use crate::cart::{Cart, CartBadge, NewLineItem};
use crate::error::CommerceError;
use crate::ids::{LineItemId, UserId};

#[derive(Debug, Default)]
struct CartState {
    cart: Option<Cart>,
    stale: bool,
    applied_seq: u64,
}

/// Local mirror of the current user's cart.
pub struct CartStore {
    api: Arc<dyn CartApi>,
    badge: CartBadge,
    user: Option<UserId>,
    state: Mutex<CartState>,
    fetch_seq: AtomicU64,
    updating: Mutex<Option<LineItemId>>,
}

impl CartStore {
    /// Create a store for a (possibly anonymous) session.
    pub fn new(api: Arc<dyn CartApi>, badge: CartBadge, user: Option<UserId>) -> Self {
        Self {
            api,
            badge,
            user,
            state: Mutex::new(CartState::default()),
            fetch_seq: AtomicU64::new(0),
            updating: Mutex::new(None),
        }
    }

    pub fn user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    pub fn badge(&self) -> &CartBadge {
        &self.badge
    }

    /// Last applied snapshot.
    pub fn snapshot(&self) -> Option<Cart> {
        self.state.lock().cart.clone()
    }

    /// True when the last fetch failed; the snapshot may be out of date.
    pub fn is_stale(&self) -> bool {
        self.state.lock().stale
    }

    /// The line item whose quantity edit is in flight, if any.
    pub fn updating_item(&self) -> Option<LineItemId> {
        self.updating.lock().clone()
    }

    fn require_user(&self) -> Result<&UserId, CommerceError> {
        self.user
            .as_ref()
            .ok_or_else(|| CommerceError::Auth("sign in to use the cart".to_string()))
    }

    /// Fetch the authoritative cart and resync the badge.
    #[instrument(skip(self))]
    pub async fn fetch_cart(&self) -> Result<Cart, CommerceError> {
        let user = self.require_user()?;
        let seq = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;

        match self.api.fetch_cart(user).await {
            Ok(cart) => {
                self.apply(seq, cart.clone());
                Ok(cart)
            }
            Err(e) => {
                warn!(error = %e, "cart fetch failed, keeping previous snapshot");
                let mut state = self.state.lock();
                // Superseded by a newer response or a reset.
                if seq >= state.applied_seq {
                    state.stale = true;
                }
                Err(e)
            }
        }
    }

    fn apply(&self, seq: u64, cart: Cart) {
        let mut state = self.state.lock();
        if seq < state.applied_seq {
            debug!(seq, applied = state.applied_seq, "discarding out-of-order cart response");
            return;
        }
        state.applied_seq = seq;
        state.stale = false;
        self.badge.set_count(badge_units(cart.item_count()));
        self.badge.set_loading(false);
        state.cart = Some(cart);
    }

    /// Add a variant, bump the badge, then refetch.
    ///
    /// The badge moves only after the server accepted the add.
    #[instrument(skip(self), fields(variant = %item.variant_id, quantity = item.quantity))]
    pub async fn add_item(&self, item: NewLineItem) -> Result<Cart, CommerceError> {
        let user = self.require_user()?;
        if item.quantity < 1 {
            return Err(CommerceError::InvalidQuantity(item.quantity));
        }

        self.api.add_item(user, &item).await?;
        self.badge.increment(badge_units(item.quantity));
        self.fetch_cart().await
    }

    /// Set a line item's quantity, then refetch.
    ///
    /// Quantities below one are refused without a network call. Only one
    /// edit may be in flight at a time; the marker is held until the
    /// refetch completes and is released even if the future is dropped.
    #[instrument(skip(self), fields(item = %item_id))]
    pub async fn update_item_quantity(
        &self,
        item_id: &LineItemId,
        quantity: i64,
    ) -> Result<Cart, CommerceError> {
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        let user = self.require_user()?;
        let _guard = self.begin_update(item_id)?;

        self.api.update_item_quantity(user, item_id, quantity).await?;
        self.fetch_cart().await
    }

    /// Remove a line item, drop its quantity from the badge, then refetch.
    #[instrument(skip(self), fields(item = %item_id))]
    pub async fn remove_item(&self, item_id: &LineItemId) -> Result<Cart, CommerceError> {
        let user = self.require_user()?;
        let removed_quantity = self
            .state
            .lock()
            .cart
            .as_ref()
            .and_then(|c| c.get_item(item_id))
            .map(|i| i.quantity);

        self.api.remove_item(user, item_id).await?;
        if let Some(quantity) = removed_quantity {
            self.badge.decrement(badge_units(quantity));
        }
        self.fetch_cart().await
    }

    /// Remove every line item, then refetch to confirm the cart is empty.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<Cart, CommerceError> {
        let user = self.require_user()?;
        self.api.clear_cart(user).await?;
        self.fetch_cart().await
    }

    /// Forget local state, e.g. on logout. Fetches already in flight are
    /// discarded when they complete.
    pub fn reset(&self) {
        let barrier = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
        *self.state.lock() = CartState {
            applied_seq: barrier,
            ..CartState::default()
        };
        self.badge.reset();
    }

    fn begin_update(&self, item_id: &LineItemId) -> Result<UpdateGuard<'_>, CommerceError> {
        let mut slot = self.updating.lock();
        if let Some(current) = slot.as_ref() {
            return Err(CommerceError::UpdateInProgress(current.to_string()));
        }
        *slot = Some(item_id.clone());
        Ok(UpdateGuard {
            slot: &self.updating,
        })
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("user", &self.user)
            .field("badge", &self.badge.current())
            .finish_non_exhaustive()
    }
}

/// Clears the in-flight marker when dropped.
struct UpdateGuard<'a> {
    slot: &'a Mutex<Option<LineItemId>>,
}

impl Drop for UpdateGuard<'_> {
    fn drop(&mut self) {
        *self.slot.lock() = None;
    }
}
