//! Header cart badge counter.
//!
//! The badge is the one piece of cart state shared by otherwise independent
//! views. It is advisory: optimistic adjustments may disagree with the real
//! cart until the next resync. Views hold a [`CartBadge`] handle (cheap to
//! clone) and mutate it only through the methods below, or subscribe to
//! changes with [`CartBadge::subscribe`].

use std::sync::Arc;

use tokio::sync::watch;

/// Current badge value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeState {
    /// Advisory item count, never negative.
    pub count: u32,
    /// True until the first resync; the badge is hidden meanwhile.
    pub loading: bool,
}

impl BadgeState {
    /// Count to render, or `None` while loading.
    pub fn visible_count(&self) -> Option<u32> {
        if self.loading {
            None
        } else {
            Some(self.count)
        }
    }
}

impl Default for BadgeState {
    fn default() -> Self {
        Self {
            count: 0,
            loading: true,
        }
    }
}

/// Shared handle to the badge counter.
#[derive(Debug, Clone)]
pub struct CartBadge {
    tx: Arc<watch::Sender<BadgeState>>,
}

impl Default for CartBadge {
    fn default() -> Self {
        Self::new()
    }
}

impl CartBadge {
    /// Create a badge in the loading state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(BadgeState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Absolute resync after a full cart fetch.
    pub fn set_count(&self, count: u32) {
        self.tx.send_modify(|s| s.count = count);
    }

    /// Optimistic bump after a successful add.
    pub fn increment(&self, n: u32) {
        self.tx.send_modify(|s| s.count = s.count.saturating_add(n));
    }

    /// Optimistic drop after a successful remove. Clamped at zero.
    pub fn decrement(&self, n: u32) {
        self.tx.send_modify(|s| s.count = s.count.saturating_sub(n));
    }

    pub fn set_loading(&self, loading: bool) {
        self.tx.send_modify(|s| s.loading = loading);
    }

    /// Back to the initial state, e.g. on logout.
    pub fn reset(&self) {
        self.tx.send_replace(BadgeState::default());
    }

    pub fn current(&self) -> BadgeState {
        *self.tx.borrow()
    }

    /// Receive every subsequent change.
    pub fn subscribe(&self) -> watch::Receiver<BadgeState> {
        self.tx.subscribe()
    }
}

/// Clamp a cart quantity into the badge's range.
pub(crate) fn badge_units(quantity: i64) -> u32 {
    u32::try_from(quantity.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_starts_hidden() {
        let badge = CartBadge::new();
        assert_eq!(badge.current().visible_count(), None);
        badge.set_loading(false);
        assert_eq!(badge.current().visible_count(), Some(0));
    }

    #[test]
    fn test_badge_increment_decrement() {
        let badge = CartBadge::new();
        badge.set_count(3);
        badge.increment(2);
        assert_eq!(badge.current().count, 5);
        badge.decrement(4);
        assert_eq!(badge.current().count, 1);
    }

    #[test]
    fn test_badge_never_goes_negative() {
        let badge = CartBadge::new();
        badge.set_count(1);
        badge.decrement(5);
        assert_eq!(badge.current().count, 0);
    }

    #[test]
    fn test_badge_clones_share_state() {
        let header = CartBadge::new();
        let cart_page = header.clone();
        cart_page.set_count(7);
        assert_eq!(header.current().count, 7);
    }

    #[test]
    fn test_badge_reset() {
        let badge = CartBadge::new();
        badge.set_count(4);
        badge.set_loading(false);
        badge.reset();
        assert_eq!(badge.current(), BadgeState::default());
    }

    #[tokio::test]
    async fn test_badge_subscribers_see_changes() {
        let badge = CartBadge::new();
        let mut rx = badge.subscribe();
        badge.increment(2);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().count, 2);
    }

    #[test]
    fn test_badge_units_clamps() {
        assert_eq!(badge_units(-3), 0);
        assert_eq!(badge_units(4), 4);
        assert_eq!(badge_units(i64::MAX), u32::MAX);
    }
}
