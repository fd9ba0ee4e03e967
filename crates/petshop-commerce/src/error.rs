//! Commerce error types.

use thiserror::Error;

/// User-facing classification of an error.
///
/// Views map each kind to one kind of notification: a login prompt for
/// `Auth`, an inline message for `Validation`, a "no longer available"
/// notice for `NotFound`, and a generic retry message for `Network`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Auth,
    Validation,
    NotFound,
    Network,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Auth => "auth",
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Network => "network",
        }
    }
}

/// Errors that can occur in cart and checkout operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommerceError {
    /// Missing or expired session.
    #[error("Authentication required: {0}")]
    Auth(String),

    /// Quantity below the minimum of one.
    #[error("Invalid quantity: {0} (must be at least 1)")]
    InvalidQuantity(i64),

    /// Checkout attempted with nothing selected.
    #[error("No items selected for checkout")]
    EmptySelection,

    /// Checkout attempted without a delivery address.
    #[error("No delivery address selected")]
    MissingAddress,

    /// Selected items come from more than one store.
    #[error("Selected items belong to more than one store")]
    MixedStores,

    /// Another quantity edit is still in flight.
    #[error("Quantity update already in progress for item {0}")]
    UpdateInProgress(String),

    /// Operation not allowed in the current checkout state.
    #[error("Invalid checkout transition from {from} to {to}")]
    InvalidCheckoutTransition { from: String, to: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// The server refused the request as invalid.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Stale reference to an item, address or order.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Transport or server failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Payment creation failed after the order was created.
    #[error(
        "Payment for order {order_id} could not be created ({}): {reason}",
        cancellation_note(.cancelled)
    )]
    PaymentFailed {
        order_id: String,
        cancelled: bool,
        reason: String,
    },
}

fn cancellation_note(cancelled: &bool) -> &'static str {
    if *cancelled {
        "order cancelled"
    } else {
        "order is still open"
    }
}

impl CommerceError {
    /// Build a not-found error.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CommerceError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommerceError::Auth(_) => ErrorKind::Auth,
            CommerceError::InvalidQuantity(_)
            | CommerceError::EmptySelection
            | CommerceError::MissingAddress
            | CommerceError::MixedStores
            | CommerceError::UpdateInProgress(_)
            | CommerceError::InvalidCheckoutTransition { .. }
            | CommerceError::Overflow
            | CommerceError::Rejected(_) => ErrorKind::Validation,
            CommerceError::NotFound { .. } => ErrorKind::NotFound,
            CommerceError::Network(_) | CommerceError::PaymentFailed { .. } => ErrorKind::Network,
        }
    }

    /// Check if this is an authentication failure.
    pub fn is_auth_failure(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }
}
