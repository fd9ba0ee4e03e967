//! Cart and checkout logic for the PetShop storefront.
//!
//! This crate holds everything between "the server has a cart" and "the
//! customer is sent to the payment gateway":
//!
//! - **Cart**: server-mirrored cart store, checkout selection, header badge
//! - **Checkout**: addresses, shipping fees, order and payment bodies, and the
//!   checkout orchestrator
//! - **Api**: the service traits the store and orchestrator call
//!
//! There is no network code here. `petshop-client` implements the service
//! traits over REST.
//!
//! # Example
//!
//! ```rust,ignore
//! use petshop_commerce::prelude::*;
//!
//! let services = CheckoutServices::from_shared(client.clone());
//! let payload = SelectionPayload::new(["line-1", "line-2"]);
//! let mut checkout = CheckoutSession::new(services, user_id, Some(payload));
//!
//! checkout.load().await?;
//! checkout.set_payment_method(PaymentMethod::Online)?;
//! match checkout.submit().await? {
//!     CheckoutOutcome::Confirmed { order } => println!("order {}", order.id),
//!     CheckoutOutcome::RedirectToPayment { payment_url, .. } => open(payment_url),
//! }
//! ```

pub mod api;
pub mod cart;
pub mod checkout;
pub mod error;
pub mod ids;
pub mod money;

#[cfg(test)]
mod testing;

pub use error::{CommerceError, ErrorKind};
pub use ids::*;
pub use money::Money;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::api::{AddressApi, CartApi, OrderApi, PaymentApi};
    pub use crate::error::{CommerceError, ErrorKind};
    pub use crate::ids::*;
    pub use crate::money::Money;

    // Cart
    pub use crate::cart::{
        AttributeBlob, BadgeState, Cart, CartBadge, CartLineItem, CartStore, NewLineItem,
        SelectionPayload, SelectionSet,
    };

    // Checkout
    pub use crate::checkout::{
        calculate_fee, Address, AddressInput, CheckoutOutcome, CheckoutServices, CheckoutSession,
        CheckoutState, CheckoutSummary, OrderDetail, OrderResponse, OrderSubmission,
        PaymentMethod, PaymentResponse, PaymentSubmission, ShippingRates,
    };
}
