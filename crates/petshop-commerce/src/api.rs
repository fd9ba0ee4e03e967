//! Service seams.
//!
//! The cart store and checkout orchestrator talk to the backend only through
//! these traits. `petshop-client` implements them over REST; tests use
//! in-memory fakes.

use async_trait::async_trait;

use crate::cart::{Cart, NewLineItem};
use crate::checkout::{
    Address, AddressInput, OrderResponse, OrderSubmission, PaymentResponse, PaymentSubmission,
};
use crate::error::CommerceError;
use crate::ids::{AddressId, IdempotencyKey, LineItemId, OrderId, UserId};

/// Cart endpoints.
#[async_trait]
pub trait CartApi: Send + Sync {
    /// `GET /Cart`
    async fn fetch_cart(&self, user: &UserId) -> Result<Cart, CommerceError>;

    /// `POST /Cart/items`
    async fn add_item(&self, user: &UserId, item: &NewLineItem) -> Result<(), CommerceError>;

    /// `POST /Cart/{userId}/items/{itemId}`
    async fn update_item_quantity(
        &self,
        user: &UserId,
        item: &LineItemId,
        quantity: i64,
    ) -> Result<(), CommerceError>;

    /// `DELETE /Cart/{userId}/items/{itemId}`
    async fn remove_item(&self, user: &UserId, item: &LineItemId) -> Result<(), CommerceError>;

    /// `DELETE /Cart/{userId}`
    async fn clear_cart(&self, user: &UserId) -> Result<(), CommerceError>;
}

/// Customer address book.
#[async_trait]
pub trait AddressApi: Send + Sync {
    async fn list_addresses(&self) -> Result<Vec<Address>, CommerceError>;

    async fn create_address(&self, input: &AddressInput) -> Result<Address, CommerceError>;

    async fn update_address(
        &self,
        id: &AddressId,
        input: &AddressInput,
    ) -> Result<Address, CommerceError>;

    async fn delete_address(&self, id: &AddressId) -> Result<(), CommerceError>;
}

/// Order endpoints.
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Create an order. Retries carrying the same key must not create a
    /// second order.
    async fn create_order(
        &self,
        submission: &OrderSubmission,
        key: &IdempotencyKey,
    ) -> Result<OrderResponse, CommerceError>;

    /// Cancel an order that could not be paid.
    async fn cancel_order(&self, id: &OrderId) -> Result<(), CommerceError>;
}

/// Payment endpoints.
#[async_trait]
pub trait PaymentApi: Send + Sync {
    async fn create_payment(
        &self,
        submission: &PaymentSubmission,
    ) -> Result<PaymentResponse, CommerceError>;
}
