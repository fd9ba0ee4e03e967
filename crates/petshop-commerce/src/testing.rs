//! In-memory storefront used by unit tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::api::{AddressApi, CartApi, OrderApi, PaymentApi};
use crate::cart::{AttributeBlob, Cart, CartLineItem, NewLineItem};
use crate::checkout::{
    Address, AddressInput, OrderResponse, OrderSubmission, PaymentResponse, PaymentSubmission,
};
use crate::error::CommerceError;
use crate::ids::{AddressId, CartId, IdempotencyKey, LineItemId, OrderId, StoreId, UserId, VariantId};
use crate::money::Money;

pub fn line(id: &str, price: i64, qty: i64) -> CartLineItem {
    line_in_store(id, price, qty, "store-1")
}

pub fn line_in_store(id: &str, price: i64, qty: i64, store: &str) -> CartLineItem {
    CartLineItem {
        id: LineItemId::new(id),
        variant_id: VariantId::new(format!("var-{}", id)),
        product_name: format!("Product {}", id),
        attributes: AttributeBlob::new(r#"{"size":"M"}"#),
        unit_price: Money::new(price),
        quantity: qty,
        picture_url: Some(format!("https://cdn.example/{}.jpg", id)),
        store_id: StoreId::new(store),
        store_name: "Happy Paws".to_string(),
        store_url: None,
    }
}

pub fn address(id: &str, city: &str, is_default: bool) -> Address {
    Address {
        id: AddressId::new(id),
        recipient_name: "Nguyen Van A".to_string(),
        phone: "0901234567".to_string(),
        street: "12 Le Loi".to_string(),
        ward: "Ben Nghe".to_string(),
        district: "Quan 1".to_string(),
        city: city.to_string(),
        is_default,
    }
}

#[derive(Default)]
pub struct Failures {
    pub fetch_cart: bool,
    pub list_addresses: bool,
    pub add_item: bool,
    pub create_order: bool,
    pub create_payment: bool,
    pub cancel_order: bool,
}

#[derive(Default)]
struct State {
    cart: Vec<CartLineItem>,
    addresses: Vec<Address>,
    calls: Vec<String>,
    orders: Vec<(OrderSubmission, IdempotencyKey)>,
    orders_by_key: HashMap<IdempotencyKey, OrderId>,
    payments: Vec<PaymentSubmission>,
    cancelled: Vec<OrderId>,
    failures: Failures,
    fetch_gate: Option<Arc<Notify>>,
    order_gate: Option<Arc<Notify>>,
}

/// Fake backend that records every call.
#[derive(Default)]
pub struct FakeStorefront {
    state: Mutex<State>,
}

impl FakeStorefront {
    pub fn with_cart(items: Vec<CartLineItem>) -> Self {
        let fake = Self::default();
        fake.state.lock().cart = items;
        fake
    }

    pub fn set_addresses(&self, addresses: Vec<Address>) {
        self.state.lock().addresses = addresses;
    }

    pub fn fail(&self, f: impl FnOnce(&mut Failures)) {
        f(&mut self.state.lock().failures);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn orders(&self) -> Vec<(OrderSubmission, IdempotencyKey)> {
        self.state.lock().orders.clone()
    }

    pub fn payments(&self) -> Vec<PaymentSubmission> {
        self.state.lock().payments.clone()
    }

    pub fn cancelled(&self) -> Vec<OrderId> {
        self.state.lock().cancelled.clone()
    }

    /// Hold the next cart fetch until the returned gate is notified. The
    /// response is computed before waiting.
    pub fn hold_next_fetch(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state.lock().fetch_gate = Some(gate.clone());
        gate
    }

    /// Hold the next order creation until the returned gate is notified.
    pub fn hold_next_order(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state.lock().order_gate = Some(gate.clone());
        gate
    }

    fn record(&self, call: impl Into<String>) {
        self.state.lock().calls.push(call.into());
    }
}

fn network(what: &str) -> CommerceError {
    CommerceError::Network(format!("{} unavailable", what))
}

#[async_trait]
impl CartApi for FakeStorefront {
    async fn fetch_cart(&self, user: &UserId) -> Result<Cart, CommerceError> {
        self.record("fetch_cart");
        let (result, gate) = {
            let mut state = self.state.lock();
            let result = if state.failures.fetch_cart {
                Err(network("cart"))
            } else {
                Ok(Cart::new(CartId::new("cart-1"), user.clone()).with_items(state.cart.clone()))
            };
            (result, state.fetch_gate.take())
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        result
    }

    async fn add_item(&self, _user: &UserId, item: &NewLineItem) -> Result<(), CommerceError> {
        self.record(format!("add_item {}", item.variant_id));
        let mut state = self.state.lock();
        if state.failures.add_item {
            return Err(network("cart"));
        }
        // Coalesce the same variant, like the real server.
        if let Some(existing) = state.cart.iter_mut().find(|l| l.variant_id == item.variant_id) {
            existing.quantity += item.quantity;
        } else {
            let id = format!("line-{}", state.cart.len() + 1);
            let mut new_line = line(&id, 10_000, item.quantity);
            new_line.variant_id = item.variant_id.clone();
            state.cart.push(new_line);
        }
        Ok(())
    }

    async fn update_item_quantity(
        &self,
        _user: &UserId,
        item: &LineItemId,
        quantity: i64,
    ) -> Result<(), CommerceError> {
        self.record(format!("update_item_quantity {} {}", item, quantity));
        let mut state = self.state.lock();
        let line = state
            .cart
            .iter_mut()
            .find(|l| &l.id == item)
            .ok_or_else(|| CommerceError::not_found("line item", item.as_str()))?;
        // Server clamps to stock.
        line.quantity = quantity.min(10);
        Ok(())
    }

    async fn remove_item(&self, _user: &UserId, item: &LineItemId) -> Result<(), CommerceError> {
        self.record(format!("remove_item {}", item));
        let mut state = self.state.lock();
        let before = state.cart.len();
        state.cart.retain(|l| &l.id != item);
        if state.cart.len() == before {
            return Err(CommerceError::not_found("line item", item.as_str()));
        }
        Ok(())
    }

    async fn clear_cart(&self, _user: &UserId) -> Result<(), CommerceError> {
        self.record("clear_cart");
        self.state.lock().cart.clear();
        Ok(())
    }
}

#[async_trait]
impl AddressApi for FakeStorefront {
    async fn list_addresses(&self) -> Result<Vec<Address>, CommerceError> {
        self.record("list_addresses");
        let state = self.state.lock();
        if state.failures.list_addresses {
            return Err(network("address book"));
        }
        Ok(state.addresses.clone())
    }

    async fn create_address(&self, input: &AddressInput) -> Result<Address, CommerceError> {
        self.record("create_address");
        let mut state = self.state.lock();
        let created = input.clone().into_address(AddressId::new(format!(
            "addr-{}",
            state.addresses.len() + 1
        )));
        state.addresses.push(created.clone());
        Ok(created)
    }

    async fn update_address(
        &self,
        id: &AddressId,
        input: &AddressInput,
    ) -> Result<Address, CommerceError> {
        self.record(format!("update_address {}", id));
        let mut state = self.state.lock();
        let slot = state
            .addresses
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| CommerceError::not_found("address", id.as_str()))?;
        *slot = input.clone().into_address(id.clone());
        Ok(slot.clone())
    }

    async fn delete_address(&self, id: &AddressId) -> Result<(), CommerceError> {
        self.record(format!("delete_address {}", id));
        self.state.lock().addresses.retain(|a| &a.id != id);
        Ok(())
    }
}

#[async_trait]
impl OrderApi for FakeStorefront {
    async fn create_order(
        &self,
        submission: &OrderSubmission,
        key: &IdempotencyKey,
    ) -> Result<OrderResponse, CommerceError> {
        self.record("create_order");
        let gate = self.state.lock().order_gate.take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let mut state = self.state.lock();
        if state.failures.create_order {
            return Err(network("order service"));
        }
        let price = submission.total()?;
        if let Some(existing) = state.orders_by_key.get(key) {
            return Ok(OrderResponse {
                id: existing.clone(),
                price,
            });
        }
        let id = OrderId::new(format!("ord-{}", state.orders.len() + 1));
        state.orders.push((submission.clone(), key.clone()));
        state.orders_by_key.insert(key.clone(), id.clone());
        Ok(OrderResponse { id, price })
    }

    async fn cancel_order(&self, id: &OrderId) -> Result<(), CommerceError> {
        self.record(format!("cancel_order {}", id));
        let mut state = self.state.lock();
        if state.failures.cancel_order {
            return Err(network("order service"));
        }
        state.cancelled.push(id.clone());
        Ok(())
    }
}

#[async_trait]
impl PaymentApi for FakeStorefront {
    async fn create_payment(
        &self,
        submission: &PaymentSubmission,
    ) -> Result<PaymentResponse, CommerceError> {
        self.record("create_payment");
        let mut state = self.state.lock();
        if state.failures.create_payment {
            return Err(network("payment gateway"));
        }
        state.payments.push(submission.clone());
        Ok(PaymentResponse {
            payment_url: format!("https://pay.example/checkout?order={}", submission.order_id),
        })
    }
}
