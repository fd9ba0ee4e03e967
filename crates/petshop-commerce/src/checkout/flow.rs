//! Checkout orchestrator.
//!
//! One [`CheckoutSession`] drives a single checkout attempt:
//!
//! ```text
//! Loading -> Ready -> Submitting -> Succeeded
//!                         |
//!                         +-------> Failed -> Submitting (user retry)
//! ```
//!
//! Every attempt carries an [`IdempotencyKey`]. A retry with unchanged
//! inputs reuses it so the order service can collapse duplicates; any edit
//! to the inputs, a successful submit or a compensating cancel rotates it.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::api::{AddressApi, CartApi, OrderApi, PaymentApi};
use crate::cart::{Cart, CartLineItem, SelectionPayload, SelectionSet};
use crate::checkout::{
    preferred_address, Address, CheckoutSummary, OrderDetail, OrderResponse, OrderSubmission,
    PaymentMethod, PaymentSubmission, ShippingRates,
};
use crate::error::CommerceError;
use crate::ids::{AddressId, IdempotencyKey, LineItemId, UserId};
use crate::money::Money;

/// What the caller does after a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Cash on delivery: show the confirmation view.
    Confirmed { order: OrderResponse },
    /// Online payment: full page navigation to the gateway.
    RedirectToPayment {
        order: OrderResponse,
        payment_url: String,
    },
}

impl CheckoutOutcome {
    pub fn order(&self) -> &OrderResponse {
        match self {
            CheckoutOutcome::Confirmed { order } => order,
            CheckoutOutcome::RedirectToPayment { order, .. } => order,
        }
    }
}

/// Checkout state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
    Loading,
    Ready,
    Submitting,
    Succeeded(CheckoutOutcome),
    Failed(CommerceError),
}

impl CheckoutState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Loading => "loading",
            CheckoutState::Ready => "ready",
            CheckoutState::Submitting => "submitting",
            CheckoutState::Succeeded(_) => "succeeded",
            CheckoutState::Failed(_) => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutState::Succeeded(_))
    }
}

/// The backend services a checkout talks to.
#[derive(Clone)]
pub struct CheckoutServices {
    pub cart: Arc<dyn CartApi>,
    pub addresses: Arc<dyn AddressApi>,
    pub orders: Arc<dyn OrderApi>,
    pub payments: Arc<dyn PaymentApi>,
}

impl CheckoutServices {
    pub fn new(
        cart: Arc<dyn CartApi>,
        addresses: Arc<dyn AddressApi>,
        orders: Arc<dyn OrderApi>,
        payments: Arc<dyn PaymentApi>,
    ) -> Self {
        Self {
            cart,
            addresses,
            orders,
            payments,
        }
    }

    /// Use one client for all four services.
    pub fn from_shared<T>(api: Arc<T>) -> Self
    where
        T: CartApi + AddressApi + OrderApi + PaymentApi + 'static,
    {
        Self {
            cart: api.clone(),
            addresses: api.clone(),
            orders: api.clone(),
            payments: api,
        }
    }
}

/// One checkout attempt.
pub struct CheckoutSession {
    services: CheckoutServices,
    customer_id: UserId,
    payload: Option<SelectionPayload>,
    rates: ShippingRates,
    state: CheckoutState,
    cart: Option<Cart>,
    addresses: Vec<Address>,
    address_id: Option<AddressId>,
    selection: SelectionSet,
    payment_method: PaymentMethod,
    note: String,
    shipping_fee: Money,
    idempotency_key: IdempotencyKey,
}

impl CheckoutSession {
    /// Start a session from the cart view's navigation payload. A missing
    /// payload means nothing is selected.
    pub fn new(
        services: CheckoutServices,
        customer_id: UserId,
        payload: Option<SelectionPayload>,
    ) -> Self {
        Self {
            services,
            customer_id,
            payload,
            rates: ShippingRates::default(),
            state: CheckoutState::Loading,
            cart: None,
            addresses: Vec::new(),
            address_id: None,
            selection: SelectionSet::empty(),
            payment_method: PaymentMethod::default(),
            note: String::new(),
            shipping_fee: Money::ZERO,
            idempotency_key: IdempotencyKey::generate(),
        }
    }

    pub fn with_rates(mut self, rates: ShippingRates) -> Self {
        self.rates = rates;
        self
    }

    /// Fetch the cart and the address book concurrently.
    ///
    /// Either failure moves the session to `Failed` and nothing partial is
    /// kept. On success the selection is restored against the live cart and
    /// the default (or first) address is preselected. A reload that changes
    /// the address or the selection rotates the idempotency key.
    #[instrument(skip(self), fields(customer = %self.customer_id))]
    pub async fn load(&mut self) -> Result<(), CommerceError> {
        self.recover_interrupted();
        self.state = CheckoutState::Loading;

        let fetched = futures::future::try_join(
            self.services.cart.fetch_cart(&self.customer_id),
            self.services.addresses.list_addresses(),
        )
        .await;

        let (cart, addresses) = match fetched {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "checkout load failed");
                self.cart = None;
                self.addresses.clear();
                self.address_id = None;
                self.selection = SelectionSet::empty();
                self.shipping_fee = Money::ZERO;
                self.state = CheckoutState::Failed(e.clone());
                return Err(e);
            }
        };

        let selection = SelectionPayload::restore(self.payload.as_ref(), &cart);
        let address_id = preferred_address(&addresses).map(|a| a.id.clone());
        if selection != self.selection || address_id != self.address_id {
            self.rotate_key();
        }
        self.selection = selection;
        self.address_id = address_id;
        self.addresses = addresses;
        self.cart = Some(cart);
        self.recompute_fee();
        self.state = CheckoutState::Ready;

        info!(
            selected = self.selection.len(),
            addresses = self.addresses.len(),
            "checkout ready"
        );
        Ok(())
    }

    /// Choose the delivery address. Recomputes the shipping fee.
    pub fn select_address(&mut self, id: &AddressId) -> Result<(), CommerceError> {
        self.ensure_editable("ready")?;
        if !self.addresses.iter().any(|a| &a.id == id) {
            return Err(CommerceError::not_found("address", id.as_str()));
        }
        if self.address_id.as_ref() != Some(id) {
            self.address_id = Some(id.clone());
            self.recompute_fee();
            self.rotate_key();
        }
        Ok(())
    }

    /// Choose how to pay. The shipping fee does not depend on it.
    pub fn set_payment_method(&mut self, method: PaymentMethod) -> Result<(), CommerceError> {
        self.ensure_editable("ready")?;
        if self.payment_method != method {
            self.payment_method = method;
            self.rotate_key();
        }
        Ok(())
    }

    pub fn set_note(&mut self, note: impl Into<String>) -> Result<(), CommerceError> {
        self.ensure_editable("ready")?;
        let note = note.into();
        if self.note != note {
            self.note = note;
            self.rotate_key();
        }
        Ok(())
    }

    /// Flip one item in or out of the selection. Returns whether it is
    /// selected afterwards.
    pub fn toggle_item(&mut self, id: &LineItemId) -> Result<bool, CommerceError> {
        self.ensure_editable("ready")?;
        let in_cart = self.cart.as_ref().is_some_and(|c| c.contains(id));
        if !in_cart {
            return Err(CommerceError::not_found("line item", id.as_str()));
        }
        let selected = self.selection.toggle(id);
        self.recompute_fee();
        self.rotate_key();
        Ok(selected)
    }

    pub fn select_all(&mut self) -> Result<(), CommerceError> {
        self.ensure_editable("ready")?;
        if let Some(cart) = self.cart.as_ref() {
            if !self.selection.is_all_selected(cart) {
                self.selection.select_all(cart);
                self.recompute_fee();
                self.rotate_key();
            }
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) -> Result<(), CommerceError> {
        self.ensure_editable("ready")?;
        if !self.selection.is_empty() {
            self.selection.clear();
            self.recompute_fee();
            self.rotate_key();
        }
        Ok(())
    }

    /// Totals for the current selection and address.
    pub fn summary(&self) -> Result<CheckoutSummary, CommerceError> {
        match self.cart.as_ref() {
            Some(cart) => CheckoutSummary::compute(cart, &self.selection, self.shipping_fee),
            None => Ok(CheckoutSummary::default()),
        }
    }

    /// Build the order body from the current inputs.
    ///
    /// Guards, in order: cart loaded, non-empty selection, address chosen,
    /// single store.
    pub fn build_submission(&self) -> Result<OrderSubmission, CommerceError> {
        let cart = self
            .cart
            .as_ref()
            .ok_or_else(|| self.transition_error("submitting"))?;
        let items: Vec<&CartLineItem> = self.selection.selected_items(cart).collect();
        let first = items.first().ok_or(CommerceError::EmptySelection)?;
        let address = self.selected_address().ok_or(CommerceError::MissingAddress)?;
        if items.iter().any(|i| i.store_id != first.store_id) {
            return Err(CommerceError::MixedStores);
        }

        let delivery_price = self
            .rates
            .calculate_fee(address, items.iter().copied());

        Ok(OrderSubmission {
            store_id: first.store_id.clone(),
            customer_id: self.customer_id.clone(),
            address_id: address.id.clone(),
            payment_method: self.payment_method,
            delivery_price,
            note: self.note.clone(),
            details: items.into_iter().map(OrderDetail::snapshot).collect(),
        })
    }

    /// Place the order, and for online payment create the payment.
    ///
    /// A guard failure returns the error without leaving `Ready`. If the
    /// payment cannot be created the order is cancelled; the returned
    /// `PaymentFailed` tells whether the cancel went through. If the returned
    /// future is dropped mid-flight, the next call on the session finds it
    /// `Failed` with the key kept for a retry.
    #[instrument(skip(self), fields(customer = %self.customer_id, method = %self.payment_method))]
    pub async fn submit(&mut self) -> Result<CheckoutOutcome, CommerceError> {
        self.recover_interrupted();
        match (&self.state, &self.cart) {
            (CheckoutState::Ready, Some(_)) | (CheckoutState::Failed(_), Some(_)) => {}
            _ => return Err(self.transition_error("submitting")),
        }
        let submission = self.build_submission()?;
        self.state = CheckoutState::Submitting;

        debug!(key = %self.idempotency_key, lines = submission.details.len(), "creating order");
        let order = match self
            .services
            .orders
            .create_order(&submission, &self.idempotency_key)
            .await
        {
            Ok(order) => order,
            Err(e) => {
                warn!(error = %e, "order creation failed");
                return Err(self.fail(e));
            }
        };
        info!(order = %order.id, price = %order.price, "order placed");

        if self.payment_method.is_cash_on_delivery() {
            return Ok(self.succeed(CheckoutOutcome::Confirmed { order }));
        }

        let payment = PaymentSubmission::for_order(&order, &self.customer_id, self.payment_method);
        match self.services.payments.create_payment(&payment).await {
            Ok(resp) => {
                info!(order = %order.id, "payment created, redirecting");
                Ok(self.succeed(CheckoutOutcome::RedirectToPayment {
                    order,
                    payment_url: resp.payment_url,
                }))
            }
            Err(e) => {
                warn!(order = %order.id, error = %e, "payment creation failed, cancelling order");
                let cancelled = match self.services.orders.cancel_order(&order.id).await {
                    Ok(()) => true,
                    Err(cancel_err) => {
                        warn!(order = %order.id, error = %cancel_err, "order cancellation failed");
                        false
                    }
                };
                if cancelled {
                    self.rotate_key();
                }
                Err(self.fail(CommerceError::PaymentFailed {
                    order_id: order.id.into_inner(),
                    cancelled,
                    reason: e.to_string(),
                }))
            }
        }
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn cart(&self) -> Option<&Cart> {
        self.cart.as_ref()
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn selected_address(&self) -> Option<&Address> {
        let id = self.address_id.as_ref()?;
        self.addresses.iter().find(|a| &a.id == id)
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn selected_items(&self) -> Vec<&CartLineItem> {
        match self.cart.as_ref() {
            Some(cart) => self.selection.selected_items(cart).collect(),
            None => Vec::new(),
        }
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn shipping_fee(&self) -> Money {
        self.shipping_fee
    }

    pub fn idempotency_key(&self) -> &IdempotencyKey {
        &self.idempotency_key
    }

    pub fn customer_id(&self) -> &UserId {
        &self.customer_id
    }

    fn ensure_editable(&mut self, to: &str) -> Result<(), CommerceError> {
        self.recover_interrupted();
        match (&self.state, &self.cart) {
            (CheckoutState::Ready, Some(_)) | (CheckoutState::Failed(_), Some(_)) => Ok(()),
            _ => Err(self.transition_error(to)),
        }
    }

    /// `submit` holds `&mut self` until it settles, so `Submitting` seen from
    /// any other call means its future was dropped.
    fn recover_interrupted(&mut self) {
        if self.state == CheckoutState::Submitting {
            warn!(key = %self.idempotency_key, "previous submission was interrupted");
            self.state =
                CheckoutState::Failed(CommerceError::Network("submission interrupted".to_string()));
        }
    }

    fn transition_error(&self, to: &str) -> CommerceError {
        CommerceError::InvalidCheckoutTransition {
            from: self.state.as_str().to_string(),
            to: to.to_string(),
        }
    }

    fn recompute_fee(&mut self) {
        self.shipping_fee = match (self.cart.as_ref(), self.selected_address()) {
            (Some(cart), Some(address)) => self
                .rates
                .calculate_fee(address, self.selection.selected_items(cart)),
            _ => Money::ZERO,
        };
    }

    fn rotate_key(&mut self) {
        self.idempotency_key = IdempotencyKey::generate();
    }

    fn succeed(&mut self, outcome: CheckoutOutcome) -> CheckoutOutcome {
        self.rotate_key();
        self.state = CheckoutState::Succeeded(outcome.clone());
        outcome
    }

    fn fail(&mut self, error: CommerceError) -> CommerceError {
        self.state = CheckoutState::Failed(error.clone());
        error
    }
}

impl std::fmt::Debug for CheckoutSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutSession")
            .field("customer_id", &self.customer_id)
            .field("state", &self.state.as_str())
            .field("selected", &self.selection.len())
            .field("address_id", &self.address_id)
            .field("payment_method", &self.payment_method)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{address, line, line_in_store, FakeStorefront};
    use crate::ErrorKind;

    fn session(fake: &Arc<FakeStorefront>, selected: Option<&[&str]>) -> CheckoutSession {
        let payload = selected.map(|ids| SelectionPayload::new(ids.iter().copied()));
        CheckoutSession::new(
            CheckoutServices::from_shared(fake.clone()),
            UserId::new("user-1"),
            payload,
        )
    }

    fn storefront() -> Arc<FakeStorefront> {
        let fake = FakeStorefront::with_cart(vec![line("a", 100_000, 2), line("b", 50_000, 1)]);
        fake.set_addresses(vec![
            address("addr-1", "Hà Nội", false),
            address("addr-2", "Hồ Chí Minh", true),
        ]);
        Arc::new(fake)
    }

    fn flat_rates() -> ShippingRates {
        ShippingRates {
            per_kg_rate: Money::ZERO,
            ..ShippingRates::default()
        }
    }

    #[tokio::test]
    async fn test_load_restores_selection_and_default_address() {
        let fake = storefront();
        let mut checkout = session(&fake, Some(&["a", "gone"]));
        checkout.load().await.unwrap();

        assert_eq!(checkout.state(), &CheckoutState::Ready);
        assert_eq!(checkout.selection().len(), 1);
        assert!(checkout.selection().contains(&LineItemId::new("a")));
        assert_eq!(
            checkout.selected_address().map(|a| a.id.as_str()),
            Some("addr-2")
        );
        // 2 units = 1 kg to HCM
        assert_eq!(checkout.shipping_fee(), Money::new(20_000));
        assert_eq!(fake.count_calls("fetch_cart"), 1);
        assert_eq!(fake.count_calls("list_addresses"), 1);
    }

    #[tokio::test]
    async fn test_load_failure_exposes_nothing() {
        let fake = storefront();
        fake.fail(|f| f.list_addresses = true);
        let mut checkout = session(&fake, Some(&["a"]));

        let err = checkout.load().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(matches!(checkout.state(), CheckoutState::Failed(_)));
        assert!(checkout.cart().is_none());
        assert!(checkout.selection().is_empty());
        assert!(matches!(
            checkout.submit().await,
            Err(CommerceError::InvalidCheckoutTransition { .. })
        ));
        assert_eq!(fake.count_calls("create_order"), 0);
    }

    #[tokio::test]
    async fn test_cod_checkout_of_selected_items() {
        let fake = storefront();
        let mut checkout = session(&fake, Some(&["a"])).with_rates(flat_rates());
        checkout.load().await.unwrap();

        let summary = checkout.summary().unwrap();
        assert_eq!(summary.subtotal, Money::new(200_000));
        assert_eq!(summary.shipping_fee, Money::new(15_000));
        assert_eq!(summary.total, Money::new(215_000));

        let outcome = checkout.submit().await.unwrap();
        assert_eq!(outcome.order().price, Money::new(215_000));
        assert!(matches!(outcome, CheckoutOutcome::Confirmed { .. }));
        assert!(checkout.state().is_terminal());

        let orders = fake.orders();
        assert_eq!(orders.len(), 1);
        let (submission, _) = &orders[0];
        assert_eq!(submission.details.len(), 1);
        assert_eq!(submission.details[0].variant_id.as_str(), "var-a");
        assert_eq!(submission.details[0].quantity, 2);
        assert_eq!(submission.payment_method, PaymentMethod::CashOnDelivery);
        assert_eq!(submission.address_id.as_str(), "addr-2");
        assert_eq!(fake.count_calls("create_payment"), 0);
    }

    #[tokio::test]
    async fn test_empty_selection_is_refused() {
        let fake = storefront();
        let mut checkout = session(&fake, None);
        checkout.load().await.unwrap();

        assert_eq!(checkout.submit().await, Err(CommerceError::EmptySelection));
        assert_eq!(checkout.state(), &CheckoutState::Ready);
        assert_eq!(fake.count_calls("create_order"), 0);
    }

    #[tokio::test]
    async fn test_missing_address_is_refused() {
        let fake = Arc::new(FakeStorefront::with_cart(vec![line("a", 100_000, 1)]));
        let mut checkout = session(&fake, Some(&["a"]));
        checkout.load().await.unwrap();

        assert_eq!(checkout.shipping_fee(), Money::ZERO);
        assert_eq!(checkout.submit().await, Err(CommerceError::MissingAddress));
        assert_eq!(fake.count_calls("create_order"), 0);
    }

    #[tokio::test]
    async fn test_mixed_stores_are_refused() {
        let fake = Arc::new(FakeStorefront::with_cart(vec![
            line_in_store("a", 100_000, 1, "store-1"),
            line_in_store("b", 100_000, 1, "store-2"),
        ]));
        fake.set_addresses(vec![address("addr-1", "Hà Nội", true)]);
        let mut checkout = session(&fake, Some(&["a", "b"]));
        checkout.load().await.unwrap();

        assert_eq!(checkout.submit().await, Err(CommerceError::MixedStores));
        checkout.toggle_item(&LineItemId::new("b")).unwrap();
        assert!(checkout.submit().await.is_ok());
    }

    #[tokio::test]
    async fn test_online_payment_redirects() {
        let fake = storefront();
        let mut checkout = session(&fake, Some(&["a", "b"]));
        checkout.load().await.unwrap();
        checkout.set_payment_method(PaymentMethod::Online).unwrap();

        let outcome = checkout.submit().await.unwrap();
        match outcome {
            CheckoutOutcome::RedirectToPayment { order, payment_url } => {
                assert_eq!(payment_url, format!("https://pay.example/checkout?order={}", order.id));
            }
            other => panic!("expected redirect, got {:?}", other),
        }
        let payments = fake.payments();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].payment_method, PaymentMethod::Online);
        assert_eq!(payments[0].customer_id.as_str(), "user-1");
    }

    #[tokio::test]
    async fn test_payment_failure_cancels_order() {
        let fake = storefront();
        fake.fail(|f| f.create_payment = true);
        let mut checkout = session(&fake, Some(&["a"]));
        checkout.load().await.unwrap();
        checkout.set_payment_method(PaymentMethod::Online).unwrap();
        let key_before = checkout.idempotency_key().clone();

        let err = checkout.submit().await.unwrap_err();
        assert_eq!(
            err,
            CommerceError::PaymentFailed {
                order_id: "ord-1".to_string(),
                cancelled: true,
                reason: "Network error: payment gateway unavailable".to_string(),
            }
        );
        assert_eq!(fake.cancelled().len(), 1);
        assert!(matches!(checkout.state(), CheckoutState::Failed(_)));
        assert_ne!(checkout.idempotency_key(), &key_before);
    }

    #[tokio::test]
    async fn test_retry_after_failed_cancel_reuses_order() {
        let fake = storefront();
        fake.fail(|f| {
            f.create_payment = true;
            f.cancel_order = true;
        });
        let mut checkout = session(&fake, Some(&["a"]));
        checkout.load().await.unwrap();
        checkout.set_payment_method(PaymentMethod::Online).unwrap();
        let key = checkout.idempotency_key().clone();

        let err = checkout.submit().await.unwrap_err();
        assert!(matches!(
            err,
            CommerceError::PaymentFailed { cancelled: false, .. }
        ));
        assert_eq!(checkout.idempotency_key(), &key);

        fake.fail(|f| f.create_payment = false);
        let outcome = checkout.submit().await.unwrap();
        assert_eq!(outcome.order().id.as_str(), "ord-1");
        assert_eq!(fake.orders().len(), 1);
        assert_eq!(fake.count_calls("create_order"), 2);
    }

    #[tokio::test]
    async fn test_order_failure_keeps_key_for_retry() {
        let fake = storefront();
        fake.fail(|f| f.create_order = true);
        let mut checkout = session(&fake, Some(&["a"]));
        checkout.load().await.unwrap();
        let key = checkout.idempotency_key().clone();

        assert!(checkout.submit().await.is_err());
        assert_eq!(checkout.idempotency_key(), &key);

        fake.fail(|f| f.create_order = false);
        checkout.submit().await.unwrap();
        assert_eq!(fake.orders()[0].1, key);
        assert_ne!(checkout.idempotency_key(), &key);
    }

    #[tokio::test]
    async fn test_edits_rotate_key_and_recompute_fee() {
        let fake = storefront();
        let mut checkout = session(&fake, Some(&["a"]));
        checkout.load().await.unwrap();

        let key = checkout.idempotency_key().clone();
        checkout.set_payment_method(PaymentMethod::CashOnDelivery).unwrap();
        assert_eq!(checkout.idempotency_key(), &key);

        checkout.select_address(&AddressId::new("addr-1")).unwrap();
        assert_ne!(checkout.idempotency_key(), &key);
        // 2 units = 1 kg to Hà Nội
        assert_eq!(checkout.shipping_fee(), Money::new(30_000));

        let key = checkout.idempotency_key().clone();
        checkout.toggle_item(&LineItemId::new("b")).unwrap();
        assert_ne!(checkout.idempotency_key(), &key);
        // 3 units = 1.5 kg -> 2 kg
        assert_eq!(checkout.shipping_fee(), Money::new(35_000));

        let key = checkout.idempotency_key().clone();
        checkout.set_note("ring twice").unwrap();
        assert_ne!(checkout.idempotency_key(), &key);

        assert!(checkout.select_address(&AddressId::new("nope")).is_err());
        checkout.clear_selection().unwrap();
        assert_eq!(checkout.shipping_fee(), Money::ZERO);
    }

    #[tokio::test]
    async fn test_reload_with_new_address_rotates_key() {
        let fake = storefront();
        let mut checkout = session(&fake, Some(&["a"]));
        checkout.load().await.unwrap();
        checkout.select_address(&AddressId::new("addr-1")).unwrap();
        let key = checkout.idempotency_key().clone();

        checkout.load().await.unwrap();
        assert_eq!(
            checkout.selected_address().map(|a| a.id.as_str()),
            Some("addr-2")
        );
        assert_ne!(checkout.idempotency_key(), &key);
    }

    #[tokio::test]
    async fn test_reload_with_new_selection_rotates_key() {
        let fake = storefront();
        let mut checkout = session(&fake, Some(&["a"]));
        checkout.load().await.unwrap();
        checkout.toggle_item(&LineItemId::new("b")).unwrap();
        let key = checkout.idempotency_key().clone();

        checkout.load().await.unwrap();
        assert_eq!(checkout.selection().len(), 1);
        assert_ne!(checkout.idempotency_key(), &key);
    }

    #[tokio::test]
    async fn test_unchanged_reload_keeps_key() {
        let fake = storefront();
        fake.fail(|f| f.create_order = true);
        let mut checkout = session(&fake, Some(&["a"]));
        checkout.load().await.unwrap();
        let key = checkout.idempotency_key().clone();
        assert!(checkout.submit().await.is_err());

        checkout.load().await.unwrap();
        assert_eq!(checkout.idempotency_key(), &key);
    }

    #[tokio::test]
    async fn test_dropped_submit_can_be_retried() {
        let fake = storefront();
        let mut checkout = session(&fake, Some(&["a"]));
        checkout.load().await.unwrap();
        let key = checkout.idempotency_key().clone();
        let _gate = fake.hold_next_order();

        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(20), checkout.submit()).await;
        assert!(timed_out.is_err());
        assert_eq!(checkout.state(), &CheckoutState::Submitting);

        checkout.set_payment_method(PaymentMethod::CashOnDelivery).unwrap();
        assert_eq!(
            checkout.state(),
            &CheckoutState::Failed(CommerceError::Network("submission interrupted".to_string()))
        );
        assert_eq!(checkout.idempotency_key(), &key);

        let outcome = checkout.submit().await.unwrap();
        assert_eq!(outcome.order().id.as_str(), "ord-1");
        assert_eq!(fake.orders()[0].1, key);
    }

    #[tokio::test]
    async fn test_load_after_dropped_submit() {
        let fake = storefront();
        let mut checkout = session(&fake, Some(&["a"]));
        checkout.load().await.unwrap();
        let _gate = fake.hold_next_order();

        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(20), checkout.submit()).await;
        assert!(timed_out.is_err());

        checkout.load().await.unwrap();
        assert_eq!(checkout.state(), &CheckoutState::Ready);
        assert!(checkout.submit().await.is_ok());
    }

    #[tokio::test]
    async fn test_no_second_submit_after_success() {
        let fake = storefront();
        let mut checkout = session(&fake, Some(&["a"]));
        checkout.load().await.unwrap();
        checkout.submit().await.unwrap();

        assert!(matches!(
            checkout.submit().await,
            Err(CommerceError::InvalidCheckoutTransition { .. })
        ));
        assert!(checkout.set_note("late").is_err());
        assert_eq!(fake.orders().len(), 1);
    }
}
