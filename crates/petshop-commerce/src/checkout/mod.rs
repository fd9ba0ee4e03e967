//! Checkout module.
//!
//! Contains addresses, shipping fees, order and payment bodies, and the
//! checkout orchestrator.

mod address;
mod flow;
mod order;
mod payment;
mod shipping;
mod summary;

pub use address::{preferred_address, Address, AddressInput};
pub use flow::{CheckoutOutcome, CheckoutServices, CheckoutSession, CheckoutState};
pub use order::{OrderDetail, OrderResponse, OrderSubmission, PaymentMethod};
pub use payment::{PaymentResponse, PaymentSubmission};
pub use shipping::{
    calculate_fee, ShippingRates, DEFAULT_BASE_FEE, DEFAULT_ITEM_WEIGHT_GRAMS, DEFAULT_PER_KG_RATE,
};
pub use summary::CheckoutSummary;
