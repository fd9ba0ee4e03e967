//! Order types.

use std::fmt;
use std::str::FromStr;

use crate::cart::{AttributeBlob, CartLineItem};
use crate::error::CommerceError;
use crate::ids::{AddressId, OrderId, StoreId, UserId, VariantId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// How the customer pays.
///
/// On the wire this is an integer: `0` online, `1` cash on delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PaymentMethod {
    /// Redirect to the payment gateway after the order is placed.
    Online,
    /// Pay the courier.
    #[default]
    CashOnDelivery,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Online => "online",
            PaymentMethod::CashOnDelivery => "cod",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::Online => "Online payment",
            PaymentMethod::CashOnDelivery => "Cash on delivery",
        }
    }

    /// Whether the order is complete without a payment redirect.
    pub fn is_cash_on_delivery(&self) -> bool {
        matches!(self, PaymentMethod::CashOnDelivery)
    }
}

impl From<PaymentMethod> for u8 {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Online => 0,
            PaymentMethod::CashOnDelivery => 1,
        }
    }
}

impl TryFrom<u8> for PaymentMethod {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PaymentMethod::Online),
            1 => Ok(PaymentMethod::CashOnDelivery),
            other => Err(format!("unknown payment method {}", other)),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" | "0" => Ok(PaymentMethod::Online),
            "cod" | "cash" | "1" => Ok(PaymentMethod::CashOnDelivery),
            other => Err(format!("unknown payment method '{}' (expected online or cod)", other)),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of an order, copied from the cart at submit time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub quantity: i64,
    /// Unit price at submit time.
    pub price: Money,
    #[serde(rename = "productVariantId")]
    pub variant_id: VariantId,
    pub product_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
    /// Attribute blob echoed verbatim.
    pub attributes: AttributeBlob,
}

impl OrderDetail {
    /// Snapshot a cart line. Later catalog edits do not reach the order.
    pub fn snapshot(item: &CartLineItem) -> Self {
        Self {
            quantity: item.quantity,
            price: item.unit_price,
            variant_id: item.variant_id.clone(),
            product_name: item.product_name.clone(),
            picture_url: item.picture_url.clone(),
            attributes: item.attributes.clone(),
        }
    }

    /// `price * quantity`.
    pub fn line_total(&self) -> Result<Money, CommerceError> {
        self.price
            .checked_mul(self.quantity)
            .ok_or(CommerceError::Overflow)
    }
}

/// Body of `POST /order`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
    pub store_id: StoreId,
    pub customer_id: UserId,
    pub address_id: AddressId,
    pub payment_method: PaymentMethod,
    pub delivery_price: Money,
    #[serde(default)]
    pub note: String,
    #[serde(rename = "orderDetails")]
    pub details: Vec<OrderDetail>,
}

impl OrderSubmission {
    /// Sum of the detail lines.
    pub fn subtotal(&self) -> Result<Money, CommerceError> {
        self.details.iter().try_fold(Money::ZERO, |acc, d| {
            acc.checked_add(d.line_total()?).ok_or(CommerceError::Overflow)
        })
    }

    /// Subtotal plus delivery.
    pub fn total(&self) -> Result<Money, CommerceError> {
        self.subtotal()?
            .checked_add(self.delivery_price)
            .ok_or(CommerceError::Overflow)
    }

    /// Units across all lines.
    pub fn item_count(&self) -> i64 {
        self.details.iter().map(|d| d.quantity).sum()
    }
}

/// Response of `POST /order`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: OrderId,
    /// Price computed by the server.
    pub price: Money,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::line;

    fn submission(details: Vec<OrderDetail>) -> OrderSubmission {
        OrderSubmission {
            store_id: StoreId::new("store-1"),
            customer_id: UserId::new("user-1"),
            address_id: AddressId::new("a1"),
            payment_method: PaymentMethod::CashOnDelivery,
            delivery_price: Money::new(15_000),
            note: String::new(),
            details,
        }
    }

    #[test]
    fn test_payment_method_wire_format() {
        assert_eq!(serde_json::to_string(&PaymentMethod::Online).unwrap(), "0");
        assert_eq!(serde_json::to_string(&PaymentMethod::CashOnDelivery).unwrap(), "1");
        let parsed: PaymentMethod = serde_json::from_str("1").unwrap();
        assert_eq!(parsed, PaymentMethod::CashOnDelivery);
        assert!(serde_json::from_str::<PaymentMethod>("7").is_err());
    }

    #[test]
    fn test_payment_method_from_str() {
        assert_eq!("COD".parse::<PaymentMethod>(), Ok(PaymentMethod::CashOnDelivery));
        assert_eq!("online".parse::<PaymentMethod>(), Ok(PaymentMethod::Online));
        assert!("card".parse::<PaymentMethod>().is_err());
        assert!(PaymentMethod::default().is_cash_on_delivery());
    }

    #[test]
    fn test_detail_is_a_snapshot() {
        let mut item = line("a", 100_000, 2);
        let detail = OrderDetail::snapshot(&item);
        item.unit_price = Money::new(1);
        item.product_name = "Renamed".to_string();
        assert_eq!(detail.price, Money::new(100_000));
        assert_eq!(detail.product_name, "Product a");
        assert_eq!(detail.attributes.as_str(), r#"{"size":"M"}"#);
    }

    #[test]
    fn test_submission_totals() {
        let sub = submission(vec![
            OrderDetail::snapshot(&line("a", 100_000, 2)),
            OrderDetail::snapshot(&line("b", 50_000, 1)),
        ]);
        assert_eq!(sub.subtotal(), Ok(Money::new(250_000)));
        assert_eq!(sub.total(), Ok(Money::new(265_000)));
        assert_eq!(sub.item_count(), 3);
    }

    #[test]
    fn test_submission_wire_format() {
        let sub = submission(vec![OrderDetail::snapshot(&line("a", 100_000, 2))]);
        let json = serde_json::to_value(&sub).unwrap();
        assert_eq!(json["storeId"], "store-1");
        assert_eq!(json["paymentMethod"], 1);
        assert_eq!(json["deliveryPrice"], 15_000);
        assert_eq!(json["orderDetails"][0]["productVariantId"], "var-a");
        assert_eq!(json["orderDetails"][0]["quantity"], 2);
        assert_eq!(json["orderDetails"][0]["attributes"], r#"{"size":"M"}"#);
    }
}
