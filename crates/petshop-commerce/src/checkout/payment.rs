//! Payment types.

use crate::checkout::{OrderResponse, PaymentMethod};
use crate::ids::{OrderId, UserId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Body of `POST /payment`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSubmission {
    pub order_id: OrderId,
    pub customer_id: UserId,
    pub amount: Money,
    pub payment_method: PaymentMethod,
}

impl PaymentSubmission {
    /// Pay the server-computed price of a freshly created order.
    pub fn for_order(order: &OrderResponse, customer_id: &UserId, method: PaymentMethod) -> Self {
        Self {
            order_id: order.id.clone(),
            customer_id: customer_id.clone(),
            amount: order.price,
            payment_method: method,
        }
    }
}

/// Response of `POST /payment`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    /// Gateway page the customer is sent to with a full page load.
    pub payment_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_for_order_uses_server_price() {
        let order = OrderResponse {
            id: OrderId::new("ord-1"),
            price: Money::new(215_000),
        };
        let payment = PaymentSubmission::for_order(&order, &UserId::new("u1"), PaymentMethod::Online);
        assert_eq!(payment.amount, Money::new(215_000));

        let json = serde_json::to_value(&payment).unwrap();
        assert_eq!(json["orderId"], "ord-1");
        assert_eq!(json["customerId"], "u1");
        assert_eq!(json["paymentMethod"], 0);
    }

    #[test]
    fn test_payment_response_wire_format() {
        let resp: PaymentResponse =
            serde_json::from_str(r#"{"paymentUrl":"https://pay.example/x"}"#).unwrap();
        assert_eq!(resp.payment_url, "https://pay.example/x");
    }
}
