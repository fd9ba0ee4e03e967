//! Order endpoints.

use async_trait::async_trait;
use petshop_commerce::api::OrderApi;
use petshop_commerce::checkout::{OrderResponse, OrderSubmission};
use petshop_commerce::{CommerceError, IdempotencyKey, OrderId};
use petshop_data::Method;
use tracing::debug;

use crate::error::Target;
use crate::{parse, segment, StorefrontClient, IDEMPOTENCY_KEY_HEADER};

#[async_trait]
impl OrderApi for StorefrontClient {
    async fn create_order(
        &self,
        submission: &OrderSubmission,
        key: &IdempotencyKey,
    ) -> Result<OrderResponse, CommerceError> {
        let request = self
            .json_request(Method::Post, "/order", submission)?
            .header(IDEMPOTENCY_KEY_HEADER, key.as_str());
        let response = self
            .send(request, Target::new("store", submission.store_id.as_str()))
            .await?;
        let order: OrderResponse = parse(&response)?;
        debug!(order = %order.id, key = %key, "order created");
        Ok(order)
    }

    async fn cancel_order(&self, id: &OrderId) -> Result<(), CommerceError> {
        let path = format!("/order/{}/cancel", segment(id.as_str()));
        self.send(self.request(Method::Put, &path), Target::new("order", id.as_str()))
            .await?;
        Ok(())
    }
}
