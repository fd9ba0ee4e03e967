//! Payment endpoint.

use async_trait::async_trait;
use petshop_commerce::api::PaymentApi;
use petshop_commerce::checkout::{PaymentResponse, PaymentSubmission};
use petshop_commerce::CommerceError;
use petshop_data::Method;

use crate::error::Target;
use crate::{parse, StorefrontClient};

#[async_trait]
impl PaymentApi for StorefrontClient {
    async fn create_payment(
        &self,
        submission: &PaymentSubmission,
    ) -> Result<PaymentResponse, CommerceError> {
        let request = self.json_request(Method::Post, "/payment", submission)?;
        let response = self
            .send(request, Target::new("order", submission.order_id.as_str()))
            .await?;
        parse(&response)
    }
}
