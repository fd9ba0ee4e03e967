//! Address book endpoints.

use async_trait::async_trait;
use petshop_commerce::api::AddressApi;
use petshop_commerce::checkout::{Address, AddressInput};
use petshop_commerce::{AddressId, CommerceError};
use petshop_data::Method;

use crate::error::Target;
use crate::{parse, segment, StorefrontClient};

const ADDRESS_PATH: &str = "/customers/address";

#[async_trait]
impl AddressApi for StorefrontClient {
    async fn list_addresses(&self) -> Result<Vec<Address>, CommerceError> {
        let response = self
            .send(self.request(Method::Get, ADDRESS_PATH), Target::new("address book", ""))
            .await?;
        parse(&response)
    }

    async fn create_address(&self, input: &AddressInput) -> Result<Address, CommerceError> {
        let request = self.json_request(Method::Post, ADDRESS_PATH, input)?;
        let response = self.send(request, Target::new("address book", "")).await?;
        parse(&response)
    }

    async fn update_address(
        &self,
        id: &AddressId,
        input: &AddressInput,
    ) -> Result<Address, CommerceError> {
        let path = format!("{}/{}", ADDRESS_PATH, segment(id.as_str()));
        let request = self.json_request(Method::Put, &path, input)?;
        let response = self.send(request, Target::new("address", id.as_str())).await?;
        parse(&response)
    }

    async fn delete_address(&self, id: &AddressId) -> Result<(), CommerceError> {
        let path = format!("{}/{}", ADDRESS_PATH, segment(id.as_str()));
        self.send(self.request(Method::Delete, &path), Target::new("address", id.as_str()))
            .await?;
        Ok(())
    }
}
