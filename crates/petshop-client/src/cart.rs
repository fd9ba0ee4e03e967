//! Cart endpoints.

use async_trait::async_trait;
use petshop_commerce::api::CartApi;
use petshop_commerce::cart::{Cart, NewLineItem};
use petshop_commerce::{CommerceError, LineItemId, UserId};
use petshop_data::Method;
use serde::Serialize;
use tracing::debug;

use crate::error::Target;
use crate::{parse, segment, StorefrontClient};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddItemBody<'a> {
    user_id: &'a UserId,
    #[serde(flatten)]
    item: &'a NewLineItem,
}

#[derive(Serialize)]
struct QuantityBody {
    quantity: i64,
}

#[async_trait]
impl CartApi for StorefrontClient {
    async fn fetch_cart(&self, user: &UserId) -> Result<Cart, CommerceError> {
        let response = self
            .send(self.request(Method::Get, "/Cart"), Target::new("cart", user.as_str()))
            .await?;
        let cart: Cart = parse(&response)?;
        debug!(user = %user, items = cart.items.len(), "cart fetched");
        Ok(cart)
    }

    async fn add_item(&self, user: &UserId, item: &NewLineItem) -> Result<(), CommerceError> {
        let body = AddItemBody { user_id: user, item };
        let request = self.json_request(Method::Post, "/Cart/items", &body)?;
        self.send(request, Target::new("product variant", item.variant_id.as_str()))
            .await?;
        Ok(())
    }

    async fn update_item_quantity(
        &self,
        user: &UserId,
        item: &LineItemId,
        quantity: i64,
    ) -> Result<(), CommerceError> {
        let path = format!("/Cart/{}/items/{}", segment(user.as_str()), segment(item.as_str()));
        let request = self.json_request(Method::Post, &path, &QuantityBody { quantity })?;
        self.send(request, Target::new("line item", item.as_str())).await?;
        Ok(())
    }

    async fn remove_item(&self, user: &UserId, item: &LineItemId) -> Result<(), CommerceError> {
        let path = format!("/Cart/{}/items/{}", segment(user.as_str()), segment(item.as_str()));
        self.send(self.request(Method::Delete, &path), Target::new("line item", item.as_str()))
            .await?;
        Ok(())
    }

    async fn clear_cart(&self, user: &UserId) -> Result<(), CommerceError> {
        let path = format!("/Cart/{}", segment(user.as_str()));
        self.send(self.request(Method::Delete, &path), Target::new("cart", user.as_str()))
            .await?;
        Ok(())
    }
}
