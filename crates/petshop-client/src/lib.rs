//! REST client for the PetShop storefront API.
//!
//! [`StorefrontClient`] implements the service traits of `petshop-commerce`
//! over HTTP, so a [`CartStore`](petshop_commerce::cart::CartStore) or a
//! [`CheckoutSession`](petshop_commerce::checkout::CheckoutSession) can run
//! against the live API.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use petshop_auth::{AuthenticatedClient, FileCredentialStore};
//! use petshop_client::StorefrontClient;
//! use petshop_data::{FetchClient, TimeoutConfig};
//!
//! let http = FetchClient::new(TimeoutConfig::default())?.with_base_url(base_url);
//! let store = Arc::new(FileCredentialStore::new(path));
//! let client = Arc::new(StorefrontClient::new(AuthenticatedClient::new(http, store)));
//! let services = CheckoutServices::from_shared(client);
//! ```

mod address;
mod cart;
mod error;
mod order;
mod payment;

use petshop_auth::AuthenticatedClient;
use petshop_commerce::{CommerceError, UserId};
use petshop_data::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{check_status, from_auth, from_fetch, Target};

/// Header carrying the checkout attempt key on order creation.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Storefront API client.
#[derive(Debug, Clone)]
pub struct StorefrontClient {
    auth: AuthenticatedClient,
}

impl StorefrontClient {
    pub fn new(auth: AuthenticatedClient) -> Self {
        Self { auth }
    }

    pub fn auth(&self) -> &AuthenticatedClient {
        &self.auth
    }

    /// Customer id of the stored login.
    pub fn current_user(&self) -> Result<UserId, CommerceError> {
        self.auth.user_id().map_err(from_auth)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.auth.http().request(method, path)
    }

    fn json_request<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &T,
    ) -> Result<RequestBuilder, CommerceError> {
        self.request(method, path).json(body).map_err(from_fetch)
    }

    async fn send(&self, request: RequestBuilder, target: Target<'_>) -> Result<Response, CommerceError> {
        let response = self.auth.send(request).await.map_err(from_auth)?;
        check_status(response, target)
    }
}

fn parse<T: DeserializeOwned>(response: &Response) -> Result<T, CommerceError> {
    response
        .json()
        .map_err(|e| CommerceError::Network(format!("unexpected response body: {}", e)))
}

/// Percent-encode one path segment.
fn segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}
