//! HTTP client utilities for the PetShop storefront.
//!
//! A small layer over `reqwest` with replayable request builders and fully
//! buffered responses. JSON in, JSON out.
//!
//! # Example
//!
//! ```rust,ignore
//! use petshop_data::{FetchClient, TimeoutConfig};
//!
//! let client = FetchClient::new(TimeoutConfig::default())?
//!     .with_base_url("https://api.petshop.example");
//!
//! let req = client.get("/Cart").bearer_auth(token);
//! let cart: Cart = client.execute(&req).await?.error_for_status()?.json()?;
//! ```

mod error;
mod request;
mod response;
mod timeout;

use std::collections::BTreeMap;

use tracing::debug;

pub use error::FetchError;
pub use request::{Method, RequestBuilder};
pub use response::Response;
pub use timeout::TimeoutConfig;

/// HTTP client for making outbound requests.
#[derive(Debug, Clone)]
pub struct FetchClient {
    inner: reqwest::Client,
    base_url: Option<String>,
    default_headers: BTreeMap<String, String>,
}

impl FetchClient {
    /// Create a new HTTP client.
    pub fn new(timeouts: TimeoutConfig) -> Result<Self, FetchError> {
        let inner = timeouts
            .apply(reqwest::Client::builder())
            .user_agent(concat!("petshop/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            inner,
            base_url: None,
            default_headers: BTreeMap::new(),
        })
    }

    /// Create a client with a base URL that will be prepended to relative
    /// paths.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a default header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Create a GET request.
    pub fn get(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::Get, url)
    }

    /// Create a POST request.
    pub fn post(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::Post, url)
    }

    /// Create a PUT request.
    pub fn put(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::Put, url)
    }

    /// Create a DELETE request.
    pub fn delete(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::Delete, url)
    }

    /// Create a request with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> RequestBuilder {
        let full_url = self.resolve(url.into());
        let mut builder = RequestBuilder::new(method, full_url).accept("application/json");
        for (key, value) in &self.default_headers {
            builder = builder.header(key.clone(), value.clone());
        }
        builder
    }

    /// Send a request and read the whole response.
    ///
    /// Non-2xx answers are returned as responses, not errors; use
    /// [`Response::error_for_status`] to convert.
    pub async fn execute(&self, request: &RequestBuilder) -> Result<Response, FetchError> {
        let mut outgoing = self
            .inner
            .request(request.method.to_reqwest(), request.url.as_str());
        for (key, value) in &request.headers {
            outgoing = outgoing.header(key.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            outgoing = outgoing.body(body.clone());
        }

        debug!(method = %request.method, url = %request.url, "sending request");
        let resp = Response::read(outgoing.send().await?).await?;
        debug!(method = %request.method, url = %request.url, status = resp.status, "response received");
        Ok(resp)
    }

    fn resolve(&self, url: String) -> String {
        match &self.base_url {
            Some(base) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                format!(
                    "{}/{}",
                    base.trim_end_matches('/'),
                    url.trim_start_matches('/')
                )
            }
            _ => url,
        }
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FetchClient, FetchError, Method, RequestBuilder, Response, TimeoutConfig};
}
