//! Authentication for the PetShop storefront client.
//!
//! Stores the customer's tokens and signs outgoing requests with them,
//! refreshing the access token once when the API answers 401.

mod client;
mod credentials;
mod error;
mod store;

pub use client::{AuthenticatedClient, DEFAULT_REFRESH_PATH};
pub use credentials::{Credentials, RefreshRequest, RefreshResponse};
pub use error::AuthError;
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
