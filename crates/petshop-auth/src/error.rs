//! Authentication errors.

use petshop_data::FetchError;
use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// No stored credentials.
    #[error("not logged in")]
    NotLoggedIn,

    /// Credentials carry no refresh token.
    #[error("session expired and no refresh token is stored")]
    NoRefreshToken,

    /// The refresh endpoint refused or failed.
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    /// Credential storage failed.
    #[error("credential storage error: {0}")]
    Storage(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Transport error.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl AuthError {
    /// Check if this is an authentication failure.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            AuthError::NotLoggedIn | AuthError::NoRefreshToken | AuthError::RefreshFailed(_)
        )
    }
}

impl From<std::io::Error> for AuthError {
    fn from(e: std::io::Error) -> Self {
        AuthError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(e: serde_json::Error) -> Self {
        AuthError::Serialization(e.to_string())
    }
}
