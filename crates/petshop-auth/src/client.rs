//! Bearer-token HTTP client.
//!
//! Every request carries the stored access token. A 401 answer triggers
//! exactly one refresh followed by one replay of the request. If the refresh
//! fails the stored credentials are cleared and the original 401 response
//! is handed back to the caller.

use std::sync::Arc;

use petshop_commerce::ids::UserId;
use petshop_data::{FetchClient, RequestBuilder, Response};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::credentials::{RefreshRequest, RefreshResponse};
use crate::{AuthError, CredentialStore, Credentials};

/// Default path of the refresh endpoint.
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";

/// HTTP client that signs requests with the stored bearer token.
#[derive(Clone)]
pub struct AuthenticatedClient {
    http: FetchClient,
    store: Arc<dyn CredentialStore>,
    refresh_path: String,
    refresh_lock: Arc<Mutex<()>>,
}

impl AuthenticatedClient {
    pub fn new(http: FetchClient, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            http,
            store,
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    /// The underlying client, for building requests.
    pub fn http(&self) -> &FetchClient {
        &self.http
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Current credentials, or `NotLoggedIn`.
    pub fn credentials(&self) -> Result<Credentials, AuthError> {
        self.store.load()?.ok_or(AuthError::NotLoggedIn)
    }

    /// Customer the stored credentials belong to.
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        Ok(self.credentials()?.user_id)
    }

    /// Send a signed request, refreshing the token once on 401.
    #[instrument(skip(self, request), fields(method = %request.method(), url = %request.url()))]
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, AuthError> {
        let credentials = self.credentials()?;
        let signed = request.clone().bearer_auth(&credentials.access_token);
        let response = self.http.execute(&signed).await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        debug!("access token rejected, refreshing");
        match self.refresh(&credentials).await {
            Ok(fresh) => {
                let replay = request.bearer_auth(&fresh.access_token);
                Ok(self.http.execute(&replay).await?)
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed, clearing credentials");
                self.store.clear()?;
                Ok(response)
            }
        }
    }

    /// Exchange the refresh token for new tokens.
    ///
    /// Concurrent callers that saw the same rejected token share one refresh:
    /// whoever gets the lock second finds the token already replaced.
    async fn refresh(&self, rejected: &Credentials) -> Result<Credentials, AuthError> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.credentials()?;
        if current.access_token != rejected.access_token {
            debug!("token already refreshed by another request");
            return Ok(current);
        }
        let refresh_token = current
            .refresh_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::NoRefreshToken)?;

        let request = self
            .http
            .post(self.refresh_path.as_str())
            .json(&RefreshRequest { refresh_token })?;
        let response = self.http.execute(&request).await?;
        if !response.is_success() {
            return Err(AuthError::RefreshFailed(format!(
                "HTTP {}: {}",
                response.status,
                response.error_message()
            )));
        }
        let tokens: RefreshResponse = response.json()?;
        let fresh = current.refreshed(tokens);
        self.store.save(&fresh)?;
        info!(user = %fresh.user_id, "access token refreshed");
        Ok(fresh)
    }
}

impl std::fmt::Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("base_url", &self.http.base_url())
            .field("refresh_path", &self.refresh_path)
            .finish_non_exhaustive()
    }
}
