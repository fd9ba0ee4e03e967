//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use petshop_auth::{AuthenticatedClient, CredentialStore, FileCredentialStore};
use petshop_client::StorefrontClient;
use petshop_commerce::checkout::ShippingRates;
use petshop_data::{FetchClient, TimeoutConfig};
use tracing::debug;

use crate::config::{CliConfig, API_URL_ENV, CONFIG_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// File the config came from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => {
                let path = PathBuf::from(path);
                (CliConfig::load(&path)?, Some(path))
            }
            None => match find_config_file(&cwd) {
                Some(path) => (CliConfig::load(&path)?, Some(path)),
                None => (CliConfig::default(), None),
            },
        };
        let config = config.with_env_overrides(std::env::var(API_URL_ENV).ok());

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Credential file for this configuration.
    pub fn credential_store(&self) -> Arc<FileCredentialStore> {
        Arc::new(FileCredentialStore::new(
            self.config.auth.resolve_credentials_path(),
        ))
    }

    /// Storefront client signed with the stored credentials.
    pub fn client(&self) -> Result<Arc<StorefrontClient>> {
        let api = &self.config.api;
        let timeouts = TimeoutConfig::from_millis(api.connect_timeout_ms, api.timeout_ms);
        let http = FetchClient::new(timeouts)
            .context("Failed to build HTTP client")?
            .with_base_url(api.base_url.clone());

        let store: Arc<dyn CredentialStore> = self.credential_store();
        let auth = AuthenticatedClient::new(http, store).with_refresh_path(api.refresh_path.clone());
        debug!(base_url = %api.base_url, refresh_path = %api.refresh_path, "storefront client ready");
        Ok(Arc::new(StorefrontClient::new(auth)))
    }

    pub fn shipping_rates(&self) -> ShippingRates {
        self.config.shipping_rates()
    }
}

/// Find a config file in the directory tree.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in CONFIG_NAMES {
            let candidate = current.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}
