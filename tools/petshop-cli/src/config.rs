//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use petshop_auth::DEFAULT_REFRESH_PATH;
use petshop_commerce::checkout::ShippingRates;
use serde::{Deserialize, Serialize};

/// Environment variable overriding `api.base_url`.
pub const API_URL_ENV: &str = "PETSHOP_API_URL";

/// Config file names, in lookup order.
pub const CONFIG_NAMES: [&str; 3] = ["petshop.toml", ".petshop.toml", "petshop.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Storefront API.
    #[serde(default)]
    pub api: ApiConfig,

    /// Credential storage.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Shipping rate table override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<ShippingRates>,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if is_json(path) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Apply environment overrides.
    pub fn with_env_overrides(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url;
        }
        self
    }

    /// Shipping rates in effect.
    pub fn shipping_rates(&self) -> ShippingRates {
        self.shipping.clone().unwrap_or_default()
    }

    /// Problems that make the config unusable, then advisories.
    pub fn validate(&self) -> (Vec<String>, Vec<String>) {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let url = self.api.base_url.trim();
        if url.is_empty() {
            errors.push("api.base_url is required".to_string());
        } else if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(format!("api.base_url '{}' must start with http:// or https://", url));
        } else if url.starts_with("http://")
            && !(url.contains("localhost") || url.contains("127.0.0.1"))
        {
            warnings.push("api.base_url uses plain http for a remote host".to_string());
        }

        if self.api.timeout_ms == 0 {
            errors.push("api.timeout_ms must be greater than 0".to_string());
        }
        if self.api.connect_timeout_ms > self.api.timeout_ms {
            warnings.push("api.connect_timeout_ms exceeds api.timeout_ms".to_string());
        }
        if !self.api.refresh_path.starts_with('/') {
            errors.push("api.refresh_path must start with '/'".to_string());
        }

        if let Some(rates) = &self.shipping {
            if rates.item_weight_grams == 0 {
                warnings.push("shipping.item_weight_grams is 0, weight surcharge is disabled".to_string());
            }
            if rates.default_fee.is_negative() || rates.per_kg_rate.is_negative() {
                errors.push("shipping fees must not be negative".to_string());
            }
            for (city, fee) in &rates.city_fees {
                if fee.is_negative() {
                    errors.push(format!("shipping.city_fees.{} must not be negative", city));
                }
            }
        }

        (errors, warnings)
    }
}

/// Storefront API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API root, e.g. `https://api.petshop.example`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Total time per request.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Token refresh endpoint.
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_connect_timeout_ms() -> u64 {
    3_000
}

fn default_refresh_path() -> String {
    DEFAULT_REFRESH_PATH.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            refresh_path: default_refresh_path(),
        }
    }
}

/// Credential storage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Credentials file. Defaults to `~/.local/share/petshop/credentials.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_path: Option<String>,
}

impl AuthConfig {
    pub fn resolve_credentials_path(&self) -> PathBuf {
        match &self.credentials_path {
            Some(path) => expand_home(path),
            None => data_dir().join("petshop").join("credentials.json"),
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}

/// Get the platform-specific data directory.
fn data_dir() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local").join("share")
    } else {
        std::env::temp_dir()
    }
}

/// Generate a default petshop.toml config file.
pub fn generate_default_config(base_url: &str) -> String {
    format!(
        r#"# PetShop storefront client configuration

[api]
base_url = "{base_url}"
timeout_ms = 15000
connect_timeout_ms = 3000
refresh_path = "/auth/refresh"

[auth]
# credentials_path = "~/.local/share/petshop/credentials.json"

# Uncomment to override the built-in shipping table.
# [shipping]
# default_fee = 30000
# per_kg_rate = 5000
# item_weight_grams = 500
#
# [shipping.city_fees]
# "Hồ Chí Minh" = 15000
# "Hà Nội" = 25000
"#,
        base_url = base_url
    )
}
