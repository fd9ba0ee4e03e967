//! Stored login credentials.

use chrono::{DateTime, Utc};
use petshop_commerce::ids::UserId;
use serde::{Deserialize, Serialize};

/// Tokens for one signed-in customer.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Customer the tokens belong to.
    pub user_id: UserId,
    /// Bearer token.
    pub access_token: String,
    /// Token used to obtain a new access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// When the tokens were stored or last refreshed.
    pub updated_at: DateTime<Utc>,
}

impl Credentials {
    pub fn new(user_id: UserId, access_token: impl Into<String>) -> Self {
        Self {
            user_id,
            access_token: access_token.into(),
            refresh_token: None,
            updated_at: Utc::now(),
        }
    }

    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }

    /// Replace the tokens after a refresh. A response without a new refresh
    /// token keeps the old one.
    pub fn refreshed(&self, tokens: RefreshResponse) -> Self {
        Self {
            user_id: self.user_id.clone(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token.or_else(|| self.refresh_token.clone()),
            updated_at: Utc::now(),
        }
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Body of the refresh call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Answer of the refresh call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_keeps_old_refresh_token_when_absent() {
        let creds = Credentials::new(UserId::new("u1"), "a1").with_refresh_token("r1");
        let next = creds.refreshed(RefreshResponse {
            access_token: "a2".into(),
            refresh_token: None,
        });
        assert_eq!(next.access_token, "a2");
        assert_eq!(next.refresh_token.as_deref(), Some("r1"));
        assert_eq!(next.user_id, creds.user_id);
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let creds = Credentials::new(UserId::new("u1"), "secret-access").with_refresh_token("secret-refresh");
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("u1"));
    }

    #[test]
    fn test_wire_format() {
        let creds = Credentials::new(UserId::new("u1"), "a1");
        let json = serde_json::to_value(&creds).unwrap();
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["accessToken"], "a1");
        assert!(json.get("refreshToken").is_none());
        assert!(!creds.can_refresh());

        let resp: RefreshResponse =
            serde_json::from_str(r#"{"accessToken":"a2","refreshToken":"r2"}"#).unwrap();
        assert_eq!(resp.refresh_token.as_deref(), Some("r2"));
    }
}
