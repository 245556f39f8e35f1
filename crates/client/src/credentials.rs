//! Account credentials
//!
//! The session asks its [`CredentialProvider`] for fresh credentials before
//! every connection attempt, so a provider backed by a token service can
//! refresh between reconnects.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Login material sent in `Hello`
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Credentials {
    pub access_token: String,
    pub client_token: String,
    pub platform_token: String,
    pub client_identification: String,

    /// Character to load; `None` creates a new one
    pub character_id: Option<i32>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("client_token", &"<redacted>")
            .field("character_id", &self.character_id)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Credentials unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn credentials(&self) -> Result<Credentials, CredentialError>;
}

/// Fixed credentials
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    credentials: Credentials,
}

impl StaticCredentials {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn credentials(&self) -> Result<Credentials, CredentialError> {
        Ok(self.credentials.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_credentials() {
        let provider = StaticCredentials::new(Credentials {
            access_token: "token".into(),
            character_id: Some(3),
            ..Credentials::default()
        });
        let credentials = provider.credentials().await.unwrap();
        assert_eq!(credentials.access_token, "token");
        assert_eq!(credentials.character_id, Some(3));
    }

    #[test]
    fn test_debug_hides_tokens() {
        let credentials = Credentials {
            access_token: "secret-token".into(),
            ..Credentials::default()
        };
        assert!(!format!("{credentials:?}").contains("secret-token"));
    }

    #[test]
    fn test_json_shape() {
        let credentials: Credentials =
            serde_json::from_str(r#"{ "accessToken": "a", "characterId": 7 }"#).unwrap();
        assert_eq!(credentials.access_token, "a");
        assert_eq!(credentials.character_id, Some(7));
        assert!(credentials.client_token.is_empty());
    }
}
