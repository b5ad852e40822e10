//! Bearer credentials for Microsoft Graph.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::StoreError;

const LOGIN_BASE_URL: &str = "https://login.microsoftonline.com";
const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, StoreError>;
}

/// A Graph access token is a JWT: exactly three dot-separated segments.
pub fn is_valid_jwt(token: &str) -> bool {
    !token.is_empty() && token.split('.').count() == 3
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// OAuth2 client-credentials grant against the tenant's token endpoint.
pub struct ClientCredentialsProvider {
    http: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl ClientCredentialsProvider {
    pub fn new(http: Client, tenant_id: &str, client_id: String, client_secret: String) -> Self {
        Self {
            http,
            token_url: format!("{LOGIN_BASE_URL}/{tenant_id}/oauth2/v2.0/token"),
            client_id,
            client_secret,
        }
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsProvider {
    async fn access_token(&self) -> Result<String, StoreError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", GRAPH_SCOPE),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(StoreError::Token(format!("status {status}: {detail}")));
        }

        let token: TokenResponse = response.json().await?;
        debug!("Acquired Graph access token");
        Ok(token.access_token)
    }
}
