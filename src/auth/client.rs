use anyhow::{anyhow, Result};
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::api::error::extract_error_message;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Acquires app-only access tokens from Azure AD using the
/// client-credentials grant. One instance per tenant; tokens are requested
/// per resource through the `{resource}/.default` scope.
pub struct AuthClient {
    client: Client,
    token_url: String,
}

impl AuthClient {
    pub fn new(tenant_id: &str) -> Self {
        Self {
            client: Client::new(),
            token_url: format!(
                "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
                tenant_id
            ),
        }
    }

    pub async fn acquire_token(
        &self,
        resource: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<String> {
        debug!(
            "Requesting access token for {} with client_id {}",
            resource, client_id
        );

        let scope = format!("{}/.default", resource.trim_end_matches('/'));
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("scope", &scope),
            ])
            .send()
            .await?;

        debug!("Token request status: {}", response.status());

        if response.status().is_success() {
            let token_data: TokenResponse = response.json().await?;
            token_data
                .access_token
                .ok_or_else(|| anyhow!("Token response did not contain an access token"))
        } else {
            let error_text = response.text().await?;
            anyhow::bail!("Token request failed: {}", extract_error_message(&error_text));
        }
    }
}
