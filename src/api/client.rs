use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use serde_json::Value;

use super::error::extract_error_message;
use super::transport::Transport;

/// Microsoft 365 REST client with connection pooling.
///
/// Carries the bearer token for exactly one resource (Graph, or one
/// SharePoint host); commands construct a fresh client per invocation from
/// their [`crate::auth::CommandContext`].
#[derive(Clone)]
pub struct HttpClient {
    http_client: reqwest::Client,
    access_token: String,
}

impl HttpClient {
    pub fn new(access_token: String) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("m365-cli/0.1")
            .build()?;

        Ok(Self {
            http_client,
            access_token,
        })
    }

    /// Create a client around a preconfigured reqwest client.
    pub fn with_custom_client(access_token: String, http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            access_token,
        }
    }

    async fn handle_response(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            anyhow::bail!("{}", extract_error_message(&text));
        }

        if text.is_empty() {
            // 204 No Content and friends
            return Ok(Value::Null);
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(json) => Ok(json),
            Err(_) => Ok(Value::String(text)),
        }
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn get(&self, url: &str) -> Result<Value> {
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.access_token)
            .header("Accept", "application/json;odata.metadata=none")
            .send()
            .await?;

        debug!("GET {} -> {}", url, response.status());
        Self::handle_response(response).await
    }

    async fn post(&self, url: &str, headers: &[(&str, &str)], body: Option<String>) -> Result<Value> {
        debug!("POST {}", url);

        let mut request = self
            .http_client
            .post(url)
            .bearer_auth(&self.access_token)
            .header("Accept", "application/json;odata=nometadata");

        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        debug!("POST {} -> {}", url, response.status());
        Self::handle_response(response).await
    }
}
