mod client;

pub use client::AuthClient;

use anyhow::{anyhow, Context, Result};

pub const GRAPH_RESOURCE: &str = "https://graph.microsoft.com";

/// App credentials for the tenant, read from the environment (with `.env`
/// support).
pub struct AuthConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Ok(Self {
            tenant_id: std::env::var("M365_TENANT_ID").context("M365_TENANT_ID is not set")?,
            client_id: std::env::var("M365_CLIENT_ID").context("M365_CLIENT_ID is not set")?,
            client_secret: std::env::var("M365_CLIENT_SECRET")
                .context("M365_CLIENT_SECRET is not set")?,
        })
    }
}

/// Everything a single command invocation needs to talk to one resource:
/// the resource root URL and an opaque bearer token for it. Constructed
/// fresh per invocation; nothing here is shared or mutated across commands.
pub struct CommandContext {
    pub resource: String,
    pub access_token: String,
}

impl CommandContext {
    pub async fn for_resource(config: &AuthConfig, resource: &str) -> Result<Self> {
        let resource = resource.trim_end_matches('/').to_string();
        let access_token = AuthClient::new(&config.tenant_id)
            .acquire_token(&resource, &config.client_id, &config.client_secret)
            .await?;

        Ok(Self {
            resource,
            access_token,
        })
    }

    /// Context for Microsoft Graph.
    pub async fn graph(config: &AuthConfig) -> Result<Self> {
        Self::for_resource(config, GRAPH_RESOURCE).await
    }

    /// Context for the SharePoint host that `url` lives on.
    pub async fn for_url(config: &AuthConfig, url: &str) -> Result<Self> {
        Self::for_resource(config, &resource_from_url(url)?).await
    }
}

/// The OAuth resource for a site URL is its origin, e.g.
/// `https://contoso.sharepoint.com` for any site under that host.
pub fn resource_from_url(url: &str) -> Result<String> {
    let parsed =
        reqwest::Url::parse(url).with_context(|| format!("{} is not a valid URL", url))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("{} does not contain a host", url))?;
    Ok(format!("{}://{}", parsed.scheme(), host))
}
