use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// HTTP capability the API layer depends on: issue a GET or POST against an
/// absolute URL and get parsed JSON back, or an error carrying the
/// server-provided message for non-2xx responses.
///
/// Commands and the OData/CSOM helpers only ever see this trait; the reqwest
/// implementation lives in [`super::client::HttpClient`] and tests substitute
/// an in-memory stub.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<Value>;

    /// Issues a POST. `headers` are applied on top of the defaults,
    /// `body` is sent verbatim when present.
    async fn post(&self, url: &str, headers: &[(&str, &str)], body: Option<String>)
        -> Result<Value>;
}
