//! OData collection retrieval.
//!
//! Graph and SharePoint REST collections come back one page at a time, each
//! page carrying a `value` array and, while more pages exist, a nextLink URL
//! to follow verbatim.

use std::collections::HashSet;

use anyhow::{bail, Result};
use log::debug;
use serde_json::Value;

use super::transport::Transport;

/// Retrieves all items from the collection at `url`, following the
/// server-supplied nextLink until exhausted. Records are returned in page
/// order.
///
/// Any page failure aborts the whole retrieval: results accumulated so far
/// are discarded rather than returned, so a listing is either complete or an
/// error, never silently truncated.
pub async fn get_all_items(transport: &dyn Transport, url: &str) -> Result<Vec<Value>> {
    let mut items: Vec<Value> = Vec::new();
    let mut followed: HashSet<String> = HashSet::new();
    let mut next_url = url.to_string();
    followed.insert(next_url.clone());

    loop {
        let response = transport.get(&next_url).await?;

        match response.get("value") {
            Some(Value::Array(records)) => {
                debug!("Retrieved {} records from {}", records.len(), next_url);
                items.extend(records.iter().cloned());
            }
            _ => bail!("Expected a 'value' array in the response from {}", next_url),
        }

        match next_link(&response) {
            Some(link) => {
                // The endpoint is not guaranteed well-behaved; a link we
                // already followed would otherwise loop forever.
                if !followed.insert(link.to_string()) {
                    bail!("The endpoint returned a repeating nextLink: {}", link);
                }
                next_url = link.to_string();
            }
            None => break,
        }
    }

    Ok(items)
}

fn next_link(response: &Value) -> Option<&str> {
    response
        .get("@odata.nextLink")
        .or_else(|| response.get("odata.nextLink"))
        .and_then(Value::as_str)
}

/// Escapes a value for embedding in a quoted OData `$filter` literal:
/// single quotes are doubled, the rest percent-encoded.
pub fn encode_filter_value(value: &str) -> String {
    urlencoding::encode(&value.replace('\'', "''")).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::StubTransport;
    use serde_json::json;

    #[test]
    fn encodes_filter_values() {
        assert_eq!(encode_filter_value("Sales Team"), "Sales%20Team");
        assert_eq!(encode_filter_value("O'Brien"), "O%27%27Brien");
    }

    #[tokio::test]
    async fn returns_single_page() {
        let transport = StubTransport::new().on_get(
            "https://graph.microsoft.com/v1.0/users",
            json!({ "value": [{ "id": "1" }, { "id": "2" }] }),
        );

        let items = get_all_items(&transport, "https://graph.microsoft.com/v1.0/users")
            .await
            .unwrap();

        assert_eq!(items, vec![json!({ "id": "1" }), json!({ "id": "2" })]);
    }

    #[tokio::test]
    async fn concatenates_pages_in_order() {
        let transport = StubTransport::new()
            .on_get(
                "https://graph.microsoft.com/v1.0/users",
                json!({
                    "value": [{ "id": "1" }],
                    "@odata.nextLink": "https://graph.microsoft.com/v1.0/users?$skiptoken=a"
                }),
            )
            .on_get(
                "https://graph.microsoft.com/v1.0/users?$skiptoken=a",
                json!({
                    "value": [{ "id": "2" }, { "id": "3" }],
                    "@odata.nextLink": "https://graph.microsoft.com/v1.0/users?$skiptoken=b"
                }),
            )
            .on_get(
                "https://graph.microsoft.com/v1.0/users?$skiptoken=b",
                json!({ "value": [{ "id": "4" }] }),
            );

        let items = get_all_items(&transport, "https://graph.microsoft.com/v1.0/users")
            .await
            .unwrap();

        let ids: Vec<&str> = items.iter().map(|i| i["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }

    #[tokio::test]
    async fn follows_legacy_next_link_field() {
        let transport = StubTransport::new()
            .on_get(
                "https://contoso.sharepoint.com/_api/web/lists",
                json!({
                    "value": [{ "Title": "a" }],
                    "odata.nextLink": "https://contoso.sharepoint.com/_api/web/lists?$skiptoken=1"
                }),
            )
            .on_get(
                "https://contoso.sharepoint.com/_api/web/lists?$skiptoken=1",
                json!({ "value": [{ "Title": "b" }] }),
            );

        let items = get_all_items(&transport, "https://contoso.sharepoint.com/_api/web/lists")
            .await
            .unwrap();
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn page_error_discards_partial_results() {
        let transport = StubTransport::new()
            .on_get(
                "https://graph.microsoft.com/v1.0/users",
                json!({
                    "value": [{ "id": "1" }],
                    "@odata.nextLink": "https://graph.microsoft.com/v1.0/users?$skiptoken=a"
                }),
            )
            .on_get_error(
                "https://graph.microsoft.com/v1.0/users?$skiptoken=a",
                "An error has occurred",
            );

        let result = get_all_items(&transport, "https://graph.microsoft.com/v1.0/users").await;

        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "An error has occurred");
    }

    #[tokio::test]
    async fn repeating_next_link_aborts() {
        let transport = StubTransport::new()
            .on_get(
                "https://graph.microsoft.com/v1.0/users",
                json!({
                    "value": [{ "id": "1" }],
                    "@odata.nextLink": "https://graph.microsoft.com/v1.0/users?$skiptoken=a"
                }),
            )
            .on_get(
                "https://graph.microsoft.com/v1.0/users?$skiptoken=a",
                json!({
                    "value": [{ "id": "2" }],
                    // misbehaving endpoint hands back the first page again
                    "@odata.nextLink": "https://graph.microsoft.com/v1.0/users"
                }),
            );

        let err = get_all_items(&transport, "https://graph.microsoft.com/v1.0/users")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("repeating nextLink"));
    }

    #[tokio::test]
    async fn missing_value_array_is_an_error() {
        let transport = StubTransport::new()
            .on_get("https://graph.microsoft.com/v1.0/users", json!({ "id": "1" }));

        let err = get_all_items(&transport, "https://graph.microsoft.com/v1.0/users")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("'value' array"));
    }

    #[tokio::test]
    async fn empty_collection_is_not_an_error() {
        let transport = StubTransport::new()
            .on_get("https://graph.microsoft.com/v1.0/users", json!({ "value": [] }));

        let items = get_all_items(&transport, "https://graph.microsoft.com/v1.0/users")
            .await
            .unwrap();
        assert!(items.is_empty());
    }
}
