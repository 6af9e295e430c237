use serde_json::Value;

/// Extracts the human-readable message from a service error body.
///
/// Graph wraps errors as `{"error": {"message": "..."}}`, SharePoint REST as
/// `{"odata.error": {"message": {"value": "..."}}}`. Trace and correlation
/// metadata in the envelope is deliberately discarded. Anything that is not
/// a recognized envelope is surfaced as-is.
pub fn extract_error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(message) = json.pointer("/error/message").and_then(Value::as_str) {
            return message.to_string();
        }

        if let Some(message) = json
            .pointer("/odata.error/message/value")
            .and_then(Value::as_str)
        {
            return message.to_string();
        }

        // Token endpoint errors carry a plain description field
        if let Some(message) = json.get("error_description").and_then(Value::as_str) {
            return message.to_string();
        }
    }

    if body.is_empty() {
        "Unknown error".to_string()
    } else {
        body.to_string()
    }
}
