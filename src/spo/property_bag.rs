//! Property bag normalization.
//!
//! CSOM returns property bag entries with a type suffix embedded in the key,
//! e.g. `vti_level$  Int32` for `vti_level`. Keys and values have to be
//! normalized before they can be compared or displayed.

use serde_json::Value;

/// A property bag entry with the type decoration removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub key: String,
    pub value: String,
}

/// Strips the decoration from one raw entry: the clean key is everything
/// before the first `$`, the value its trimmed plain-string form.
pub fn format_property(raw_key: &str, raw_value: &Value) -> Property {
    let key = raw_key
        .split('$')
        .next()
        .unwrap_or(raw_key)
        .to_string();

    let value = match raw_value {
        Value::String(text) => text.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    };

    Property { key, value }
}

/// Finds the entry whose normalized key equals `key` (case-sensitive).
/// Returns `None` both for a missing key and for a payload that is not a
/// flat object; neither is an error.
pub fn filter_by_key(property_bag: &Value, key: &str) -> Option<Property> {
    let entries = property_bag.as_object()?;

    for (raw_key, raw_value) in entries {
        let property = format_property(raw_key, raw_value);
        if property.key == key {
            return Some(property);
        }
    }

    None
}
