//! Tenant settings normalization.
//!
//! The Tenant CSOM object reports several settings as integer codes. The
//! tables below map them to the labels the admin center shows, so the
//! operator does not have to know that `SharingCapability: 1` means
//! external-user sharing.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::Value;

const SHARING_CAPABILITY: &[&str] = &[
    "Disabled",
    "ExternalUserSharingOnly",
    "ExternalUserAndGuestSharing",
    "ExistingExternalUserSharingOnly",
];
const SHARING_DOMAIN_RESTRICTION_MODE: &[&str] = &["None", "AllowList", "BlockList"];
const SHARING_STATE: &[&str] = &["Unspecified", "On", "Off"];
const SHARING_LINK_TYPE: &[&str] = &["None", "Direct", "Internal", "AnonymousAccess"];
const ANONYMOUS_LINK_TYPE: &[&str] = &["None", "View", "Edit"];
const LINK_PERMISSION: &[&str] = &["None", "View", "Edit"];
const CONDITIONAL_ACCESS_POLICY: &[&str] =
    &["AllowFullAccess", "AllowLimitedAccess", "BlockAccess"];
const SPECIAL_CHARACTERS_STATE: &[&str] = &["NoPreference", "Allowed", "Disallowed", "Unsupported"];
const LIMITED_ACCESS_FILE_TYPE: &[&str] =
    &["OfficeOnlineFilesOnly", "WebPreviewableFiles", "OtherFiles"];

/// Enumerated fields and their code-indexed labels.
static ENUM_LABELS: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut labels: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
    labels.insert("SharingCapability", SHARING_CAPABILITY);
    labels.insert("SharingDomainRestrictionMode", SHARING_DOMAIN_RESTRICTION_MODE);
    labels.insert("ODBMembersCanShare", SHARING_STATE);
    labels.insert("ODBAccessRequests", SHARING_STATE);
    labels.insert("DefaultSharingLinkType", SHARING_LINK_TYPE);
    labels.insert("FileAnonymousLinkType", ANONYMOUS_LINK_TYPE);
    labels.insert("FolderAnonymousLinkType", ANONYMOUS_LINK_TYPE);
    labels.insert("DefaultLinkPermission", LINK_PERMISSION);
    labels.insert("ConditionalAccessPolicy", CONDITIONAL_ACCESS_POLICY);
    labels.insert(
        "SpecialCharactersStateInFileFolderNames",
        SPECIAL_CHARACTERS_STATE,
    );
    labels.insert("LimitedAccessFileType", LIMITED_ACCESS_FILE_TYPE);
    labels
});

/// CSOM bookkeeping fields that carry no meaning for the operator.
const BOOKKEEPING_FIELDS: &[&str] = &["_ObjectType_", "_ObjectIdentity_"];

/// Returns a copy of the raw tenant object with bookkeeping fields removed
/// and known enumerated codes replaced by their labels.
///
/// A code with no table entry, and any field not listed in the tables, pass
/// through unchanged; server-added enum values must not fail the command.
/// Values that are already labels are left alone, so decoding an
/// already-decoded object is a no-op.
pub fn decode(settings: &Value) -> Value {
    let Some(raw) = settings.as_object() else {
        return settings.clone();
    };

    let mut decoded = serde_json::Map::with_capacity(raw.len());
    for (field, value) in raw {
        if BOOKKEEPING_FIELDS.contains(&field.as_str()) {
            continue;
        }

        let value = match (ENUM_LABELS.get(field.as_str()), value.as_u64()) {
            (Some(labels), Some(code)) if (code as usize) < labels.len() => {
                Value::String(labels[code as usize].to_string())
            }
            _ => value.clone(),
        };
        decoded.insert(field.clone(), value);
    }

    Value::Object(decoded)
}
