//! Option validation helpers shared by the command handlers.

use once_cell::sync::Lazy;
use regex::Regex;

static GUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-(?:[0-9a-fA-F]{4}-){3}[0-9a-fA-F]{12}$")
        .expect("valid GUID pattern")
});

static TEAMS_CHANNEL_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^19:[0-9a-zA-Z_-]+@thread\.(?:skype|tacv2)$")
        .expect("valid channel id pattern")
});

pub fn is_valid_guid(value: &str) -> bool {
    GUID.is_match(value)
}

pub fn is_valid_teams_channel_id(value: &str) -> bool {
    TEAMS_CHANNEL_ID.is_match(value)
}

pub fn is_valid_sharepoint_url(value: &str) -> bool {
    value.starts_with("https://") && reqwest::Url::parse(value).is_ok()
}
