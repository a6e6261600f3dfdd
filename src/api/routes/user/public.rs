//! Public API types for the user preferences/settings routes

use serde::{Deserialize, Serialize};

pub use crate::calendar::models::CalendarOverride;

#[derive(Debug, Deserialize)]
pub struct SettingsQuery {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesRequest {
    pub email: Option<String>,
    pub calendar_id: Option<String>,
    pub display_name: Option<String>,
    pub color: Option<String>,
    pub sort_order: Option<i64>,
    pub hidden: Option<bool>,
    pub pinned: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRequest {
    pub email: Option<String>,
    pub week_starts_on: Option<i64>,
    pub sidebar_open: Option<bool>,
    pub theme: Option<String>,
    pub timezone: Option<String>,
    pub default_event_duration: Option<i64>,
}

/// Per-user UI settings, returned whole on every read/write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub week_starts_on: i64,
    pub sidebar_open: bool,
    pub theme: String,
    pub timezone: String,
    pub default_event_duration: i64,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            week_starts_on: 1,
            sidebar_open: true,
            theme: "system".to_string(),
            timezone: "UTC".to_string(),
            default_event_duration: 30,
        }
    }
}
