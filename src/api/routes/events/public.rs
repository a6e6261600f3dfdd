//! Public API types for the provider event routes

use serde::Deserialize;

use crate::google::gcal::RecurrencePreset;

pub use crate::calendar::models::CalendarEvent;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventWriteRequest {
    pub email: Option<String>,
    pub calendar_id: Option<String>,
    /// Required for updates, ignored on create.
    pub event_id: Option<String>,
    pub title: Option<String>,
    /// RFC 3339 start instant.
    pub start: Option<String>,
    pub duration_minutes: Option<i64>,
    pub time_zone: Option<String>,
    #[serde(default)]
    pub recurrence: RecurrencePreset,
    pub color_id: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDeleteRequest {
    pub email: Option<String>,
    pub calendar_id: Option<String>,
    pub event_id: Option<String>,
}
