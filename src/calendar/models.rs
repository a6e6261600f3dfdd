//! Data model shared by the aggregator, the HTTP surface, and the
//! client-side store.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Fallback palette for calendars with no provider or override color.
pub const MODULE_COLORS: [&str; 6] = [
    "#E8A0A0", "#A0C4BC", "#B8A0D4", "#A8C4A0", "#D4B896", "#A0B8D4",
];

/// A display-ready calendar after user overrides are applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// A timed occurrence on the week grid. The id is composite
/// (`{module_id}:{provider_event_id}`) so edits can be routed back to
/// the right provider calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub module_id: String,
    pub day_offset: u32,
    pub start_hour: u32,
    pub start_minute: u32,
    pub end_hour: u32,
    pub end_minute: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl CalendarEvent {
    pub fn start_minutes(&self) -> u32 {
        self.start_hour * 60 + self.start_minute
    }

    pub fn end_minutes(&self) -> u32 {
        self.end_hour * 60 + self.end_minute
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoList {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
}

/// Where a todo came from. Google-sourced todos mirror all-day provider
/// events; they are synthesized on every fetch and never written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoSource {
    Local,
    Google,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub text: String,
    pub list_id: String,
    pub completed: bool,
    pub due_at: Option<NaiveDateTime>,
    pub schedule_token: Option<String>,
    pub source: TodoSource,
}

/// The aggregate week-view transfer object. Computed fresh per request,
/// never cached server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekCalendarPayload {
    pub modules: Vec<Module>,
    pub events: Vec<CalendarEvent>,
    pub todo_lists: Vec<TodoList>,
    pub todos: Vec<Todo>,
}

/// A user's stored customization of one provider calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarOverride {
    pub calendar_id: String,
    pub display_name: Option<String>,
    pub color: Option<String>,
    pub sort_order: i64,
    pub hidden: bool,
    pub pinned: bool,
}

pub fn compose_event_id(module_id: &str, event_id: &str) -> String {
    format!("{module_id}:{event_id}")
}

/// Split a composite event id back into `(calendar_id, event_id)`.
/// Returns `None` for ids without a separator or with an empty half;
/// callers must reject those before issuing any network call.
pub fn parse_event_id(composite: &str) -> Option<(&str, &str)> {
    let (module_id, event_id) = composite.split_once(':')?;
    if module_id.is_empty() || event_id.is_empty() {
        return None;
    }
    Some((module_id, event_id))
}

/// Deterministic fallback color for a calendar id. Same rolling hash as
/// the web client used, so a calendar keeps its color across runs.
pub fn fallback_color(id: &str) -> &'static str {
    let mut hash: i32 = 0;
    for unit in id.encode_utf16() {
        hash = hash.wrapping_mul(31).wrapping_add(unit as i32);
    }
    MODULE_COLORS[hash.unsigned_abs() as usize % MODULE_COLORS.len()]
}
