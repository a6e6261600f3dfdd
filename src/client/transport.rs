//! Transport boundary between the week-view store and the HTTP surface.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::calendar::models::{CalendarEvent, Todo, TodoList, WeekCalendarPayload};
use crate::google::gcal::RecurrencePreset;

/// Fields of an event create/edit as entered in the editor.
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub title: String,
    pub start: DateTime<Utc>,
    pub duration_minutes: i64,
    pub recurrence: RecurrencePreset,
    pub color_id: Option<String>,
}

#[async_trait]
pub trait CalendarApi: Send + Sync {
    async fn fetch_week(&self, anchor: DateTime<Utc>) -> Result<WeekCalendarPayload>;

    async fn create_list(&self, name: &str, color: &str) -> Result<TodoList>;
    async fn update_list(
        &self,
        list_id: &str,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<()>;
    async fn delete_list(&self, list_id: &str) -> Result<()>;

    async fn create_todo(&self, text: &str, list_id: &str) -> Result<Todo>;
    async fn update_todo(
        &self,
        todo_id: &str,
        completed: Option<bool>,
        text: Option<&str>,
    ) -> Result<()>;
    async fn delete_todo(&self, todo_id: &str) -> Result<()>;

    async fn create_event(&self, calendar_id: &str, draft: &EventDraft) -> Result<CalendarEvent>;
    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        draft: &EventDraft,
    ) -> Result<CalendarEvent>;
    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<()>;

    /// Customize a provider calendar (rename/recolor its module and the
    /// mirrored to-do list).
    async fn upsert_override(
        &self,
        calendar_id: &str,
        display_name: Option<&str>,
        color: Option<&str>,
    ) -> Result<()>;
}
