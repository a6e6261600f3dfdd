//! Glue between the week store and the transport: applies each mutation
//! locally first, issues the request, and reconciles per the mutation's
//! policy. Creations roll back on failure; toggles and deletes are
//! deliberately fire-and-forget — the optimistic state stands even if
//! the request fails.

use anyhow::{Result, bail};
use chrono::{DateTime, Duration, Timelike, Utc};

use crate::calendar::models::{CalendarEvent, TodoSource, parse_event_id};
use crate::calendar::week::week_start_of;
use crate::client::store::{MutationPolicy, WeekStore};
use crate::client::transport::{CalendarApi, EventDraft};

pub struct WeekController<A: CalendarApi> {
    api: A,
    store: WeekStore,
}

impl<A: CalendarApi> WeekController<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            store: WeekStore::new(),
        }
    }

    pub fn store(&self) -> &WeekStore {
        &self.store
    }

    /// Load the week containing `anchor`. The newest request wins: if a
    /// later load supersedes this one before it resolves, its result is
    /// discarded by the store. Returns whether this result was applied.
    pub async fn load_week(&mut self, anchor: DateTime<Utc>) -> bool {
        let ticket = self.store.begin_load();
        let result = self
            .api
            .fetch_week(anchor)
            .await
            .map_err(|err| err.to_string());
        self.store.finish_load(ticket, result)
    }

    // Lists

    pub async fn add_list(&mut self, name: &str, color: &str) -> Result<()> {
        let placeholder = self.store.stage_list(name, color);
        match self.api.create_list(name, color).await {
            Ok(list) => {
                self.store.confirm_list(&placeholder, list);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(policy = ?MutationPolicy::OptimisticCreate, %err, "list creation failed, rolling back");
                self.store.reject_list(&placeholder);
                Err(err)
            }
        }
    }

    pub async fn rename_list(&mut self, list_id: &str, name: &str) -> Result<()> {
        self.store.rename_list(list_id, name);
        self.push_list_customization(list_id, Some(name), None).await
    }

    pub async fn recolor_list(&mut self, list_id: &str, color: &str) -> Result<()> {
        self.store.recolor_list(list_id, color);
        self.push_list_customization(list_id, None, Some(color)).await
    }

    /// Route a list customization: mirrored lists persist as calendar
    /// overrides, local lists patch their own record. Failures leave the
    /// optimistic state standing.
    async fn push_list_customization(
        &mut self,
        list_id: &str,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<()> {
        let result = if let Some(module_id) = list_id.strip_prefix("list-") {
            self.api.upsert_override(module_id, name, color).await
        } else {
            self.api.update_list(list_id, name, color).await
        };
        if let Err(err) = result {
            tracing::warn!(policy = ?MutationPolicy::FireAndForgetToggle, %err, "list customization not persisted");
        }
        Ok(())
    }

    pub async fn delete_list(&mut self, list_id: &str) -> Result<()> {
        let deletable = list_id.starts_with("local-");
        self.store.remove_list(list_id);
        if deletable
            && let Err(err) = self.api.delete_list(list_id).await
        {
            tracing::warn!(policy = ?MutationPolicy::FireAndForgetDelete, %err, "list deletion not persisted");
        }
        Ok(())
    }

    // Todos

    pub async fn add_todo(&mut self, text: &str, list_id: &str) -> Result<()> {
        let placeholder = self.store.stage_todo(text, list_id);
        match self.api.create_todo(text, list_id).await {
            Ok(todo) => {
                self.store.confirm_todo(&placeholder, todo);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(policy = ?MutationPolicy::OptimisticCreate, %err, "todo creation failed, rolling back");
                self.store.reject_todo(&placeholder);
                Err(err)
            }
        }
    }

    pub async fn toggle_todo(&mut self, todo_id: &str) -> Result<()> {
        let Some((source, completed)) = self.store.toggle_todo(todo_id) else {
            return Ok(());
        };
        // Provider-derived todos are read-only mirrors; the flip is
        // local-only and resets on the next fetch.
        if source == TodoSource::Local
            && let Err(err) = self.api.update_todo(todo_id, Some(completed), None).await
        {
            tracing::warn!(policy = ?MutationPolicy::FireAndForgetToggle, %err, "todo toggle not persisted");
        }
        Ok(())
    }

    pub async fn delete_todo(&mut self, todo_id: &str) -> Result<()> {
        let Some(source) = self.store.remove_todo(todo_id) else {
            return Ok(());
        };
        if source == TodoSource::Local
            && let Err(err) = self.api.delete_todo(todo_id).await
        {
            tracing::warn!(policy = ?MutationPolicy::FireAndForgetDelete, %err, "todo deletion not persisted");
        }
        Ok(())
    }

    // Provider events

    pub async fn add_event(&mut self, calendar_id: &str, draft: &EventDraft) -> Result<()> {
        let optimistic = event_from_draft(calendar_id, draft);
        let placeholder = self.store.stage_event(optimistic);
        match self.api.create_event(calendar_id, draft).await {
            Ok(event) => {
                self.store.confirm_event(&placeholder, event);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(policy = ?MutationPolicy::OptimisticCreate, %err, "event creation failed, rolling back");
                self.store.reject_event(&placeholder);
                Err(err)
            }
        }
    }

    /// Edit a provider event. The composite id is parsed and validated
    /// before the optimistic apply and before any network call; a failed
    /// request leaves the optimistic edit in place.
    pub async fn edit_event(&mut self, composite_id: &str, draft: &EventDraft) -> Result<()> {
        let Some((calendar_id, event_id)) = parse_event_id(composite_id) else {
            bail!("malformed event id: {composite_id}");
        };
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();

        let mut optimistic = event_from_draft(&calendar_id, draft);
        optimistic.id = composite_id.to_string();
        self.store.replace_event(composite_id, optimistic);

        match self.api.update_event(&calendar_id, &event_id, draft).await {
            Ok(event) => {
                self.store.replace_event(composite_id, event);
            }
            Err(err) => {
                tracing::warn!(%err, "event update not persisted, keeping optimistic edit");
            }
        }
        Ok(())
    }

    pub async fn delete_event(&mut self, composite_id: &str) -> Result<()> {
        let Some((calendar_id, event_id)) = parse_event_id(composite_id) else {
            bail!("malformed event id: {composite_id}");
        };
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();

        self.store.remove_event(composite_id);
        if let Err(err) = self.api.delete_event(&calendar_id, &event_id).await {
            tracing::warn!(policy = ?MutationPolicy::FireAndForgetDelete, %err, "event deletion not persisted");
        }
        Ok(())
    }
}

/// Project a draft onto the week grid the same way the server does, so
/// the optimistic block lands where the confirmed one will.
fn event_from_draft(calendar_id: &str, draft: &EventDraft) -> CalendarEvent {
    let start = draft.start;
    let end = start + Duration::minutes(draft.duration_minutes);
    let week_start = week_start_of(start.date_naive());
    let day_offset = (start.date_naive() - week_start).num_days() as u32;

    CalendarEvent {
        id: String::new(),
        title: draft.title.clone(),
        module_id: calendar_id.to_string(),
        day_offset,
        start_hour: start.hour(),
        start_minute: start.minute(),
        end_hour: end.hour(),
        end_minute: end.minute(),
        description: None,
        location: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::TimeZone;

    use crate::calendar::models::{Todo, TodoList, WeekCalendarPayload};
    use crate::client::store::WeekPhase;
    use crate::google::gcal::RecurrencePreset;

    /// Records calls and fails on demand.
    #[derive(Default)]
    struct MockApi {
        calls: Mutex<Vec<String>>,
        fail: bool,
    }

    impl MockApi {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: &str) -> Result<()> {
            self.calls.lock().unwrap().push(call.to_string());
            if self.fail {
                bail!("simulated transport failure");
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CalendarApi for MockApi {
        async fn fetch_week(&self, _anchor: DateTime<Utc>) -> Result<WeekCalendarPayload> {
            self.record("fetch_week")?;
            Ok(WeekCalendarPayload::default())
        }

        async fn create_list(&self, name: &str, color: &str) -> Result<TodoList> {
            self.record("create_list")?;
            Ok(TodoList {
                id: "local-server-1".to_string(),
                name: name.to_string(),
                color: color.to_string(),
                module_id: None,
            })
        }

        async fn update_list(
            &self,
            _list_id: &str,
            _name: Option<&str>,
            _color: Option<&str>,
        ) -> Result<()> {
            self.record("update_list")
        }

        async fn delete_list(&self, _list_id: &str) -> Result<()> {
            self.record("delete_list")
        }

        async fn create_todo(&self, text: &str, list_id: &str) -> Result<Todo> {
            self.record("create_todo")?;
            Ok(Todo {
                id: "task-server-1".to_string(),
                text: text.to_string(),
                list_id: list_id.to_string(),
                completed: false,
                due_at: None,
                schedule_token: None,
                source: TodoSource::Local,
            })
        }

        async fn update_todo(
            &self,
            _todo_id: &str,
            _completed: Option<bool>,
            _text: Option<&str>,
        ) -> Result<()> {
            self.record("update_todo")
        }

        async fn delete_todo(&self, _todo_id: &str) -> Result<()> {
            self.record("delete_todo")
        }

        async fn create_event(
            &self,
            calendar_id: &str,
            draft: &EventDraft,
        ) -> Result<CalendarEvent> {
            self.record("create_event")?;
            let mut event = event_from_draft(calendar_id, draft);
            event.id = format!("{calendar_id}:server-event-1");
            Ok(event)
        }

        async fn update_event(
            &self,
            calendar_id: &str,
            event_id: &str,
            draft: &EventDraft,
        ) -> Result<CalendarEvent> {
            self.record("update_event")?;
            let mut event = event_from_draft(calendar_id, draft);
            event.id = format!("{calendar_id}:{event_id}");
            Ok(event)
        }

        async fn delete_event(&self, _calendar_id: &str, _event_id: &str) -> Result<()> {
            self.record("delete_event")
        }

        async fn upsert_override(
            &self,
            _calendar_id: &str,
            _display_name: Option<&str>,
            _color: Option<&str>,
        ) -> Result<()> {
            self.record("upsert_override")
        }
    }

    fn draft() -> EventDraft {
        EventDraft {
            title: "Focus block".to_string(),
            start: Utc.with_ymd_and_hms(2024, 1, 3, 9, 0, 0).unwrap(),
            duration_minutes: 60,
            recurrence: RecurrencePreset::None,
            color_id: None,
        }
    }

    #[tokio::test]
    async fn it_loads_a_week_into_the_ready_phase() {
        let mut controller = WeekController::new(MockApi::default());
        let anchor = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();
        assert!(controller.load_week(anchor).await);
        assert_eq!(*controller.store().phase(), WeekPhase::Ready);
    }

    #[tokio::test]
    async fn it_records_the_error_when_a_load_fails() {
        let mut controller = WeekController::new(MockApi::failing());
        let anchor = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();
        assert!(controller.load_week(anchor).await);
        assert!(matches!(controller.store().phase(), WeekPhase::Error(_)));
    }

    #[tokio::test]
    async fn it_confirms_an_optimistic_todo_with_the_server_entity() {
        let mut controller = WeekController::new(MockApi::default());
        controller.add_todo("buy milk", "local-1").await.unwrap();

        let todos = &controller.store().data().todos;
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].id, "task-server-1");
    }

    #[tokio::test]
    async fn it_rolls_back_a_failed_todo_creation() {
        let mut controller = WeekController::new(MockApi::failing());
        let before = controller.store().data().clone();

        let result = controller.add_todo("buy milk", "local-1").await;
        assert!(result.is_err());
        assert_eq!(*controller.store().data(), before);
    }

    /// Toggle failures intentionally leave the optimistic flip in place.
    #[tokio::test]
    async fn it_keeps_the_optimistic_state_when_a_toggle_fails() {
        let mut controller = WeekController::new(MockApi::failing());
        let placeholder = controller.store.stage_todo("buy milk", "local-1");
        controller
            .store
            .confirm_todo(
                &placeholder,
                Todo {
                    id: "task-1".to_string(),
                    text: "buy milk".to_string(),
                    list_id: "local-1".to_string(),
                    completed: false,
                    due_at: None,
                    schedule_token: None,
                    source: TodoSource::Local,
                },
            );

        controller.toggle_todo("task-1").await.unwrap();
        assert!(controller.store().data().todos[0].completed);
        assert_eq!(controller.api.calls(), vec!["update_todo"]);
    }

    #[tokio::test]
    async fn it_never_calls_the_network_for_provider_derived_todos() {
        let mut controller = WeekController::new(MockApi::default());
        let payload = WeekCalendarPayload {
            todos: vec![Todo {
                id: "todo-cal-1-ev-1".to_string(),
                text: "Pay rent".to_string(),
                list_id: "list-cal-1".to_string(),
                completed: false,
                due_at: None,
                schedule_token: None,
                source: TodoSource::Google,
            }],
            ..WeekCalendarPayload::default()
        };
        let ticket = controller.store.begin_load();
        controller.store.finish_load(ticket, Ok(payload));

        controller.toggle_todo("todo-cal-1-ev-1").await.unwrap();
        controller.delete_todo("todo-cal-1-ev-1").await.unwrap();
        assert!(controller.api.calls().is_empty());
    }

    #[tokio::test]
    async fn it_rejects_malformed_composite_ids_before_any_network_call() {
        let mut controller = WeekController::new(MockApi::default());

        assert!(controller.edit_event("not-composite", &draft()).await.is_err());
        assert!(controller.delete_event("not-composite").await.is_err());
        assert!(controller.api.calls().is_empty());
    }

    #[tokio::test]
    async fn it_keeps_the_optimistic_edit_when_an_event_update_fails() {
        let mut controller = WeekController::new(MockApi::failing());
        let payload = WeekCalendarPayload {
            events: vec![CalendarEvent {
                id: "cal-1:ev-1".to_string(),
                title: "Old title".to_string(),
                module_id: "cal-1".to_string(),
                day_offset: 2,
                start_hour: 9,
                start_minute: 0,
                end_hour: 10,
                end_minute: 0,
                description: None,
                location: None,
            }],
            ..WeekCalendarPayload::default()
        };
        let ticket = controller.store.begin_load();
        controller.store.finish_load(ticket, Ok(payload));

        controller.edit_event("cal-1:ev-1", &draft()).await.unwrap();

        // The edit stuck even though the request failed.
        let event = &controller.store().data().events[0];
        assert_eq!(event.title, "Focus block");
        assert_eq!(controller.api.calls(), vec!["update_event"]);
    }

    #[tokio::test]
    async fn it_replaces_the_event_placeholder_on_successful_create() {
        let mut controller = WeekController::new(MockApi::default());
        controller.add_event("cal-1", &draft()).await.unwrap();

        let events = &controller.store().data().events;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "cal-1:server-event-1");
        assert_eq!(events[0].day_offset, 2);
    }

    #[tokio::test]
    async fn it_routes_mirrored_list_edits_to_calendar_overrides() {
        let mut controller = WeekController::new(MockApi::default());
        controller.rename_list("list-cal-1", "Deep Work").await.unwrap();
        controller.recolor_list("local-9", "#222222").await.unwrap();

        assert_eq!(controller.api.calls(), vec!["upsert_override", "update_list"]);
    }
}
