//! The week-view state container.
//!
//! All week state lives here and every mutation flows through one of the
//! methods below, so optimistic-update and rollback logic stays in one
//! place. Loads are tracked by a generation ticket: a result arriving
//! for a superseded load is discarded outright, never merged.

use crate::calendar::models::{CalendarEvent, Todo, TodoList, TodoSource, WeekCalendarPayload};

/// How a mutation reconciles with the server outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPolicy {
    /// Insert a placeholder immediately; swap in the server entity on
    /// success, remove the placeholder on failure.
    OptimisticCreate,
    /// Apply locally and issue the request; a failure leaves the local
    /// state as applied.
    FireAndForgetToggle,
    /// Remove locally and issue the request; a failure leaves the entity
    /// removed locally.
    FireAndForgetDelete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WeekPhase {
    Idle,
    Loading,
    Ready,
    Error(String),
}

/// Identifies one load request. Only the ticket from the most recent
/// `begin_load` can apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

pub struct WeekStore {
    phase: WeekPhase,
    data: WeekCalendarPayload,
    generation: u64,
    placeholder_seq: u64,
}

impl Default for WeekStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WeekStore {
    pub fn new() -> Self {
        Self {
            phase: WeekPhase::Idle,
            data: WeekCalendarPayload::default(),
            generation: 0,
            placeholder_seq: 0,
        }
    }

    pub fn phase(&self) -> &WeekPhase {
        &self.phase
    }

    pub fn data(&self) -> &WeekCalendarPayload {
        &self.data
    }

    /// True while a load is in flight. The previous week's data stays
    /// visible the whole time (stale-while-revalidate); the UI shows a
    /// syncing indicator on top of it.
    pub fn is_syncing(&self) -> bool {
        self.phase == WeekPhase::Loading
    }

    /// Start a load. Any load started earlier is superseded: its ticket
    /// goes stale and its eventual result will be discarded.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.phase = WeekPhase::Loading;
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Apply a load result. Returns false (and changes nothing) when the
    /// ticket has been superseded by a newer `begin_load`. A failed load
    /// keeps the last good data and records the error.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<WeekCalendarPayload, String>,
    ) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        match result {
            Ok(payload) => {
                self.data = payload;
                self.phase = WeekPhase::Ready;
            }
            Err(message) => {
                self.phase = WeekPhase::Error(message);
            }
        }
        true
    }

    fn next_placeholder(&mut self, kind: &str) -> String {
        self.placeholder_seq += 1;
        format!("pending-{kind}-{}", self.placeholder_seq)
    }

    // Lists

    pub fn stage_list(&mut self, name: &str, color: &str) -> String {
        let id = self.next_placeholder("list");
        self.data.todo_lists.push(TodoList {
            id: id.clone(),
            name: name.to_string(),
            color: color.to_string(),
            module_id: None,
        });
        id
    }

    pub fn confirm_list(&mut self, placeholder_id: &str, confirmed: TodoList) {
        if let Some(list) = self
            .data
            .todo_lists
            .iter_mut()
            .find(|list| list.id == placeholder_id)
        {
            *list = confirmed;
        }
    }

    pub fn reject_list(&mut self, placeholder_id: &str) {
        self.data.todo_lists.retain(|list| list.id != placeholder_id);
    }

    /// Rename a list, and when the list mirrors a calendar module keep
    /// the module in sync so the switcher and sidebar agree.
    pub fn rename_list(&mut self, list_id: &str, name: &str) {
        if let Some(module_key) = self.module_key_for_list(list_id) {
            if let Some(module) = self.data.modules.iter_mut().find(|m| m.id == module_key) {
                module.name = name.to_string();
            }
        }
        if let Some(list) = self.data.todo_lists.iter_mut().find(|l| l.id == list_id) {
            list.name = name.to_string();
        }
    }

    pub fn recolor_list(&mut self, list_id: &str, color: &str) {
        if let Some(module_key) = self.module_key_for_list(list_id) {
            if let Some(module) = self.data.modules.iter_mut().find(|m| m.id == module_key) {
                module.color = color.to_string();
            }
        }
        if let Some(list) = self.data.todo_lists.iter_mut().find(|l| l.id == list_id) {
            list.color = color.to_string();
        }
    }

    /// Remove a list and everything on it.
    pub fn remove_list(&mut self, list_id: &str) {
        self.data.todo_lists.retain(|list| list.id != list_id);
        self.data.todos.retain(|todo| todo.list_id != list_id);
    }

    fn module_key_for_list(&self, list_id: &str) -> Option<String> {
        let list = self.data.todo_lists.iter().find(|l| l.id == list_id)?;
        if let Some(module_id) = &list.module_id {
            return Some(module_id.clone());
        }
        list.id.strip_prefix("list-").map(str::to_string)
    }

    // Todos

    pub fn stage_todo(&mut self, text: &str, list_id: &str) -> String {
        let id = self.next_placeholder("todo");
        self.data.todos.insert(
            0,
            Todo {
                id: id.clone(),
                text: text.to_string(),
                list_id: list_id.to_string(),
                completed: false,
                due_at: None,
                schedule_token: None,
                source: TodoSource::Local,
            },
        );
        id
    }

    pub fn confirm_todo(&mut self, placeholder_id: &str, confirmed: Todo) {
        if let Some(todo) = self
            .data
            .todos
            .iter_mut()
            .find(|todo| todo.id == placeholder_id)
        {
            *todo = confirmed;
        }
    }

    pub fn reject_todo(&mut self, placeholder_id: &str) {
        self.data.todos.retain(|todo| todo.id != placeholder_id);
    }

    /// Flip completion. Returns the todo's source so the caller can
    /// decide whether a network request is warranted at all.
    pub fn toggle_todo(&mut self, todo_id: &str) -> Option<(TodoSource, bool)> {
        let todo = self.data.todos.iter_mut().find(|todo| todo.id == todo_id)?;
        todo.completed = !todo.completed;
        Some((todo.source, todo.completed))
    }

    pub fn remove_todo(&mut self, todo_id: &str) -> Option<TodoSource> {
        let source = self
            .data
            .todos
            .iter()
            .find(|todo| todo.id == todo_id)
            .map(|todo| todo.source)?;
        self.data.todos.retain(|todo| todo.id != todo_id);
        Some(source)
    }

    // Events

    pub fn stage_event(&mut self, mut event: CalendarEvent) -> String {
        let id = self.next_placeholder("event");
        event.id = id.clone();
        self.data.events.push(event);
        id
    }

    pub fn confirm_event(&mut self, placeholder_id: &str, confirmed: CalendarEvent) {
        if let Some(event) = self
            .data
            .events
            .iter_mut()
            .find(|event| event.id == placeholder_id)
        {
            *event = confirmed;
        }
    }

    pub fn reject_event(&mut self, placeholder_id: &str) {
        self.data.events.retain(|event| event.id != placeholder_id);
    }

    pub fn replace_event(&mut self, event_id: &str, updated: CalendarEvent) {
        if let Some(event) = self.data.events.iter_mut().find(|e| e.id == event_id) {
            *event = updated;
        }
    }

    pub fn remove_event(&mut self, event_id: &str) {
        self.data.events.retain(|event| event.id != event_id);
    }
}
