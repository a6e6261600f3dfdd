//! API routes module

pub mod calendar;
pub mod events;
pub mod todo_lists;
pub mod todos;
pub mod user;

use std::sync::{Arc, RwLock};

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<RwLock<AppState>>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Week payload
        .nest("/calendar", calendar::router())
        // Merged calendar list
        .nest("/calendars", calendar::calendars_router())
        // Provider event CRUD
        .nest("/events", events::router())
        // Local to-do lists
        .nest("/todo-lists", todo_lists::router())
        // Local todos
        .nest("/todos", todos::router())
        // Per-user overrides and settings
        .nest("/user", user::router())
}
