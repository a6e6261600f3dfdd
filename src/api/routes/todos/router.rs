//! Router for the todos API

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_extra::extract::Query;
use serde_json::{Value, json};

use super::db as todos_db;
use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::api::utils::require_user;
use crate::calendar::schedule::parse_smart_schedule;

type SharedState = Arc<RwLock<AppState>>;

/// Editable todo ids are prefixed so provider-derived (read-only) ids
/// can never reach the store by accident.
fn parse_todo_id(raw: &str) -> Option<&str> {
    let id = raw.strip_prefix("task-")?;
    (!id.is_empty()).then_some(id)
}

async fn list_todos(
    State(state): State<SharedState>,
    Query(params): Query<public::TodosQuery>,
) -> Result<Json<Vec<public::Todo>>, ApiError> {
    let db = state.read().unwrap().db.clone();
    let email = require_user(&db, params.email.as_deref()).await?;

    let todos = todos_db::list_open_todos(&db, email).await?;
    Ok(Json(todos))
}

async fn create_todo(
    State(state): State<SharedState>,
    Json(body): Json<public::CreateTodoRequest>,
) -> Result<(StatusCode, Json<public::Todo>), ApiError> {
    let db = state.read().unwrap().db.clone();
    let email = require_user(&db, body.email.as_deref()).await?;

    let text = body
        .text
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ApiError::BadRequest("text is required".to_string()))?;
    let list_id = body
        .list_id
        .as_deref()
        .map(str::trim)
        .and_then(|raw| raw.strip_prefix("local-"))
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            ApiError::BadRequest("listId is required and must reference a local list".to_string())
        })?;

    if !todos_db::list_exists(&db, email.clone(), list_id.to_string()).await? {
        return Err(ApiError::NotFound("List not found".to_string()));
    }

    let parsed = parse_smart_schedule(text, chrono::Local::now().naive_local());
    let todo = todos_db::insert_todo(
        &db,
        todos_db::NewTodo {
            id: uuid::Uuid::new_v4().to_string(),
            user_email: email,
            list_id: list_id.to_string(),
            text: parsed.text,
            due_at: parsed.due_at,
            schedule_token: parsed.schedule_token,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(state): State<SharedState>,
    Path(todo_id): Path<String>,
    Json(body): Json<public::UpdateTodoRequest>,
) -> Result<Json<Value>, ApiError> {
    let db = state.read().unwrap().db.clone();
    let email = require_user(&db, body.email.as_deref()).await?;

    let todo_id = parse_todo_id(&todo_id)
        .ok_or_else(|| ApiError::BadRequest("Invalid todo id".to_string()))?
        .to_string();

    let text = body
        .text
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| {
            let parsed = parse_smart_schedule(text, chrono::Local::now().naive_local());
            (parsed.text, parsed.due_at, parsed.schedule_token)
        });

    let found = todos_db::update_todo(
        &db,
        email,
        todo_id,
        todos_db::TodoPatch {
            completed: body.completed,
            text,
        },
    )
    .await?;

    if !found {
        return Err(ApiError::NotFound("Todo not found".to_string()));
    }
    Ok(Json(json!({ "ok": true })))
}

async fn delete_todo(
    State(state): State<SharedState>,
    Path(todo_id): Path<String>,
    Query(params): Query<public::TodosQuery>,
) -> Result<Json<Value>, ApiError> {
    let db = state.read().unwrap().db.clone();
    let email = require_user(&db, params.email.as_deref()).await?;

    let todo_id = parse_todo_id(&todo_id)
        .ok_or_else(|| ApiError::BadRequest("Invalid todo id".to_string()))?
        .to_string();

    if !todos_db::delete_todo(&db, email, todo_id).await? {
        return Err(ApiError::NotFound("Todo not found".to_string()));
    }
    Ok(Json(json!({ "ok": true })))
}

/// Create the todos router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", axum::routing::get(list_todos).post(create_todo))
        .route(
            "/{id}",
            axum::routing::patch(update_todo).delete(delete_todo),
        )
}
