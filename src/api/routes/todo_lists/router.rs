//! Router for the to-do lists API

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_extra::extract::Query;
use serde_json::{Value, json};

use super::db as lists_db;
use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::api::utils::require_user;

type SharedState = Arc<RwLock<AppState>>;

const DEFAULT_LIST_COLOR: &str = "#6f8c5c";

fn parse_list_id(raw: &str) -> Option<&str> {
    let id = raw.strip_prefix("local-")?;
    (!id.is_empty()).then_some(id)
}

async fn list_lists(
    State(state): State<SharedState>,
    Query(params): Query<public::ListsQuery>,
) -> Result<Json<Vec<public::TodoList>>, ApiError> {
    let db = state.read().unwrap().db.clone();
    let email = require_user(&db, params.email.as_deref()).await?;

    let lists = lists_db::list_lists(&db, email).await?;
    Ok(Json(lists))
}

async fn create_list(
    State(state): State<SharedState>,
    Json(body): Json<public::CreateListRequest>,
) -> Result<(StatusCode, Json<public::TodoList>), ApiError> {
    let db = state.read().unwrap().db.clone();
    let email = require_user(&db, body.email.as_deref()).await?;

    let name = body
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::BadRequest("name is required".to_string()))?;
    let color = body
        .color
        .as_deref()
        .map(str::trim)
        .filter(|color| !color.is_empty())
        .unwrap_or(DEFAULT_LIST_COLOR);

    let created = lists_db::insert_list(
        &db,
        uuid::Uuid::new_v4().to_string(),
        email,
        name.to_string(),
        color.to_string(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_list(
    State(state): State<SharedState>,
    Path(list_id): Path<String>,
    Json(body): Json<public::UpdateListRequest>,
) -> Result<Json<Value>, ApiError> {
    let db = state.read().unwrap().db.clone();
    let email = require_user(&db, body.email.as_deref()).await?;

    let list_id = parse_list_id(&list_id)
        .ok_or_else(|| ApiError::BadRequest("Invalid list id".to_string()))?
        .to_string();

    let name = body
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    let color = body
        .color
        .as_deref()
        .map(str::trim)
        .filter(|color| !color.is_empty())
        .map(str::to_string);

    let found = lists_db::update_list(&db, email, list_id, name, color, body.sort_order).await?;
    if !found {
        return Err(ApiError::NotFound("List not found".to_string()));
    }
    Ok(Json(json!({ "ok": true })))
}

async fn delete_list(
    State(state): State<SharedState>,
    Path(list_id): Path<String>,
    Query(params): Query<public::ListsQuery>,
) -> Result<Json<Value>, ApiError> {
    let db = state.read().unwrap().db.clone();
    let email = require_user(&db, params.email.as_deref()).await?;

    let list_id = parse_list_id(&list_id)
        .ok_or_else(|| ApiError::BadRequest("Invalid list id".to_string()))?
        .to_string();

    if !lists_db::delete_list(&db, email, list_id).await? {
        return Err(ApiError::NotFound("List not found".to_string()));
    }
    Ok(Json(json!({ "ok": true })))
}

/// Create the to-do lists router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", axum::routing::get(list_lists).post(create_list))
        .route(
            "/{id}",
            axum::routing::patch(update_list).delete(delete_list),
        )
}
