//! Router for per-user calendar overrides and UI settings

use std::sync::{Arc, RwLock};

use axum::{Router, extract::State, response::Json};
use axum_extra::extract::Query;

use super::db as user_db;
use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::api::utils::require_user;
use crate::calendar::models::CalendarOverride;

type SharedState = Arc<RwLock<AppState>>;

/// Upsert one calendar's override: created on first customization,
/// partially updated after that. Overrides are never auto-deleted, even
/// if the provider calendar later disappears.
async fn update_preferences(
    State(state): State<SharedState>,
    Json(body): Json<public::PreferencesRequest>,
) -> Result<Json<CalendarOverride>, ApiError> {
    let db = state.read().unwrap().db.clone();
    let email = require_user(&db, body.email.as_deref()).await?;

    let calendar_id = body
        .calendar_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("calendarId is required".to_string()))?;

    let override_ = user_db::upsert_override(
        &db,
        email,
        calendar_id.to_string(),
        user_db::OverridePatch {
            display_name: body.display_name.clone(),
            color: body.color.clone(),
            sort_order: body.sort_order,
            hidden: body.hidden,
            pinned: body.pinned,
        },
    )
    .await?;

    Ok(Json(override_))
}

async fn get_settings(
    State(state): State<SharedState>,
    Query(params): Query<public::SettingsQuery>,
) -> Result<Json<public::UserSettings>, ApiError> {
    let db = state.read().unwrap().db.clone();
    let email = require_user(&db, params.email.as_deref()).await?;

    let settings = user_db::get_settings(&db, email).await?.unwrap_or_default();
    Ok(Json(settings))
}

async fn update_settings(
    State(state): State<SharedState>,
    Json(body): Json<public::SettingsRequest>,
) -> Result<Json<public::UserSettings>, ApiError> {
    let db = state.read().unwrap().db.clone();
    let email = require_user(&db, body.email.as_deref()).await?;

    let settings = user_db::upsert_settings(
        &db,
        email,
        body.week_starts_on,
        body.sidebar_open,
        body.theme.clone(),
        body.timezone.clone(),
        body.default_event_duration,
    )
    .await?;

    Ok(Json(settings))
}

/// Create the user router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/preferences", axum::routing::patch(update_preferences))
        .route(
            "/settings",
            axum::routing::get(get_settings).patch(update_settings),
        )
}
