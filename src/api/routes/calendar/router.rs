//! Router for the calendar API

use std::sync::{Arc, RwLock};

use axum::{Router, extract::State, response::Json};
use axum_extra::extract::Query;
use chrono::{DateTime, Utc};

use super::public;
use crate::api::routes::user::db as user_db;
use crate::api::state::AppState;
use crate::api::utils::{access_token_for, require_user};
use crate::calendar::modules::merge_modules;
use crate::calendar::week::week_payload;

type SharedState = Arc<RwLock<AppState>>;

/// Assemble the week payload for the week containing the `date` query
/// parameter. Computed fresh on every request; never cached.
async fn week_handler(
    State(state): State<SharedState>,
    Query(params): Query<public::WeekQuery>,
) -> Result<Json<public::WeekCalendarPayload>, crate::api::public::ApiError> {
    let (db, config, gcal) = {
        let shared_state = state.read().unwrap();
        (
            shared_state.db.clone(),
            shared_state.config.clone(),
            shared_state.gcal.clone(),
        )
    };
    let email = require_user(&db, params.email.as_deref()).await?;

    let anchor = match params.date.as_deref() {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map_err(|_| {
                crate::api::public::ApiError::BadRequest(
                    "Invalid date query parameter".to_string(),
                )
            })?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let overrides = user_db::list_overrides(&db, email.clone()).await?;
    let access_token = access_token_for(&db, &config, &email).await?;
    let payload = week_payload(&gcal, &access_token, anchor, &overrides).await?;

    Ok(Json(payload))
}

/// The merged, ordered module list backing the calendar switcher.
async fn calendars_handler(
    State(state): State<SharedState>,
    Query(params): Query<public::CalendarsQuery>,
) -> Result<Json<Vec<public::Module>>, crate::api::public::ApiError> {
    let (db, config, gcal) = {
        let shared_state = state.read().unwrap();
        (
            shared_state.db.clone(),
            shared_state.config.clone(),
            shared_state.gcal.clone(),
        )
    };
    let email = require_user(&db, params.email.as_deref()).await?;

    let overrides = user_db::list_overrides(&db, email.clone()).await?;
    let access_token = access_token_for(&db, &config, &email).await?;
    let calendars = gcal.list_calendars(&access_token).await?;

    Ok(Json(merge_modules(&calendars, &overrides)))
}

/// Create the week-payload router
pub fn router() -> Router<SharedState> {
    Router::new().route("/week", axum::routing::get(week_handler))
}

/// Create the merged calendar-list router
pub fn calendars_router() -> Router<SharedState> {
    Router::new().route("/", axum::routing::get(calendars_handler))
}
