//! Router for provider event CRUD. Events live in the provider only;
//! nothing here touches local storage beyond resolving the caller.

use std::sync::{Arc, RwLock};

use axum::{Router, extract::State, response::Json};
use chrono::{DateTime, Duration, Timelike, Utc};
use serde_json::{Value, json};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::api::utils::{access_token_for, require_user};
use crate::calendar::models::{CalendarEvent, compose_event_id};
use crate::calendar::week::week_start_of;
use crate::google::gcal::{CalendarClient, EventWrite, GcalEvent};

type SharedState = Arc<RwLock<AppState>>;

struct ValidatedWrite {
    calendar_id: String,
    title: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    write: EventWrite,
}

/// Check required fields and assemble the provider write before any
/// network call is made.
fn validate_write(body: &public::EventWriteRequest) -> Result<ValidatedWrite, ApiError> {
    let calendar_id = body
        .calendar_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("calendarId is required".to_string()))?
        .to_string();
    let start_raw = body
        .start
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("start is required".to_string()))?;
    let duration_minutes = body
        .duration_minutes
        .filter(|minutes| *minutes > 0)
        .ok_or_else(|| ApiError::BadRequest("durationMinutes is required".to_string()))?;

    let start = DateTime::parse_from_rfc3339(start_raw)
        .map_err(|_| ApiError::BadRequest("Invalid start date".to_string()))?
        .with_timezone(&Utc);
    let end = start + Duration::minutes(duration_minutes);

    let title = body
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .unwrap_or("untitled event")
        .to_string();

    let write = EventWrite {
        title: title.clone(),
        start,
        end,
        time_zone: body
            .time_zone
            .as_deref()
            .map(str::trim)
            .filter(|tz| !tz.is_empty())
            .unwrap_or("UTC")
            .to_string(),
        color_id: body.color_id.clone(),
        recurrence: body.recurrence.to_rrule(),
        description: body.description.clone(),
        location: body.location.clone(),
    };

    Ok(ValidatedWrite {
        calendar_id,
        title,
        start,
        end,
        write,
    })
}

/// Summarize the provider's answer in week-grid terms, preferring the
/// instants the provider echoed back over the ones we sent.
fn event_summary(
    calendar_id: &str,
    event_id: &str,
    title: &str,
    confirmed: &GcalEvent,
    fallback_start: DateTime<Utc>,
    fallback_end: DateTime<Utc>,
) -> CalendarEvent {
    let confirmed_instant = |time: Option<&crate::google::gcal::EventTime>| {
        time.and_then(|t| t.date_time.as_deref())
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
    };
    let start = confirmed_instant(confirmed.start.as_ref()).unwrap_or(fallback_start);
    let end = confirmed_instant(confirmed.end.as_ref()).unwrap_or(fallback_end);

    let week_start = week_start_of(start.date_naive());
    let day_offset = start.date_naive().signed_duration_since(week_start).num_days() as u32;

    CalendarEvent {
        id: compose_event_id(calendar_id, event_id),
        title: confirmed
            .summary
            .as_deref()
            .map(str::trim)
            .filter(|summary| !summary.is_empty())
            .unwrap_or(title)
            .to_string(),
        module_id: calendar_id.to_string(),
        day_offset,
        start_hour: start.hour(),
        start_minute: start.minute(),
        end_hour: end.hour(),
        end_minute: end.minute(),
        description: confirmed.description.clone(),
        location: confirmed.location.clone(),
    }
}

fn shared_parts(state: &SharedState) -> (tokio_rusqlite::Connection, crate::core::AppConfig, CalendarClient) {
    let shared_state = state.read().unwrap();
    (
        shared_state.db.clone(),
        shared_state.config.clone(),
        shared_state.gcal.clone(),
    )
}

async fn create_event_handler(
    State(state): State<SharedState>,
    Json(body): Json<public::EventWriteRequest>,
) -> Result<Json<CalendarEvent>, ApiError> {
    let (db, config, gcal) = shared_parts(&state);
    let email = require_user(&db, body.email.as_deref()).await?;
    let validated = validate_write(&body)?;

    let access_token = access_token_for(&db, &config, &email).await?;
    let created = gcal
        .create_event(&access_token, &validated.calendar_id, &validated.write)
        .await?;

    let event_id = created
        .id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    Ok(Json(event_summary(
        &validated.calendar_id,
        &event_id,
        &validated.title,
        &created,
        validated.start,
        validated.end,
    )))
}

async fn update_event_handler(
    State(state): State<SharedState>,
    Json(body): Json<public::EventWriteRequest>,
) -> Result<Json<CalendarEvent>, ApiError> {
    let (db, config, gcal) = shared_parts(&state);
    let email = require_user(&db, body.email.as_deref()).await?;
    let event_id = body
        .event_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("eventId is required".to_string()))?
        .to_string();
    let validated = validate_write(&body)?;

    let access_token = access_token_for(&db, &config, &email).await?;
    let updated = gcal
        .update_event(
            &access_token,
            &validated.calendar_id,
            &event_id,
            &validated.write,
        )
        .await?;

    Ok(Json(event_summary(
        &validated.calendar_id,
        &event_id,
        &validated.title,
        &updated,
        validated.start,
        validated.end,
    )))
}

async fn delete_event_handler(
    State(state): State<SharedState>,
    Json(body): Json<public::EventDeleteRequest>,
) -> Result<Json<Value>, ApiError> {
    let (db, config, gcal) = shared_parts(&state);
    let email = require_user(&db, body.email.as_deref()).await?;
    let calendar_id = body
        .calendar_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("calendarId is required".to_string()))?;
    let event_id = body
        .event_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("eventId is required".to_string()))?;

    let access_token = access_token_for(&db, &config, &email).await?;
    gcal.delete_event(&access_token, calendar_id, event_id)
        .await?;

    Ok(Json(json!({ "ok": true })))
}

/// Create the events router
pub fn router() -> Router<SharedState> {
    Router::new().route(
        "/",
        axum::routing::post(create_event_handler)
            .patch(update_event_handler)
            .delete(delete_event_handler),
    )
}
