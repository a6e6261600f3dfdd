//! Assembling one consistent week payload: provider calendars merged
//! with overrides, events fetched per calendar concurrently, raw items
//! classified into timed events and all-day tasks.

use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};
use futures::future::try_join_all;

use crate::calendar::models::{
    CalendarEvent, CalendarOverride, Todo, TodoList, TodoSource, WeekCalendarPayload,
    compose_event_id,
};
use crate::calendar::modules::merge_modules;
use crate::google::gcal::{CalendarClient, GcalEvent};

const MIN_EVENT_MINUTES: u32 = 30;
const LAST_MINUTE_OF_DAY: u32 = 23 * 60 + 59;

/// Monday of the ISO week containing the given date.
pub fn week_start_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Fetch and assemble the week containing `anchor`.
///
/// Event fetches fan out concurrently across calendars and are joined
/// before classification; a single failing calendar fails the whole
/// payload so the client never renders a half-complete week.
pub async fn week_payload(
    client: &CalendarClient,
    access_token: &str,
    anchor: DateTime<Utc>,
    overrides: &[CalendarOverride],
) -> Result<WeekCalendarPayload> {
    let week_start = week_start_of(anchor.date_naive());
    let time_min = Utc.from_utc_datetime(&week_start.and_hms_opt(0, 0, 0).expect("valid time"));
    let time_max = Utc.from_utc_datetime(
        &(week_start + Duration::days(6))
            .and_hms_opt(23, 59, 59)
            .expect("valid time"),
    );

    let calendars = client.list_calendars(access_token).await?;
    let modules = merge_modules(&calendars, overrides);

    let todo_lists: Vec<TodoList> = modules
        .iter()
        .map(|module| TodoList {
            id: format!("list-{}", module.id),
            name: module.name.clone(),
            color: module.color.clone(),
            module_id: Some(module.id.clone()),
        })
        .collect();

    let per_calendar = try_join_all(modules.iter().map(|module| {
        let module_id = module.id.clone();
        async move {
            let events = client
                .list_events(access_token, &module_id, time_min, time_max)
                .await?;
            Ok::<_, anyhow::Error>((module_id, events))
        }
    }))
    .await?;

    let mut events: Vec<CalendarEvent> = Vec::new();
    let mut todos: Vec<Todo> = Vec::new();
    for (module_id, raw_events) in per_calendar {
        for raw in raw_events {
            if raw.status.as_deref() == Some("cancelled") {
                continue;
            }
            if let Some(event) = to_calendar_event(&raw, &module_id, week_start) {
                events.push(event);
            } else if let Some(todo) = to_all_day_todo(&raw, &module_id, week_start) {
                todos.push(todo);
            }
        }
    }

    events.sort_by(|a, b| {
        a.day_offset
            .cmp(&b.day_offset)
            .then(a.start_hour.cmp(&b.start_hour))
            .then(a.start_minute.cmp(&b.start_minute))
    });

    Ok(WeekCalendarPayload {
        modules,
        events,
        todo_lists,
        todos,
    })
}

/// Classify a raw item with a date-time start/end as a timed event.
///
/// Items landing outside the week are dropped. Cross-midnight events are
/// truncated to the start day, ends are capped at 23:59, and anything
/// shorter than 30 minutes is stretched so it stays clickable — a repair
/// policy, not something the provider guarantees.
fn to_calendar_event(
    raw: &GcalEvent,
    module_id: &str,
    week_start: NaiveDate,
) -> Option<CalendarEvent> {
    let id = raw.id.as_deref()?;
    let start_raw = raw.start.as_ref()?.date_time.as_deref()?;
    let end_raw = raw.end.as_ref()?.date_time.as_deref()?;
    let start = DateTime::parse_from_rfc3339(start_raw).ok()?.with_timezone(&Utc);
    let end = DateTime::parse_from_rfc3339(end_raw).ok()?.with_timezone(&Utc);

    let day_offset = (start.date_naive() - week_start).num_days();
    if !(0..=6).contains(&day_offset) {
        return None;
    }

    let start_minutes = start.hour() * 60 + start.minute();
    let end_minutes = if start.date_naive() == end.date_naive() {
        end.hour() * 60 + end.minute()
    } else {
        LAST_MINUTE_OF_DAY
    };
    let end_minutes = end_minutes
        .max(start_minutes + MIN_EVENT_MINUTES)
        .min(LAST_MINUTE_OF_DAY);

    Some(CalendarEvent {
        id: compose_event_id(module_id, id),
        title: non_empty(raw.summary.as_deref()).unwrap_or("untitled event").to_string(),
        module_id: module_id.to_string(),
        day_offset: day_offset as u32,
        start_hour: start.hour(),
        start_minute: start.minute(),
        end_hour: end_minutes / 60,
        end_minute: end_minutes % 60,
        description: raw.description.clone(),
        location: raw.location.clone(),
    })
}

/// Classify a raw date-only (all-day) item as a read-only todo on the
/// calendar's mirrored list.
fn to_all_day_todo(raw: &GcalEvent, module_id: &str, week_start: NaiveDate) -> Option<Todo> {
    let id = raw.id.as_deref()?;
    let date_raw = raw.start.as_ref()?.date.as_deref()?;
    let date = NaiveDate::parse_from_str(date_raw, "%Y-%m-%d").ok()?;

    let day_offset = (date - week_start).num_days();
    if !(0..=6).contains(&day_offset) {
        return None;
    }

    Some(Todo {
        id: format!("todo-{module_id}-{id}"),
        text: non_empty(raw.summary.as_deref()).unwrap_or("untitled task").to_string(),
        list_id: format!("list-{module_id}"),
        completed: false,
        due_at: None,
        schedule_token: None,
        source: TodoSource::Google,
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
