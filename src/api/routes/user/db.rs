//! Database queries for calendar overrides and user settings

use anyhow::Error;
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use super::public::UserSettings;
use crate::calendar::models::CalendarOverride;

/// Fields of an override upsert. `None` leaves the stored field alone on
/// update and falls back to the column default on create.
#[derive(Debug, Clone, Default)]
pub struct OverridePatch {
    pub display_name: Option<String>,
    pub color: Option<String>,
    pub sort_order: Option<i64>,
    pub hidden: Option<bool>,
    pub pinned: Option<bool>,
}

pub async fn list_overrides(db: &Connection, email: String) -> Result<Vec<CalendarOverride>, Error> {
    let overrides = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                r"
              SELECT calendar_id, display_name, color, sort_order, hidden, pinned
              FROM calendar_override
              WHERE user_email = ?1
            ",
            )?;
            let rows = stmt
                .query_map([&email], |row| {
                    Ok(CalendarOverride {
                        calendar_id: row.get(0)?,
                        display_name: row.get(1)?,
                        color: row.get(2)?,
                        sort_order: row.get(3)?,
                        hidden: row.get(4)?,
                        pinned: row.get(5)?,
                    })
                })?
                .filter_map(Result::ok)
                .collect::<Vec<CalendarOverride>>();
            Ok(rows)
        })
        .await?;
    Ok(overrides)
}

/// Create-or-update an override for `(user, calendar)`. Only the fields
/// present in the patch change; everything else keeps its stored value.
pub async fn upsert_override(
    db: &Connection,
    email: String,
    calendar_id: String,
    patch: OverridePatch,
) -> Result<CalendarOverride, Error> {
    let merged = db
        .call(move |conn| {
            let existing = conn
                .query_row(
                    r"
                  SELECT display_name, color, sort_order, hidden, pinned
                  FROM calendar_override
                  WHERE user_email = ?1 AND calendar_id = ?2
                ",
                    [&email, &calendar_id],
                    |row| {
                        Ok((
                            row.get::<_, Option<String>>(0)?,
                            row.get::<_, Option<String>>(1)?,
                            row.get::<_, i64>(2)?,
                            row.get::<_, bool>(3)?,
                            row.get::<_, bool>(4)?,
                        ))
                    },
                )
                .optional()?;

            let (display_name, color, sort_order, hidden, pinned) = match existing {
                Some((display_name, color, sort_order, hidden, pinned)) => (
                    patch.display_name.clone().or(display_name),
                    patch.color.clone().or(color),
                    patch.sort_order.unwrap_or(sort_order),
                    patch.hidden.unwrap_or(hidden),
                    patch.pinned.unwrap_or(pinned),
                ),
                None => (
                    patch.display_name.clone(),
                    patch.color.clone(),
                    patch.sort_order.unwrap_or(0),
                    patch.hidden.unwrap_or(false),
                    patch.pinned.unwrap_or(false),
                ),
            };

            conn.execute(
                r"
              INSERT OR REPLACE INTO calendar_override
                (user_email, calendar_id, display_name, color, sort_order, hidden, pinned)
              VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
                tokio_rusqlite::params![
                    &email,
                    &calendar_id,
                    &display_name,
                    &color,
                    sort_order,
                    hidden,
                    pinned
                ],
            )?;

            Ok(CalendarOverride {
                calendar_id,
                display_name,
                color,
                sort_order,
                hidden,
                pinned,
            })
        })
        .await?;
    Ok(merged)
}

pub async fn get_settings(db: &Connection, email: String) -> Result<Option<UserSettings>, Error> {
    let settings = db
        .call(move |conn| {
            let row = conn
                .query_row(
                    r"
                  SELECT week_starts_on, sidebar_open, theme, timezone, default_event_duration
                  FROM user_settings
                  WHERE user_email = ?1
                ",
                    [&email],
                    |row| {
                        Ok(UserSettings {
                            week_starts_on: row.get(0)?,
                            sidebar_open: row.get(1)?,
                            theme: row.get(2)?,
                            timezone: row.get(3)?,
                            default_event_duration: row.get(4)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
        .await?;
    Ok(settings)
}

/// Create-or-update settings keyed by user, merging over stored values
/// (or the defaults on first write).
pub async fn upsert_settings(
    db: &Connection,
    email: String,
    week_starts_on: Option<i64>,
    sidebar_open: Option<bool>,
    theme: Option<String>,
    timezone: Option<String>,
    default_event_duration: Option<i64>,
) -> Result<UserSettings, Error> {
    let current = get_settings(db, email.clone()).await?.unwrap_or_default();
    let merged = UserSettings {
        week_starts_on: week_starts_on.unwrap_or(current.week_starts_on),
        sidebar_open: sidebar_open.unwrap_or(current.sidebar_open),
        theme: theme.unwrap_or(current.theme),
        timezone: timezone.unwrap_or(current.timezone),
        default_event_duration: default_event_duration.unwrap_or(current.default_event_duration),
    };

    let stored = merged.clone();
    db.call(move |conn| {
        conn.execute(
            r"
          INSERT OR REPLACE INTO user_settings
            (user_email, week_starts_on, sidebar_open, theme, timezone, default_event_duration)
          VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ",
            tokio_rusqlite::params![
                &email,
                stored.week_starts_on,
                stored.sidebar_open,
                &stored.theme,
                &stored.timezone,
                stored.default_event_duration
            ],
        )?;
        Ok(())
    })
    .await?;

    Ok(merged)
}
