//! Google Calendar API client: calendar list, events in a time window,
//! and single-event create/patch/delete.
//!
//! Both list endpoints are cursor-paginated; pages for one calendar are
//! fetched strictly in sequence and drained to exhaustion before the call
//! returns. The client never retries; callers decide what a failed call
//! means for them.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const GOOGLE_CALENDAR_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// A non-success response from the calendar API, kept with the raw body
/// so the caller can log or surface exactly what Google said.
#[derive(Debug, Error)]
#[error("Google Calendar API error ({status}): {body}")]
pub struct GcalError {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarListEntry {
    pub id: Option<String>,
    pub summary: Option<String>,
    #[serde(rename = "backgroundColor")]
    pub background_color: Option<String>,
    pub hidden: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct CalendarListResponse {
    items: Option<Vec<CalendarListEntry>>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventTime {
    pub date: Option<String>,
    #[serde(rename = "dateTime")]
    pub date_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GcalEvent {
    pub id: Option<String>,
    pub summary: Option<String>,
    pub status: Option<String>,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    pub description: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    items: Option<Vec<GcalEvent>>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

/// Recurrence presets exposed by the event editor. Anything the closed
/// set doesn't name deserializes to `None` and writes no rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePreset {
    #[default]
    None,
    Daily,
    Weekdays,
    Weekly,
    Monthly,
    Yearly,
}

impl<'de> Deserialize<'de> for RecurrencePreset {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let preset = match raw.as_str() {
            "daily" => RecurrencePreset::Daily,
            "weekdays" => RecurrencePreset::Weekdays,
            "weekly" => RecurrencePreset::Weekly,
            "monthly" => RecurrencePreset::Monthly,
            "yearly" => RecurrencePreset::Yearly,
            _ => RecurrencePreset::None,
        };
        Ok(preset)
    }
}

impl RecurrencePreset {
    pub fn to_rrule(self) -> Option<Vec<String>> {
        let rule = match self {
            RecurrencePreset::None => return None,
            RecurrencePreset::Daily => "RRULE:FREQ=DAILY",
            RecurrencePreset::Weekdays => "RRULE:FREQ=WEEKLY;BYDAY=MO,TU,WE,TH,FR",
            RecurrencePreset::Weekly => "RRULE:FREQ=WEEKLY",
            RecurrencePreset::Monthly => "RRULE:FREQ=MONTHLY",
            RecurrencePreset::Yearly => "RRULE:FREQ=YEARLY",
        };
        Some(vec![rule.to_string()])
    }
}

/// Fields written on event create/patch.
#[derive(Debug, Clone)]
pub struct EventWrite {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub time_zone: String,
    pub color_id: Option<String>,
    pub recurrence: Option<Vec<String>>,
    pub description: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
struct EventTimePayload {
    #[serde(rename = "dateTime")]
    date_time: String,
    #[serde(rename = "timeZone")]
    time_zone: String,
}

#[derive(Debug, Serialize)]
struct EventPayload {
    summary: String,
    start: EventTimePayload,
    end: EventTimePayload,
    #[serde(rename = "colorId", skip_serializing_if = "Option::is_none")]
    color_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recurrence: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

impl EventPayload {
    fn from_write(write: &EventWrite) -> Self {
        Self {
            summary: write.title.clone(),
            start: EventTimePayload {
                date_time: write.start.to_rfc3339(),
                time_zone: write.time_zone.clone(),
            },
            end: EventTimePayload {
                date_time: write.end.to_rfc3339(),
                time_zone: write.time_zone.clone(),
            },
            color_id: write.color_id.clone(),
            recurrence: write.recurrence.clone(),
            description: write.description.clone(),
            location: write.location.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CalendarClient {
    http: Client,
    base_url: String,
}

impl Default for CalendarClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarClient {
    pub fn new() -> Self {
        Self::with_base_url(GOOGLE_CALENDAR_BASE_URL)
    }

    /// Point the client at a different API host. Used by tests to target
    /// a local mock server.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the full calendar list, following pagination to exhaustion.
    /// Entries without a stable id and entries the provider marks hidden
    /// are dropped.
    pub async fn list_calendars(&self, access_token: &str) -> anyhow::Result<Vec<CalendarListEntry>> {
        let mut calendars: Vec<CalendarListEntry> = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!(
                "{}/users/me/calendarList?maxResults=250&showHidden=false",
                self.base_url
            );
            if let Some(token) = &page_token {
                url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
            }

            let page: CalendarListResponse = self.get_json(access_token, &url).await?;
            calendars.extend(page.items.unwrap_or_default());
            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        Ok(calendars
            .into_iter()
            .filter(|calendar| {
                calendar.id.as_deref().is_some_and(|id| !id.is_empty())
                    && !calendar.hidden.unwrap_or(false)
            })
            .collect())
    }

    /// Fetch all events for one calendar within an inclusive time window,
    /// with recurring events expanded into single instances, ordered by
    /// start time, excluding deleted items.
    pub async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> anyhow::Result<Vec<GcalEvent>> {
        let mut events: Vec<GcalEvent> = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!(
                "{}/calendars/{}/events?singleEvents=true&orderBy=startTime&showDeleted=false&maxResults=2500&timeMin={}&timeMax={}",
                self.base_url,
                urlencoding::encode(calendar_id),
                urlencoding::encode(&time_min.to_rfc3339()),
                urlencoding::encode(&time_max.to_rfc3339()),
            );
            if let Some(token) = &page_token {
                url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
            }

            let page: EventsResponse = self.get_json(access_token, &url).await?;
            events.extend(page.items.unwrap_or_default());
            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        Ok(events)
    }

    pub async fn create_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        write: &EventWrite,
    ) -> anyhow::Result<GcalEvent> {
        let url = format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&EventPayload::from_write(write))
            .send()
            .await?;
        parse_json_response(response).await
    }

    pub async fn update_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
        write: &EventWrite,
    ) -> anyhow::Result<GcalEvent> {
        let url = format!(
            "{}/calendars/{}/events/{}",
            self.base_url,
            urlencoding::encode(calendar_id),
            urlencoding::encode(event_id)
        );
        let response = self
            .http
            .patch(&url)
            .bearer_auth(access_token)
            .json(&EventPayload::from_write(write))
            .send()
            .await?;
        parse_json_response(response).await
    }

    pub async fn delete_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> anyhow::Result<()> {
        let url = format!(
            "{}/calendars/{}/events/{}",
            self.base_url,
            urlencoding::encode(calendar_id),
            urlencoding::encode(event_id)
        );
        let response = self
            .http
            .delete(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GcalError {
                status: status.as_u16(),
                body,
            }
            .into());
        }
        Ok(())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        access_token: &str,
        url: &str,
    ) -> anyhow::Result<T> {
        let response = self.http.get(url).bearer_auth(access_token).send().await?;
        parse_json_response(response).await
    }
}

async fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> anyhow::Result<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(GcalError {
            status: status.as_u16(),
            body,
        }
        .into());
    }
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mockito::Matcher;

    #[test]
    fn it_maps_recurrence_presets_to_rrules() {
        assert_eq!(RecurrencePreset::None.to_rrule(), None);
        assert_eq!(
            RecurrencePreset::Weekdays.to_rrule(),
            Some(vec!["RRULE:FREQ=WEEKLY;BYDAY=MO,TU,WE,TH,FR".to_string()])
        );
        assert_eq!(
            RecurrencePreset::Yearly.to_rrule(),
            Some(vec!["RRULE:FREQ=YEARLY".to_string()])
        );
    }

    #[test]
    fn it_treats_unknown_presets_as_none() {
        let preset: RecurrencePreset = serde_json::from_str("\"fortnightly\"").unwrap();
        assert_eq!(preset, RecurrencePreset::None);
        assert_eq!(preset.to_rrule(), None);
    }

    /// The calendar list must be drained across every page before the
    /// call returns.
    #[tokio::test]
    async fn it_follows_calendar_list_pagination_to_exhaustion() {
        let mut server = mockito::Server::new_async().await;

        // Page queries are disambiguated by their tail: the client only
        // appends pageToken after the fixed parameters.
        let first_page = server
            .mock("GET", "/users/me/calendarList")
            .match_query(Matcher::Regex("showHidden=false$".to_string()))
            .with_status(200)
            .with_body(
                r#"{
                  "items": [{"id": "cal-a", "summary": "Work"}],
                  "nextPageToken": "page-2"
                }"#,
            )
            .create_async()
            .await;
        let second_page = server
            .mock("GET", "/users/me/calendarList")
            .match_query(Matcher::Regex("pageToken=page-2$".to_string()))
            .with_status(200)
            .with_body(r#"{"items": [{"id": "cal-b", "summary": "Home"}]}"#)
            .create_async()
            .await;

        let client = CalendarClient::with_base_url(&server.url());
        let calendars = client.list_calendars("test-token").await.unwrap();

        first_page.assert_async().await;
        second_page.assert_async().await;
        assert_eq!(calendars.len(), 2);
        assert_eq!(calendars[0].id.as_deref(), Some("cal-a"));
        assert_eq!(calendars[1].id.as_deref(), Some("cal-b"));
    }

    #[tokio::test]
    async fn it_drops_idless_and_hidden_calendars() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/me/calendarList")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{
                  "items": [
                    {"summary": "no id"},
                    {"id": "cal-hidden", "summary": "Hidden", "hidden": true},
                    {"id": "cal-a", "summary": "Kept"}
                  ]
                }"#,
            )
            .create_async()
            .await;

        let client = CalendarClient::with_base_url(&server.url());
        let calendars = client.list_calendars("test-token").await.unwrap();

        assert_eq!(calendars.len(), 1);
        assert_eq!(calendars[0].id.as_deref(), Some("cal-a"));
    }

    #[tokio::test]
    async fn it_follows_event_pagination_to_exhaustion() {
        let mut server = mockito::Server::new_async().await;

        let first_page = server
            .mock("GET", "/calendars/cal-a/events")
            .match_query(Matcher::Regex("timeMax=[^&]*$".to_string()))
            .with_status(200)
            .with_body(
                r#"{
                  "items": [{"id": "ev-1", "summary": "One"}],
                  "nextPageToken": "p2"
                }"#,
            )
            .create_async()
            .await;
        let second_page = server
            .mock("GET", "/calendars/cal-a/events")
            .match_query(Matcher::Regex("pageToken=p2$".to_string()))
            .with_status(200)
            .with_body(r#"{"items": [{"id": "ev-2", "summary": "Two"}]}"#)
            .create_async()
            .await;

        let client = CalendarClient::with_base_url(&server.url());
        let time_min = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let time_max = Utc.with_ymd_and_hms(2024, 1, 7, 23, 59, 59).unwrap();
        let events = client
            .list_events("test-token", "cal-a", time_min, time_max)
            .await
            .unwrap();

        first_page.assert_async().await;
        second_page.assert_async().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id.as_deref(), Some("ev-1"));
        assert_eq!(events[1].id.as_deref(), Some("ev-2"));
    }

    /// Non-success responses surface the status and raw body, untouched.
    #[tokio::test]
    async fn it_wraps_api_errors_with_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/me/calendarList")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body("rate limit exceeded")
            .create_async()
            .await;

        let client = CalendarClient::with_base_url(&server.url());
        let err = client.list_calendars("test-token").await.unwrap_err();
        let gcal_err = err.downcast_ref::<GcalError>().expect("expected GcalError");

        assert_eq!(gcal_err.status, 403);
        assert_eq!(gcal_err.body, "rate limit exceeded");
    }

    #[tokio::test]
    async fn it_deletes_events_without_parsing_a_body() {
        let mut server = mockito::Server::new_async().await;
        let delete = server
            .mock("DELETE", "/calendars/cal-a/events/ev-1")
            .with_status(204)
            .create_async()
            .await;

        let client = CalendarClient::with_base_url(&server.url());
        client
            .delete_event("test-token", "cal-a", "ev-1")
            .await
            .unwrap();
        delete.assert_async().await;
    }
}
