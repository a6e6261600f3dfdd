//! reqwest-backed transport hitting the nook HTTP surface.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::json;

use crate::calendar::models::{CalendarEvent, Todo, TodoList, WeekCalendarPayload};
use crate::client::transport::{CalendarApi, EventDraft};

pub struct HttpCalendarApi {
    http: Client,
    base_url: String,
    email: String,
}

impl HttpCalendarApi {
    pub fn new(base_url: &str, email: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            email: email.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(anyhow!("Request failed ({status}): {body}"));
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn expect_ok(response: reqwest::Response) -> Result<()> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Request failed ({status}): {body}"));
        }
        Ok(())
    }
}

#[async_trait]
impl CalendarApi for HttpCalendarApi {
    async fn fetch_week(&self, anchor: DateTime<Utc>) -> Result<WeekCalendarPayload> {
        let date = anchor.to_rfc3339();
        let response = self
            .http
            .get(self.url("/calendar/week"))
            .query(&[("email", self.email.as_str()), ("date", date.as_str())])
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn create_list(&self, name: &str, color: &str) -> Result<TodoList> {
        let response = self
            .http
            .post(self.url("/todo-lists"))
            .json(&json!({ "email": self.email, "name": name, "color": color }))
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn update_list(
        &self,
        list_id: &str,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<()> {
        let response = self
            .http
            .patch(self.url(&format!("/todo-lists/{list_id}")))
            .json(&json!({ "email": self.email, "name": name, "color": color }))
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    async fn delete_list(&self, list_id: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/todo-lists/{list_id}")))
            .query(&[("email", self.email.as_str())])
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    async fn create_todo(&self, text: &str, list_id: &str) -> Result<Todo> {
        let response = self
            .http
            .post(self.url("/todos"))
            .json(&json!({ "email": self.email, "text": text, "listId": list_id }))
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn update_todo(
        &self,
        todo_id: &str,
        completed: Option<bool>,
        text: Option<&str>,
    ) -> Result<()> {
        let response = self
            .http
            .patch(self.url(&format!("/todos/{todo_id}")))
            .json(&json!({ "email": self.email, "completed": completed, "text": text }))
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    async fn delete_todo(&self, todo_id: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/todos/{todo_id}")))
            .query(&[("email", self.email.as_str())])
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    async fn create_event(&self, calendar_id: &str, draft: &EventDraft) -> Result<CalendarEvent> {
        let response = self
            .http
            .post(self.url("/events"))
            .json(&json!({
                "email": self.email,
                "calendarId": calendar_id,
                "title": draft.title,
                "start": draft.start.to_rfc3339(),
                "durationMinutes": draft.duration_minutes,
                "recurrence": draft.recurrence,
                "colorId": draft.color_id,
            }))
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        draft: &EventDraft,
    ) -> Result<CalendarEvent> {
        let response = self
            .http
            .patch(self.url("/events"))
            .json(&json!({
                "email": self.email,
                "calendarId": calendar_id,
                "eventId": event_id,
                "title": draft.title,
                "start": draft.start.to_rfc3339(),
                "durationMinutes": draft.duration_minutes,
                "recurrence": draft.recurrence,
                "colorId": draft.color_id,
            }))
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.url("/events"))
            .json(&json!({
                "email": self.email,
                "calendarId": calendar_id,
                "eventId": event_id,
            }))
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    async fn upsert_override(
        &self,
        calendar_id: &str,
        display_name: Option<&str>,
        color: Option<&str>,
    ) -> Result<()> {
        let response = self
            .http
            .patch(self.url("/user/preferences"))
            .json(&json!({
                "email": self.email,
                "calendarId": calendar_id,
                "displayName": display_name,
                "color": color,
            }))
            .send()
            .await?;
        Self::expect_ok(response).await
    }
}
