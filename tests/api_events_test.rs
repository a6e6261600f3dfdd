//! Integration tests for the provider event endpoints

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use mockito::Matcher;
    use serial_test::serial;
    use tower::util::ServiceExt;

    use crate::test_utils::{body_to_string, test_app_with_provider, test_app_with_user};

    async fn mock_provider() -> mockito::ServerGuard {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(r#"{"access_token": "test-access-token", "expires_in": 3600}"#)
            .create_async()
            .await;
        server
    }

    /// Tests event creation requires a known user
    #[tokio::test]
    #[serial]
    async fn it_returns_401_for_an_unknown_user() {
        let app = test_app_with_user("user@test.com").await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/events")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"email": "stranger@test.com", "calendarId": "cal-1", "start": "2024-01-02T09:00:00Z", "durationMinutes": 30}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    /// Tests required-field validation happens before any provider call
    #[tokio::test]
    #[serial]
    async fn it_returns_400_for_missing_or_invalid_fields() {
        let app = test_app_with_user("user@test.com").await;

        // Missing calendarId
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/events")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"email": "user@test.com", "start": "2024-01-02T09:00:00Z", "durationMinutes": 30}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // Unparseable start instant
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/events")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"email": "user@test.com", "calendarId": "cal-1", "start": "yesterday-ish", "durationMinutes": 30}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // Updates additionally need the event id
        let response = app
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri("/api/events")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"email": "user@test.com", "calendarId": "cal-1", "start": "2024-01-02T09:00:00Z", "durationMinutes": 30}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    /// Tests creating an event returns a grid-ready summary with a
    /// composite id
    #[tokio::test]
    #[serial]
    async fn it_creates_an_event() {
        let mut server = mock_provider().await;
        let create = server
            .mock("POST", "/calendars/cal-1/events")
            .match_header("authorization", "Bearer test-access-token")
            .with_status(200)
            .with_body(
                r#"{
                  "id": "ev-9",
                  "summary": "Standup",
                  "start": {"dateTime": "2024-01-02T09:00:00Z"},
                  "end": {"dateTime": "2024-01-02T09:30:00Z"}
                }"#,
            )
            .create_async()
            .await;

        let app = test_app_with_provider("user@test.com", &server.url()).await;
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/events")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"email": "user@test.com", "calendarId": "cal-1", "title": "Standup", "start": "2024-01-02T09:00:00Z", "durationMinutes": 30, "recurrence": "weekdays"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        create.assert_async().await;

        let body = body_to_string(response.into_body()).await;
        let event: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(event["id"], "cal-1:ev-9");
        assert_eq!(event["moduleId"], "cal-1");
        // 2024-01-02 is the Tuesday of its week
        assert_eq!(event["dayOffset"], 1);
        assert_eq!(event["startHour"], 9);
        assert_eq!(event["startMinute"], 0);
        assert_eq!(event["endHour"], 9);
        assert_eq!(event["endMinute"], 30);
    }

    /// Tests updating an event patches the provider and echoes the
    /// summary back
    #[tokio::test]
    #[serial]
    async fn it_updates_an_event() {
        let mut server = mock_provider().await;
        let update = server
            .mock("PATCH", "/calendars/cal-1/events/ev-9")
            .with_status(200)
            .with_body(
                r#"{
                  "id": "ev-9",
                  "summary": "Standup (moved)",
                  "start": {"dateTime": "2024-01-02T10:00:00Z"},
                  "end": {"dateTime": "2024-01-02T10:30:00Z"}
                }"#,
            )
            .create_async()
            .await;

        let app = test_app_with_provider("user@test.com", &server.url()).await;
        let response = app
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri("/api/events")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"email": "user@test.com", "calendarId": "cal-1", "eventId": "ev-9", "title": "Standup", "start": "2024-01-02T10:00:00Z", "durationMinutes": 30}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        update.assert_async().await;

        let body = body_to_string(response.into_body()).await;
        let event: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(event["id"], "cal-1:ev-9");
        assert_eq!(event["title"], "Standup (moved)");
        assert_eq!(event["startHour"], 10);
    }

    /// Tests deleting an event
    #[tokio::test]
    #[serial]
    async fn it_deletes_an_event() {
        let mut server = mock_provider().await;
        let delete = server
            .mock("DELETE", "/calendars/cal-1/events/ev-9")
            .with_status(204)
            .create_async()
            .await;

        let app = test_app_with_provider("user@test.com", &server.url()).await;
        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/events")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"email": "user@test.com", "calendarId": "cal-1", "eventId": "ev-9"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        delete.assert_async().await;

        let body = body_to_string(response.into_body()).await;
        assert!(body.contains("\"ok\":true"));
    }

    /// Tests a provider rejection surfaces as a server error, not a
    /// silent success
    #[tokio::test]
    #[serial]
    async fn it_returns_500_when_the_provider_rejects_a_create() {
        let mut server = mock_provider().await;
        server
            .mock("POST", "/calendars/cal-1/events")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body("forbidden")
            .create_async()
            .await;

        let app = test_app_with_provider("user@test.com", &server.url()).await;
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/events")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"email": "user@test.com", "calendarId": "cal-1", "start": "2024-01-02T09:00:00Z", "durationMinutes": 30}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
