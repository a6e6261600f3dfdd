//! Test utilities for integration tests
use std::fs;
use std::sync::{Arc, RwLock};

use axum::Router;
use tokio_rusqlite::Connection;

use nook::api::AppState;
use nook::api::app;
use nook::core::AppConfig;
use nook::core::db::{async_db, initialize_db};
use nook::google::gcal::CalendarClient;

/// Config pointing at nothing routable, so a test that accidentally
/// reaches for the provider fails fast instead of hitting Google.
fn test_config() -> AppConfig {
    AppConfig {
        db_path: String::from("unused-in-tests"),
        web_ui_path: String::from("./web-ui"),
        google_client_id: String::from("test_client_id"),
        google_client_secret: String::from("test_client_secret"),
        google_redirect_uri: String::from("urn:ietf:wg:oauth:2.0:oob"),
        google_token_url: String::from("http://127.0.0.1:1/token"),
    }
}

async fn test_db() -> Connection {
    let dir = tempfile::tempdir()
        .expect("Failed to create temp dir")
        .keep();
    let db_dir = dir.join("db");
    fs::create_dir_all(&db_dir).expect("Failed to create db directory");

    let db = async_db(db_dir.to_str().unwrap())
        .await
        .expect("Failed to connect to async db");
    db.call(|conn| {
        initialize_db(conn).expect("Failed to initialize db");
        Ok(())
    })
    .await
    .unwrap();
    db
}

async fn seed_user(db: &Connection, email: &str) {
    let email = email.to_string();
    db.call(move |conn| {
        conn.execute(
            "INSERT INTO auth (id, service, refresh_token) VALUES (?1, 'google', 'test-refresh-token')",
            [&email],
        )?;
        Ok(())
    })
    .await
    .unwrap();
}

/// An app with an empty database: no known users at all.
pub async fn test_app() -> Router {
    let db = test_db().await;
    let app_state = AppState::new(db, test_config());
    app(Arc::new(RwLock::new(app_state)))
}

/// An app with one authenticated user seeded.
pub async fn test_app_with_user(email: &str) -> Router {
    let db = test_db().await;
    seed_user(&db, email).await;
    let app_state = AppState::new(db, test_config());
    app(Arc::new(RwLock::new(app_state)))
}

/// An app whose OAuth and calendar traffic goes to a mock provider.
pub async fn test_app_with_provider(email: &str, provider_url: &str) -> Router {
    let db = test_db().await;
    seed_user(&db, email).await;

    let mut config = test_config();
    config.google_token_url = format!("{}/token", provider_url);
    let gcal = CalendarClient::with_base_url(provider_url);
    let app_state = AppState::with_gcal(db, config, gcal);
    app(Arc::new(RwLock::new(app_state)))
}

pub async fn body_to_string(body: axum::body::Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body was not valid utf-8")
}
