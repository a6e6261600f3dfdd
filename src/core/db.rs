//! SQLite storage for auth tokens and per-user calendar state

use anyhow::Result;
use tokio_rusqlite::Connection;

/// Open the database for use from async contexts.
pub async fn async_db(db_path: &str) -> Result<Connection> {
    let conn = Connection::open(format!("{}/nook.db3", db_path)).await?;
    Ok(conn)
}

/// Create all tables. Safe to run repeatedly.
pub fn initialize_db(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS auth (
          id TEXT PRIMARY KEY,
          service TEXT NOT NULL,
          refresh_token TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS todo_list (
          id TEXT PRIMARY KEY,
          user_email TEXT NOT NULL,
          name TEXT NOT NULL,
          color TEXT NOT NULL,
          sort_order INTEGER NOT NULL DEFAULT 0,
          created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS todo_item (
          id TEXT PRIMARY KEY,
          user_email TEXT NOT NULL,
          list_id TEXT NOT NULL,
          text TEXT NOT NULL,
          completed INTEGER NOT NULL DEFAULT 0,
          completed_at TEXT,
          due_at TEXT,
          schedule_token TEXT,
          created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS calendar_override (
          user_email TEXT NOT NULL,
          calendar_id TEXT NOT NULL,
          display_name TEXT,
          color TEXT,
          sort_order INTEGER NOT NULL DEFAULT 0,
          hidden INTEGER NOT NULL DEFAULT 0,
          pinned INTEGER NOT NULL DEFAULT 0,
          PRIMARY KEY (user_email, calendar_id)
        );

        CREATE TABLE IF NOT EXISTS user_settings (
          user_email TEXT PRIMARY KEY,
          week_starts_on INTEGER NOT NULL DEFAULT 1,
          sidebar_open INTEGER NOT NULL DEFAULT 1,
          theme TEXT NOT NULL DEFAULT 'system',
          timezone TEXT NOT NULL DEFAULT 'UTC',
          default_event_duration INTEGER NOT NULL DEFAULT 30
        );

        CREATE INDEX IF NOT EXISTS idx_todo_list_user ON todo_list (user_email);
        CREATE INDEX IF NOT EXISTS idx_todo_item_user ON todo_item (user_email);
        CREATE INDEX IF NOT EXISTS idx_todo_item_list ON todo_item (list_id);
        "#,
    )
}

/// Bring an existing database up to the current schema. The schema is
/// additive so this is the same as initialization for now.
pub fn migrate_db(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    initialize_db(conn)
}
