//! Database queries for the todos API

use anyhow::Error;
use chrono::NaiveDateTime;
use tokio_rusqlite::Connection;

use crate::calendar::models::{Todo, TodoSource};

/// Storage format for due timestamps.
pub(crate) const DUE_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub(crate) struct NewTodo {
    pub id: String,
    pub user_email: String,
    pub list_id: String,
    pub text: String,
    pub due_at: Option<NaiveDateTime>,
    pub schedule_token: Option<String>,
}

pub(crate) struct TodoPatch {
    pub completed: Option<bool>,
    /// Re-parsed text, carried together with its schedule fields.
    pub text: Option<(String, Option<NaiveDateTime>, Option<String>)>,
}

fn parse_due_at(raw: Option<String>) -> Option<NaiveDateTime> {
    raw.and_then(|value| NaiveDateTime::parse_from_str(&value, DUE_AT_FORMAT).ok())
}

fn format_due_at(due_at: Option<NaiveDateTime>) -> Option<String> {
    due_at.map(|value| value.format(DUE_AT_FORMAT).to_string())
}

/// Incomplete todos for a user, soonest due first, then newest first.
pub async fn list_open_todos(db: &Connection, email: String) -> Result<Vec<Todo>, Error> {
    let todos = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                r"
              SELECT id, text, list_id, completed, due_at, schedule_token
              FROM todo_item
              WHERE user_email = ?1 AND completed = 0
              ORDER BY due_at IS NULL, due_at ASC, created_at DESC
            ",
            )?;
            let rows = stmt
                .query_map([&email], |row| {
                    Ok(Todo {
                        id: format!("task-{}", row.get::<_, String>(0)?),
                        text: row.get(1)?,
                        list_id: format!("local-{}", row.get::<_, String>(2)?),
                        completed: row.get(3)?,
                        due_at: parse_due_at(row.get(4)?),
                        schedule_token: row.get(5)?,
                        source: TodoSource::Local,
                    })
                })?
                .filter_map(Result::ok)
                .collect::<Vec<Todo>>();
            Ok(rows)
        })
        .await?;
    Ok(todos)
}

pub async fn list_exists(db: &Connection, email: String, list_id: String) -> Result<bool, Error> {
    let exists = db
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM todo_list WHERE id = ?1 AND user_email = ?2",
                [&list_id, &email],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await?;
    Ok(exists)
}

pub(crate) async fn insert_todo(db: &Connection, todo: NewTodo) -> Result<Todo, Error> {
    let created = db
        .call(move |conn| {
            conn.execute(
                r"
              INSERT INTO todo_item (id, user_email, list_id, text, due_at, schedule_token)
              VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
                tokio_rusqlite::params![
                    &todo.id,
                    &todo.user_email,
                    &todo.list_id,
                    &todo.text,
                    format_due_at(todo.due_at),
                    &todo.schedule_token,
                ],
            )?;
            Ok(Todo {
                id: format!("task-{}", todo.id),
                text: todo.text,
                list_id: format!("local-{}", todo.list_id),
                completed: false,
                due_at: todo.due_at,
                schedule_token: todo.schedule_token,
                source: TodoSource::Local,
            })
        })
        .await?;
    Ok(created)
}

/// Apply a partial update. Returns false when the todo doesn't exist or
/// isn't owned by the caller.
pub(crate) async fn update_todo(
    db: &Connection,
    email: String,
    todo_id: String,
    patch: TodoPatch,
) -> Result<bool, Error> {
    let found = db
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM todo_item WHERE id = ?1 AND user_email = ?2",
                [&todo_id, &email],
                |row| row.get(0),
            )?;
            if count == 0 {
                return Ok(false);
            }

            if let Some(completed) = patch.completed {
                conn.execute(
                    r"
                  UPDATE todo_item
                  SET completed = ?1,
                      completed_at = CASE WHEN ?1 THEN datetime('now') ELSE NULL END
                  WHERE id = ?2
                ",
                    tokio_rusqlite::params![completed, &todo_id],
                )?;
            }
            if let Some((text, due_at, schedule_token)) = &patch.text {
                conn.execute(
                    "UPDATE todo_item SET text = ?1, due_at = ?2, schedule_token = ?3 WHERE id = ?4",
                    tokio_rusqlite::params![
                        text,
                        format_due_at(*due_at),
                        schedule_token,
                        &todo_id
                    ],
                )?;
            }
            Ok(true)
        })
        .await?;
    Ok(found)
}

pub async fn delete_todo(db: &Connection, email: String, todo_id: String) -> Result<bool, Error> {
    let deleted = db
        .call(move |conn| {
            let changed = conn.execute(
                "DELETE FROM todo_item WHERE id = ?1 AND user_email = ?2",
                [&todo_id, &email],
            )?;
            Ok(changed > 0)
        })
        .await?;
    Ok(deleted)
}
