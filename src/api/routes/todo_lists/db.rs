//! Database queries for the to-do lists API

use anyhow::Error;
use tokio_rusqlite::Connection;

use crate::calendar::models::TodoList;

fn to_client_list(id: String, name: String, color: String) -> TodoList {
    TodoList {
        id: format!("local-{id}"),
        name,
        color,
        module_id: None,
    }
}

pub async fn list_lists(db: &Connection, email: String) -> Result<Vec<TodoList>, Error> {
    let lists = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                r"
              SELECT id, name, color
              FROM todo_list
              WHERE user_email = ?1
              ORDER BY sort_order ASC, created_at ASC
            ",
            )?;
            let rows = stmt
                .query_map([&email], |row| {
                    Ok(to_client_list(row.get(0)?, row.get(1)?, row.get(2)?))
                })?
                .filter_map(Result::ok)
                .collect::<Vec<TodoList>>();
            Ok(rows)
        })
        .await?;
    Ok(lists)
}

/// Insert a list at the end of the user's ordering.
pub async fn insert_list(
    db: &Connection,
    id: String,
    email: String,
    name: String,
    color: String,
) -> Result<TodoList, Error> {
    let created = db
        .call(move |conn| {
            let next_sort_order: i64 = conn.query_row(
                "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM todo_list WHERE user_email = ?1",
                [&email],
                |row| row.get(0),
            )?;
            conn.execute(
                r"
              INSERT INTO todo_list (id, user_email, name, color, sort_order)
              VALUES (?1, ?2, ?3, ?4, ?5)
            ",
                tokio_rusqlite::params![&id, &email, &name, &color, next_sort_order],
            )?;
            Ok(to_client_list(id, name, color))
        })
        .await?;
    Ok(created)
}

/// Apply a partial update. Returns false when the list doesn't exist or
/// isn't owned by the caller.
pub async fn update_list(
    db: &Connection,
    email: String,
    list_id: String,
    name: Option<String>,
    color: Option<String>,
    sort_order: Option<i64>,
) -> Result<bool, Error> {
    let found = db
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM todo_list WHERE id = ?1 AND user_email = ?2",
                [&list_id, &email],
                |row| row.get(0),
            )?;
            if count == 0 {
                return Ok(false);
            }

            if let Some(name) = &name {
                conn.execute(
                    "UPDATE todo_list SET name = ?1 WHERE id = ?2",
                    [name, &list_id],
                )?;
            }
            if let Some(color) = &color {
                conn.execute(
                    "UPDATE todo_list SET color = ?1 WHERE id = ?2",
                    [color, &list_id],
                )?;
            }
            if let Some(sort_order) = sort_order {
                conn.execute(
                    "UPDATE todo_list SET sort_order = ?1 WHERE id = ?2",
                    tokio_rusqlite::params![sort_order, &list_id],
                )?;
            }
            Ok(true)
        })
        .await?;
    Ok(found)
}

/// Delete a list and everything on it. Returns false when the list
/// doesn't exist or isn't owned by the caller.
pub async fn delete_list(db: &Connection, email: String, list_id: String) -> Result<bool, Error> {
    let deleted = db
        .call(move |conn| {
            let changed = conn.execute(
                "DELETE FROM todo_list WHERE id = ?1 AND user_email = ?2",
                [&list_id, &email],
            )?;
            if changed == 0 {
                return Ok(false);
            }
            conn.execute(
                "DELETE FROM todo_item WHERE list_id = ?1 AND user_email = ?2",
                [&list_id, &email],
            )?;
            Ok(true)
        })
        .await?;
    Ok(deleted)
}
