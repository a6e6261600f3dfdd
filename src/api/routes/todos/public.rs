//! Public API types for the todos routes

use serde::Deserialize;

pub use crate::calendar::models::Todo;

#[derive(Debug, Deserialize)]
pub struct TodosQuery {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub email: Option<String>,
    /// Free text; a trailing schedule annotation is parsed out before
    /// persistence.
    pub text: Option<String>,
    pub list_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    pub email: Option<String>,
    pub completed: Option<bool>,
    pub text: Option<String>,
}
