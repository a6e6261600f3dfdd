//! Public API types for the to-do list routes

use serde::Deserialize;

pub use crate::calendar::models::TodoList;

#[derive(Debug, Deserialize)]
pub struct ListsQuery {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateListRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub color: Option<String>,
    pub sort_order: Option<i64>,
}
