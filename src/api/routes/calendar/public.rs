//! Public API types for the calendar routes

use serde::Deserialize;

pub use crate::calendar::models::{Module, WeekCalendarPayload};

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub email: Option<String>,
    /// RFC 3339 anchor date; the response covers the Monday-start week
    /// containing it. Defaults to now.
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarsQuery {
    pub email: Option<String>,
}
