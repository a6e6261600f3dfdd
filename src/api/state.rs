use tokio_rusqlite::Connection;

use crate::core::AppConfig;
use crate::google::gcal::CalendarClient;

pub struct AppState {
    pub db: Connection,
    pub config: AppConfig,
    pub gcal: CalendarClient,
}

impl AppState {
    pub fn new(db: Connection, config: AppConfig) -> Self {
        Self {
            db,
            config,
            gcal: CalendarClient::new(),
        }
    }

    /// Build state with a calendar client pointed somewhere else, e.g. a
    /// mock provider in tests.
    pub fn with_gcal(db: Connection, config: AppConfig, gcal: CalendarClient) -> Self {
        Self { db, config, gcal }
    }
}
