//! Client-side state for the week view: an explicit store with
//! `Idle/Loading/Ready/Error` phases, optimistic mutations with named
//! reconciliation policies, and a transport boundary to the HTTP
//! surface.

pub mod controller;
pub mod http;
pub mod store;
pub mod transport;

pub use controller::WeekController;
pub use http::HttpCalendarApi;
pub use store::{LoadTicket, MutationPolicy, WeekPhase, WeekStore};
pub use transport::{CalendarApi, EventDraft};
