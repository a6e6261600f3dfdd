pub mod public;
mod router;
pub use router::{calendars_router, router};
