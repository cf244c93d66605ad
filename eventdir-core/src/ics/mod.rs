//! ICS export of directory events.

mod generate;

pub use generate::{IcsOptions, generate_catalog_ics, generate_event_ics};
