//! Core of the eventdir event directory.
//!
//! This crate is shared by the `eventdir` CLI and `eventdir-server`:
//! - `Event`, `Catalog` and the on-disk `store`
//! - `FacetState` with its `filter` engine and `query` string codec
//! - `Dispatcher`, which keeps registered views in sync with the facets
//! - `ics` export and global `config`

pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod facet;
pub mod filter;
pub mod ics;
pub mod query;
pub mod store;

#[cfg(test)]
mod testing;

pub use catalog::{Catalog, CoordinateMap};
pub use config::EventDirConfig;
pub use dispatch::{Address, Dispatch, Dispatcher, EnrichmentTicket, MemoryAddress, View, ViewId, ViewStatus};
pub use error::{EventDirError, EventDirResult};
pub use event::*;
pub use facet::{Facet, FacetChange, FacetState, Selection, TimeWindow};
pub use filter::{FacetOption, filter, options_for};
