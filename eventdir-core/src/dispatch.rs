//! View dispatch: one filter pass per facet change, fanned out to every view.
//!
//! The dispatcher owns the catalog, the facet state and the address. Views
//! never filter on their own; they receive the already-filtered set through
//! `View::render`. Every state mutation goes through `Dispatcher::update`,
//! which filters once, replaces the address query, then pushes to views.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use tracing::debug;

use crate::catalog::{Catalog, CoordinateMap};
use crate::event::Event;
use crate::facet::{Facet, FacetChange, FacetState};
use crate::filter::{FacetOption, active_count, filter_indices, options_for};
use crate::query;

/// The three presentations of the filtered set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewId {
    List,
    Calendar,
    Map,
}

impl ViewId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewId::List => "list",
            ViewId::Calendar => "calendar",
            ViewId::Map => "map",
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(ViewId::List),
            "calendar" => Ok(ViewId::Calendar),
            "map" => Ok(ViewId::Map),
            other => Err(format!(
                "Unknown view '{other}'. Expected one of: list, calendar, map"
            )),
        }
    }
}

/// A push target for the filtered event set.
pub trait View {
    fn id(&self) -> ViewId;

    /// Expensive one-time setup, run when the view is first shown.
    fn activate(&mut self) {}

    /// Show this set. An empty slice must produce a visible "no results" state.
    fn render(&mut self, events: &[&Event]);

    /// Draw attention to one event that is part of the last rendered set.
    fn focus(&mut self, _event: &Event) {}
}

/// Where the shareable query lives (an address bar, a terminal line...).
pub trait Address {
    /// Replace the current query in place. Never adds a history entry.
    fn replace_query(&mut self, query: &str);
}

/// An address kept in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryAddress {
    pub path: String,
    pub query: String,
    /// How many times the query was replaced
    pub replacements: usize,
}

impl MemoryAddress {
    pub fn new(path: &str, query: &str) -> Self {
        MemoryAddress {
            path: path.to_string(),
            query: query.trim_start_matches('?').to_string(),
            replacements: 0,
        }
    }

    pub fn href(&self) -> String {
        query::with_query(&self.path, &self.query)
    }
}

impl Address for MemoryAddress {
    fn replace_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.replacements += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus {
    /// Registered but never shown: receives nothing yet
    Uninitialized,
    /// Shown at least once: receives every dispatch
    Active,
}

struct ViewSlot {
    view: Box<dyn View>,
    status: ViewStatus,
    /// Sequence of the last filtered set this view rendered
    rendered: u64,
}

/// Outcome of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    /// Increases by one for every filter pass
    pub sequence: u64,
    /// Size of the filtered set
    pub matched: usize,
    /// Filtered events starting today or later
    pub active: usize,
    /// Encoded facet state
    pub query: String,
    /// Views that received the set
    pub rendered: Vec<ViewId>,
}

/// Proof that an enrichment request was started against a given catalog.
///
/// Results carrying a ticket from before the last catalog replacement are
/// dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentTicket(u64);

pub struct Dispatcher<A> {
    catalog: Catalog,
    state: FacetState,
    address: A,
    views: Vec<ViewSlot>,
    /// Catalog positions of the last filtered set
    visible: Vec<usize>,
    today: NaiveDate,
    sequence: u64,
    generation: u64,
}

impl<A: Address> Dispatcher<A> {
    pub fn new(catalog: Catalog, state: FacetState, address: A, today: NaiveDate) -> Self {
        Dispatcher {
            catalog,
            state,
            address,
            views: Vec::new(),
            visible: Vec::new(),
            today,
            sequence: 0,
            generation: 0,
        }
    }

    /// Build a dispatcher whose state is decoded from `query`.
    pub fn hydrate(catalog: Catalog, query: &str, address: A, today: NaiveDate) -> Self {
        Self::new(catalog, query::decode(query), address, today)
    }

    /// Register a view. It stays uninitialized until first shown.
    pub fn register(&mut self, view: Box<dyn View>) {
        self.views.push(ViewSlot {
            view,
            status: ViewStatus::Uninitialized,
            rendered: 0,
        });
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &FacetState {
        &self.state
    }

    pub fn address(&self) -> &A {
        &self.address
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn status(&self, id: ViewId) -> Option<ViewStatus> {
        self.views
            .iter()
            .find(|slot| slot.view.id() == id)
            .map(|slot| slot.status)
    }

    /// The last filtered set, in catalog order.
    pub fn visible(&self) -> Vec<&Event> {
        self.visible
            .iter()
            .map(|&i| &self.catalog.events()[i])
            .collect()
    }

    pub fn active_count(&self) -> usize {
        active_count(self.visible(), self.today)
    }

    pub fn options(&self, facet: Facet) -> Vec<FacetOption> {
        options_for(facet, &self.state, &self.catalog)
    }

    /// First render after loading. Leaves the address untouched so a deep
    /// link in it survives until the first facet change.
    pub fn start(&mut self, initial: ViewId) -> Dispatch {
        let dispatch = self.dispatch(false);
        self.show(initial);
        dispatch
    }

    /// Apply a facet mutation and dispatch if it changed anything.
    pub fn update(&mut self, change: FacetChange) -> Option<Dispatch> {
        if !self.state.apply(change, &self.catalog) {
            debug!("facet change left state untouched, skipping dispatch");
            return None;
        }
        Some(self.on_facet_change())
    }

    /// Filter once, replace the address query, push to every active view.
    pub fn on_facet_change(&mut self) -> Dispatch {
        self.dispatch(true)
    }

    /// A view became visible. The first time, it is activated; either way it
    /// renders the current filtered set.
    pub fn show(&mut self, id: ViewId) -> bool {
        let events: Vec<&Event> = self
            .visible
            .iter()
            .map(|&i| &self.catalog.events()[i])
            .collect();

        let Some(slot) = self.views.iter_mut().find(|slot| slot.view.id() == id) else {
            return false;
        };

        if slot.status == ViewStatus::Uninitialized {
            debug!(view = %id, "activating view");
            slot.view.activate();
            slot.status = ViewStatus::Active;
        }
        slot.view.render(&events);
        slot.rendered = self.sequence;
        true
    }

    /// Show the list and highlight one event. Returns false if the event is
    /// not part of the current filtered set.
    ///
    /// A list that already holds the current set is only focused.
    pub fn reveal(&mut self, event_id: &str) -> bool {
        let Some(position) = self
            .visible
            .iter()
            .copied()
            .find(|&i| self.catalog.events()[i].id == event_id)
        else {
            return false;
        };

        let current = self.views.iter().any(|s| {
            s.view.id() == ViewId::List
                && s.status == ViewStatus::Active
                && s.rendered == self.sequence
        });
        if !current && !self.show(ViewId::List) {
            return false;
        }

        let event = &self.catalog.events()[position];
        if let Some(slot) = self.views.iter_mut().find(|s| s.view.id() == ViewId::List) {
            slot.view.focus(event);
        }
        true
    }

    /// Start a coordinate enrichment against the current catalog.
    pub fn begin_enrichment(&self) -> EnrichmentTicket {
        EnrichmentTicket(self.generation)
    }

    /// Merge late coordinates into the catalog and re-render.
    ///
    /// Returns None when the ticket is stale or nothing moved.
    pub fn apply_coordinates(
        &mut self,
        ticket: EnrichmentTicket,
        coordinates: &CoordinateMap,
    ) -> Option<Dispatch> {
        if ticket.0 != self.generation {
            debug!(
                ticket = ticket.0,
                generation = self.generation,
                "dropping stale coordinates"
            );
            return None;
        }

        let updated = self.catalog.merge_coordinates(coordinates);
        debug!(updated, "merged coordinates");
        if updated == 0 {
            return None;
        }
        Some(self.dispatch(false))
    }

    /// Swap in a freshly loaded catalog, keeping the facet state.
    pub fn replace_catalog(&mut self, catalog: Catalog) -> Dispatch {
        self.catalog = catalog;
        self.generation += 1;
        self.dispatch(false)
    }

    fn dispatch(&mut self, write_address: bool) -> Dispatch {
        self.sequence += 1;
        self.visible = filter_indices(&self.catalog, &self.state, self.today);

        let query = query::encode(&self.state);
        if write_address {
            self.address.replace_query(&query);
        }

        let events: Vec<&Event> = self
            .visible
            .iter()
            .map(|&i| &self.catalog.events()[i])
            .collect();

        let mut rendered = Vec::new();
        for slot in self
            .views
            .iter_mut()
            .filter(|slot| slot.status == ViewStatus::Active)
        {
            slot.view.render(&events);
            slot.rendered = self.sequence;
            rendered.push(slot.view.id());
        }

        let dispatch = Dispatch {
            sequence: self.sequence,
            matched: events.len(),
            active: active_count(events.iter().copied(), self.today),
            query,
            rendered,
        };
        debug!(
            sequence = dispatch.sequence,
            matched = dispatch.matched,
            views = dispatch.rendered.len(),
            "dispatched"
        );
        dispatch
    }
}
