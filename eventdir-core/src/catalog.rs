//! The event catalog: every event known for the current page load.

use std::collections::BTreeMap;

use crate::event::{Event, GeoPoint};

/// Coordinate enrichment payload: event id => position.
pub type CoordinateMap = BTreeMap<String, GeoPoint>;

/// Immutable-once-loaded event collection, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    events: Vec<Event>,
}

impl Catalog {
    pub fn new(events: Vec<Event>) -> Self {
        Catalog { events }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Apply late-arriving coordinates by event id.
    ///
    /// Unknown ids are ignored and applying the same map twice changes
    /// nothing the second time. Returns how many events actually moved.
    pub fn merge_coordinates(&mut self, coordinates: &CoordinateMap) -> usize {
        let mut updated = 0;

        for event in &mut self.events {
            let Some(point) = coordinates.get(&event.id) else {
                continue;
            };
            if event.point() == Some(*point) {
                continue;
            }
            event.location.latitude = Some(point.latitude);
            event.location.longitude = Some(point.longitude);
            updated += 1;
        }

        updated
    }

    /// Coordinates already present on the events themselves.
    pub fn coordinates(&self) -> CoordinateMap {
        self.events
            .iter()
            .filter_map(|e| e.point().map(|p| (e.id.clone(), p)))
            .collect()
    }
}

impl From<Vec<Event>> for Catalog {
    fn from(events: Vec<Event>) -> Self {
        Catalog::new(events)
    }
}
