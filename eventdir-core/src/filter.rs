//! Filter engine: derive the visible event set from the catalog and facet state.
//!
//! Facets combine with AND; values inside a multi-valued facet combine with
//! OR; an empty selection restricts nothing. Output keeps catalog order.
//! All date comparisons are by calendar day.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::catalog::Catalog;
use crate::event::Event;
use crate::facet::{Facet, FacetState, TimeWindow};

/// Events passing every facet, in catalog order.
pub fn filter<'a>(catalog: &'a Catalog, state: &FacetState, today: NaiveDate) -> Vec<&'a Event> {
    let criteria = Criteria::new(state, today);
    catalog
        .events()
        .iter()
        .filter(|e| criteria.accepts(e))
        .collect()
}

/// Same as `filter`, as positions into the catalog.
pub fn filter_indices(catalog: &Catalog, state: &FacetState, today: NaiveDate) -> Vec<usize> {
    let criteria = Criteria::new(state, today);
    catalog
        .events()
        .iter()
        .enumerate()
        .filter(|(_, e)| criteria.accepts(e))
        .map(|(i, _)| i)
        .collect()
}

/// Whether a single event passes the facet state.
pub fn matches(event: &Event, state: &FacetState, today: NaiveDate) -> bool {
    Criteria::new(state, today).accepts(event)
}

/// Events among an already-filtered set that start today or later.
pub fn active_count<'a, I>(events: I, today: NaiveDate) -> usize
where
    I: IntoIterator<Item = &'a Event>,
{
    events.into_iter().filter(|e| e.date >= today).count()
}

/// Facet state prepared for repeated matching.
struct Criteria<'s> {
    state: &'s FacetState,
    search: Option<String>,
    today: NaiveDate,
}

impl<'s> Criteria<'s> {
    fn new(state: &'s FacetState, today: NaiveDate) -> Self {
        Criteria {
            state,
            search: state.search_text().map(|s| s.trim().to_lowercase()),
            today,
        }
    }

    fn accepts(&self, event: &Event) -> bool {
        let state = self.state;

        let type_match = state.event_types.is_empty() || state.event_types.contains(&event.event_type);
        let country_match = state.countries.is_empty()
            || state.countries.contains(&event.location.country.to_lowercase());
        let city_match = state.cities.is_empty() || state.cities.contains(&event.location.city);
        let organizer_match = state.organizers.is_empty()
            || event
                .organizer
                .as_ref()
                .is_some_and(|o| state.organizers.contains(o));
        let language_match = state.languages.is_empty() || state.languages.contains(&event.language_id());
        let tags_match = state.tags.is_empty() || event.tags.iter().any(|t| state.tags.contains(t));
        let free_match = !state.free_only || event.is_free();
        let online_match = !state.online_only || event.online;

        type_match
            && country_match
            && city_match
            && organizer_match
            && language_match
            && tags_match
            && free_match
            && online_match
            && self.time_match(event)
            && self.search_match(event)
    }

    fn time_match(&self, event: &Event) -> bool {
        match self.state.time_window {
            TimeWindow::Future => event.date >= self.today,
            TimeWindow::Past => event.date < self.today,
            TimeWindow::All => true,
        }
    }

    fn search_match(&self, event: &Event) -> bool {
        let Some(query) = &self.search else {
            return true;
        };
        let contains = |text: &str| text.to_lowercase().contains(query.as_str());

        contains(&event.title)
            || contains(&event.location.city)
            || contains(&event.location.country)
            || event.tags.iter().any(|t| contains(t.as_str()))
    }
}

/// A selectable value of a facet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetOption {
    pub value: String,
    pub label: String,
}

/// Options offered for a facet given the catalog and current state.
///
/// Only the city facet depends on the state: it offers cities of the
/// selected countries (all cities when none is selected).
pub fn options_for(facet: Facet, state: &FacetState, catalog: &Catalog) -> Vec<FacetOption> {
    let mut seen: BTreeMap<String, String> = BTreeMap::new();

    for event in catalog.events() {
        match facet {
            Facet::EventType => {
                seen.entry(event.event_type.clone())
                    .or_insert_with(|| event.event_type.clone());
            }
            Facet::Country => {
                seen.entry(event.location.country.to_lowercase())
                    .or_insert_with(|| event.location.country_label().to_string());
            }
            Facet::City => {
                let country_selected = state.countries.is_empty()
                    || state.countries.contains(&event.location.country.to_lowercase());
                if country_selected {
                    seen.entry(event.location.city.clone())
                        .or_insert_with(|| event.location.city.clone());
                }
            }
            Facet::Organizer => {
                if let Some(organizer) = &event.organizer {
                    let label = event
                        .organizer_details
                        .as_ref()
                        .map(|d| d.name.clone())
                        .unwrap_or_else(|| organizer.clone());
                    seen.entry(organizer.clone()).or_insert(label);
                }
            }
            Facet::Language => {
                seen.entry(event.language_id())
                    .or_insert_with(|| event.language_label().to_string());
            }
            Facet::Tag => {
                for tag in &event.tags {
                    seen.entry(tag.clone()).or_insert_with(|| tag.clone());
                }
            }
        }
    }

    let mut options: Vec<FacetOption> = seen
        .into_iter()
        .map(|(value, label)| FacetOption { value, label })
        .collect();

    // Values are already sorted; label-driven facets sort for display
    if matches!(facet, Facet::Country | Facet::Organizer | Facet::Language) {
        options.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.value.cmp(&b.value)));
    }

    options
}
