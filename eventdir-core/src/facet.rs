//! Facet state: the complete set of active filter selections.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::filter::options_for;

/// Selected values of a multi-valued facet.
///
/// Membership is what matters; equality ignores order. Insertion order is
/// kept so an encoded query lists values the way the user picked them.
pub type Selection = IndexSet<String>;

/// Which events to show relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    #[default]
    Future,
    Past,
    All,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Future => "future",
            TimeWindow::Past => "past",
            TimeWindow::All => "all",
        }
    }

    /// Parse a query value. Anything unrecognized restricts nothing, so it
    /// reads as `All`.
    pub fn from_param(value: &str) -> Self {
        match value {
            "future" => TimeWindow::Future,
            "past" => TimeWindow::Past,
            _ => TimeWindow::All,
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A multi-valued facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    EventType,
    Country,
    City,
    Organizer,
    Language,
    Tag,
}

impl Facet {
    pub const ALL: [Facet; 6] = [
        Facet::EventType,
        Facet::Country,
        Facet::City,
        Facet::Organizer,
        Facet::Language,
        Facet::Tag,
    ];

    /// Query parameter carrying this facet.
    pub fn param(&self) -> &'static str {
        match self {
            Facet::EventType => "type",
            Facet::Country => "country",
            Facet::City => "city",
            Facet::Organizer => "organizer",
            Facet::Language => "language",
            Facet::Tag => "tags",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.param())
    }
}

impl FromStr for Facet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "type" | "types" => Ok(Facet::EventType),
            "country" | "countries" => Ok(Facet::Country),
            "city" | "cities" => Ok(Facet::City),
            "organizer" | "organizers" => Ok(Facet::Organizer),
            "language" | "languages" => Ok(Facet::Language),
            "tag" | "tags" => Ok(Facet::Tag),
            other => Err(format!(
                "Unknown facet '{other}'. Expected one of: type, country, city, organizer, language, tags"
            )),
        }
    }
}

/// All active filter selections. Empty selections restrict nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacetState {
    /// Never blank when set
    pub search: Option<String>,
    pub event_types: Selection,
    pub countries: Selection,
    pub cities: Selection,
    pub organizers: Selection,
    pub languages: Selection,
    pub tags: Selection,
    pub time_window: TimeWindow,
    pub free_only: bool,
    pub online_only: bool,
}

/// A single user-driven mutation of the facet state.
#[derive(Debug, Clone, PartialEq)]
pub enum FacetChange {
    /// Replace the search text (blank clears it)
    Search(String),
    /// Replace a facet's whole selection
    Select(Facet, Vec<String>),
    /// Add the value if absent, remove it if present
    Toggle(Facet, String),
    TimeWindow(TimeWindow),
    FreeOnly(bool),
    OnlineOnly(bool),
    /// Back to defaults
    Reset,
}

impl FacetState {
    pub fn is_default(&self) -> bool {
        *self == FacetState::default()
    }

    pub fn selection(&self, facet: Facet) -> &Selection {
        match facet {
            Facet::EventType => &self.event_types,
            Facet::Country => &self.countries,
            Facet::City => &self.cities,
            Facet::Organizer => &self.organizers,
            Facet::Language => &self.languages,
            Facet::Tag => &self.tags,
        }
    }

    pub fn selection_mut(&mut self, facet: Facet) -> &mut Selection {
        match facet {
            Facet::EventType => &mut self.event_types,
            Facet::Country => &mut self.countries,
            Facet::City => &mut self.cities,
            Facet::Organizer => &mut self.organizers,
            Facet::Language => &mut self.languages,
            Facet::Tag => &mut self.tags,
        }
    }

    /// Non-blank search text, if any.
    pub fn search_text(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Apply a mutation. Returns whether anything changed.
    ///
    /// Changing the country selection drops selected cities that are no
    /// longer offered under the new countries.
    pub fn apply(&mut self, change: FacetChange, catalog: &Catalog) -> bool {
        let before = self.clone();

        let touches_countries = match change {
            FacetChange::Search(text) => {
                self.search = if text.trim().is_empty() {
                    None
                } else {
                    Some(text)
                };
                false
            }
            FacetChange::Select(facet, values) => {
                *self.selection_mut(facet) = values
                    .into_iter()
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect();
                facet == Facet::Country
            }
            FacetChange::Toggle(facet, value) => {
                let value = value.trim();
                if value.is_empty() {
                    return false;
                }
                let selection = self.selection_mut(facet);
                if !selection.shift_remove(value) {
                    selection.insert(value.to_string());
                }
                facet == Facet::Country
            }
            FacetChange::TimeWindow(window) => {
                self.time_window = window;
                false
            }
            FacetChange::FreeOnly(on) => {
                self.free_only = on;
                false
            }
            FacetChange::OnlineOnly(on) => {
                self.online_only = on;
                false
            }
            FacetChange::Reset => {
                *self = FacetState::default();
                false
            }
        };

        if touches_countries {
            self.prune_cities(catalog);
        }

        *self != before
    }

    /// Drop selected cities that the current country selection no longer offers.
    pub fn prune_cities(&mut self, catalog: &Catalog) -> Vec<String> {
        if self.cities.is_empty() {
            return Vec::new();
        }

        let offered: IndexSet<String> = options_for(Facet::City, self, catalog)
            .into_iter()
            .map(|o| o.value)
            .collect();

        let pruned: Vec<String> = self
            .cities
            .iter()
            .filter(|c| !offered.contains(*c))
            .cloned()
            .collect();
        self.cities.retain(|c| offered.contains(c));
        pruned
    }
}
