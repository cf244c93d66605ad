//! Event records as served by the catalog source.
//!
//! Records are read-only once loaded. The only in-place change a record ever
//! sees is coordinate enrichment (see `Catalog::merge_coordinates`).
//!
//! Fields that arrive in several shapes (price, speakers, language) are
//! resolved through small helpers with a fixed precedence instead of being
//! inspected inline by callers.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Language id assumed when an event declares none.
pub const DEFAULT_LANGUAGE: &str = "en";

/// A directory event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Stable identifier (the event's directory name in the store)
    #[serde(default)]
    pub id: String,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Open enumeration: "Conference", "Exhibition", "Meetup", ...
    #[serde(rename = "type", alias = "event_type")]
    pub event_type: String,
    pub date: NaiveDate,
    /// Absent for single-day events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub location: Location,

    // Organizer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer_details: Option<OrganizerDetails>,

    // Language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_details: Option<LanguageDetails>,

    #[serde(default)]
    pub tags: Vec<String>,
    /// None means the price is unknown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default)]
    pub online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speakers: Option<Speakers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_icon: Option<String>,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Location {
    /// Coordinates, if both halves are known.
    pub fn point(&self) -> Option<GeoPoint> {
        Some(GeoPoint {
            latitude: self.latitude?,
            longitude: self.longitude?,
        })
    }

    /// Human-readable country: the explicit name, else the raw code.
    pub fn country_label(&self) -> &str {
        self.country_name.as_deref().unwrap_or(&self.country)
    }
}

/// A latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizerDetails {
    pub name: String,
    #[serde(default, alias = "image_url", skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Ticket price in one of the shapes the catalog uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Range {
        min_amount: f64,
        max_amount: f64,
        #[serde(default)]
        currency: String,
    },
    Fixed {
        amount: f64,
        #[serde(default)]
        currency: String,
    },
    /// Free-form label, usually "free"
    Label(String),
}

impl Price {
    /// "free"/"Free", or a structured price starting at exactly zero.
    pub fn is_free(&self) -> bool {
        match self {
            Price::Label(label) => label == "free" || label == "Free",
            Price::Fixed { amount, .. } => *amount == 0.0,
            Price::Range { min_amount, .. } => *min_amount == 0.0,
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Label(_) if self.is_free() => write!(f, "Free"),
            Price::Label(label) => write!(f, "{label}"),
            Price::Range {
                min_amount,
                max_amount,
                currency,
            } => write!(
                f,
                "{} - {} {}",
                format_amount(*min_amount),
                format_amount(*max_amount),
                currency
            ),
            Price::Fixed { amount, currency } => {
                write!(f, "{} {}", format_amount(*amount), currency)
            }
        }
    }
}

/// Speaker count in one of the shapes the catalog uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Speakers {
    Count(u32),
    Detailed {
        #[serde(default)]
        number: Option<u32>,
        #[serde(default, alias = "more")]
        has_more: bool,
    },
    Text(String),
}

impl Event {
    /// Language id used for filtering: details id, else lowercased raw
    /// language, else `DEFAULT_LANGUAGE`.
    pub fn language_id(&self) -> String {
        if let Some(id) = self.language_details.as_ref().and_then(|d| d.id.as_ref()) {
            return id.clone();
        }
        match &self.language {
            Some(lang) if !lang.is_empty() => lang.to_lowercase(),
            _ => DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Language for display: details name, else raw language, else "English".
    pub fn language_label(&self) -> &str {
        if let Some(details) = &self.language_details {
            return &details.name;
        }
        match self.language.as_deref() {
            Some(lang) if !lang.is_empty() => lang,
            _ => "English",
        }
    }

    pub fn organizer_label(&self) -> &str {
        self.organizer_details
            .as_ref()
            .map(|d| d.name.as_str())
            .unwrap_or("Unknown Organizer")
    }

    pub fn is_free(&self) -> bool {
        self.price.as_ref().is_some_and(Price::is_free)
    }

    pub fn price_label(&self) -> String {
        match &self.price {
            Some(price) => price.to_string(),
            None => "Contact for price".to_string(),
        }
    }

    pub fn speakers_label(&self) -> String {
        match &self.speakers {
            None | Some(Speakers::Count(0)) => "TBA".to_string(),
            Some(Speakers::Count(n)) => n.to_string(),
            Some(Speakers::Detailed {
                number: Some(n),
                has_more,
            }) => {
                if *has_more {
                    format!("{n}+")
                } else {
                    n.to_string()
                }
            }
            Some(Speakers::Detailed { number: None, .. }) => "TBA".to_string(),
            Some(Speakers::Text(text)) => text.clone(),
        }
    }

    /// Last calendar day the event covers (inclusive).
    pub fn last_day(&self) -> NaiveDate {
        self.end_date.unwrap_or(self.date).max(self.date)
    }

    pub fn is_multi_day(&self) -> bool {
        self.last_day() > self.date
    }

    pub fn point(&self) -> Option<GeoPoint> {
        self.location.point()
    }
}

/// Format an amount with a space as thousands separator ("12 500").
fn format_amount(amount: f64) -> String {
    let negative = amount < 0.0;
    let abs = amount.abs();

    let (whole, fraction) = if abs.fract() == 0.0 {
        (format!("{abs:.0}"), None)
    } else {
        let formatted = format!("{abs:.2}");
        match formatted.split_once('.') {
            Some((w, f)) => (w.to_string(), Some(f.to_string())),
            None => (formatted, None),
        }
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(&fraction);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event_from(value: serde_json::Value) -> Event {
        serde_json::from_value(value).unwrap()
    }

    fn base() -> serde_json::Value {
        json!({
            "id": "rustconf",
            "title": "RustConf",
            "type": "Conference",
            "date": "2025-09-02",
            "location": { "country": "US", "city": "Seattle" },
            "tags": ["rust"]
        })
    }

    #[test]
    fn test_minimal_event_defaults() {
        let event = event_from(base());
        assert_eq!(event.event_type, "Conference");
        assert!(event.end_date.is_none());
        assert!(!event.online);
        assert!(event.price.is_none());
        assert_eq!(event.price_label(), "Contact for price");
        assert_eq!(event.speakers_label(), "TBA");
        assert_eq!(event.organizer_label(), "Unknown Organizer");
    }

    #[test]
    fn test_name_is_accepted_as_title() {
        let mut value = base();
        value.as_object_mut().unwrap().remove("title");
        value["name"] = json!("Named Event");
        assert_eq!(event_from(value).title, "Named Event");
    }

    #[test]
    fn test_price_shapes() {
        let free: Price = serde_json::from_value(json!("free")).unwrap();
        assert!(free.is_free());
        assert_eq!(free.to_string(), "Free");

        let fixed: Price = serde_json::from_value(json!({"amount": 1500, "currency": "EUR"})).unwrap();
        assert!(!fixed.is_free());
        assert_eq!(fixed.to_string(), "1 500 EUR");

        let range: Price =
            serde_json::from_value(json!({"min_amount": 0, "max_amount": 12500, "currency": "SEK"}))
                .unwrap();
        assert!(range.is_free());
        assert_eq!(range.to_string(), "0 - 12 500 SEK");

        let zero: Price = serde_json::from_value(json!({"amount": 0, "currency": "USD"})).unwrap();
        assert!(zero.is_free());
    }

    #[test]
    fn test_price_label_text_passes_through() {
        let label: Price = serde_json::from_value(json!("Donation")).unwrap();
        assert!(!label.is_free());
        assert_eq!(label.to_string(), "Donation");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(999.0), "999");
        assert_eq!(format_amount(1000.0), "1 000");
        assert_eq!(format_amount(1234567.0), "1 234 567");
        assert_eq!(format_amount(1234.5), "1 234.50");
    }

    #[test]
    fn test_speakers_labels() {
        let mut event = event_from(base());
        event.speakers = Some(Speakers::Count(12));
        assert_eq!(event.speakers_label(), "12");

        event.speakers = serde_json::from_value(json!({"number": 30, "more": true})).unwrap();
        assert_eq!(event.speakers_label(), "30+");

        event.speakers = serde_json::from_value(json!({"number": 4})).unwrap();
        assert_eq!(event.speakers_label(), "4");

        event.speakers = Some(Speakers::Text("Many".into()));
        assert_eq!(event.speakers_label(), "Many");
    }

    #[test]
    fn test_language_resolution_precedence() {
        let mut event = event_from(base());
        assert_eq!(event.language_id(), "en");
        assert_eq!(event.language_label(), "English");

        event.language = Some("DE".into());
        assert_eq!(event.language_id(), "de");
        assert_eq!(event.language_label(), "DE");

        event.language_details = Some(LanguageDetails {
            id: Some("de-at".into()),
            name: "Austrian German".into(),
            icon: None,
        });
        assert_eq!(event.language_id(), "de-at");
        assert_eq!(event.language_label(), "Austrian German");
    }

    #[test]
    fn test_last_day_never_precedes_start() {
        let mut event = event_from(base());
        assert!(!event.is_multi_day());

        event.end_date = NaiveDate::from_ymd_opt(2025, 9, 4);
        assert!(event.is_multi_day());
        assert_eq!(event.last_day(), NaiveDate::from_ymd_opt(2025, 9, 4).unwrap());

        event.end_date = NaiveDate::from_ymd_opt(2025, 9, 1);
        assert_eq!(event.last_day(), event.date);
    }

    #[test]
    fn test_point_requires_both_coordinates() {
        let mut event = event_from(base());
        assert!(event.point().is_none());
        event.location.latitude = Some(47.6);
        assert!(event.point().is_none());
        event.location.longitude = Some(-122.3);
        assert_eq!(
            event.point(),
            Some(GeoPoint {
                latitude: 47.6,
                longitude: -122.3
            })
        );
    }
}
