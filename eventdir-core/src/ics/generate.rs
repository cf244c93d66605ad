//! ICS file generation.

use chrono::{Days, NaiveDate};
use icalendar::{Calendar, Component, EventLike, Property, ValueType};

use crate::error::{EventDirError, EventDirResult};
use crate::event::Event;

/// Calendar-level settings for exported files
#[derive(Debug, Clone)]
pub struct IcsOptions {
    /// Domain part of every UID (`<event-id>@<uid_domain>`)
    pub uid_domain: String,
    /// X-WR-CALNAME of the whole-catalog export
    pub calendar_name: String,
    pub prod_id: String,
}

impl Default for IcsOptions {
    fn default() -> Self {
        IcsOptions {
            uid_domain: "eventdir.local".to_string(),
            calendar_name: "EventDir Events".to_string(),
            prod_id: "-//EventDir//eventdir//EN".to_string(),
        }
    }
}

/// Generate .ics content for a single event
pub fn generate_event_ics(event: &Event, opts: &IcsOptions) -> EventDirResult<String> {
    let mut cal = Calendar::new();
    cal.push(build_ics_event(event, opts)?);
    let cal = cal.done();

    Ok(strip_ics_bloat(&cal.to_string(), &opts.prod_id))
}

/// Generate one .ics file holding every given event
pub fn generate_catalog_ics<'a, I>(events: I, opts: &IcsOptions) -> EventDirResult<String>
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut cal = Calendar::new();
    cal.append_property(Property::new("X-WR-CALNAME", &opts.calendar_name));

    for event in events {
        cal.push(build_ics_event(event, opts)?);
    }
    let cal = cal.done();

    Ok(strip_ics_bloat(&cal.to_string(), &opts.prod_id))
}

fn build_ics_event(event: &Event, opts: &IcsOptions) -> EventDirResult<icalendar::Event> {
    if event.id.is_empty() {
        return Err(EventDirError::IcsGenerate(format!(
            "Event '{}' has no id to build a UID from",
            event.title
        )));
    }

    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&format!("{}@{}", event.id, opts.uid_domain));
    ics_event.summary(&event.title);

    // DTSTAMP - required by RFC 5545
    let dtstamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
    ics_event.add_property("DTSTAMP", &dtstamp);

    // All-day events: DTEND is exclusive, so it is the day after the last day
    add_date_property(&mut ics_event, "DTSTART", event.date);
    if event.is_multi_day() {
        if let Some(end) = event.last_day().checked_add_days(Days::new(1)) {
            add_date_property(&mut ics_event, "DTEND", end);
        }
    }

    let location = location_line(event);
    if !location.is_empty() {
        ics_event.location(&location);
    }

    ics_event.description(&description(event));

    if let Some(ref url) = event.url {
        ics_event.add_property("URL", url);
    }

    // ORGANIZER
    if let Some(ref organizer) = event.organizer {
        let details = event.organizer_details.as_ref();
        let value = details
            .and_then(|d| d.url.clone())
            .unwrap_or_else(|| organizer.clone());
        let mut prop = Property::new("ORGANIZER", &value);
        if let Some(details) = details {
            prop.add_parameter("CN", &details.name);
        }
        ics_event.append_property(prop);
    }

    Ok(ics_event.done())
}

/// "address, city, country" with missing parts dropped
fn location_line(event: &Event) -> String {
    let location = &event.location;
    [
        location.address.as_deref().unwrap_or(""),
        location.city.as_str(),
        location.country.as_str(),
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(", ")
}

/// Event description followed by one "Label: value" line per known field
fn description(event: &Event) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(ref desc) = event.description {
        parts.push(desc.clone());
        parts.push(String::new());
    }

    let online = if event.online { "Yes" } else { "No" };
    let tags = event.tags.join(", ");
    let fields: [(&str, Option<String>); 8] = [
        ("Organizer", event.organizer.clone()),
        ("Type", Some(event.event_type.clone())),
        ("Online", Some(online.to_string())),
        ("Language", event.language.clone()),
        ("Speakers", event.speakers.as_ref().map(|_| event.speakers_label())),
        ("URL", event.url.clone()),
        ("Tags", Some(tags).filter(|t| !t.is_empty())),
        ("Price", event.price.as_ref().map(|p| p.to_string())),
    ];

    for (label, value) in fields {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            parts.push(format!("{label}: {value}"));
        }
    }

    parts.join("\n")
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with ours
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str, prod_id: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:");
            result.push_str(prod_id);
            result.push_str("\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

/// Add an all-day date property (`NAME;VALUE=DATE:YYYYMMDD`)
fn add_date_property(ics_event: &mut icalendar::Event, name: &str, date: NaiveDate) {
    let mut prop = Property::new(name, date.format("%Y%m%d").to_string());
    prop.append_parameter(ValueType::Date);
    ics_event.append_property(prop);
}
