//! Shared fixtures for unit tests.

use chrono::NaiveDate;

use crate::event::{Event, Location};

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn make_event(id: &str, day: &str) -> Event {
    Event {
        id: id.to_string(),
        title: format!("Event {id}"),
        description: None,
        event_type: "Conference".to_string(),
        date: date(day),
        end_date: None,
        location: Location {
            country: "US".to_string(),
            country_name: None,
            country_icon: None,
            city: "Seattle".to_string(),
            address: None,
            latitude: None,
            longitude: None,
        },
        organizer: None,
        organizer_details: None,
        language: None,
        language_details: None,
        tags: vec![],
        price: None,
        online: false,
        speakers: None,
        url: None,
    }
}

pub fn located(mut event: Event, country: &str, city: &str) -> Event {
    event.location.country = country.to_string();
    event.location.city = city.to_string();
    event
}

pub fn tagged(mut event: Event, tags: &[&str]) -> Event {
    event.tags = tags.iter().map(|t| t.to_string()).collect();
    event
}
