//! Event cards, one per filtered event.

use eventdir_core::{Event, View, ViewId};
use owo_colors::OwoColorize;

use super::{Screen, date_range, no_results, pluralize, print_lines};

pub struct ListView {
    screen: Screen,
}

impl ListView {
    pub fn new(screen: Screen) -> Self {
        ListView { screen }
    }
}

impl View for ListView {
    fn id(&self) -> ViewId {
        ViewId::List
    }

    fn render(&mut self, events: &[&Event]) {
        if self.screen.get() == ViewId::List {
            print_lines(&render_list(events));
        }
    }

    fn focus(&mut self, event: &Event) {
        println!();
        println!("{}", "▶ Linked event".yellow().bold());
        print_lines(&render_card(event, true));
    }
}

pub fn render_list(events: &[&Event]) -> Vec<String> {
    if events.is_empty() {
        return vec![no_results()];
    }

    let mut lines = vec![pluralize(events.len(), "event").bold().to_string()];
    for event in events {
        lines.push(String::new());
        lines.extend(render_card(event, false));
    }
    lines
}

pub fn render_card(event: &Event, highlighted: bool) -> Vec<String> {
    let mut lines = Vec::new();

    let mut badges = vec![event.date.format("%Y-%m-%d").to_string().dimmed().to_string()];
    badges.push(event.event_type.cyan().to_string());
    if event.online {
        badges.push("Online".green().to_string());
    }
    lines.push(badges.join("  "));

    let title = if highlighted {
        event.title.yellow().bold().to_string()
    } else {
        event.title.bold().to_string()
    };
    lines.push(title);

    lines.push(event.organizer_label().to_string());

    let mut place = vec![date_range(event)];
    let location = &event.location;
    let city_country = [location.city.as_str(), location.country_label()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    if !city_country.is_empty() {
        place.push(city_country);
    }
    lines.push(place.join(" · "));

    lines.push(format!(
        "{}  {}  {}",
        event.price_label(),
        format!("Speakers: {}", event.speakers_label()).dimmed(),
        event.language_label().dimmed()
    ));

    if !event.tags.is_empty() {
        let tags: Vec<String> = event.tags.iter().map(|t| format!("#{t}")).collect();
        lines.push(tags.join(" ").blue().to_string());
    }

    if let Some(ref url) = event.url {
        lines.push(url.underline().to_string());
    }

    lines.push(format!("id: {}", event.id).dimmed().to_string());

    let marker = if highlighted { "┃ ".yellow().to_string() } else { "  ".to_string() };
    lines.into_iter().map(|line| format!("{marker}{line}")).collect()
}
