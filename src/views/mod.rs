//! Terminal renderings of the filtered event set.
//!
//! Every view keeps receiving dispatches once activated, but only the one on
//! screen prints. Switching screens goes through `Dispatcher::show`, which
//! replays the current set to the newly visible view.

pub mod calendar;
pub mod list;
pub mod map;

use std::cell::Cell;
use std::rc::Rc;

use chrono::{Datelike, NaiveDate};
use eventdir_core::{Address, Dispatcher, Event, ViewId};
use owo_colors::OwoColorize;

/// Which view currently owns the terminal
pub type Screen = Rc<Cell<ViewId>>;

pub const NO_RESULTS: &str = "No events match the current filters.";

/// Register list, calendar and map views sharing one screen.
pub fn register_all<A: Address>(
    dispatcher: &mut Dispatcher<A>,
    screen: &Screen,
    month: NaiveDate,
    today: NaiveDate,
) {
    dispatcher.register(Box::new(list::ListView::new(screen.clone())));
    dispatcher.register(Box::new(calendar::CalendarView::new(
        screen.clone(),
        month,
        today,
    )));
    dispatcher.register(Box::new(map::MapView::new(screen.clone())));
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

pub fn no_results() -> String {
    NO_RESULTS.dimmed().to_string()
}

/// "Sep 2, 2025", "Sep 2 - 4, 2025", "Sep 30 - Oct 2, 2025" or
/// "Dec 30, 2025 - Jan 2, 2026"
pub fn date_range(event: &Event) -> String {
    let start = event.date;
    let end = event.last_day();

    if start == end {
        start.format("%b %-d, %Y").to_string()
    } else if start.year() != end.year() {
        format!("{} - {}", start.format("%b %-d, %Y"), end.format("%b %-d, %Y"))
    } else if start.month() != end.month() {
        format!("{} - {}", start.format("%b %-d"), end.format("%b %-d, %Y"))
    } else {
        format!("{} - {}", start.format("%b %-d"), end.format("%-d, %Y"))
    }
}

pub fn pluralize(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}
