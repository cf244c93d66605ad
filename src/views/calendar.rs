//! Month grid with per-day event counts.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, Months, NaiveDate};
use eventdir_core::{Event, View, ViewId};
use owo_colors::OwoColorize;

use super::{Screen, no_results, print_lines};

const WEEKDAYS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];
const CELL_WIDTH: usize = 6;

pub struct CalendarView {
    screen: Screen,
    month: NaiveDate,
    today: NaiveDate,
    activated: bool,
}

impl CalendarView {
    /// `month` may be any day of the month to show.
    pub fn new(screen: Screen, month: NaiveDate, today: NaiveDate) -> Self {
        CalendarView {
            screen,
            month: month.with_day(1).unwrap_or(month),
            today,
            activated: false,
        }
    }
}

impl View for CalendarView {
    fn id(&self) -> ViewId {
        ViewId::Calendar
    }

    fn activate(&mut self) {
        tracing::debug!(month = %self.month, "calendar activated");
        self.activated = true;
    }

    fn render(&mut self, events: &[&Event]) {
        if self.activated && self.screen.get() == ViewId::Calendar {
            print_lines(&render_month(events, self.month, self.today));
        }
    }
}

/// Last day of the month starting at `first`.
fn month_end(first: NaiveDate) -> NaiveDate {
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(first)
}

/// Events per day of the month. Multi-day events count on every day they cover.
pub fn day_counts(events: &[&Event], first: NaiveDate) -> BTreeMap<u32, usize> {
    let last = month_end(first);
    let mut counts = BTreeMap::new();

    for event in events {
        let mut day = event.date.max(first);
        let until = event.last_day().min(last);
        while day <= until {
            *counts.entry(day.day()).or_insert(0) += 1;
            match day.checked_add_days(Days::new(1)) {
                Some(next) => day = next,
                None => break,
            }
        }
    }

    counts
}

pub fn render_month(events: &[&Event], first: NaiveDate, today: NaiveDate) -> Vec<String> {
    let last = month_end(first);
    let counts = day_counts(events, first);

    let mut lines = vec![first.format("%B %Y").to_string().bold().to_string()];
    lines.push(
        WEEKDAYS
            .iter()
            .map(|d| format!("{d:<CELL_WIDTH$}"))
            .collect::<String>()
            .dimmed()
            .to_string(),
    );

    let mut row = " ".repeat(CELL_WIDTH * first.weekday().num_days_from_monday() as usize);
    for day in 1..=last.day() {
        let cell = match counts.get(&day) {
            Some(n) => format!("{:<CELL_WIDTH$}", format!("{day}({n})")),
            None => format!("{day:<CELL_WIDTH$}"),
        };
        let cell = if first.with_day(day) == Some(today) {
            cell.reversed().to_string()
        } else if counts.contains_key(&day) {
            cell.green().to_string()
        } else {
            cell
        };
        row.push_str(&cell);

        if first.with_day(day).is_some_and(|d| d.weekday().num_days_from_monday() == 6) {
            lines.push(row.trim_end().to_string());
            row = String::new();
        }
    }
    if !row.trim().is_empty() {
        lines.push(row.trim_end().to_string());
    }

    lines.push(String::new());
    if events.is_empty() {
        lines.push(no_results());
        return lines;
    }

    let in_month: Vec<&&Event> = events
        .iter()
        .filter(|e| e.date <= last && e.last_day() >= first)
        .collect();
    if in_month.is_empty() {
        lines.push(
            format!("No events in {}", first.format("%B %Y"))
                .dimmed()
                .to_string(),
        );
        return lines;
    }

    for event in in_month {
        lines.push(format!(
            "{}  {} {}",
            event.date.format("%b %d").to_string().dimmed(),
            event.title,
            format!("({})", event.location.city).dimmed()
        ));
    }
    lines
}
