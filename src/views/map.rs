//! Equirectangular world plot with one marker per located event.

use std::collections::BTreeMap;

use eventdir_core::{Event, GeoPoint, View, ViewId};
use owo_colors::OwoColorize;

use super::{Screen, no_results, pluralize, print_lines};

const WIDTH: usize = 60;
const HEIGHT: usize = 18;

pub struct MapView {
    screen: Screen,
}

impl MapView {
    pub fn new(screen: Screen) -> Self {
        MapView { screen }
    }
}

impl View for MapView {
    fn id(&self) -> ViewId {
        ViewId::Map
    }

    fn render(&mut self, events: &[&Event]) {
        if self.screen.get() == ViewId::Map {
            print_lines(&render_map(events));
        }
    }
}

/// Grid cell (column, row) for a point.
pub fn project(point: GeoPoint) -> (usize, usize) {
    let lon = point.longitude.clamp(-180.0, 180.0);
    let lat = point.latitude.clamp(-90.0, 90.0);
    let col = ((lon + 180.0) / 360.0 * (WIDTH - 1) as f64).round() as usize;
    let row = ((90.0 - lat) / 180.0 * (HEIGHT - 1) as f64).round() as usize;
    (col.min(WIDTH - 1), row.min(HEIGHT - 1))
}

fn marker(count: usize) -> char {
    match count {
        0 => ' ',
        1..=9 => char::from_digit(count as u32, 10).unwrap_or('+'),
        _ => '+',
    }
}

pub fn render_map(events: &[&Event]) -> Vec<String> {
    if events.is_empty() {
        return vec![no_results()];
    }

    let placed: Vec<(&Event, GeoPoint)> = events
        .iter()
        .filter_map(|e| e.point().map(|p| (*e, p)))
        .collect();
    let unplaced = events.len() - placed.len();

    let mut cells: BTreeMap<(usize, usize), usize> = BTreeMap::new();
    for (_, point) in &placed {
        *cells.entry(project(*point)).or_insert(0) += 1;
    }

    let border = format!("+{}+", "-".repeat(WIDTH));
    let mut lines = vec![border.dimmed().to_string()];
    for row in 0..HEIGHT {
        let line: String = (0..WIDTH)
            .map(|col| marker(cells.get(&(col, row)).copied().unwrap_or(0)))
            .collect();
        lines.push(format!("{}{}{}", "|".dimmed(), line.red(), "|".dimmed()));
    }
    lines.push(border.dimmed().to_string());

    for (event, point) in &placed {
        lines.push(format!(
            "{} {:>7.2}, {:>7.2}  {} {}",
            "●".red(),
            point.latitude,
            point.longitude,
            event.title,
            format!("({})", event.location.city).dimmed()
        ));
    }

    if placed.is_empty() {
        lines.push("No coordinates available for these events.".dimmed().to_string());
    }
    if unplaced > 0 {
        lines.push(
            format!("{} without coordinates", pluralize(unplaced, "event"))
                .dimmed()
                .to_string(),
        );
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::NO_RESULTS;
    use crate::views::fixtures::make_event;

    fn point(latitude: f64, longitude: f64) -> GeoPoint {
        GeoPoint {
            latitude,
            longitude,
        }
    }

    #[test]
    fn test_project_corners() {
        assert_eq!(project(point(90.0, -180.0)), (0, 0));
        assert_eq!(project(point(-90.0, 180.0)), (WIDTH - 1, HEIGHT - 1));
        assert_eq!(project(point(0.0, 0.0)), ((WIDTH - 1) / 2 + 1, (HEIGHT - 1) / 2 + 1));
        // Out-of-range input is clamped
        assert_eq!(project(point(120.0, 400.0)), (WIDTH - 1, 0));
    }

    #[test]
    fn test_markers_and_unplaced_count() {
        let mut berlin = make_event("berlin", "2025-03-20");
        berlin.location.latitude = Some(52.52);
        berlin.location.longitude = Some(13.40);
        let nowhere = make_event("nowhere", "2025-03-21");

        let lines = render_map(&[&berlin, &nowhere]);
        assert_eq!(lines.len(), HEIGHT + 2 + 2);
        assert!(lines.iter().any(|l| l.contains("Event berlin")));
        assert!(lines.iter().any(|l| l.contains("1 event without coordinates")));
        assert!(!lines.iter().any(|l| l.contains("Event nowhere")));
    }

    #[test]
    fn test_no_coordinates_yet() {
        let event = make_event("a", "2025-03-20");
        let lines = render_map(&[&event]);
        assert!(lines.iter().any(|l| l.contains("No coordinates available")));
    }

    #[test]
    fn test_empty_map_says_so() {
        assert!(render_map(&[])[0].contains(NO_RESULTS));
    }
}
