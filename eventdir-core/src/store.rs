//! On-disk event store.
//!
//! ```text
//! <data_dir>/
//!   events/<id>/event.toml          (+ description.md)
//!   <id>/event.toml                 (legacy top-level layout)
//!   organizers/<id>/organizer.toml  (+ description.md, image.png)
//!   coordinates.toml                (id => { latitude, longitude })
//! ```
//!
//! Dates in `event.toml` are quoted strings (`date = "2025-09-02"`).
//! A malformed event or organizer is logged and skipped.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::catalog::{Catalog, CoordinateMap};
use crate::error::{EventDirError, EventDirResult};
use crate::event::{Event, OrganizerDetails};

const EVENTS_DIR: &str = "events";
const ORGANIZERS_DIR: &str = "organizers";
const EVENT_FILE: &str = "event.toml";
const ORGANIZER_FILE: &str = "organizer.toml";
const DESCRIPTION_FILE: &str = "description.md";
const IMAGE_FILE: &str = "image.png";
const COORDINATES_FILE: &str = "coordinates.toml";

/// Top-level directories that never hold an event.
const RESERVED_DIRS: [&str; 4] = [EVENTS_DIR, ORGANIZERS_DIR, "static", "templates"];

/// An organizer directory
#[derive(Debug, Clone, PartialEq)]
pub struct Organizer {
    /// Directory name
    pub id: String,
    pub name: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub has_image: bool,
}

impl Organizer {
    pub fn image_url(&self) -> Option<String> {
        self.has_image
            .then(|| format!("/organizer/{}/{IMAGE_FILE}", self.id))
    }

    fn details(&self) -> OrganizerDetails {
        OrganizerDetails {
            name: self.name.clone(),
            icon_url: self.image_url(),
            url: self.url.clone(),
        }
    }
}

#[derive(Deserialize)]
struct OrganizerRecord {
    name: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Load every organizer, keyed by lowercased id.
pub fn load_organizers(data_dir: &Path) -> BTreeMap<String, Organizer> {
    let mut organizers = BTreeMap::new();

    for dir in subdirectories(&data_dir.join(ORGANIZERS_DIR)) {
        let Some(id) = dir_name(&dir) else {
            continue;
        };
        let path = dir.join(ORGANIZER_FILE);
        if !path.exists() {
            continue;
        }

        let record: OrganizerRecord = match read_toml(&path) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Skipping organizer {id}: {e}");
                continue;
            }
        };

        let description = read_description(&dir).or(record.description);
        organizers.insert(
            id.to_lowercase(),
            Organizer {
                has_image: dir.join(IMAGE_FILE).is_file(),
                id,
                name: record.name,
                url: record.url,
                description,
            },
        );
    }

    organizers
}

/// Load every event, linked to its organizer and sorted by start date.
///
/// Fails only when the data directory itself cannot be read.
pub fn load_catalog(data_dir: &Path) -> EventDirResult<Catalog> {
    if !data_dir.is_dir() {
        return Err(EventDirError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Data directory {} does not exist", data_dir.display()),
        )));
    }

    let organizers = load_organizers(data_dir);

    let current: Vec<PathBuf> = subdirectories(&data_dir.join(EVENTS_DIR))
        .into_iter()
        .filter(|dir| dir.join(EVENT_FILE).is_file())
        .collect();
    let current_ids: BTreeSet<String> = current.iter().filter_map(|dir| dir_name(dir)).collect();

    // A legacy directory is shadowed by an events/ entry of the same id
    let legacy = subdirectories(data_dir).into_iter().filter(|dir| {
        dir.join(EVENT_FILE).is_file()
            && dir_name(dir).is_some_and(|name| {
                !RESERVED_DIRS.contains(&name.as_str()) && !current_ids.contains(&name)
            })
    });
    let event_dirs: Vec<PathBuf> = current.into_iter().chain(legacy).collect();

    let mut events = Vec::with_capacity(event_dirs.len());
    for dir in event_dirs {
        match load_event(&dir) {
            Ok(mut event) => {
                link_organizer(&mut event, &organizers);
                events.push(event);
            }
            Err(e) => tracing::warn!("Skipping event: {e}"),
        }
    }

    // Stable, so same-day events keep directory order
    events.sort_by_key(|e| e.date);

    tracing::debug!(count = events.len(), "Loaded events from {}", data_dir.display());
    Ok(Catalog::new(events))
}

/// Load one event directory. The id is the directory name.
pub fn load_event(dir: &Path) -> EventDirResult<Event> {
    let id = dir_name(dir).ok_or_else(|| EventDirError::Parse {
        path: dir.to_path_buf(),
        message: "Directory name is not valid UTF-8".into(),
    })?;

    let mut event: Event = read_toml(&dir.join(EVENT_FILE))?;
    event.id = id;
    if let Some(description) = read_description(dir) {
        event.description = Some(description);
    }

    Ok(event)
}

fn link_organizer(event: &mut Event, organizers: &BTreeMap<String, Organizer>) {
    if event.organizer_details.is_some() {
        return;
    }
    let Some(ref id) = event.organizer else {
        return;
    };
    if let Some(organizer) = organizers.get(&id.to_lowercase()) {
        event.organizer_details = Some(organizer.details());
    }
}

/// Coordinates file contents. A missing file is an empty map.
pub fn load_coordinates(data_dir: &Path) -> EventDirResult<CoordinateMap> {
    let path = data_dir.join(COORDINATES_FILE);
    if !path.exists() {
        return Ok(CoordinateMap::new());
    }
    read_toml(&path)
}

/// Enrichment payload: inline event coordinates overlaid with the
/// coordinates file.
pub fn coordinate_map(data_dir: &Path, catalog: &Catalog) -> EventDirResult<CoordinateMap> {
    let mut map = catalog.coordinates();
    map.extend(load_coordinates(data_dir)?);
    Ok(map)
}

/// Path of an organizer's image, if it exists.
pub fn organizer_image_path(data_dir: &Path, organizer_id: &str) -> Option<PathBuf> {
    if organizer_id.is_empty()
        || organizer_id.starts_with('.')
        || organizer_id.contains(['/', '\\'])
    {
        return None;
    }
    let path = data_dir
        .join(ORGANIZERS_DIR)
        .join(organizer_id)
        .join(IMAGE_FILE);
    path.is_file().then_some(path)
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> EventDirResult<T> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| EventDirError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn read_description(dir: &Path) -> Option<String> {
    std::fs::read_to_string(dir.join(DESCRIPTION_FILE))
        .ok()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Subdirectories sorted by path. Missing or unreadable dirs yield nothing.
fn subdirectories(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    dirs
}

fn dir_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
}
