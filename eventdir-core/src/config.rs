//! Global eventdir configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{EventDirError, EventDirResult};
use crate::ics::IcsOptions;

static DEFAULT_DATA_DIR: &str = "~/events";
static DEFAULT_SERVER_URL: &str = "http://127.0.0.1:4097";
static DEFAULT_BIND: &str = "127.0.0.1:4097";
static DEFAULT_CALENDAR_NAME: &str = "EventDir Events";
static DEFAULT_UID_DOMAIN: &str = "eventdir.local";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_calendar_name() -> String {
    DEFAULT_CALENDAR_NAME.to_string()
}

fn default_uid_domain() -> String {
    DEFAULT_UID_DOMAIN.to_string()
}

/// Configuration at ~/.config/eventdir/config.toml, overridable with
/// `EVENTDIR_*` environment variables (e.g. `EVENTDIR_DATA_DIR`).
#[derive(Debug, Deserialize, Clone)]
pub struct EventDirConfig {
    /// Root of the event store
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Where the CLI fetches the catalog from
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Address the server listens on
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_calendar_name")]
    pub calendar_name: String,

    #[serde(default = "default_uid_domain")]
    pub uid_domain: String,
}

impl Default for EventDirConfig {
    fn default() -> Self {
        EventDirConfig {
            data_dir: default_data_dir(),
            server_url: default_server_url(),
            bind: default_bind(),
            calendar_name: default_calendar_name(),
            uid_domain: default_uid_domain(),
        }
    }
}

impl EventDirConfig {
    pub fn config_path() -> EventDirResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| EventDirError::Config("Could not determine config directory".into()))?
            .join("eventdir");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, writing a commented default file
    /// there on first use.
    pub fn load() -> EventDirResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from an explicit file (which may be missing), layered with
    /// `EVENTDIR_*` environment variables.
    pub fn load_from(path: &Path) -> EventDirResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("EVENTDIR"))
            .build()
            .map_err(|e| EventDirError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| EventDirError::Config(e.to_string()))
    }

    /// The data directory with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    pub fn ics_options(&self) -> IcsOptions {
        IcsOptions {
            uid_domain: self.uid_domain.clone(),
            calendar_name: self.calendar_name.clone(),
            ..Default::default()
        }
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> EventDirResult<()> {
        let contents = format!(
            "\
# eventdir configuration

# Where event and organizer directories live:
# data_dir = \"{DEFAULT_DATA_DIR}\"

# Catalog server used by the `eventdir` CLI:
# server_url = \"{DEFAULT_SERVER_URL}\"

# Address `eventdir-server` listens on:
# bind = \"{DEFAULT_BIND}\"

# ICS export:
# calendar_name = \"{DEFAULT_CALENDAR_NAME}\"
# uid_domain = \"{DEFAULT_UID_DOMAIN}\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                EventDirError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| EventDirError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_file_parses_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eventdir").join("config.toml");

        EventDirConfig::create_default_config(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("# data_dir = \"~/events\""));

        let config = EventDirConfig::load_from(&path).unwrap();
        assert_eq!(config.calendar_name, DEFAULT_CALENDAR_NAME);
        assert_eq!(config.uid_domain, DEFAULT_UID_DOMAIN);
    }

    #[test]
    fn test_values_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "data_dir = \"/srv/events\"\ncalendar_name = \"Rust Events\"\n",
        )
        .unwrap();

        let config = EventDirConfig::load_from(&path).unwrap();
        assert_eq!(config.data_path(), PathBuf::from("/srv/events"));
        assert_eq!(config.ics_options().calendar_name, "Rust Events");
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = EventDirConfig::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.bind, DEFAULT_BIND);
    }

    #[test]
    fn test_data_path_expands_tilde() {
        let config = EventDirConfig::default();
        assert!(!config.data_path().to_string_lossy().starts_with('~'));
        assert!(config.data_path().ends_with("events"));
    }
}
