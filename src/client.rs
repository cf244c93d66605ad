//! Where the catalog comes from: eventdir-server over HTTP, or a local data
//! directory.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;

use eventdir_core::{Catalog, CoordinateMap, Event, store};

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// HTTP client for eventdir-server
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
}

impl Client {
    pub fn new(server_url: &str) -> Result<Self> {
        // A trailing slash keeps `join` from dropping the last path segment
        let normalized = format!("{}/", server_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalized).with_context(|| format!("Invalid server URL: {server_url}"))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Client { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// GET /api/events
    pub async fn events(&self) -> Result<Vec<Event>> {
        self.get_json("api/events").await
    }

    /// GET /api/coordinates
    pub async fn coordinates(&self) -> Result<CoordinateMap> {
        self.get_json("api/coordinates").await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path)?;
        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to connect to {url}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            match resp.json::<ErrorResponse>().await {
                Ok(err) => anyhow::bail!("{}", err.error),
                Err(_) => anyhow::bail!("{url} returned {status}"),
            }
        }

        Ok(resp.json().await?)
    }
}

/// Catalog and coordinate source for a session
#[derive(Clone)]
pub enum Source {
    Server(Client),
    Local(PathBuf),
}

impl Source {
    /// Prefix of shareable links
    pub fn base_path(&self) -> String {
        match self {
            Source::Server(client) => client.base_url().to_string(),
            Source::Local(dir) => format!("eventdir://{}", dir.display()),
        }
    }

    pub async fn catalog(&self) -> Result<Catalog> {
        match self {
            Source::Server(client) => Ok(Catalog::new(client.events().await?)),
            Source::Local(dir) => {
                let dir = dir.clone();
                let catalog = tokio::task::spawn_blocking(move || store::load_catalog(&dir))
                    .await?
                    .context("Failed to load events")?;
                Ok(catalog)
            }
        }
    }

    pub async fn coordinates(&self) -> Result<CoordinateMap> {
        match self {
            Source::Server(client) => client.coordinates().await,
            Source::Local(dir) => {
                let dir = dir.clone();
                let map = tokio::task::spawn_blocking(move || store::load_coordinates(&dir))
                    .await?
                    .context("Failed to load coordinates")?;
                Ok(map)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = Client::new("http://127.0.0.1:4097").unwrap();
        assert_eq!(client.base_url().as_str(), "http://127.0.0.1:4097/");
        assert_eq!(
            client.base_url().join("api/events").unwrap().as_str(),
            "http://127.0.0.1:4097/api/events"
        );

        let nested = Client::new("https://example.org/directory/").unwrap();
        assert_eq!(
            nested.base_url().join("api/events").unwrap().as_str(),
            "https://example.org/directory/api/events"
        );
    }

    #[test]
    fn test_invalid_server_url() {
        assert!(Client::new("not a url").is_err());
    }

    #[tokio::test]
    async fn test_local_source_reads_store() {
        let dir = tempfile::tempdir().unwrap();
        let event_dir = dir.path().join("events/meetup");
        std::fs::create_dir_all(&event_dir).unwrap();
        std::fs::write(
            event_dir.join("event.toml"),
            "title = \"Meetup\"\ntype = \"Meetup\"\ndate = \"2025-05-01\"\n\
             [location]\ncountry = \"SE\"\ncity = \"Malmö\"\n",
        )
        .unwrap();

        let source = Source::Local(dir.path().to_path_buf());
        let catalog = source.catalog().await.unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(source.coordinates().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_local_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let source = Source::Local(dir.path().join("missing"));
        assert!(source.catalog().await.is_err());
    }
}
