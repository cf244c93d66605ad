//! Catalog and coordinate endpoints

use axum::{Json, Router, extract::State, routing::get};

use eventdir_core::{CoordinateMap, Event, store};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/events", get(list_events))
        .route("/api/coordinates", get(coordinates))
}

/// GET /api/events - Every event, sorted by start date
async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, AppError> {
    let catalog = state.catalog()?;
    Ok(Json(catalog.events().to_vec()))
}

/// GET /api/coordinates - Event id => { latitude, longitude }
async fn coordinates(State(state): State<AppState>) -> Result<Json<CoordinateMap>, AppError> {
    let catalog = state.catalog()?;
    let map = store::coordinate_map(&state.data_dir, &catalog)?;
    Ok(Json(map))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::test_support::{fixture, get};

    #[tokio::test]
    async fn test_list_events() {
        let dir = fixture();
        let (status, body, content_type) = get(dir.path(), "/api/events").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));

        let events: Vec<eventdir_core::Event> = serde_json::from_slice(&body).unwrap();
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["berlin-meetup", "rustconf"]);
        assert_eq!(
            events[1].organizer_details.as_ref().unwrap().icon_url.as_deref(),
            Some("/organizer/rust-foundation/image.png")
        );
    }

    #[tokio::test]
    async fn test_coordinates() {
        let dir = fixture();
        let (status, body, _) = get(dir.path(), "/api/coordinates").await;
        assert_eq!(status, StatusCode::OK);

        let map: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(map["rustconf"]["latitude"], 47.6);
        assert!(map.get("berlin-meetup").is_none());
    }

    #[tokio::test]
    async fn test_malformed_coordinates_is_server_error() {
        let dir = fixture();
        std::fs::write(dir.path().join("coordinates.toml"), "[rustconf\n").unwrap();

        let (status, body, _) = get(dir.path(), "/api/coordinates").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(error["error"].as_str().unwrap().contains("coordinates.toml"));
    }
}
