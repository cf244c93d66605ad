//! ICS export endpoints

use axum::{
    Router,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};

use eventdir_core::EventDirError;
use eventdir_core::ics::{generate_catalog_ics, generate_event_ics};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/event/{file}", get(event_ics))
        .route("/events.ics", get(catalog_ics))
}

/// GET /event/{id}.ics - One event as a calendar file
async fn event_ics(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, AppError> {
    let id = file
        .strip_suffix(".ics")
        .ok_or_else(|| EventDirError::EventNotFound(file.clone()))?;

    let catalog = state.catalog()?;
    let event = catalog
        .get(id)
        .ok_or_else(|| EventDirError::EventNotFound(id.to_string()))?;

    let ics = generate_event_ics(event, &state.ics)?;
    Ok(calendar_response(&format!("{id}.ics"), ics))
}

/// GET /events.ics - The whole catalog as one calendar file
async fn catalog_ics(State(state): State<AppState>) -> Result<Response, AppError> {
    let catalog = state.catalog()?;
    let ics = generate_catalog_ics(catalog.events(), &state.ics)?;
    Ok(calendar_response("events.ics", ics))
}

fn calendar_response(filename: &str, ics: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        ics,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::test_support::{fixture, get};

    #[tokio::test]
    async fn test_event_ics() {
        let dir = fixture();
        let (status, body, content_type) = get(dir.path(), "/event/rustconf.ics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("text/calendar; charset=utf-8"));

        let ics = String::from_utf8(body).unwrap();
        assert!(ics.contains("UID:rustconf@eventdir.local"));
        assert!(ics.contains("DTEND;VALUE=DATE:20250905"));
    }

    #[tokio::test]
    async fn test_unknown_event_is_not_found() {
        let dir = fixture();
        let (status, body, _) = get(dir.path(), "/event/nope.ics").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(error["error"], "Event not found: nope");

        let (status, _, _) = get(dir.path(), "/event/rustconf").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_catalog_ics() {
        let dir = fixture();
        let (status, body, _) = get(dir.path(), "/events.ics").await;
        assert_eq!(status, StatusCode::OK);

        let ics = String::from_utf8(body).unwrap();
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
        assert!(ics.contains("X-WR-CALNAME:EventDir Events"));
    }
}
