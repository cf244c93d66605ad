pub mod events;
pub mod ics;
pub mod organizers;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use eventdir_core::EventDirError;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

/// The full application: every route plus CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(events::router())
        .merge(ics::router())
        .merge(organizers::router())
        .with_state(state)
        .layer(cors)
        // Method and path only
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert anyhow errors to HTTP responses
pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<EventDirError>() {
            Some(EventDirError::EventNotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!("Request failed: {:#}", self.0);
        }
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
