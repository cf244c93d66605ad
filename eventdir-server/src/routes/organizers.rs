//! Organizer images

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};

use eventdir_core::store;

use crate::routes::{AppError, ErrorResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/organizer/{id}/image.png", get(organizer_image))
}

/// GET /organizer/{id}/image.png
async fn organizer_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let Some(path) = store::organizer_image_path(&state.data_dir, &id) else {
        let body = Json(ErrorResponse {
            error: format!("No image for organizer: {id}"),
        });
        return Ok((StatusCode::NOT_FOUND, body).into_response());
    };

    let bytes = tokio::fs::read(&path).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes).into_response())
}
