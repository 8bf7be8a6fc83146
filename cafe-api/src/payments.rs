use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use cafe_core::{QrArtifact, QrRequest};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/generate_qr", post(generate_qr))
}

/// POST /generate_qr
///
/// Returns the UPI deep link for the till to render; nothing is stored.
async fn generate_qr(
    State(state): State<AppState>,
    payload: Result<Json<QrRequest>, JsonRejection>,
) -> Result<Json<QrArtifact>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::ValidationError(e.body_text()))?;
    let artifact = state.qr.generate_qr(&request).await?;
    Ok(Json(artifact))
}
