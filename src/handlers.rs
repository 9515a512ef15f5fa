use crate::{AppState, errors::AppError, fetcher, models::NotificationBatch, thumbnailer};
use axum::{Json, body::Bytes, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;
use tracing;

/// Handler for POST /fetch: one Fetcher invocation. The trigger payload (if
/// any) is ignored; the external scheduler only provides the tick.
pub async fn fetch_trending(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let report = fetcher::run(
        state.trending.as_ref(),
        state.store.as_ref(),
        state.gif_limit,
        state.fan_out_limit,
    )
    .await?;

    Ok((StatusCode::OK, Json(report)))
}

/// Handler for POST /thumbnails: one Thumbnailer invocation over an
/// object-created notification batch. The body is decoded by hand so a
/// malformed batch surfaces as the invocation-tier 500 envelope instead of
/// an extractor rejection.
pub async fn process_created_objects(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let batch: NotificationBatch =
        serde_json::from_slice(&body).map_err(|e| AppError::BatchDecode(e.to_string()))?;

    let outcomes = thumbnailer::process(state.store.as_ref(), batch, state.fan_out_limit).await;

    let stored = outcomes
        .iter()
        .filter(|o| matches!(o, thumbnailer::ThumbnailOutcome::Stored { .. }))
        .count();
    tracing::info!(stored, total = outcomes.len(), "Thumbnail invocation complete");

    // No envelope on success: the bare per-record outcome array.
    Ok(Json(outcomes))
}
