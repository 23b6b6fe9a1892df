use crate::errors::AppError;
use crate::model::ContentUnit;
use crate::services::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tracing::instrument;

#[derive(Serialize)]
pub struct ContentUnitsResponse {
    pub message: &'static str,
    pub children: Vec<ContentUnit>,
}

/// Dump the raw child units of the configured preview document.
#[instrument(skip(state))]
pub async fn list_preview_units(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let document_id = &state.config.pipeline.preview_document_id;
    let children = state.store.list_content_units(document_id).await?;

    Ok(Json(ContentUnitsResponse {
        message: "success",
        children,
    }))
}
