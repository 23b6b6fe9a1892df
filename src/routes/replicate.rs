use crate::errors::AppError;
use crate::services::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tracing::instrument;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicateSummary {
    pub message: &'static str,
    pub success_messages: Vec<String>,
    pub error_messages: Vec<String>,
}

/// Run the full translate-and-republish workflow for the configured filter
/// policy and language set. No parameters: all targets are static
/// configuration.
#[instrument(skip(state))]
pub async fn replicate_all(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let policy = state.filter_policy();
    let languages = state.config.pipeline.languages.clone();
    let report = state.orchestrator.run(&policy, &languages).await?;

    Ok(Json(ReplicateSummary {
        message: "success",
        success_messages: report.successes,
        error_messages: report.failures,
    }))
}
