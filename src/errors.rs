use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Error taxonomy for the pipeline.
///
/// Scope of each variant matters more than its message: `Fetch` kills one
/// content unit, `Translation` degrades to empty output, `StoreWrite` and
/// `Replication` kill one (document, language) pair, `DuplicateRecord` skips
/// one document, and only `Enumeration` aborts a whole run.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("failed to fetch {url} after {attempts} attempts: {reason}")]
    Fetch {
        url: String,
        attempts: u32,
        reason: String,
    },

    #[error("translation service error: {0}")]
    Translation(String),

    #[error("destination write failed: {0}")]
    StoreWrite(String),

    #[error("translation record already exists for {0}")]
    DuplicateRecord(String),

    #[error("could not enumerate source collection: {0}")]
    Enumeration(String),

    #[error("replication to {language} failed: {cause}")]
    Replication {
        language: String,
        #[source]
        cause: Box<AppError>,
    },

    #[error("blob store error: {0}")]
    BlobStore(String),

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Wrap a sub-failure as the fatal cause for one target language.
    pub fn replication(language: &str, cause: AppError) -> Self {
        AppError::Replication {
            language: language.to_string(),
            cause: Box::new(cause),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::DuplicateRecord(_) => StatusCode::CONFLICT,
            Self::Fetch { .. } | Self::Translation(_) | Self::BlobStore(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        match &self {
            AppError::NotFound(_) | AppError::DuplicateRecord(_) => {
                tracing::debug!(%message, "client-visible error");
            }
            _ => {
                tracing::error!(%message, error = ?self, "request failed");
            }
        }

        // Error body shape expected by the workflow's callers.
        let body = Json(json!({
            "message": "error",
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replication_wraps_first_cause() {
        let err = AppError::replication("fr", AppError::StoreWrite("append rejected".into()));
        let text = err.to_string();
        assert!(text.contains("fr"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn status_codes_by_scope() {
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::DuplicateRecord("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Translation("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Enumeration("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
