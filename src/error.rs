use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
///
/// Only conditions that abort a computed view live here. Unparseable numbers,
/// titles without a fuzzy match and empty category fields are ordinary data
/// and surface as `None` or as zero exploded rows instead.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Missing input file {path}: {source}")]
    MissingInputFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema mismatch: {dataset} dataset has no `{column}` column")]
    SchemaMismatch { dataset: String, column: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::MissingInputFile { .. }
            | AppError::SchemaMismatch { .. }
            | AppError::Csv(_)
            | AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        tracing::error!(status = %status, error = %message, "Request failed");

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
