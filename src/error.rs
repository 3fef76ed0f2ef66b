use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::models::UserId;

/// Errors raised by the recommendation engine
///
/// Domain emptiness (no seeds, no candidates) is never an error; these
/// variants are reserved for violated preconditions.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Failed to load {source_name}: {message}")]
    DataLoad {
        source_name: &'static str,
        message: String,
    },

    #[error("Dataset is empty: {0}")]
    EmptyDataset(String),

    #[error("Unknown user: {0}")]
    UnknownUser(UserId),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}

impl EngineError {
    pub(crate) fn data_load(source_name: &'static str, message: impl Into<String>) -> Self {
        EngineError::DataLoad {
            source_name,
            message: message.into(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Engine(EngineError::UnknownUser(_)) => StatusCode::NOT_FOUND,
            AppError::Engine(EngineError::InsufficientData(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Engine(EngineError::DataLoad { .. })
            | AppError::Engine(EngineError::EmptyDataset(_))
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
