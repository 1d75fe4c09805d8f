use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::types::{ErrorCode, PredictResponse};

#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to fetch model: HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("Serialization error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid ngram_range [{min_n}, {max_n}]")]
    InvalidNgramRange { min_n: usize, max_n: usize },
}

/// Failure of the channel itself, as opposed to an error reply carried by it.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Message channel closed")]
    Closed,

    #[error("No reply within {0:?}")]
    Timeout(std::time::Duration),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Undecodable reply: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Error, Debug, PartialEq)]
pub enum PageError {
    #[error("No anchor at index {0}")]
    MissingAnchor(usize),
}

/// Errors surfaced by the HTTP routes. Bodies keep the message protocol shape
/// so a remote caller can still classify them.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unsupported request: {0}")]
    UnsupportedAction(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::UnsupportedAction(_) => (
                StatusCode::BAD_REQUEST,
                PredictResponse::error(ErrorCode::UnsupportedAction, self.to_string()),
            ),
        };

        tracing::warn!("Rejected request: {}", self);
        (status, Json(body)).into_response()
    }
}
