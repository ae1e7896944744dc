//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service.

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::imaging::ImagingError;
use axum::http::StatusCode;
use lumiere_core::{CoverFlowError, StudioError};

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A studio transition that is not allowed in the current state.
    #[error("Studio Error: {0}")]
    Studio(#[from] StudioError),

    /// The product catalog could not be loaded.
    #[error("Catalog Error: {0}")]
    Catalog(#[from] CatalogError),

    /// An uploaded image could not be decoded or re-encoded.
    #[error("Image Error: {0}")]
    Image(#[from] ImagingError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    /// The HTTP status a handler answers with when this error reaches it.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Studio(StudioError::NoRoom) => StatusCode::BAD_REQUEST,
            ApiError::Studio(StudioError::SessionInProgress) => StatusCode::CONFLICT,
            ApiError::Studio(StudioError::HistoryNotFound(_))
            | ApiError::Studio(StudioError::PlacementNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Studio(StudioError::CoverFlow(CoverFlowError::IndexOutOfRange { .. })) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Image(_) => StatusCode::BAD_REQUEST,
            ApiError::Config(_)
            | ApiError::Catalog(_)
            | ApiError::Io(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Lets handlers answer with `(StatusCode, String)` like the rest of the web layer.
impl From<ApiError> for (StatusCode, String) {
    fn from(err: ApiError) -> Self {
        (err.status_code(), err.to_string())
    }
}
