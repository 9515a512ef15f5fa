use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error; // Use thiserror for cleaner error definitions

// --- Collaborator / domain errors ---

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Object write failed for key '{key}': {reason}")]
    PutFailed { key: String, reason: String },

    #[error("Object not found with key: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    BackendError(#[from] anyhow::Error), // Wrap Anyhow errors from the S3 layer
}

#[derive(Error, Debug)]
pub enum TrendingError {
    #[error("Trending API request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Trending API returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Could not decode trending API response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("Download failed for '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },
}

#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error("Could not decode image data: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Could not encode thumbnail: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Source image has zero width")]
    EmptyImage,

    #[error("Scaled height overflows for {width}x{height} source")]
    HeightOverflow { width: u32, height: u32 },
}

#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Key '{0}' is not under the original/ prefix")]
    NotAnOriginal(String),
}

// --- Web layer error (invocation tier) ---

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to get from Giphy")]
    TrendingUnavailable(#[source] TrendingError),

    #[error("Could not decode notification batch: {0}")]
    BatchDecode(String),

    // Configuration / startup errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Initialization error: {0}")]
    InitError(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl From<TrendingError> for AppError {
    fn from(err: TrendingError) -> Self {
        AppError::TrendingUnavailable(err)
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

// --- Stable error serialization (code, message, optional detail) ---

/// Wire form of any error this service reports, either inside a per-item
/// result slot or in a 500 envelope. `code` is a stable machine-readable
/// discriminant; `detail` carries the source chain when one exists.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

fn source_detail(err: &dyn std::error::Error) -> Option<String> {
    err.source().map(|s| s.to_string())
}

impl From<&StorageError> for ErrorBody {
    fn from(err: &StorageError) -> Self {
        let code = match err {
            StorageError::PutFailed { .. } => "store_put_failed",
            StorageError::NotFound(_) => "object_not_found",
            StorageError::BackendError(_) => "store_backend",
        };
        ErrorBody {
            code,
            message: err.to_string(),
            detail: source_detail(err),
        }
    }
}

impl From<&TrendingError> for ErrorBody {
    fn from(err: &TrendingError) -> Self {
        let code = match err {
            TrendingError::Http(_) => "trending_http",
            TrendingError::UnexpectedStatus { .. } => "trending_status",
            TrendingError::Decode(_) => "trending_decode",
            TrendingError::DownloadFailed { .. } => "download_failed",
        };
        ErrorBody {
            code,
            message: err.to_string(),
            detail: source_detail(err),
        }
    }
}

impl From<&ThumbnailError> for ErrorBody {
    fn from(err: &ThumbnailError) -> Self {
        let code = match err {
            ThumbnailError::Decode(_) => "image_decode_failed",
            ThumbnailError::Encode(_) => "image_encode_failed",
            ThumbnailError::EmptyImage => "image_empty",
            ThumbnailError::HeightOverflow { .. } => "image_height_overflow",
        };
        ErrorBody {
            code,
            message: err.to_string(),
            detail: source_detail(err),
        }
    }
}

impl From<&KeyError> for ErrorBody {
    fn from(err: &KeyError) -> Self {
        ErrorBody {
            code: "key_not_original",
            message: err.to_string(),
            detail: None,
        }
    }
}

// --- Axum response implementation ---

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, error) = match &self {
            AppError::TrendingUnavailable(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to get from Giphy".to_string(),
                ErrorBody::from(e),
            ),
            // The event source only distinguishes 2xx from non-2xx, so a
            // malformed batch gets the same 500 envelope as anything else
            // that escapes before per-record isolation.
            AppError::BatchDecode(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to resize thumbnails".to_string(),
                ErrorBody {
                    code: "batch_decode",
                    message: "Could not decode notification batch".to_string(),
                    detail: Some(detail.clone()),
                },
            ),
            AppError::ConfigError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error".to_string(),
                ErrorBody {
                    code: "config",
                    message: msg.clone(),
                    detail: None,
                },
            ),
            AppError::InitError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server initialization error".to_string(),
                ErrorBody {
                    code: "init",
                    message: msg.clone(),
                    detail: None,
                },
            ),
            AppError::InternalServerError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred".to_string(),
                ErrorBody {
                    code: "internal",
                    message: msg.clone(),
                    detail: None,
                },
            ),
        };

        // Debug-format the error so the source chain (SDK/reqwest causes)
        // lands in the log, not just the top-level message.
        tracing::error!(error.message = %message, error.detail = ?self, "Responding with error");

        let body = Json(serde_json::json!({ "message": message, "error": error }));
        (status, body).into_response()
    }
}
