//! Error types for the classification service.

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Message returned when a request carries no `image` field.
pub const MISSING_IMAGE_MESSAGE: &str = "Tidak ada file gambar pada permintaan";

#[derive(Error, Debug)]
pub enum Error {
    /// The request has no `image` multipart field.
    #[error("Tidak ada file gambar pada permintaan")]
    MissingImage,

    /// The uploaded bytes could not be decoded as an image.
    #[error("{0}")]
    Decode(#[from] image::ImageError),

    /// A tensor did not have the shape the classifier expects.
    #[error("tensor shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// The classifier failed or returned malformed output.
    #[error("model inference failed: {reason}")]
    Inference { reason: String },

    /// The multipart body could not be read.
    #[error("failed to read multipart body: {0}")]
    Multipart(String),

    #[error("failed to load model from {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    #[error("failed to load class list from {path}: {source}")]
    LabelLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn inference(reason: impl Into<String>) -> Self {
        Error::Inference {
            reason: reason.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingImage => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, "prediction failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
