//! Error types for every operation, plus their HTTP renderings.
//!
//! Each `IntoResponse` impl maps a variant to a status code, logs at the
//! failure site, and renders the standard [`JsonEnvelope`] failure body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{error, warn};

use crate::json::JsonEnvelope;
use crate::upload::UploadedFile;

#[derive(Debug, Error)]
pub enum UploadErrorKind {
    #[error("uploaded files exceed the configured size limit")]
    PayloadTooLarge,

    #[error("content type {0:?} is not permitted")]
    UnsupportedType(String),

    #[error("invalid destination file name {0:?}")]
    InvalidFileName(String),

    #[error("request contains no file part")]
    MissingFile,

    #[error("malformed multipart body: {0}")]
    Multipart(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// An upload failure together with the records of files persisted before
/// it. The batch is fail-fast, not atomic: earlier parts stay on disk and
/// the caller owns their cleanup.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct UploadError {
    pub kind: UploadErrorKind,
    pub uploaded: Vec<UploadedFile>,
}

impl UploadError {
    pub(crate) fn new(kind: UploadErrorKind) -> Self {
        Self {
            kind,
            uploaded: Vec::new(),
        }
    }

    pub(crate) fn with_uploaded(kind: UploadErrorKind, uploaded: Vec<UploadedFile>) -> Self {
        Self { kind, uploaded }
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("source file not found")]
    NotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to build response: {0}")]
    Http(String),
}

#[derive(Debug, Error)]
pub enum JsonError {
    #[error("body must not be empty")]
    EmptyBody,

    #[error("body must not be larger than {0} bytes")]
    PayloadTooLarge(usize),

    #[error("body contains badly-formed JSON (at line {line} column {column})")]
    Malformed { line: usize, column: usize },

    #[error("body contains incorrect JSON type for field {field:?}: {detail}")]
    TypeMismatch { field: String, detail: String },

    #[error("body contains unknown key {0:?}")]
    UnknownField(String),

    #[error("body must only contain a single JSON value")]
    TrailingData,

    #[error("failed to serialize response body: {0}")]
    Serialization(String),

    #[error("failed to build response: {0}")]
    Http(String),
}

#[derive(Debug, Error)]
pub enum SlugError {
    #[error("empty string not permitted")]
    EmptyInput,

    #[error("string contains no sluggable characters")]
    EmptyOutput,
}

#[derive(Debug, Error)]
pub enum PushError {
    #[error("network error: {0}")]
    Network(String),

    #[error("remote request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for PushError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            PushError::Network("request timeout".to_string())
        } else if error.is_connect() {
            PushError::Network(format!("connection failed: {}", error))
        } else {
            PushError::Request(error.to_string())
        }
    }
}

fn envelope_response(status: StatusCode, message: String) -> Response {
    let body = Json(JsonEnvelope {
        error: true,
        message,
        data: None,
    });

    (status, body).into_response()
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let (status, message) = match self.kind {
            UploadErrorKind::PayloadTooLarge => {
                warn!("upload rejected: body too large");
                (StatusCode::PAYLOAD_TOO_LARGE, self.kind.to_string())
            }
            UploadErrorKind::UnsupportedType(ref detected) => {
                warn!(detected = %detected, "upload rejected: content type not permitted");
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, self.kind.to_string())
            }
            UploadErrorKind::InvalidFileName(ref name) => {
                warn!(name = %name, "upload rejected: invalid file name");
                (StatusCode::BAD_REQUEST, self.kind.to_string())
            }
            UploadErrorKind::MissingFile => {
                warn!("upload rejected: no file part in request");
                (StatusCode::BAD_REQUEST, self.kind.to_string())
            }
            UploadErrorKind::Multipart(ref msg) => {
                warn!("invalid multipart body: {}", msg);
                (StatusCode::BAD_REQUEST, self.kind.to_string())
            }
            UploadErrorKind::Io(ref e) => {
                error!("upload failed on disk I/O: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        envelope_response(status, message)
    }
}

impl IntoResponse for DownloadError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            DownloadError::NotFound => {
                warn!("download source not found");
                (StatusCode::NOT_FOUND, self.to_string())
            }
            DownloadError::Io(ref e) => {
                error!("download failed on disk I/O: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            DownloadError::Http(ref msg) => {
                error!("failed to build download response: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        envelope_response(status, message)
    }
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            JsonError::PayloadTooLarge(_) => {
                warn!("JSON body rejected: too large");
                (StatusCode::PAYLOAD_TOO_LARGE, self.to_string())
            }
            JsonError::EmptyBody
            | JsonError::Malformed { .. }
            | JsonError::TypeMismatch { .. }
            | JsonError::UnknownField(_)
            | JsonError::TrailingData => {
                warn!("JSON body rejected: {}", self);
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            JsonError::Serialization(ref msg) | JsonError::Http(ref msg) => {
                error!("failed to produce JSON response: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        envelope_response(status, message)
    }
}
