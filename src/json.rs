//! Size-capped, strict JSON request decoding and the standard response
//! envelope.

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::error::Category;

use crate::error::JsonError;

pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct JsonConfig {
    /// Hard ceiling on the request body size.
    pub max_body_bytes: usize,
    /// Accept JSON object keys that have no counterpart in the target
    /// structure instead of rejecting the body.
    pub allow_unknown_fields: bool,
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            allow_unknown_fields: false,
        }
    }
}

/// The single wire shape used for success and error JSON responses;
/// `error` discriminates the two.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonEnvelope {
    pub error: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Decodes `body` into a `T` under the limits of `config`.
///
/// The body is read under `max_body_bytes` without buffering an oversized
/// body in full. Exactly one JSON value is accepted: concatenated
/// documents fail with [`JsonError::TrailingData`]. Error causes are
/// distinguished per variant; see [`JsonError`].
///
/// Note that a body key missing for a non-optional target field is a
/// decode failure in serde regardless of `allow_unknown_fields`; targets
/// that tolerate absent keys should use `Option` or `#[serde(default)]`.
pub async fn read_json<T: DeserializeOwned>(
    body: Body,
    config: &JsonConfig,
) -> Result<T, JsonError> {
    let bytes = to_bytes(body, config.max_body_bytes)
        .await
        .map_err(|err| collect_failure(err, config.max_body_bytes))?;

    if bytes.is_empty() {
        return Err(JsonError::EmptyBody);
    }

    let mut de = serde_json::Deserializer::from_slice(&bytes);
    let mut track = serde_path_to_error::Track::new();
    let tracked = serde_path_to_error::Deserializer::new(&mut de, &mut track);

    let mut unknown: Option<String> = None;
    let outcome = if config.allow_unknown_fields {
        T::deserialize(tracked)
    } else {
        serde_ignored::deserialize(tracked, |path| {
            if unknown.is_none() {
                unknown = Some(path.to_string());
            }
        })
    };

    let value = match outcome {
        Ok(value) => value,
        Err(err) => {
            // A stray key is reported in preference to the knock-on data
            // failure it usually causes (e.g. the real field missing);
            // syntax errors still win.
            if err.classify() == Category::Data {
                if let Some(key) = unknown {
                    return Err(JsonError::UnknownField(key));
                }
            }
            return Err(classify(err, track.path()));
        }
    };

    if let Some(key) = unknown {
        return Err(JsonError::UnknownField(key));
    }

    de.end().map_err(|_| JsonError::TrailingData)?;

    Ok(value)
}

/// Only a tripped length limit is an oversized payload; anything else in
/// the chain (e.g. the peer aborting mid-read on a streamed body) is a
/// transport failure.
fn collect_failure(err: axum::Error, limit: usize) -> JsonError {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(&err);
    while let Some(cause) = source {
        if cause.is::<http_body_util::LengthLimitError>() {
            return JsonError::PayloadTooLarge(limit);
        }
        source = cause.source();
    }
    JsonError::Http(err.to_string())
}

fn classify(err: serde_json::Error, path: serde_path_to_error::Path) -> JsonError {
    match err.classify() {
        Category::Data => JsonError::TypeMismatch {
            field: path.to_string(),
            detail: err.to_string(),
        },
        Category::Syntax | Category::Eof | Category::Io => JsonError::Malformed {
            line: err.line(),
            column: err.column(),
        },
    }
}

/// Serializes `payload` into a JSON response with the given status code.
///
/// Caller headers are applied before the content type and status, and
/// multi-valued headers are preserved.
pub fn write_json<T: Serialize>(
    status: StatusCode,
    payload: &T,
    headers: Option<HeaderMap>,
) -> Result<Response, JsonError> {
    let body = serde_json::to_vec(payload).map_err(|e| JsonError::Serialization(e.to_string()))?;

    let mut response = Response::builder()
        .status(status)
        .body(Body::from(body))
        .map_err(|e| JsonError::Http(e.to_string()))?;

    if let Some(extra) = headers {
        for (name, value) in extra.iter() {
            response.headers_mut().append(name, value.clone());
        }
    }
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    Ok(response)
}

/// Renders `err` as the standard failure envelope with the given status
/// code (400 when `None`).
pub fn error_json(
    err: &dyn std::error::Error,
    status: Option<StatusCode>,
) -> Result<Response, JsonError> {
    let payload = JsonEnvelope {
        error: true,
        message: err.to_string(),
        data: None,
    };

    write_json(status.unwrap_or(StatusCode::BAD_REQUEST), &payload, None)
}
