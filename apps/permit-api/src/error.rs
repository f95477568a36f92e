//! Error types and JSON bodies for the permit API
//!
//! Lookup endpoints always answer 200: failures travel in the body as
//! `{error, error_kind}` so the bundled page can show them inline. Only PDF
//! generation signals failure through the status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use parcel_core::error::UNRECOGNIZED_SHAPE;
use parcel_core::{ErrorKind, LookupError, Normalized, UsageRecord};
use permit_pdf::RenderError;
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::error;

/// Server error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("PDF 생성 실패: {0}")]
    Render(#[from] RenderError),
}

/// Error body shared by every lookup endpoint
#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: String,
    error_kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_response: Option<&'a Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Lookup(err) => (StatusCode::OK, Json(lookup_error_body(&err))).into_response(),
            ApiError::Render(err) => {
                error!("PDF generation failed: {}", err);
                let body = json!({ "error": format!("PDF 생성 실패: {}", err) });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

/// `{error, error_kind, raw_response?}` for a failed lookup
pub fn lookup_error_body(err: &LookupError) -> Value {
    let body = ErrorResponse {
        error: err.to_string(),
        error_kind: err.kind(),
        raw_response: err.raw(),
    };
    serde_json::to_value(body).unwrap_or_else(|_| json!({ "error": err.to_string() }))
}

/// Diagnostic body for a payload no decoder recognized
pub fn unrecognized_body(raw: Value) -> Value {
    json!({
        "error": UNRECOGNIZED_SHAPE,
        "error_kind": ErrorKind::Unrecognized,
        "raw_response": raw,
    })
}

/// JSON body for one normalized section: the record, `{}` when empty, or
/// the diagnostic.
pub fn section_body<T: Serialize>(section: Normalized<T>) -> Value {
    match section {
        Normalized::Found(record) => {
            serde_json::to_value(record).unwrap_or_else(|_| Value::Object(Map::new()))
        }
        Normalized::Empty => Value::Object(Map::new()),
        Normalized::Unrecognized(raw) => unrecognized_body(raw),
    }
}

/// Section body for a lookup that may have failed
pub fn section_result<T: Serialize>(section: Result<Normalized<T>, LookupError>) -> Value {
    match section {
        Ok(section) => section_body(section),
        Err(err) => lookup_error_body(&err),
    }
}

/// Usage bodies always carry both lists, even on failure.
pub fn usage_result(section: Result<Normalized<UsageRecord>, LookupError>) -> Value {
    let mut body = match section {
        Ok(Normalized::Empty) => section_body(Normalized::Found(UsageRecord::default())),
        other => section_result(other),
    };
    if let Value::Object(fields) = &mut body {
        for list in ["usage_areas", "usage_districts"] {
            fields
                .entry(list)
                .or_insert_with(|| Value::Array(Vec::new()));
        }
    }
    body
}
