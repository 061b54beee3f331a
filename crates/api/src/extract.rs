//! Request extractors that reject with [`AppError`].
//!
//! axum's own `Json`, `Path` and `Query` reject with plain-text bodies. These
//! wrappers route the rejection through [`AppError`] so every failure carries
//! the usual `{"error": {...}}` payload.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use jobroom_core::error::CoreError;

use crate::error::AppError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Query string parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// Well-formed JSON of the wrong shape is a validation failure; anything
/// else about the body is a bad request.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => AppError::Core(CoreError::Validation {
                message: "Invalid request body".to_string(),
                details: vec![err.body_text()],
            }),
            other => AppError::BadRequest(other.body_text()),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Core(CoreError::Validation {
            message: "Invalid query parameters".to_string(),
            details: vec![rejection.body_text()],
        })
    }
}
