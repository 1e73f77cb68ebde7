//! Maps domain errors onto HTTP status codes and a uniform JSON body
//! (§7 error taxonomy → transport).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use forge_domain::error::ErrorKind;
use serde::Serialize;

/// Wraps a [`forge_domain::Error`] for use as an `axum` handler error type.
pub struct ApiError(pub forge_domain::Error);

impl From<forge_domain::Error> for ApiError {
    fn from(err: forge_domain::Error) -> Self {
        Self(err)
    }
}

#[derive(Serialize)]
struct ErrorDetail {
    kind: ErrorKind,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Cancelled => StatusCode::CONFLICT,
            ErrorKind::WorkerPoolExhausted => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::MaxIterations
            | ErrorKind::TimedOut
            | ErrorKind::ModelUnavailable
            | ErrorKind::ValidatorUnavailable
            | ErrorKind::ParserError
            | ErrorKind::Interrupted
            | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody { error: ErrorDetail { kind: self.0.kind(), message: self.0.to_string() } };
        (status, Json(body)).into_response()
    }
}
