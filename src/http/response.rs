//! Responses produced by the gateway itself.
//!
//! # Responsibilities
//! - Turn a redirect decision into a 307 with `Location`
//! - Map upstream failures to 502
//!
//! # Design Decisions
//! - 307 keeps the method and body of the original request
//! - An unusable `Location` becomes a 500, never a panic

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

/// 307 Temporary Redirect to `location`.
pub fn redirect(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, value)]).into_response(),
        Err(_) => {
            tracing::error!(location = %location, "Redirect target is not a valid header value");
            (StatusCode::INTERNAL_SERVER_ERROR, "Invalid redirect target").into_response()
        }
    }
}

pub fn bad_gateway() -> Response {
    (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
}
