//! Request identification and gateway headers.
//!
//! # Responsibilities
//! - Generate a UUID v4 request ID for requests that arrive without one
//! - Strip client-supplied `x-gateway-*` headers before routing
//! - Annotate forwarded requests with tenant and principal
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Only the gateway may set `x-gateway-*` headers seen by the upstream

use axum::http::{HeaderMap, HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::identity::Principal;
use crate::routing::TenantType;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
pub const X_GATEWAY_TENANT: HeaderName = HeaderName::from_static("x-gateway-tenant");
pub const X_GATEWAY_ORIGINAL_PATH: HeaderName = HeaderName::from_static("x-gateway-original-path");
pub const X_GATEWAY_USER_ID: HeaderName = HeaderName::from_static("x-gateway-user-id");
pub const X_GATEWAY_ROLE: HeaderName = HeaderName::from_static("x-gateway-role");

const GATEWAY_HEADER_PREFIX: &str = "x-gateway-";

/// Generates `x-request-id` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request ID, or `"unknown"` when none was set.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Remove every `x-gateway-*` header a client sent.
pub fn strip_gateway_headers(headers: &mut HeaderMap) {
    let spoofed: Vec<HeaderName> = headers
        .keys()
        .filter(|name| name.as_str().starts_with(GATEWAY_HEADER_PREFIX))
        .cloned()
        .collect();
    for name in spoofed {
        headers.remove(name);
    }
}

/// Tell the upstream which tenant (and user) the gateway resolved.
pub fn annotate(headers: &mut HeaderMap, tenant: TenantType, principal: Option<&Principal>) {
    headers.insert(X_GATEWAY_TENANT, HeaderValue::from_static(tenant.as_str()));
    if let Some(principal) = principal {
        if let Ok(user_id) = HeaderValue::from_str(&principal.user_id) {
            headers.insert(X_GATEWAY_USER_ID, user_id);
        }
        headers.insert(X_GATEWAY_ROLE, HeaderValue::from_static(principal.role.as_str()));
    }
}
