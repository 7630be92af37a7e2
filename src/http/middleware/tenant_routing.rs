//! Tenant routing middleware.
//! Classifies the host, rewrites the path, and enforces role access.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{uri::PathAndQuery, HeaderValue, Request, Uri},
    middleware::Next,
    response::Response,
};

use crate::error::GatewayError;
use crate::http::request::{annotate, request_id, strip_gateway_headers, X_GATEWAY_ORIGINAL_PATH};
use crate::http::response::redirect;
use crate::identity::SessionCredentials;
use crate::observability::metrics;
use crate::routing::{classify, RequestContext, RoutingDecision, RoutingEngine};

pub async fn tenant_routing_middleware(
    State(engine): State<Arc<RoutingEngine>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    strip_gateway_headers(req.headers_mut());

    let ctx = RequestContext::from_request(&req);
    let credentials = SessionCredentials::from_headers(req.headers());
    let outcome = engine.decide(&ctx, &credentials).await;
    let tenant = outcome.tenant.unwrap_or_else(|| classify(ctx.hostname()));

    metrics::record_decision(tenant.as_str(), outcome.decision.label());
    tracing::debug!(
        request_id = %request_id(req.headers()),
        tenant = %tenant,
        path = %ctx.path(),
        decision = ?outcome.decision,
        "Routing decision"
    );

    match outcome.decision {
        RoutingDecision::Redirect(location) => return redirect(&location),
        RoutingDecision::Rewrite(target) => {
            if let Err(err) = apply_rewrite(&mut req, &target) {
                tracing::error!(
                    request_id = %request_id(req.headers()),
                    error = %err,
                    "Could not apply rewrite, applying fallback"
                );
                if let RoutingDecision::Redirect(location) = engine.fallback(&ctx) {
                    return redirect(&location);
                }
            }
        }
        RoutingDecision::PassThrough => {}
    }

    annotate(req.headers_mut(), tenant, outcome.principal.as_ref());
    if let Some(principal) = outcome.principal {
        req.extensions_mut().insert(principal);
    }
    next.run(req).await
}

/// Substitute the path and query; the original is kept in a header.
fn apply_rewrite(req: &mut Request<Body>, target: &str) -> Result<(), GatewayError> {
    let invalid = || GatewayError::InvalidTarget(target.to_string());

    let path_and_query = PathAndQuery::from_str(target).map_err(|_| invalid())?;
    let mut parts = req.uri().clone().into_parts();
    let original = parts
        .path_and_query
        .as_ref()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());
    parts.path_and_query = Some(path_and_query);
    let uri = Uri::from_parts(parts).map_err(|_| invalid())?;

    if let Ok(value) = HeaderValue::from_str(&original) {
        req.headers_mut().insert(X_GATEWAY_ORIGINAL_PATH, value);
    }
    *req.uri_mut() = uri;
    Ok(())
}
