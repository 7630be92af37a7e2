//! Axum middleware.

pub mod tenant_routing;

pub use tenant_routing::tenant_routing_middleware;
