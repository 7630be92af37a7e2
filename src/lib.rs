//! Tenant gateway library.
//!
//! Routes each request of the multi-tenant marketing application to the
//! right area by subdomain (`creator.`, `business.`, `admin.`), and keeps
//! users inside the area their role belongs to.

pub mod config;
pub mod error;
pub mod http;
pub mod identity;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{RoutingDecision, RoutingEngine};
