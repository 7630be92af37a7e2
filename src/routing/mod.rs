//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path, cookies)
//!     → context.rs (RequestContext)
//!     → tenant.rs (classify host → TenantType)
//!     → rewriter.rs (path into the tenant's area)
//!     → policy.rs (public / protected / auth page)
//!     → matcher.rs (role vs tenant, role vs route)
//!     → engine.rs (RoutingDecision)
//!
//! Policy Compilation (at startup):
//!     RoutesConfig + AppConfig
//!     → RoutePolicy (immutable, shared via Arc)
//! ```
//!
//! # Design Decisions
//! - Route tables compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same request and identity always yield the same decision

pub mod context;
pub mod engine;
pub mod matcher;
pub mod policy;
pub mod rewriter;
pub mod tenant;

pub use context::RequestContext;
pub use engine::{RoutingDecision, RoutingEngine, RoutingOutcome};
pub use matcher::{default_path, matches};
pub use policy::RoutePolicy;
pub use rewriter::rewrite_path;
pub use tenant::{classify, Role, TenantType};
