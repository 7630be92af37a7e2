//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Routing middleware, identity calls, upstream forwarding produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line of a request
//! - Identity transport failures and missing profiles are logged apart

pub mod logging;
pub mod metrics;
