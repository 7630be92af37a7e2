//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → request.rs (request ID, strip spoofed gateway headers)
//!     → middleware/tenant_routing.rs (routing decision)
//!         ├─ Redirect → response.rs (307 + Location)
//!         └─ PassThrough / Rewrite → server.rs forward_handler → upstream
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
