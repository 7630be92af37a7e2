//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → compiled into RoutePolicy, shared via Arc
//! ```
//!
//! # Design Decisions
//! - Config is loaded once at startup; there is no runtime reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AppConfig, GatewayConfig, IdentityConfig, ListenerConfig, ObservabilityConfig,
    ProtectedRoutesConfig, RoutesConfig, TimeoutConfig, UpstreamConfig,
};
