//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::matcher::AccessRule;
use crate::routing::tenant::{Role, TenantType};

/// Root configuration for the tenant gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The application every admitted request is forwarded to.
    pub upstream: UpstreamConfig,

    /// Public origins used for absolute redirects.
    pub app: AppConfig,

    /// Route tables driving the access policy.
    pub routes: RoutesConfig,

    /// Session and profile lookups.
    pub identity: IdentityConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream address (e.g., "127.0.0.1:3000").
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Origins of the application. When unset, redirects are relative.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Main origin (e.g., "https://example.com"). Sign-in lives here.
    pub base_url: Option<String>,

    /// Per-tenant origins (e.g., creator = "https://creator.example.com").
    pub tenant_base_urls: TenantUrls,
}

impl AppConfig {
    /// Configured origin for a tenant, if any.
    pub fn origin_for(&self, tenant: TenantType) -> Option<&str> {
        match tenant {
            TenantType::Main => self.base_url.as_deref(),
            TenantType::Creator => self.tenant_base_urls.creator.as_deref(),
            TenantType::Business => self.tenant_base_urls.business.as_deref(),
            TenantType::Admin => self.tenant_base_urls.admin.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TenantUrls {
    pub creator: Option<String>,
    pub business: Option<String>,
    pub admin: Option<String>,
}

/// Route tables. Loaded once, never mutated at runtime.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Public allowlist. Entries ending in `/` match as prefixes,
    /// everything else matches exactly.
    pub public: Vec<String>,

    /// Sign-in page; receives `?redirect=` on auth redirects.
    pub sign_in_path: String,

    /// Sign-up page.
    pub sign_up_path: String,

    /// Prefixes that require a session, keyed by tenant.
    pub protected: ProtectedRoutesConfig,

    /// Per-route role requirements.
    pub access: Vec<AccessRule>,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            public: vec![
                "/".to_string(),
                "/sign-in".to_string(),
                "/sign-up".to_string(),
                "/auth/".to_string(),
                "/pricing".to_string(),
                "/about".to_string(),
                "/terms".to_string(),
                "/privacy".to_string(),
            ],
            sign_in_path: "/sign-in".to_string(),
            sign_up_path: "/sign-up".to_string(),
            protected: ProtectedRoutesConfig::default(),
            access: vec![
                AccessRule::new("/creator", vec![Role::Creator]),
                AccessRule::new("/business", vec![Role::Business]),
                AccessRule::new("/admin", vec![Role::Admin]),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProtectedRoutesConfig {
    pub creator: Vec<String>,
    pub business: Vec<String>,
    pub admin: Vec<String>,

    /// Paths any signed-in user may open.
    pub authenticated: Vec<String>,
}

impl ProtectedRoutesConfig {
    /// Route list of a tenant. The main tenant's list is the general one.
    pub fn for_tenant(&self, tenant: TenantType) -> &[String] {
        match tenant {
            TenantType::Main => &self.authenticated,
            TenantType::Creator => &self.creator,
            TenantType::Business => &self.business,
            TenantType::Admin => &self.admin,
        }
    }
}

impl Default for ProtectedRoutesConfig {
    fn default() -> Self {
        Self {
            creator: vec!["/creator".to_string()],
            business: vec!["/business".to_string()],
            admin: vec!["/admin".to_string()],
            authenticated: vec![
                "/dashboard".to_string(),
                "/settings".to_string(),
                "/profile".to_string(),
                "/onboarding".to_string(),
            ],
        }
    }
}

/// Identity service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// When false every request is treated as anonymous.
    pub enabled: bool,

    /// Returns the session's user as `{ "id": ... }`, 401 when signed out.
    pub session_url: String,

    /// Profile lookup; `{user_id}` is substituted.
    pub profile_url: String,

    /// Sent as the `apikey` header when set.
    pub api_key: Option<String>,

    /// Deadline for each identity call in milliseconds.
    pub timeout_ms: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            session_url: "http://127.0.0.1:54321/auth/v1/user".to_string(),
            profile_url: "http://127.0.0.1:54321/rest/v1/profiles?id=eq.{user_id}&select=role"
                .to_string(),
            api_key: None,
            timeout_ms: 3000,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
