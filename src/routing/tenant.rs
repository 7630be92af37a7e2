//! Tenant and role vocabulary, plus hostname classification.
//!
//! # Responsibilities
//! - Map a `Host` header value to exactly one tenant
//! - Name the URL prefix that owns each tenant's area
//!
//! # Design Decisions
//! - Substring match on `"creator."`, `"business."`, `"admin."` in that order
//! - Case-insensitive; ports and IDN labels are opaque text
//! - Unknown or missing hosts fall back to the main tenant

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The area of the application a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantType {
    Main,
    Creator,
    Business,
    Admin,
}

impl TenantType {
    pub const ALL: [TenantType; 4] = [
        TenantType::Main,
        TenantType::Creator,
        TenantType::Business,
        TenantType::Admin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TenantType::Main => "main",
            TenantType::Creator => "creator",
            TenantType::Business => "business",
            TenantType::Admin => "admin",
        }
    }

    /// Path prefix owning this tenant's pages. The main tenant has none.
    pub fn prefix(&self) -> Option<&'static str> {
        match self {
            TenantType::Main => None,
            TenantType::Creator => Some("/creator"),
            TenantType::Business => Some("/business"),
            TenantType::Admin => Some("/admin"),
        }
    }
}

impl fmt::Display for TenantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role stored on a user's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Creator,
    Business,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Creator => "creator",
            Role::Business => "business",
            Role::Admin => "admin",
        }
    }

    /// The tenant whose dashboard this role lands on.
    pub fn home_tenant(&self) -> TenantType {
        match self {
            Role::Creator => TenantType::Creator,
            Role::Business => TenantType::Business,
            Role::Admin => TenantType::Admin,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a profile carries a role this gateway does not know.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized role: {0:?}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "creator" => Ok(Role::Creator),
            "business" => Ok(Role::Business),
            "admin" => Ok(Role::Admin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// Subdomain markers, checked in priority order.
const HOST_MARKERS: [(&str, TenantType); 3] = [
    ("creator.", TenantType::Creator),
    ("business.", TenantType::Business),
    ("admin.", TenantType::Admin),
];

/// Classify a raw `Host` header value.
///
/// The marker may appear anywhere in the host, not only as its first label:
/// `api.creator.example.com` is a creator host.
pub fn classify(hostname: &str) -> TenantType {
    if hostname.is_empty() {
        return TenantType::Main;
    }

    let host = hostname.to_lowercase();
    HOST_MARKERS
        .iter()
        .find(|(marker, _)| host.contains(marker))
        .map(|(_, tenant)| *tenant)
        .unwrap_or(TenantType::Main)
}
