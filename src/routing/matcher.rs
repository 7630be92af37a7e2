//! Role matching and landing paths.
//!
//! # Responsibilities
//! - Decide whether a role may use a tenant's host at all
//! - Resolve the landing path of each tenant
//! - Apply the finer per-route role table
//!
//! # Design Decisions
//! - Admin bypasses every tenant and route restriction
//! - The main tenant is open to every role
//! - Route rules use plain prefix matching and combine with AND semantics

use serde::{Deserialize, Serialize};

use crate::routing::tenant::{Role, TenantType};

/// Whether `role` may be served on `tenant`'s host.
pub fn matches(tenant: TenantType, role: Role) -> bool {
    if role == Role::Admin || tenant == TenantType::Main {
        return true;
    }
    tenant.as_str() == role.as_str()
}

/// Canonical landing path for a tenant.
pub fn default_path(tenant: TenantType) -> String {
    match tenant.prefix() {
        None => "/".to_string(),
        Some(prefix) => format!("{prefix}/dashboard"),
    }
}

/// Roles allowed under a path prefix.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AccessRule {
    pub prefix: String,
    pub roles: Vec<Role>,
}

impl AccessRule {
    pub fn new(prefix: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            prefix: prefix.into(),
            roles,
        }
    }

    fn applies_to(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    fn permits(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Per-route role table consulted after the tenant check passes.
#[derive(Debug, Clone, Default)]
pub struct AccessTable {
    rules: Vec<AccessRule>,
}

impl AccessTable {
    pub fn new(rules: Vec<AccessRule>) -> Self {
        Self { rules }
    }

    /// Every rule whose prefix covers `path` must list `role`.
    pub fn allows(&self, path: &str, role: Role) -> bool {
        if role == Role::Admin {
            return true;
        }
        self.rules
            .iter()
            .filter(|rule| rule.applies_to(path))
            .all(|rule| rule.permits(role))
    }

    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }
}
