//! Compiled route tables.
//!
//! # Responsibilities
//! - Answer "is this path public / protected / a sign-in page"
//! - Build redirect targets for tenants and for sign-in
//!
//! # Design Decisions
//! - Built once from `RoutesConfig` + `AppConfig`, immutable afterwards
//! - Protected lists are indexed by `TenantType`, never by string
//! - All lookups take a bare path; callers strip query/fragment

use url::form_urlencoded;

use crate::config::schema::{AppConfig, ProtectedRoutesConfig, RoutesConfig};
use crate::routing::matcher::{default_path, AccessTable};
use crate::routing::rewriter::bare_path;
use crate::routing::tenant::{Role, TenantType};

/// Immutable access policy shared by every request.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    public: Vec<String>,
    sign_in_path: String,
    auth_pages: Vec<String>,
    protected: ProtectedRoutesConfig,
    access: AccessTable,
    origins: Origins,
}

#[derive(Debug, Clone, Default)]
struct Origins {
    main: Option<String>,
    creator: Option<String>,
    business: Option<String>,
    admin: Option<String>,
}

impl Origins {
    fn from_config(app: &AppConfig) -> Self {
        let trimmed = |tenant| {
            app.origin_for(tenant)
                .map(|origin: &str| origin.trim_end_matches('/').to_string())
        };
        Self {
            main: trimmed(TenantType::Main),
            creator: trimmed(TenantType::Creator),
            business: trimmed(TenantType::Business),
            admin: trimmed(TenantType::Admin),
        }
    }

    fn get(&self, tenant: TenantType) -> Option<&str> {
        match tenant {
            TenantType::Main => self.main.as_deref(),
            TenantType::Creator => self.creator.as_deref(),
            TenantType::Business => self.business.as_deref(),
            TenantType::Admin => self.admin.as_deref(),
        }
    }
}

impl RoutePolicy {
    pub fn from_config(routes: &RoutesConfig, app: &AppConfig) -> Self {
        // Tenant hosts rewrite `/sign-in` to `/<tenant>/sign-in`.
        let mut auth_pages = Vec::new();
        for page in [&routes.sign_in_path, &routes.sign_up_path] {
            auth_pages.push(page.clone());
            for tenant in TenantType::ALL {
                if let Some(prefix) = tenant.prefix() {
                    auth_pages.push(format!("{prefix}{page}"));
                }
            }
        }

        Self {
            public: routes.public.clone(),
            sign_in_path: routes.sign_in_path.clone(),
            auth_pages,
            protected: routes.protected.clone(),
            access: AccessTable::new(routes.access.clone()),
            origins: Origins::from_config(app),
        }
    }

    /// Exact match, or prefix match for entries ending in `/`. A bare `/`
    /// entry only matches the root. Sign-in and sign-up pages are always public.
    pub fn is_public(&self, target: &str) -> bool {
        let path = bare_path(target);
        self.is_auth_page(path)
            || self.public.iter().any(|entry| {
                if entry.len() > 1 && entry.ends_with('/') {
                    path.starts_with(entry.as_str())
                } else {
                    path == entry.as_str()
                }
            })
    }

    /// Prefix match against every tenant list and the general list.
    pub fn is_protected(&self, target: &str) -> bool {
        let path = bare_path(target);
        TenantType::ALL.iter().any(|tenant| {
            self.protected
                .for_tenant(*tenant)
                .iter()
                .any(|prefix| path.starts_with(prefix.as_str()))
        })
    }

    /// Sign-in and sign-up pages and their sub-paths, on any host.
    pub fn is_auth_page(&self, target: &str) -> bool {
        let path = bare_path(target);
        self.auth_pages.iter().any(|page| {
            path.strip_prefix(page.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }

    /// Per-route role check.
    pub fn route_allows(&self, target: &str, role: Role) -> bool {
        self.access.allows(bare_path(target), role)
    }

    /// Landing page of `tenant`, absolute when its origin is configured.
    pub fn tenant_redirect(&self, tenant: TenantType) -> String {
        let path = default_path(tenant);
        match self.origins.get(tenant) {
            Some(origin) => format!("{origin}{path}"),
            None => path,
        }
    }

    /// Sign-in page on the main origin, optionally carrying a return path.
    pub fn sign_in_redirect(&self, return_to: Option<&str>) -> String {
        let mut location = match self.origins.get(TenantType::Main) {
            Some(origin) => format!("{origin}{}", self.sign_in_path),
            None => self.sign_in_path.clone(),
        };
        if let Some(return_to) = return_to {
            location.push_str("?redirect=");
            location.extend(form_urlencoded::byte_serialize(return_to.as_bytes()));
        }
        location
    }

}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self::from_config(&RoutesConfig::default(), &AppConfig::default())
    }
}
