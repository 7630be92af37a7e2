//! Path rewriting into a tenant's area.
//!
//! # Responsibilities
//! - Normalize repeated slashes in the path component
//! - Prefix tenant paths (`/campaigns` → `/creator/campaigns`)
//! - Leave infrastructure paths alone (`/api/`, `/_next/`, ...)
//!
//! # Design Decisions
//! - Query and fragment are split off first and reattached verbatim
//! - Idempotent: an already-prefixed path is returned as is
//! - Backslashes are ordinary characters, never separators

use crate::routing::matcher::default_path;
use crate::routing::tenant::TenantType;

/// Paths served identically on every tenant host.
pub const EXCLUDED_PREFIXES: [&str; 5] = ["/auth/", "/api/", "/_next/", "/favicon", "/public/"];

/// A request target split into path, query and fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitTarget<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub fragment: Option<&'a str>,
}

impl<'a> SplitTarget<'a> {
    pub fn parse(target: &'a str) -> Self {
        let (rest, fragment) = match target.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (target, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };
        Self { path, query, fragment }
    }

    /// Join a new path with this target's query and fragment.
    pub fn reattach(&self, path: &str) -> String {
        let mut out = String::with_capacity(
            path.len()
                + self.query.map_or(0, |q| q.len() + 1)
                + self.fragment.map_or(0, |f| f.len() + 1),
        );
        out.push_str(path);
        if let Some(query) = self.query {
            out.push('?');
            out.push_str(query);
        }
        if let Some(fragment) = self.fragment {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }
}

/// Strip query and fragment from a target.
pub fn bare_path(target: &str) -> &str {
    SplitTarget::parse(target).path
}

/// Rewrite a raw request target for the given tenant.
pub fn rewrite_path(target: &str, tenant: TenantType) -> String {
    if target.is_empty() {
        return default_path(tenant);
    }

    let split = SplitTarget::parse(target);
    let path = collapse_slashes(split.path);

    let rewritten = match tenant.prefix() {
        None => path,
        Some(prefix) => prefix_path(path, prefix),
    };

    split.reattach(&rewritten)
}

fn prefix_path(path: String, prefix: &str) -> String {
    if is_excluded(&path) || path.starts_with(prefix) {
        return path;
    }

    if path == "/" || path == "/dashboard" {
        return format!("{prefix}/dashboard");
    }

    format!("{prefix}{path}")
}

/// True for paths no tenant prefix is ever applied to.
pub fn is_excluded(path: &str) -> bool {
    EXCLUDED_PREFIXES.iter().any(|p| path.starts_with(p))
}

fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_slash = false;
    for c in path.chars() {
        if c == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const TENANTS: [TenantType; 3] = [TenantType::Creator, TenantType::Business, TenantType::Admin];

    #[test]
    fn test_empty_path() {
        assert_eq!(rewrite_path("", TenantType::Main), "/");
        assert_eq!(rewrite_path("", TenantType::Creator), "/creator/dashboard");
        assert_eq!(rewrite_path("", TenantType::Admin), "/admin/dashboard");
    }

    #[test]
    fn test_query_only_target_gets_bare_prefix() {
        assert_eq!(rewrite_path("?x=1", TenantType::Creator), "/creator?x=1");
        assert_eq!(rewrite_path("#top", TenantType::Business), "/business#top");
        assert_eq!(rewrite_path("?x=1", TenantType::Main), "?x=1");
    }

    #[test]
    fn test_main_never_prefixed() {
        assert_eq!(rewrite_path("/campaigns", TenantType::Main), "/campaigns");
        assert_eq!(rewrite_path("/", TenantType::Main), "/");
        assert_eq!(rewrite_path("//a///b", TenantType::Main), "/a/b");
    }

    #[test]
    fn test_root_and_dashboard_map_to_dashboard() {
        assert_eq!(rewrite_path("/", TenantType::Creator), "/creator/dashboard");
        assert_eq!(rewrite_path("/dashboard", TenantType::Business), "/business/dashboard");
        assert_eq!(rewrite_path("/?tab=1", TenantType::Admin), "/admin/dashboard?tab=1");
    }

    #[test]
    fn test_prefixes_tenant_paths() {
        assert_eq!(rewrite_path("/campaigns", TenantType::Creator), "/creator/campaigns");
        assert_eq!(rewrite_path("/users/42", TenantType::Admin), "/admin/users/42");
        assert_eq!(
            rewrite_path("/dashboard/stats", TenantType::Business),
            "/business/dashboard/stats"
        );
    }

    #[test]
    fn test_preserves_query_and_fragment() {
        assert_eq!(
            rewrite_path("/campaigns?status=active", TenantType::Creator),
            "/creator/campaigns?status=active"
        );
        assert_eq!(
            rewrite_path("/campaigns?a=1&a=2#top", TenantType::Creator),
            "/creator/campaigns?a=1&a=2#top"
        );
        // Slashes inside the query are left untouched.
        assert_eq!(
            rewrite_path("//offers?next=http://x//y", TenantType::Business),
            "/business/offers?next=http://x//y"
        );
        assert_eq!(rewrite_path("/x#frag?not-query", TenantType::Admin), "/admin/x#frag?not-query");
    }

    #[test]
    fn test_collapses_slashes() {
        assert_eq!(rewrite_path("//campaigns//new", TenantType::Creator), "/creator/campaigns/new");
        assert_eq!(rewrite_path("///", TenantType::Creator), "/creator/dashboard");
    }

    #[test]
    fn test_excluded_prefixes_untouched() {
        for tenant in TENANTS {
            assert_eq!(rewrite_path("/api/stats?x=1", tenant), "/api/stats?x=1");
            assert_eq!(rewrite_path("/auth/callback", tenant), "/auth/callback");
            assert_eq!(rewrite_path("/_next/data/x.json", tenant), "/_next/data/x.json");
            assert_eq!(rewrite_path("/favicon.ico", tenant), "/favicon.ico");
            assert_eq!(rewrite_path("/public/logo.svg", tenant), "/public/logo.svg");
        }
        // Only the slash-terminated form is excluded.
        assert_eq!(rewrite_path("/api", TenantType::Creator), "/creator/api");
    }

    #[test]
    fn test_already_prefixed_untouched() {
        assert_eq!(rewrite_path("/creator/campaigns", TenantType::Creator), "/creator/campaigns");
        assert_eq!(rewrite_path("/admin", TenantType::Admin), "/admin");
        // Another tenant's prefix is not special.
        assert_eq!(
            rewrite_path("/creator/campaigns", TenantType::Business),
            "/business/creator/campaigns"
        );
    }

    #[test]
    fn test_backslashes_are_literal() {
        assert_eq!(rewrite_path("\\campaigns", TenantType::Creator), "/creator\\campaigns");
        assert_eq!(rewrite_path("/a\\\\b", TenantType::Creator), "/creator/a\\\\b");
    }

    #[test]
    fn test_idempotent() {
        let paths = [
            "",
            "/",
            "/dashboard",
            "/campaigns?status=active",
            "//a//b#c",
            "/api/x",
            "?only=query",
            "/creator",
            "\\odd",
        ];
        for tenant in TenantType::ALL {
            for path in paths {
                let once = rewrite_path(path, tenant);
                assert_eq!(rewrite_path(&once, tenant), once, "{tenant} {path:?}");
            }
        }
    }

    #[test]
    fn test_non_main_gets_prefix() {
        for tenant in TENANTS {
            let prefix = tenant.prefix().unwrap();
            for path in ["/x", "/deals/1", "/settings?tab=2", "/a.b"] {
                assert!(rewrite_path(path, tenant).starts_with(prefix));
            }
        }
    }

    #[test]
    fn test_split_target() {
        let t = SplitTarget::parse("/a?b=1#c");
        assert_eq!(t.path, "/a");
        assert_eq!(t.query, Some("b=1"));
        assert_eq!(t.fragment, Some("c"));
        assert_eq!(t.reattach("/z"), "/z?b=1#c");
        assert_eq!(SplitTarget::parse("/a?").reattach("/a"), "/a?");
        assert_eq!(bare_path("/p?q"), "/p");
    }
}
