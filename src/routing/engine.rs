//! Per-request routing decision.
//!
//! # State Machine
//! ```text
//! Start ──static asset──────────────────────────────▶ PassThrough
//!   │
//!   ▼
//! Classified (tenant, rewritten path)
//!   ├─ public ─── signed-in user on sign-in/up ──────▶ Redirect(landing)
//!   │        └─── otherwise ─────────────────────────▶ Rewrite | PassThrough
//!   ├─ protected ─ no session ───────────────────────▶ Redirect(sign-in?redirect=…)
//!   │           ├─ no role (missing or lookup error) ▶ Redirect(sign-in)
//!   │           ├─ wrong tenant / route for role ────▶ Redirect(role landing)
//!   │           └─ allowed ──────────────────────────▶ Rewrite | PassThrough
//!   └─ neither ──────────────────────────────────────▶ Rewrite | PassThrough
//!
//! Session lookup failure anywhere ─▶ public original path ? PassThrough : Redirect(sign-in)
//! ```
//!
//! # Design Decisions
//! - Static assets never reach the identity service
//! - Failures deny: a lookup that cannot complete never admits a request
//! - One decision per request, no state kept between requests

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::GatewayError;
use crate::identity::{
    IdentityError, IdentityProvider, Principal, ProfileLookup, SessionCredentials, SessionUser,
};
use crate::observability::metrics;
use crate::resilience::timeouts::with_deadline;
use crate::routing::context::RequestContext;
use crate::routing::matcher::matches;
use crate::routing::policy::RoutePolicy;
use crate::routing::rewriter::rewrite_path;
use crate::routing::tenant::{classify, Role, TenantType};

/// What the server should do with a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum RoutingDecision {
    /// Forward unchanged.
    PassThrough,
    /// Forward with this path (and query) substituted.
    Rewrite(String),
    /// Answer 307 with this `Location`.
    Redirect(String),
}

impl RoutingDecision {
    pub fn label(&self) -> &'static str {
        match self {
            RoutingDecision::PassThrough => "pass_through",
            RoutingDecision::Rewrite(_) => "rewrite",
            RoutingDecision::Redirect(_) => "redirect",
        }
    }
}

/// A decision plus what was learned while making it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingOutcome {
    /// `None` when the static-asset guard answered before classification.
    pub tenant: Option<TenantType>,
    pub decision: RoutingDecision,
    pub principal: Option<Principal>,
}

impl RoutingOutcome {
    fn new(tenant: TenantType, decision: RoutingDecision) -> Self {
        Self {
            tenant: Some(tenant),
            decision,
            principal: None,
        }
    }

    fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }
}

/// `/_next`, `/favicon`, or anything with a dot in the path.
pub fn is_static_asset(path: &str) -> bool {
    path.starts_with("/_next") || path.starts_with("/favicon") || path.contains('.')
}

pub struct RoutingEngine {
    policy: Arc<RoutePolicy>,
    identity: Arc<dyn IdentityProvider>,
    identity_timeout: Duration,
}

impl RoutingEngine {
    pub fn new(
        policy: Arc<RoutePolicy>,
        identity: Arc<dyn IdentityProvider>,
        identity_timeout: Duration,
    ) -> Self {
        Self {
            policy,
            identity,
            identity_timeout,
        }
    }

    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    /// Decide how to serve one request.
    pub async fn decide(
        &self,
        ctx: &RequestContext,
        credentials: &SessionCredentials,
    ) -> RoutingOutcome {
        if is_static_asset(ctx.path()) {
            return RoutingOutcome {
                tenant: None,
                decision: RoutingDecision::PassThrough,
                principal: None,
            };
        }

        let tenant = classify(ctx.hostname());
        let original = ctx.target();
        let rewritten = rewrite_path(&original, tenant);

        match self.route(ctx, tenant, &original, &rewritten, credentials).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(
                    tenant = %tenant,
                    path = %ctx.path(),
                    error = %err,
                    "Routing failed, applying fallback"
                );
                RoutingOutcome::new(tenant, self.fallback(ctx))
            }
        }
    }

    /// Decision used when the pipeline cannot finish.
    pub fn fallback(&self, ctx: &RequestContext) -> RoutingDecision {
        if self.policy.is_public(ctx.path()) {
            RoutingDecision::PassThrough
        } else {
            RoutingDecision::Redirect(self.policy.sign_in_redirect(None))
        }
    }

    async fn route(
        &self,
        ctx: &RequestContext,
        tenant: TenantType,
        original: &str,
        rewritten: &str,
        credentials: &SessionCredentials,
    ) -> Result<RoutingOutcome, GatewayError> {
        let forward = || {
            if rewritten == original {
                RoutingDecision::PassThrough
            } else {
                RoutingDecision::Rewrite(rewritten.to_string())
            }
        };

        if self.policy.is_public(rewritten) {
            let outcome = match self.route_auth_page(ctx, tenant, credentials).await {
                Some(outcome) => outcome,
                None => RoutingOutcome::new(tenant, forward()),
            };
            return Ok(outcome);
        }

        if self.policy.is_protected(rewritten) {
            let outcome = match self.route_protected(tenant, rewritten, credentials).await? {
                Admission::Admitted(principal) => {
                    RoutingOutcome::new(tenant, forward()).with_principal(principal)
                }
                Admission::Denied(outcome) => outcome,
            };
            return Ok(outcome);
        }

        Ok(RoutingOutcome::new(tenant, forward()))
    }

    /// Signed-in users opening sign-in or sign-up are sent to their dashboard.
    async fn route_auth_page(
        &self,
        ctx: &RequestContext,
        tenant: TenantType,
        credentials: &SessionCredentials,
    ) -> Option<RoutingOutcome> {
        if !self.policy.is_auth_page(ctx.path()) {
            return None;
        }

        let user = match self.current_user(credentials).await {
            Ok(Some(user)) => user,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Session lookup failed on public page");
                return None;
            }
        };

        let role = match self.profile_role(&user).await {
            Some(role) => role,
            None => return None,
        };

        let landing = role.home_tenant();
        tracing::debug!(
            user_id = %user.id,
            role = %role,
            tenant = %tenant,
            "Signed-in user on auth page, sending to own dashboard"
        );
        let decision = RoutingDecision::Redirect(self.policy.tenant_redirect(landing));
        Some(RoutingOutcome::new(tenant, decision).with_principal(Principal {
            user_id: user.id,
            role,
        }))
    }

    async fn route_protected(
        &self,
        tenant: TenantType,
        rewritten: &str,
        credentials: &SessionCredentials,
    ) -> Result<Admission, GatewayError> {
        let deny = |decision| Ok(Admission::Denied(RoutingOutcome::new(tenant, decision)));

        let Some(user) = self.current_user(credentials).await? else {
            tracing::debug!(tenant = %tenant, path = %rewritten, "No session for protected path");
            return deny(RoutingDecision::Redirect(
                self.policy.sign_in_redirect(Some(rewritten)),
            ));
        };

        let Some(role) = self.profile_role(&user).await else {
            return deny(RoutingDecision::Redirect(self.policy.sign_in_redirect(None)));
        };

        let principal = Principal {
            user_id: user.id,
            role,
        };

        if !matches(tenant, role) {
            tracing::info!(
                user_id = %principal.user_id,
                role = %role,
                tenant = %tenant,
                "Role does not belong to tenant, redirecting to its own area"
            );
            return Ok(Admission::Denied(
                RoutingOutcome::new(
                    tenant,
                    RoutingDecision::Redirect(self.policy.tenant_redirect(role.home_tenant())),
                )
                .with_principal(principal),
            ));
        }

        if !self.policy.route_allows(rewritten, role) {
            tracing::info!(
                user_id = %principal.user_id,
                role = %role,
                path = %rewritten,
                "Route not open to role, redirecting to its own area"
            );
            return Ok(Admission::Denied(
                RoutingOutcome::new(
                    tenant,
                    RoutingDecision::Redirect(self.policy.tenant_redirect(role.home_tenant())),
                )
                .with_principal(principal),
            ));
        }

        Ok(Admission::Admitted(principal))
    }

    async fn current_user(
        &self,
        credentials: &SessionCredentials,
    ) -> Result<Option<SessionUser>, IdentityError> {
        let start = Instant::now();
        let result = match with_deadline(
            self.identity_timeout,
            self.identity.current_user(credentials),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(IdentityError::Timeout(self.identity_timeout)),
        };

        let outcome = match &result {
            Ok(Some(_)) => "user",
            Ok(None) => "anonymous",
            Err(_) => "error",
        };
        metrics::record_identity_call("session", outcome, start);
        result
    }

    /// The user's role, or `None` when it cannot be determined.
    async fn profile_role(&self, user: &SessionUser) -> Option<Role> {
        let start = Instant::now();
        let lookup = match with_deadline(self.identity_timeout, self.identity.profile_role(&user.id))
            .await
        {
            Ok(lookup) => lookup,
            Err(elapsed) => ProfileLookup::TransportError(elapsed.to_string()),
        };

        match lookup {
            ProfileLookup::Found(role) => {
                metrics::record_identity_call("profile", "found", start);
                Some(role)
            }
            ProfileLookup::NotFound => {
                metrics::record_identity_call("profile", "not_found", start);
                tracing::debug!(user_id = %user.id, "No profile for user");
                None
            }
            ProfileLookup::TransportError(detail) => {
                metrics::record_identity_call("profile", "error", start);
                tracing::warn!(user_id = %user.id, error = %detail, "Profile lookup failed");
                None
            }
        }
    }
}

enum Admission {
    Admitted(Principal),
    Denied(RoutingOutcome),
}
