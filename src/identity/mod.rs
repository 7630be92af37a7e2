//! Identity subsystem: who is making the request, and with which role.
//!
//! # Data Flow
//! ```text
//! Request headers (Cookie, Authorization)
//!     → SessionCredentials
//!     → IdentityProvider::current_user   (session lookup)
//!     → IdentityProvider::profile_role   (profile lookup by user id)
//!     → Principal { user_id, role }
//! ```
//!
//! # Design Decisions
//! - A signed-out session is `Ok(None)`, never an error
//! - Profile lookups are a tagged result so a missing row and a broken
//!   service stay distinguishable in logs
//! - No caching and no retries here; that belongs to the service

pub mod fixed;
pub mod http;

use std::time::Duration;

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::routing::tenant::Role;
pub use fixed::StaticIdentityProvider;
pub use http::HttpIdentityProvider;

/// Credentials forwarded to the session endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCredentials {
    pub cookie: Option<String>,
    pub authorization: Option<String>,
}

impl SessionCredentials {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let read = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Self {
            cookie: read(header::COOKIE),
            authorization: read(header::AUTHORIZATION),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cookie.is_none() && self.authorization.is_none()
    }
}

/// The signed-in user behind a session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl SessionUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
        }
    }
}

/// A user whose role has been resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: String,
    pub role: Role,
}

/// Outcome of a profile lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileLookup {
    Found(Role),
    NotFound,
    TransportError(String),
}

/// Failure of a session lookup.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("identity service returned status {0}")]
    Status(u16),

    #[error("invalid identity response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("identity call timed out after {0:?}")]
    Timeout(Duration),

    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}

/// External session and profile service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The user behind the credentials; `Ok(None)` when signed out.
    async fn current_user(
        &self,
        credentials: &SessionCredentials,
    ) -> Result<Option<SessionUser>, IdentityError>;

    /// The role stored on the user's profile.
    async fn profile_role(&self, user_id: &str) -> ProfileLookup;
}
