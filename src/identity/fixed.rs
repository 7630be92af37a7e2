//! In-process identity provider with a fixed answer.
//!
//! Used when `identity.enabled = false` (everyone is anonymous), by the
//! operator CLI to explain decisions for a given role, and by tests. Call
//! counts are kept so callers can assert how often the service was consulted.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::identity::{
    IdentityError, IdentityProvider, ProfileLookup, Role, SessionCredentials, SessionUser,
};

#[derive(Debug)]
enum SessionAnswer {
    SignedOut,
    User(SessionUser),
    Failure(String),
}

#[derive(Debug)]
pub struct StaticIdentityProvider {
    session: SessionAnswer,
    profile: ProfileLookup,
    session_calls: AtomicUsize,
    profile_calls: AtomicUsize,
}

impl StaticIdentityProvider {
    fn new(session: SessionAnswer, profile: ProfileLookup) -> Self {
        Self {
            session,
            profile,
            session_calls: AtomicUsize::new(0),
            profile_calls: AtomicUsize::new(0),
        }
    }

    /// Every session is signed out.
    pub fn anonymous() -> Self {
        Self::new(SessionAnswer::SignedOut, ProfileLookup::NotFound)
    }

    /// Every session belongs to `user_id` with `role`.
    pub fn signed_in(user_id: impl Into<String>, role: Role) -> Self {
        Self::with_profile(user_id, ProfileLookup::Found(role))
    }

    /// Every session belongs to `user_id`; the profile lookup answers `profile`.
    pub fn with_profile(user_id: impl Into<String>, profile: ProfileLookup) -> Self {
        Self::new(SessionAnswer::User(SessionUser::new(user_id)), profile)
    }

    /// Every session lookup fails.
    pub fn failing_session(reason: impl Into<String>) -> Self {
        Self::new(SessionAnswer::Failure(reason.into()), ProfileLookup::NotFound)
    }

    pub fn session_calls(&self) -> usize {
        self.session_calls.load(Ordering::SeqCst)
    }

    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.session_calls() + self.profile_calls()
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn current_user(
        &self,
        _credentials: &SessionCredentials,
    ) -> Result<Option<SessionUser>, IdentityError> {
        self.session_calls.fetch_add(1, Ordering::SeqCst);
        match &self.session {
            SessionAnswer::SignedOut => Ok(None),
            SessionAnswer::User(user) => Ok(Some(user.clone())),
            SessionAnswer::Failure(reason) => Err(IdentityError::Unavailable(reason.clone())),
        }
    }

    async fn profile_role(&self, _user_id: &str) -> ProfileLookup {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.profile.clone()
    }
}
