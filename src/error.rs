//! Errors raised while deciding how to route a request.

use thiserror::Error;

use crate::identity::IdentityError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("session lookup failed: {0}")]
    Session(#[from] IdentityError),

    #[error("rewritten target {0:?} is not a valid URI")]
    InvalidTarget(String),
}
