//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap identity-service calls with a deadline
//! - Report an elapsed deadline as a distinct outcome
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - The wrapped future is dropped on expiry; no cleanup beyond that

use std::future::Future;
use std::time::Duration;

/// The deadline expired before the call finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("deadline of {0:?} elapsed")]
pub struct DeadlineElapsed(pub Duration);

/// Run `fut` with a deadline.
pub async fn with_deadline<F>(deadline: Duration, fut: F) -> Result<F::Output, DeadlineElapsed>
where
    F: Future,
{
    tokio::time::timeout(deadline, fut)
        .await
        .map_err(|_| DeadlineElapsed(deadline))
}
