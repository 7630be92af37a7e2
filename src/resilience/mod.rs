//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Identity call:
//!     → timeouts.rs (enforce per-call deadline)
//!     → On expiry: caller treats it as a transport failure
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline
//! - No retries: a failed lookup fails the decision closed

pub mod timeouts;
