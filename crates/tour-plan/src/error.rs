//! Planning-subsystem error type.
//!
//! Per-attempt failures (a leg search finding no path, a loop landing outside
//! the tolerance band) are absorbed by the planner's retry loop and never
//! surface here individually — callers only ever observe the aggregate
//! [`PlanError::RoundTripFailed`] or a successful loop.

use thiserror::Error;

/// Errors surfaced by `tour-plan` to callers.
#[derive(Debug, Error)]
pub enum PlanError {
    /// A caller-supplied parameter is out of its valid domain.  Surfaced
    /// immediately; never retried.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A tour strategy was queried outside `0..point_count()`.
    #[error("tour iteration {index} out of range ({count} points generated)")]
    IndexOutOfRange { index: usize, count: usize },

    /// Retries (or the wall-clock budget) were exhausted without an
    /// acceptable loop.
    #[error("no acceptable round trip found after {attempts} attempts")]
    RoundTripFailed { attempts: u32 },

    /// The caller cancelled the request; planning stopped at a leg boundary.
    #[error("round trip planning cancelled")]
    Cancelled,
}

pub type PlanResult<T> = Result<T, PlanError>;
