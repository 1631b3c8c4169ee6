//! Checker-level failures.

use thiserror::Error;
use tyrel_solver::SolverError;

#[derive(Debug, Error)]
pub enum CheckerError {
    /// The host cancelled the check between two declarations.
    #[error("check cancelled after {checked} top-level declaration(s)")]
    Cancelled { checked: usize },

    /// A query ran into an internal invariant violation.
    #[error("internal error: {0}")]
    Internal(#[from] SolverError),

    #[error("failed to serialize check report: {0}")]
    Serialization(#[from] serde_json::Error),
}
