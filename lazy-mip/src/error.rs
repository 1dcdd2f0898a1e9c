//! Failure modes of a solve.
//!
//! Running out of nodes, time or gap is not an error; those end with a
//! [`MipStatus`](crate::MipStatus). Everything here aborts the solve.

use thiserror::Error;

/// Why a solve stopped without a status.
#[derive(Error, Debug)]
pub enum MipError {
    /// The model or the settings cannot be solved as given.
    #[error("invalid problem: {0}")]
    InvalidProblem(String),

    /// The LP backend failed or returned garbage.
    #[error("LP relaxation failed: {0}")]
    MasterSolveError(String),

    /// The relaxation has no finite optimum.
    #[error("LP relaxation is unbounded")]
    Unbounded,

    /// A constraint handler broke its contract.
    #[error("handler {handler}: {reason}")]
    HandlerError {
        /// Handler name.
        handler: String,
        /// What it did wrong.
        reason: String,
    },

    /// Enforcement at one node did not settle within the round limit.
    #[error("node {node}: no settled enforcement after {rounds} rounds")]
    EnforceLimit {
        /// Node id.
        node: u64,
        /// Configured limit.
        rounds: usize,
    },

    /// Broken solver invariant.
    #[error("internal error: {0}")]
    InternalError(String),
}

impl MipError {
    pub(crate) fn handler(handler: &str, reason: impl Into<String>) -> Self {
        MipError::HandlerError {
            handler: handler.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Result alias for this crate.
pub type MipResult<T> = Result<T, MipError>;
