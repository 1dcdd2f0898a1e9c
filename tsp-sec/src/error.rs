//! Error types for TSP model building and solving.

use lazy_mip::{MipError, MipStatus};
use thiserror::Error;

/// Errors that can occur while building or solving a TSP instance.
#[derive(Error, Debug)]
pub enum TspError {
    /// A tour needs at least three vertices
    #[error("TSP needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    /// Two vertex labels compare equal
    #[error("Duplicate vertex {0}")]
    DuplicateVertex(String),

    /// The cost table has no entry for a pair (in either orientation)
    #[error("Missing cost for pair ({0}, {1})")]
    MissingCost(String, String),

    /// A cost is negative, NaN or infinite
    #[error("Invalid cost {cost} for pair ({a}, {b})")]
    InvalidCost {
        /// First endpoint.
        a: String,
        /// Second endpoint.
        b: String,
        /// Offending value.
        cost: f64,
    },

    /// The MIP host failed
    #[error("Solver error: {0}")]
    Solver(#[from] MipError),

    /// The search ended without a feasible tour
    #[error("No tour found (status {0:?})")]
    NoTour(MipStatus),

    /// The final assignment splits into several components
    #[error("Final solution has {0} components")]
    DisconnectedSolution(usize),

    /// The final assignment is connected but not a single cycle
    #[error("Final solution is not a Hamiltonian cycle: {0}")]
    InvalidTour(String),
}

/// Result type for TSP operations.
pub type TspResult<T> = Result<T, TspError>;
