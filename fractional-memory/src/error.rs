//! Error type for the fractional-memory solver.

use thiserror::Error;

/// Failures raised by [`FractionalSolver`](crate::solver::FractionalSolver)
/// and its configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FractionalError {
    /// A single-point query addressed a point the solver does not own.
    #[error("point index {index} out of range for {num_points} points")]
    PointOutOfRange { index: usize, num_points: usize },

    /// A per-point input slice does not cover the solver's grid.
    #[error("{what} has {actual} entries, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Invalid solver configuration.
    #[error("config error: {0}")]
    Config(String),
}

pub type FractionalResult<T> = Result<T, FractionalError>;
