//! Error type for the field simulator.

use fractional_memory::error::FractionalError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FieldError {
    /// Grid coordinate outside [0, n) on some axis.
    #[error("grid point ({i}, {j}, {k}) outside {nx}x{ny}x{nz} grid")]
    OutOfRange {
        i: usize,
        j: usize,
        k: usize,
        nx: usize,
        ny: usize,
        nz: usize,
    },

    /// α outside the configured memory range.
    #[error("alpha {value} outside [{min}, {max}]")]
    InvalidAlpha { value: f64, min: f64, max: f64 },

    /// A per-point input slice does not cover the grid.
    #[error("{what} has {actual} entries, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Fractional(#[from] FractionalError),
}

pub type FieldResult<T> = Result<T, FieldError>;
