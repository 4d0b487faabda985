//! Fractional solver configuration.

use serde::{Deserialize, Serialize};

use crate::error::{FractionalError, FractionalResult};
use crate::soe_kernel::{ALPHA_CEIL, ALPHA_FLOOR};

/// Runtime configuration for [`FractionalSolver`](crate::solver::FractionalSolver).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractionalSolverConfig {
    /// Memory horizon T_max (s). Decay rates span [1/T_max, 100/T_max].
    /// Default: 10.0
    pub t_max: f64,

    /// Number of exponential terms per kernel.
    /// Default: 12
    pub soe_rank: usize,

    /// Nominal time step (s). Validated and carried for config files shared
    /// with the field; the solver itself never reads it, since
    /// `update_history` takes the step as an argument.
    /// Default: 0.001
    pub dt: f64,

    /// Smallest admissible α (maximum memory).
    /// Default: 1.0
    pub alpha_min: f64,

    /// Largest admissible α (no memory).
    /// Default: 2.0
    pub alpha_max: f64,

    /// Two α values closer than this share one cached kernel.
    /// Default: 1e-6
    pub kernel_tolerance: f64,
}

impl Default for FractionalSolverConfig {
    fn default() -> Self {
        Self {
            t_max: 10.0,
            soe_rank: 12,
            dt: 0.001,
            alpha_min: 1.0,
            alpha_max: 2.0,
            kernel_tolerance: 1e-6,
        }
    }
}

impl FractionalSolverConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> FractionalResult<()> {
        if !(self.t_max.is_finite() && self.t_max > 0.0) {
            return Err(FractionalError::Config(format!(
                "t_max must be finite and > 0, got {}",
                self.t_max
            )));
        }
        if self.soe_rank == 0 {
            return Err(FractionalError::Config("soe_rank must be >= 1".to_string()));
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(FractionalError::Config(format!(
                "dt must be finite and > 0, got {}",
                self.dt
            )));
        }
        if !(ALPHA_FLOOR..=ALPHA_CEIL).contains(&self.alpha_min)
            || !(ALPHA_FLOOR..=ALPHA_CEIL).contains(&self.alpha_max)
            || self.alpha_min > self.alpha_max
        {
            return Err(FractionalError::Config(format!(
                "alpha range [{}, {}] must be ordered and inside [{}, {}]",
                self.alpha_min, self.alpha_max, ALPHA_FLOOR, ALPHA_CEIL
            )));
        }
        if !(self.kernel_tolerance.is_finite() && self.kernel_tolerance > 0.0) {
            return Err(FractionalError::Config(format!(
                "kernel_tolerance must be finite and > 0, got {}",
                self.kernel_tolerance
            )));
        }
        Ok(())
    }

    /// Load from JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> FractionalResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| FractionalError::Config(format!("JSON parse error: {e}")))
    }
}
