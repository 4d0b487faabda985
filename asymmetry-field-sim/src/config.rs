//! Field and driver configuration.

use fractional_memory::config::FractionalSolverConfig;
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FieldResult};
use crate::grid::GridDims;

/// Grid geometry, potential couplings and time step of a
/// [`SymmetryField`](crate::field::SymmetryField).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymmetryFieldConfig {
    /// Grid points along x.
    /// Default: 64
    pub nx: usize,
    /// Grid points along y.
    /// Default: 64
    pub ny: usize,
    /// Grid points along z.
    /// Default: 64
    pub nz: usize,

    /// Spacing along x (m).
    /// Default: 1000.0
    pub dx: f64,
    /// Spacing along y (m).
    /// Default: 1000.0
    pub dy: f64,
    /// Spacing along z (m).
    /// Default: 1000.0
    pub dz: f64,

    /// Quartic coupling κ in V = λ|δΦ|² + κ|δΦ|⁴.
    /// Default: 1.0
    pub kappa: f64,
    /// Quadratic coupling λ.
    /// Default: 0.1
    pub lambda: f64,

    /// Smallest admissible α.
    /// Default: 1.0
    pub alpha_min: f64,
    /// Largest admissible α; every point starts here.
    /// Default: 2.0
    pub alpha_max: f64,

    /// Explicit Euler step (s).
    /// Default: 0.001
    pub dt: f64,
}

impl Default for SymmetryFieldConfig {
    fn default() -> Self {
        Self {
            nx: 64,
            ny: 64,
            nz: 64,
            dx: 1000.0,
            dy: 1000.0,
            dz: 1000.0,
            kappa: 1.0,
            lambda: 0.1,
            alpha_min: 1.0,
            alpha_max: 2.0,
            dt: 0.001,
        }
    }
}

fn positive(name: &str, value: f64) -> FieldResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FieldError::Config(format!("{name} must be finite and > 0, got {value}")))
    }
}

impl SymmetryFieldConfig {
    pub fn dims(&self) -> GridDims {
        GridDims::new(self.nx, self.ny, self.nz)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> FieldResult<()> {
        if self.nx == 0 || self.ny == 0 || self.nz == 0 {
            return Err(FieldError::Config(format!(
                "grid dimensions must be >= 1, got {}x{}x{}",
                self.nx, self.ny, self.nz
            )));
        }
        positive("dx", self.dx)?;
        positive("dy", self.dy)?;
        positive("dz", self.dz)?;
        positive("dt", self.dt)?;
        if !(self.kappa.is_finite() && self.lambda.is_finite()) {
            return Err(FieldError::Config("kappa and lambda must be finite".to_string()));
        }
        if !(self.alpha_min.is_finite() && self.alpha_max.is_finite())
            || self.alpha_min > self.alpha_max
        {
            return Err(FieldError::Config(format!(
                "alpha range [{}, {}] must be finite and ordered",
                self.alpha_min, self.alpha_max
            )));
        }
        Ok(())
    }

    /// Load from JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> FieldResult<Self> {
        serde_json::from_str(json).map_err(|e| FieldError::Config(format!("JSON parse error: {e}")))
    }
}

/// How the driver obtains ∂²δΦ/∂t² for the history update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondDerivativeMode {
    /// Feed zeros; the memory term never accumulates.
    Zero,
    /// Backward second difference over the last three snapshots.
    #[default]
    FiniteDifference,
}

/// Configuration of a full [`Simulation`](crate::simulation::Simulation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub field: SymmetryFieldConfig,
    pub solver: FractionalSolverConfig,

    /// Record a [`StepRecord`](crate::simulation::StepRecord) every this many steps.
    /// Default: 10
    pub output_interval: usize,

    /// Default: FiniteDifference
    pub second_derivative: SecondDerivativeMode,

    /// Kernels to build up front over the solver's α range (0 = build lazily).
    /// Default: 0
    pub precompute_alpha_samples: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            field: SymmetryFieldConfig::default(),
            solver: FractionalSolverConfig::default(),
            output_interval: 10,
            second_derivative: SecondDerivativeMode::default(),
            precompute_alpha_samples: 0,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> FieldResult<()> {
        self.field.validate()?;
        self.solver.validate()?;
        if self.output_interval == 0 {
            return Err(FieldError::Config("output_interval must be >= 1".to_string()));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> FieldResult<Self> {
        serde_json::from_str(json).map_err(|e| FieldError::Config(format!("JSON parse error: {e}")))
    }
}
