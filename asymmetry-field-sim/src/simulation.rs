//! Per-step coupling of the field and the fractional memory.
//!
//! Each step:
//! 1. Ask the [`SourceModel`] for S at the current time
//! 2. Read the memory term D_frac from the solver's history
//! 3. Advance δΦ with [`SymmetryField::evolve_step`]
//! 4. Estimate ∂²δΦ/∂t² (see [`SecondDerivativeMode`])
//! 5. Feed it to [`FractionalSolver::update_history`]
//! 6. Every `output_interval` steps, record energy and peak amplitude

use fractional_memory::solver::FractionalSolver;
use log::info;
use num_complex::Complex64;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::config::{SecondDerivativeMode, SimulationConfig};
use crate::error::FieldResult;
use crate::field::SymmetryField;

/// Supplier of external source terms, one per grid point in flat order.
pub trait SourceModel {
    fn source_terms(&mut self, field: &SymmetryField, time: f64) -> Vec<Complex64>;
}

/// No external driving.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSource;

impl SourceModel for NoSource {
    fn source_terms(&mut self, field: &SymmetryField, _time: f64) -> Vec<Complex64> {
        vec![Complex64::zero(); field.total_points()]
    }
}

impl<F> SourceModel for F
where
    F: FnMut(&SymmetryField, f64) -> Vec<Complex64>,
{
    fn source_terms(&mut self, field: &SymmetryField, time: f64) -> Vec<Complex64> {
        self(field, time)
    }
}

/// Diagnostics sampled after a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// 1-based step count.
    pub step: usize,
    pub time: f64,
    pub total_energy: f64,
    pub max_amplitude: f64,
}

#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    field: SymmetryField,
    solver: FractionalSolver,
    steps_taken: usize,
    /// δΦ one step before the pre-step field, for the backward difference.
    older: Option<Vec<Complex64>>,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> FieldResult<Self> {
        config.validate()?;
        let field = SymmetryField::new(config.field.clone())?;
        let mut solver = FractionalSolver::new(config.solver.clone(), field.total_points())?;
        if config.precompute_alpha_samples > 0 {
            solver.precompute_kernels(config.precompute_alpha_samples);
        }

        let dims = field.dims();
        info!(
            "simulation: {}x{}x{} grid, dt={}, rank {}, {:?} second derivative",
            dims.nx,
            dims.ny,
            dims.nz,
            config.field.dt,
            config.solver.soe_rank,
            config.second_derivative
        );

        Ok(Self {
            config,
            field,
            solver,
            steps_taken: 0,
            older: None,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn field(&self) -> &SymmetryField {
        &self.field
    }

    /// Mutable field access for setting initial conditions and α profiles.
    pub fn field_mut(&mut self) -> &mut SymmetryField {
        &mut self.field
    }

    pub fn solver(&self) -> &FractionalSolver {
        &self.solver
    }

    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    /// Advance one step. Returns a record when the step lands on the output
    /// interval.
    pub fn step<S: SourceModel + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> FieldResult<Option<StepRecord>> {
        let dt = self.field.config().dt;
        let sources = source.source_terms(&self.field, self.field.current_time());
        let alphas = self.field.alpha_values();
        let memory = self.solver.compute_derivatives(&alphas);

        let before = self.field.delta_phi_flat().to_vec();
        self.field.evolve_step(&memory, &sources)?;

        let second = match (self.config.second_derivative, &self.older) {
            (SecondDerivativeMode::FiniteDifference, Some(older)) => {
                backward_second_difference(self.field.delta_phi_flat(), &before, older, dt)
            }
            _ => vec![Complex64::zero(); before.len()],
        };
        self.solver
            .update_history(self.field.delta_phi_flat(), &second, &alphas, dt)?;

        if self.config.second_derivative == SecondDerivativeMode::FiniteDifference {
            self.older = Some(before);
        }
        self.steps_taken += 1;

        if self.steps_taken % self.config.output_interval != 0 {
            return Ok(None);
        }
        let record = StepRecord {
            step: self.steps_taken,
            time: self.field.current_time(),
            total_energy: self.field.compute_total_energy(),
            max_amplitude: self.field.compute_max_amplitude(),
        };
        info!(
            "step {:>6}  t={:.4}  E={:.6e}  max|δΦ|={:.6e}  kernels={}",
            record.step,
            record.time,
            record.total_energy,
            record.max_amplitude,
            self.solver.num_cached_kernels()
        );
        Ok(Some(record))
    }

    /// Run `steps` steps and collect the output-interval records.
    pub fn run<S: SourceModel + ?Sized>(
        &mut self,
        steps: usize,
        source: &mut S,
    ) -> FieldResult<Vec<StepRecord>> {
        let mut records = Vec::with_capacity(steps / self.config.output_interval);
        for _ in 0..steps {
            if let Some(record) = self.step(source)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Zero δΦ history in the solver and forget stored snapshots. The field
    /// itself is left untouched.
    pub fn reset_memory(&mut self) {
        self.solver.reset_history();
        self.older = None;
    }
}

/// (δΦⁿ⁺¹ − 2δΦⁿ + δΦⁿ⁻¹) / dt²
fn backward_second_difference(
    next: &[Complex64],
    current: &[Complex64],
    previous: &[Complex64],
    dt: f64,
) -> Vec<Complex64> {
    let inv_dt2 = 1.0 / (dt * dt);
    next.iter()
        .zip(current)
        .zip(previous)
        .map(|((n, c), p)| (*n - *c * 2.0 + *p) * inv_dt2)
        .collect()
}
