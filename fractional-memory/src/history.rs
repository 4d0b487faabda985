//! Per-point recursive memory for the fractional derivative.
//!
//! For a kernel K(t) = Σ w_r exp(−s_r t) the history integral
//!
//!   I(t) = ∫₀ᵗ K(t − τ) ∂²_τ f(τ) dτ
//!
//! splits into R accumulators z_r(t) = w_r ∫₀ᵗ exp(−s_r (t − τ)) ∂²_τ f dτ,
//! each obeying
//!
//!   z_r(t + dt) = exp(−s_r dt) z_r(t) + w_r ∂²_t f(t) dt
//!
//! so a step costs O(R) regardless of how long the history is.

use num_complex::Complex64;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::soe_kernel::SoeKernel;

/// Accumulators z_r for one grid point.
///
/// Serialisable so a run's memory can be checkpointed and restored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryState {
    z: Vec<Complex64>,
}

impl HistoryState {
    /// Zeroed state with `rank` accumulators.
    pub fn new(rank: usize) -> Self {
        Self {
            z: vec![Complex64::zero(); rank],
        }
    }

    /// State with explicit accumulator values.
    pub fn from_accumulators(z: Vec<Complex64>) -> Self {
        Self { z }
    }

    pub fn rank(&self) -> usize {
        self.z.len()
    }

    pub fn accumulators(&self) -> &[Complex64] {
        &self.z
    }

    /// Advance by one step: decay existing memory, inject w_r ∂²f dt.
    ///
    /// Only the first `min(rank, kernel.rank())` terms take part; the solver
    /// always pairs states and kernels of equal rank.
    pub fn update(&mut self, kernel: &SoeKernel, second_derivative: Complex64, dt: f64) {
        for (z, (w, s)) in self.z.iter_mut().zip(kernel.terms()) {
            let decay = (-s * dt).exp();
            *z = *z * decay + second_derivative * (w * dt);
        }
    }

    /// Current approximate fractional derivative Σ z_r.
    pub fn compute_derivative(&self) -> Complex64 {
        self.z.iter().sum()
    }

    /// Zero every accumulator without reallocating.
    pub fn reset(&mut self) {
        for z in self.z.iter_mut() {
            *z = Complex64::zero();
        }
    }
}
