//! Sum-of-exponentials (SOE) approximation of the fractional memory kernel.
//!
//! The fractional time derivative is a convolution with the power-law kernel
//!
//!   K_α(t) = t^{1−2α} / Γ(2 − 2α)
//!
//! over the whole history of the field. Replacing it by
//!
//!   K_α(t) ≈ Σ_{r=1}^{R} w_r exp(−s_r t)
//!
//! turns the convolution into R independent one-pole filters, each of which
//! can be advanced recursively (see [`HistoryState`](crate::history::HistoryState)).
//!
//! # Construction
//!
//! Decay rates are log-spaced between 1/T_max (longest memory) and
//! 100/T_max (shortest). Weights start uniform at 1/R and are rescaled by
//! η / (Γ(2 − 2α) R) with η = α − 1. Γ(2 − 2α) has poles at α = 1, 1.5 and 2;
//! there the rescaling is skipped and the weights stay at 1/R. That fallback
//! is an approximation, not a fitted kernel.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::gamma::{gamma, reciprocal_gamma};

/// Lower edge of the admissible fractional order.
pub const ALPHA_FLOOR: f64 = 1.0;

/// Upper edge of the admissible fractional order.
pub const ALPHA_CEIL: f64 = 2.0;

/// Ratio between the fastest and slowest decay rate.
pub const DECAY_SPAN: f64 = 100.0;

/// Γ factors smaller than this in magnitude are treated as degenerate.
const GAMMA_FACTOR_EPS: f64 = 1e-12;

/// SOE kernel for one fractional order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoeKernel {
    alpha: f64,
    t_max: f64,
    /// w_r, one per rank term.
    weights: Vec<f64>,
    /// s_r, strictly increasing.
    decay_rates: Vec<f64>,
}

/// Exact power-law kernel K_α(t) = t^{1−2α} / Γ(2 − 2α).
///
/// Singular at t = 0 for α ≥ 1; non-positive times return NaN unless
/// 1/Γ(2 − 2α) vanishes, in which case the kernel is identically zero.
pub fn exact_kernel(alpha: f64, t: f64) -> f64 {
    let rgamma = reciprocal_gamma(2.0 - 2.0 * alpha);
    if rgamma == 0.0 {
        return 0.0;
    }
    if t <= 0.0 {
        return f64::NAN;
    }
    t.powf(1.0 - 2.0 * alpha) * rgamma
}

impl SoeKernel {
    /// Build the kernel for `alpha` over the horizon `t_max` with `rank` terms.
    ///
    /// `alpha` is clamped to [1, 2]. A rank-1 kernel keeps only the slowest
    /// rate 1/T_max.
    pub fn new(alpha: f64, t_max: f64, rank: usize) -> Self {
        let alpha = alpha.clamp(ALPHA_FLOOR, ALPHA_CEIL);
        let eta = alpha - 1.0;

        let s_min = 1.0 / t_max;
        let s_max = DECAY_SPAN / t_max;
        let log_ratio = (s_max / s_min).ln();

        let decay_rates: Vec<f64> = (0..rank)
            .map(|r| {
                let frac = if rank > 1 {
                    r as f64 / (rank - 1) as f64
                } else {
                    0.0
                };
                s_min * (frac * log_ratio).exp()
            })
            .collect();

        let mut weights = vec![1.0 / rank as f64; rank];

        let gamma_factor = gamma(2.0 - 2.0 * alpha);
        if gamma_factor.abs() > GAMMA_FACTOR_EPS && gamma_factor.is_finite() {
            let scale = eta / (gamma_factor * rank as f64);
            for w in weights.iter_mut() {
                *w *= scale;
            }
        } else {
            debug!(
                "SOE kernel α={:.6}: Γ(2−2α) = {} is degenerate, keeping unscaled weights",
                alpha, gamma_factor
            );
        }

        Self {
            alpha,
            t_max,
            weights,
            decay_rates,
        }
    }

    /// Assemble a kernel from explicit terms (used for interpolated kernels).
    pub(crate) fn from_parts(
        alpha: f64,
        t_max: f64,
        weights: Vec<f64>,
        decay_rates: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(weights.len(), decay_rates.len());
        Self {
            alpha,
            t_max,
            weights,
            decay_rates,
        }
    }

    /// Fractional order after clamping.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Time horizon the decay rates were spread over.
    pub fn t_max(&self) -> f64 {
        self.t_max
    }

    /// Number of exponential terms.
    pub fn rank(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn decay_rates(&self) -> &[f64] {
        &self.decay_rates
    }

    /// Iterate over (w_r, s_r) pairs.
    pub fn terms(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.weights.iter().copied().zip(self.decay_rates.iter().copied())
    }

    /// Closed-form kernel value Σ w_r exp(−s_r t).
    pub fn evaluate(&self, t: f64) -> f64 {
        self.terms().map(|(w, s)| w * (-s * t).exp()).sum()
    }

    /// |Σ w_r exp(−s_r t) − K_α(t)|.
    ///
    /// The exact kernel is singular at t ≤ 0, where the error is reported as
    /// infinite unless the exact kernel vanishes identically.
    pub fn estimate_error(&self, alpha: f64, t: f64) -> f64 {
        let exact = exact_kernel(alpha, t);
        if exact.is_nan() {
            return f64::INFINITY;
        }
        (self.evaluate(t) - exact).abs()
    }
}
