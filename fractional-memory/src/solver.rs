//! Grid-wide fractional derivative solver.
//!
//! Owns one [`HistoryState`] per grid point and an append-only cache of
//! [`SoeKernel`]s keyed by α. Each step the caller
//!
//! 1. reads the current derivatives with [`FractionalSolver::compute_derivatives`],
//! 2. advances the field,
//! 3. feeds the new second time derivatives to [`FractionalSolver::update_history`].
//!
//! # Kernel cache
//!
//! Two α values closer than `kernel_tolerance` share a kernel. Entries are
//! bucketed by ⌊α / tolerance⌋; a match can only live in the same or an
//! adjacent bucket, so lookup is O(1) while returning the same entry a linear
//! scan in insertion order would. Entries are never evicted.
//!
//! Misses are resolved serially before the per-point sweep, so the sweep
//! itself only reads the cache and can run in parallel.

use std::collections::HashMap;

use log::{debug, info};
use num_complex::Complex64;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::FractionalSolverConfig;
use crate::error::{FractionalError, FractionalResult};
use crate::gamma::{gamma, reciprocal_gamma};
use crate::history::HistoryState;
use crate::soe_kernel::SoeKernel;

/// Sample count used by [`FractionalSolver::validate_soe_approximation`].
pub const VALIDATION_SAMPLES: usize = 64;

/// Error metrics of an SOE kernel against the exact power law.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationResult {
    pub max_error: f64,
    pub mean_error: f64,
    pub rms_error: f64,
    /// Number of sample times the metrics were taken over.
    pub samples: usize,
    /// `max_error <= tolerance` and every sample finite.
    pub passed: bool,
}

/// Caputo derivative of the power function t^β:
///
///   D^α t^β = Γ(β + 1) / Γ(β − α + 1) · t^{β−α}
///
/// Valid for β > ⌈α⌉ − 1. Vanishes when β − α + 1 is a pole of Γ (e.g. the
/// second derivative of t).
pub fn caputo_power_law(alpha: f64, beta: f64, t: f64) -> f64 {
    let rgamma = reciprocal_gamma(beta - alpha + 1.0);
    if rgamma == 0.0 {
        return 0.0;
    }
    gamma(beta + 1.0) * rgamma * t.powf(beta - alpha)
}

#[derive(Debug, Clone)]
struct CachedKernel {
    alpha: f64,
    kernel: SoeKernel,
}

/// Per-point history states plus the kernel cache.
#[derive(Debug, Clone)]
pub struct FractionalSolver {
    config: FractionalSolverConfig,
    num_points: usize,
    history: Vec<HistoryState>,
    kernels: Vec<CachedKernel>,
    buckets: HashMap<i64, Vec<usize>>,
}

impl FractionalSolver {
    /// Allocate `num_points` zeroed history states of rank `config.soe_rank`.
    pub fn new(config: FractionalSolverConfig, num_points: usize) -> FractionalResult<Self> {
        config.validate()?;
        let history = vec![HistoryState::new(config.soe_rank); num_points];
        let solver = Self {
            config,
            num_points,
            history,
            kernels: Vec::new(),
            buckets: HashMap::new(),
        };
        info!(
            "fractional solver: {} points, rank {}, {:.2} MiB of history",
            num_points,
            solver.config.soe_rank,
            solver.memory_usage() as f64 / (1024.0 * 1024.0)
        );
        Ok(solver)
    }

    pub fn config(&self) -> &FractionalSolverConfig {
        &self.config
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    pub fn rank(&self) -> usize {
        self.config.soe_rank
    }

    /// History state of one point.
    pub fn history_state(&self, point_index: usize) -> Option<&HistoryState> {
        self.history.get(point_index)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Kernel cache
    // ─────────────────────────────────────────────────────────────────────

    fn bucket_key(&self, alpha: f64) -> i64 {
        (alpha / self.config.kernel_tolerance).floor() as i64
    }

    fn find_kernel_index(&self, alpha: f64) -> Option<usize> {
        let key = self.bucket_key(alpha);
        let tolerance = self.config.kernel_tolerance;
        (key.saturating_sub(1)..=key.saturating_add(1))
            .filter_map(|k| self.buckets.get(&k))
            .flatten()
            .copied()
            .filter(|&idx| (self.kernels[idx].alpha - alpha).abs() < tolerance)
            .min()
    }

    fn kernel_index(&mut self, alpha: f64) -> usize {
        if let Some(idx) = self.find_kernel_index(alpha) {
            return idx;
        }
        let kernel = SoeKernel::new(alpha, self.config.t_max, self.config.soe_rank);
        let idx = self.kernels.len();
        self.kernels.push(CachedKernel { alpha, kernel });
        let key = self.bucket_key(alpha);
        self.buckets.entry(key).or_default().push(idx);
        debug!("kernel cache miss for α={:.6}, {} kernels cached", alpha, self.kernels.len());
        idx
    }

    /// Cached kernel for `alpha`, built and appended on a miss.
    pub fn get_kernel(&mut self, alpha: f64) -> &SoeKernel {
        let idx = self.kernel_index(alpha);
        &self.kernels[idx].kernel
    }

    /// Cached kernel for `alpha` without inserting.
    pub fn find_kernel(&self, alpha: f64) -> Option<&SoeKernel> {
        self.find_kernel_index(alpha).map(|idx| &self.kernels[idx].kernel)
    }

    pub fn num_cached_kernels(&self) -> usize {
        self.kernels.len()
    }

    /// Replace the cache with `num_samples` kernels evenly spaced over
    /// [alpha_min, alpha_max], both ends included when `num_samples > 1`.
    pub fn precompute_kernels(&mut self, num_samples: usize) {
        self.kernels.clear();
        self.buckets.clear();

        let (lo, hi) = (self.config.alpha_min, self.config.alpha_max);
        for i in 0..num_samples {
            let alpha = if num_samples > 1 {
                lo + (hi - lo) * i as f64 / (num_samples - 1) as f64
            } else {
                lo
            };
            self.kernel_index(alpha);
        }
        info!("precomputed {} kernels over α ∈ [{}, {}]", self.kernels.len(), lo, hi);
    }

    /// Kernel for `alpha` blended linearly from the two cached kernels that
    /// bracket it. Falls back to a freshly built kernel when α is not
    /// bracketed. Never touches the cache.
    pub fn interpolate_kernel(&self, alpha: f64) -> SoeKernel {
        if let Some(kernel) = self.find_kernel(alpha) {
            return kernel.clone();
        }

        let lower = self
            .kernels
            .iter()
            .filter(|c| c.alpha < alpha)
            .max_by(|a, b| a.alpha.total_cmp(&b.alpha));
        let upper = self
            .kernels
            .iter()
            .filter(|c| c.alpha > alpha)
            .min_by(|a, b| a.alpha.total_cmp(&b.alpha));

        match (lower, upper) {
            (Some(lo), Some(hi)) => {
                let theta = (alpha - lo.alpha) / (hi.alpha - lo.alpha);
                let weights = lo
                    .kernel
                    .weights()
                    .iter()
                    .zip(hi.kernel.weights())
                    .map(|(a, b)| (1.0 - theta) * a + theta * b)
                    .collect();
                let rates = lo.kernel.decay_rates().to_vec();
                SoeKernel::from_parts(alpha, self.config.t_max, weights, rates)
            }
            _ => SoeKernel::new(alpha, self.config.t_max, self.config.soe_rank),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Per-step sweeps
    // ─────────────────────────────────────────────────────────────────────

    fn check_len(&self, what: &'static str, actual: usize) -> FractionalResult<()> {
        if actual != self.num_points {
            return Err(FractionalError::LengthMismatch {
                what,
                expected: self.num_points,
                actual,
            });
        }
        Ok(())
    }

    /// Advance every history state by one step.
    ///
    /// `field_values` is part of the interface but not read by the current
    /// first-order update law.
    pub fn update_history(
        &mut self,
        field_values: &[Complex64],
        second_derivatives: &[Complex64],
        alpha_values: &[f64],
        dt: f64,
    ) -> FractionalResult<()> {
        self.check_len("field_values", field_values.len())?;
        self.check_len("second_derivatives", second_derivatives.len())?;
        self.check_len("alpha_values", alpha_values.len())?;

        // Resolve kernels serially; consecutive points usually share α.
        let mut last: Option<(f64, usize)> = None;
        let mut kernel_ids = Vec::with_capacity(self.num_points);
        for &alpha in alpha_values {
            let idx = match last {
                Some((a, idx)) if a == alpha => idx,
                _ => self.kernel_index(alpha),
            };
            last = Some((alpha, idx));
            kernel_ids.push(idx);
        }

        sweep_history(&mut self.history, &self.kernels, &kernel_ids, second_derivatives, dt);
        Ok(())
    }

    /// Current fractional derivative at every point.
    ///
    /// The result depends only on the stored history; `_alpha_values` is kept
    /// for interface symmetry with [`update_history`](Self::update_history).
    pub fn compute_derivatives(&self, _alpha_values: &[f64]) -> Vec<Complex64> {
        collect_derivatives(&self.history)
    }

    /// Current fractional derivative at one point.
    pub fn compute_derivative_at(
        &self,
        point_index: usize,
        _alpha: f64,
    ) -> FractionalResult<Complex64> {
        self.history
            .get(point_index)
            .map(HistoryState::compute_derivative)
            .ok_or(FractionalError::PointOutOfRange {
                index: point_index,
                num_points: self.num_points,
            })
    }

    /// Zero every history state.
    pub fn reset_history(&mut self) {
        for state in self.history.iter_mut() {
            state.reset();
        }
    }

    /// Bytes held by history accumulators: points × rank × size_of(Complex64).
    pub fn memory_usage(&self) -> usize {
        self.num_points * self.config.soe_rank * std::mem::size_of::<Complex64>()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reference values and validation
    // ─────────────────────────────────────────────────────────────────────

    /// Exact Caputo derivative of t^β, see [`caputo_power_law`].
    pub fn compute_exact_caputo(&self, alpha: f64, beta: f64, t: f64) -> f64 {
        caputo_power_law(alpha, beta, t)
    }

    /// Compare the SOE kernel for `alpha` with the exact power law over
    /// [`VALIDATION_SAMPLES`] log-spaced times in [T_max/100, T_max].
    pub fn validate_soe_approximation(&self, alpha: f64, tolerance: f64) -> ValidationResult {
        let kernel = SoeKernel::new(alpha, self.config.t_max, self.config.soe_rank);
        let t_hi = self.config.t_max;
        let t_lo = t_hi / 100.0;
        let log_ratio = (t_hi / t_lo).ln();

        let errors: Vec<f64> = (0..VALIDATION_SAMPLES)
            .map(|i| {
                let frac = i as f64 / (VALIDATION_SAMPLES - 1) as f64;
                let t = t_lo * (frac * log_ratio).exp();
                kernel.estimate_error(kernel.alpha(), t)
            })
            .collect();

        let n = errors.len() as f64;
        let max_error = errors.iter().copied().fold(0.0, f64::max);
        let mean_error = errors.iter().sum::<f64>() / n;
        let rms_error = (errors.iter().map(|e| e * e).sum::<f64>() / n).sqrt();
        let finite = errors.iter().all(|e| e.is_finite());

        let result = ValidationResult {
            max_error,
            mean_error,
            rms_error,
            samples: errors.len(),
            passed: finite && max_error <= tolerance,
        };
        debug!("SOE validation α={:.4}: {:?}", alpha, result);
        result
    }
}

#[cfg(feature = "parallel")]
fn sweep_history(
    history: &mut [HistoryState],
    kernels: &[CachedKernel],
    kernel_ids: &[usize],
    second_derivatives: &[Complex64],
    dt: f64,
) {
    history
        .par_iter_mut()
        .zip(kernel_ids.par_iter())
        .zip(second_derivatives.par_iter())
        .for_each(|((state, &id), &f2)| state.update(&kernels[id].kernel, f2, dt));
}

#[cfg(not(feature = "parallel"))]
fn sweep_history(
    history: &mut [HistoryState],
    kernels: &[CachedKernel],
    kernel_ids: &[usize],
    second_derivatives: &[Complex64],
    dt: f64,
) {
    history
        .iter_mut()
        .zip(kernel_ids.iter())
        .zip(second_derivatives.iter())
        .for_each(|((state, &id), &f2)| state.update(&kernels[id].kernel, f2, dt));
}

#[cfg(feature = "parallel")]
fn collect_derivatives(history: &[HistoryState]) -> Vec<Complex64> {
    history.par_iter().map(HistoryState::compute_derivative).collect()
}

#[cfg(not(feature = "parallel"))]
fn collect_derivatives(history: &[HistoryState]) -> Vec<Complex64> {
    history.iter().map(HistoryState::compute_derivative).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use num_traits::Zero;

    fn solver(num_points: usize) -> FractionalSolver {
        let config = FractionalSolverConfig {
            t_max: 1.0,
            soe_rank: 6,
            ..Default::default()
        };
        FractionalSolver::new(config, num_points).unwrap()
    }

    #[test]
    fn construction_allocates_zeroed_history() {
        let s = solver(27);
        assert_eq!(s.num_points(), 27);
        assert_eq!(s.rank(), 6);
        assert_eq!(s.num_cached_kernels(), 0);
        assert_eq!(s.memory_usage(), 27 * 6 * 16);
        for i in 0..27 {
            assert_eq!(s.history_state(i).unwrap().rank(), 6);
        }
        assert!(s.compute_derivatives(&[]).iter().all(|d| d.is_zero()));
    }

    #[test]
    fn construction_rejects_invalid_config() {
        let config = FractionalSolverConfig {
            soe_rank: 0,
            ..Default::default()
        };
        assert!(matches!(FractionalSolver::new(config, 8), Err(FractionalError::Config(_))));
    }

    #[test]
    fn get_kernel_is_idempotent() {
        let mut s = solver(1);
        let first: *const SoeKernel = s.get_kernel(1.42);
        assert_eq!(s.num_cached_kernels(), 1);
        let second: *const SoeKernel = s.get_kernel(1.42);
        assert_eq!(s.num_cached_kernels(), 1);
        assert!(std::ptr::eq(first, second));

        // Within tolerance: same entry.
        let close: *const SoeKernel = s.get_kernel(1.42 + 5e-7);
        assert!(std::ptr::eq(first, close));
        assert_eq!(s.num_cached_kernels(), 1);

        // Outside tolerance: new entry.
        s.get_kernel(1.42 + 5e-6);
        assert_eq!(s.num_cached_kernels(), 2);
    }

    #[test]
    fn lookup_crosses_bucket_edges() {
        let mut s = solver(1);
        // ⌊α/1e-6⌋ differs for these two, yet |Δα| < 1e-6.
        let a = 1.299_999_9;
        let b = 1.300_000_4;
        let weights_a = s.get_kernel(a).weights().to_vec();
        let weights_b = s.get_kernel(b).weights().to_vec();
        assert_eq!(s.num_cached_kernels(), 1);
        assert_eq!(weights_a, weights_b);
    }

    #[test]
    fn lookup_returns_first_inserted_match() {
        let mut s = solver(1);
        s.get_kernel(1.4);
        s.get_kernel(1.400_001_5);
        assert_eq!(s.num_cached_kernels(), 2);
        // 1.4000008 is within tolerance of both; insertion order wins.
        let hit = s.find_kernel(1.400_000_8).unwrap();
        assert_eq!(hit.alpha(), 1.4);
    }

    #[test]
    fn precompute_spans_range_inclusive() {
        let mut s = solver(1);
        s.get_kernel(1.37);
        s.precompute_kernels(5);
        assert_eq!(s.num_cached_kernels(), 5);
        for &alpha in &[1.0, 1.25, 1.5, 1.75, 2.0] {
            assert!(s.find_kernel(alpha).is_some(), "missing α={}", alpha);
        }
        assert!(s.find_kernel(1.37).is_none(), "precompute must clear the cache");

        s.precompute_kernels(1);
        assert_eq!(s.num_cached_kernels(), 1);
        assert!(s.find_kernel(1.0).is_some());

        s.precompute_kernels(0);
        assert_eq!(s.num_cached_kernels(), 0);
    }

    #[test]
    fn update_history_matches_pointwise_update() {
        let n = 10;
        let mut s = solver(n);
        let field = vec![Complex64::zero(); n];
        let second: Vec<Complex64> = (0..n).map(|i| Complex64::new(i as f64, 1.0)).collect();
        let alphas: Vec<f64> = (0..n).map(|i| if i % 2 == 0 { 1.2 } else { 1.7 }).collect();
        let dt = 0.01;

        s.update_history(&field, &second, &alphas, dt).unwrap();
        assert_eq!(s.num_cached_kernels(), 2);

        for i in 0..n {
            let kernel = SoeKernel::new(alphas[i], 1.0, 6);
            let mut expected = HistoryState::new(6);
            expected.update(&kernel, second[i], dt);
            assert_eq!(s.history_state(i).unwrap(), &expected);
            let got = s.compute_derivative_at(i, alphas[i]).unwrap();
            assert_eq!(got, expected.compute_derivative());
        }
    }

    #[test]
    fn update_history_rejects_wrong_lengths() {
        let mut s = solver(4);
        let ok = vec![Complex64::zero(); 4];
        let short = vec![Complex64::zero(); 3];
        let alphas = vec![1.5; 4];

        let err = s.update_history(&short, &ok, &alphas, 0.1).unwrap_err();
        assert!(matches!(err, FractionalError::LengthMismatch { what: "field_values", .. }));
        let err = s.update_history(&ok, &short, &alphas, 0.1).unwrap_err();
        assert!(matches!(err, FractionalError::LengthMismatch { what: "second_derivatives", .. }));
        let err = s.update_history(&ok, &ok, &alphas[..2], 0.1).unwrap_err();
        assert!(matches!(
            err,
            FractionalError::LengthMismatch {
                what: "alpha_values",
                expected: 4,
                actual: 2
            }
        ));
    }

    #[test]
    fn derivative_at_checks_bounds() {
        let s = solver(5);
        assert!(s.compute_derivative_at(4, 1.5).is_ok());
        assert_eq!(
            s.compute_derivative_at(5, 1.5),
            Err(FractionalError::PointOutOfRange { index: 5, num_points: 5 })
        );
    }

    #[test]
    fn reset_clears_all_points() {
        let n = 6;
        let mut s = solver(n);
        let ones = vec![Complex64::new(1.0, 0.0); n];
        s.update_history(&ones, &ones, &vec![1.3; n], 0.1).unwrap();
        assert!(s.compute_derivatives(&[]).iter().all(|d| d.norm() > 0.0));

        s.reset_history();
        assert!(s.compute_derivatives(&[]).iter().all(|d| d.is_zero()));
        assert_eq!(s.num_cached_kernels(), 1, "reset keeps the kernel cache");
    }

    #[test]
    fn configured_dt_does_not_drive_updates() {
        let n = 4;
        let mut coarse = FractionalSolver::new(
            FractionalSolverConfig { t_max: 1.0, soe_rank: 6, dt: 0.5, ..Default::default() },
            n,
        )
        .unwrap();
        let mut fine = solver(n);
        assert_ne!(coarse.config().dt, fine.config().dt);

        let f2 = vec![Complex64::new(0.3, -0.2); n];
        let alpha = vec![1.4; n];
        coarse.update_history(&f2, &f2, &alpha, 0.01).unwrap();
        fine.update_history(&f2, &f2, &alpha, 0.01).unwrap();
        assert_eq!(coarse.compute_derivatives(&alpha), fine.compute_derivatives(&alpha));
    }

    #[test]
    fn exact_caputo_power_law() {
        let s = solver(1);
        let t = 0.64;
        // D^{1/2} t = 2 √t / √π
        assert_relative_eq!(
            s.compute_exact_caputo(0.5, 1.0, t),
            2.0 * t.sqrt() / std::f64::consts::PI.sqrt(),
            max_relative = 1e-12
        );
        // D^1 t² = 2t
        assert_relative_eq!(s.compute_exact_caputo(1.0, 2.0, t), 2.0 * t, max_relative = 1e-12);
        // D^2 t = 0
        assert_eq!(s.compute_exact_caputo(2.0, 1.0, t), 0.0);
    }

    #[test]
    fn validation_reports_consistent_metrics() {
        let s = solver(1);
        let loose = s.validate_soe_approximation(1.25, 1e6);
        assert_eq!(loose.samples, VALIDATION_SAMPLES);
        assert!(loose.passed);
        assert!(loose.max_error >= loose.rms_error);
        assert!(loose.rms_error >= loose.mean_error);
        assert!(loose.mean_error > 0.0);

        let strict = s.validate_soe_approximation(1.25, 1e-12);
        assert!(!strict.passed);
        assert_eq!(strict.max_error, loose.max_error);
    }

    #[test]
    fn validation_at_gamma_pole_compares_against_zero_kernel() {
        let s = solver(1);
        let result = s.validate_soe_approximation(1.5, 1e6);
        // Exact kernel vanishes; the error is the SOE kernel itself.
        let kernel = SoeKernel::new(1.5, 1.0, 6);
        assert_relative_eq!(result.max_error, kernel.evaluate(0.01), max_relative = 1e-12);
    }

    #[test]
    fn interpolated_kernel_blends_neighbours() {
        let config = FractionalSolverConfig {
            t_max: 1.0,
            soe_rank: 4,
            alpha_min: 1.1,
            alpha_max: 1.3,
            ..Default::default()
        };
        let mut s = FractionalSolver::new(config, 1).unwrap();
        s.precompute_kernels(3);

        let lo = s.find_kernel(1.1).unwrap().clone();
        let hi = s.find_kernel(1.2).unwrap().clone();
        let mid = s.interpolate_kernel(1.15);
        assert_eq!(s.num_cached_kernels(), 3);
        assert_eq!(mid.decay_rates(), lo.decay_rates());
        for ((m, a), b) in mid.weights().iter().zip(lo.weights()).zip(hi.weights()) {
            assert_relative_eq!(*m, 0.5 * (a + b), max_relative = 1e-9);
        }

        // Exact hit returns the cached kernel; outside the range a fresh build.
        assert_eq!(s.interpolate_kernel(1.2), hi);
        assert_eq!(s.interpolate_kernel(1.05), SoeKernel::new(1.05, 1.0, 4));
    }
}
