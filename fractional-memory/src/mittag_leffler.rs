//! Two-parameter Mittag-Leffler function E_{α,β}(z).
//!
//!   E_{α,β}(z) = Σ_{k=0}^∞ z^k / Γ(αk + β)
//!
//! E_{1,1}(z) = e^z, so the function plays the role of the exponential for
//! fractional relaxation: the solution of the Caputo problem D^α y = −λy is
//! y(t) = E_α(−λt^α). It is used here as a reference when checking the
//! sum-of-exponentials kernels, not on the per-step hot path.
//!
//! Two evaluation routes:
//! - [`evaluate`]: power series, accurate for moderate |z|;
//! - [`asymptotic_expansion`]: large-|z| expansion for 0 < α < 2
//!   (Podlubny 1999, Theorems 1.3–1.4).
//!
//! References:
//! - Podlubny, "Fractional Differential Equations" (1999), §1.2
//! - Garrappa (2015), "Numerical evaluation of two and three parameter
//!   Mittag-Leffler functions", SIAM J. Numer. Anal. 53(3)

use std::f64::consts::PI;

use num_complex::Complex64;
use num_traits::{One, Zero};

use crate::gamma::reciprocal_gamma;

/// Series length used by [`evaluate_real`].
pub const DEFAULT_MAX_TERMS: usize = 100;

/// Relative convergence threshold used by [`evaluate_real`].
pub const DEFAULT_TOLERANCE: f64 = 1e-12;

/// E_{α,β}(z) by direct summation of the power series.
///
/// Stops once a term is smaller than `tolerance` relative to the running sum,
/// after `max_terms` terms, or when z^k overflows.
pub fn evaluate(
    alpha: f64,
    beta: f64,
    z: Complex64,
    max_terms: usize,
    tolerance: f64,
) -> Complex64 {
    let mut sum = Complex64::new(reciprocal_gamma(beta), 0.0);
    let mut z_power = Complex64::one();

    for k in 1..max_terms {
        z_power *= z;
        if !z_power.is_finite() {
            break;
        }
        let term = z_power * reciprocal_gamma(alpha * k as f64 + beta);
        sum += term;

        if term.norm() < tolerance * sum.norm() {
            break;
        }
    }

    sum
}

/// One-parameter form E_α(z) = E_{α,1}(z).
pub fn evaluate_one_param(alpha: f64, z: Complex64, max_terms: usize, tolerance: f64) -> Complex64 {
    evaluate(alpha, 1.0, z, max_terms, tolerance)
}

/// Real part of E_{α,β}(x) for a real argument with default series settings.
pub fn evaluate_real(alpha: f64, beta: f64, x: f64) -> f64 {
    evaluate(alpha, beta, Complex64::new(x, 0.0), DEFAULT_MAX_TERMS, DEFAULT_TOLERANCE).re
}

/// Large-|z| asymptotic expansion of E_{α,β}(z), valid for 0 < α < 2.
///
///   E_{α,β}(z) ≈ (1/α) z^{(1−β)/α} exp(z^{1/α}) − Σ_{k=1}^{N} z^{−k} / Γ(β − αk)
///
/// The exponential term is kept only inside the sector |arg z| ≤ απ/2; outside
/// it the algebraic tail alone is the leading behaviour.
pub fn asymptotic_expansion(alpha: f64, beta: f64, z: Complex64, num_terms: usize) -> Complex64 {
    if z.is_zero() {
        return Complex64::new(reciprocal_gamma(beta), 0.0);
    }

    let z_inv = z.inv();
    let mut z_inv_power = Complex64::one();
    let mut tail = Complex64::zero();
    for k in 1..=num_terms {
        z_inv_power *= z_inv;
        tail += z_inv_power * reciprocal_gamma(beta - alpha * k as f64);
    }

    if z.arg().abs() <= alpha * PI / 2.0 {
        let exponential = z.powf((1.0 - beta) / alpha) * z.powf(1.0 / alpha).exp() / alpha;
        exponential - tail
    } else {
        -tail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn series(alpha: f64, beta: f64, z: Complex64) -> Complex64 {
        evaluate(alpha, beta, z, DEFAULT_MAX_TERMS, DEFAULT_TOLERANCE)
    }

    #[test]
    fn alpha_one_is_exponential() {
        let e = series(1.0, 1.0, Complex64::new(1.0, 0.0));
        assert_relative_eq!(e.re, std::f64::consts::E, max_relative = 1e-12);
        assert!(e.im.abs() < 1e-15);

        let z = Complex64::new(0.3, -1.2);
        let got = evaluate_one_param(1.0, z, DEFAULT_MAX_TERMS, DEFAULT_TOLERANCE);
        assert!((got - z.exp()).norm() < 1e-12);
    }

    #[test]
    fn alpha_two_is_cosine() {
        // E_2(−x²) = cos x
        let x = 1.5f64;
        assert_relative_eq!(evaluate_real(2.0, 1.0, -x * x), x.cos(), epsilon = 1e-12);
    }

    #[test]
    fn beta_two_shifts_exponential() {
        // E_{1,2}(z) = (e^z − 1) / z
        let z = 0.7f64;
        assert_relative_eq!(evaluate_real(1.0, 2.0, z), (z.exp() - 1.0) / z, max_relative = 1e-12);
    }

    #[test]
    fn zero_argument_is_reciprocal_gamma() {
        assert_relative_eq!(evaluate_real(0.5, 3.0, 0.0), 0.5, max_relative = 1e-12);
        let asym = asymptotic_expansion(0.5, 3.0, Complex64::zero(), 5);
        assert_relative_eq!(asym.re, 0.5, max_relative = 1e-12);
    }

    #[test]
    fn asymptotic_matches_series_for_large_positive_argument() {
        let z = Complex64::new(20.0, 0.0);
        let exact = series(1.0, 1.0, z);
        let asym = asymptotic_expansion(1.0, 1.0, z, 8);
        assert_relative_eq!(asym.re, exact.re, max_relative = 1e-10);
        assert_relative_eq!(asym.re, 20.0f64.exp(), max_relative = 1e-10);
    }

    #[test]
    fn asymptotic_algebraic_tail_on_negative_axis() {
        // E_{1/2}(−x) = exp(x²) erfc(x); at x = 10 this is 0.0561409927...
        let got = asymptotic_expansion(0.5, 1.0, Complex64::new(-10.0, 0.0), 6);
        assert!((got.re - 0.056_140_992_7).abs() < 1e-5, "got {}", got.re);
        assert!(got.im.abs() < 1e-12);
    }
}
