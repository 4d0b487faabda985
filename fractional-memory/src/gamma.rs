//! Scalar gamma-family functions.
//!
//! Thin layer over `statrs` that adds the pole conventions of C `tgamma` /
//! `lgamma`, which the kernel weight scaling depends on:
//!
//! - Γ(x) is NaN at negative integers and ±∞ at ±0,
//! - ln Γ(x) means ln|Γ(x)| and is defined for negative non-integers,
//! - 1/Γ(x) is an entire function and evaluates to exactly 0 at the poles.

use std::f64::consts::PI;

use statrs::function::gamma as sgamma;

/// Γ(x) exceeds f64::MAX above this argument.
const GAMMA_OVERFLOW: f64 = 171.624;

/// True when `x` is a pole of Γ (0, −1, −2, …).
#[inline]
pub fn is_pole(x: f64) -> bool {
    x <= 0.0 && x == x.floor()
}

/// Γ(x).
pub fn gamma(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x == 0.0 {
        return f64::INFINITY.copysign(x);
    }
    if is_pole(x) {
        return f64::NAN;
    }
    sgamma::gamma(x)
}

/// ln|Γ(x)|.
///
/// Uses the reflection formula Γ(x)Γ(1−x) = π / sin(πx) below 0.5 so that
/// negative non-integer arguments stay finite.
pub fn ln_gamma(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if is_pole(x) {
        return f64::INFINITY;
    }
    if x < 0.5 {
        PI.ln() - (PI * x).sin().abs().ln() - sgamma::ln_gamma(1.0 - x)
    } else {
        sgamma::ln_gamma(x)
    }
}

/// B(a, b) = exp(ln Γ(a) + ln Γ(b) − ln Γ(a + b)).
pub fn beta(a: f64, b: f64) -> f64 {
    (ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b)).exp()
}

/// 1/Γ(x), zero at the poles and for arguments where Γ overflows.
pub fn reciprocal_gamma(x: f64) -> f64 {
    if is_pole(x) || x > GAMMA_OVERFLOW {
        return 0.0;
    }
    let g = gamma(x);
    if g.is_infinite() {
        0.0
    } else {
        1.0 / g
    }
}
