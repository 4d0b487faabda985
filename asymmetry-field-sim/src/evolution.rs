//! Explicit time stepping of the fractional wave equation.
//!
//! Interior points advance by one forward-Euler step of
//!
//!   ∂δΦ/∂t = ∇²δΦ − D_frac − V(δΦ)·δΦ + S
//!
//! where D_frac is the fractional memory term supplied by the caller (usually
//! `FractionalSolver::compute_derivatives`) and S the external source. Every
//! right-hand side is evaluated from the pre-step field into a scratch buffer,
//! which is then swapped in. Boundary points are held fixed.
//!
//! No stability control: dt against dx² and the kernel decay rates is the
//! caller's responsibility.

use log::warn;
use num_complex::Complex64;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{FieldError, FieldResult};
use crate::field::SymmetryField;
use crate::operators::potential_density;

/// Overwrite every element of `out` with `f(flat_index)`.
#[cfg(feature = "parallel")]
pub(crate) fn fill_points<T, F>(out: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    out.par_iter_mut().enumerate().for_each(|(idx, v)| *v = f(idx));
}

/// Overwrite every element of `out` with `f(flat_index)`.
#[cfg(not(feature = "parallel"))]
pub(crate) fn fill_points<T, F>(out: &mut [T], f: F)
where
    F: Fn(usize) -> T,
{
    out.iter_mut().enumerate().for_each(|(idx, v)| *v = f(idx));
}

impl SymmetryField {
    /// Advance δΦ by one step of `config.dt`.
    ///
    /// Both slices must hold one entry per grid point in flat order.
    pub fn evolve_step(
        &mut self,
        fractional_derivatives: &[Complex64],
        source_terms: &[Complex64],
    ) -> FieldResult<()> {
        let n = self.total_points();
        for (what, len) in [
            ("fractional_derivatives", fractional_derivatives.len()),
            ("source_terms", source_terms.len()),
        ] {
            if len != n {
                return Err(FieldError::LengthMismatch {
                    what,
                    expected: n,
                    actual: len,
                });
            }
        }

        let stencil = self.stencil();
        let (lambda, kappa, dt) = (self.config.lambda, self.config.kappa, self.config.dt);
        let phi = &self.delta_phi;

        fill_points(&mut self.scratch, |idx| {
            let (i, j, k) = stencil.dims.from_flat_index(idx);
            let current = phi[idx];
            if stencil.dims.is_boundary(i, j, k) {
                return current;
            }
            let v = potential_density(current, lambda, kappa);
            let rhs = stencil.laplacian(phi, i, j, k) - fractional_derivatives[idx] - current * v
                + source_terms[idx];
            current + rhs * dt
        });
        std::mem::swap(&mut self.delta_phi, &mut self.scratch);

        self.update_gradient_cache();
        self.update_potential_cache();
        self.current_time += dt;

        let max_amplitude = self.compute_max_amplitude();
        if !max_amplitude.is_finite() {
            warn!(
                "non-finite amplitude at t={:.6}; dt={} may be unstable for dx={}",
                self.current_time, dt, self.config.dx
            );
        }
        Ok(())
    }
}
