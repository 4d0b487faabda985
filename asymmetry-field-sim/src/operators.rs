//! Finite-difference operators and the self-interaction potential.
//!
//! Second-order centred stencils on interior points:
//!
//!   ∂ₓf ≈ (f[i+1] − f[i−1]) / 2dx
//!   ∂²ₓf ≈ (f[i+1] − 2f[i] + f[i−1]) / dx²
//!
//! Gradient and Laplacian are exactly zero on boundary points.
//!
//! Potential and its Wirtinger derivative:
//!
//!   V(δΦ) = λ|δΦ|² + κ|δΦ|⁴
//!   ∂V/∂δΦ* = λδΦ + 2κ|δΦ|²δΦ

use num_complex::Complex64;
use num_traits::Zero;

use crate::error::FieldResult;
use crate::evolution::fill_points;
use crate::field::SymmetryField;
use crate::grid::GridDims;
use crate::vector::Vector3D;

/// Grid shape plus spacing; everything a stencil needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Stencil {
    pub dims: GridDims,
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl Stencil {
    /// Per-axis |∂f| by centred differences.
    pub fn gradient(&self, f: &[Complex64], i: usize, j: usize, k: usize) -> Vector3D {
        if self.dims.is_boundary(i, j, k) {
            return Vector3D::zero();
        }
        let d = self.dims;
        let at = |i, j, k| f[d.to_flat_index(i, j, k)];
        Vector3D::new(
            ((at(i + 1, j, k) - at(i - 1, j, k)) / (2.0 * self.dx)).norm(),
            ((at(i, j + 1, k) - at(i, j - 1, k)) / (2.0 * self.dy)).norm(),
            ((at(i, j, k + 1) - at(i, j, k - 1)) / (2.0 * self.dz)).norm(),
        )
    }

    /// ∇²f by the 7-point stencil.
    pub fn laplacian(&self, f: &[Complex64], i: usize, j: usize, k: usize) -> Complex64 {
        if self.dims.is_boundary(i, j, k) {
            return Complex64::zero();
        }
        let d = self.dims;
        let at = |i, j, k| f[d.to_flat_index(i, j, k)];
        let centre = at(i, j, k) * 2.0;

        (at(i + 1, j, k) - centre + at(i - 1, j, k)) / (self.dx * self.dx)
            + (at(i, j + 1, k) - centre + at(i, j - 1, k)) / (self.dy * self.dy)
            + (at(i, j, k + 1) - centre + at(i, j, k - 1)) / (self.dz * self.dz)
    }
}

/// V(δΦ) = λ|δΦ|² + κ|δΦ|⁴
#[inline]
pub fn potential_density(phi: Complex64, lambda: f64, kappa: f64) -> f64 {
    let n2 = phi.norm_sqr();
    lambda * n2 + kappa * n2 * n2
}

/// ∂V/∂δΦ* = λδΦ + 2κ|δΦ|²δΦ
#[inline]
pub fn potential_derivative(phi: Complex64, lambda: f64, kappa: f64) -> Complex64 {
    phi * (lambda + 2.0 * kappa * phi.norm_sqr())
}

impl SymmetryField {
    pub(crate) fn stencil(&self) -> Stencil {
        Stencil {
            dims: self.dims,
            dx: self.config.dx,
            dy: self.config.dy,
            dz: self.config.dz,
        }
    }

    /// Per-axis magnitude of the centred-difference gradient of δΦ.
    pub fn compute_gradient(&self, i: usize, j: usize, k: usize) -> FieldResult<Vector3D> {
        self.checked_index(i, j, k)?;
        Ok(self.stencil().gradient(&self.delta_phi, i, j, k))
    }

    pub fn compute_laplacian(&self, i: usize, j: usize, k: usize) -> FieldResult<Complex64> {
        self.checked_index(i, j, k)?;
        Ok(self.stencil().laplacian(&self.delta_phi, i, j, k))
    }

    /// V at one point from the current δΦ (not the cache).
    pub fn compute_potential(&self, i: usize, j: usize, k: usize) -> FieldResult<f64> {
        let idx = self.checked_index(i, j, k)?;
        Ok(potential_density(self.delta_phi[idx], self.config.lambda, self.config.kappa))
    }

    pub fn compute_potential_derivative(
        &self,
        i: usize,
        j: usize,
        k: usize,
    ) -> FieldResult<Complex64> {
        let idx = self.checked_index(i, j, k)?;
        Ok(potential_derivative(self.delta_phi[idx], self.config.lambda, self.config.kappa))
    }

    /// Recompute |∇δΦ| at every point.
    pub fn update_gradient_cache(&mut self) {
        let stencil = self.stencil();
        let phi = &self.delta_phi;
        fill_points(&mut self.gradient_magnitude, |idx| {
            let (i, j, k) = stencil.dims.from_flat_index(idx);
            stencil.gradient(phi, i, j, k).magnitude()
        });
    }

    /// Recompute V(δΦ) at every point.
    pub fn update_potential_cache(&mut self) {
        let (lambda, kappa) = (self.config.lambda, self.config.kappa);
        let phi = &self.delta_phi;
        fill_points(&mut self.potential, |idx| potential_density(phi[idx], lambda, kappa));
    }
}
