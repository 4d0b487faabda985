//! Storage, point access and interpolation of the asymmetry field δΦ.
//!
//! The field lives on an nx×ny×nz Cartesian grid as two flat arrays: the
//! complex amplitude δΦ and the real memory order α ∈ [α_min, α_max]. Two
//! derived per-point caches, |∇δΦ| and V(δΦ), are rebuilt after every
//! evolution step (see [`evolution`](crate::evolution)) and are not kept in
//! sync by the point setters.
//!
//! Spatial operators live in [`operators`](crate::operators); time stepping
//! in [`evolution`](crate::evolution); file output in [`export`](crate::export).

use std::ops::{Add, Mul};

use num_complex::Complex64;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::config::SymmetryFieldConfig;
use crate::error::{FieldError, FieldResult};
use crate::grid::GridDims;
use crate::vector::Vector3D;

/// One-pass summary of the field and its gradient cache.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldStats {
    pub max_amplitude: f64,
    pub mean_amplitude: f64,
    pub max_gradient: f64,
    pub mean_gradient: f64,
    /// Σ|δΦ|² dV
    pub total_energy: f64,
}

#[derive(Debug, Clone)]
pub struct SymmetryField {
    pub(crate) config: SymmetryFieldConfig,
    pub(crate) dims: GridDims,
    pub(crate) delta_phi: Vec<Complex64>,
    pub(crate) alpha: Vec<f64>,
    pub(crate) gradient_magnitude: Vec<f64>,
    pub(crate) potential: Vec<f64>,
    /// Next-step values, swapped with `delta_phi` on commit.
    pub(crate) scratch: Vec<Complex64>,
    pub(crate) current_time: f64,
}

impl SymmetryField {
    /// Zero field with α = α_max everywhere, at t = 0.
    pub fn new(config: SymmetryFieldConfig) -> FieldResult<Self> {
        config.validate()?;
        let dims = config.dims();
        let n = dims.total_points();
        Ok(Self {
            delta_phi: vec![Complex64::zero(); n],
            alpha: vec![config.alpha_max; n],
            gradient_magnitude: vec![0.0; n],
            potential: vec![0.0; n],
            scratch: vec![Complex64::zero(); n],
            current_time: 0.0,
            dims,
            config,
        })
    }

    pub fn config(&self) -> &SymmetryFieldConfig {
        &self.config
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn total_points(&self) -> usize {
        self.dims.total_points()
    }

    /// Simulated time, advanced by dt per evolution step.
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub(crate) fn checked_index(&self, i: usize, j: usize, k: usize) -> FieldResult<usize> {
        if !self.dims.contains(i, j, k) {
            let GridDims { nx, ny, nz } = self.dims;
            return Err(FieldError::OutOfRange { i, j, k, nx, ny, nz });
        }
        Ok(self.dims.to_flat_index(i, j, k))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Point access
    // ─────────────────────────────────────────────────────────────────────

    pub fn delta_phi(&self, i: usize, j: usize, k: usize) -> FieldResult<Complex64> {
        let idx = self.checked_index(i, j, k)?;
        Ok(self.delta_phi[idx])
    }

    pub fn set_delta_phi(
        &mut self,
        i: usize,
        j: usize,
        k: usize,
        value: Complex64,
    ) -> FieldResult<()> {
        let idx = self.checked_index(i, j, k)?;
        self.delta_phi[idx] = value;
        Ok(())
    }

    pub fn alpha(&self, i: usize, j: usize, k: usize) -> FieldResult<f64> {
        let idx = self.checked_index(i, j, k)?;
        Ok(self.alpha[idx])
    }

    /// Store α at one point. Values outside [α_min, α_max] are rejected and
    /// the stored value is left as it was.
    pub fn set_alpha(&mut self, i: usize, j: usize, k: usize, value: f64) -> FieldResult<()> {
        let idx = self.checked_index(i, j, k)?;
        let (min, max) = (self.config.alpha_min, self.config.alpha_max);
        if !(min..=max).contains(&value) {
            return Err(FieldError::InvalidAlpha { value, min, max });
        }
        self.alpha[idx] = value;
        Ok(())
    }

    /// δΦ in flat order.
    pub fn delta_phi_flat(&self) -> &[Complex64] {
        &self.delta_phi
    }

    /// Copy of the α array in flat order.
    pub fn alpha_values(&self) -> Vec<f64> {
        self.alpha.clone()
    }

    /// Cached |∇δΦ| from the last cache refresh.
    pub fn gradient_magnitude(&self, i: usize, j: usize, k: usize) -> FieldResult<f64> {
        let idx = self.checked_index(i, j, k)?;
        Ok(self.gradient_magnitude[idx])
    }

    /// Cached V(δΦ) from the last cache refresh.
    pub fn potential(&self, i: usize, j: usize, k: usize) -> FieldResult<f64> {
        let idx = self.checked_index(i, j, k)?;
        Ok(self.potential[idx])
    }

    /// Whole |∇δΦ| cache in flat order.
    pub fn gradient_magnitudes(&self) -> &[f64] {
        &self.gradient_magnitude
    }

    /// Whole V(δΦ) cache in flat order.
    pub fn potential_values(&self) -> &[f64] {
        &self.potential
    }

    // ─────────────────────────────────────────────────────────────────────
    // Positions and interpolation
    // ─────────────────────────────────────────────────────────────────────

    /// Physical position (i·dx, j·dy, k·dz).
    pub fn to_position(&self, i: usize, j: usize, k: usize) -> Vector3D {
        Vector3D::new(
            i as f64 * self.config.dx,
            j as f64 * self.config.dy,
            k as f64 * self.config.dz,
        )
    }

    /// Nearest grid point to `pos`, or `None` when it rounds outside the grid.
    pub fn to_indices(&self, pos: &Vector3D) -> Option<(usize, usize, usize)> {
        let nearest = |p: f64, d: f64, n: usize| -> Option<usize> {
            let f = (p / d + 0.5).floor();
            if f.is_finite() && f >= 0.0 && f < n as f64 {
                Some(f as usize)
            } else {
                None
            }
        };
        Some((
            nearest(pos.x, self.config.dx, self.dims.nx)?,
            nearest(pos.y, self.config.dy, self.dims.ny)?,
            nearest(pos.z, self.config.dz, self.dims.nz)?,
        ))
    }

    /// Trilinear δΦ at `pos`; zero outside the interpolable region.
    pub fn interpolate_delta_phi(&self, pos: &Vector3D) -> Complex64 {
        self.trilinear(pos, &self.delta_phi, Complex64::zero())
    }

    /// Trilinear α at `pos`; α_max outside the interpolable region.
    pub fn interpolate_alpha(&self, pos: &Vector3D) -> f64 {
        self.trilinear(pos, &self.alpha, self.config.alpha_max)
    }

    pub fn delta_phi_at(&self, pos: &Vector3D) -> Complex64 {
        self.interpolate_delta_phi(pos)
    }

    pub fn alpha_at(&self, pos: &Vector3D) -> f64 {
        self.interpolate_alpha(pos)
    }

    /// Lower corner and fractional offset of the cell containing `p`, if the
    /// whole cell lies on the grid.
    fn cell(p: f64, d: f64, n: usize) -> Option<(usize, f64)> {
        let f = p / d;
        let lo = f.floor();
        if !lo.is_finite() || lo < 0.0 || lo + 1.0 >= n as f64 {
            return None;
        }
        Some((lo as usize, f - lo))
    }

    fn trilinear<T>(&self, pos: &Vector3D, values: &[T], outside: T) -> T
    where
        T: Copy + Add<Output = T> + Mul<f64, Output = T>,
    {
        let cells = (
            Self::cell(pos.x, self.config.dx, self.dims.nx),
            Self::cell(pos.y, self.config.dy, self.dims.ny),
            Self::cell(pos.z, self.config.dz, self.dims.nz),
        );
        let ((i0, wx), (j0, wy), (k0, wz)) = match cells {
            (Some(x), Some(y), Some(z)) => (x, y, z),
            _ => return outside,
        };

        let at = |di: usize, dj: usize, dk: usize| {
            values[self.dims.to_flat_index(i0 + di, j0 + dj, k0 + dk)]
        };
        let lerp = |a: T, b: T, w: f64| a * (1.0 - w) + b * w;

        let c00 = lerp(at(0, 0, 0), at(1, 0, 0), wx);
        let c10 = lerp(at(0, 1, 0), at(1, 1, 0), wx);
        let c01 = lerp(at(0, 0, 1), at(1, 0, 1), wx);
        let c11 = lerp(at(0, 1, 1), at(1, 1, 1), wx);
        let c0 = lerp(c00, c10, wy);
        let c1 = lerp(c01, c11, wy);
        lerp(c0, c1, wz)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Diagnostics
    // ─────────────────────────────────────────────────────────────────────

    fn cell_volume(&self) -> f64 {
        self.config.dx * self.config.dy * self.config.dz
    }

    /// Σ|δΦ|² dx dy dz
    pub fn compute_total_energy(&self) -> f64 {
        self.delta_phi.iter().map(|p| p.norm_sqr()).sum::<f64>() * self.cell_volume()
    }

    pub fn compute_max_amplitude(&self) -> f64 {
        self.delta_phi.iter().map(|p| p.norm()).fold(0.0, f64::max)
    }

    /// Amplitude, gradient and energy summary in a single pass.
    pub fn statistics(&self) -> FieldStats {
        let mut stats = FieldStats::default();
        let mut sum_amplitude = 0.0;
        let mut sum_gradient = 0.0;
        let mut sum_norm_sqr = 0.0;

        for (phi, &grad) in self.delta_phi.iter().zip(&self.gradient_magnitude) {
            let amp = phi.norm();
            sum_amplitude += amp;
            stats.max_amplitude = stats.max_amplitude.max(amp);
            sum_norm_sqr += phi.norm_sqr();
            sum_gradient += grad;
            stats.max_gradient = stats.max_gradient.max(grad);
        }

        let n = self.total_points() as f64;
        stats.mean_amplitude = sum_amplitude / n;
        stats.mean_gradient = sum_gradient / n;
        stats.total_energy = sum_norm_sqr * self.cell_volume();
        stats
    }
}
