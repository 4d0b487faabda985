//! # fractional-memory
//!
//! Bounded-memory evaluation of fractional time derivatives.
//!
//! A Caputo-type derivative is a convolution of the field's second time
//! derivative with a power-law kernel,
//!
//! ```text
//! D_α[f](t) = ∫₀ᵗ K_α(t − τ) ∂²_τ f(τ) dτ,    K_α(t) = t^{1−2α} / Γ(2 − 2α)
//! ```
//!
//! which naively needs the whole history of every grid point. Approximating
//! K_α by a sum of R exponentials (SOE) makes the convolution Markovian: each
//! grid point carries R complex accumulators and a step costs O(R).
//!
//! ## Layers
//!
//! - [`gamma`]: Γ, ln|Γ|, B and 1/Γ with C-library pole conventions
//! - [`mittag_leffler`]: E_{α,β}(z) by series and large-|z| expansion
//! - [`soe_kernel`]: kernel construction, closed-form evaluation, error vs exact
//! - [`history`]: the per-point recursive update
//! - [`solver`]: grid-wide history, α-keyed kernel cache, validation hooks
//!
//! ## Usage
//!
//! ```
//! use fractional_memory::prelude::*;
//! use num_complex::Complex64;
//!
//! let config = FractionalSolverConfig { t_max: 1.0, ..Default::default() };
//! let mut solver = FractionalSolver::new(config, 8).unwrap();
//!
//! let field = vec![Complex64::new(0.0, 0.0); 8];
//! let second = vec![Complex64::new(1.0, 0.0); 8];
//! let alphas = vec![1.5; 8];
//! solver.update_history(&field, &second, &alphas, 0.001).unwrap();
//!
//! let memory = solver.compute_derivatives(&alphas);
//! assert_eq!(memory.len(), 8);
//! assert_eq!(solver.num_cached_kernels(), 1);
//! ```

pub mod config;
pub mod error;
pub mod gamma;
pub mod history;
pub mod mittag_leffler;
pub mod soe_kernel;
pub mod solver;

pub mod prelude {
    pub use crate::config::*;
    pub use crate::error::*;
    pub use crate::history::*;
    pub use crate::soe_kernel::*;
    pub use crate::solver::*;
}
