//! # asymmetry-field-sim
//!
//! 3D simulation of a complex scalar asymmetry field δΦ obeying a wave
//! equation with fractional-in-time memory:
//!
//! ```text
//! ∂δΦ/∂t = ∇²δΦ − D_α[δΦ] − V(δΦ)·δΦ + S,    V = λ|δΦ|² + κ|δΦ|⁴
//! ```
//!
//! The memory order α(x) ∈ [1, 2] varies over the grid: α = 2 is a memoryless
//! point, α → 1 is maximal memory. D_α is evaluated in O(rank) per point per
//! step by the sum-of-exponentials solver in `fractional-memory`.
//!
//! ## Physics
//!
//! - **Grid**: nx×ny×nz Cartesian, flat index i + nx(j + ny·k)
//! - **Stencils**: second-order centred, zero on the outer boundary
//! - **Stepping**: forward Euler on interior points, boundary held fixed
//! - **Sources**: any [`SourceModel`](simulation::SourceModel), e.g. a closure
//!   modelling a compact binary
//!
//! ## Usage
//!
//! ```
//! use asymmetry_field_sim::prelude::*;
//! use num_complex::Complex64;
//!
//! let mut config = SimulationConfig::default();
//! config.field = SymmetryFieldConfig {
//!     nx: 8,
//!     ny: 8,
//!     nz: 8,
//!     dx: 1.0,
//!     dy: 1.0,
//!     dz: 1.0,
//!     dt: 0.01,
//!     ..Default::default()
//! };
//! config.output_interval = 5;
//!
//! let mut sim = Simulation::new(config).unwrap();
//! sim.field_mut().set_delta_phi(4, 4, 4, Complex64::new(1.0, 0.0)).unwrap();
//! let records = sim.run(10, &mut NoSource).unwrap();
//! assert_eq!(records.len(), 2);
//! ```

pub mod config;
pub mod error;
pub mod evolution;
pub mod export;
pub mod field;
pub mod grid;
pub mod operators;
pub mod simulation;
pub mod vector;

pub mod prelude {
    pub use crate::config::*;
    pub use crate::error::*;
    pub use crate::field::*;
    pub use crate::grid::*;
    pub use crate::operators::{potential_density, potential_derivative};
    pub use crate::simulation::*;
    pub use crate::vector::*;
    pub use fractional_memory::prelude::*;
}
