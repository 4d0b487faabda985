//! Grid-level properties of the field: indexing, boundaries, stability and
//! the single-step response to a point excitation.

use asymmetry_field_sim::prelude::*;
use num_complex::Complex64;
use num_traits::Zero;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn unit_grid(n: usize, dt: f64) -> SymmetryField {
    SymmetryField::new(SymmetryFieldConfig {
        nx: n,
        ny: n,
        nz: n,
        dx: 1.0,
        dy: 1.0,
        dz: 1.0,
        dt,
        lambda: 0.0,
        kappa: 0.0,
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn flat_index_round_trip_random_grids() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..50 {
        let dims = GridDims::new(rng.gen_range(1..20), rng.gen_range(1..20), rng.gen_range(1..20));
        for _ in 0..100 {
            let (i, j, k) = (
                rng.gen_range(0..dims.nx),
                rng.gen_range(0..dims.ny),
                rng.gen_range(0..dims.nz),
            );
            let idx = dims.to_flat_index(i, j, k);
            assert!(idx < dims.total_points());
            assert_eq!(dims.from_flat_index(idx), (i, j, k));
        }
    }
}

#[test]
fn boundary_operators_vanish_for_random_fields() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut field = unit_grid(6, 0.01);
    let dims = field.dims();
    for idx in 0..dims.total_points() {
        let (i, j, k) = dims.from_flat_index(idx);
        let v = Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
        field.set_delta_phi(i, j, k, v).unwrap();
    }

    let mut interior_nonzero = 0;
    for idx in 0..dims.total_points() {
        let (i, j, k) = dims.from_flat_index(idx);
        let grad = field.compute_gradient(i, j, k).unwrap();
        let lap = field.compute_laplacian(i, j, k).unwrap();
        if dims.is_boundary(i, j, k) {
            assert_eq!(grad, Vector3D::zero());
            assert!(lap.is_zero());
        } else if !lap.is_zero() {
            interior_nonzero += 1;
        }
    }
    assert_eq!(interior_nonzero, dims.interior_points());
}

#[test]
fn free_wave_stays_bounded() {
    let dt = 0.05;
    let mut field = unit_grid(9, dt);
    field.set_delta_phi(4, 4, 4, Complex64::new(1.0, 0.0)).unwrap();
    field.set_delta_phi(3, 4, 4, Complex64::new(0.0, 0.5)).unwrap();

    let zero = vec![Complex64::zero(); field.total_points()];
    let initial = field.compute_max_amplitude();
    for _ in 0..20 {
        field.evolve_step(&zero, &zero).unwrap();
        let amp = field.compute_max_amplitude();
        assert!(amp.is_finite());
        assert!(amp <= initial * (1.0 + 1e-12), "amplitude grew to {}", amp);
    }
    assert!((field.current_time() - 1.0).abs() < 1e-12);
}

#[test]
fn set_alpha_outside_range_leaves_value() {
    let mut field = SymmetryField::new(SymmetryFieldConfig {
        nx: 3,
        ny: 3,
        nz: 3,
        alpha_min: 1.2,
        alpha_max: 1.8,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(field.alpha(1, 1, 1).unwrap(), 1.8);
    field.set_alpha(1, 1, 1, 1.5).unwrap();

    for bad in [1.0, 1.19, 1.81, 2.0] {
        match field.set_alpha(1, 1, 1, bad) {
            Err(FieldError::InvalidAlpha { value, min, max }) => {
                assert_eq!(value, bad);
                assert_eq!((min, max), (1.2, 1.8));
            }
            other => panic!("expected InvalidAlpha for {}, got {:?}", bad, other),
        }
        assert_eq!(field.alpha(1, 1, 1).unwrap(), 1.5);
    }
    assert!(matches!(field.set_alpha(3, 1, 1, 1.5), Err(FieldError::OutOfRange { .. })));
}

#[test]
fn point_excitation_single_step() {
    let dt = 0.01;
    let mut field = unit_grid(4, dt);
    let dims = field.dims();
    let (ci, cj, ck) = (dims.nx / 2, dims.ny / 2, dims.nz / 2);
    assert_eq!((ci, cj, ck), (2, 2, 2));
    field.set_delta_phi(ci, cj, ck, Complex64::new(1.0, 0.0)).unwrap();

    let zero = vec![Complex64::zero(); field.total_points()];
    field.evolve_step(&zero, &zero).unwrap();

    let centre = field.delta_phi(2, 2, 2).unwrap();
    assert!((centre.re - (1.0 - 6.0 * dt)).abs() < 1e-12);

    // Interior face neighbours; (3,2,2), (2,3,2), (2,2,3) lie on the boundary.
    for (i, j, k) in [(1, 2, 2), (2, 1, 2), (2, 2, 1)] {
        let v = field.delta_phi(i, j, k).unwrap();
        assert!((v.re - dt).abs() < 1e-15, "({},{},{}) = {}", i, j, k, v);
        assert_eq!(v.im, 0.0);
    }
    for (i, j, k) in [(3, 2, 2), (2, 3, 2), (2, 2, 3)] {
        assert!(field.delta_phi(i, j, k).unwrap().is_zero());
    }

    for idx in 0..dims.total_points() {
        let (i, j, k) = dims.from_flat_index(idx);
        let dist = (i as i64 - 2).abs() + (j as i64 - 2).abs() + (k as i64 - 2).abs();
        if dist >= 2 {
            assert!(field.delta_phi(i, j, k).unwrap().is_zero(), "({},{},{}) changed", i, j, k);
        }
    }
}

#[test]
fn caches_refresh_after_each_step() {
    let mut field = SymmetryField::new(SymmetryFieldConfig {
        nx: 5,
        ny: 5,
        nz: 5,
        dx: 1.0,
        dy: 1.0,
        dz: 1.0,
        dt: 0.01,
        ..Default::default()
    })
    .unwrap();
    field.set_delta_phi(2, 2, 2, Complex64::new(0.5, 0.5)).unwrap();
    let zero = vec![Complex64::zero(); field.total_points()];
    field.evolve_step(&zero, &zero).unwrap();

    let dims = field.dims();
    for idx in 0..dims.total_points() {
        let (i, j, k) = dims.from_flat_index(idx);
        assert_eq!(field.potential(i, j, k).unwrap(), field.compute_potential(i, j, k).unwrap());
        assert_eq!(
            field.gradient_magnitude(i, j, k).unwrap(),
            field.compute_gradient(i, j, k).unwrap().magnitude()
        );
    }
    let stats = field.statistics();
    assert!(stats.max_gradient > 0.0);
    let gradients = field.gradient_magnitudes();
    assert_eq!(stats.max_gradient, gradients.iter().copied().fold(0.0, f64::max));
    assert_eq!(stats.mean_gradient, gradients.iter().sum::<f64>() / field.total_points() as f64);
    assert_eq!(field.potential_values().len(), field.total_points());
    assert_eq!(stats.total_energy, field.compute_total_energy());
}
