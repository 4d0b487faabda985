//! Grid dimensions and flat indexing.
//!
//! Points are stored i-fastest: idx = i + nx·(j + ny·k).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDims {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
}

impl GridDims {
    pub const fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Self { nx, ny, nz }
    }

    pub const fn total_points(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    #[inline]
    pub const fn to_flat_index(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.nx * (j + self.ny * k)
    }

    #[inline]
    pub const fn from_flat_index(&self, idx: usize) -> (usize, usize, usize) {
        let i = idx % self.nx;
        let j = (idx / self.nx) % self.ny;
        let k = idx / (self.nx * self.ny);
        (i, j, k)
    }

    #[inline]
    pub const fn contains(&self, i: usize, j: usize, k: usize) -> bool {
        i < self.nx && j < self.ny && k < self.nz
    }

    /// First or last index on any axis.
    #[inline]
    pub const fn is_boundary(&self, i: usize, j: usize, k: usize) -> bool {
        i == 0 || j == 0 || k == 0 || i + 1 >= self.nx || j + 1 >= self.ny || k + 1 >= self.nz
    }

    /// Number of points with no boundary neighbour missing.
    pub fn interior_points(&self) -> usize {
        self.nx.saturating_sub(2) * self.ny.saturating_sub(2) * self.nz.saturating_sub(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_index_layout() {
        let d = GridDims::new(3, 4, 5);
        assert_eq!(d.total_points(), 60);
        assert_eq!(d.to_flat_index(0, 0, 0), 0);
        assert_eq!(d.to_flat_index(1, 0, 0), 1);
        assert_eq!(d.to_flat_index(0, 1, 0), 3);
        assert_eq!(d.to_flat_index(0, 0, 1), 12);
        assert_eq!(d.to_flat_index(2, 3, 4), 59);
    }

    #[test]
    fn round_trip_every_point() {
        let d = GridDims::new(4, 3, 2);
        for idx in 0..d.total_points() {
            let (i, j, k) = d.from_flat_index(idx);
            assert!(d.contains(i, j, k));
            assert_eq!(d.to_flat_index(i, j, k), idx);
        }
    }

    #[test]
    fn boundary_classification() {
        let d = GridDims::new(4, 4, 4);
        assert!(d.is_boundary(0, 2, 2));
        assert!(d.is_boundary(3, 2, 2));
        assert!(d.is_boundary(2, 2, 3));
        assert!(!d.is_boundary(1, 2, 2));
        assert!(!d.is_boundary(2, 2, 2));
        assert_eq!(d.interior_points(), 8);

        let flat = GridDims::new(2, 8, 8);
        assert_eq!(flat.interior_points(), 0);
    }
}
