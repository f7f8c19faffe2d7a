//! Reshaping flat engine output into a 3-D grid.
//!
//! The engine writes nodes in column-major order: x varies fastest, then y,
//! then z. The flat index of node `(i, j, k)` is `i + nx*j + nx*ny*k`.

use crate::error::{Result, VisimError};
use crate::models::SimulationOutput;
use serde::Serialize;
use std::ops::Index;

/// Owned 3-D copy of one grid's values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid3D {
    nx: usize,
    ny: usize,
    nz: usize,
    values: Vec<f64>,
}

/// Copy `values` into a grid of extents `nx × ny × nz`
pub fn to_grid(values: &[f64], nx: usize, ny: usize, nz: usize) -> Result<Grid3D> {
    let context = || format!("reshape to {}x{}x{} grid", nx, ny, nz);
    let expected = nx
        .checked_mul(ny)
        .and_then(|n| n.checked_mul(nz))
        .ok_or_else(|| VisimError::dimension_mismatch(context(), usize::MAX, values.len()))?;

    if values.len() != expected {
        return Err(VisimError::dimension_mismatch(
            context(),
            expected,
            values.len(),
        ));
    }

    Ok(Grid3D {
        nx,
        ny,
        nz,
        values: values.to_vec(),
    })
}

impl Grid3D {
    /// `(nx, ny, nz)`
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Flat column-major index of `(i, j, k)`, `None` outside the grid
    pub fn flat_index(&self, i: usize, j: usize, k: usize) -> Option<usize> {
        if i >= self.nx || j >= self.ny || k >= self.nz {
            return None;
        }
        Some(i + self.nx * j + self.nx * self.ny * k)
    }

    pub fn get(&self, i: usize, j: usize, k: usize) -> Option<f64> {
        self.flat_index(i, j, k).map(|index| self.values[index])
    }

    /// Values in column-major order
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Horizontal slice at depth `k`, indexed `[i][j]`
    pub fn layer(&self, k: usize) -> Option<Vec<Vec<f64>>> {
        if k >= self.nz {
            return None;
        }
        let offset = self.nx * self.ny * k;
        Some(
            (0..self.nx)
                .map(|i| {
                    (0..self.ny)
                        .map(|j| self.values[offset + i + self.nx * j])
                        .collect()
                })
                .collect(),
        )
    }
}

impl Index<(usize, usize, usize)> for Grid3D {
    type Output = f64;

    fn index(&self, (i, j, k): (usize, usize, usize)) -> &f64 {
        match self.flat_index(i, j, k) {
            Some(index) => &self.values[index],
            None => panic!(
                "grid index ({}, {}, {}) out of bounds for {}x{}x{} grid",
                i, j, k, self.nx, self.ny, self.nz
            ),
        }
    }
}

impl SimulationOutput {
    /// Realization `index` reshaped onto the output grid
    pub fn grid(&self, index: usize) -> Option<Grid3D> {
        let values = self.realization(index)?;
        Some(Grid3D {
            nx: self.nx,
            ny: self.ny,
            nz: self.nz,
            values: values.to_vec(),
        })
    }
}
