//! Per-tile fluid field data read by the render units.

use serde::{Deserialize, Serialize};

use crate::vis_error::VisError;

/// Cell-centred fluid fields of one tile, stored contiguously (x fastest).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FluidSlice {
    /// Number of cells along x, y and z.
    pub extents: [usize; 3],
    pub density: Vec<f64>,
    pub pressure: Vec<f64>,
    pub velocity: Vec<[f64; 3]>,
    pub centers: Vec<[f64; 3]>,
    pub temperature: Vec<f64>,
}

impl FluidSlice {
    /// Zero-initialized slice with `nx*ny*nz` cells.
    pub fn zeroed(extents: [usize; 3]) -> Self {
        let n = extents.iter().product();
        FluidSlice {
            extents,
            density: vec![0.0; n],
            pressure: vec![0.0; n],
            velocity: vec![[0.0; 3]; n],
            centers: vec![[0.0; 3]; n],
            temperature: vec![0.0; n],
        }
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.extents.iter().product()
    }

    /// Every field must have exactly one value per cell.
    pub fn validate(&self) -> Result<(), VisError> {
        let n = self.cell_count();
        let lens = [
            ("fluid density", self.density.len()),
            ("fluid pressure", self.pressure.len()),
            ("fluid velocity", self.velocity.len()),
            ("fluid centers", self.centers.len()),
            ("fluid temperature", self.temperature.len()),
        ];
        for (what, actual) in lens {
            if actual != n {
                return Err(VisError::BufferSizeMismatch {
                    what,
                    expected: n,
                    actual,
                });
            }
        }
        Ok(())
    }
}
