//! Per-tile particle records read by the render units.

use serde::{Deserialize, Serialize};

use crate::vis_error::VisError;

/// Particles owned by one tile, one entry per particle in every field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticleSlice {
    pub id: Vec<i64>,
    pub position: Vec<[f64; 3]>,
    pub temperature: Vec<f64>,
    pub density: Vec<f64>,
}

impl ParticleSlice {
    #[inline]
    pub fn len(&self) -> usize {
        self.id.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    pub fn push(&mut self, id: i64, position: [f64; 3], temperature: f64, density: f64) {
        self.id.push(id);
        self.position.push(position);
        self.temperature.push(temperature);
        self.density.push(density);
    }

    pub fn validate(&self) -> Result<(), VisError> {
        let n = self.id.len();
        for (what, actual) in [
            ("particle position", self.position.len()),
            ("particle temperature", self.temperature.len()),
            ("particle density", self.density.len()),
        ] {
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
