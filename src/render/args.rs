//! Render arguments: the parameter block every tile's render unit receives.
//!
//! Built once per dispatch, encoded into an immutable payload shared by all
//! units, and decoded inside each unit.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::data::image::ImageDescriptor;
use crate::vis_error::VisError;

/// Scalar field the isosurface is extracted from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IsosurfaceField {
    #[default]
    None,
    Density,
    Pressure,
    Velocity,
    Temperature,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderArguments {
    pub image: ImageDescriptor,
    /// Lower corner of the rendered bounding box.
    pub lower_bound: [f64; 3],
    /// Upper corner of the rendered bounding box.
    pub upper_bound: [f64; 3],
    pub isosurface_field: IsosurfaceField,
    pub isosurface_value: f64,
    pub isosurface_scale: [f64; 2],
    /// Ids of the particles to highlight.
    pub particles_to_draw: Vec<i64>,
}

impl RenderArguments {
    pub fn new(image: ImageDescriptor, lower_bound: [f64; 3], upper_bound: [f64; 3]) -> Self {
        RenderArguments {
            image,
            lower_bound,
            upper_bound,
            isosurface_field: IsosurfaceField::None,
            isosurface_value: 0.0,
            isosurface_scale: [0.0, 1.0],
            particles_to_draw: Vec::new(),
        }
    }

    pub fn with_isosurface(mut self, field: IsosurfaceField, value: f64, scale: [f64; 2]) -> Self {
        self.isosurface_field = field;
        self.isosurface_value = value;
        self.isosurface_scale = scale;
        self
    }

    /// Highlight the first `count` ids of `ids`.
    pub fn with_highlighted_particles(mut self, count: usize, ids: &[i64]) -> Result<Self, VisError> {
        let chosen = ids.get(..count).ok_or(VisError::BufferSizeMismatch {
            what: "particles to draw",
            expected: count,
            actual: ids.len(),
        })?;
        self.particles_to_draw = chosen.to_vec();
        Ok(self)
    }

    #[inline]
    pub fn num_particles_to_draw(&self) -> usize {
        self.particles_to_draw.len()
    }

    pub fn encode(&self) -> Result<Bytes, VisError> {
        bincode::serialize(self)
            .map(Bytes::from)
            .map_err(|e| VisError::ArgumentCodec(e.to_string()))
    }

    pub fn decode(payload: &[u8]) -> Result<Self, VisError> {
        bincode::deserialize(payload).map_err(|e| VisError::ArgumentCodec(e.to_string()))
    }
}
