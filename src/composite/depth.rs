//! Depth-tested pixel merge.
//!
//! A fragment replaces the current pixel when it is strictly nearer under
//! the active [`DepthTest`]; on equal depth the fragment from the lower tile
//! index wins. Depths compare with `f32::total_cmp`, so the rule is a strict
//! total order on `(depth, tile)` and the reduced image does not depend on
//! the order partial images are merged in.

use std::cmp::Ordering;

#[cfg(not(feature = "rayon"))]
use itertools::izip;

use crate::data::image::PartialImage;
use crate::vis_error::VisError;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DepthTest {
    /// Smaller depth is nearer.
    #[default]
    Less,
    /// Larger depth is nearer.
    Greater,
}

impl DepthTest {
    /// Does fragment `(z, tile)` replace the pixel currently at
    /// `(cur_z, cur_tile)`?
    #[inline]
    pub fn fragment_wins(self, z: f32, tile: u32, cur_z: f32, cur_tile: u32) -> bool {
        let nearer = match self {
            DepthTest::Less => z.total_cmp(&cur_z),
            DepthTest::Greater => cur_z.total_cmp(&z),
        };
        nearer.then(tile.cmp(&cur_tile)) == Ordering::Less
    }

    /// Merge `src` into `dst` pixel by pixel.
    pub fn merge_into(self, dst: &mut PartialImage, src: &PartialImage) -> Result<(), VisError> {
        if dst.descriptor() != src.descriptor() {
            return Err(VisError::BufferSizeMismatch {
                what: "composited image",
                expected: dst.descriptor().pixel_count(),
                actual: src.descriptor().pixel_count(),
            });
        }
        dst.validate()?;
        src.validate()?;
        self.merge_pixels(dst, src);
        Ok(())
    }

    #[cfg(not(feature = "rayon"))]
    fn merge_pixels(self, dst: &mut PartialImage, src: &PartialImage) {
        let PartialImage { r, g, b, a, z, provenance, .. } = dst;
        let pixels = izip!(r.iter_mut(), g.iter_mut(), b.iter_mut(), a.iter_mut(), z.iter_mut(), provenance.iter_mut());
        for (i, (r, g, b, a, z, p)) in pixels.enumerate() {
            if self.fragment_wins(src.z[i], src.provenance[i], *z, *p) {
                *r = src.r[i];
                *g = src.g[i];
                *b = src.b[i];
                *a = src.a[i];
                *z = src.z[i];
                *p = src.provenance[i];
            }
        }
    }

    #[cfg(feature = "rayon")]
    fn merge_pixels(self, dst: &mut PartialImage, src: &PartialImage) {
        use rayon::prelude::*;

        let PartialImage { r, g, b, a, z, provenance, .. } = dst;
        (
            r.par_iter_mut(),
            g.par_iter_mut(),
            b.par_iter_mut(),
            a.par_iter_mut(),
            z.par_iter_mut(),
            provenance.par_iter_mut(),
        )
            .into_par_iter()
            .enumerate()
            .for_each(|(i, (r, g, b, a, z, p))| {
                if self.fragment_wins(src.z[i], src.provenance[i], *z, *p) {
                    *r = src.r[i];
                    *g = src.g[i];
                    *b = src.b[i];
                    *a = src.a[i];
                    *z = src.z[i];
                    *p = src.provenance[i];
                }
            });
    }
}
