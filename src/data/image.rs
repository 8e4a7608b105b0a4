//! Partial images: the five-channel rasters produced per tile and reduced
//! into one composite.

use serde::{Deserialize, Serialize};

use crate::vis_error::VisError;

pub const DEFAULT_IMAGE_WIDTH: u32 = 1280;
pub const DEFAULT_IMAGE_HEIGHT: u32 = 720;

/// Depth written for pixels no fragment has covered (the far plane).
pub const CLEAR_DEPTH: f32 = 1.0;

/// Provenance of pixels no tile has written yet.
pub const NO_TILE: u32 = u32::MAX;

/// Resolution of the images of one sample.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub width: u32,
    pub height: u32,
    /// Images composited per frame.
    pub num_images: u32,
}

impl Default for ImageDescriptor {
    fn default() -> Self {
        ImageDescriptor {
            width: DEFAULT_IMAGE_WIDTH,
            height: DEFAULT_IMAGE_HEIGHT,
            num_images: 1,
        }
    }
}

impl ImageDescriptor {
    pub fn new(width: u32, height: u32) -> Self {
        ImageDescriptor {
            width,
            height,
            num_images: 1,
        }
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Channels of a partial image, in field order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ImageChannel {
    R,
    G,
    B,
    A,
    Z,
}

impl ImageChannel {
    pub const ALL: [ImageChannel; 5] = [
        ImageChannel::R,
        ImageChannel::G,
        ImageChannel::B,
        ImageChannel::A,
        ImageChannel::Z,
    ];
}

/// One tile's color + depth raster, channel-major, pixel `x + y * width`.
#[derive(Clone, Debug, PartialEq)]
pub struct PartialImage {
    descriptor: ImageDescriptor,
    pub r: Vec<f32>,
    pub g: Vec<f32>,
    pub b: Vec<f32>,
    pub a: Vec<f32>,
    pub z: Vec<f32>,
    /// Linear index of the tile that produced each pixel.
    pub provenance: Vec<u32>,
}

impl PartialImage {
    /// Transparent black at the far plane, produced by no tile.
    pub fn cleared(descriptor: ImageDescriptor) -> Self {
        let n = descriptor.pixel_count();
        PartialImage {
            descriptor,
            r: vec![0.0; n],
            g: vec![0.0; n],
            b: vec![0.0; n],
            a: vec![0.0; n],
            z: vec![CLEAR_DEPTH; n],
            provenance: vec![NO_TILE; n],
        }
    }

    #[inline]
    pub fn descriptor(&self) -> &ImageDescriptor {
        &self.descriptor
    }

    pub fn channel(&self, channel: ImageChannel) -> &[f32] {
        match channel {
            ImageChannel::R => &self.r,
            ImageChannel::G => &self.g,
            ImageChannel::B => &self.b,
            ImageChannel::A => &self.a,
            ImageChannel::Z => &self.z,
        }
    }

    /// Every channel holds exactly `width * height` values.
    pub fn validate(&self) -> Result<(), VisError> {
        let n = self.descriptor.pixel_count();
        let lens = [
            ("image red channel", self.r.len()),
            ("image green channel", self.g.len()),
            ("image blue channel", self.b.len()),
            ("image alpha channel", self.a.len()),
            ("image depth channel", self.z.len()),
            ("image provenance", self.provenance.len()),
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

    /// Overwrite every pixel from a rasterizer's RGBA8 and depth buffers.
    /// Color bytes are normalized to `[0, 1]`.
    pub fn write_fragments(
        &mut self,
        rgba: &[u8],
        depth: &[f32],
        tile_index: u32,
    ) -> Result<(), VisError> {
        self.validate()?;
        let n = self.descriptor.pixel_count();
        if rgba.len() != n * 4 {
            return Err(VisError::BufferSizeMismatch {
                what: "rasterizer RGBA buffer",
                expected: n * 4,
                actual: rgba.len(),
            });
        }
        if depth.len() != n {
            return Err(VisError::BufferSizeMismatch {
                what: "rasterizer depth buffer",
                expected: n,
                actual: depth.len(),
            });
        }
        for (i, (px, &d)) in rgba.chunks_exact(4).zip(depth).enumerate() {
            self.r[i] = f32::from(px[0]) / 255.0;
            self.g[i] = f32::from(px[1]) / 255.0;
            self.b[i] = f32::from(px[2]) / 255.0;
            self.a[i] = f32::from(px[3]) / 255.0;
            self.z[i] = d;
            self.provenance[i] = tile_index;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_descriptor_is_720p() {
        let d = ImageDescriptor::default();
        assert_eq!((d.width, d.height, d.num_images), (1280, 720, 1));
        assert_eq!(d.pixel_count(), 921_600);
    }

    #[test]
    fn write_fragments_normalizes_bytes() {
        let mut img = PartialImage::cleared(ImageDescriptor::new(2, 1));
        img.write_fragments(&[255, 0, 51, 255, 0, 255, 0, 0], &[0.25, 0.75], 7)
            .unwrap();
        assert_eq!(img.r, vec![1.0, 0.0]);
        assert_eq!(img.g, vec![0.0, 1.0]);
        assert!((img.b[0] - 0.2).abs() < 1e-6);
        assert_eq!(img.a, vec![1.0, 0.0]);
        assert_eq!(img.z, vec![0.25, 0.75]);
        assert_eq!(img.provenance, vec![7, 7]);
    }

    #[test]
    fn write_fragments_rejects_wrong_sizes() {
        let mut img = PartialImage::cleared(ImageDescriptor::new(2, 2));
        assert!(img.write_fragments(&[0; 15], &[0.0; 4], 0).is_err());
        assert!(img.write_fragments(&[0; 16], &[0.0; 3], 0).is_err());
        assert_eq!(img.provenance, vec![NO_TILE; 4]);
    }

    #[test]
    fn validate_catches_short_channel() {
        let mut img = PartialImage::cleared(ImageDescriptor::new(2, 1));
        assert!(img.validate().is_ok());
        img.z = vec![0.0];
        assert_eq!(
            img.validate().unwrap_err(),
            VisError::BufferSizeMismatch {
                what: "image depth channel",
                expected: 2,
                actual: 1
            }
        );
        img.z = vec![0.0; 2];
        img.provenance.push(0);
        assert!(img.validate().is_err());
        assert!(img.write_fragments(&[0; 8], &[0.0; 2], 0).is_err());
    }
}
