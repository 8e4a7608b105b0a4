//! Uncompressed 24-bit true-color TGA encoding of a partial image.
//!
//! Layout: an 18-byte header followed by `width * height` BGR triples,
//! rows emitted from the last (`y = height - 1`) to the first.

use std::io::Write;

use bytemuck::{Pod, Zeroable};
use static_assertions::assert_eq_size;

use crate::data::image::PartialImage;
use crate::vis_error::VisError;

/// Image type 2: uncompressed true-color.
pub const TGA_TRUE_COLOR: u8 = 0x02;
/// Bits per pixel written.
pub const TGA_PIXEL_DEPTH: u8 = 0x18;
/// Image descriptor byte written after the pixel depth.
pub const TGA_DESCRIPTOR: u8 = 0x20;
pub const TGA_HEADER_LEN: usize = 18;

/// On-disk TGA header; multi-byte fields are little-endian byte pairs.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct TgaHeader {
    pub id_length: u8,
    pub color_map_type: u8,
    pub image_type: u8,
    pub color_map_spec: [u8; 5],
    pub x_origin: [u8; 2],
    pub y_origin: [u8; 2],
    pub width: [u8; 2],
    pub height: [u8; 2],
    pub pixel_depth: u8,
    pub descriptor: u8,
}

assert_eq_size!(TgaHeader, [u8; TGA_HEADER_LEN]);

impl TgaHeader {
    /// Header of a `width` x `height` 24-bit image. Both must fit in 16 bits.
    pub fn true_color(width: u32, height: u32) -> Result<Self, VisError> {
        let too_large = || VisError::ImageTooLarge {
            width,
            height,
            max: u32::from(u16::MAX),
        };
        let w = u16::try_from(width).map_err(|_| too_large())?;
        let h = u16::try_from(height).map_err(|_| too_large())?;
        Ok(TgaHeader {
            image_type: TGA_TRUE_COLOR,
            width: w.to_le_bytes(),
            height: h.to_le_bytes(),
            pixel_depth: TGA_PIXEL_DEPTH,
            descriptor: TGA_DESCRIPTOR,
            ..TgaHeader::zeroed()
        })
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Scale a `[0, 1]` channel value to a byte; out-of-range values saturate.
#[inline]
pub fn channel_byte(v: f32) -> u8 {
    (v * 255.0) as u8
}

/// Write the header, then every pixel bottom row first in B, G, R order.
pub fn write_tga<W: Write>(out: &mut W, image: &PartialImage) -> Result<(), VisError> {
    image.validate()?;
    let d = image.descriptor();
    out.write_all(TgaHeader::true_color(d.width, d.height)?.as_bytes())?;

    let width = d.width as usize;
    let mut row = Vec::with_capacity(width * 3);
    for y in (0..d.height as usize).rev() {
        row.clear();
        for index in y * width..(y + 1) * width {
            row.push(channel_byte(image.b[index]));
            row.push(channel_byte(image.g[index]));
            row.push(channel_byte(image.r[index]));
        }
        out.write_all(&row)?;
    }
    Ok(())
}

/// Bytes [`write_tga`] produces for an image of this size.
#[inline]
pub fn encoded_len(width: u32, height: u32) -> usize {
    TGA_HEADER_LEN + width as usize * height as usize * 3
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::image::ImageDescriptor;

    #[test]
    fn header_bytes_for_720p() {
        let h = TgaHeader::true_color(1280, 720).unwrap();
        assert_eq!(
            h.as_bytes(),
            &[0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x00, 0x05, 0xD0, 0x02, 0x18, 0x20]
        );
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        assert_eq!(
            TgaHeader::true_color(70_000, 1).unwrap_err(),
            VisError::ImageTooLarge {
                width: 70_000,
                height: 1,
                max: 65_535
            }
        );
    }

    #[test]
    fn short_channel_fails_before_any_byte_is_written() {
        let mut img = PartialImage::cleared(ImageDescriptor::new(2, 2));
        img.b.truncate(1);
        let mut out = Vec::new();
        let err = write_tga(&mut out, &img).unwrap_err();
        assert!(matches!(err, VisError::BufferSizeMismatch { expected: 4, actual: 1, .. }));
        assert!(out.is_empty());
    }

    #[test]
    fn rows_are_bottom_up_and_bgr() {
        let mut img = PartialImage::cleared(ImageDescriptor::new(2, 2));
        // Row 0: red, green. Row 1: blue, white.
        img.r = vec![1.0, 0.0, 0.0, 1.0];
        img.g = vec![0.0, 1.0, 0.0, 1.0];
        img.b = vec![0.0, 0.0, 1.0, 1.0];
        let mut out = Vec::new();
        write_tga(&mut out, &img).unwrap();
        assert_eq!(out.len(), encoded_len(2, 2));
        assert_eq!(
            &out[TGA_HEADER_LEN..],
            &[255, 0, 0, 255, 255, 255, 0, 0, 255, 0, 255, 0]
        );
    }

    #[test]
    fn channel_scaling_truncates() {
        assert_eq!(channel_byte(0.5), 127);
        assert_eq!(channel_byte(1.0), 255);
        assert_eq!(channel_byte(-0.25), 0);
        assert_eq!(channel_byte(2.0), 255);
    }
}
