// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Software ARGB to YV12 conversion for preview frames.
//!
//! Preview surfaces hand back packed 32-bit ARGB pixels (`0xAARRGGBB`) while
//! downstream consumers expect planar 4:2:0 YV12: a full resolution luma
//! plane followed by the V plane and then the U plane, each chroma plane
//! sampled once per 2x2 block.

use crate::error::{PreviewError, Result};
use tracing::trace;

/// Validates a width/height pair and returns it as `usize`.
pub(crate) fn check_geometry(width: i32, height: i32) -> Result<(usize, usize)> {
    if width <= 0 || height <= 0 {
        return Err(PreviewError::InvalidGeometry {
            width: width as i64,
            height: height as i64,
        });
    }
    Ok((width as usize, height as usize))
}

/// Number of bytes in one chroma plane of a YV12 frame.
///
/// Odd dimensions round up so the last column and row still get a sample.
pub const fn chroma_plane_size(width: usize, height: usize) -> usize {
    width.div_ceil(2) * height.div_ceil(2)
}

/// Total size in bytes of a YV12 frame:
/// `width*height + 2*ceil(height/2)*ceil(width/2)`.
pub const fn yv12_size(width: usize, height: usize) -> usize {
    width * height + 2 * chroma_plane_size(width, height)
}

/// Splits a packed ARGB sample into its `(a, r, g, b)` channels.
#[inline]
pub const fn unpack_argb(sample: u32) -> (u8, u8, u8, u8) {
    (
        (sample >> 24) as u8,
        (sample >> 16) as u8,
        (sample >> 8) as u8,
        sample as u8,
    )
}

#[inline]
fn clamp_u8(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

/// BT.601 studio-swing luma for 8-bit RGB.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    clamp_u8(((66 * r + 129 * g + 25 * b + 128) >> 8) + 16)
}

/// BT.601 chroma as `(u, v)` for 8-bit RGB.
#[inline]
pub fn chroma(r: u8, g: u8, b: u8) -> (u8, u8) {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let u = ((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128;
    let v = ((112 * r - 94 * g - 18 * b + 128) >> 8) + 128;
    (clamp_u8(u), clamp_u8(v))
}

/// Converts a packed ARGB frame into YV12.
///
/// `dst` must be exactly [`yv12_size`] bytes, it is never resized so the
/// same buffer can be reused for every frame of a given size. Chroma is
/// taken from the top-left pixel of each 2x2 block with the V plane written
/// ahead of the U plane.
///
/// # Errors
///
/// Returns [`PreviewError::InvalidGeometry`] when either dimension is not
/// positive and [`PreviewError::BufferSizeMismatch`] when `argb` or `dst`
/// does not match the geometry. Nothing is written to `dst` on error.
///
/// # Example
///
/// ```
/// use edgefirst_preview::image::{convert, yv12_size};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let argb = vec![0xff00_0000u32; 4 * 2];
/// let mut yuv = vec![0u8; yv12_size(4, 2)];
/// convert(&argb, 4, 2, &mut yuv)?;
/// assert_eq!(&yuv[..8], &[16; 8]);
/// # Ok(())
/// # }
/// ```
pub fn convert(argb: &[u32], width: i32, height: i32, dst: &mut [u8]) -> Result<()> {
    let (width, height) = check_geometry(width, height)?;

    let frame_size = width * height;
    if argb.len() != frame_size {
        return Err(PreviewError::BufferSizeMismatch {
            expected: frame_size,
            actual: argb.len(),
        });
    }

    let expected = yv12_size(width, height);
    if dst.len() != expected {
        return Err(PreviewError::BufferSizeMismatch {
            expected,
            actual: dst.len(),
        });
    }

    let (y_plane, chroma_planes) = dst.split_at_mut(frame_size);
    let (v_plane, u_plane) = chroma_planes.split_at_mut(chroma_plane_size(width, height));

    let mut chroma_index = 0;
    for (j, row) in argb.chunks_exact(width).enumerate() {
        let y_row = &mut y_plane[j * width..(j + 1) * width];
        for (i, (&sample, y)) in row.iter().zip(y_row.iter_mut()).enumerate() {
            let (_a, r, g, b) = unpack_argb(sample);
            *y = luma(r, g, b);

            // On even rows the linear index j*width + i has the parity of i.
            if j % 2 == 0 && i % 2 == 0 {
                let (u, v) = chroma(r, g, b);
                v_plane[chroma_index] = v;
                u_plane[chroma_index] = u;
                chroma_index += 1;
            }
        }
    }

    trace!(width, height, chroma_index, "converted ARGB frame to YV12");
    Ok(())
}

/// Borrowed view over the three planes of a YV12 frame.
#[derive(Debug, Clone, Copy)]
pub struct Yv12Planes<'a> {
    pub y: &'a [u8],
    pub v: &'a [u8],
    pub u: &'a [u8],
}

impl<'a> Yv12Planes<'a> {
    /// Splits `data` into its luma and chroma planes.
    pub fn new(data: &'a [u8], width: i32, height: i32) -> Result<Self> {
        let (width, height) = check_geometry(width, height)?;
        let expected = yv12_size(width, height);
        if data.len() != expected {
            return Err(PreviewError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        let (y, chroma) = data.split_at(width * height);
        let (v, u) = chroma.split_at(chroma_plane_size(width, height));
        Ok(Self { y, v, u })
    }
}
