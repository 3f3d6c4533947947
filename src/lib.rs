// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! # EdgeFirst Camera Preview Bridge
//!
//! This library bridges a camera preview rendered onto a texture surface to
//! consumers that expect planar YUV frames. It converts every rendered ARGB
//! frame into YV12 and keeps the surface's display transform in step with
//! the device rotation.
//!
//! ## Features
//!
//! - **Color Conversion**: BT.601 ARGB to YV12 (Y, V, U planes) into a
//!   caller supplied buffer, reused between frames of the same size.
//! - **Orientation Transforms**: Affine corner mappings compensating for
//!   0, 90, 180 and 270 degree display rotations.
//! - **Surface Bridge**: A [`preview::SurfaceEventHandler`] implementation
//!   which owns the scratch buffers, reallocates them on resize and
//!   forwards converted frames to a listener.
//!
//! ## Example
//!
//! ```
//! use edgefirst_preview::{
//!     image::{convert, yv12_size},
//!     transform::{compute, corners, Point},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Convert a 640x480 frame of opaque white to YV12
//! let argb = vec![0xffff_ffffu32; 640 * 480];
//! let mut yuv = vec![0u8; yv12_size(640, 480)];
//! convert(&argb, 640, 480, &mut yuv)?;
//! assert_eq!(yuv[0], 235);
//!
//! // Rotate the preview for a display turned 90 degrees clockwise
//! let transform = compute(90, 640, 480);
//! let mapped = transform.map_corners(corners(640.0, 480.0));
//! assert_eq!(mapped[1], Point::new(0.0, 0.0));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod image;
pub mod pattern;
pub mod preview;
pub mod transform;

pub use error::{PreviewError, Result};
