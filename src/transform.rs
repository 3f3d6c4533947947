// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Display orientation transforms for the preview surface.
//!
//! The preview texture is always rendered in the sensor's natural
//! orientation. When the display is rotated the surface is given an affine
//! transform which maps the canonical corners of the view onto their rotated
//! positions, so the content appears upright without re-rendering pixels.
//! Every transform is computed from scratch from the current geometry.

use crate::{
    error::{PreviewError, Result},
    image::check_geometry,
};
use std::ops::Mul;
use tracing::warn;

/// Display rotation angles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    /// No rotation (0 degrees)
    #[default]
    Rotation0,
    /// Rotate 90 degrees clockwise
    Rotation90,
    /// Rotate 180 degrees
    Rotation180,
    /// Rotate 270 degrees clockwise (90 degrees counter-clockwise)
    Rotation270,
}

impl Rotation {
    pub const fn degrees(self) -> i32 {
        match self {
            Rotation::Rotation0 => 0,
            Rotation::Rotation90 => 90,
            Rotation::Rotation180 => 180,
            Rotation::Rotation270 => 270,
        }
    }

    /// True for 90 and 270, where the view's aspect is swapped.
    pub const fn is_quarter_turn(self) -> bool {
        matches!(self, Rotation::Rotation90 | Rotation::Rotation270)
    }
}

impl TryFrom<i32> for Rotation {
    type Error = PreviewError;

    fn try_from(degrees: i32) -> std::result::Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::Rotation0),
            90 => Ok(Rotation::Rotation90),
            180 => Ok(Rotation::Rotation180),
            270 => Ok(Rotation::Rotation270),
            _ => Err(PreviewError::UnsupportedRotation(degrees)),
        }
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// A point in surface coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Corners of a `width`x`height` rectangle in the fixed order top-left,
/// top-right, bottom-left, bottom-right.
pub fn corners(width: f32, height: f32) -> [Point; 4] {
    [
        Point::new(0.0, 0.0),
        Point::new(width, 0.0),
        Point::new(0.0, height),
        Point::new(width, height),
    ]
}

/// 2D affine transform.
///
/// Maps `(x, y)` to `(sx*x + kx*y + tx, ky*x + sy*y + ty)`, the top two rows
/// of a 3x3 homogeneous matrix.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AffineTransform {
    pub sx: f32,
    pub kx: f32,
    pub tx: f32,
    pub ky: f32,
    pub sy: f32,
    pub ty: f32,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AffineTransform {
    pub const IDENTITY: AffineTransform = AffineTransform {
        sx: 1.0,
        kx: 0.0,
        tx: 0.0,
        ky: 0.0,
        sy: 1.0,
        ty: 0.0,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn translate(dx: f32, dy: f32) -> Self {
        Self {
            tx: dx,
            ty: dy,
            ..Self::IDENTITY
        }
    }

    /// Rotation by `degrees` clockwise (y axis points down) about `pivot`.
    pub fn rotate_about(degrees: f32, pivot: Point) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        // Snap so quarter turns stay exact.
        let (sin, cos) = (snap(sin), snap(cos));
        let rotate = Self {
            sx: cos,
            kx: -sin,
            tx: 0.0,
            ky: sin,
            sy: cos,
            ty: 0.0,
        };
        Self::translate(pivot.x, pivot.y) * rotate * Self::translate(-pivot.x, -pivot.y)
    }

    /// Solves the affine transform carrying `src[n]` onto `dst[n]`.
    ///
    /// Returns `None` when the source points are collinear.
    pub fn from_correspondence(src: [Point; 3], dst: [Point; 3]) -> Option<Self> {
        let [p0, p1, p2] = src;
        let (ax, ay) = (p1.x - p0.x, p1.y - p0.y);
        let (bx, by) = (p2.x - p0.x, p2.y - p0.y);
        let det = ax * by - bx * ay;
        if det.abs() <= f32::EPSILON {
            return None;
        }

        let [q0, q1, q2] = dst;
        let (cx, cy) = (q1.x - q0.x, q1.y - q0.y);
        let (dx, dy) = (q2.x - q0.x, q2.y - q0.y);

        // Linear part M satisfies M*[a b] = [c d].
        let sx = (cx * by - dx * ay) / det;
        let kx = (dx * ax - cx * bx) / det;
        let ky = (cy * by - dy * ay) / det;
        let sy = (dy * ax - cy * bx) / det;

        Some(Self {
            sx,
            kx,
            tx: q0.x - (sx * p0.x + kx * p0.y),
            ky,
            sy,
            ty: q0.y - (ky * p0.x + sy * p0.y),
        })
    }

    pub fn map_point(&self, p: Point) -> Point {
        Point {
            x: self.sx * p.x + self.kx * p.y + self.tx,
            y: self.ky * p.x + self.sy * p.y + self.ty,
        }
    }

    pub fn map_corners(&self, corners: [Point; 4]) -> [Point; 4] {
        corners.map(|p| self.map_point(p))
    }

    /// Returns the transform applying `other` first and then `self`.
    pub fn concat(&self, other: &AffineTransform) -> AffineTransform {
        AffineTransform {
            sx: self.sx * other.sx + self.kx * other.ky,
            kx: self.sx * other.kx + self.kx * other.sy,
            tx: self.sx * other.tx + self.kx * other.ty + self.tx,
            ky: self.ky * other.sx + self.sy * other.ky,
            sy: self.ky * other.kx + self.sy * other.sy,
            ty: self.ky * other.tx + self.sy * other.ty + self.ty,
        }
    }

    /// Row-major 3x3 homogeneous matrix.
    pub fn to_matrix(&self) -> [f32; 9] {
        [
            self.sx, self.kx, self.tx, self.ky, self.sy, self.ty, 0.0, 0.0, 1.0,
        ]
    }
}

impl Mul for AffineTransform {
    type Output = AffineTransform;

    fn mul(self, rhs: AffineTransform) -> AffineTransform {
        self.concat(&rhs)
    }
}

fn snap(value: f32) -> f32 {
    let rounded = value.round();
    if (value - rounded).abs() < 1e-6 {
        rounded + 0.0
    } else {
        value
    }
}

/// Computes the transform for a `width`x`height` surface shown at
/// `rotation` degrees.
///
/// Quarter turns map the canonical corners `[(0,0), (w,0), (0,h), (w,h)]`
/// onto `[(0,h), (0,0), (w,h), (w,0)]` for 90 (clockwise) and
/// `[(w,0), (w,h), (0,0), (0,h)]` for 270 (counter-clockwise), stretching the
/// content to the swapped aspect. 180 rotates about the centre of the
/// surface and 0 is the identity.
///
/// Rotation values come from the platform and are not treated as errors
/// here: an unsupported rotation or an empty surface logs a warning and
/// yields the identity. Use [`try_compute`] to reject them instead.
pub fn compute(rotation: i32, width: i32, height: i32) -> AffineTransform {
    match try_compute(rotation, width, height) {
        Ok(transform) => transform,
        Err(e) => {
            warn!("{e}, using identity transform");
            AffineTransform::IDENTITY
        }
    }
}

/// Strict form of [`compute`].
///
/// # Errors
///
/// [`PreviewError::UnsupportedRotation`] for rotations outside of
/// {0, 90, 180, 270} and [`PreviewError::InvalidGeometry`] when either
/// dimension is not positive.
pub fn try_compute(rotation: i32, width: i32, height: i32) -> Result<AffineTransform> {
    compute_rotation(Rotation::try_from(rotation)?, width, height)
}

/// [`try_compute`] for an already validated [`Rotation`].
pub fn compute_rotation(rotation: Rotation, width: i32, height: i32) -> Result<AffineTransform> {
    let (width, height) = check_geometry(width, height)?;
    let (w, h) = (width as f32, height as f32);

    let transform = match rotation {
        Rotation::Rotation0 => AffineTransform::IDENTITY,
        Rotation::Rotation90 | Rotation::Rotation270 => {
            let src = corners(w, h);
            let dst = if rotation == Rotation::Rotation90 {
                // Clockwise
                [
                    Point::new(0.0, h),
                    Point::new(0.0, 0.0),
                    Point::new(w, h),
                    Point::new(w, 0.0),
                ]
            } else {
                // Counter-clockwise
                [
                    Point::new(w, 0.0),
                    Point::new(w, h),
                    Point::new(0.0, 0.0),
                    Point::new(0.0, h),
                ]
            };
            // Three corners determine the mapping, the fourth agrees.
            AffineTransform::from_correspondence([src[0], src[1], src[2]], [dst[0], dst[1], dst[2]])
                .ok_or(PreviewError::InvalidGeometry {
                    width: width as i64,
                    height: height as i64,
                })?
        }
        Rotation::Rotation180 => AffineTransform::rotate_about(180.0, Point::new(w / 2.0, h / 2.0)),
    };
    Ok(transform)
}
