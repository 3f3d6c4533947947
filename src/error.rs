// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Error types for the preview bridge.

use thiserror::Error;

/// Errors raised while converting preview frames or computing the surface
/// transform.
///
/// None of these are fatal to a running preview: the frame handler logs the
/// error and skips the frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PreviewError {
    /// Width or height is zero or negative.
    #[error("invalid frame geometry {width}x{height}")]
    InvalidGeometry { width: i64, height: i64 },

    /// A pixel or planar buffer does not have the length the geometry
    /// requires.
    #[error("buffer size mismatch: expected {expected} but found {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Display rotation outside of {0, 90, 180, 270}.
    #[error("unsupported rotation {0} degrees")]
    UnsupportedRotation(i32),

    /// A frame arrived while no surface was available.
    #[error("preview surface is not ready")]
    NotReady,
}

pub type Result<T, E = PreviewError> = std::result::Result<T, E>;
