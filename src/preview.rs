// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Texture preview surface bridge.
//!
//! The host platform owns the actual texture surface and drives this module
//! with lifecycle events through [`SurfaceEventHandler`]. [`TexturePreview`]
//! reacts to those events by
//!
//! - reallocating its [`PreviewBufferState`] whenever the surface size
//!   changes,
//! - recomputing the orientation transform and applying it to the
//!   [`PreviewSurface`], and
//! - converting every rendered frame to YV12 and handing it to the
//!   registered [`FrameListener`].
//!
//! # Thread Safety
//!
//! Events are expected one at a time and every handler takes `&mut self`.
//! Hosts delivering events from several threads should share the preview as
//! a [`SharedPreview`], which serializes them behind a mutex.
//!
//! # Example
//!
//! ```
//! use edgefirst_preview::{
//!     pattern::{Pattern, TestPattern, RED},
//!     preview::{NullSurface, SurfaceEventHandler, TexturePreview},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut preview = TexturePreview::new(NullSurface);
//! preview.set_frame_listener(|data: &[u8], width: i32, height: i32, _orientation: i32| {
//!     assert_eq!(data.len(), 6);
//!     assert_eq!((width, height), (2, 2));
//! });
//! preview.on_created(2, 2)?;
//! preview.on_frame_available(&TestPattern::new(2, 2, Pattern::Solid(RED))?)?;
//! # Ok(())
//! # }
//! ```

use crate::{
    error::{PreviewError, Result},
    image::{check_geometry, convert, yv12_size},
    transform::{self, AffineTransform},
};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, instrument, trace, warn};

/// Orientation tag reported with every converted frame.
///
/// The physical rotation is applied to the surface through the transform,
/// the frames themselves are always reported upright.
pub const ORIENTATION_UP: i32 = 90;

/// A rendered frame that can be read back as packed ARGB.
pub trait PixelSource {
    fn width(&self) -> i32;

    fn height(&self) -> i32;

    /// Copies the frame into `dst`, row-major, `width*height` samples.
    fn read_pixels(&self, dst: &mut [u32]) -> Result<()>;
}

/// The host's rendering surface.
pub trait PreviewSurface {
    /// Applies the display transform to the surface.
    fn set_transform(&mut self, transform: &AffineTransform);

    /// Sets the default size of the buffers the camera renders into.
    fn set_default_buffer_size(&mut self, _width: i32, _height: i32) {}
}

/// Receives surface availability changes.
pub trait PreviewCallback {
    fn on_surface_changed(&mut self);

    fn on_surface_destroyed(&mut self);
}

/// Consumer of converted YV12 frames.
pub trait FrameListener {
    fn on_frame_preview(&mut self, data: &[u8], width: i32, height: i32, orientation: i32);
}

impl<F> FrameListener for F
where
    F: FnMut(&[u8], i32, i32, i32),
{
    fn on_frame_preview(&mut self, data: &[u8], width: i32, height: i32, orientation: i32) {
        self(data, width, height, orientation)
    }
}

/// Surface lifecycle and frame events delivered by the host platform.
pub trait SurfaceEventHandler {
    /// The surface became available with the given size.
    fn on_created(&mut self, width: i32, height: i32) -> Result<()>;

    /// The surface changed size.
    fn on_resized(&mut self, width: i32, height: i32) -> Result<()>;

    /// The surface is going away. Returns `true` when the host may release
    /// it immediately.
    fn on_destroyed(&mut self) -> bool;

    /// A new frame was rendered onto the surface.
    fn on_frame_available(&mut self, source: &dyn PixelSource) -> Result<()>;
}

/// A surface that discards transforms, for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl PreviewSurface for NullSurface {
    fn set_transform(&mut self, _transform: &AffineTransform) {}
}

/// An owned ARGB frame, e.g. a bitmap already read back from the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: i32,
    height: i32,
    pixels: Vec<u32>,
}

impl Bitmap {
    pub fn new(width: i32, height: i32, pixels: Vec<u32>) -> Result<Self> {
        let (w, h) = check_geometry(width, height)?;
        if pixels.len() != w * h {
            return Err(PreviewError::BufferSizeMismatch {
                expected: w * h,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }
}

impl PixelSource for Bitmap {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn read_pixels(&self, dst: &mut [u32]) -> Result<()> {
        if dst.len() != self.pixels.len() {
            return Err(PreviewError::BufferSizeMismatch {
                expected: self.pixels.len(),
                actual: dst.len(),
            });
        }
        dst.copy_from_slice(&self.pixels);
        Ok(())
    }
}

/// Reusable scratch buffers for one surface geometry.
///
/// The ARGB and YV12 buffers are sized for the current surface and only
/// replaced, never partially resized, when the geometry changes.
#[derive(Debug, Default)]
pub struct PreviewBufferState {
    width: i32,
    height: i32,
    argb: Vec<u32>,
    yuv: Vec<u8>,
}

impl PreviewBufferState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates buffers for a `width`x`height` surface.
    ///
    /// Invalid geometry is rejected before anything is allocated and leaves
    /// the current buffers untouched.
    pub fn allocate(&mut self, width: i32, height: i32) -> Result<()> {
        let (w, h) = check_geometry(width, height)?;
        self.argb = vec![0; w * h];
        self.yuv = vec![0; yv12_size(w, h)];
        self.width = width;
        self.height = height;
        debug!(
            width,
            height,
            yuv_len = self.yuv.len(),
            "allocated preview buffers"
        );
        Ok(())
    }

    pub fn release(&mut self) {
        self.argb = Vec::new();
        self.yuv = Vec::new();
        self.width = 0;
        self.height = 0;
    }

    pub fn is_allocated(&self) -> bool {
        !self.yuv.is_empty()
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn argb(&self) -> &[u32] {
        &self.argb
    }

    pub fn yuv(&self) -> &[u8] {
        &self.yuv
    }

    /// Reads `source` into the ARGB buffer and converts it into the YV12
    /// buffer, returning the converted frame.
    ///
    /// The source must match the allocated geometry.
    pub fn convert(&mut self, source: &dyn PixelSource) -> Result<&[u8]> {
        let (width, height) = (source.width(), source.height());
        let (w, h) = check_geometry(width, height)?;
        if !self.is_allocated() {
            return Err(PreviewError::NotReady);
        }
        if (width, height) != (self.width, self.height) {
            return Err(PreviewError::BufferSizeMismatch {
                expected: self.argb.len(),
                actual: w * h,
            });
        }

        source.read_pixels(&mut self.argb)?;
        convert(&self.argb, width, height, &mut self.yuv)?;
        Ok(&self.yuv)
    }
}

/// Preview bridge for a texture surface.
pub struct TexturePreview<S: PreviewSurface> {
    surface: S,
    buffers: PreviewBufferState,
    width: i32,
    height: i32,
    display_orientation: i32,
    transform: AffineTransform,
    available: bool,
    frame_listener: Option<Box<dyn FrameListener + Send>>,
    callback: Option<Box<dyn PreviewCallback + Send>>,
}

impl<S: PreviewSurface> TexturePreview<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            buffers: PreviewBufferState::new(),
            width: 0,
            height: 0,
            display_orientation: 0,
            transform: AffineTransform::IDENTITY,
            available: false,
            frame_listener: None,
            callback: None,
        }
    }

    pub fn set_frame_listener(&mut self, listener: impl FrameListener + Send + 'static) {
        self.frame_listener = Some(Box::new(listener));
    }

    pub fn clear_frame_listener(&mut self) {
        self.frame_listener = None;
    }

    pub fn set_callback(&mut self, callback: impl PreviewCallback + Send + 'static) {
        self.callback = Some(Box::new(callback));
    }

    /// Updates the display rotation in degrees and reconfigures the
    /// surface transform.
    pub fn set_display_orientation(&mut self, degrees: i32) {
        self.display_orientation = degrees;
        self.configure_transform();
    }

    pub fn display_orientation(&self) -> i32 {
        self.display_orientation
    }

    /// Forwards the camera buffer size to the surface.
    pub fn set_buffer_size(&mut self, width: i32, height: i32) {
        self.surface.set_default_buffer_size(width, height);
    }

    pub fn is_ready(&self) -> bool {
        self.available
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// The transform last applied to the surface.
    pub fn transform(&self) -> AffineTransform {
        self.transform
    }

    pub fn buffers(&self) -> &PreviewBufferState {
        &self.buffers
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    fn configure_transform(&mut self) {
        self.transform = if self.available {
            transform::compute(self.display_orientation, self.width, self.height)
        } else {
            AffineTransform::IDENTITY
        };
        debug!(
            rotation = self.display_orientation,
            width = self.width,
            height = self.height,
            transform = ?self.transform,
            "configured surface transform"
        );
        self.surface.set_transform(&self.transform);
    }

    fn set_geometry(&mut self, width: i32, height: i32) -> Result<()> {
        self.buffers.allocate(width, height)?;
        self.width = width;
        self.height = height;
        self.available = true;
        self.configure_transform();
        if let Some(callback) = self.callback.as_mut() {
            callback.on_surface_changed();
        }
        Ok(())
    }
}

impl<S: PreviewSurface> SurfaceEventHandler for TexturePreview<S> {
    #[instrument(skip(self))]
    fn on_created(&mut self, width: i32, height: i32) -> Result<()> {
        self.set_geometry(width, height)
    }

    #[instrument(skip(self))]
    fn on_resized(&mut self, width: i32, height: i32) -> Result<()> {
        self.set_geometry(width, height)
    }

    fn on_destroyed(&mut self) -> bool {
        debug!("preview surface destroyed");
        self.width = 0;
        self.height = 0;
        self.available = false;
        self.buffers.release();
        if let Some(callback) = self.callback.as_mut() {
            callback.on_surface_destroyed();
        }
        true
    }

    fn on_frame_available(&mut self, source: &dyn PixelSource) -> Result<()> {
        if !self.available {
            warn!("frame available without a surface, skipping");
            return Err(PreviewError::NotReady);
        }

        let (width, height) = (source.width(), source.height());
        let data = match self.buffers.convert(source) {
            Ok(data) => data,
            Err(e) => {
                warn!(width, height, "skipping frame: {e}");
                return Err(e);
            }
        };

        trace!(width, height, len = data.len(), "frame converted");
        if let Some(listener) = self.frame_listener.as_mut() {
            listener.on_frame_preview(data, width, height, ORIENTATION_UP);
        }
        Ok(())
    }
}

/// A preview shared between threads.
pub type SharedPreview<S> = Arc<Mutex<TexturePreview<S>>>;

fn lock<H>(handler: &Arc<Mutex<H>>) -> MutexGuard<'_, H> {
    // A panicking listener must not take the preview down with it.
    handler.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<H: SurfaceEventHandler> SurfaceEventHandler for Arc<Mutex<H>> {
    fn on_created(&mut self, width: i32, height: i32) -> Result<()> {
        lock(self).on_created(width, height)
    }

    fn on_resized(&mut self, width: i32, height: i32) -> Result<()> {
        lock(self).on_resized(width, height)
    }

    fn on_destroyed(&mut self) -> bool {
        lock(self).on_destroyed()
    }

    fn on_frame_available(&mut self, source: &dyn PixelSource) -> Result<()> {
        lock(self).on_frame_available(source)
    }
}
