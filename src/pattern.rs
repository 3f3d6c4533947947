// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Synthetic ARGB frame sources.

use crate::{
    error::{PreviewError, Result},
    image::check_geometry,
    preview::PixelSource,
};

pub const BLACK: u32 = 0xff00_0000;
pub const WHITE: u32 = 0xffff_ffff;
pub const RED: u32 = 0xffff_0000;
pub const GREEN: u32 = 0xff00_ff00;
pub const BLUE: u32 = 0xff00_00ff;

/// 100% color bars: white, yellow, cyan, green, magenta, red, blue, black.
pub const COLOR_BARS: [u32; 8] = [
    WHITE,
    0xffff_ff00,
    0xff00_ffff,
    GREEN,
    0xffff_00ff,
    RED,
    BLUE,
    BLACK,
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Pattern {
    /// Every pixel is the given ARGB sample.
    Solid(u32),
    /// Eight vertical bars, see [`COLOR_BARS`].
    ColorBars,
}

/// A frame source that renders a fixed [`Pattern`], standing in for the
/// bitmap a preview surface hands back on each update.
#[derive(Clone, Debug)]
pub struct TestPattern {
    width: i32,
    height: i32,
    pattern: Pattern,
}

impl TestPattern {
    pub fn new(width: i32, height: i32, pattern: Pattern) -> Result<Self> {
        check_geometry(width, height)?;
        Ok(Self {
            width,
            height,
            pattern,
        })
    }

    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    /// Renders the pattern into a new pixel buffer.
    pub fn to_argb(&self) -> Vec<u32> {
        let mut pixels = vec![0; self.width as usize * self.height as usize];
        self.fill(&mut pixels);
        pixels
    }

    fn fill(&self, dst: &mut [u32]) {
        match self.pattern {
            Pattern::Solid(sample) => dst.fill(sample),
            Pattern::ColorBars => {
                let width = self.width as usize;
                for row in dst.chunks_exact_mut(width) {
                    for (i, px) in row.iter_mut().enumerate() {
                        *px = COLOR_BARS[i * COLOR_BARS.len() / width];
                    }
                }
            }
        }
    }
}

impl PixelSource for TestPattern {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn read_pixels(&self, dst: &mut [u32]) -> Result<()> {
        let expected = self.width as usize * self.height as usize;
        if dst.len() != expected {
            return Err(PreviewError::BufferSizeMismatch {
                expected,
                actual: dst.len(),
            });
        }
        self.fill(dst);
        Ok(())
    }
}
