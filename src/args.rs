// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use clap::Parser;
use edgefirst_preview::pattern::{self, Pattern};
use std::path::PathBuf;

/// Synthetic frame content rendered by the simulated surface.
#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Copy)]
pub enum PatternSetting {
    /// Eight vertical color bars
    Bars,
    /// Solid black
    Black,
    /// Solid white
    White,
    /// Solid red
    Red,
    /// Solid green
    Green,
    /// Solid blue
    Blue,
}

impl From<PatternSetting> for Pattern {
    fn from(setting: PatternSetting) -> Self {
        match setting {
            PatternSetting::Bars => Pattern::ColorBars,
            PatternSetting::Black => Pattern::Solid(pattern::BLACK),
            PatternSetting::White => Pattern::Solid(pattern::WHITE),
            PatternSetting::Red => Pattern::Solid(pattern::RED),
            PatternSetting::Green => Pattern::Solid(pattern::GREEN),
            PatternSetting::Blue => Pattern::Solid(pattern::BLUE),
        }
    }
}

/// Command-line arguments for the EdgeFirst preview bridge.
///
/// The binary plays the part of the host platform: it creates a preview
/// surface, renders a test pattern onto it, rotates and resizes it, and
/// writes every converted YV12 frame to the output file. Arguments can be
/// specified via command line or environment variables.
///
/// # Example
///
/// ```bash
/// # Via command line
/// edgefirst-preview --size 1280 720 --rotations "0 90 180 270" --output preview.yuv
///
/// # Via environment variables
/// export PREVIEW_SIZE="640 480"
/// export ROTATIONS=90
/// edgefirst-preview
/// ```
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Preview surface size in pixels (width height)
    #[arg(
        short,
        long,
        env = "PREVIEW_SIZE",
        default_value = "640 480",
        value_delimiter = ' ',
        num_args = 2,
        allow_negative_numbers = true
    )]
    pub size: Vec<i32>,

    /// Resize the surface halfway through the stream (width height)
    #[arg(
        long,
        env = "RESIZE",
        value_delimiter = ' ',
        num_args = 2,
        allow_negative_numbers = true
    )]
    pub resize: Option<Vec<i32>>,

    /// Display rotations in degrees, spread evenly over the stream
    #[arg(
        short,
        long,
        env = "ROTATIONS",
        default_value = "0",
        value_delimiter = ' ',
        allow_negative_numbers = true
    )]
    pub rotations: Vec<i32>,

    /// Number of frames to render
    #[arg(short, long, env = "FRAMES", default_value = "30")]
    pub frames: u32,

    /// Frame rate of the simulated surface
    #[arg(long, env = "FPS", default_value = "30")]
    pub fps: u32,

    /// Test pattern rendered onto the surface
    #[arg(short, long, env = "PATTERN", default_value = "bars", value_enum)]
    pub pattern: PatternSetting,

    /// Raw YV12 output file, frames are appended back to back
    #[arg(short, long, env = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Depth of the queue between the preview and the frame writer
    #[arg(long, env = "QUEUE_DEPTH", default_value = "4")]
    pub queue_depth: usize,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Also log to the systemd journal
    #[arg(long, env = "JOURNALD")]
    pub journald: bool,

    /// Enable Tokio async runtime console for debugging
    #[arg(long, env = "TOKIO_CONSOLE")]
    pub tokio_console: bool,

    /// Enable Tracy profiler for performance analysis
    #[arg(long, env = "TRACY")]
    pub tracy: bool,
}

impl Args {
    /// Display rotation in effect for frame `index`.
    pub fn rotation_at(&self, index: u32) -> i32 {
        if self.rotations.is_empty() {
            return 0;
        }
        let frames = self.frames.max(1) as usize;
        let slot = index as usize * self.rotations.len() / frames;
        self.rotations[slot.min(self.rotations.len() - 1)]
    }
}
