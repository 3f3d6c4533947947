// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};
use tracing::{debug, info};

/// A converted frame as delivered by the preview's frame listener.
pub struct PreviewFrame {
    pub data: Vec<u8>,
    pub width: i32,
    pub height: i32,
    pub orientation: i32,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct WriterStats {
    pub frames: u64,
    pub bytes: u64,
    pub width: i32,
    pub height: i32,
    pub orientation: i32,
}

/// Appends raw YV12 frames to a file, or just counts them when no file is
/// configured.
pub struct FrameWriter {
    out: Option<BufWriter<File>>,
    stats: WriterStats,
}

impl FrameWriter {
    pub fn new(path: Option<&Path>) -> io::Result<Self> {
        let out = match path {
            Some(path) => {
                info!("writing YV12 frames to {}", path.display());
                Some(BufWriter::new(File::create(path)?))
            }
            None => None,
        };
        Ok(Self {
            out,
            stats: WriterStats::default(),
        })
    }

    pub fn write(&mut self, frame: &PreviewFrame) -> io::Result<()> {
        if let Some(out) = self.out.as_mut() {
            out.write_all(&frame.data)?;
        }
        if (frame.width, frame.height) != (self.stats.width, self.stats.height) {
            debug!(
                "frame size changed {}x{} -> {}x{}",
                self.stats.width, self.stats.height, frame.width, frame.height
            );
        }
        self.stats.frames += 1;
        self.stats.bytes += frame.data.len() as u64;
        self.stats.width = frame.width;
        self.stats.height = frame.height;
        self.stats.orientation = frame.orientation;
        Ok(())
    }

    pub fn finish(mut self) -> io::Result<WriterStats> {
        if let Some(out) = self.out.as_mut() {
            out.flush()?;
        }
        Ok(self.stats)
    }
}

/// Drains `rx` into a [`FrameWriter`] until every sender is gone.
///
/// Writing lives in its own thread so a slow disk never stalls the preview.
pub fn writer_thread(
    rx: kanal::Receiver<PreviewFrame>,
    mut writer: FrameWriter,
) -> io::Result<WriterStats> {
    while let Ok(frame) = rx.recv() {
        writer.write(&frame)?;
    }
    writer.finish()
}
