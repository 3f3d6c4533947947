// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use args::Args;
use clap::Parser;
use edgefirst_preview::{
    pattern::{Pattern, TestPattern},
    preview::{PreviewCallback, PreviewSurface, SurfaceEventHandler, TexturePreview},
    transform::AffineTransform,
};
use serde_json::json;
use std::{error::Error, thread, time::Duration};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, info_span, warn};
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, Layer};
use video::{FrameWriter, PreviewFrame};

mod args;
mod video;

type BoxError = Box<dyn Error + Send + Sync>;

/// Events the simulated host platform delivers to the preview.
enum SurfaceEvent {
    Created(i32, i32),
    Resized(i32, i32),
    Orientation(i32),
    Frame(TestPattern),
    Destroyed,
}

/// Stand-in for the platform texture view: records the transform it is
/// given.
#[derive(Default)]
struct HostSurface {
    transform: AffineTransform,
    buffer_size: (i32, i32),
}

impl PreviewSurface for HostSurface {
    fn set_transform(&mut self, transform: &AffineTransform) {
        info!("surface transform {:?}", transform.to_matrix());
        self.transform = *transform;
    }

    fn set_default_buffer_size(&mut self, width: i32, height: i32) {
        debug!("surface buffer size {}x{}", width, height);
        self.buffer_size = (width, height);
    }
}

struct LifecycleLog;

impl PreviewCallback for LifecycleLog {
    fn on_surface_changed(&mut self) {
        info!("preview surface changed");
    }

    fn on_surface_destroyed(&mut self) {
        info!("preview surface destroyed");
    }
}

fn init_tracing(args: &Args) -> Result<(), BoxError> {
    let level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let stdout_log = tracing_subscriber::fmt::layer().with_filter(level);

    let journald = if args.journald {
        match tracing_journald::layer() {
            Ok(layer) => Some(layer.with_filter(level)),
            Err(e) => {
                eprintln!("journald unavailable: {e}");
                None
            }
        }
    } else {
        None
    };

    let tracy = if args.tracy {
        tracy_client::Client::start();
        Some(tracing_tracy::TracyLayer::default().with_filter(level))
    } else {
        None
    };

    let console = if args.tokio_console {
        Some(console_subscriber::spawn())
    } else {
        None
    };

    let subscriber = tracing_subscriber::registry()
        .with(console)
        .with(stdout_log)
        .with(journald)
        .with(tracy);
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;

    Ok(())
}

/// Plays the host platform: creates the surface, renders frames at the
/// configured rate, applies rotation changes and the optional resize, then
/// tears the surface down.
async fn host_surface(args: Args, tx: kanal::AsyncSender<SurfaceEvent>) -> Result<(), BoxError> {
    let pattern = Pattern::from(args.pattern);
    let (mut width, mut height) = (args.size[0], args.size[1]);

    tx.send(SurfaceEvent::Created(width, height)).await?;

    let mut rotation = args.rotation_at(0);
    tx.send(SurfaceEvent::Orientation(rotation)).await?;

    let mut ticker = interval(Duration::from_secs(1) / args.fps.max(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    for index in 0..args.frames {
        ticker.tick().await;

        if index == args.frames / 2 {
            if let Some(resize) = &args.resize {
                (width, height) = (resize[0], resize[1]);
                tx.send(SurfaceEvent::Resized(width, height)).await?;
            }
        }

        let next = args.rotation_at(index);
        if next != rotation {
            rotation = next;
            tx.send(SurfaceEvent::Orientation(rotation)).await?;
        }

        match TestPattern::new(width, height, pattern) {
            Ok(frame) => tx.send(SurfaceEvent::Frame(frame)).await?,
            Err(e) => warn!("cannot render {}x{} frame: {e}", width, height),
        }
    }

    tx.send(SurfaceEvent::Destroyed).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let args = Args::parse();
    init_tracing(&args)?;
    info!("EdgeFirst Preview Bridge");

    let writer = FrameWriter::new(args.output.as_deref())?;
    let (frame_tx, frame_rx) = kanal::bounded::<PreviewFrame>(args.queue_depth);
    let writer = thread::Builder::new()
        .name("frame-writer".to_string())
        .spawn(move || video::writer_thread(frame_rx, writer))?;

    let mut preview = TexturePreview::new(HostSurface::default());
    preview.set_callback(LifecycleLog);
    preview.set_frame_listener(
        move |data: &[u8], width: i32, height: i32, orientation: i32| {
            let frame = PreviewFrame {
                data: data.to_vec(),
                width,
                height,
                orientation,
            };
            if let Err(e) = frame_tx.send(frame) {
                error!("frame writer send error: {e:?}");
            }
        },
    );

    let (tx, rx) = kanal::bounded_async::<SurfaceEvent>(args.queue_depth);
    let host = tokio::spawn(host_surface(args.clone(), tx));

    let mut skipped = 0u64;
    while let Ok(event) = rx.recv().await {
        match event {
            SurfaceEvent::Created(width, height) => {
                preview.set_buffer_size(width, height);
                if let Err(e) = preview.on_created(width, height) {
                    error!("surface create failed: {e}");
                }
            }
            SurfaceEvent::Resized(width, height) => {
                if let Err(e) = preview.on_resized(width, height) {
                    error!("surface resize failed: {e}");
                }
            }
            SurfaceEvent::Orientation(degrees) => preview.set_display_orientation(degrees),
            SurfaceEvent::Frame(frame) => {
                let _span = info_span!("frame").entered();
                if preview.on_frame_available(&frame).is_err() {
                    skipped += 1;
                }
                if let Some(client) = tracy_client::Client::running() {
                    client.frame_mark();
                }
            }
            SurfaceEvent::Destroyed => {
                preview.on_destroyed();
                break;
            }
        }
    }

    host.await??;

    let rotation = preview.display_orientation();
    let surface = preview.into_surface();
    // Dropping the preview releases the frame listener and closes the
    // writer's queue.
    let stats = writer
        .join()
        .map_err(|_| "frame writer panicked")??;

    let summary = json!({
        "frames": stats.frames,
        "skipped": skipped,
        "bytes": stats.bytes,
        "width": stats.width,
        "height": stats.height,
        "orientation": stats.orientation,
        "rotation": rotation,
        "buffer_size": [surface.buffer_size.0, surface.buffer_size.1],
        "transform": surface.transform.to_matrix(),
        "output": args.output,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
