// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use edgefirst_preview::{
    image::yv12_size,
    pattern::{Pattern, TestPattern, RED, WHITE},
    preview::{
        Bitmap, NullSurface, PreviewBufferState, PreviewCallback, PreviewSurface,
        SharedPreview, SurfaceEventHandler, TexturePreview, ORIENTATION_UP,
    },
    transform::{compute, AffineTransform},
    PreviewError,
};
use std::{
    error::Error,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    thread,
};

#[derive(Default)]
struct RecordingSurface {
    transforms: Vec<AffineTransform>,
    buffer_sizes: Vec<(i32, i32)>,
}

impl PreviewSurface for RecordingSurface {
    fn set_transform(&mut self, transform: &AffineTransform) {
        self.transforms.push(*transform);
    }

    fn set_default_buffer_size(&mut self, width: i32, height: i32) {
        self.buffer_sizes.push((width, height));
    }
}

#[derive(Clone, Default)]
struct LifecycleCounter {
    changed: Arc<AtomicUsize>,
    destroyed: Arc<AtomicUsize>,
}

impl PreviewCallback for LifecycleCounter {
    fn on_surface_changed(&mut self) {
        self.changed.fetch_add(1, Ordering::SeqCst);
    }

    fn on_surface_destroyed(&mut self) {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}

type Frames = Arc<Mutex<Vec<(Vec<u8>, i32, i32, i32)>>>;

fn recording_preview() -> (TexturePreview<RecordingSurface>, Frames) {
    let frames = Frames::default();
    let mut preview = TexturePreview::new(RecordingSurface::default());
    let sink = frames.clone();
    preview.set_frame_listener(move |data: &[u8], width: i32, height: i32, orientation: i32| {
        sink.lock()
            .unwrap()
            .push((data.to_vec(), width, height, orientation));
    });
    (preview, frames)
}

#[test]
fn test_lifecycle() -> Result<(), Box<dyn Error>> {
    let counter = LifecycleCounter::default();
    let (mut preview, _) = recording_preview();
    preview.set_callback(counter.clone());

    assert!(!preview.is_ready());
    assert!(!preview.buffers().is_allocated());

    preview.on_created(4, 2)?;
    assert!(preview.is_ready());
    assert_eq!((preview.width(), preview.height()), (4, 2));
    assert_eq!(preview.buffers().argb().len(), 8);
    assert_eq!(preview.buffers().yuv().len(), 12);
    assert_eq!(preview.surface().transforms, vec![AffineTransform::IDENTITY]);
    assert_eq!(counter.changed.load(Ordering::SeqCst), 1);

    preview.on_resized(6, 4)?;
    assert_eq!((preview.width(), preview.height()), (6, 4));
    assert_eq!(preview.buffers().yuv().len(), yv12_size(6, 4));
    assert_eq!(counter.changed.load(Ordering::SeqCst), 2);

    assert!(preview.on_destroyed());
    assert!(!preview.is_ready());
    assert_eq!((preview.width(), preview.height()), (0, 0));
    assert!(!preview.buffers().is_allocated());
    assert_eq!(counter.destroyed.load(Ordering::SeqCst), 1);

    Ok(())
}

#[test]
fn test_frame_delivery() -> Result<(), Box<dyn Error>> {
    let (mut preview, frames) = recording_preview();
    preview.on_created(2, 2)?;

    let bitmap = Bitmap::new(2, 2, vec![RED; 4])?;
    preview.on_frame_available(&bitmap)?;

    let frames = frames.lock().unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(
        frames[0],
        (vec![82, 82, 82, 82, 240, 90], 2, 2, ORIENTATION_UP)
    );
    Ok(())
}

#[test]
fn test_orientation_tag_is_constant() -> Result<(), Box<dyn Error>> {
    let (mut preview, frames) = recording_preview();
    preview.on_created(4, 4)?;
    let frame = TestPattern::new(4, 4, Pattern::ColorBars)?;

    for rotation in [0, 90, 180, 270] {
        preview.set_display_orientation(rotation);
        preview.on_frame_available(&frame)?;
    }

    let frames = frames.lock().unwrap();
    assert_eq!(frames.len(), 4);
    assert!(frames.iter().all(|f| f.3 == 90));
    // Rotation only affects the surface transform, never the frame data.
    assert!(frames.iter().all(|f| f.0 == frames[0].0));
    Ok(())
}

#[test]
fn test_transform_updates() -> Result<(), Box<dyn Error>> {
    let (mut preview, _) = recording_preview();

    // Orientation set before the surface exists is applied on creation.
    preview.set_display_orientation(90);
    assert!(preview.transform().is_identity());

    preview.on_created(640, 480)?;
    assert_eq!(preview.transform(), compute(90, 640, 480));

    preview.set_display_orientation(180);
    assert_eq!(preview.transform(), compute(180, 640, 480));

    preview.on_resized(480, 640)?;
    assert_eq!(preview.transform(), compute(180, 480, 640));

    preview.set_display_orientation(45);
    assert!(preview.transform().is_identity());
    assert_eq!(preview.display_orientation(), 45);

    let transforms = &preview.surface().transforms;
    assert_eq!(transforms.len(), 5);
    assert_eq!(transforms.last(), Some(&AffineTransform::IDENTITY));
    Ok(())
}

#[test]
fn test_frame_without_surface() -> Result<(), Box<dyn Error>> {
    let (mut preview, frames) = recording_preview();
    let frame = TestPattern::new(2, 2, Pattern::Solid(WHITE))?;

    assert_eq!(
        preview.on_frame_available(&frame),
        Err(PreviewError::NotReady)
    );

    preview.on_created(2, 2)?;
    preview.on_destroyed();
    assert_eq!(
        preview.on_frame_available(&frame),
        Err(PreviewError::NotReady)
    );
    assert!(frames.lock().unwrap().is_empty());
    Ok(())
}

#[test]
fn test_mismatched_frame_skipped() -> Result<(), Box<dyn Error>> {
    let (mut preview, frames) = recording_preview();
    preview.on_created(4, 2)?;

    let wrong = TestPattern::new(2, 2, Pattern::Solid(WHITE))?;
    assert!(matches!(
        preview.on_frame_available(&wrong),
        Err(PreviewError::BufferSizeMismatch { .. })
    ));
    assert!(frames.lock().unwrap().is_empty());
    assert!(preview.is_ready());

    let right = TestPattern::new(4, 2, Pattern::Solid(WHITE))?;
    preview.on_frame_available(&right)?;
    assert_eq!(frames.lock().unwrap().len(), 1);
    Ok(())
}

#[test]
fn test_invalid_geometry_keeps_buffers() -> Result<(), Box<dyn Error>> {
    let (mut preview, _) = recording_preview();
    preview.on_created(6, 4)?;

    assert_eq!(
        preview.on_resized(0, 4),
        Err(PreviewError::InvalidGeometry {
            width: 0,
            height: 4
        })
    );
    assert_eq!((preview.width(), preview.height()), (6, 4));
    assert_eq!(preview.buffers().yuv().len(), yv12_size(6, 4));

    let (mut fresh, _) = recording_preview();
    assert!(fresh.on_created(-1, 10).is_err());
    assert!(!fresh.is_ready());
    assert!(fresh.surface().transforms.is_empty());
    Ok(())
}

#[test]
fn test_buffers_reused() -> Result<(), Box<dyn Error>> {
    let (mut preview, _) = recording_preview();
    preview.on_created(8, 8)?;
    let frame = TestPattern::new(8, 8, Pattern::ColorBars)?;

    let yuv = preview.buffers().yuv().as_ptr();
    let argb = preview.buffers().argb().as_ptr();
    for _ in 0..3 {
        preview.on_frame_available(&frame)?;
    }
    assert_eq!(preview.buffers().yuv().as_ptr(), yuv);
    assert_eq!(preview.buffers().argb().as_ptr(), argb);
    Ok(())
}

#[test]
fn test_clear_listener() -> Result<(), Box<dyn Error>> {
    let (mut preview, frames) = recording_preview();
    preview.on_created(2, 2)?;
    preview.clear_frame_listener();
    preview.on_frame_available(&Bitmap::new(2, 2, vec![RED; 4])?)?;
    assert!(frames.lock().unwrap().is_empty());
    assert_eq!(preview.buffers().yuv(), &[82, 82, 82, 82, 240, 90]);
    Ok(())
}

#[test]
fn test_buffer_size_forwarded() {
    let (mut preview, _) = recording_preview();
    preview.set_buffer_size(1920, 1080);
    assert_eq!(preview.surface().buffer_sizes, vec![(1920, 1080)]);
}

#[test]
fn test_buffer_state() -> Result<(), Box<dyn Error>> {
    let mut state = PreviewBufferState::new();
    let frame = TestPattern::new(3, 3, Pattern::Solid(RED))?;
    assert_eq!(state.convert(&frame), Err(PreviewError::NotReady));

    state.allocate(3, 3)?;
    assert_eq!((state.width(), state.height()), (3, 3));
    let yuv = state.convert(&frame)?;
    assert_eq!(yuv.len(), 9 + 2 * 4);
    assert!(yuv[..9].iter().all(|&y| y == 82));

    assert!(state.allocate(3, 0).is_err());
    assert_eq!(state.yuv().len(), 17);

    state.release();
    assert!(!state.is_allocated());
    Ok(())
}

#[test]
fn test_bitmap_mismatch() {
    assert_eq!(
        Bitmap::new(2, 2, vec![RED; 3]),
        Err(PreviewError::BufferSizeMismatch {
            expected: 4,
            actual: 3
        })
    );
}

#[test]
fn test_shared_preview() -> Result<(), Box<dyn Error>> {
    let delivered = Arc::new(AtomicUsize::new(0));
    let mut preview = TexturePreview::new(NullSurface);
    let count = delivered.clone();
    preview.set_frame_listener(move |data: &[u8], _: i32, _: i32, _: i32| {
        assert_eq!(data.len(), yv12_size(16, 16));
        count.fetch_add(1, Ordering::SeqCst);
    });

    let mut shared: SharedPreview<NullSurface> = Arc::new(Mutex::new(preview));
    shared.on_created(16, 16)?;

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let mut handle = shared.clone();
            thread::spawn(move || -> Result<(), PreviewError> {
                let frame = TestPattern::new(16, 16, Pattern::ColorBars)?;
                for _ in 0..10 {
                    handle.on_frame_available(&frame)?;
                }
                Ok(())
            })
        })
        .collect();

    for worker in workers {
        worker.join().map_err(|_| "worker panicked")??;
    }

    assert_eq!(delivered.load(Ordering::SeqCst), 40);
    assert!(shared.on_destroyed());
    Ok(())
}
