// Turns a finished hold into exactly one tile.
// Visual: the moment the progress bar is full, the pixels inside the viewfinder
// freeze into a new tile; keeping the pose still does not stamp out more copies.

use crate::geometry::Rect;
use crate::hover::{HoverReading, HoverTimer};
use crate::tiles::{TileId, TileStore};
use crate::types::FrameBuffer;

/// Anything that can hand back the pixels under a rectangle of the current camera frame.
pub trait PixelSource {
    /// The whole frame, in content space.
    fn bounds(&self) -> Rect;
    fn grab_pixels(&self, rect: Rect) -> FrameBuffer;
}

impl PixelSource for FrameBuffer {
    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }

    fn grab_pixels(&self, rect: Rect) -> FrameBuffer {
        crate::pixels::crop(self, rect)
    }
}

#[derive(Debug, Default)]
pub struct CaptureController;

impl CaptureController {
    pub fn new() -> Self {
        Self
    }

    /// Run after `HoverTimer::update` for the same frame.
    /// Returns the new tile id when this frame produced a capture.
    pub fn step<S: PixelSource + ?Sized>(
        &mut self,
        timer: &mut HoverTimer,
        reading: &HoverReading,
        rect: Option<Rect>,
        source: &S,
        store: &mut TileStore,
    ) -> Option<TileId> {
        if !reading.hovering || reading.elapsed <= timer.total_time() || timer.has_snapped() {
            return None;
        }
        // Only the part of the viewfinder inside the frame becomes the tile.
        let rect = rect?.intersect(&source.bounds());
        // Zero area at the deadline: skip quietly, retry next frame.
        if !rect.has_area() {
            return None;
        }

        let image = source.grab_pixels(rect);
        let id = store.add(image, rect);
        timer.mark_snapped();
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hover::HoverPhase;
    use std::cell::Cell;
    use std::time::{Duration, Instant};

    struct CountingSource {
        grabs: Cell<usize>,
    }

    impl PixelSource for CountingSource {
        fn bounds(&self) -> Rect {
            Rect::new(0.0, 0.0, 640.0, 480.0)
        }

        fn grab_pixels(&self, rect: Rect) -> FrameBuffer {
            self.grabs.set(self.grabs.get() + 1);
            FrameBuffer::filled(rect.w as usize, rect.h as usize, 0x0000FF00)
        }
    }

    fn setup() -> (HoverTimer, CaptureController, TileStore, CountingSource) {
        (
            HoverTimer::new(Duration::from_millis(500), 8.0, 20.0),
            CaptureController::new(),
            TileStore::new(10.0),
            CountingSource { grabs: Cell::new(0) },
        )
    }

    #[test]
    fn fires_once_per_hold() {
        let (mut timer, mut ctl, mut store, src) = setup();
        let rect = Rect::new(100.0, 100.0, 50.0, 50.0);
        let t0 = Instant::now();
        for i in 0..150u64 {
            let now = t0 + Duration::from_millis(i * 16);
            let reading = timer.update(Some(rect), false, now);
            ctl.step(&mut timer, &reading, Some(rect), &src, &mut store);
        }
        assert_eq!(store.len(), 1);
        assert_eq!(src.grabs.get(), 1);
        let tile = &store.tiles()[0];
        assert_eq!((tile.x, tile.y, tile.w, tile.h), (100.0, 100.0, 50.0, 50.0));
        assert_eq!((tile.image.width, tile.image.height), (50, 50));
    }

    #[test]
    fn nothing_before_deadline() {
        let (mut timer, mut ctl, mut store, src) = setup();
        let rect = Rect::new(100.0, 100.0, 50.0, 50.0);
        let t0 = Instant::now();
        timer.update(Some(rect), false, t0);
        timer.update(Some(rect), false, t0 + Duration::from_millis(10));
        // Exactly at the deadline is not "past" it.
        let reading = timer.update(Some(rect), false, t0 + Duration::from_millis(510));
        assert_eq!(ctl.step(&mut timer, &reading, Some(rect), &src, &mut store), None);
        let reading = timer.update(Some(rect), false, t0 + Duration::from_millis(511));
        assert!(ctl.step(&mut timer, &reading, Some(rect), &src, &mut store).is_some());
    }

    #[test]
    fn zero_area_at_deadline_is_skipped_then_retried() {
        let (mut timer, mut ctl, mut store, src) = setup();
        let rect = Rect::new(100.0, 100.0, 50.0, 50.0);
        let t0 = Instant::now();
        timer.update(Some(rect), false, t0);
        timer.update(Some(rect), false, t0 + Duration::from_millis(10));
        let reading = timer.update(Some(rect), false, t0 + Duration::from_millis(600));
        assert!(matches!(timer.state().phase, HoverPhase::Hovering { .. }));

        let flat = Rect::new(100.0, 100.0, 0.0, 50.0);
        assert_eq!(ctl.step(&mut timer, &reading, Some(flat), &src, &mut store), None);
        assert!(!timer.has_snapped());
        assert_eq!(src.grabs.get(), 0);

        assert!(ctl.step(&mut timer, &reading, Some(rect), &src, &mut store).is_some());
        assert!(timer.has_snapped());
    }

    /// Hover until just past the deadline with `rect`, then run one capture step.
    fn capture_once<S: PixelSource>(rect: Rect, src: &S) -> (TileStore, Option<TileId>) {
        let (mut timer, mut ctl, mut store, _) = setup();
        let t0 = Instant::now();
        timer.update(Some(rect), false, t0);
        timer.update(Some(rect), false, t0 + Duration::from_millis(10));
        let reading = timer.update(Some(rect), false, t0 + Duration::from_millis(600));
        let id = ctl.step(&mut timer, &reading, Some(rect), src, &mut store);
        (store, id)
    }

    #[test]
    fn viewfinder_hanging_off_the_frame_is_clipped() {
        let camera = FrameBuffer::filled(640, 480, 0x00336699);
        let (store, id) = capture_once(Rect::new(600.0, 400.0, 100.0, 100.0), &camera);
        assert!(id.is_some());
        let tile = &store.tiles()[0];
        assert_eq!((tile.x, tile.y, tile.w, tile.h), (600.0, 400.0, 40.0, 80.0));
        assert_eq!((tile.image.width, tile.image.height), (40, 80));
    }

    #[test]
    fn huge_viewfinder_captures_at_most_the_frame() {
        let camera = FrameBuffer::filled(640, 480, 1);
        let (store, id) = capture_once(Rect::new(35.0, 35.0, 6.4e6, 4.8e6), &camera);
        assert!(id.is_some());
        let tile = &store.tiles()[0];
        assert_eq!((tile.image.width, tile.image.height), (605, 445));
        assert!(tile.image.pixels.iter().all(|&p| p == 1));
    }

    #[test]
    fn viewfinder_entirely_off_the_frame_is_skipped() {
        let camera = FrameBuffer::filled(640, 480, 1);
        let (store, id) = capture_once(Rect::new(700.0, 10.0, 50.0, 50.0), &camera);
        assert!(id.is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn breaking_the_hold_rearms_capture() {
        let (mut timer, mut ctl, mut store, src) = setup();
        let here = Rect::new(100.0, 100.0, 50.0, 50.0);
        let there = Rect::new(300.0, 100.0, 50.0, 50.0);
        let t0 = Instant::now();
        let mut t = 0u64;
        for rect in [here, there] {
            for _ in 0..60 {
                let reading = timer.update(Some(rect), false, t0 + Duration::from_millis(t));
                ctl.step(&mut timer, &reading, Some(rect), &src, &mut store);
                t += 16;
            }
        }
        assert_eq!(store.len(), 2);
        assert_eq!(store.tiles()[1].x, 300.0);
    }
}
