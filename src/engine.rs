// The collage core: one owner for hover state, tiles and the drag in progress.
// Each frame the host calls `tick` with the latest hands and the pointer events that
// arrived since the previous frame, then draws whatever `RenderState` says.

use crate::capture::{CaptureController, PixelSource};
use crate::detector::{GestureSample, Hand};
use crate::geometry::{Rect, rect_from_points};
use crate::hover::{HoverState, HoverTimer};
use crate::input::{InputMapper, PointerEvent, Propagation};
use crate::tiles::{Tile, TileId, TileStore};
use std::time::{Duration, Instant};
use tracing::debug;

/// Tunables for the gesture and drag behaviour.
#[derive(Clone, Debug, PartialEq)]
pub struct CollageSettings {
    /// How long the pinch must hold still before a capture.
    pub total_time: Duration,
    /// Inward shrink per side so the fingertips stay out of the photo (px).
    pub margin: f32,
    /// Max centre movement between frames that still counts as "still" (px, exclusive).
    pub stability_threshold: f32,
    /// Width and height must both exceed this to start a hold (px).
    pub min_capture_size: f32,
    /// Extra grab border around each tile (px).
    pub hit_test_tolerance: f32,
    /// Feed and pointer are flipped left-to-right.
    pub mirrored: bool,
}

impl Default for CollageSettings {
    fn default() -> Self {
        Self {
            total_time: Duration::from_millis(500),
            margin: 35.0,
            stability_threshold: 8.0,
            min_capture_size: 20.0,
            hit_test_tolerance: 10.0,
            mirrored: true,
        }
    }
}

/// The viewfinder as it should be drawn this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureView {
    pub rect: Rect,
    pub hovering: bool,
    pub progress: f32,
}

/// Everything the renderer needs for one frame.
#[derive(Debug)]
pub struct RenderState<'a> {
    pub gesture: Option<GestureView>,
    pub tiles: &'a [Tile],
    pub dragged: Option<TileId>,
    /// Tile captured on this very frame, if any.
    pub captured: Option<TileId>,
    /// One entry per pointer event passed to `tick`, same order.
    pub input: Vec<Propagation>,
}

pub struct CollageEngine {
    settings: CollageSettings,
    hover: HoverTimer,
    capture: CaptureController,
    tiles: TileStore,
    input: InputMapper,
}

impl CollageEngine {
    pub fn new(settings: CollageSettings, canvas_width: f32) -> Self {
        Self {
            hover: HoverTimer::new(
                settings.total_time,
                settings.stability_threshold,
                settings.min_capture_size,
            ),
            capture: CaptureController::new(),
            tiles: TileStore::new(settings.hit_test_tolerance),
            input: InputMapper::new(canvas_width, settings.mirrored),
            settings,
        }
    }

    pub fn tiles(&self) -> &[Tile] {
        self.tiles.tiles()
    }

    pub fn hover_state(&self) -> &HoverState {
        self.hover.state()
    }

    pub fn dragged_tile(&self) -> Option<TileId> {
        self.input.dragged_tile()
    }

    pub fn mirrored(&self) -> bool {
        self.settings.mirrored
    }

    pub fn set_mirrored(&mut self, mirrored: bool) {
        self.settings.mirrored = mirrored;
        self.input.set_mirrored(mirrored);
    }

    /// Remove every tile and drop any drag in progress.
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.input.cancel();
        debug!("tiles cleared");
    }

    /// Apply one pointer event right away (outside of `tick`).
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Propagation {
        self.input.handle(event, &mut self.tiles)
    }

    /// One frame: pointer events first (in arrival order), then the gesture pipeline.
    /// Only the first hand is used.
    pub fn tick<S: PixelSource + ?Sized>(
        &mut self,
        now: Instant,
        hands: &[Hand],
        events: &[PointerEvent],
        source: &S,
    ) -> RenderState<'_> {
        let input = events.iter().map(|e| self.handle_pointer(*e)).collect();

        let rect = hands
            .first()
            .and_then(GestureSample::from_hand)
            .map(|s| rect_from_points(s.thumb_tip, s.index_tip, self.settings.margin));

        let reading = self.hover.update(rect, self.input.is_dragging(), now);
        let captured = self
            .capture
            .step(&mut self.hover, &reading, rect, source, &mut self.tiles);
        if let (Some(id), Some(r)) = (captured, rect) {
            debug!(?id, x = r.x, y = r.y, w = r.w, h = r.h, "captured tile");
        }

        RenderState {
            gesture: rect.map(|rect| GestureView {
                rect,
                hovering: reading.hovering,
                progress: reading.progress,
            }),
            tiles: self.tiles.tiles(),
            dragged: self.dragged_tile(),
            captured,
            input,
        }
    }
}
