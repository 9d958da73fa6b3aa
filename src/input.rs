// Pointer → content space, plus the press/drag/release protocol for tiles.
// Visual: when the feed is mirrored, the window shows everything flipped left-to-right;
// clicks are flipped back here so the tile under your cursor is the one that moves.

use crate::geometry::Point;
use crate::tiles::{TileId, TileStore};

/// Whether the core used a pointer event. `NotConsumed` lets the host hand it to other UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Propagation {
    Consumed,
    NotConsumed,
}

/// Raw pointer/touch event in display (window) pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Start { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    End { x: f32, y: f32 },
}

/// An active drag. The offset is fixed at grab time so the tile keeps its grip point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragSession {
    pub tile: TileId,
    pub offset_x: f32,
    pub offset_y: f32,
}

/// The single place the mirror flip happens.
pub fn to_content_space(pointer_x: f32, pointer_y: f32, canvas_width: f32, mirrored: bool) -> Point {
    if mirrored {
        Point::new(canvas_width - pointer_x, pointer_y)
    } else {
        Point::new(pointer_x, pointer_y)
    }
}

#[derive(Debug)]
pub struct InputMapper {
    canvas_width: f32,
    mirrored: bool,
    session: Option<DragSession>,
}

impl InputMapper {
    pub fn new(canvas_width: f32, mirrored: bool) -> Self {
        Self { canvas_width, mirrored, session: None }
    }

    pub fn set_mirrored(&mut self, mirrored: bool) {
        self.mirrored = mirrored;
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn dragged_tile(&self) -> Option<TileId> {
        self.session().map(|s| s.tile)
    }

    fn map(&self, x: f32, y: f32) -> Point {
        to_content_space(x, y, self.canvas_width, self.mirrored)
    }

    pub fn handle(&mut self, event: PointerEvent, store: &mut TileStore) -> Propagation {
        match event {
            PointerEvent::Start { x, y } => self.start(x, y, store),
            PointerEvent::Move { x, y } => self.drag(x, y, store),
            PointerEvent::End { .. } => self.end(),
        }
    }

    /// Press: grab the topmost tile under the pointer, if any.
    pub fn start(&mut self, x: f32, y: f32, store: &mut TileStore) -> Propagation {
        let p = self.map(x, y);
        let Some((id, origin)) = store.hit_test(p).map(|t| (t.id, t.origin())) else {
            return Propagation::NotConsumed;
        };

        store.raise_to_top(id);
        self.session = Some(DragSession {
            tile: id,
            offset_x: p.x - origin.x,
            offset_y: p.y - origin.y,
        });
        tracing::debug!(?id, x = p.x, y = p.y, "drag start");
        Propagation::Consumed
    }

    /// Motion: drag the grabbed tile; no-op without a session.
    pub fn drag(&mut self, x: f32, y: f32, store: &mut TileStore) -> Propagation {
        let Some(session) = self.session else {
            return Propagation::NotConsumed;
        };
        let p = self.map(x, y);
        if store.move_to(session.tile, p.x - session.offset_x, p.y - session.offset_y) {
            Propagation::Consumed
        } else {
            // Tile vanished under us (store cleared).
            self.session = None;
            Propagation::NotConsumed
        }
    }

    /// Release: always ends the drag, never claims the event.
    pub fn end(&mut self) -> Propagation {
        if let Some(session) = self.session.take() {
            tracing::debug!(id = ?session.tile, "drag end");
        }
        Propagation::NotConsumed
    }

    /// Forget the drag without touching the store (used when the store is cleared).
    pub fn cancel(&mut self) {
        self.session = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::types::FrameBuffer;

    const W: f32 = 640.0;

    fn store_with(rects: &[Rect]) -> (TileStore, Vec<TileId>) {
        let mut store = TileStore::new(10.0);
        let ids = rects
            .iter()
            .map(|r| store.add(FrameBuffer::filled(1, 1, 0), *r))
            .collect();
        (store, ids)
    }

    #[test]
    fn mirror_flips_x_only() {
        assert_eq!(to_content_space(100.0, 40.0, W, true), Point::new(540.0, 40.0));
        assert_eq!(to_content_space(100.0, 40.0, W, false), Point::new(100.0, 40.0));
    }

    #[test]
    fn press_in_place_keeps_tile_still_when_mirrored() {
        let (mut store, ids) = store_with(&[Rect::new(400.0, 100.0, 80.0, 60.0)]);
        let mut input = InputMapper::new(W, true);

        // Display x 200 maps to content x 440, inside the tile.
        assert_eq!(input.start(200.0, 130.0, &mut store), Propagation::Consumed);
        let s = input.session().copied().unwrap();
        assert_eq!((s.offset_x, s.offset_y), (40.0, 30.0));

        assert_eq!(input.drag(200.0, 130.0, &mut store), Propagation::Consumed);
        let t = store.get(ids[0]).unwrap();
        assert_eq!((t.x, t.y), (400.0, 100.0));
    }

    #[test]
    fn mirrored_drag_moves_opposite_to_display_motion() {
        let (mut store, ids) = store_with(&[Rect::new(400.0, 100.0, 80.0, 60.0)]);
        let mut input = InputMapper::new(W, true);
        input.start(200.0, 130.0, &mut store);
        input.drag(150.0, 150.0, &mut store);
        let t = store.get(ids[0]).unwrap();
        assert_eq!((t.x, t.y), (450.0, 120.0));
    }

    #[test]
    fn start_raises_grabbed_tile() {
        let (mut store, ids) = store_with(&[
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Rect::new(200.0, 0.0, 100.0, 100.0),
        ]);
        let mut input = InputMapper::new(W, false);
        input.start(50.0, 50.0, &mut store);
        assert_eq!(store.tiles().last().map(|t| t.id), Some(ids[0]));
        assert_eq!(input.dragged_tile(), Some(ids[0]));
    }

    #[test]
    fn miss_is_not_consumed_and_changes_nothing() {
        let (mut store, ids) = store_with(&[
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Rect::new(200.0, 0.0, 100.0, 100.0),
        ]);
        let mut input = InputMapper::new(W, false);
        assert_eq!(input.start(500.0, 400.0, &mut store), Propagation::NotConsumed);
        assert!(!input.is_dragging());
        let order: Vec<_> = store.tiles().iter().map(|t| (t.id, t.x, t.y)).collect();
        assert_eq!(order, vec![(ids[0], 0.0, 0.0), (ids[1], 200.0, 0.0)]);
        assert_eq!(input.drag(10.0, 10.0, &mut store), Propagation::NotConsumed);
    }

    #[test]
    fn end_is_idempotent() {
        let (mut store, _) = store_with(&[Rect::new(0.0, 0.0, 100.0, 100.0)]);
        let mut input = InputMapper::new(W, false);
        assert_eq!(input.end(), Propagation::NotConsumed);
        input.start(10.0, 10.0, &mut store);
        assert_eq!(input.end(), Propagation::NotConsumed);
        assert_eq!(input.end(), Propagation::NotConsumed);
        assert!(!input.is_dragging());
    }

    #[test]
    fn move_after_clear_is_a_noop() {
        let (mut store, _) = store_with(&[Rect::new(0.0, 0.0, 100.0, 100.0)]);
        let mut input = InputMapper::new(W, false);
        input.start(10.0, 10.0, &mut store);
        store.clear();
        assert_eq!(input.drag(300.0, 300.0, &mut store), Propagation::NotConsumed);
        assert!(!input.is_dragging());
        assert!(store.is_empty());
    }

    #[test]
    fn handle_dispatches_in_order() {
        let (mut store, ids) = store_with(&[Rect::new(0.0, 0.0, 100.0, 100.0)]);
        let mut input = InputMapper::new(W, false);
        let events = [
            PointerEvent::Start { x: 10.0, y: 10.0 },
            PointerEvent::Move { x: 30.0, y: 50.0 },
            PointerEvent::End { x: 30.0, y: 50.0 },
            PointerEvent::Move { x: 90.0, y: 90.0 },
        ];
        let results: Vec<_> = events.iter().map(|e| input.handle(*e, &mut store)).collect();
        assert_eq!(
            results,
            vec![
                Propagation::Consumed,
                Propagation::Consumed,
                Propagation::NotConsumed,
                Propagation::NotConsumed
            ]
        );
        let t = store.get(ids[0]).unwrap();
        assert_eq!((t.x, t.y), (20.0, 40.0));
    }
}
