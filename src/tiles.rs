// Captured photos ("tiles") and their stacking order.
// Visual: tiles are painted first-to-last, so the last tile in the store sits on top
// and is also the one a click lands on when tiles overlap.

use crate::geometry::{Point, Rect};
use crate::types::FrameBuffer;

/// Stable handle to a tile; survives re-ordering, dies with `clear()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(u64);

#[derive(Clone, Debug)]
pub struct Tile {
    pub id: TileId,
    pub image: FrameBuffer,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Tile {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug)]
pub struct TileStore {
    tiles: Vec<Tile>, // paint order; last = topmost
    next_id: u64,
    hit_tolerance: f32,
}

impl TileStore {
    pub fn new(hit_tolerance: f32) -> Self {
        Self { tiles: Vec::new(), next_id: 0, hit_tolerance }
    }

    /// Append a new tile on top of everything else.
    pub fn add(&mut self, image: FrameBuffer, rect: Rect) -> TileId {
        let id = TileId(self.next_id);
        self.next_id += 1;
        self.tiles.push(Tile { id, image, x: rect.x, y: rect.y, w: rect.w, h: rect.h });
        id
    }

    /// Drop every tile. Ids handed out before stay dead: no later tile reuses them.
    pub fn clear(&mut self) {
        self.tiles.clear();
    }

    /// Topmost tile whose bounds, grown by the hit tolerance, contain `p`.
    pub fn hit_test(&self, p: Point) -> Option<&Tile> {
        self.tiles
            .iter()
            .rev()
            .find(|t| t.bounds().contains_with_tolerance(p, self.hit_tolerance))
    }

    /// Move the tile to the end of the paint order. Returns false for unknown ids.
    pub fn raise_to_top(&mut self, id: TileId) -> bool {
        match self.index_of(id) {
            Some(i) => {
                let tile = self.tiles.remove(i);
                self.tiles.push(tile);
                true
            }
            None => false,
        }
    }

    /// Reposition in place; z-order is untouched.
    pub fn move_to(&mut self, id: TileId, x: f32, y: f32) -> bool {
        match self.tiles.iter_mut().find(|t| t.id == id) {
            Some(tile) => {
                tile.x = x;
                tile.y = y;
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.id == id)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    fn index_of(&self, id: TileId) -> Option<usize> {
        self.tiles.iter().position(|t| t.id == id)
    }
}
