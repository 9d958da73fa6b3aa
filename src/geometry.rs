// Points and rectangles in camera-pixel ("content") space.
// Visual: the viewfinder you see between thumb and index finger is a `Rect`
// built here, shrunk inward so the fingertips themselves are not captured.

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two points.
    pub fn distance(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned rectangle; `w` and `h` are never negative.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn center(&self) -> Point {
        center(self)
    }

    pub fn has_area(&self) -> bool {
        self.w > 0.0 && self.h > 0.0
    }

    /// Overlap of two rectangles; zero width/height when they do not meet.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = (self.x + self.w).min(other.x + other.w);
        let bottom = (self.y + self.h).min(other.y + other.h);
        Rect { x, y, w: (right - x).max(0.0), h: (bottom - y).max(0.0) }
    }

    /// True when `p` lies strictly inside the rectangle grown by `tolerance` on every side.
    pub fn contains_with_tolerance(&self, p: Point, tolerance: f32) -> bool {
        p.x > self.x - tolerance
            && p.x < self.x + self.w + tolerance
            && p.y > self.y - tolerance
            && p.y < self.y + self.h + tolerance
    }
}

/// Rectangle spanned by two fingertips, shrunk inward by `margin` on all four sides.
/// Width and height clamp at 0, so a pinch that is too tight yields a zero-area rect.
pub fn rect_from_points(a: Point, b: Point, margin: f32) -> Rect {
    let raw_x = a.x.min(b.x);
    let raw_y = a.y.min(b.y);
    let raw_w = (a.x - b.x).abs();
    let raw_h = (a.y - b.y).abs();

    Rect {
        x: raw_x + margin,
        y: raw_y + margin,
        w: (raw_w - 2.0 * margin).max(0.0),
        h: (raw_h - 2.0 * margin).max(0.0),
    }
}

pub fn center(r: &Rect) -> Point {
    Point::new(r.x + r.w / 2.0, r.y + r.h / 2.0)
}
