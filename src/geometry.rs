//! Axis-aligned, inclusive-coordinate rectangle.
//!
//! Grounded on `compositor/rect.rs`'s `Rect`, but the original expresses a
//! rectangle as `(x, y, width, height)` with an exclusive right/bottom edge.
//! `Rect` here is `(MinX, MinY, MaxX, MaxY)` inclusive on both ends
//! (matching `window.c`/`bitmap.c`'s `Rectangle` throughout), so the
//! arithmetic is adjusted accordingly (`width == MaxX - MinX + 1`).

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Rect {
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Rect { min_x, min_y, max_x, max_y }
    }

    /// Build from an origin and dimensions (`width`/`height` in pixels).
    pub const fn from_origin_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect::new(x, y, x + width - 1, y + height - 1)
    }

    pub const fn width(&self) -> i32 {
        self.max_x - self.min_x + 1
    }

    pub const fn height(&self) -> i32 {
        self.max_y - self.min_y + 1
    }

    pub fn is_empty(&self) -> bool {
        self.max_x < self.min_x || self.max_y < self.min_y
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Intersection of two rects, or `None` if they don't overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let r = Rect::new(
            self.min_x.max(other.min_x),
            self.min_y.max(other.min_y),
            self.max_x.min(other.max_x),
            self.max_y.min(other.max_y),
        );
        if r.is_empty() { None } else { Some(r) }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersect(other).is_some()
    }

    /// Bounding-box union. An empty rect is treated as the identity element.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Rect::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// Translate the rect by `(dx, dy)`.
    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.min_x + dx, self.min_y + dy, self.max_x + dx, self.max_y + dy)
    }

    /// Clip the rect so it fits inside `(0, 0, width-1, height-1)`.
    pub fn clip_to_bounds(&self, width: i32, height: i32) -> Rect {
        match self.intersect(&Rect::new(0, 0, width - 1, height - 1)) {
            Some(r) => r,
            None => Rect::new(0, 0, -1, -1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_origin_size_round_trips_dimensions() {
        let r = Rect::from_origin_size(10, 20, 30, 40);
        assert_eq!(r, Rect::new(10, 20, 39, 59));
        assert_eq!(r.width(), 30);
        assert_eq!(r.height(), 40);
    }

    #[test]
    fn intersect_disjoint_is_none() {
        let a = Rect::from_origin_size(0, 0, 10, 10);
        let b = Rect::from_origin_size(20, 20, 10, 10);
        assert!(a.intersect(&b).is_none());
        assert!(!a.intersects(&b));
    }

    #[test]
    fn intersect_overlapping() {
        let a = Rect::from_origin_size(0, 0, 10, 10);
        let b = Rect::from_origin_size(5, 5, 10, 10);
        let i = a.intersect(&b).unwrap();
        assert_eq!(i, Rect::new(5, 5, 9, 9));
    }

    #[test]
    fn union_grows_bounding_box() {
        let a = Rect::from_origin_size(0, 0, 10, 10);
        let b = Rect::from_origin_size(20, 20, 10, 10);
        let u = a.union(&b);
        assert_eq!(u, Rect::new(0, 0, 29, 29));
    }

    #[test]
    fn clip_to_bounds_truncates() {
        let r = Rect::from_origin_size(-5, -5, 20, 20);
        let clipped = r.clip_to_bounds(10, 10);
        assert_eq!(clipped, Rect::new(0, 0, 9, 9));
    }

    #[test]
    fn overall_rect_invariant_matches_window_shape() {
        // Window invariant: overall_rect == (0,0,width-1,height-1)
        let overall = Rect::from_origin_size(0, 0, 300, 200);
        assert_eq!(overall, Rect::new(0, 0, 299, 199));
    }
}
