use std::fmt;

/// Fixed-point coordinates are degrees scaled by this factor.
pub const COORD_SCALE: i32 = 10_000_000;

/// A point in fixed-point coordinate space: `x` is longitude, `y` is latitude.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vector2i {
    pub x: i32,
    pub y: i32,
}

impl Vector2i {
    pub const fn new(x: i32, y: i32) -> Self {
        Vector2i { x, y }
    }
}

impl fmt::Display for Vector2i {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", FixedPoint(self.x), FixedPoint(self.y))
    }
}

/// Axis-aligned box in fixed-point space.
///
/// The empty box has `left > right` and `bottom > top`, so it is distinct from
/// a degenerate box around a single point. Including a point into the empty box
/// yields exactly that point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BBox {
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
    pub top: i32,
}

impl BBox {
    pub const fn new(left: i32, bottom: i32, right: i32, top: i32) -> Self {
        BBox { left, bottom, right, top }
    }

    pub const fn empty() -> Self {
        BBox {
            left: i32::MAX,
            bottom: i32::MAX,
            right: i32::MIN,
            top: i32::MIN,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left > self.right || self.bottom > self.top
    }

    pub fn include(&mut self, point: Vector2i) {
        self.left = self.left.min(point.x);
        self.right = self.right.max(point.x);
        self.bottom = self.bottom.min(point.y);
        self.top = self.top.max(point.y);
    }

    pub fn contains(&self, point: Vector2i) -> bool {
        point.x >= self.left
            && point.x <= self.right
            && point.y >= self.bottom
            && point.y <= self.top
    }

    /// Boxes sharing only an edge intersect. An empty box intersects nothing.
    pub fn intersects(&self, other: &BBox) -> bool {
        !(other.left > self.right
            || other.right < self.left
            || other.bottom > self.top
            || other.top < self.bottom)
    }

    /// Midpoint of the box. Meaningless (the origin) for the empty box.
    pub fn center(&self) -> Vector2i {
        let mid = |a: i32, b: i32| ((i64::from(a) + i64::from(b)) / 2) as i32;
        Vector2i::new(mid(self.left, self.right), mid(self.bottom, self.top))
    }
}

impl Default for BBox {
    fn default() -> Self {
        BBox::empty()
    }
}

impl FromIterator<Vector2i> for BBox {
    fn from_iter<T: IntoIterator<Item = Vector2i>>(iter: T) -> Self {
        let mut bbox = BBox::empty();
        for point in iter {
            bbox.include(point);
        }
        bbox
    }
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "empty");
        }
        write!(
            f,
            "{},{},{},{}",
            FixedPoint(self.left),
            FixedPoint(self.bottom),
            FixedPoint(self.right),
            FixedPoint(self.top),
        )
    }
}

/// Formats a fixed-point coordinate back as decimal degrees.
struct FixedPoint(i32);

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = i64::from(self.0).abs();
        let scale = i64::from(COORD_SCALE);
        write!(f, "{sign}{}.{:07}", abs / scale, abs % scale)
    }
}
