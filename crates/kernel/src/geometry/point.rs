use serde::{Deserialize, Serialize};

/// A point in a face-local 2D coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2d {
    pub x: f64,
    pub y: f64,
}

impl Point2d {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: &Self) -> Self {
        Self {
            x: (self.x + other.x) * 0.5,
            y: (self.y + other.y) * 0.5,
        }
    }
}

/// Axis-aligned rectangle in face-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds2d {
    pub min: Point2d,
    pub max: Point2d,
}

impl Bounds2d {
    pub fn new(min: Point2d, max: Point2d) -> Self {
        Self { min, max }
    }

    /// Smallest rectangle containing every point, or `None` for no points.
    pub fn from_points(points: impl IntoIterator<Item = Point2d>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self::new(first, first);
        for p in iter {
            bounds.include(p);
        }
        Some(bounds)
    }

    pub fn include(&mut self, p: Point2d) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point2d {
        self.min.midpoint(&self.max)
    }

    pub fn contains(&self, p: Point2d, tol: f64) -> bool {
        p.x >= self.min.x - tol
            && p.x <= self.max.x + tol
            && p.y >= self.min.y - tol
            && p.y <= self.max.y + tol
    }

    /// Grow every side by `padding / 2`, so width and height grow by `padding`.
    pub fn padded(&self, padding: f64) -> Self {
        let half = padding * 0.5;
        Self {
            min: Point2d::new(self.min.x - half, self.min.y - half),
            max: Point2d::new(self.max.x + half, self.max.y + half),
        }
    }

    /// Corners in counter-clockwise order starting at `min`.
    pub fn corners(&self) -> [Point2d; 4] {
        [
            self.min,
            Point2d::new(self.max.x, self.min.y),
            self.max,
            Point2d::new(self.min.x, self.max.y),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let a = Point2d::new(1.0, 0.0);
        let b = Point2d::new(4.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_bounds_from_points() {
        let bb = Bounds2d::from_points([
            Point2d::new(-1.0, 2.0),
            Point2d::new(3.0, -4.0),
            Point2d::new(0.5, 0.5),
        ])
        .unwrap();
        assert_eq!(bb.min, Point2d::new(-1.0, -4.0));
        assert_eq!(bb.max, Point2d::new(3.0, 2.0));
        assert!((bb.width() - 4.0).abs() < 1e-12);
        assert!((bb.height() - 6.0).abs() < 1e-12);
        assert_eq!(bb.center(), Point2d::new(1.0, -1.0));
    }

    #[test]
    fn test_bounds_from_no_points() {
        assert!(Bounds2d::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_padding_grows_extent() {
        let bb = Bounds2d::new(Point2d::ORIGIN, Point2d::new(2.0, 1.0)).padded(1.0);
        assert!((bb.width() - 3.0).abs() < 1e-12);
        assert!((bb.height() - 2.0).abs() < 1e-12);
        assert_eq!(bb.center(), Point2d::new(1.0, 0.5));
    }

    #[test]
    fn test_contains_with_tolerance() {
        let bb = Bounds2d::new(Point2d::ORIGIN, Point2d::new(1.0, 1.0));
        assert!(bb.contains(Point2d::new(0.5, 0.5), 0.0));
        assert!(!bb.contains(Point2d::new(1.05, 0.5), 0.0));
        assert!(bb.contains(Point2d::new(1.05, 0.5), 0.1));
    }
}
