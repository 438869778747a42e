//! Bounding box structure for grid extents

use super::point::Point;

/// The geographic rectangle covered by a grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum X coordinate
    pub min_x: f64,
    /// Minimum Y coordinate
    pub min_y: f64,
    /// Maximum X coordinate
    pub max_x: f64,
    /// Maximum Y coordinate
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox { min_x, min_y, max_x, max_y }
    }

    /// Western edge
    pub fn left(&self) -> f64 {
        self.min_x
    }

    /// Eastern edge
    pub fn right(&self) -> f64 {
        self.max_x
    }

    /// Northern edge
    pub fn top(&self) -> f64 {
        self.max_y
    }

    /// Southern edge
    pub fn bottom(&self) -> f64 {
        self.min_y
    }

    /// Width of the bounding box
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Center point of the bounding box
    pub fn center(&self) -> Point {
        Point::new(
            self.min_x + self.width() / 2.0,
            self.min_y + self.height() / 2.0,
        )
    }

    /// Check if this bounding box contains a point
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.min_x && point.x <= self.max_x &&
            point.y >= self.min_y && point.y <= self.max_y
    }

    /// Whether two boxes coincide within a tolerance
    pub fn approx_eq(&self, other: &BoundingBox, tolerance: f64) -> bool {
        (self.min_x - other.min_x).abs() <= tolerance
            && (self.min_y - other.min_y).abs() <= tolerance
            && (self.max_x - other.max_x).abs() <= tolerance
            && (self.max_y - other.max_y).abs() <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_and_extent() {
        let bbox = BoundingBox::new(100.0, 10.0, 110.0, 25.0);
        assert_eq!(bbox.left(), 100.0);
        assert_eq!(bbox.right(), 110.0);
        assert_eq!(bbox.top(), 25.0);
        assert_eq!(bbox.bottom(), 10.0);
        assert_eq!(bbox.width(), 10.0);
        assert_eq!(bbox.height(), 15.0);
    }

    #[test]
    fn containment() {
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        assert!(bbox.contains(&Point::new(0.5, 0.5)));
        assert!(!bbox.contains(&Point::new(1.5, 0.5)));
    }
}
