//! Point structure for coordinate pairs

/// A point in some coordinate system
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// X coordinate (longitude or easting)
    pub x: f64,
    /// Y coordinate (latitude or northing)
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}
