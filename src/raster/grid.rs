//! In-memory grid model
//!
//! A `RasterGrid` is a single band read into row-major f32 samples, with
//! NaN standing in for "no value". Its `GridLayout` is the pixel layout
//! every other raster in a request must be brought onto before layers
//! can be combined.

use crate::coordinate::{BoundingBox, GeoTransform};

/// Pixel layout of a grid: dimensions, transform and CRS
///
/// The layout of the first successfully opened raster in a request acts
/// as the reference grid for everything that follows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Affine pixel-to-geographic transform
    pub transform: GeoTransform,
    /// EPSG code of the coordinate reference system
    pub epsg: u32,
}

impl GridLayout {
    /// Create a new layout
    pub fn new(width: u32, height: u32, transform: GeoTransform, epsg: u32) -> Self {
        GridLayout { width, height, transform, epsg }
    }

    /// Geographic extent of the grid
    pub fn bounding_box(&self) -> BoundingBox {
        self.transform.bounding_box(self.width, self.height)
    }

    /// Number of pixels in the grid
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether another layout can be aggregated with this one as-is
    pub fn matches(&self, other: &GridLayout, tolerance: f64) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.epsg == other.epsg
            && self.transform.approx_eq(&other.transform, tolerance)
    }
}

/// A single-band grid of f32 samples in row-major order
#[derive(Debug, Clone)]
pub struct RasterGrid {
    /// Pixel layout of this grid
    pub layout: GridLayout,
    /// Samples, top row first, NaN for missing values
    pub data: Vec<f32>,
}

impl RasterGrid {
    /// Create a grid from a layout and its samples
    ///
    /// The sample vector length must equal the layout's pixel count.
    pub fn new(layout: GridLayout, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), layout.pixel_count());
        RasterGrid { layout, data }
    }

    /// Create a grid filled entirely with NaN
    pub fn filled_with_nan(layout: GridLayout) -> Self {
        let data = vec![f32::NAN; layout.pixel_count()];
        RasterGrid { layout, data }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.layout.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.layout.height
    }

    /// Sample at (col, row); NaN when out of bounds
    pub fn get(&self, col: u32, row: u32) -> f32 {
        if col >= self.layout.width || row >= self.layout.height {
            return f32::NAN;
        }
        self.data[row as usize * self.layout.width as usize + col as usize]
    }

    /// Set the sample at (col, row)
    pub fn set(&mut self, col: u32, row: u32, value: f32) {
        if col < self.layout.width && row < self.layout.height {
            self.data[row as usize * self.layout.width as usize + col as usize] = value;
        }
    }

    /// Geographic extent of this grid
    pub fn bounding_box(&self) -> BoundingBox {
        self.layout.bounding_box()
    }

    /// Number of non-NaN samples
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|v| !v.is_nan()).count()
    }

    /// Replace every occurrence of a sentinel value with NaN
    pub fn mask_nodata(&mut self, nodata: f64) {
        for value in &mut self.data {
            if (*value as f64) == nodata || (value.is_nan() && nodata.is_nan()) {
                *value = f32::NAN;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> GridLayout {
        GridLayout::new(4, 3, GeoTransform::new(100.0, 0.5, 20.0, -0.5), 4326)
    }

    #[test]
    fn indexing_is_row_major() {
        let mut grid = RasterGrid::filled_with_nan(layout());
        grid.set(1, 2, 7.5);
        assert_eq!(grid.data[2 * 4 + 1], 7.5);
        assert_eq!(grid.get(1, 2), 7.5);
        assert!(grid.get(4, 0).is_nan());
    }

    #[test]
    fn nodata_masking() {
        let mut grid = RasterGrid::new(layout(), vec![
            1.0, -9999.0, 2.0, -9999.0,
            3.0, 4.0, -9999.0, 5.0,
            -9999.0, 6.0, 7.0, 8.0,
        ]);
        grid.mask_nodata(-9999.0);
        assert_eq!(grid.valid_count(), 8);
        assert!(grid.get(1, 0).is_nan());
        assert_eq!(grid.get(0, 0), 1.0);
    }

    #[test]
    fn layout_matching_tolerates_rounding() {
        let a = layout();
        let mut b = a;
        b.transform.origin_x += 1e-10;
        assert!(a.matches(&b, 1e-6));
        b.width = 5;
        assert!(!a.matches(&b, 1e-6));
    }
}
