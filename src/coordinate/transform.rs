//! Affine grid transforms and coordinate system conversion

use std::f64::consts::PI;

use super::bbox::BoundingBox;
use super::crs::Crs;
use super::point::Point;
use crate::tiff::errors::{TiffError, TiffResult};

/// Affine pixel-to-geographic transform of an axis-aligned grid
///
/// Pixel (0, 0) is the top-left corner of the grid; `pixel_height` is
/// negative because raster rows run north to south.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    /// X coordinate of the top-left corner of pixel (0, 0)
    pub origin_x: f64,
    /// Pixel width in map units
    pub pixel_width: f64,
    /// Y coordinate of the top-left corner of pixel (0, 0)
    pub origin_y: f64,
    /// Pixel height in map units, negative for north-up grids
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Create a new transform
    pub fn new(origin_x: f64, pixel_width: f64, origin_y: f64, pixel_height: f64) -> Self {
        GeoTransform { origin_x, pixel_width, origin_y, pixel_height }
    }

    /// Geographic coordinates of the center of pixel (col, row)
    pub fn pixel_center(&self, col: u32, row: u32) -> Point {
        Point::new(
            self.origin_x + (col as f64 + 0.5) * self.pixel_width,
            self.origin_y + (row as f64 + 0.5) * self.pixel_height,
        )
    }

    /// Fractional pixel-center coordinates of a geographic point
    ///
    /// Returns (col, row) such that an integer value means the point sits
    /// exactly on a pixel center. Used for bilinear interpolation.
    pub fn fractional_pixel(&self, point: &Point) -> (f64, f64) {
        let col = (point.x - self.origin_x) / self.pixel_width - 0.5;
        let row = (point.y - self.origin_y) / self.pixel_height - 0.5;
        (col, row)
    }

    /// Bounding box of a grid with these dimensions
    pub fn bounding_box(&self, width: u32, height: u32) -> BoundingBox {
        let far_x = self.origin_x + width as f64 * self.pixel_width;
        let far_y = self.origin_y + height as f64 * self.pixel_height;
        BoundingBox::new(
            self.origin_x.min(far_x),
            self.origin_y.min(far_y),
            self.origin_x.max(far_x),
            self.origin_y.max(far_y),
        )
    }

    /// Whether two transforms coincide within a tolerance
    pub fn approx_eq(&self, other: &GeoTransform, tolerance: f64) -> bool {
        (self.origin_x - other.origin_x).abs() <= tolerance
            && (self.origin_y - other.origin_y).abs() <= tolerance
            && (self.pixel_width - other.pixel_width).abs() <= tolerance
            && (self.pixel_height - other.pixel_height).abs() <= tolerance
    }
}

/// Transformer for converting between coordinate systems
pub struct CrsTransformer;

impl CrsTransformer {
    /// Earth radius in meters
    const EARTH_RADIUS: f64 = 6378137.0;

    /// Convert from WGS84 (EPSG:4326) to Web Mercator (EPSG:3857)
    pub fn wgs84_to_web_mercator(&self, lon: f64, lat: f64) -> Point {
        // Web Mercator is undefined near the poles; clamp to its
        // usable latitude range.
        let lat = lat.max(-85.05).min(85.05);

        let x = lon * Self::EARTH_RADIUS * PI / 180.0;
        let y = f64::ln(f64::tan((90.0 + lat) * PI / 360.0)) * Self::EARTH_RADIUS;

        Point::new(x, y)
    }

    /// Convert from Web Mercator (EPSG:3857) to WGS84 (EPSG:4326)
    pub fn web_mercator_to_wgs84(&self, x: f64, y: f64) -> Point {
        let lon = x * 180.0 / (Self::EARTH_RADIUS * PI);
        let lat = 180.0 / PI * (2.0 * f64::atan(f64::exp(y / Self::EARTH_RADIUS)) - PI / 2.0);

        Point::new(lon, lat)
    }

    /// Transform a point between coordinate systems
    pub fn transform_point(&self, point: &Point, from: Crs, to: Crs) -> TiffResult<Point> {
        if from == to {
            return Ok(*point);
        }

        match (from, to) {
            (Crs::Wgs84, Crs::WebMercator) => {
                Ok(self.wgs84_to_web_mercator(point.x, point.y))
            }
            (Crs::WebMercator, Crs::Wgs84) => {
                Ok(self.web_mercator_to_wgs84(point.x, point.y))
            }
            _ => Err(TiffError::GenericError(format!(
                "Unsupported coordinate transformation from {} to {}",
                from.description(), to.description()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_center_round_trip() {
        let transform = GeoTransform::new(100.0, 0.1, 20.0, -0.1);
        let center = transform.pixel_center(3, 2);
        assert!((center.x - 100.35).abs() < 1e-9);
        assert!((center.y - 19.75).abs() < 1e-9);

        let (col, row) = transform.fractional_pixel(&center);
        assert!((col - 3.0).abs() < 1e-9);
        assert!((row - 2.0).abs() < 1e-9);
    }

    #[test]
    fn bounding_box_is_normalized() {
        let transform = GeoTransform::new(100.0, 0.5, 20.0, -0.5);
        let bbox = transform.bounding_box(10, 4);
        assert!((bbox.left() - 100.0).abs() < 1e-9);
        assert!((bbox.right() - 105.0).abs() < 1e-9);
        assert!((bbox.top() - 20.0).abs() < 1e-9);
        assert!((bbox.bottom() - 18.0).abs() < 1e-9);
    }

    #[test]
    fn mercator_round_trip() {
        let transformer = CrsTransformer;
        let projected = transformer.wgs84_to_web_mercator(102.5, 17.9);
        let back = transformer.web_mercator_to_wgs84(projected.x, projected.y);
        assert!((back.x - 102.5).abs() < 1e-6);
        assert!((back.y - 17.9).abs() < 1e-6);
    }

    #[test]
    fn unsupported_pair_is_rejected() {
        let transformer = CrsTransformer;
        let result = transformer.transform_point(
            &Point::new(0.0, 0.0), Crs::Other(32648), Crs::Wgs84);
        assert!(result.is_err());
    }
}
