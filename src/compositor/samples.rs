//! Numeric extraction of composite grids
//!
//! Flattens a composite into point samples for the JSON surface: one
//! entry per valid pixel, positioned at the pixel center. NaN pixels
//! are omitted entirely rather than carried as nulls.

use serde::Serialize;

use crate::raster::RasterGrid;

/// One extracted point sample
///
/// Serializes to the `{latitude, longitude, pm25}` object the dashboard
/// consumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    /// Latitude of the pixel center, rounded to 5 decimal places
    pub latitude: f64,
    /// Longitude of the pixel center, rounded to 5 decimal places
    pub longitude: f64,
    /// Sample value, rounded to 3 decimal places
    pub pm25: f64,
}

/// Extract every valid pixel of a grid as a point sample
///
/// Ordering is row-major, top row first and left-to-right within a row,
/// so repeated calls over the same grid produce identical output.
pub fn extract_samples(grid: &RasterGrid) -> Vec<Sample> {
    let mut samples = Vec::with_capacity(grid.valid_count());
    for row in 0..grid.height() {
        for col in 0..grid.width() {
            let value = grid.get(col, row);
            if value.is_nan() {
                continue;
            }
            let center = grid.layout.transform.pixel_center(col, row);
            samples.push(Sample {
                latitude: round_to(center.y, 5),
                longitude: round_to(center.x, 5),
                pm25: round_to(value as f64, 3),
            });
        }
    }
    samples
}

/// Round to a fixed number of decimal places
fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::GeoTransform;
    use crate::raster::GridLayout;

    fn grid(data: Vec<f32>) -> RasterGrid {
        let layout = GridLayout::new(
            2, 2, GeoTransform::new(100.0, 0.1, 20.0, -0.1), 4326);
        RasterGrid::new(layout, data)
    }

    #[test]
    fn extraction_is_row_major_and_skips_nan() {
        let samples = extract_samples(&grid(vec![1.0, f32::NAN, 3.0, 4.0]));
        assert_eq!(samples.len(), 3);

        // Top-left pixel center, then the second row left-to-right
        assert_eq!(samples[0].longitude, 100.05);
        assert_eq!(samples[0].latitude, 19.95);
        assert_eq!(samples[0].pm25, 1.0);
        assert_eq!(samples[1].longitude, 100.05);
        assert_eq!(samples[1].latitude, 19.85);
        assert_eq!(samples[2].longitude, 100.15);
    }

    #[test]
    fn values_are_rounded() {
        let samples = extract_samples(&grid(vec![
            1.23456789, 2.0, 3.0, 4.0,
        ]));
        assert_eq!(samples[0].pm25, 1.235);
    }

    #[test]
    fn all_nan_grid_yields_no_samples() {
        let samples = extract_samples(&grid(vec![f32::NAN; 4]));
        assert!(samples.is_empty());
    }

    #[test]
    fn samples_serialize_to_the_dashboard_shape() {
        let samples = extract_samples(&grid(vec![1.5, f32::NAN, 3.0, 4.0]));
        let json = serde_json::to_string(&samples[0]).unwrap();
        assert_eq!(json, r#"{"latitude":19.95,"longitude":100.05,"pm25":1.5}"#);

        let json = serde_json::to_string(&samples).unwrap();
        assert!(json.starts_with('['));
        assert_eq!(json.matches("\"pm25\"").count(), 3);
    }

    #[test]
    fn repeated_extraction_is_deterministic() {
        let source = grid(vec![1.0, 2.0, f32::NAN, 4.0]);
        assert_eq!(extract_samples(&source), extract_samples(&source));
    }
}
