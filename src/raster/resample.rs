//! Bilinear resampling onto a reference layout
//!
//! Every layer in a multi-file composite must share the reference grid
//! before aggregation. A non-conforming grid is resampled here: for each
//! reference pixel center, the source location is found through the two
//! transforms (converting between coordinate systems when they differ)
//! and interpolated from the four surrounding source pixels.
//!
//! Missing neighbors (NaN or outside the source) are dropped and the
//! remaining weights renormalized; a pixel with no usable neighbor at
//! all stays NaN.

use log::debug;

use crate::coordinate::{Crs, CrsTransformer};
use crate::tiff::errors::TiffResult;

use super::grid::{GridLayout, RasterGrid};

/// Resamples a grid onto the given reference layout
///
/// Returns the source unchanged (cloned data, reference layout) when the
/// layouts already match within tolerance.
pub fn resample_to_layout(source: &RasterGrid, reference: &GridLayout) -> TiffResult<RasterGrid> {
    if source.layout.matches(reference, 1e-9) {
        return Ok(RasterGrid::new(*reference, source.data.clone()));
    }

    debug!("Resampling {}x{} (epsg {}) onto {}x{} (epsg {})",
           source.width(), source.height(), source.layout.epsg,
           reference.width, reference.height, reference.epsg);

    let source_crs = Crs::from_epsg(source.layout.epsg);
    let reference_crs = Crs::from_epsg(reference.epsg);
    let transformer = CrsTransformer;

    let mut output = RasterGrid::filled_with_nan(*reference);
    for row in 0..reference.height {
        for col in 0..reference.width {
            let mut point = reference.transform.pixel_center(col, row);
            if source_crs != reference_crs {
                point = transformer.transform_point(&point, reference_crs, source_crs)?;
            }
            let (fc, fr) = source.layout.transform.fractional_pixel(&point);
            output.set(col, row, bilinear(source, fc, fr));
        }
    }
    Ok(output)
}

/// Bilinear interpolation at fractional pixel-center coordinates
fn bilinear(source: &RasterGrid, fc: f64, fr: f64) -> f32 {
    let c0 = fc.floor();
    let r0 = fr.floor();
    let dx = fc - c0;
    let dy = fr - r0;

    let neighbors = [
        (c0, r0, (1.0 - dx) * (1.0 - dy)),
        (c0 + 1.0, r0, dx * (1.0 - dy)),
        (c0, r0 + 1.0, (1.0 - dx) * dy),
        (c0 + 1.0, r0 + 1.0, dx * dy),
    ];

    let mut accumulated = 0.0f64;
    let mut weight_sum = 0.0f64;
    for (col, row, weight) in neighbors {
        if weight == 0.0 || col < 0.0 || row < 0.0 {
            continue;
        }
        let value = source.get(col as u32, row as u32);
        if value.is_nan() {
            continue;
        }
        accumulated += weight * value as f64;
        weight_sum += weight;
    }

    if weight_sum > 0.0 {
        (accumulated / weight_sum) as f32
    } else {
        f32::NAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::GeoTransform;

    fn grid(width: u32, height: u32, origin_x: f64, origin_y: f64,
            pixel: f64, data: Vec<f32>) -> RasterGrid {
        let layout = GridLayout::new(
            width, height, GeoTransform::new(origin_x, pixel, origin_y, -pixel), 4326);
        RasterGrid::new(layout, data)
    }

    #[test]
    fn matching_layout_passes_through() {
        let source = grid(2, 2, 0.0, 2.0, 1.0, vec![1.0, 2.0, 3.0, 4.0]);
        let result = resample_to_layout(&source, &source.layout).unwrap();
        assert_eq!(result.data, source.data);
    }

    #[test]
    fn constant_field_survives_resampling() {
        let source = grid(4, 4, 0.0, 4.0, 1.0, vec![5.0; 16]);
        let reference = GridLayout::new(
            8, 8, GeoTransform::new(0.0, 0.5, 4.0, -0.5), 4326);
        let result = resample_to_layout(&source, &reference).unwrap();
        for value in &result.data {
            assert!((value - 5.0).abs() < 1e-6);
        }
    }

    #[test]
    fn interpolates_between_pixel_centers() {
        // Two pixels, values 0 and 10; sampling exactly between the
        // centers must give the midpoint.
        let source = grid(2, 1, 0.0, 1.0, 1.0, vec![0.0, 10.0]);
        let reference = GridLayout::new(
            1, 1, GeoTransform::new(0.5, 1.0, 1.0, -1.0), 4326);
        let result = resample_to_layout(&source, &reference).unwrap();
        assert!((result.get(0, 0) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn nan_neighbors_are_renormalized_away() {
        let source = grid(2, 1, 0.0, 1.0, 1.0, vec![f32::NAN, 10.0]);
        let reference = GridLayout::new(
            1, 1, GeoTransform::new(0.5, 1.0, 1.0, -1.0), 4326);
        let result = resample_to_layout(&source, &reference).unwrap();
        assert!((result.get(0, 0) - 10.0).abs() < 1e-6);
    }

    #[test]
    fn all_nan_stays_nan() {
        let source = grid(2, 2, 0.0, 2.0, 1.0, vec![f32::NAN; 4]);
        let reference = GridLayout::new(
            2, 2, GeoTransform::new(0.25, 1.0, 2.25, -1.0), 4326);
        let result = resample_to_layout(&source, &reference).unwrap();
        assert!(result.data.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn cross_crs_resampling_is_supported() {
        // Same geographic area expressed in Web Mercator; a constant
        // field must stay constant through the CRS conversion.
        let source = grid(4, 4, 0.0, 4.0, 1.0, vec![3.0; 16]);
        let transformer = crate::coordinate::CrsTransformer;
        let top_left = transformer.wgs84_to_web_mercator(0.5, 3.5);
        let bottom_right = transformer.wgs84_to_web_mercator(3.5, 0.5);
        let pixel_w = (bottom_right.x - top_left.x) / 4.0;
        let pixel_h = (top_left.y - bottom_right.y) / 4.0;
        let reference = GridLayout::new(
            4, 4, GeoTransform::new(top_left.x, pixel_w, top_left.y, -pixel_h), 3857);

        let result = resample_to_layout(&source, &reference).unwrap();
        assert!((result.get(1, 1) - 3.0).abs() < 1e-4);
    }
}
