//! Visual rendering of composite grids
//!
//! Maps a composite through a palette into an RGBA overlay image. Alpha
//! is 0 wherever the source is NaN or exactly zero and 255 everywhere
//! else; the zero case reproduces the upstream dashboard's treatment of
//! zero readings as absent.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use log::debug;

use crate::coordinate::BoundingBox;
use crate::palette::Palette;
use crate::raster::RasterGrid;

use super::errors::CompositeResult;

/// A rendered overlay: encoded image plus its geographic extent
#[derive(Debug, Clone)]
pub struct RenderedOverlay {
    /// PNG-encoded RGBA image
    pub png: Vec<u8>,
    /// Extent of the grid in its own coordinate reference system
    pub bounds: BoundingBox,
}

/// Map a grid through a palette into an RGBA image
pub fn colorize(grid: &RasterGrid, palette: &Palette) -> RgbaImage {
    let mut image = RgbaImage::new(grid.width(), grid.height());
    for row in 0..grid.height() {
        for col in 0..grid.width() {
            let value = grid.get(col, row);
            let pixel = if value.is_nan() || value == 0.0 {
                [0, 0, 0, 0]
            } else {
                let [r, g, b] = palette.color_for(value);
                [r, g, b, 255]
            };
            image.put_pixel(col, row, image::Rgba(pixel));
        }
    }
    image
}

/// Render a grid to a PNG overlay with its bounding box
pub fn render(grid: &RasterGrid, palette: &Palette) -> CompositeResult<RenderedOverlay> {
    let image = colorize(grid, palette);
    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;

    debug!("Rendered {}x{} overlay, {} bytes", grid.width(), grid.height(), png.len());
    Ok(RenderedOverlay { png, bounds: grid.bounding_box() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::GeoTransform;
    use crate::raster::GridLayout;

    fn grid(data: Vec<f32>) -> RasterGrid {
        let layout = GridLayout::new(
            2, 2, GeoTransform::new(100.0, 0.5, 20.0, -0.5), 4326);
        RasterGrid::new(layout, data)
    }

    #[test]
    fn nan_and_zero_are_transparent() {
        let palette = Palette::named("aqi").unwrap();
        let image = colorize(&grid(vec![f32::NAN, 0.0, 15.0, 80.0]), &palette);

        assert_eq!(image.get_pixel(0, 0).0[3], 0);
        assert_eq!(image.get_pixel(1, 0).0[3], 0);
        assert_eq!(image.get_pixel(0, 1).0[3], 255);
        assert_eq!(image.get_pixel(1, 1).0[3], 255);
    }

    #[test]
    fn colors_come_from_the_palette() {
        let palette = Palette::named("aqi").unwrap();
        let image = colorize(&grid(vec![80.0, 100.0, 1.0, 2.0]), &palette);

        // Clamped top of the domain and anything above share a color
        assert_eq!(image.get_pixel(0, 0).0, image.get_pixel(1, 0).0);
    }

    #[test]
    fn rendering_produces_png_with_grid_bounds() {
        let palette = Palette::named("aqi").unwrap();
        let source = grid(vec![1.0, 2.0, 3.0, 4.0]);
        let overlay = render(&source, &palette).unwrap();

        // PNG signature
        assert_eq!(&overlay.png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
        assert_eq!(overlay.bounds.left(), 100.0);
        assert_eq!(overlay.bounds.right(), 101.0);
        assert_eq!(overlay.bounds.top(), 20.0);
        assert_eq!(overlay.bounds.bottom(), 19.0);
    }
}
