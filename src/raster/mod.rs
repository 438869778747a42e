//! Single-band raster grids
//!
//! The in-memory grid model, the band reader that turns a GeoTIFF file
//! into a float grid with NaN for missing values, and bilinear
//! resampling onto a reference layout.

mod grid;
mod band;
mod resample;

pub use band::BandReader;
pub use grid::{GridLayout, RasterGrid};
pub use resample::resample_to_layout;
