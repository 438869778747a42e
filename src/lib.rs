pub mod io;
pub mod tiff;
pub mod utils;
pub mod coordinate;
pub mod raster;
pub mod store;
pub mod palette;
pub mod compositor;
pub mod commands;
pub mod api;

pub use crate::api::PlumeKit;

pub use compositor::{Composite, CompositeError, Compositor, RenderedOverlay, Sample};
pub use coordinate::{BoundingBox, Crs, CrsTransformer, GeoTransform, Point};
pub use palette::Palette;
pub use raster::{BandReader, GridLayout, RasterGrid};
pub use store::{DateSelection, RasterStore};
pub use tiff::{GeoTiffEncoder, TiffReader};
