//! Coordinate handling for geospatial grids
//!
//! Bounding boxes, affine pixel-to-geographic transforms and the small
//! set of CRS conversions the compositor supports.

mod bbox;
mod point;
mod transform;
mod crs;

// Re-export key types
pub use self::bbox::BoundingBox;
pub use self::point::Point;
pub use self::transform::{CrsTransformer, GeoTransform};
pub use self::crs::Crs;
