//! GeoTIFF parsing and writing
//!
//! Structures and functions for reading TIFF/BigTIFF raster files, their
//! geographic metadata, and for writing the single-band float32 output
//! format used for composite downloads.

pub mod errors;
pub mod ifd;
pub mod reader;
pub mod geo;
pub mod encoder;
pub(crate) mod codec;
pub(crate) mod constants;
mod tests;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use errors::{TiffError, TiffResult};
pub use ifd::{Ifd, IfdEntry};
pub use reader::{Tiff, TiffReader};
pub use geo::GeoInfo;
pub use encoder::GeoTiffEncoder;
