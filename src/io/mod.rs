//! Low-level I/O support for raster file access
//!
//! Byte-order strategies and the combined read/seek trait used by the
//! TIFF layer.

pub mod seekable;
pub mod byte_order;
