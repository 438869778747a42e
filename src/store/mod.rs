//! Raster store
//!
//! A read-only directory of model output files following the
//! `pm25_{model}_{date}.tif` naming convention. The store only lists and
//! resolves files; reading their contents is the raster layer's job.

mod catalog;

pub use catalog::{DateSelection, RasterEntry, RasterStore, ALL_DATES};
