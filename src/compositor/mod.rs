//! Raster compositing pipeline
//!
//! The core of the crate: select files from the store, align them onto
//! a reference grid, average them, and hand the result to either the
//! numeric extraction or the visual rendering surface.

mod composite;
pub mod errors;
mod render;
mod samples;

pub use composite::{Composite, Compositor};
pub use errors::{CompositeError, CompositeResult};
pub use render::{colorize, render, RenderedOverlay};
pub use samples::{extract_samples, Sample};
