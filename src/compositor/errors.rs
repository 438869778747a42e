//! Error types for compositing operations

use std::fmt;
use std::io;

use crate::tiff::errors::TiffError;

/// Errors produced while building a composite
#[derive(Debug)]
pub enum CompositeError {
    /// No file matches the requested model and date
    NotFound(String),
    /// Candidates existed but none could be turned into a valid layer
    ProcessingFailed(String),
    /// Raster decoding error
    TiffError(TiffError),
    /// I/O error while scanning the store
    IoError(io::Error),
    /// Image encoding error
    ImageError(image::ImageError),
    /// JSON serialization error
    JsonError(serde_json::Error),
}

impl fmt::Display for CompositeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositeError::NotFound(msg) => write!(f, "Not found: {}", msg),
            CompositeError::ProcessingFailed(msg) => write!(f, "Processing failed: {}", msg),
            CompositeError::TiffError(e) => write!(f, "TIFF error: {}", e),
            CompositeError::IoError(e) => write!(f, "I/O error: {}", e),
            CompositeError::ImageError(e) => write!(f, "Image error: {}", e),
            CompositeError::JsonError(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for CompositeError {}

impl From<TiffError> for CompositeError {
    fn from(error: TiffError) -> Self {
        CompositeError::TiffError(error)
    }
}

impl From<io::Error> for CompositeError {
    fn from(error: io::Error) -> Self {
        CompositeError::IoError(error)
    }
}

impl From<image::ImageError> for CompositeError {
    fn from(error: image::ImageError) -> Self {
        CompositeError::ImageError(error)
    }
}

impl From<serde_json::Error> for CompositeError {
    fn from(error: serde_json::Error) -> Self {
        CompositeError::JsonError(error)
    }
}

impl CompositeError {
    /// Whether the error maps to a user-facing "not found" condition
    /// rather than a server-side failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, CompositeError::NotFound(_))
    }
}

/// Result type alias for composite operations
pub type CompositeResult<T> = Result<T, CompositeError>;
