//! Combined read/seek trait
//!
//! TIFF parsing jumps between the IFD table and the data areas it points
//! at, so every reader handed to the parser must support both reading and
//! seeking.

use std::io::{Read, Seek};

/// Trait for readers that can both read and seek
pub trait SeekableReader: Read + Seek + Send + Sync {}

// Blanket implementation for any type that implements the required traits
impl<T: Read + Seek + Send + Sync> SeekableReader for T {}
