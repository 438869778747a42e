//! Image File Directory (IFD) structures and methods
//!
//! An IFD stores the metadata of one image in a TIFF file as a series of
//! tag entries. Model rasters carry exactly one image per file, but the
//! reader still walks the full chain so multipage files degrade cleanly.

use std::collections::HashMap;
use std::fmt;
use log::trace;

use crate::tiff::constants::{field_types, tags};

/// Represents an entry in an Image File Directory
///
/// Each entry describes one aspect of the image (dimensions, compression,
/// georeferencing, etc.) as a tag-value pair. For small values the
/// `value_offset` field holds the value itself; for larger ones it holds
/// the file offset where the values are stored.
#[derive(Debug, Clone)]
pub struct IfdEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type
    pub field_type: u16,
    /// Number of values
    pub count: u64,
    /// Value or offset to values
    pub value_offset: u64,
}

impl IfdEntry {
    /// Creates a new IFD entry
    pub fn new(tag: u16, field_type: u16, count: u64, value_offset: u64) -> Self {
        trace!("IFD entry: tag={}, type={}, count={}, value/offset={}",
               tag, field_type, count, value_offset);
        Self { tag, field_type, count, value_offset }
    }

    /// Size in bytes of a single value of this entry's field type
    pub fn field_type_size(&self) -> usize {
        match self.field_type {
            field_types::BYTE | field_types::ASCII
            | field_types::SBYTE | field_types::UNDEFINED => 1,
            field_types::SHORT | field_types::SSHORT => 2,
            field_types::LONG | field_types::SLONG | field_types::FLOAT => 4,
            field_types::RATIONAL | field_types::SRATIONAL | field_types::DOUBLE => 8,
            field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => 8,
            _ => 1,
        }
    }

    /// Whether the value is stored inline in `value_offset` rather than at
    /// the offset location
    ///
    /// Classic TIFF stores up to 4 bytes inline, BigTIFF up to 8.
    pub fn is_value_inline(&self, is_big_tiff: bool) -> bool {
        let total_size = self.field_type_size() * self.count as usize;
        let inline_size = if is_big_tiff { 8 } else { 4 };
        total_size <= inline_size
    }
}

/// Represents an Image File Directory in a TIFF file
#[derive(Debug, Clone)]
pub struct Ifd {
    /// Entries in this IFD
    pub entries: Vec<IfdEntry>,
    /// IFD number (0-based)
    pub number: usize,
    /// Offset to this IFD in the file
    pub offset: u64,
    /// Cached entries for quick lookup by tag
    tag_map: HashMap<u16, IfdEntry>,
}

impl Ifd {
    /// Creates a new, empty IFD
    pub fn new(number: usize, offset: u64) -> Self {
        Self {
            entries: Vec::new(),
            number,
            offset,
            tag_map: HashMap::new(),
        }
    }

    /// Adds an entry, updating the tag lookup cache
    pub fn add_entry(&mut self, entry: IfdEntry) {
        self.tag_map.insert(entry.tag, entry.clone());
        self.entries.push(entry);
    }

    /// Gets a tag's value/offset field directly
    pub fn tag_value(&self, tag: u16) -> Option<u64> {
        self.tag_map.get(&tag).map(|entry| entry.value_offset)
    }

    /// Checks whether this IFD carries a specific tag
    pub fn has_tag(&self, tag: u16) -> bool {
        self.tag_map.contains_key(&tag)
    }

    /// Gets the full entry for a tag, if present
    pub fn entry(&self, tag: u16) -> Option<&IfdEntry> {
        self.tag_map.get(&tag)
    }

    /// Image dimensions (width, height), if both tags are present
    pub fn dimensions(&self) -> Option<(u64, u64)> {
        let width = self.tag_value(tags::IMAGE_WIDTH)?;
        let height = self.tag_value(tags::IMAGE_LENGTH)?;
        Some((width, height))
    }

    /// Number of samples per pixel, defaulting to 1
    pub fn samples_per_pixel(&self) -> u64 {
        self.tag_value(tags::SAMPLES_PER_PIXEL).unwrap_or(1)
    }

    /// Whether the image data is organized in tiles rather than strips
    pub fn is_tiled(&self) -> bool {
        self.has_tag(tags::TILE_WIDTH) && self.has_tag(tags::TILE_LENGTH)
    }
}

impl fmt::Display for Ifd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IFD #{} (offset: {})", self.number, self.offset)?;
        writeln!(f, "  Number of entries: {}", self.entries.len())?;
        if let Some((width, height)) = self.dimensions() {
            writeln!(f, "  Dimensions: {}x{}", width, height)?;
        }
        writeln!(f, "  Samples per pixel: {}", self.samples_per_pixel())?;
        for entry in &self.entries {
            writeln!(f, "    Tag {} [type {}]: count={}, value/offset={}",
                     entry.tag, entry.field_type, entry.count, entry.value_offset)?;
        }
        Ok(())
    }
}
