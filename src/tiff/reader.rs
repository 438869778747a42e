//! TIFF file reader implementation
//!
//! Reads TIFF and BigTIFF structures using the Strategy pattern for byte
//! order handling. The reader only parses the directory structure and tag
//! values; pixel data is pulled out by the band reader in the raster
//! module.

use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufReader, SeekFrom};
use std::path::Path;

use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{field_types, header};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::{Ifd, IfdEntry};
use crate::utils::logger::Logger;

/// Parsed TIFF file structure
#[derive(Debug)]
pub struct Tiff {
    /// All IFDs found in the file
    pub ifds: Vec<Ifd>,
    /// Whether the file uses the BigTIFF layout
    pub is_big_tiff: bool,
}

impl Tiff {
    /// Creates an empty structure
    pub fn new(is_big_tiff: bool) -> Self {
        Tiff { ifds: Vec::new(), is_big_tiff }
    }

    /// The primary (first) image directory
    ///
    /// Model rasters carry their data in IFD 0; any further IFDs are
    /// overviews and are ignored by the compositor.
    pub fn primary_ifd(&self) -> TiffResult<&Ifd> {
        self.ifds.first()
            .ok_or_else(|| TiffError::GenericError("No IFDs found in TIFF file".to_string()))
    }
}

/// Reader for TIFF and BigTIFF files
pub struct TiffReader<'a> {
    /// Current byte order handler
    byte_order_handler: Option<Box<dyn ByteOrderHandler>>,
    /// Detected byte order, kept for inline value unpacking
    byte_order: Option<ByteOrder>,
    /// Logger instance
    logger: &'a Logger,
    /// Whether currently reading BigTIFF format
    is_big_tiff: bool,
}

impl<'a> TiffReader<'a> {
    /// Creates a new TIFF reader
    pub fn new(logger: &'a Logger) -> Self {
        TiffReader {
            byte_order_handler: None,
            byte_order: None,
            logger,
            is_big_tiff: false,
        }
    }

    /// Returns the byte order handler, failing if no header was read yet
    pub fn handler(&self) -> TiffResult<&dyn ByteOrderHandler> {
        self.byte_order_handler.as_deref()
            .ok_or_else(|| TiffError::GenericError("Byte order not yet determined".to_string()))
    }

    /// Whether the last parsed file used the BigTIFF layout
    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }

    /// Loads a TIFF file from the given path
    ///
    /// Opens the file, parses the directory structure and returns it
    /// together with the buffered reader so callers can continue pulling
    /// tag values and pixel data from the same handle. The handle is
    /// dropped when the caller drops the returned reader, which keeps one
    /// open file per raster read.
    pub fn load(&mut self, filepath: &Path) -> TiffResult<(Tiff, BufReader<File>)> {
        info!("Loading TIFF file: {}", filepath.display());
        self.logger.log(&format!("Loading TIFF file: {}", filepath.display()))?;

        let file = File::open(filepath)?;
        let mut reader = BufReader::with_capacity(1024 * 1024, file);
        let tiff = self.read(&mut reader)?;
        Ok((tiff, reader))
    }

    /// Reads a TIFF structure from the given reader
    ///
    /// 1. Detect byte order (II/MM)
    /// 2. Check for TIFF or BigTIFF version
    /// 3. Read the IFD chain
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> TiffResult<Tiff> {
        let order = ByteOrder::detect(reader)?;
        debug!("Byte order: {}", order.name());
        self.byte_order_handler = Some(order.create_handler());
        self.byte_order = Some(order);

        let version = self.handler()?.read_u16(reader)?;
        let first_ifd_offset = match version {
            header::TIFF_VERSION => {
                self.is_big_tiff = false;
                self.handler()?.read_u32(reader)? as u64
            }
            header::BIG_TIFF_VERSION => {
                self.is_big_tiff = true;
                let offset_size = self.handler()?.read_u16(reader)?;
                let _reserved = self.handler()?.read_u16(reader)?;
                if offset_size != header::BIGTIFF_OFFSET_SIZE {
                    return Err(TiffError::InvalidHeader);
                }
                self.handler()?.read_u64(reader)?
            }
            other => return Err(TiffError::UnsupportedVersion(other)),
        };
        debug!("First IFD offset: {}", first_ifd_offset);

        let file_size = file_size(reader)?;
        if first_ifd_offset < 8 || first_ifd_offset >= file_size {
            return Err(TiffError::InvalidHeader);
        }

        let mut tiff = Tiff::new(self.is_big_tiff);
        tiff.ifds = self.read_ifd_chain(reader, first_ifd_offset, file_size)?;
        info!("Read {} IFDs from TIFF file", tiff.ifds.len());
        Ok(tiff)
    }

    /// Reads the chain of IFDs starting from the given offset
    fn read_ifd_chain(&self, reader: &mut dyn SeekableReader,
                      first_ifd_offset: u64, file_size: u64) -> TiffResult<Vec<Ifd>> {
        let mut ifds = Vec::new();
        let mut ifd_offset = first_ifd_offset;
        let max_ifds = 32; // guards against cyclic offset chains

        while ifd_offset != 0 && ifds.len() < max_ifds {
            if ifd_offset >= file_size {
                warn!("IFD offset {} exceeds file size {}, stopping IFD chain",
                      ifd_offset, file_size);
                break;
            }

            match self.read_ifd(reader, ifd_offset, ifds.len()) {
                Ok(ifd) => {
                    // The cursor sits right on the next-IFD-offset field
                    // after the last entry, so read it in place.
                    let next_offset = if self.is_big_tiff {
                        self.handler()?.read_u64(reader)?
                    } else {
                        self.handler()?.read_u32(reader)? as u64
                    };
                    debug!("Next IFD offset: {}", next_offset);
                    ifds.push(ifd);

                    if next_offset != 0 && (next_offset >= file_size || next_offset < 8) {
                        warn!("Invalid next IFD offset: {}, stopping IFD chain", next_offset);
                        break;
                    }
                    ifd_offset = next_offset;
                }
                Err(e) => {
                    warn!("Error reading IFD {}: {}", ifds.len(), e);
                    break;
                }
            }
        }

        Ok(ifds)
    }

    /// Reads a single IFD at the given offset
    pub fn read_ifd(&self, reader: &mut dyn SeekableReader,
                    offset: u64, number: usize) -> TiffResult<Ifd> {
        reader.seek(SeekFrom::Start(offset))?;

        let entry_count = if self.is_big_tiff {
            self.handler()?.read_u64(reader)?
        } else {
            self.handler()?.read_u16(reader)? as u64
        };
        debug!("IFD #{} entry count: {}", number, entry_count);

        let mut ifd = Ifd::new(number, offset);
        for _ in 0..entry_count {
            ifd.add_entry(self.read_ifd_entry(reader)?);
        }
        Ok(ifd)
    }

    /// Reads a single IFD entry at the current position
    fn read_ifd_entry(&self, reader: &mut dyn SeekableReader) -> TiffResult<IfdEntry> {
        let handler = self.handler()?;
        let tag = handler.read_u16(reader)?;
        let field_type = handler.read_u16(reader)?;
        let (count, value_offset) = if self.is_big_tiff {
            (handler.read_u64(reader)?, handler.read_u64(reader)?)
        } else {
            (handler.read_u32(reader)? as u64, handler.read_u32(reader)? as u64)
        };
        let mut entry = IfdEntry::new(tag, field_type, count, value_offset);
        self.normalize_inline_value(&mut entry)?;
        Ok(entry)
    }

    /// Folds a single inline integer value down to the number it encodes
    ///
    /// Inline values are left-justified raw file bytes in the value
    /// field, not a field-width integer. Reading the whole field through
    /// the byte order handler happens to give the right number in
    /// little-endian files, but in big-endian files a single SHORT lands
    /// in the high bytes and comes out shifted. Re-reading the raw bytes
    /// at the value's own width makes `value_offset` hold the actual
    /// value in both orders.
    fn normalize_inline_value(&self, entry: &mut IfdEntry) -> TiffResult<()> {
        let is_integer = matches!(entry.field_type,
            field_types::BYTE | field_types::SHORT
            | field_types::LONG | field_types::LONG8);
        if is_integer && entry.count == 1 && entry.is_value_inline(self.is_big_tiff) {
            let bytes = self.inline_bytes(entry);
            let mut cursor = std::io::Cursor::new(bytes);
            entry.value_offset = self.read_integer(&mut cursor, entry.field_type)?;
        }
        Ok(())
    }

    /// Reads an integer-typed tag's values as a vector of u64
    ///
    /// Handles BYTE/SHORT/LONG/LONG8 entries, both inline and external,
    /// converting everything to u64. Used for strip/tile offset and byte
    /// count arrays.
    pub fn read_tag_values(&self, reader: &mut dyn SeekableReader,
                           ifd: &Ifd, tag: u16) -> TiffResult<Vec<u64>> {
        let entry = ifd.entry(tag).ok_or(TiffError::TagNotFound(tag))?;
        let mut values = Vec::with_capacity(entry.count as usize);

        if entry.is_value_inline(self.is_big_tiff) {
            if entry.count == 1 {
                // Already folded to the value when the entry was read
                values.push(entry.value_offset);
            } else {
                let bytes = self.inline_bytes(entry);
                let mut cursor = std::io::Cursor::new(bytes);
                for _ in 0..entry.count {
                    values.push(self.read_integer(&mut cursor, entry.field_type)?);
                }
            }
        } else {
            reader.seek(SeekFrom::Start(entry.value_offset))?;
            for _ in 0..entry.count {
                values.push(self.read_integer(reader, entry.field_type)?);
            }
        }
        Ok(values)
    }

    /// Reads a DOUBLE-typed tag's values
    ///
    /// GeoTIFF stores pixel scale, tiepoints and transformation matrices
    /// as arrays of f64.
    pub fn read_tag_doubles(&self, reader: &mut dyn SeekableReader,
                            ifd: &Ifd, tag: u16) -> TiffResult<Vec<f64>> {
        let entry = ifd.entry(tag).ok_or(TiffError::TagNotFound(tag))?;
        let mut values = Vec::with_capacity(entry.count as usize);

        if entry.is_value_inline(self.is_big_tiff) {
            // Only possible in BigTIFF with a single value; the 8 raw
            // bytes were already folded into value_offset in file order.
            values.push(f64::from_bits(entry.value_offset));
        } else {
            reader.seek(SeekFrom::Start(entry.value_offset))?;
            let handler = self.handler()?;
            for _ in 0..entry.count {
                values.push(handler.read_f64(reader)?);
            }
        }
        Ok(values)
    }

    /// Reads a SHORT-typed tag's values as u16
    ///
    /// The GeoKey directory is declared as an array of SHORTs.
    pub fn read_tag_shorts(&self, reader: &mut dyn SeekableReader,
                           ifd: &Ifd, tag: u16) -> TiffResult<Vec<u16>> {
        let values = self.read_tag_values(reader, ifd, tag)?;
        Ok(values.into_iter().map(|v| v as u16).collect())
    }

    /// Reads an ASCII-typed tag's value as a string, trimming trailing
    /// nulls
    pub fn read_tag_ascii(&self, reader: &mut dyn SeekableReader,
                          ifd: &Ifd, tag: u16) -> TiffResult<String> {
        let entry = ifd.entry(tag).ok_or(TiffError::TagNotFound(tag))?;
        let mut buffer;

        if entry.is_value_inline(self.is_big_tiff) {
            let bytes = self.inline_bytes(entry);
            buffer = bytes[..entry.count as usize].to_vec();
        } else {
            reader.seek(SeekFrom::Start(entry.value_offset))?;
            buffer = vec![0u8; entry.count as usize];
            reader.read_exact(&mut buffer)?;
        }

        while buffer.last() == Some(&0) {
            buffer.pop();
        }
        String::from_utf8(buffer)
            .map_err(|e| TiffError::GenericError(format!("Invalid ASCII tag value: {}", e)))
    }

    /// Reconstructs the raw file bytes of an inline value field
    ///
    /// `value_offset` was parsed through the byte order handler, so
    /// serializing it back in that same order recovers the original
    /// bytes.
    fn inline_bytes(&self, entry: &IfdEntry) -> [u8; 8] {
        let mut bytes = [0u8; 8];
        match self.byte_order {
            Some(ByteOrder::BigEndian) => {
                if self.is_big_tiff {
                    bytes.copy_from_slice(&entry.value_offset.to_be_bytes());
                } else {
                    bytes[..4].copy_from_slice(&(entry.value_offset as u32).to_be_bytes());
                }
            }
            _ => {
                if self.is_big_tiff {
                    bytes.copy_from_slice(&entry.value_offset.to_le_bytes());
                } else {
                    bytes[..4].copy_from_slice(&(entry.value_offset as u32).to_le_bytes());
                }
            }
        }
        bytes
    }

    /// Reads one integer value of the given field type as u64
    fn read_integer(&self, reader: &mut dyn SeekableReader, field_type: u16) -> TiffResult<u64> {
        let handler = self.handler()?;
        let value = match field_type {
            field_types::BYTE => {
                let mut byte = [0u8; 1];
                reader.read_exact(&mut byte)?;
                byte[0] as u64
            }
            field_types::SHORT => handler.read_u16(reader)? as u64,
            field_types::LONG => handler.read_u32(reader)? as u64,
            field_types::LONG8 => handler.read_u64(reader)?,
            other => return Err(TiffError::GenericError(
                format!("Unexpected field type {} for integer tag", other))),
        };
        Ok(value)
    }
}

/// Total size of the underlying stream, restoring the cursor afterwards
fn file_size(reader: &mut dyn SeekableReader) -> TiffResult<u64> {
    let position = reader.stream_position()?;
    let size = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(position))?;
    Ok(size)
}
