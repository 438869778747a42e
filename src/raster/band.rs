//! Band reading for single-band GeoTIFF files
//!
//! Reads band 1 of a model raster as f32 regardless of how the samples
//! are stored on disk, handling both strip and tile organization and the
//! compression codecs the upstream model emits. The declared no-data
//! sentinel is replaced with NaN so every later stage has a single
//! representation of "no value".

use log::{debug, info};
use std::io::Cursor;
use std::path::Path;

use crate::io::byte_order::ByteOrderHandler;
use crate::io::seekable::SeekableReader;
use crate::tiff::codec::codec_for;
use crate::tiff::constants::{planar_config, predictor, sample_format, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::geo::extract_geo_info;
use crate::tiff::ifd::Ifd;
use crate::tiff::reader::TiffReader;
use crate::utils::logger::Logger;

use super::grid::{GridLayout, RasterGrid};

/// How samples are stored on disk, resolved once per file
#[derive(Debug, Clone, Copy)]
struct SampleLayout {
    format: u16,
    bits: u16,
}

impl SampleLayout {
    fn from_ifd(ifd: &Ifd) -> TiffResult<Self> {
        let format = ifd.tag_value(tags::SAMPLE_FORMAT)
            .unwrap_or(sample_format::UNSIGNED as u64) as u16;
        let bits = ifd.tag_value(tags::BITS_PER_SAMPLE).unwrap_or(8) as u16;

        let supported = matches!(
            (format, bits),
            (f, 8) | (f, 16) | (f, 32) if f == sample_format::UNSIGNED
                                       || f == sample_format::SIGNED
        ) || matches!((format, bits),
                      (f, 32) | (f, 64) if f == sample_format::IEEEFP);

        if supported {
            Ok(SampleLayout { format, bits })
        } else {
            Err(TiffError::UnsupportedSampleFormat(format, bits))
        }
    }

    fn byte_size(&self) -> usize {
        self.bits as usize / 8
    }

    /// Reads one sample from the cursor as f32
    fn read_sample(&self, handler: &dyn ByteOrderHandler,
                   cursor: &mut dyn SeekableReader) -> TiffResult<f32> {
        let value = if self.format == sample_format::IEEEFP {
            match self.bits {
                32 => handler.read_f32(cursor)?,
                _ => handler.read_f64(cursor)? as f32,
            }
        } else if self.format == sample_format::SIGNED {
            match self.bits {
                8 => {
                    let mut byte = [0u8; 1];
                    cursor.read_exact(&mut byte)?;
                    byte[0] as i8 as f32
                }
                16 => handler.read_i16(cursor)? as f32,
                _ => handler.read_i32(cursor)? as f32,
            }
        } else {
            match self.bits {
                8 => {
                    let mut byte = [0u8; 1];
                    cursor.read_exact(&mut byte)?;
                    byte[0] as f32
                }
                16 => handler.read_u16(cursor)? as f32,
                _ => handler.read_u32(cursor)? as f32,
            }
        };
        Ok(value)
    }
}

/// Reads single-band rasters into `RasterGrid`s
pub struct BandReader<'a> {
    logger: &'a Logger,
}

impl<'a> BandReader<'a> {
    /// Create a new band reader
    pub fn new(logger: &'a Logger) -> Self {
        BandReader { logger }
    }

    /// Read the band of the given file as an f32 grid
    ///
    /// The file handle lives only for the duration of this call; it is
    /// dropped before the function returns, success or not.
    pub fn read(&self, path: &Path) -> TiffResult<RasterGrid> {
        let mut tiff_reader = TiffReader::new(self.logger);
        let (tiff, mut file) = tiff_reader.load(path)?;
        let ifd = tiff.primary_ifd()?;

        let (width, height) = ifd.dimensions().ok_or(TiffError::MissingDimensions)?;
        let (width, height) = (width as u32, height as u32);

        let samples = ifd.samples_per_pixel();
        if samples != 1 {
            return Err(TiffError::NotSingleBand(samples));
        }
        let planar = ifd.tag_value(tags::PLANAR_CONFIGURATION)
            .unwrap_or(planar_config::CHUNKY as u64);
        if planar != planar_config::CHUNKY as u64 {
            return Err(TiffError::GenericError(
                format!("Unsupported planar configuration: {}", planar)));
        }
        let predictor_code = ifd.tag_value(tags::PREDICTOR)
            .unwrap_or(predictor::NONE as u64);
        if predictor_code != predictor::NONE as u64 {
            return Err(TiffError::UnsupportedPredictor(predictor_code));
        }

        let sample_layout = SampleLayout::from_ifd(ifd)?;
        let geo = extract_geo_info(&tiff_reader, &mut file, ifd)?;

        debug!("Band layout: {}x{}, format {}/{} bits, epsg {}",
               width, height, sample_layout.format, sample_layout.bits, geo.epsg);

        let layout = GridLayout::new(width, height, geo.transform, geo.epsg);
        let mut grid = RasterGrid::filled_with_nan(layout);

        if ifd.is_tiled() {
            self.read_tiles(&tiff_reader, &mut file, ifd, sample_layout, &mut grid)?;
        } else {
            self.read_strips(&tiff_reader, &mut file, ifd, sample_layout, &mut grid)?;
        }

        if let Some(nodata) = geo.nodata {
            grid.mask_nodata(nodata);
        }

        info!("Read band {}x{} from {} ({} valid samples)",
              width, height, path.display(), grid.valid_count());
        Ok(grid)
    }

    /// Reads a strip-organized band into the grid
    fn read_strips(&self, tiff_reader: &TiffReader,
                   file: &mut dyn SeekableReader, ifd: &Ifd,
                   sample_layout: SampleLayout,
                   grid: &mut RasterGrid) -> TiffResult<()> {
        let width = grid.width();
        let height = grid.height();
        let rows_per_strip = ifd.tag_value(tags::ROWS_PER_STRIP)
            .unwrap_or(height as u64) as u32;

        let offsets = tiff_reader.read_tag_values(file, ifd, tags::STRIP_OFFSETS)?;
        let byte_counts = tiff_reader.read_tag_values(file, ifd, tags::STRIP_BYTE_COUNTS)?;
        if offsets.len() != byte_counts.len() {
            return Err(TiffError::GenericError(
                "Mismatched strip offset and byte count arrays".to_string()));
        }

        let compression = ifd.tag_value(tags::COMPRESSION).unwrap_or(1);
        let codec = codec_for(compression)?;
        debug!("Reading {} strips ({} rows each, {})",
               offsets.len(), rows_per_strip, codec.name());

        let handler = tiff_reader.handler()?;
        for (index, (&offset, &byte_count)) in offsets.iter().zip(&byte_counts).enumerate() {
            let strip = read_block(file, offset, byte_count, codec.as_ref())?;

            let first_row = index as u32 * rows_per_strip;
            let rows = rows_per_strip.min(height.saturating_sub(first_row));
            let expected = rows as usize * width as usize * sample_layout.byte_size();
            if strip.len() < expected {
                return Err(TiffError::GenericError(
                    format!("Strip {} truncated: {} bytes, expected {}",
                            index, strip.len(), expected)));
            }

            let mut cursor = Cursor::new(strip);
            for row in first_row..first_row + rows {
                for col in 0..width {
                    let value = sample_layout.read_sample(handler, &mut cursor)?;
                    grid.set(col, row, value);
                }
            }
        }
        Ok(())
    }

    /// Reads a tile-organized band into the grid
    fn read_tiles(&self, tiff_reader: &TiffReader,
                  file: &mut dyn SeekableReader, ifd: &Ifd,
                  sample_layout: SampleLayout,
                  grid: &mut RasterGrid) -> TiffResult<()> {
        let width = grid.width();
        let height = grid.height();
        let tile_width = ifd.tag_value(tags::TILE_WIDTH)
            .ok_or(TiffError::TagNotFound(tags::TILE_WIDTH))? as u32;
        let tile_height = ifd.tag_value(tags::TILE_LENGTH)
            .ok_or(TiffError::TagNotFound(tags::TILE_LENGTH))? as u32;
        if tile_width == 0 || tile_height == 0 {
            return Err(TiffError::GenericError("Zero-sized tiles".to_string()));
        }

        let offsets = tiff_reader.read_tag_values(file, ifd, tags::TILE_OFFSETS)?;
        let byte_counts = tiff_reader.read_tag_values(file, ifd, tags::TILE_BYTE_COUNTS)?;
        if offsets.len() != byte_counts.len() {
            return Err(TiffError::GenericError(
                "Mismatched tile offset and byte count arrays".to_string()));
        }

        let compression = ifd.tag_value(tags::COMPRESSION).unwrap_or(1);
        let codec = codec_for(compression)?;
        let tiles_across = width.div_ceil(tile_width);
        debug!("Reading {} tiles of {}x{} ({})",
               offsets.len(), tile_width, tile_height, codec.name());

        let handler = tiff_reader.handler()?;
        for (index, (&offset, &byte_count)) in offsets.iter().zip(&byte_counts).enumerate() {
            let tile = read_block(file, offset, byte_count, codec.as_ref())?;

            let expected = tile_width as usize * tile_height as usize
                * sample_layout.byte_size();
            if tile.len() < expected {
                return Err(TiffError::GenericError(
                    format!("Tile {} truncated: {} bytes, expected {}",
                            index, tile.len(), expected)));
            }

            // Tiles always span the full tile grid; edge tiles carry
            // padding past the image that is read and discarded.
            let tile_col = (index as u32 % tiles_across) * tile_width;
            let tile_row = (index as u32 / tiles_across) * tile_height;

            let mut cursor = Cursor::new(tile);
            for row in 0..tile_height {
                for col in 0..tile_width {
                    let value = sample_layout.read_sample(handler, &mut cursor)?;
                    let (x, y) = (tile_col + col, tile_row + row);
                    if x < width && y < height {
                        grid.set(x, y, value);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Reads and decompresses one strip or tile
fn read_block(file: &mut dyn SeekableReader, offset: u64, byte_count: u64,
              codec: &dyn crate::tiff::codec::Codec) -> TiffResult<Vec<u8>> {
    file.seek(std::io::SeekFrom::Start(offset))?;
    let mut compressed = vec![0u8; byte_count as usize];
    file.read_exact(&mut compressed)?;
    codec.decode(&compressed)
}
