//! Minimal GeoTIFF encoder
//!
//! Writes a single-band float32 raster as a classic little-endian TIFF
//! with one IFD and one strip, carrying the georeferencing tags the rest
//! of this crate reads back: ModelPixelScale, ModelTiepoint, a GeoKey
//! directory with the CRS code, and GDAL_NODATA. This is what the
//! averaged-composite download is served from, and what the test suite
//! builds its fixtures with.

use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::coordinate::GeoTransform;
use crate::tiff::codec::{codec_by_name, Codec, IdentityCodec};
use crate::tiff::constants::{epsg, field_types, geo_keys, header, photometric,
                             sample_format, tags};
use crate::tiff::errors::TiffResult;
use crate::utils::logger::Logger;

/// Encoder for single-band float32 GeoTIFF output
pub struct GeoTiffEncoder<'a> {
    logger: &'a Logger,
    codec: Box<dyn Codec>,
}

impl<'a> GeoTiffEncoder<'a> {
    /// Creates an encoder writing uncompressed strips
    pub fn new(logger: &'a Logger) -> Self {
        GeoTiffEncoder { logger, codec: Box::new(IdentityCodec) }
    }

    /// Creates an encoder using the named compression scheme
    pub fn with_compression(logger: &'a Logger, name: &str) -> TiffResult<Self> {
        Ok(GeoTiffEncoder { logger, codec: codec_by_name(name)? })
    }

    /// Writes a raster to the given path
    ///
    /// `data` is row-major float32 samples, `width * height` long. Any
    /// sentinel encoding (for example NaN replaced by -9999) is the
    /// caller's responsibility; the encoder records `nodata` verbatim in
    /// the GDAL_NODATA tag.
    pub fn write(&self, path: &Path, width: u32, height: u32, data: &[f32],
                 transform: &GeoTransform, crs_code: u32,
                 nodata: Option<f64>) -> TiffResult<()> {
        if data.len() != (width as usize) * (height as usize) {
            return Err(crate::tiff::errors::TiffError::GenericError(
                "Sample count does not match raster dimensions".to_string()));
        }

        info!("Writing {}x{} float32 GeoTIFF to {} ({})",
              width, height, path.display(), self.codec.name());
        self.logger.log(&format!("Writing GeoTIFF: {}", path.display()))?;

        // Single strip holding the whole image, compressed up front so
        // every offset is known before anything hits the file.
        let mut raw = Vec::with_capacity(data.len() * 4);
        for sample in data {
            raw.extend_from_slice(&sample.to_le_bytes());
        }
        let strip = self.codec.encode(&raw)?;

        let strip_offset: u64 = 8;
        let scale_offset = even(strip_offset + strip.len() as u64);
        let tiepoint_offset = scale_offset + 3 * 8;
        let geokey_offset = tiepoint_offset + 6 * 8;
        let geokey_shorts = geokey_directory(crs_code);
        let nodata_text = nodata.map(|v| {
            let mut text = format_nodata(v).into_bytes();
            text.push(0);
            text
        });
        let nodata_offset = geokey_offset + geokey_shorts.len() as u64 * 2;
        let nodata_len = nodata_text.as_ref().map(|t| t.len() as u64).unwrap_or(0);
        let ifd_offset = even(nodata_offset + nodata_len);

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        // Header
        writer.write_all(&[0x49, 0x49])?; // "II"
        writer.write_all(&header::TIFF_VERSION.to_le_bytes())?;
        writer.write_all(&(ifd_offset as u32).to_le_bytes())?;

        // Strip data and external value areas
        writer.write_all(&strip)?;
        pad_to(&mut writer, strip_offset + strip.len() as u64, scale_offset)?;
        for value in [transform.pixel_width, -transform.pixel_height, 0.0] {
            writer.write_all(&value.to_le_bytes())?;
        }
        for value in [0.0, 0.0, 0.0, transform.origin_x, transform.origin_y, 0.0] {
            writer.write_all(&value.to_le_bytes())?;
        }
        for short in &geokey_shorts {
            writer.write_all(&short.to_le_bytes())?;
        }
        if let Some(text) = &nodata_text {
            writer.write_all(text)?;
        }
        pad_to(&mut writer, nodata_offset + nodata_len, ifd_offset)?;

        // IFD, entries in ascending tag order
        let mut entries: Vec<(u16, u16, u32, u32)> = vec![
            (tags::IMAGE_WIDTH, field_types::LONG, 1, width),
            (tags::IMAGE_LENGTH, field_types::LONG, 1, height),
            (tags::BITS_PER_SAMPLE, field_types::SHORT, 1, 32),
            (tags::COMPRESSION, field_types::SHORT, 1, self.codec.code() as u32),
            (tags::PHOTOMETRIC_INTERPRETATION, field_types::SHORT, 1,
             photometric::BLACK_IS_ZERO as u32),
            (tags::STRIP_OFFSETS, field_types::LONG, 1, strip_offset as u32),
            (tags::SAMPLES_PER_PIXEL, field_types::SHORT, 1, 1),
            (tags::ROWS_PER_STRIP, field_types::LONG, 1, height),
            (tags::STRIP_BYTE_COUNTS, field_types::LONG, 1, strip.len() as u32),
            (tags::SAMPLE_FORMAT, field_types::SHORT, 1, sample_format::IEEEFP as u32),
            (tags::MODEL_PIXEL_SCALE_TAG, field_types::DOUBLE, 3, scale_offset as u32),
            (tags::MODEL_TIEPOINT_TAG, field_types::DOUBLE, 6, tiepoint_offset as u32),
            (tags::GEO_KEY_DIRECTORY_TAG, field_types::SHORT,
             geokey_shorts.len() as u32, geokey_offset as u32),
        ];
        if let Some(text) = &nodata_text {
            entries.push((tags::GDAL_NODATA, field_types::ASCII,
                          text.len() as u32, nodata_offset as u32));
        }

        writer.write_all(&(entries.len() as u16).to_le_bytes())?;
        for (tag, field_type, count, value) in &entries {
            writer.write_all(&tag.to_le_bytes())?;
            writer.write_all(&field_type.to_le_bytes())?;
            writer.write_all(&count.to_le_bytes())?;
            writer.write_all(&value.to_le_bytes())?;
        }
        writer.write_all(&0u32.to_le_bytes())?; // no further IFDs
        writer.flush()?;

        Ok(())
    }
}

/// Builds the GeoKey directory shorts for the given CRS code
///
/// Header (version 1.1.0, two keys) followed by GTModelType and the
/// geographic or projected CS type key.
fn geokey_directory(crs_code: u32) -> Vec<u16> {
    let geographic = crs_code == epsg::WGS84;
    let (model_type, cs_key) = if geographic {
        (2u16, geo_keys::GEOGRAPHIC_TYPE)
    } else {
        (1u16, geo_keys::PROJECTED_CS_TYPE)
    };
    vec![
        1, 1, 0, 2,
        geo_keys::MODEL_TYPE, 0, 1, model_type,
        cs_key, 0, 1, crs_code as u16,
    ]
}

/// Formats a no-data value the way GDAL writes it
fn format_nodata(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Next even offset at or after `offset`
fn even(offset: u64) -> u64 {
    offset + (offset & 1)
}

/// Writes padding bytes from `current` up to `target`
fn pad_to(writer: &mut impl Write, current: u64, target: u64) -> TiffResult<()> {
    for _ in current..target {
        writer.write_all(&[0])?;
    }
    Ok(())
}
