//! GeoTIFF metadata extraction
//!
//! Pulls the georeferencing triplet the compositor needs out of a parsed
//! IFD: the affine pixel-to-geographic transform, the coordinate
//! reference system code and the declared no-data sentinel.
//!
//! Georeferencing is accepted in two forms: the usual
//! ModelPixelScale + ModelTiepoint pair, or an axis-aligned
//! ModelTransformation matrix. Rotated grids are rejected; the upstream
//! model never produces them and silently mis-placing pixels would be
//! worse than failing.

use log::{debug, warn};

use crate::coordinate::GeoTransform;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{epsg, geo_keys, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::Ifd;
use crate::tiff::reader::TiffReader;

/// Geographic metadata of a single raster file
#[derive(Debug, Clone)]
pub struct GeoInfo {
    /// Affine pixel-to-geographic transform
    pub transform: GeoTransform,
    /// EPSG code of the coordinate reference system
    pub epsg: u32,
    /// Declared no-data sentinel, if any
    pub nodata: Option<f64>,
}

/// Extracts geographic metadata from the primary IFD
pub fn extract_geo_info(tiff_reader: &TiffReader,
                        reader: &mut dyn SeekableReader,
                        ifd: &Ifd) -> TiffResult<GeoInfo> {
    let transform = read_transform(tiff_reader, reader, ifd)?;
    let epsg = read_epsg(tiff_reader, reader, ifd)?;
    let nodata = read_nodata(tiff_reader, reader, ifd)?;

    debug!("Geo metadata: epsg={}, nodata={:?}, origin=({}, {})",
           epsg, nodata, transform.origin_x, transform.origin_y);

    Ok(GeoInfo { transform, epsg, nodata })
}

/// Builds the affine transform from the available geo tags
fn read_transform(tiff_reader: &TiffReader,
                  reader: &mut dyn SeekableReader,
                  ifd: &Ifd) -> TiffResult<GeoTransform> {
    if ifd.has_tag(tags::MODEL_PIXEL_SCALE_TAG) && ifd.has_tag(tags::MODEL_TIEPOINT_TAG) {
        let scale = tiff_reader.read_tag_doubles(reader, ifd, tags::MODEL_PIXEL_SCALE_TAG)?;
        let tiepoint = tiff_reader.read_tag_doubles(reader, ifd, tags::MODEL_TIEPOINT_TAG)?;

        if scale.len() < 2 || tiepoint.len() < 6 {
            return Err(TiffError::GenericError(
                "Malformed ModelPixelScale/ModelTiepoint tags".to_string()));
        }

        // Tiepoint maps raster (i, j) to world (x, y); solve for the
        // world coordinate of raster (0, 0).
        let (i, j) = (tiepoint[0], tiepoint[1]);
        let (x, y) = (tiepoint[3], tiepoint[4]);
        let origin_x = x - i * scale[0];
        let origin_y = y + j * scale[1];

        return Ok(GeoTransform::new(origin_x, scale[0], origin_y, -scale[1]));
    }

    if ifd.has_tag(tags::MODEL_TRANSFORMATION_TAG) {
        let matrix = tiff_reader.read_tag_doubles(reader, ifd, tags::MODEL_TRANSFORMATION_TAG)?;
        if matrix.len() < 16 {
            return Err(TiffError::GenericError(
                "Malformed ModelTransformation tag".to_string()));
        }
        // Row-major 4x4: [a b 0 tx, d e 0 ty, ...]; only axis-aligned
        // grids are supported, so the rotation terms must be zero.
        if matrix[1] != 0.0 || matrix[4] != 0.0 {
            return Err(TiffError::GenericError(
                "Rotated rasters are not supported".to_string()));
        }
        return Ok(GeoTransform::new(matrix[3], matrix[0], matrix[7], matrix[5]));
    }

    Err(TiffError::TagNotFound(tags::MODEL_TIEPOINT_TAG))
}

/// Reads the EPSG code from the GeoKey directory
///
/// Looks for ProjectedCSTypeGeoKey first, then GeographicTypeGeoKey.
/// A missing directory or key falls back to WGS84 with a warning, which
/// matches how the upstream model publishes its grids.
fn read_epsg(tiff_reader: &TiffReader,
             reader: &mut dyn SeekableReader,
             ifd: &Ifd) -> TiffResult<u32> {
    if !ifd.has_tag(tags::GEO_KEY_DIRECTORY_TAG) {
        warn!("No GeoKey directory, assuming EPSG:{}", epsg::WGS84);
        return Ok(epsg::WGS84);
    }

    let directory = tiff_reader.read_tag_shorts(reader, ifd, tags::GEO_KEY_DIRECTORY_TAG)?;
    if directory.len() < 4 {
        return Err(TiffError::GenericError("Invalid GeoKey directory header".to_string()));
    }

    let num_keys = directory[3] as usize;
    let mut geographic_type = None;
    let mut projected_type = None;

    // Entries are 4 shorts each: key id, tag location, count, value.
    // Only values stored inline (location 0) can carry an EPSG code.
    for entry in directory[4..].chunks_exact(4).take(num_keys) {
        let (key_id, location, value) = (entry[0], entry[1], entry[3]);
        if location != 0 {
            continue;
        }
        match key_id {
            geo_keys::PROJECTED_CS_TYPE => projected_type = Some(value as u32),
            geo_keys::GEOGRAPHIC_TYPE => geographic_type = Some(value as u32),
            _ => {}
        }
    }

    match projected_type.or(geographic_type) {
        Some(code) => Ok(code),
        None => {
            warn!("GeoKey directory carries no CRS code, assuming EPSG:{}", epsg::WGS84);
            Ok(epsg::WGS84)
        }
    }
}

/// Reads the GDAL no-data sentinel, if declared
fn read_nodata(tiff_reader: &TiffReader,
               reader: &mut dyn SeekableReader,
               ifd: &Ifd) -> TiffResult<Option<f64>> {
    if !ifd.has_tag(tags::GDAL_NODATA) {
        return Ok(None);
    }

    let text = tiff_reader.read_tag_ascii(reader, ifd, tags::GDAL_NODATA)?;
    match text.trim().parse::<f64>() {
        Ok(value) => Ok(Some(value)),
        Err(_) => {
            warn!("Unparseable GDAL_NODATA value '{}', ignoring", text.trim());
            Ok(None)
        }
    }
}
