//! Tests for GeoTIFF metadata extraction

use std::io::Cursor;

use crate::tiff::constants::{field_types, geo_keys, tags};
use crate::tiff::geo::extract_geo_info;
use crate::tiff::reader::TiffReader;

use super::test_utils::{test_logger, TiffBytes};

fn parse_geo(buffer: Vec<u8>, name: &str) -> crate::tiff::geo::GeoInfo {
    let logger = test_logger(name);
    let mut reader = TiffReader::new(&logger);
    let mut cursor = Cursor::new(buffer);
    let tiff = reader.read(&mut cursor).unwrap();
    extract_geo_info(&reader, &mut cursor, &tiff.ifds[0]).unwrap()
}

#[test]
fn extracts_transform_epsg_and_nodata() {
    let mut bytes = TiffBytes::new(4);
    let scale_off = bytes.data_offset();
    bytes.entry(tags::MODEL_PIXEL_SCALE_TAG, field_types::DOUBLE, 3, scale_off);
    bytes.push_doubles(&[0.1, 0.1, 0.0]);
    let tie_off = bytes.next_data_offset();
    bytes.entry(tags::MODEL_TIEPOINT_TAG, field_types::DOUBLE, 6, tie_off);
    bytes.push_doubles(&[0.0, 0.0, 0.0, 102.0, 18.0, 0.0]);
    let keys_off = bytes.next_data_offset();
    bytes.entry(tags::GEO_KEY_DIRECTORY_TAG, field_types::SHORT, 8, keys_off);
    bytes.push_shorts(&[1, 1, 0, 1, geo_keys::GEOGRAPHIC_TYPE, 0, 1, 4326]);
    let nodata_off = bytes.next_data_offset();
    bytes.entry(tags::GDAL_NODATA, field_types::ASCII, 6, nodata_off);
    bytes.push_data(b"-9999\0");

    let info = parse_geo(bytes.build(), "geo-full");

    assert_eq!(info.epsg, 4326);
    assert_eq!(info.nodata, Some(-9999.0));
    assert!((info.transform.origin_x - 102.0).abs() < 1e-9);
    assert!((info.transform.origin_y - 18.0).abs() < 1e-9);
    assert!((info.transform.pixel_width - 0.1).abs() < 1e-9);
    assert!((info.transform.pixel_height + 0.1).abs() < 1e-9);
}

#[test]
fn projected_key_wins_over_geographic() {
    let mut bytes = TiffBytes::new(3);
    let scale_off = bytes.data_offset();
    bytes.entry(tags::MODEL_PIXEL_SCALE_TAG, field_types::DOUBLE, 3, scale_off);
    bytes.push_doubles(&[100.0, 100.0, 0.0]);
    let tie_off = bytes.next_data_offset();
    bytes.entry(tags::MODEL_TIEPOINT_TAG, field_types::DOUBLE, 6, tie_off);
    bytes.push_doubles(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    let keys_off = bytes.next_data_offset();
    bytes.entry(tags::GEO_KEY_DIRECTORY_TAG, field_types::SHORT, 12, keys_off);
    bytes.push_shorts(&[
        1, 1, 0, 2,
        geo_keys::GEOGRAPHIC_TYPE, 0, 1, 4326,
        geo_keys::PROJECTED_CS_TYPE, 0, 1, 3857,
    ]);

    let info = parse_geo(bytes.build(), "geo-projected");
    assert_eq!(info.epsg, 3857);
}

#[test]
fn missing_geokeys_default_to_wgs84() {
    let mut bytes = TiffBytes::new(2);
    let scale_off = bytes.data_offset();
    bytes.entry(tags::MODEL_PIXEL_SCALE_TAG, field_types::DOUBLE, 3, scale_off);
    bytes.push_doubles(&[1.0, 1.0, 0.0]);
    let tie_off = bytes.next_data_offset();
    bytes.entry(tags::MODEL_TIEPOINT_TAG, field_types::DOUBLE, 6, tie_off);
    bytes.push_doubles(&[0.0, 0.0, 0.0, 10.0, 20.0, 0.0]);

    let info = parse_geo(bytes.build(), "geo-nokeys");
    assert_eq!(info.epsg, 4326);
    assert_eq!(info.nodata, None);
}

#[test]
fn missing_georeferencing_is_an_error() {
    let mut bytes = TiffBytes::new(1);
    bytes.entry(tags::IMAGE_WIDTH, field_types::LONG, 1, 4);
    let buffer = bytes.build();

    let logger = test_logger("geo-missing");
    let mut reader = TiffReader::new(&logger);
    let mut cursor = Cursor::new(buffer);
    let tiff = reader.read(&mut cursor).unwrap();
    assert!(extract_geo_info(&reader, &mut cursor, &tiff.ifds[0]).is_err());
}
