//! Tests for the TIFF directory reader

use std::io::Cursor;

use crate::tiff::constants::{field_types, tags};
use crate::tiff::errors::TiffError;
use crate::tiff::reader::TiffReader;

use super::test_utils::{test_logger, TiffBytes};

#[test]
fn reads_minimal_little_endian_tiff() {
    let mut bytes = TiffBytes::new(2);
    bytes.entry(tags::IMAGE_WIDTH, field_types::LONG, 1, 200);
    bytes.entry(tags::IMAGE_LENGTH, field_types::LONG, 1, 100);
    let buffer = bytes.build();

    let logger = test_logger("reader-minimal");
    let mut reader = TiffReader::new(&logger);
    let tiff = reader.read(&mut Cursor::new(buffer)).unwrap();

    assert!(!tiff.is_big_tiff);
    assert_eq!(tiff.ifds.len(), 1);
    let ifd = tiff.primary_ifd().unwrap();
    assert_eq!(ifd.entries.len(), 2);
    assert_eq!(ifd.dimensions(), Some((200, 100)));
    assert_eq!(ifd.samples_per_pixel(), 1);
}

#[test]
fn reads_big_endian_header() {
    // Hand-built big-endian file: header + one-entry IFD (ImageWidth 7)
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&[0x4D, 0x4D]); // "MM"
    buffer.extend_from_slice(&42u16.to_be_bytes());
    buffer.extend_from_slice(&8u32.to_be_bytes());
    buffer.extend_from_slice(&1u16.to_be_bytes());
    buffer.extend_from_slice(&tags::IMAGE_WIDTH.to_be_bytes());
    buffer.extend_from_slice(&field_types::LONG.to_be_bytes());
    buffer.extend_from_slice(&1u32.to_be_bytes());
    buffer.extend_from_slice(&7u32.to_be_bytes());
    buffer.extend_from_slice(&0u32.to_be_bytes());

    let logger = test_logger("reader-bigendian");
    let mut reader = TiffReader::new(&logger);
    let tiff = reader.read(&mut Cursor::new(buffer)).unwrap();

    assert_eq!(tiff.ifds[0].tag_value(tags::IMAGE_WIDTH), Some(7));
}

/// Big-endian classic TIFF builder for the tests below; the value field
/// takes raw file bytes so inline values can be laid out left-justified
/// exactly as a writer would.
fn be_tiff(entries: &[(u16, u16, u32, [u8; 4])]) -> Vec<u8> {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&[0x4D, 0x4D]); // "MM"
    buffer.extend_from_slice(&42u16.to_be_bytes());
    buffer.extend_from_slice(&8u32.to_be_bytes());
    buffer.extend_from_slice(&(entries.len() as u16).to_be_bytes());
    for (tag, field_type, count, value) in entries {
        buffer.extend_from_slice(&tag.to_be_bytes());
        buffer.extend_from_slice(&field_type.to_be_bytes());
        buffer.extend_from_slice(&count.to_be_bytes());
        buffer.extend_from_slice(value);
    }
    buffer.extend_from_slice(&0u32.to_be_bytes());
    buffer
}

#[test]
fn big_endian_inline_short_is_not_shifted() {
    // A single SHORT sits in the first two bytes of the value field.
    // Reading the field as a whole u32 would yield 32 << 16; the value
    // must come back as plain 32.
    let buffer = be_tiff(&[
        (tags::IMAGE_WIDTH, field_types::LONG, 1, 4u32.to_be_bytes()),
        (tags::IMAGE_LENGTH, field_types::LONG, 1, 2u32.to_be_bytes()),
        (tags::BITS_PER_SAMPLE, field_types::SHORT, 1, [0x00, 0x20, 0x00, 0x00]),
    ]);

    let logger = test_logger("reader-be-inline-short");
    let mut reader = TiffReader::new(&logger);
    let tiff = reader.read(&mut Cursor::new(buffer)).unwrap();

    let ifd = tiff.primary_ifd().unwrap();
    assert_eq!(ifd.dimensions(), Some((4, 2)));
    assert_eq!(ifd.tag_value(tags::BITS_PER_SAMPLE), Some(32));
}

#[test]
fn big_endian_inline_short_arrays_unpack_in_file_order() {
    let buffer = be_tiff(&[
        (tags::STRIP_BYTE_COUNTS, field_types::SHORT, 2, [0x12, 0x34, 0x56, 0x78]),
    ]);

    let logger = test_logger("reader-be-inline-array");
    let mut reader = TiffReader::new(&logger);
    let mut cursor = Cursor::new(buffer);
    let tiff = reader.read(&mut cursor).unwrap();

    let values = reader
        .read_tag_values(&mut cursor, &tiff.ifds[0], tags::STRIP_BYTE_COUNTS)
        .unwrap();
    assert_eq!(values, vec![0x1234, 0x5678]);
}

#[test]
fn rejects_bad_byte_order_marker() {
    let buffer = vec![0x00, 0x11, 42, 0, 8, 0, 0, 0];
    let logger = test_logger("reader-badorder");
    let mut reader = TiffReader::new(&logger);
    let result = reader.read(&mut Cursor::new(buffer));
    assert!(matches!(result, Err(TiffError::InvalidByteOrder(_))));
}

#[test]
fn rejects_unknown_version() {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&[0x49, 0x49]);
    buffer.extend_from_slice(&99u16.to_le_bytes());
    buffer.extend_from_slice(&8u32.to_le_bytes());

    let logger = test_logger("reader-badversion");
    let mut reader = TiffReader::new(&logger);
    let result = reader.read(&mut Cursor::new(buffer));
    assert!(matches!(result, Err(TiffError::UnsupportedVersion(99))));
}

#[test]
fn unpacks_inline_short_arrays() {
    // Two SHORT values fit inside the 4-byte inline field; the reader
    // must split them back out in file order.
    let mut bytes = TiffBytes::new(1);
    let packed = u32::from_le_bytes([0x34, 0x12, 0x78, 0x56]); // 0x1234, 0x5678
    bytes.entry(tags::STRIP_BYTE_COUNTS, field_types::SHORT, 2, packed);
    let buffer = bytes.build();

    let logger = test_logger("reader-inline");
    let mut reader = TiffReader::new(&logger);
    let mut cursor = Cursor::new(buffer);
    let tiff = reader.read(&mut cursor).unwrap();

    let values = reader
        .read_tag_values(&mut cursor, &tiff.ifds[0], tags::STRIP_BYTE_COUNTS)
        .unwrap();
    assert_eq!(values, vec![0x1234, 0x5678]);
}

#[test]
fn reads_external_double_array() {
    let mut bytes = TiffBytes::new(1);
    let offset = bytes.data_offset();
    bytes.entry(tags::MODEL_PIXEL_SCALE_TAG, field_types::DOUBLE, 3, offset);
    bytes.push_doubles(&[0.25, 0.5, 0.0]);
    let buffer = bytes.build();

    let logger = test_logger("reader-doubles");
    let mut reader = TiffReader::new(&logger);
    let mut cursor = Cursor::new(buffer);
    let tiff = reader.read(&mut cursor).unwrap();

    let values = reader
        .read_tag_doubles(&mut cursor, &tiff.ifds[0], tags::MODEL_PIXEL_SCALE_TAG)
        .unwrap();
    assert_eq!(values, vec![0.25, 0.5, 0.0]);
}

#[test]
fn missing_tag_is_reported() {
    let mut bytes = TiffBytes::new(1);
    bytes.entry(tags::IMAGE_WIDTH, field_types::LONG, 1, 4);
    let buffer = bytes.build();

    let logger = test_logger("reader-missingtag");
    let mut reader = TiffReader::new(&logger);
    let mut cursor = Cursor::new(buffer);
    let tiff = reader.read(&mut cursor).unwrap();

    let result = reader.read_tag_values(&mut cursor, &tiff.ifds[0], tags::STRIP_OFFSETS);
    assert!(matches!(result, Err(TiffError::TagNotFound(t)) if t == tags::STRIP_OFFSETS));
}
