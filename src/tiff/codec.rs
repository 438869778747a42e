//! Strip/tile compression codecs
//!
//! Model rasters arrive uncompressed, deflate-compressed or (more
//! recently) zstd-compressed. Each scheme is a strategy behind the
//! `Codec` trait; `codec_for` resolves the TIFF compression code to the
//! right handler.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::tiff::constants::compression;
use crate::tiff::errors::{TiffError, TiffResult};

/// Strategy trait for a strip/tile compression scheme
pub trait Codec: Send + Sync {
    /// Decompress a raw strip or tile
    fn decode(&self, data: &[u8]) -> TiffResult<Vec<u8>>;

    /// Compress a raw strip or tile
    fn encode(&self, data: &[u8]) -> TiffResult<Vec<u8>>;

    /// Human-readable name of this scheme
    fn name(&self) -> &'static str;

    /// TIFF compression code of this scheme
    fn code(&self) -> u16;
}

/// Pass-through codec (compression code 1)
pub struct IdentityCodec;

impl Codec for IdentityCodec {
    fn decode(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn encode(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn name(&self) -> &'static str {
        "uncompressed"
    }

    fn code(&self) -> u16 {
        compression::NONE
    }
}

/// Adobe Deflate (zlib) codec (compression code 8)
pub struct DeflateCodec;

impl Codec for DeflateCodec {
    fn decode(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(data);
        let mut decoded = Vec::new();
        decoder.read_to_end(&mut decoded).map_err(TiffError::IoError)?;
        Ok(decoded)
    }

    fn encode(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).map_err(TiffError::IoError)?;
        encoder.finish().map_err(TiffError::IoError)
    }

    fn name(&self) -> &'static str {
        "deflate"
    }

    fn code(&self) -> u16 {
        compression::DEFLATE
    }
}

/// Zstandard codec (compression code 14)
pub struct ZstdCodec {
    level: i32,
}

impl ZstdCodec {
    pub fn new() -> Self {
        ZstdCodec { level: 3 }
    }
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for ZstdCodec {
    fn decode(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        zstd::stream::decode_all(data)
            .map_err(|e| TiffError::GenericError(format!("Zstd decompression failed: {}", e)))
    }

    fn encode(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        zstd::stream::encode_all(data, self.level)
            .map_err(|e| TiffError::GenericError(format!("Zstd compression failed: {}", e)))
    }

    fn name(&self) -> &'static str {
        "zstd"
    }

    fn code(&self) -> u16 {
        compression::ZSTD
    }
}

/// Resolves a TIFF compression code to a codec
pub fn codec_for(code: u64) -> TiffResult<Box<dyn Codec>> {
    match code {
        c if c == compression::NONE as u64 => Ok(Box::new(IdentityCodec)),
        c if c == compression::DEFLATE as u64 => Ok(Box::new(DeflateCodec)),
        c if c == compression::ZSTD as u64 => Ok(Box::new(ZstdCodec::new())),
        other => Err(TiffError::UnsupportedCompression(other)),
    }
}

/// Resolves a codec by name, for CLI and configuration use
pub fn codec_by_name(name: &str) -> TiffResult<Box<dyn Codec>> {
    match name.to_lowercase().as_str() {
        "uncompressed" | "none" => Ok(Box::new(IdentityCodec)),
        "deflate" | "zip" => Ok(Box::new(DeflateCodec)),
        "zstd" => Ok(Box::new(ZstdCodec::new())),
        other => Err(TiffError::GenericError(format!("Unknown compression type: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deflate_round_trip() {
        let codec = DeflateCodec;
        let data: Vec<u8> = (0u8..255).cycle().take(4096).collect();
        let packed = codec.encode(&data).unwrap();
        assert!(packed.len() < data.len());
        assert_eq!(codec.decode(&packed).unwrap(), data);
    }

    #[test]
    fn zstd_round_trip() {
        let codec = ZstdCodec::new();
        let data = vec![7u8; 1000];
        let packed = codec.encode(&data).unwrap();
        assert_eq!(codec.decode(&packed).unwrap(), data);
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert!(matches!(codec_for(5), Err(TiffError::UnsupportedCompression(5))));
    }
}
