//! Base64 + zlib decoding of the export payload.

use super::error::{DecodeError, DecompressionError, LoadError};
use base64::Engine;
use flate2::read::ZlibDecoder;
use std::io::Read;

/// Default bound on inflated payload size (32 MiB).
pub const DEFAULT_MAX_DECOMPRESSED_BYTES: usize = 32 * 1024 * 1024;

/// Two-stage decoder: standard base64, then zlib inflate.
#[derive(Debug, Clone, Copy)]
pub struct PayloadDecoder {
    max_decompressed_bytes: usize,
}

impl Default for PayloadDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DECOMPRESSED_BYTES)
    }
}

impl PayloadDecoder {
    /// Create a decoder that refuses to inflate beyond `max_decompressed_bytes`.
    pub fn new(max_decompressed_bytes: usize) -> Self {
        Self {
            max_decompressed_bytes,
        }
    }

    /// Decode an extracted export payload into raw JSON bytes.
    ///
    /// # Errors
    ///
    /// [`LoadError::Decode`] for bad base64, [`LoadError::Decompression`] for
    /// a bad zlib stream or an over-sized result.
    pub fn decode(&self, payload: &[u8]) -> Result<Vec<u8>, LoadError> {
        let compressed = decode_base64(payload)?;
        let raw = inflate(&compressed, self.max_decompressed_bytes)?;
        Ok(raw)
    }
}

/// Standard-alphabet, padded base64 decode.
///
/// # Errors
///
/// [`DecodeError::InvalidEncoding`] for empty or malformed input.
pub fn decode_base64(payload: &[u8]) -> Result<Vec<u8>, DecodeError> {
    if payload.is_empty() {
        return Err(DecodeError::InvalidEncoding {
            reason: "nil or empty byte array".to_owned(),
        });
    }

    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| DecodeError::InvalidEncoding {
            reason: e.to_string(),
        })
}

/// Inflate a zlib-framed DEFLATE stream, reading at most `limit` bytes.
///
/// # Errors
///
/// [`DecompressionError::Corrupt`] for a bad header or stream,
/// [`DecompressionError::TooLarge`] when output would exceed `limit`.
pub fn inflate(data: &[u8], limit: usize) -> Result<Vec<u8>, DecompressionError> {
    // One extra byte distinguishes "exactly at the limit" from "over it".
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    let mut reader = ZlibDecoder::new(data).take(cap);

    let mut out = Vec::new();
    reader
        .read_to_end(&mut out)
        .map_err(|e| DecompressionError::Corrupt {
            reason: e.to_string(),
        })?;

    if out.len() > limit {
        return Err(DecompressionError::TooLarge { limit });
    }

    Ok(out)
}
