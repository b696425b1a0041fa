//! Compact transport codec - raw DEFLATE + URL-safe base64
//!
//! Only keeps share links short. The input is already encrypted; nothing
//! here protects anything.

use std::io::{Read, Write};

use base64::Engine;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;

use crate::domain::result::{Error, Result};

/// Largest envelope a token may inflate to
pub const MAX_DECODED_LEN: u64 = 4 * 1024 * 1024;

/// Compress bytes and encode them as a URL-safe token without padding
pub fn to_token(bytes: &[u8]) -> Result<String> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(bytes)?;
    let compressed = encoder.finish()?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(compressed))
}

/// Inverse of [`to_token`]. Trailing `=` padding and surrounding whitespace
/// are tolerated.
pub fn from_token(token: &str) -> Result<Vec<u8>> {
    let trimmed = token.trim().trim_end_matches('=');
    let compressed = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(trimmed)
        .map_err(|e| Error::transport(format!("Invalid token encoding: {}", e)))?;

    let mut decoder = DeflateDecoder::new(compressed.as_slice()).take(MAX_DECODED_LEN + 1);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| Error::transport(format!("Invalid compressed data: {}", e)))?;
    if out.len() as u64 > MAX_DECODED_LEN {
        return Err(Error::transport("Shared data is too large"));
    }
    Ok(out)
}
