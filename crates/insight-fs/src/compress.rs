//! Gzip compression of byte buffers
//!
//! Each call produces or consumes exactly one self-contained gzip member.

use crate::{Error, Result};
use flate2::Compression;
use flate2::bufread::GzDecoder;
use flate2::write::GzEncoder;
use std::io::{Cursor, Read, Write};

/// gzip magic bytes (RFC 1952).
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
/// Fixed header plus CRC32/ISIZE trailer.
const GZIP_MIN_LEN: usize = 18;

/// Compress `data` into a single gzip member.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let buffer = Vec::with_capacity(data.len() / 2 + GZIP_MIN_LEN);
    let mut encoder = GzEncoder::new(buffer, Compression::default());
    encoder.write_all(data).map_err(corrupt)?;
    encoder.finish().map_err(corrupt)
}

/// Decompress a buffer produced by [`compress`].
///
/// # Errors
///
/// [`Error::CorruptStream`] if the input is not a complete, valid gzip
/// member, including checksum and length mismatches, or if anything
/// follows that member.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < GZIP_MIN_LEN || data[..2] != GZIP_MAGIC {
        return Err(Error::CorruptStream {
            message: "missing gzip header".into(),
        });
    }

    let mut decoder = GzDecoder::new(Cursor::new(data));
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).map_err(corrupt)?;

    let consumed = decoder.into_inner().position();
    if consumed != data.len() as u64 {
        return Err(Error::CorruptStream {
            message: format!("{} trailing bytes after gzip member", data.len() as u64 - consumed),
        });
    }
    Ok(out)
}

fn corrupt(e: std::io::Error) -> Error {
    Error::CorruptStream {
        message: e.to_string(),
    }
}
