// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Optional lossless compression stage.
//!
//! Data is Brotli-compressed and the result is kept only when it is strictly
//! smaller than the input. The returned flag is recorded in the envelope so
//! the reveal side knows whether to invert the stage.

use std::io::{Read, Write};

use crate::stego::error::StegoError;

/// Brotli compression quality (0-11). 11 = max compression.
const BROTLI_QUALITY: u32 = 11;

/// Brotli LG_WINDOW_SIZE. 22 is the default (4 MB window).
const BROTLI_LG_WINDOW_SIZE: u32 = 22;

/// Upper bound on decompressed output, against decompression bombs.
pub const MAX_DECOMPRESSED_BYTES: usize = 64 * 1024 * 1024;

/// Name of the compressor, as reported to callers.
pub const COMPRESSOR_NAME: &str = "brotli";

/// Compress `data`, keeping the result only if it helps.
///
/// Returns `(output, was_compressed)`. When compression does not shrink the
/// input, `output` is the original bytes and the flag is `false`.
pub fn compress(data: &[u8]) -> (Vec<u8>, bool) {
    let compressed = compress_brotli(data);
    if compressed.len() < data.len() {
        log::trace!("brotli: {} -> {} bytes, keeping", data.len(), compressed.len());
        (compressed, true)
    } else {
        log::trace!("brotli: {} -> {} bytes, skipping", data.len(), compressed.len());
        (data.to_vec(), false)
    }
}

/// Invert [`compress`]. A no-op when `was_compressed` is `false`.
///
/// # Errors
/// [`StegoError::Decode`] if the stream is malformed or expands beyond
/// [`MAX_DECOMPRESSED_BYTES`].
pub fn decompress(data: &[u8], was_compressed: bool) -> Result<Vec<u8>, StegoError> {
    if !was_compressed {
        return Ok(data.to_vec());
    }
    let mut output = Vec::new();
    let decompressor = brotli::Decompressor::new(data, 4096);
    decompressor
        .take(MAX_DECOMPRESSED_BYTES as u64 + 1)
        .read_to_end(&mut output)
        .map_err(|_| StegoError::Decode)?;
    if output.len() > MAX_DECOMPRESSED_BYTES {
        return Err(StegoError::Decode);
    }
    Ok(output)
}

/// `original / compressed`, or 1.0 for an empty compressed size.
pub fn compression_ratio(original_size: usize, compressed_size: usize) -> f64 {
    if compressed_size == 0 {
        return 1.0;
    }
    original_size as f64 / compressed_size as f64
}

fn compress_brotli(data: &[u8]) -> Vec<u8> {
    let mut output = Vec::new();
    {
        let mut compressor = brotli::CompressorWriter::new(
            &mut output,
            4096, // buffer size
            BROTLI_QUALITY,
            BROTLI_LG_WINDOW_SIZE,
        );
        compressor
            .write_all(data)
            .expect("in-memory Brotli compression should not fail");
        // CompressorWriter flushes on drop
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repetitive_text_compresses() {
        let data = "abcdefghij".repeat(100);
        let (out, compressed) = compress(data.as_bytes());
        assert!(compressed);
        assert!(out.len() < data.len());
        assert_eq!(decompress(&out, true).unwrap(), data.as_bytes());
    }

    #[test]
    fn short_input_is_skipped() {
        let (out, compressed) = compress(b"hi");
        assert!(!compressed);
        assert_eq!(out, b"hi");
    }

    #[test]
    fn empty_input_is_skipped() {
        let (out, compressed) = compress(b"");
        assert!(!compressed);
        assert!(out.is_empty());
        assert!(decompress(&out, false).unwrap().is_empty());
    }

    #[test]
    fn skip_roundtrip_is_identity() {
        let data: Vec<u8> = (0u16..200).map(|i| (i.wrapping_mul(7919) % 256) as u8).collect();
        let (out, compressed) = compress(&data);
        assert_eq!(decompress(&out, compressed).unwrap(), data);
    }

    #[test]
    fn truncated_stream_is_decode_error() {
        let data = "The quick brown fox jumps over the lazy dog. ".repeat(50);
        let (out, compressed) = compress(data.as_bytes());
        assert!(compressed);
        let truncated = &out[..out.len() / 2];
        assert!(matches!(decompress(truncated, true), Err(StegoError::Decode)));
    }

    #[test]
    fn uncompressed_flag_never_touches_data() {
        let garbage = [0xFFu8, 0xFF, 0xFF];
        assert_eq!(decompress(&garbage, false).unwrap(), garbage);
    }

    #[test]
    fn ratio() {
        assert_eq!(compression_ratio(100, 50), 2.0);
        assert_eq!(compression_ratio(10, 0), 1.0);
    }
}
