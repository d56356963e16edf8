// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Hide/reveal pipeline.
//!
//! Hide:
//! 1. Compute the carrier capacity for the requested depth and channels.
//! 2. Build the envelope (compress → repeat → encrypt → serialize).
//! 3. Check the hard bit capacity, then the caller's soft limits.
//! 4. Embed into a copy of the cover.
//!
//! Reveal runs in two phases because the envelope length and its embedding
//! configuration are only known after the header has been read:
//! 1. Locate: probe a bounded prefix at depth 1 / all channels. If no magic
//!    shows up there, or it leads to no readable envelope, try every
//!    depth/channel configuration and accept the first whose header records
//!    that same configuration.
//! 2. Re-extract exactly the envelope's declared length at the recorded
//!    configuration, parse it, then open → de-repeat → decompress.
//!
//! Nothing here keeps state between calls.

use image::RgbImage;

use crate::stego::capacity::carrier_capacity;
use crate::stego::channel::{BitDepth, ChannelSet};
use crate::stego::compress::{self, COMPRESSOR_NAME};
use crate::stego::crypto::{self, CIPHER_NAME, KDF_NAME};
use crate::stego::envelope::{self, Envelope, EnvelopeHeader, PayloadType, FIXED_HEADER_LEN, MAGIC};
use crate::stego::error::{CapacityError, StegoError};
use crate::stego::options::{RevealOptions, StegoOptions};
use crate::stego::pack;
use crate::stego::repetition;

/// Upper bound on the phase-1 probe read, in bytes.
pub const PROBE_PREFIX_BYTES: usize = 4096;

/// Filename reported for file payloads hidden without a name.
pub const DEFAULT_RECOVERED_FILENAME: &str = "recovered.bin";

/// Summary of a completed hide operation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HideReport {
    /// Carrier bits overwritten by the envelope.
    pub used_capacity_bits: usize,
    /// Size of the caller's data before any transform.
    pub payload_size_bytes: usize,
    /// Envelope size minus payload size. Negative when compression won more
    /// than the header costs.
    pub overhead_bytes: i64,
    pub encrypted: bool,
    pub encryption: Option<&'static str>,
    pub kdf: Option<&'static str>,
    pub compression: Option<&'static str>,
    pub compression_ratio: f64,
    pub channels_used: ChannelSet,
    pub bits_per_channel: BitDepth,
}

/// A revealed payload of either type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Revealed {
    pub payload_type: PayloadType,
    /// Empty for text payloads and for files hidden without a name.
    pub filename: String,
    pub data: Vec<u8>,
    pub encrypted: bool,
    pub was_compressed: bool,
    pub channels_used: ChannelSet,
    pub bits_per_channel: BitDepth,
}

/// A revealed text payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RevealedText {
    pub text: String,
    pub was_compressed: bool,
    pub channels_used: ChannelSet,
    pub bits_per_channel: BitDepth,
}

/// A revealed file payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RevealedFile {
    pub filename: String,
    pub data: Vec<u8>,
    pub was_compressed: bool,
    pub channels_used: ChannelSet,
    pub bits_per_channel: BitDepth,
}

/// Hide a UTF-8 text message.
///
/// Returns the stego carrier and a report; `cover` is never modified.
///
/// # Errors
/// - [`StegoError::Capacity`] if the envelope breaks a soft limit or does not
///   fit the carrier.
/// - [`StegoError::InvalidParameter`] if the envelope cannot be serialized.
pub fn hide_text(
    cover: &RgbImage,
    text: &str,
    options: &StegoOptions,
) -> Result<(RgbImage, HideReport), StegoError> {
    hide_impl(cover, PayloadType::Text, text.as_bytes(), None, options)
}

/// Hide an arbitrary file under `filename`.
///
/// The name is stored verbatim (UTF-8, at most 65535 bytes). Callers writing
/// revealed files to disk must sanitize it themselves.
pub fn hide_file(
    cover: &RgbImage,
    filename: &str,
    data: &[u8],
    options: &StegoOptions,
) -> Result<(RgbImage, HideReport), StegoError> {
    hide_impl(cover, PayloadType::File, data, Some(filename), options)
}

fn hide_impl(
    cover: &RgbImage,
    payload_type: PayloadType,
    data: &[u8],
    filename: Option<&str>,
    options: &StegoOptions,
) -> Result<(RgbImage, HideReport), StegoError> {
    let depth = options.bits_per_channel;
    let channels = options.channels;
    let cap = carrier_capacity(cover, depth, channels);

    let built = envelope::build(payload_type, data, filename, options)?;
    let envelope_len = built.bytes.len();

    let needed_bits = envelope_len * 8;
    if needed_bits > cap.total_bits {
        return Err(CapacityError::Exceeded { needed_bits, available_bits: cap.total_bits }.into());
    }

    let pixels = cover.width() as usize * cover.height() as usize;
    options.limits.check(pixels, envelope_len, cap.total_bytes)?;

    let stego = pack::embed_into(cover, &built.bytes, depth, channels)?;

    let encrypted = options.password.as_deref().is_some_and(|p| !p.is_empty());
    log::debug!(
        "hid {payload_type} payload: {} bytes in {needed_bits}/{} bits (depth {depth}, channels {channels})",
        data.len(),
        cap.total_bits,
    );

    let report = HideReport {
        used_capacity_bits: needed_bits,
        payload_size_bytes: data.len(),
        overhead_bytes: envelope_len as i64 - data.len() as i64,
        encrypted,
        encryption: encrypted.then_some(CIPHER_NAME),
        kdf: encrypted.then_some(KDF_NAME),
        compression: built.compressed.then_some(COMPRESSOR_NAME),
        compression_ratio: built.compression_ratio,
        channels_used: channels,
        bits_per_channel: depth,
    };
    Ok((stego, report))
}

/// Where an envelope sits and how large it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub header: EnvelopeHeader,
    pub channels: ChannelSet,
}

impl Located {
    pub fn bits_per_channel(&self) -> BitDepth {
        self.header.bits_per_channel
    }
}

/// Phase 1: find the envelope header without caller hints.
///
/// # Errors
/// [`StegoError::Format`] if no configuration yields a consistent header
/// followed by a readable envelope.
pub fn locate(carrier: &RgbImage) -> Result<Located, StegoError> {
    let dense_depth = BitDepth::MIN;
    let dense = ChannelSet::all();
    let dense_bytes = carrier_capacity(carrier, dense_depth, dense).total_bytes;
    let prefix_len = dense_bytes.min(PROBE_PREFIX_BYTES);
    let prefix = pack::extract(carrier, prefix_len * 8, dense_depth, dense)?;

    if prefix.starts_with(MAGIC) {
        if let Some(located) = accept_at(carrier, dense_depth, dense) {
            log::debug!("dense probe found envelope");
            return Ok(located);
        }
        log::debug!("dense probe marker does not lead to a readable envelope; sweeping");
    }

    for depth in BitDepth::every() {
        for channels in ChannelSet::every() {
            if depth == dense_depth && channels == dense {
                continue;
            }
            if let Some(located) = accept_at(carrier, depth, channels) {
                log::debug!("configuration sweep found envelope: depth {depth}, channels {channels}");
                return Ok(located);
            }
        }
    }
    Err(StegoError::Format("no STEG2 envelope found"))
}

/// Accept a configuration only if its header records that same configuration
/// and the whole envelope it declares can be read back.
///
/// A stale marker from an earlier envelope can survive in bits a newer
/// envelope did not overwrite; such a header fails one of these checks.
fn accept_at(carrier: &RgbImage, depth: BitDepth, channels: ChannelSet) -> Option<Located> {
    let header = probe_at(carrier, depth, channels)?;
    let located = Located { header, channels };
    read_envelope(carrier, &located).ok().map(|_| located)
}

/// Read the header at one configuration and accept it only if it records
/// that same configuration.
fn probe_at(carrier: &RgbImage, depth: BitDepth, channels: ChannelSet) -> Option<EnvelopeHeader> {
    let fixed = read_prefix(carrier, FIXED_HEADER_LEN, depth, channels).ok()?;
    let header = EnvelopeHeader::parse(&fixed).ok()?;
    if header.bits_per_channel != depth || header.channels_len as usize != channels.len() {
        return None;
    }
    let meta = read_prefix(carrier, header.metadata_len(), depth, channels).ok()?;
    let recorded = header.parse_channels(&meta).ok()?;
    (recorded == channels).then_some(header)
}

/// Extract the first `len` envelope bytes, or `Format` if the carrier is too small.
fn read_prefix(carrier: &RgbImage, len: usize, depth: BitDepth, channels: ChannelSet) -> Result<Vec<u8>, StegoError> {
    let bits = len.saturating_mul(8);
    if bits > carrier_capacity(carrier, depth, channels).total_bits {
        return Err(StegoError::Format("declared envelope length exceeds carrier capacity"));
    }
    pack::extract(carrier, bits, depth, channels)
}

/// Phase 2: re-extract the whole envelope at its recorded configuration.
pub fn read_envelope(carrier: &RgbImage, located: &Located) -> Result<Envelope, StegoError> {
    let raw = read_prefix(carrier, located.header.total_len(), located.bits_per_channel(), located.channels)?;
    Envelope::parse(&raw)
}

/// Reveal whatever payload the carrier holds.
///
/// # Errors
/// - [`StegoError::Format`] if no valid envelope is found.
/// - [`StegoError::Authentication`] for a wrong or missing password, or a
///   tampered ciphertext.
/// - [`StegoError::Corruption`] if the repetition level does not match.
/// - [`StegoError::Decode`] if the decompression stage fails.
pub fn reveal(carrier: &RgbImage, options: &RevealOptions) -> Result<Revealed, StegoError> {
    let located = locate(carrier)?;
    let envelope = read_envelope(carrier, &located)?;
    log::debug!(
        "parsed {} envelope: {} body bytes (compressed={}, encrypted={})",
        envelope.payload_type,
        envelope.body.len(),
        envelope.compressed,
        !envelope.salt.is_empty(),
    );

    let opened = crypto::open(&envelope.body, options.password.as_deref(), &envelope.salt, &envelope.nonce)?;
    let unrepeated = repetition::decode(&opened, options.error_correction)?;
    let data = compress::decompress(&unrepeated, envelope.compressed)?;

    Ok(Revealed {
        payload_type: envelope.payload_type,
        filename: envelope.filename,
        data,
        encrypted: !envelope.salt.is_empty(),
        was_compressed: envelope.compressed,
        channels_used: envelope.channels,
        bits_per_channel: envelope.bits_per_channel,
    })
}

/// Reveal a text payload.
///
/// # Errors
/// Everything [`reveal`] returns, plus [`StegoError::WrongPayloadType`] for
/// a file payload and [`StegoError::InvalidUtf8`] for non-UTF-8 data.
pub fn reveal_text(carrier: &RgbImage, options: &RevealOptions) -> Result<RevealedText, StegoError> {
    let revealed = reveal(carrier, options)?;
    if revealed.payload_type != PayloadType::Text {
        return Err(StegoError::WrongPayloadType { expected: PayloadType::Text, found: revealed.payload_type });
    }
    let text = String::from_utf8(revealed.data).map_err(|_| StegoError::InvalidUtf8)?;
    Ok(RevealedText {
        text,
        was_compressed: revealed.was_compressed,
        channels_used: revealed.channels_used,
        bits_per_channel: revealed.bits_per_channel,
    })
}

/// Reveal a file payload. An empty stored name becomes
/// [`DEFAULT_RECOVERED_FILENAME`].
pub fn reveal_file(carrier: &RgbImage, options: &RevealOptions) -> Result<RevealedFile, StegoError> {
    let revealed = reveal(carrier, options)?;
    if revealed.payload_type != PayloadType::File {
        return Err(StegoError::WrongPayloadType { expected: PayloadType::File, found: revealed.payload_type });
    }
    let filename = if revealed.filename.is_empty() {
        DEFAULT_RECOVERED_FILENAME.to_string()
    } else {
        revealed.filename
    };
    Ok(RevealedFile {
        filename,
        data: revealed.data,
        was_compressed: revealed.was_compressed,
        channels_used: revealed.channels_used,
        bits_per_channel: revealed.bits_per_channel,
    })
}
