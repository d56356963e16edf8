// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Payload envelope construction and parsing.
//!
//! The envelope is the self-describing binary container written into the
//! carrier bits. All integers are big-endian:
//!
//! ```text
//! [5 bytes ] magic "STEG2"
//! [1 byte  ] format version (2)
//! [4 bytes ] payload type (1 = text, 2 = file)
//! [4 bytes ] body length
//! [1 byte  ] compressed flag (0/1)
//! [1 byte  ] bits per channel used (1–8)
//! [2 bytes ] salt length
//! [2 bytes ] nonce length
//! [2 bytes ] filename length
//! [1 byte  ] channel string length
//! [S bytes ] salt          (empty without password)
//! [N bytes ] nonce         (empty without password)
//! [F bytes ] filename      (UTF-8, empty for text)
//! [C bytes ] channel string, e.g. "R", "RGB"
//! [L bytes ] body          (ciphertext, or plaintext without password)
//! ```
//!
//! The fixed part is 23 bytes. Depth and channel selection are recorded in
//! the header so extraction needs nothing from the caller but the password.

use core::fmt;

use crate::stego::channel::{BitDepth, ChannelSet};
use crate::stego::compress::{self, compression_ratio};
use crate::stego::crypto;
use crate::stego::error::StegoError;
use crate::stego::repetition;
use crate::stego::StegoOptions;

/// Format marker at the start of every envelope.
pub const MAGIC: &[u8; 5] = b"STEG2";
/// Envelope format version.
pub const VERSION: u8 = 2;
/// magic(5) + version(1) + type(4) + body_len(4) + compressed(1) + bpc(1)
/// + salt_len(2) + nonce_len(2) + filename_len(2) + channels_len(1) = 23.
pub const FIXED_HEADER_LEN: usize = 5 + 1 + 4 + 4 + 1 + 1 + 2 + 2 + 2 + 1;

/// Kind of data carried by an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PayloadType {
    Text = 1,
    File = 2,
}

impl PayloadType {
    pub fn from_u32(v: u32) -> Option<PayloadType> {
        match v {
            1 => Some(PayloadType::Text),
            2 => Some(PayloadType::File),
            _ => None,
        }
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadType::Text => f.write_str("text"),
            PayloadType::File => f.write_str("file"),
        }
    }
}

/// The fixed-width part of an envelope.
///
/// Enough to compute where every variable field lives and how long the whole
/// envelope is, which is what the two-phase extraction needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeHeader {
    pub payload_type: PayloadType,
    pub body_len: u32,
    pub compressed: bool,
    pub bits_per_channel: BitDepth,
    pub salt_len: u16,
    pub nonce_len: u16,
    pub filename_len: u16,
    pub channels_len: u8,
}

impl EnvelopeHeader {
    /// Parse the fixed header from the start of `data`.
    ///
    /// # Errors
    /// [`StegoError::Format`] for a missing magic marker, an unknown version
    /// or payload type, an invalid depth or channel-string length, or fewer
    /// than [`FIXED_HEADER_LEN`] bytes.
    pub fn parse(data: &[u8]) -> Result<EnvelopeHeader, StegoError> {
        if data.len() < MAGIC.len() || &data[..MAGIC.len()] != MAGIC {
            return Err(StegoError::Format("missing STEG2 marker"));
        }
        if data.len() < FIXED_HEADER_LEN {
            return Err(StegoError::Format("truncated header"));
        }
        let mut r = FieldReader::new(&data[MAGIC.len()..FIXED_HEADER_LEN]);
        let version = r.u8();
        if version != VERSION {
            return Err(StegoError::Format("unsupported envelope version"));
        }
        let payload_type = PayloadType::from_u32(r.u32())
            .ok_or(StegoError::Format("unknown payload type"))?;
        let body_len = r.u32();
        let compressed = match r.u8() {
            0 => false,
            1 => true,
            _ => return Err(StegoError::Format("invalid compressed flag")),
        };
        let bits_per_channel = BitDepth::new(r.u8())
            .map_err(|_| StegoError::Format("bits per channel out of range"))?;
        let salt_len = r.u16();
        let nonce_len = r.u16();
        let filename_len = r.u16();
        let channels_len = r.u8();
        if !(1..=3).contains(&channels_len) {
            return Err(StegoError::Format("invalid channel string length"));
        }
        Ok(EnvelopeHeader {
            payload_type,
            body_len,
            compressed,
            bits_per_channel,
            salt_len,
            nonce_len,
            filename_len,
            channels_len,
        })
    }

    /// Bytes up to and including the channel string.
    pub fn metadata_len(&self) -> usize {
        FIXED_HEADER_LEN
            + self.salt_len as usize
            + self.nonce_len as usize
            + self.filename_len as usize
            + self.channels_len as usize
    }

    /// Length of the complete envelope.
    pub fn total_len(&self) -> usize {
        self.metadata_len() + self.body_len as usize
    }

    /// Parse the channel string that follows the fixed header.
    ///
    /// `data` must start at the envelope start and hold at least
    /// [`metadata_len`](Self::metadata_len) bytes.
    pub fn parse_channels(&self, data: &[u8]) -> Result<ChannelSet, StegoError> {
        let end = self.metadata_len();
        let start = end - self.channels_len as usize;
        let raw = data.get(start..end).ok_or(StegoError::Format("truncated channel string"))?;
        core::str::from_utf8(raw)
            .ok()
            .and_then(|s| s.parse::<ChannelSet>().ok())
            .ok_or(StegoError::Format("invalid channel string"))
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(MAGIC);
        out.push(VERSION);
        out.extend_from_slice(&(self.payload_type as u32).to_be_bytes());
        out.extend_from_slice(&self.body_len.to_be_bytes());
        out.push(self.compressed as u8);
        out.push(self.bits_per_channel.get());
        out.extend_from_slice(&self.salt_len.to_be_bytes());
        out.extend_from_slice(&self.nonce_len.to_be_bytes());
        out.extend_from_slice(&self.filename_len.to_be_bytes());
        out.push(self.channels_len);
    }
}

/// Fully parsed envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub payload_type: PayloadType,
    pub compressed: bool,
    pub bits_per_channel: BitDepth,
    pub channels: ChannelSet,
    pub salt: Vec<u8>,
    pub nonce: Vec<u8>,
    pub filename: String,
    /// Ciphertext, or plaintext if the envelope is not encrypted.
    pub body: Vec<u8>,
}

impl Envelope {
    /// Compute the fixed header for this envelope.
    ///
    /// # Errors
    /// [`StegoError::InvalidParameter`] if a variable field is too long for
    /// its length slot.
    pub fn header(&self) -> Result<EnvelopeHeader, StegoError> {
        let too_long = |what| StegoError::InvalidParameter(what);
        Ok(EnvelopeHeader {
            payload_type: self.payload_type,
            body_len: u32::try_from(self.body.len()).map_err(|_| too_long("payload exceeds 4 GiB"))?,
            compressed: self.compressed,
            bits_per_channel: self.bits_per_channel,
            salt_len: u16::try_from(self.salt.len()).map_err(|_| too_long("salt too long"))?,
            nonce_len: u16::try_from(self.nonce.len()).map_err(|_| too_long("nonce too long"))?,
            filename_len: u16::try_from(self.filename.len())
                .map_err(|_| too_long("filename longer than 65535 bytes"))?,
            channels_len: self.channels.len() as u8,
        })
    }

    /// Serialize to the on-carrier byte layout.
    pub fn to_bytes(&self) -> Result<Vec<u8>, StegoError> {
        let header = self.header()?;
        let mut out = Vec::with_capacity(header.total_len());
        header.write(&mut out);
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(self.filename.as_bytes());
        out.extend_from_slice(self.channels.to_string().as_bytes());
        out.extend_from_slice(&self.body);
        debug_assert_eq!(out.len(), header.total_len());
        Ok(out)
    }

    /// Parse an envelope from raw extracted bytes.
    ///
    /// `raw` may be longer than the envelope (e.g. zero padding from bit
    /// extraction); trailing bytes are ignored.
    ///
    /// # Errors
    /// [`StegoError::Format`] if the header is invalid or any declared length
    /// runs past the end of `raw`.
    pub fn parse(raw: &[u8]) -> Result<Envelope, StegoError> {
        let header = EnvelopeHeader::parse(raw)?;
        if raw.len() < header.total_len() {
            return Err(StegoError::Format("declared lengths exceed available data"));
        }
        let mut r = FieldReader::new(&raw[FIXED_HEADER_LEN..header.total_len()]);
        let salt = r.bytes(header.salt_len as usize).to_vec();
        let nonce = r.bytes(header.nonce_len as usize).to_vec();
        let filename = String::from_utf8(r.bytes(header.filename_len as usize).to_vec())
            .map_err(|_| StegoError::Format("filename is not valid UTF-8"))?;
        r.bytes(header.channels_len as usize);
        let body = r.bytes(header.body_len as usize).to_vec();
        let channels = header.parse_channels(raw)?;

        Ok(Envelope {
            payload_type: header.payload_type,
            compressed: header.compressed,
            bits_per_channel: header.bits_per_channel,
            channels,
            salt,
            nonce,
            filename,
            body,
        })
    }
}

/// Output of [`build`].
#[derive(Debug, Clone)]
pub struct BuiltEnvelope {
    pub bytes: Vec<u8>,
    /// Whether the compression stage kept its output.
    pub compressed: bool,
    /// `original / compressed` size; 1.0 when compression was skipped.
    pub compression_ratio: f64,
}

/// Run the hide-side transforms and serialize the envelope.
///
/// Stages run in fixed order: compression (if enabled and helpful), then
/// repetition coding, then encryption (if a password is set). Compression
/// must precede encryption since ciphertext does not compress.
pub fn build(
    payload_type: PayloadType,
    data: &[u8],
    filename: Option<&str>,
    options: &StegoOptions,
) -> Result<BuiltEnvelope, StegoError> {
    let (stage, compressed) = if options.compress {
        compress::compress(data)
    } else {
        (data.to_vec(), false)
    };
    let ratio = if compressed { compression_ratio(data.len(), stage.len()) } else { 1.0 };

    let stage = repetition::encode(&stage, options.error_correction);
    let sealed = crypto::seal(stage, options.password.as_deref())?;

    let envelope = Envelope {
        payload_type,
        compressed,
        bits_per_channel: options.bits_per_channel,
        channels: options.channels,
        salt: sealed.salt,
        nonce: sealed.nonce,
        filename: filename.unwrap_or_default().to_string(),
        body: sealed.body,
    };
    let bytes = envelope.to_bytes()?;
    log::debug!(
        "built {} envelope: {} data bytes -> {} envelope bytes (compressed={}, ec={}, encrypted={})",
        payload_type,
        data.len(),
        bytes.len(),
        compressed,
        options.error_correction,
        !envelope.salt.is_empty(),
    );

    Ok(BuiltEnvelope { bytes, compressed, compression_ratio: ratio })
}

/// Sequential big-endian reader over a slice whose length was checked upfront.
struct FieldReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        FieldReader { data, pos: 0 }
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut buf = [0u8; N];
        buf.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        buf
    }

    fn bytes(&mut self, len: usize) -> &'a [u8] {
        let data = self.data;
        let field = &data[self.pos..self.pos + len];
        self.pos += len;
        field
    }

    fn u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }

    fn u16(&mut self) -> u16 {
        u16::from_be_bytes(self.take())
    }

    fn u32(&mut self) -> u32 {
        u32::from_be_bytes(self.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stego::channel::Channel;
    use crate::stego::repetition::ErrorCorrection;

    fn sample() -> Envelope {
        Envelope {
            payload_type: PayloadType::File,
            compressed: true,
            bits_per_channel: BitDepth::new(3).unwrap(),
            channels: "RB".parse().unwrap(),
            salt: vec![1; 16],
            nonce: vec![2; 12],
            filename: "notes.txt".to_string(),
            body: vec![0xAA, 0xBB, 0xCC],
        }
    }

    #[test]
    fn fixed_header_is_23_bytes() {
        assert_eq!(FIXED_HEADER_LEN, 23);
    }

    #[test]
    fn serialize_parse_roundtrip() {
        let env = sample();
        let bytes = env.to_bytes().unwrap();
        assert_eq!(bytes.len(), 23 + 16 + 12 + 9 + 2 + 3);
        assert_eq!(Envelope::parse(&bytes).unwrap(), env);
    }

    #[test]
    fn byte_layout_is_big_endian_in_order() {
        let bytes = sample().to_bytes().unwrap();
        assert_eq!(&bytes[..5], b"STEG2");
        assert_eq!(bytes[5], 2);
        assert_eq!(&bytes[6..10], &[0, 0, 0, 2]); // file
        assert_eq!(&bytes[10..14], &[0, 0, 0, 3]); // body length
        assert_eq!(bytes[14], 1); // compressed
        assert_eq!(bytes[15], 3); // bits per channel
        assert_eq!(&bytes[16..18], &[0, 16]);
        assert_eq!(&bytes[18..20], &[0, 12]);
        assert_eq!(&bytes[20..22], &[0, 9]);
        assert_eq!(bytes[22], 2);
        assert_eq!(&bytes[23..39], &[1; 16]);
        assert_eq!(&bytes[39..51], &[2; 12]);
        assert_eq!(&bytes[51..60], b"notes.txt");
        assert_eq!(&bytes[60..62], b"RB");
        assert_eq!(&bytes[62..], &[0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn trailing_padding_ignored() {
        let env = sample();
        let mut bytes = env.to_bytes().unwrap();
        bytes.extend_from_slice(&[0u8; 40]);
        assert_eq!(Envelope::parse(&bytes).unwrap(), env);
    }

    #[test]
    fn missing_magic_is_format_error() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[0] = b'X';
        assert!(matches!(Envelope::parse(&bytes), Err(StegoError::Format(_))));
        assert!(matches!(Envelope::parse(&[]), Err(StegoError::Format(_))));
        assert!(matches!(Envelope::parse(&[0u8; 4096]), Err(StegoError::Format(_))));
    }

    #[test]
    fn truncated_body_is_format_error() {
        let bytes = sample().to_bytes().unwrap();
        let cut = &bytes[..bytes.len() - 1];
        assert!(matches!(Envelope::parse(cut), Err(StegoError::Format(_))));
        assert!(matches!(Envelope::parse(&bytes[..FIXED_HEADER_LEN - 1]), Err(StegoError::Format(_))));
    }

    #[test]
    fn bad_version_and_type_rejected() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[5] = 1;
        assert!(matches!(EnvelopeHeader::parse(&bytes), Err(StegoError::Format(_))));

        let mut bytes = sample().to_bytes().unwrap();
        bytes[9] = 7;
        assert!(matches!(EnvelopeHeader::parse(&bytes), Err(StegoError::Format(_))));
    }

    #[test]
    fn bad_depth_rejected() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[15] = 0;
        assert!(matches!(EnvelopeHeader::parse(&bytes), Err(StegoError::Format(_))));
        bytes[15] = 9;
        assert!(matches!(EnvelopeHeader::parse(&bytes), Err(StegoError::Format(_))));
    }

    #[test]
    fn bad_channel_string_rejected() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[60] = b'X';
        assert!(matches!(Envelope::parse(&bytes), Err(StegoError::Format(_))));
    }

    #[test]
    fn header_lengths() {
        let env = sample();
        let bytes = env.to_bytes().unwrap();
        let header = EnvelopeHeader::parse(&bytes).unwrap();
        assert_eq!(header.metadata_len(), 23 + 16 + 12 + 9 + 2);
        assert_eq!(header.total_len(), bytes.len());
        assert_eq!(header.parse_channels(&bytes).unwrap(), env.channels);
    }

    #[test]
    fn build_plain_text() {
        let options = StegoOptions::default();
        let built = build(PayloadType::Text, b"hello", None, &options).unwrap();
        assert!(!built.compressed);
        assert_eq!(built.compression_ratio, 1.0);
        let env = Envelope::parse(&built.bytes).unwrap();
        assert_eq!(env.payload_type, PayloadType::Text);
        assert_eq!(env.body, b"hello");
        assert!(env.salt.is_empty() && env.nonce.is_empty());
        assert!(env.filename.is_empty());
        assert_eq!(env.channels, ChannelSet::all());
    }

    #[test]
    fn build_records_configuration() {
        let options = StegoOptions {
            bits_per_channel: BitDepth::new(5).unwrap(),
            channels: ChannelSet::single(Channel::Green),
            error_correction: ErrorCorrection::Medium,
            compress: false,
            ..StegoOptions::default()
        };
        let built = build(PayloadType::File, b"abc", Some("a.bin"), &options).unwrap();
        let env = Envelope::parse(&built.bytes).unwrap();
        assert_eq!(env.bits_per_channel.get(), 5);
        assert_eq!(env.channels.to_string(), "G");
        assert_eq!(env.filename, "a.bin");
        assert_eq!(env.body, b"aaabbbccc");
    }

    #[test]
    fn build_compresses_before_repetition() {
        let data = "compress me ".repeat(200);
        let options = StegoOptions { error_correction: ErrorCorrection::Low, ..StegoOptions::default() };
        let built = build(PayloadType::Text, data.as_bytes(), None, &options).unwrap();
        assert!(built.compressed);
        assert!(built.compression_ratio > 1.0);
        let env = Envelope::parse(&built.bytes).unwrap();
        let unrepeated = repetition::decode(&env.body, ErrorCorrection::Low).unwrap();
        assert_eq!(compress::decompress(&unrepeated, true).unwrap(), data.as_bytes());
    }

    #[test]
    fn oversized_filename_rejected() {
        let name = "x".repeat(70_000);
        let result = build(PayloadType::File, b"", Some(&name), &StegoOptions::default());
        assert!(matches!(result, Err(StegoError::InvalidParameter(_))));
    }
}
