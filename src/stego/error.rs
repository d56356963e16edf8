// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the steganography pipeline.
//!
//! [`StegoError`] covers every failure mode from capacity checks through
//! envelope parsing, decryption, repetition decoding and decompression.
//! Capacity failures carry a [`CapacityError`] describing which budget was
//! exceeded.

use core::fmt;

use crate::stego::envelope::PayloadType;

/// Generic message shown to end users for authentication and format failures.
///
/// A wrong password and a damaged envelope must look the same from the
/// outside, otherwise the error becomes a password oracle.
pub const GENERIC_REVEAL_FAILURE: &str = "invalid password or corrupted payload";

/// Which capacity budget a hide operation ran over.
#[derive(Debug, Clone, PartialEq)]
pub enum CapacityError {
    /// The envelope needs more bits than the carrier offers at this
    /// depth/channel configuration.
    Exceeded { needed_bits: usize, available_bits: usize },
    /// The carrier has more pixels than the caller allows.
    CarrierTooLarge { pixels: usize, limit: usize },
    /// The envelope is larger than the caller's absolute byte limit.
    PayloadTooLarge { bytes: usize, limit: usize },
    /// The envelope uses more than the allowed fraction of capacity.
    RatioExceeded { bytes: usize, allowed: f64 },
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exceeded { needed_bits, available_bits } => {
                write!(f, "not enough capacity for payload: {needed_bits} > {available_bits} bits")
            }
            Self::CarrierTooLarge { pixels, limit } => {
                write!(f, "cover image exceeds allowed pixel count: {pixels} > {limit}")
            }
            Self::PayloadTooLarge { bytes, limit } => {
                write!(f, "secret data exceeds allowed bytes: {bytes} > {limit}")
            }
            Self::RatioExceeded { bytes, allowed } => {
                write!(f, "secret data exceeds allowed ratio of capacity: {bytes} > {allowed:.1}")
            }
        }
    }
}

/// Errors that can occur during hiding or revealing.
#[derive(Debug, Clone, PartialEq)]
pub enum StegoError {
    /// The payload does not fit the carrier or breaks a soft limit.
    /// Always raised before any pixel is modified.
    Capacity(CapacityError),
    /// The extracted bytes are not a recognized envelope (bad magic,
    /// unsupported version, field lengths running past the data).
    Format(&'static str),
    /// Authenticated decryption failed: wrong password or corrupted ciphertext.
    Authentication,
    /// Repetition-coded data has a length inconsistent with its factor.
    Corruption,
    /// A buffer flagged as compressed could not be decompressed.
    Decode,
    /// A caller-supplied parameter is out of range.
    InvalidParameter(&'static str),
    /// The envelope holds a different payload type than requested.
    WrongPayloadType { expected: PayloadType, found: PayloadType },
    /// The revealed text payload is not valid UTF-8.
    InvalidUtf8,
}

impl StegoError {
    /// Message suitable for end users.
    ///
    /// Authentication and format failures collapse into
    /// [`GENERIC_REVEAL_FAILURE`]; everything else uses `Display`.
    pub fn user_message(&self) -> String {
        match self {
            Self::Authentication | Self::Format(_) => GENERIC_REVEAL_FAILURE.to_string(),
            other => other.to_string(),
        }
    }

    /// Returns `true` for any [`StegoError::Capacity`] variant.
    pub fn is_capacity(&self) -> bool {
        matches!(self, Self::Capacity(_))
    }
}

impl fmt::Display for StegoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capacity(e) => write!(f, "capacity error: {e}"),
            Self::Format(msg) => write!(f, "invalid stego envelope: {msg}"),
            Self::Authentication => write!(f, "{GENERIC_REVEAL_FAILURE}"),
            Self::Corruption => write!(f, "corrupted data for error correction"),
            Self::Decode => write!(f, "failed to decompress payload"),
            Self::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            Self::WrongPayloadType { expected, found } => {
                write!(f, "payload is {found}, expected {expected}")
            }
            Self::InvalidUtf8 => write!(f, "revealed text is not valid UTF-8"),
        }
    }
}

impl std::error::Error for StegoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl std::error::Error for CapacityError {}

impl From<CapacityError> for StegoError {
    fn from(e: CapacityError) -> Self {
        Self::Capacity(e)
    }
}
