// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Capacity arithmetic.
//!
//! Capacity is a pure function of the carrier dimensions, the bit depth and
//! the channel selection:
//!
//! ```text
//! total_bits = width × height × |channels| × depth
//! ```
//!
//! Used to answer capacity queries and as the precondition check before every
//! hide operation.

use image::RgbImage;

use crate::stego::channel::{BitDepth, Channel, ChannelSet};
use crate::stego::crypto::{NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::stego::envelope::FIXED_HEADER_LEN;
use crate::stego::options::StegoLimits;

/// Embeddable bit and byte budget of a carrier under one configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Capacity {
    pub total_bits: usize,
    /// `total_bits / 8`, rounded down.
    pub total_bytes: usize,
    /// Bits available in each selected channel, in packing order.
    pub per_channel: Vec<(Channel, usize)>,
}

/// Compute the capacity for a `width × height` carrier.
pub fn capacity(width: u32, height: u32, depth: BitDepth, channels: ChannelSet) -> Capacity {
    let plane_bits = width as usize * height as usize * depth.get() as usize;
    let total_bits = plane_bits * channels.len();
    Capacity {
        total_bits,
        total_bytes: total_bits / 8,
        per_channel: channels.iter().map(|c| (c, plane_bits)).collect(),
    }
}

/// [`capacity`] for an in-memory carrier.
pub fn carrier_capacity(carrier: &RgbImage, depth: BitDepth, channels: ChannelSet) -> Capacity {
    capacity(carrier.width(), carrier.height(), depth, channels)
}

/// Capacity plus derived maximum text sizes, for UI/API consumption.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CapacityReport {
    pub capacity_bits: usize,
    pub capacity_bytes: usize,
    /// Longest UTF-8 text (in bytes) that fits uncompressed without a password.
    pub max_text_chars_no_password: usize,
    /// Same, with the salt, nonce and authentication tag of an encrypted envelope.
    pub max_text_chars_with_password: usize,
    pub capacity_per_channel: Vec<(Channel, usize)>,
}

impl CapacityReport {
    /// Longest uncompressed, unrepeated text (in bytes) that passes both the
    /// hard capacity and the soft `limits`.
    pub fn max_text_chars_within(&self, limits: &StegoLimits, with_password: bool) -> usize {
        let hard = if with_password { self.max_text_chars_with_password } else { self.max_text_chars_no_password };
        let overhead = FIXED_HEADER_LEN
            + self.capacity_per_channel.len()
            + if with_password { SALT_LEN + NONCE_LEN + TAG_LEN } else { 0 };
        let mut envelope_max = (self.capacity_bytes as f64 * limits.max_payload_ratio).floor() as usize;
        if let Some(limit) = limits.max_payload_bytes {
            envelope_max = envelope_max.min(limit);
        }
        hard.min(envelope_max.saturating_sub(overhead))
    }
}

/// Build the capacity query answer for a carrier.
///
/// The text limits assume no compression and no error correction. They
/// subtract the fixed header and the channel string; the password variant
/// additionally subtracts salt, nonce and the AEAD tag.
///
/// They are hard limits: they ignore [`StegoLimits`], whose default
/// `max_payload_ratio` of 0.5 rejects anything above half the capacity. Use
/// [`CapacityReport::max_text_chars_within`] for the figure a hide call with
/// given limits will accept.
///
/// [`StegoLimits`]: crate::stego::options::StegoLimits
pub fn capacity_report(carrier: &RgbImage, depth: BitDepth, channels: ChannelSet) -> CapacityReport {
    let cap = carrier_capacity(carrier, depth, channels);
    let header_overhead = FIXED_HEADER_LEN + channels.len();
    let crypto_overhead = SALT_LEN + NONCE_LEN + TAG_LEN;
    CapacityReport {
        capacity_bits: cap.total_bits,
        capacity_bytes: cap.total_bytes,
        max_text_chars_no_password: cap.total_bytes.saturating_sub(header_overhead),
        max_text_chars_with_password: cap.total_bytes.saturating_sub(header_overhead + crypto_overhead),
        capacity_per_channel: cap.per_channel,
    }
}
