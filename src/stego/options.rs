// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Per-call configuration for hide and reveal.
//!
//! Options are plain values built by the caller, consumed once and never
//! mutated by the engine.

use crate::stego::channel::{BitDepth, ChannelSet};
use crate::stego::error::{CapacityError, StegoError};
use crate::stego::repetition::ErrorCorrection;

/// Default fraction of capacity an envelope may occupy.
pub const DEFAULT_MAX_PAYLOAD_RATIO: f64 = 0.5;

/// Caller-imposed soft limits, checked before any pixel is touched.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StegoLimits {
    /// Maximum carrier pixel count.
    pub max_cover_pixels: Option<usize>,
    /// Maximum envelope size in bytes.
    pub max_payload_bytes: Option<usize>,
    /// Maximum envelope size as a fraction of capacity bytes.
    pub max_payload_ratio: f64,
}

impl Default for StegoLimits {
    fn default() -> Self {
        StegoLimits {
            max_cover_pixels: None,
            max_payload_bytes: None,
            max_payload_ratio: DEFAULT_MAX_PAYLOAD_RATIO,
        }
    }
}

impl StegoLimits {
    /// No soft limits; only the hard capacity applies.
    pub fn unbounded() -> Self {
        StegoLimits { max_cover_pixels: None, max_payload_bytes: None, max_payload_ratio: 1.0 }
    }

    /// Validate a hide request against these limits.
    ///
    /// # Errors
    /// - [`CapacityError::CarrierTooLarge`] if the carrier has too many pixels.
    /// - [`CapacityError::PayloadTooLarge`] if the envelope exceeds the byte limit.
    /// - [`CapacityError::RatioExceeded`] if the envelope exceeds the allowed
    ///   fraction of `capacity_bytes`.
    pub fn check(&self, pixel_count: usize, payload_bytes: usize, capacity_bytes: usize) -> Result<(), StegoError> {
        if let Some(limit) = self.max_cover_pixels {
            if pixel_count > limit {
                return Err(CapacityError::CarrierTooLarge { pixels: pixel_count, limit }.into());
            }
        }
        if let Some(limit) = self.max_payload_bytes {
            if payload_bytes > limit {
                return Err(CapacityError::PayloadTooLarge { bytes: payload_bytes, limit }.into());
            }
        }
        let allowed = capacity_bytes as f64 * self.max_payload_ratio;
        if payload_bytes as f64 > allowed {
            return Err(CapacityError::RatioExceeded { bytes: payload_bytes, allowed }.into());
        }
        Ok(())
    }
}

/// Options for a hide operation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StegoOptions {
    pub bits_per_channel: BitDepth,
    /// Encrypt when set to a non-empty string.
    pub password: Option<String>,
    pub channels: ChannelSet,
    /// Try compression; it is still skipped when it does not shrink the data.
    pub compress: bool,
    pub error_correction: ErrorCorrection,
    pub limits: StegoLimits,
}

impl Default for StegoOptions {
    fn default() -> Self {
        StegoOptions {
            bits_per_channel: BitDepth::MIN,
            password: None,
            channels: ChannelSet::all(),
            compress: true,
            error_correction: ErrorCorrection::None,
            limits: StegoLimits::default(),
        }
    }
}

/// Options for a reveal operation.
///
/// Depth and channels are read from the envelope. The repetition level is
/// not recorded there and must match the one used to hide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RevealOptions {
    pub password: Option<String>,
    pub error_correction: ErrorCorrection,
}

impl RevealOptions {
    pub fn with_password(password: impl Into<String>) -> Self {
        RevealOptions { password: Some(password.into()), ..RevealOptions::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = StegoOptions::default();
        assert_eq!(opts.bits_per_channel.get(), 1);
        assert_eq!(opts.channels, ChannelSet::all());
        assert!(opts.compress);
        assert_eq!(opts.error_correction, ErrorCorrection::None);
        assert_eq!(opts.limits.max_payload_ratio, 0.5);
    }

    #[test]
    fn limits_pass_within_bounds() {
        let limits = StegoLimits {
            max_cover_pixels: Some(10_000),
            max_payload_bytes: Some(100),
            max_payload_ratio: 0.5,
        };
        assert!(limits.check(10_000, 100, 200).is_ok());
    }

    #[test]
    fn limits_reject_pixels() {
        let limits = StegoLimits { max_cover_pixels: Some(100), ..StegoLimits::default() };
        match limits.check(101, 1, 1000) {
            Err(StegoError::Capacity(CapacityError::CarrierTooLarge { pixels: 101, limit: 100 })) => {}
            other => panic!("expected CarrierTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn limits_reject_bytes() {
        let limits = StegoLimits { max_payload_bytes: Some(10), ..StegoLimits::default() };
        match limits.check(1, 11, 1000) {
            Err(StegoError::Capacity(CapacityError::PayloadTooLarge { bytes: 11, limit: 10 })) => {}
            other => panic!("expected PayloadTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn limits_reject_ratio() {
        let limits = StegoLimits::default();
        assert!(limits.check(1, 50, 100).is_ok());
        assert!(matches!(
            limits.check(1, 51, 100),
            Err(StegoError::Capacity(CapacityError::RatioExceeded { bytes: 51, .. }))
        ));
        assert!(StegoLimits::unbounded().check(1, 100, 100).is_ok());
    }
}
