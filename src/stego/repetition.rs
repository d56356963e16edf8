// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Byte-level repetition coding with majority voting.
//!
//! Each byte is repeated `factor` times back to back; decoding takes the
//! most frequent value in every `factor`-byte window. Survives up to
//! `(factor - 1) / 2` corrupted bytes per window. Offers no protection
//! against burst errors that span a whole window.

use core::fmt;
use core::str::FromStr;

use crate::stego::error::StegoError;

/// Redundancy level of the repetition stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ErrorCorrection {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl ErrorCorrection {
    /// Number of copies written per byte: 1, 2, 3 or 4.
    pub const fn factor(self) -> usize {
        match self {
            ErrorCorrection::None => 1,
            ErrorCorrection::Low => 2,
            ErrorCorrection::Medium => 3,
            ErrorCorrection::High => 4,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ErrorCorrection::None => "none",
            ErrorCorrection::Low => "low",
            ErrorCorrection::Medium => "medium",
            ErrorCorrection::High => "high",
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ErrorCorrection {
    type Err = StegoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(ErrorCorrection::None),
            "low" => Ok(ErrorCorrection::Low),
            "medium" => Ok(ErrorCorrection::Medium),
            "high" => Ok(ErrorCorrection::High),
            _ => Err(StegoError::InvalidParameter("error correction must be none, low, medium or high")),
        }
    }
}

/// Size multiplier the stage applies at `level`.
pub fn overhead_factor(level: ErrorCorrection) -> usize {
    level.factor()
}

/// Repeat every byte `level.factor()` times.
pub fn encode(data: &[u8], level: ErrorCorrection) -> Vec<u8> {
    let r = level.factor();
    if r == 1 {
        return data.to_vec();
    }
    let mut out = Vec::with_capacity(data.len() * r);
    for &b in data {
        out.extend(core::iter::repeat(b).take(r));
    }
    out
}

/// Collapse each `factor`-byte window to its majority byte.
///
/// Ties go to the value that appears first in the window.
///
/// # Errors
/// [`StegoError::Corruption`] if `data.len()` is not a multiple of the factor.
pub fn decode(data: &[u8], level: ErrorCorrection) -> Result<Vec<u8>, StegoError> {
    let r = level.factor();
    if r == 1 {
        return Ok(data.to_vec());
    }
    if data.len() % r != 0 {
        return Err(StegoError::Corruption);
    }
    Ok(data.chunks_exact(r).map(majority).collect())
}

fn majority(window: &[u8]) -> u8 {
    let mut best = window[0];
    let mut best_count = 0;
    for (i, &candidate) in window.iter().enumerate() {
        // Only count a value at its first occurrence.
        if window[..i].contains(&candidate) {
            continue;
        }
        let count = window.iter().filter(|&&b| b == candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}
