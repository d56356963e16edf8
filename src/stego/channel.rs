// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Color channels, channel selections and bit depths.
//!
//! A [`ChannelSet`] is always a non-empty subset of {R, G, B} and always
//! iterates in R→G→B order, no matter how it was constructed. The packing
//! engine relies on that order: embed and extract walk the selected channels
//! of each pixel in exactly this sequence.

use core::fmt;
use core::str::FromStr;

use crate::stego::error::StegoError;

/// One of the three 8-bit color channels of a carrier pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    /// All channels in packing order.
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Sample index inside an RGB pixel.
    pub const fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }

    /// Single-letter name used in the envelope header.
    pub const fn letter(self) -> char {
        match self {
            Channel::Red => 'R',
            Channel::Green => 'G',
            Channel::Blue => 'B',
        }
    }

    pub fn from_letter(c: char) -> Option<Channel> {
        match c {
            'R' => Some(Channel::Red),
            'G' => Some(Channel::Green),
            'B' => Some(Channel::Blue),
            _ => None,
        }
    }

    const fn bit(self) -> u8 {
        1 << self.index()
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for Channel {
    type Err = StegoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Channel::from_letter(c.to_ascii_uppercase())
                .ok_or(StegoError::InvalidParameter("channel must be R, G, or B")),
            _ => Err(StegoError::InvalidParameter("channel must be R, G, or B")),
        }
    }
}

/// Non-empty, ordered selection of channels.
///
/// Stored as a 3-bit mask; bit `i` set means channel with index `i` participates.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct ChannelSet {
    mask: u8,
}

impl ChannelSet {
    /// Red, green and blue.
    pub const fn all() -> Self {
        ChannelSet { mask: 0b111 }
    }

    pub const fn single(channel: Channel) -> Self {
        ChannelSet { mask: channel.bit() }
    }

    /// Build a selection from any order of channels. Duplicates collapse.
    ///
    /// # Errors
    /// [`StegoError::InvalidParameter`] if `channels` is empty.
    pub fn new(channels: &[Channel]) -> Result<Self, StegoError> {
        let mask = channels.iter().fold(0u8, |m, c| m | c.bit());
        if mask == 0 {
            return Err(StegoError::InvalidParameter("at least one channel must be selected"));
        }
        Ok(ChannelSet { mask })
    }

    /// Every possible selection, smallest mask first.
    pub fn every() -> impl Iterator<Item = ChannelSet> {
        (1u8..=0b111).map(|mask| ChannelSet { mask })
    }

    /// Number of selected channels (1–3).
    pub fn len(&self) -> usize {
        self.mask.count_ones() as usize
    }

    /// Always `false`; a `ChannelSet` cannot be empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, channel: Channel) -> bool {
        self.mask & channel.bit() != 0
    }

    /// Selected channels in R→G→B order.
    pub fn iter(&self) -> impl Iterator<Item = Channel> + '_ {
        Channel::ALL.into_iter().filter(move |c| self.contains(*c))
    }

    /// Sample indices of the selected channels, in packing order.
    ///
    /// Returned as a fixed array plus count so the per-pixel hot loop
    /// never allocates.
    pub(crate) fn indices(&self) -> ([usize; 3], usize) {
        let mut out = [0usize; 3];
        let mut n = 0;
        for c in self.iter() {
            out[n] = c.index();
            n += 1;
        }
        (out, n)
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        ChannelSet::all()
    }
}

impl fmt::Display for ChannelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.iter() {
            write!(f, "{}", c.letter())?;
        }
        Ok(())
    }
}

impl fmt::Debug for ChannelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChannelSet({self})")
    }
}

impl FromStr for ChannelSet {
    type Err = StegoError;

    /// Parse a letter string such as `"R"`, `"GB"` or `"RGB"`.
    ///
    /// Letters may come in any order but must not repeat.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut mask = 0u8;
        for c in s.chars() {
            let ch = Channel::from_letter(c)
                .ok_or(StegoError::InvalidParameter("channel selection may only contain R, G, B"))?;
            if mask & ch.bit() != 0 {
                return Err(StegoError::InvalidParameter("duplicate channel in selection"));
            }
            mask |= ch.bit();
        }
        if mask == 0 {
            return Err(StegoError::InvalidParameter("at least one channel must be selected"));
        }
        Ok(ChannelSet { mask })
    }
}

impl From<Channel> for ChannelSet {
    fn from(c: Channel) -> Self {
        ChannelSet::single(c)
    }
}

impl From<ChannelSet> for String {
    fn from(set: ChannelSet) -> Self {
        set.to_string()
    }
}

impl TryFrom<String> for ChannelSet {
    type Error = StegoError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Number of low-order bits overwritten per selected channel, in `1..=8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct BitDepth(u8);

impl BitDepth {
    pub const MIN: BitDepth = BitDepth(1);
    pub const MAX: BitDepth = BitDepth(8);

    /// # Errors
    /// [`StegoError::InvalidParameter`] unless `1 <= bits <= 8`.
    pub fn new(bits: u8) -> Result<Self, StegoError> {
        if (1..=8).contains(&bits) {
            Ok(BitDepth(bits))
        } else {
            Err(StegoError::InvalidParameter("bits_per_channel must be an integer between 1 and 8"))
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Mask covering the low `depth` bits of a sample.
    pub const fn mask(self) -> u8 {
        ((1u16 << self.0) - 1) as u8
    }

    /// All valid depths, ascending.
    pub fn every() -> impl Iterator<Item = BitDepth> {
        (1u8..=8).map(BitDepth)
    }
}

impl Default for BitDepth {
    fn default() -> Self {
        BitDepth::MIN
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = StegoError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        BitDepth::new(bits)
    }
}

impl From<BitDepth> for u8 {
    fn from(d: BitDepth) -> Self {
        d.0
    }
}
