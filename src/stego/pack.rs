// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Bit-plane packing: envelope bits ↔ low-order channel bits.
//!
//! The envelope is read as a bit stream, MSB first within each byte. Pixels
//! are visited in row-major order; inside a pixel the selected channels are
//! visited R→G→B; inside a channel the low `depth` bits are filled from
//! offset 0 upwards. Stream bit `k` therefore lands in
//!
//! ```text
//! pixel   = k / (|C| × depth)
//! channel = C[(k / depth) % |C|]
//! offset  = k % depth
//! ```
//!
//! Each pixel's bit range is computed from its index alone, so pixels are
//! independent and the `parallel` feature can process them concurrently.
//! Embed and extract share [`Layout`], which fixes the traversal order for
//! both directions.

use image::RgbImage;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::stego::capacity::carrier_capacity;
use crate::stego::channel::{BitDepth, ChannelSet};
use crate::stego::error::{CapacityError, StegoError};

/// Per-pixel slot layout for one depth/channel configuration.
#[derive(Debug, Clone, Copy)]
struct Layout {
    indices: [usize; 3],
    count: usize,
    depth: usize,
    depth_mask: u8,
}

impl Layout {
    fn new(depth: BitDepth, channels: ChannelSet) -> Self {
        let (indices, count) = channels.indices();
        Layout { indices, count, depth: depth.get() as usize, depth_mask: depth.mask() }
    }

    /// Payload bits carried by one fully used pixel (at most 24).
    fn bits_per_pixel(&self) -> usize {
        self.count * self.depth
    }

    /// Pixels touched by a stream of `bits` bits.
    fn pixels_for(&self, bits: usize) -> usize {
        bits.div_ceil(self.bits_per_pixel())
    }

    /// Overwrite the low bits of one pixel with the first `valid` bits of `word`.
    /// Bit `i` of `word` is the pixel's `i`-th stream bit.
    fn write_pixel(&self, px: &mut [u8], word: u32, valid: usize) {
        for (slot, &ci) in self.indices[..self.count].iter().enumerate() {
            let shift = slot * self.depth;
            if shift >= valid {
                break;
            }
            let take = self.depth.min(valid - shift);
            let mask = ((1u16 << take) - 1) as u8;
            let value = (word >> shift) as u8 & mask;
            px[ci] = (px[ci] & !mask) | value;
        }
    }

    /// Gather all stream bits of one pixel; inverse of [`write_pixel`](Self::write_pixel).
    fn read_pixel(&self, px: &[u8]) -> u32 {
        let mut word = 0u32;
        for (slot, &ci) in self.indices[..self.count].iter().enumerate() {
            word |= ((px[ci] & self.depth_mask) as u32) << (slot * self.depth);
        }
        word
    }
}

/// Read `len` (≤ 32) stream bits starting at bit `start`.
fn load_word(bytes: &[u8], start: usize, len: usize) -> u32 {
    let mut word = 0u32;
    for i in 0..len {
        let k = start + i;
        let bit = (bytes[k / 8] >> (7 - k % 8)) & 1;
        word |= (bit as u32) << i;
    }
    word
}

/// Write the low `len` bits of `word` into the stream at bit `start`.
/// `out` must be zeroed at those positions.
fn store_word(out: &mut [u8], start: usize, word: u32, len: usize) {
    for i in 0..len {
        if (word >> i) & 1 == 1 {
            let k = start + i;
            out[k / 8] |= 1 << (7 - k % 8);
        }
    }
}

/// Embed `envelope` into the carrier in place.
///
/// Capacity is checked first; on failure the carrier is left untouched.
/// Only the bits actually written are cleared, so the tail of the last
/// pixel keeps its original values.
///
/// # Errors
/// [`CapacityError::Exceeded`] if the envelope needs more bits than the
/// carrier offers at this depth/channel configuration.
pub fn embed(
    carrier: &mut RgbImage,
    envelope: &[u8],
    depth: BitDepth,
    channels: ChannelSet,
) -> Result<(), StegoError> {
    let total_bits = envelope.len() * 8;
    let available_bits = carrier_capacity(carrier, depth, channels).total_bits;
    if total_bits > available_bits {
        return Err(CapacityError::Exceeded { needed_bits: total_bits, available_bits }.into());
    }

    let layout = Layout::new(depth, channels);
    let bpp = layout.bits_per_pixel();
    let pixels = layout.pixels_for(total_bits);
    let raw: &mut [u8] = &mut **carrier;
    let raw = &mut raw[..pixels * 3];

    let write = |(p, px): (usize, &mut [u8])| {
        let base = p * bpp;
        let valid = bpp.min(total_bits - base);
        layout.write_pixel(px, load_word(envelope, base, valid), valid);
    };

    #[cfg(feature = "parallel")]
    raw.par_chunks_exact_mut(3).enumerate().for_each(write);
    #[cfg(not(feature = "parallel"))]
    raw.chunks_exact_mut(3).enumerate().for_each(write);

    log::trace!("embedded {total_bits} bits into {pixels} pixels (depth {depth}, channels {channels})");
    Ok(())
}

/// Clone `carrier` and embed into the copy.
pub fn embed_into(
    carrier: &RgbImage,
    envelope: &[u8],
    depth: BitDepth,
    channels: ChannelSet,
) -> Result<RgbImage, StegoError> {
    let mut out = carrier.clone();
    embed(&mut out, envelope, depth, channels)?;
    Ok(out)
}

/// Extract `num_bits` stream bits and pack them into bytes.
///
/// The exact mirror of [`embed`]. The final byte is zero-padded when
/// `num_bits` is not a multiple of 8.
///
/// # Errors
/// [`CapacityError::Exceeded`] if more bits are requested than the carrier
/// holds at this configuration.
pub fn extract(
    carrier: &RgbImage,
    num_bits: usize,
    depth: BitDepth,
    channels: ChannelSet,
) -> Result<Vec<u8>, StegoError> {
    let available_bits = carrier_capacity(carrier, depth, channels).total_bits;
    if num_bits > available_bits {
        return Err(CapacityError::Exceeded { needed_bits: num_bits, available_bits }.into());
    }

    let layout = Layout::new(depth, channels);
    let bpp = layout.bits_per_pixel();
    let pixels = layout.pixels_for(num_bits);
    let raw: &[u8] = carrier;
    let raw = &raw[..pixels * 3];
    let mut out = vec![0u8; num_bits.div_ceil(8)];

    #[cfg(feature = "parallel")]
    let words: Vec<u32> = raw.par_chunks_exact(3).map(|px| layout.read_pixel(px)).collect();
    #[cfg(not(feature = "parallel"))]
    let words = raw.chunks_exact(3).map(|px| layout.read_pixel(px));

    for (p, word) in words.into_iter().enumerate() {
        let base = p * bpp;
        store_word(&mut out, base, word, bpp.min(num_bits - base));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stego::channel::Channel;
    use image::Rgb;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn depth(d: u8) -> BitDepth {
        BitDepth::new(d).unwrap()
    }

    fn noise_image(w: u32, h: u32, seed: u64) -> RgbImage {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        RgbImage::from_fn(w, h, |_, _| Rgb([rng.gen(), rng.gen(), rng.gen()]))
    }

    #[test]
    fn depth_one_all_channels_layout() {
        // 0b1010_0000: bits 1,0,1,0,0,0,0,0 → R0 G0 B0 R1 G1 B1 R2 G2
        let mut img = RgbImage::from_pixel(3, 1, Rgb([0xFF, 0xFF, 0xFF]));
        embed(&mut img, &[0b1010_0000], depth(1), ChannelSet::all()).unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [0xFF, 0xFE, 0xFF]);
        assert_eq!(img.get_pixel(1, 0).0, [0xFE, 0xFE, 0xFE]);
        // Third pixel: R, G written (0, 0); B untouched.
        assert_eq!(img.get_pixel(2, 0).0, [0xFE, 0xFE, 0xFF]);
    }

    #[test]
    fn ascending_offsets_within_channel() {
        // depth 4, red only: first four stream bits go to offsets 0..4 of R.
        let mut img = RgbImage::from_pixel(2, 1, Rgb([0, 0, 0]));
        embed(&mut img, &[0b1000_0001], depth(4), ChannelSet::single(Channel::Red)).unwrap();
        // Bits 1,0,0,0 → R = 0b0001; bits 0,0,0,1 → next R = 0b1000.
        assert_eq!(img.get_pixel(0, 0).0, [0b0001, 0, 0]);
        assert_eq!(img.get_pixel(1, 0).0, [0b1000, 0, 0]);
    }

    #[test]
    fn high_bits_preserved() {
        let mut img = RgbImage::from_pixel(4, 4, Rgb([0b1011_0110, 0b0100_1001, 0xFF]));
        embed(&mut img, &[0xFF, 0x00, 0xAB], depth(3), "RG".parse().unwrap()).unwrap();
        for px in img.pixels() {
            assert_eq!(px.0[0] & 0b1111_1000, 0b1011_0000);
            assert_eq!(px.0[1] & 0b1111_1000, 0b0100_1000);
            assert_eq!(px.0[2], 0xFF, "unselected channel modified");
        }
    }

    #[test]
    fn roundtrip_every_configuration() {
        let payload: Vec<u8> = (0..97u32).map(|i| (i.wrapping_mul(37) ^ 0x5C) as u8).collect();
        for d in BitDepth::every() {
            for set in ChannelSet::every() {
                let cover = noise_image(40, 30, 7);
                let stego = embed_into(&cover, &payload, d, set).unwrap();
                let out = extract(&stego, payload.len() * 8, d, set).unwrap();
                assert_eq!(out, payload, "depth {d}, channels {set}");
            }
        }
    }

    #[test]
    fn partial_byte_zero_padded() {
        let stego = embed_into(&noise_image(8, 8, 1), &[0xFF], depth(2), ChannelSet::all()).unwrap();
        let out = extract(&stego, 5, depth(2), ChannelSet::all()).unwrap();
        assert_eq!(out, vec![0b1111_1000]);
    }

    #[test]
    fn exact_fit() {
        // 10×10 red at depth 8 = 800 bits = 100 bytes.
        let payload = vec![0x3C; 100];
        let set = ChannelSet::single(Channel::Red);
        let stego = embed_into(&noise_image(10, 10, 2), &payload, depth(8), set).unwrap();
        assert_eq!(extract(&stego, 800, depth(8), set).unwrap(), payload);
    }

    #[test]
    fn over_capacity_rejected_without_mutation() {
        let cover = noise_image(10, 10, 3);
        let mut img = cover.clone();
        let result = embed(&mut img, &[0u8; 101], depth(8), ChannelSet::single(Channel::Red));
        assert!(matches!(
            result,
            Err(StegoError::Capacity(CapacityError::Exceeded { needed_bits: 808, available_bits: 800 }))
        ));
        assert_eq!(img, cover);
    }

    #[test]
    fn extract_beyond_capacity_rejected() {
        let img = noise_image(2, 2, 4);
        assert!(extract(&img, 12, depth(1), ChannelSet::all()).is_ok());
        assert!(extract(&img, 13, depth(1), ChannelSet::all()).is_err());
    }

    #[test]
    fn empty_payload_is_noop() {
        let cover = noise_image(5, 5, 5);
        let stego = embed_into(&cover, &[], depth(3), ChannelSet::all()).unwrap();
        assert_eq!(stego, cover);
        assert!(extract(&stego, 0, depth(3), ChannelSet::all()).unwrap().is_empty());
    }

    #[test]
    fn untouched_pixels_after_payload() {
        let cover = noise_image(20, 20, 6);
        let stego = embed_into(&cover, &[0xA5; 4], depth(1), ChannelSet::all()).unwrap();
        // 32 bits at 3 bits/pixel → 11 pixels touched.
        let raw_c: &[u8] = &cover;
        let raw_s: &[u8] = &stego;
        assert_eq!(&raw_c[11 * 3..], &raw_s[11 * 3..]);
    }
}
