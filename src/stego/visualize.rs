// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Bit-plane rendering for visual inspection.
//!
//! A bit plane is a binary image: a pixel is white (255) where the chosen bit
//! of the chosen channel is set, black (0) otherwise. Low planes of a natural
//! photo look like noise; embedded data shows up as a uniform texture over the
//! leading rows.

use image::{GrayImage, Luma, RgbImage};

use crate::stego::channel::Channel;
use crate::stego::error::StegoError;

/// One rendered plane plus its identifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct BitPlane {
    pub channel: Channel,
    /// 0 = least significant.
    pub bit_plane: u8,
    pub image: GrayImage,
}

/// Render bit `bit` of `channel` as a black/white image.
///
/// # Errors
/// [`StegoError::InvalidParameter`] if `bit > 7`.
pub fn render_plane(carrier: &RgbImage, channel: Channel, bit: u8) -> Result<GrayImage, StegoError> {
    if bit > 7 {
        return Err(StegoError::InvalidParameter("bit plane must be in 0..=7"));
    }
    Ok(plane_image(carrier, channel, bit))
}

/// `bit` must already be in `0..=7`.
fn plane_image(carrier: &RgbImage, channel: Channel, bit: u8) -> GrayImage {
    let ci = channel.index();
    GrayImage::from_fn(carrier.width(), carrier.height(), |x, y| {
        let v = carrier.get_pixel(x, y).0[ci];
        Luma([((v >> bit) & 1) * 255])
    })
}

/// [`render_plane`] wrapped with its identifiers.
pub fn render_single_plane(carrier: &RgbImage, channel: Channel, bit: u8) -> Result<BitPlane, StegoError> {
    Ok(BitPlane { channel, bit_plane: bit, image: render_plane(carrier, channel, bit)? })
}

/// All eight planes of one channel, LSB first.
pub fn render_channel_planes(carrier: &RgbImage, channel: Channel) -> Vec<BitPlane> {
    (0..8u8)
        .map(|bit| BitPlane { channel, bit_plane: bit, image: plane_image(carrier, channel, bit) })
        .collect()
}

/// 24 planes, R0..R7 then G0..G7 then B0..B7.
pub fn render_all_planes(carrier: &RgbImage) -> Vec<BitPlane> {
    Channel::ALL
        .iter()
        .flat_map(|&channel| render_channel_planes(carrier, channel))
        .collect()
}
