// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! LSB steganography in RGB carriers.
//!
//! Payload bits replace the low `d` bits (1–8) of a chosen subset of the R,
//! G and B channels. Before embedding, the payload passes through three
//! optional stages and is wrapped in a self-describing envelope:
//!
//! ```text
//! data ─► compress (brotli, kept only if smaller)
//!      ─► repeat   (×1/×2/×3/×4)
//!      ─► encrypt  (Argon2id + AES-256-GCM-SIV, if a password is set)
//!      ─► envelope ("STEG2" header + body)
//!      ─► pack     (low bits of the selected channels)
//! ```
//!
//! Reveal reverses the chain. The envelope records depth and channels, so a
//! reader needs only the password and the repetition level.

pub mod capacity;
pub mod channel;
pub mod compress;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod options;
pub mod pack;
mod pipeline;
pub mod repetition;
pub mod visualize;

pub use capacity::{capacity, capacity_report, carrier_capacity, Capacity, CapacityReport};
pub use channel::{BitDepth, Channel, ChannelSet};
pub use envelope::PayloadType;
pub use error::{CapacityError, StegoError, GENERIC_REVEAL_FAILURE};
pub use options::{RevealOptions, StegoLimits, StegoOptions};
pub use pipeline::{
    hide_file, hide_text, locate, read_envelope, reveal, reveal_file, reveal_text, HideReport, Located,
    Revealed, RevealedFile, RevealedText, DEFAULT_RECOVERED_FILENAME, PROBE_PREFIX_BYTES,
};
pub use repetition::ErrorCorrection;
pub use visualize::{render_all_planes, render_channel_planes, render_plane, render_single_plane, BitPlane};
