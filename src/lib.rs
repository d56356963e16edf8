// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! # lsb-stego
//!
//! Hide text messages and files in the least-significant bits of RGB images,
//! and get them back out.
//!
//! - Configurable bit depth (1–8 low bits per channel) and channel subset.
//! - Optional Brotli compression, skipped when it does not help.
//! - Optional byte-repetition error correction with majority voting.
//! - Optional password encryption (Argon2id + AES-256-GCM-SIV).
//! - Self-describing "STEG2" envelope: reveal locates the payload without
//!   being told the depth or channels.
//! - Bit-plane rendering for visual inspection.
//!
//! The engine works on decoded [`image::RgbImage`] buffers. Reading and
//! writing image files is left to the caller; a lossless format (PNG) is
//! required for the payload to survive.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use lsb_stego::{hide_text, reveal_text, RevealOptions, StegoOptions};
//!
//! let cover = image::open("cover.png").unwrap().to_rgb8();
//! let options = StegoOptions { password: Some("hunter2".into()), ..StegoOptions::default() };
//! let (stego, report) = hide_text(&cover, "secret message", &options).unwrap();
//! stego.save("stego.png").unwrap();
//!
//! let revealed = reveal_text(&stego, &RevealOptions::with_password("hunter2")).unwrap();
//! assert_eq!(revealed.text, "secret message");
//! ```

pub mod stego;

pub use stego::{capacity, capacity_report, carrier_capacity, Capacity, CapacityReport};
pub use stego::{hide_file, hide_text, reveal, reveal_file, reveal_text};
pub use stego::{HideReport, Revealed, RevealedFile, RevealedText};
pub use stego::{render_all_planes, render_channel_planes, render_plane, render_single_plane, BitPlane};
pub use stego::{BitDepth, Channel, ChannelSet, ErrorCorrection, PayloadType};
pub use stego::{CapacityError, StegoError, GENERIC_REVEAL_FAILURE};
pub use stego::{RevealOptions, StegoLimits, StegoOptions};
