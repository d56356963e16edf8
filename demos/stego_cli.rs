// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Command-line front end: hide and reveal payloads in PNG carriers.
//!
//! ```text
//! cargo run --example stego_cli -- hide-text cover.png out.png "hello" --password pw
//! cargo run --example stego_cli -- reveal out.png --password pw
//! cargo run --example stego_cli -- capacity cover.png --depth 2 --channels RG
//! cargo run --example stego_cli -- planes out.png planes/ --channel R
//! ```

use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use env_logger::Builder;
use log::LevelFilter;
use lsb_stego::{
    capacity_report, hide_file, hide_text, render_all_planes, render_channel_planes, reveal, BitDepth, Channel,
    ChannelSet, ErrorCorrection, HideReport, PayloadType, RevealOptions, StegoOptions,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "LSB steganography for PNG images", long_about = None)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hide a text message
    HideText {
        cover: PathBuf,
        output: PathBuf,
        message: String,
        #[command(flatten)]
        embed: EmbedArgs,
    },
    /// Hide a file
    HideFile {
        cover: PathBuf,
        output: PathBuf,
        file: PathBuf,
        #[command(flatten)]
        embed: EmbedArgs,
    },
    /// Reveal a payload; files are written into --out-dir
    Reveal {
        image: PathBuf,
        #[arg(short, long)]
        password: Option<String>,
        #[arg(long, default_value = "none")]
        ec: ErrorCorrection,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Print the capacity of a carrier
    Capacity {
        image: PathBuf,
        #[arg(short, long, default_value = "1")]
        depth: u8,
        #[arg(short, long, default_value = "RGB")]
        channels: ChannelSet,
    },
    /// Render bit planes as PNG files
    Planes {
        image: PathBuf,
        out_dir: PathBuf,
        /// Only this channel; all 24 planes otherwise
        #[arg(long)]
        channel: Option<Channel>,
    },
}

#[derive(Args, Debug)]
struct EmbedArgs {
    #[arg(short, long, default_value = "1")]
    depth: u8,
    #[arg(short, long, default_value = "RGB")]
    channels: ChannelSet,
    #[arg(short, long)]
    password: Option<String>,
    #[arg(long, default_value = "none")]
    ec: ErrorCorrection,
    #[arg(long)]
    no_compress: bool,
    /// Maximum envelope size as a fraction of capacity
    #[arg(long, default_value = "0.5")]
    max_ratio: f64,
}

impl EmbedArgs {
    fn options(&self) -> Result<StegoOptions, Box<dyn Error>> {
        let mut options = StegoOptions {
            bits_per_channel: BitDepth::new(self.depth)?,
            channels: self.channels,
            password: self.password.clone(),
            compress: !self.no_compress,
            error_correction: self.ec,
            ..StegoOptions::default()
        };
        options.limits.max_payload_ratio = self.max_ratio;
        Ok(options)
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    Builder::new()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn print_report(report: &HideReport) {
    log::info!(
        "embedded {} bytes using {} bits (depth {}, channels {})",
        report.payload_size_bytes,
        report.used_capacity_bits,
        report.bits_per_channel,
        report.channels_used,
    );
    log::info!(
        "overhead {} bytes, encryption {}, compression {} (ratio {:.2})",
        report.overhead_bytes,
        report.encryption.unwrap_or("none"),
        report.compression.unwrap_or("none"),
        report.compression_ratio,
    );
}

/// Keep only the final path component of an untrusted filename.
fn safe_filename(name: &str) -> &str {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or(lsb_stego::stego::DEFAULT_RECOVERED_FILENAME)
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Command::HideText { cover, output, message, embed } => {
            let carrier = image::open(&cover)?.to_rgb8();
            let (stego, report) = hide_text(&carrier, &message, &embed.options()?)?;
            stego.save(&output)?;
            print_report(&report);
        }
        Command::HideFile { cover, output, file, embed } => {
            let carrier = image::open(&cover)?.to_rgb8();
            let data = std::fs::read(&file)?;
            let name = file.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            let (stego, report) = hide_file(&carrier, name, &data, &embed.options()?)?;
            stego.save(&output)?;
            print_report(&report);
        }
        Command::Reveal { image, password, ec, out_dir } => {
            let carrier = image::open(&image)?.to_rgb8();
            let options = RevealOptions { password, error_correction: ec };
            let revealed = reveal(&carrier, &options).map_err(|e| e.user_message())?;
            match revealed.payload_type {
                PayloadType::Text => {
                    let text = String::from_utf8(revealed.data)?;
                    println!("{text}");
                }
                PayloadType::File => {
                    let path = out_dir.join(safe_filename(&revealed.filename));
                    std::fs::write(&path, &revealed.data)?;
                    log::info!("wrote {} bytes to {}", revealed.data.len(), path.display());
                }
            }
        }
        Command::Capacity { image, depth, channels } => {
            let carrier = image::open(&image)?.to_rgb8();
            let report = capacity_report(&carrier, BitDepth::new(depth)?, channels);
            println!("capacity: {} bits ({} bytes)", report.capacity_bits, report.capacity_bytes);
            println!("max text without password: {} bytes", report.max_text_chars_no_password);
            println!("max text with password:    {} bytes", report.max_text_chars_with_password);
            for (channel, bits) in &report.capacity_per_channel {
                println!("  {channel}: {bits} bits");
            }
        }
        Command::Planes { image, out_dir, channel } => {
            let carrier = image::open(&image)?.to_rgb8();
            let planes = match channel {
                Some(c) => render_channel_planes(&carrier, c),
                None => render_all_planes(&carrier),
            };
            std::fs::create_dir_all(&out_dir)?;
            for plane in &planes {
                let path = out_dir.join(format!("{}{}.png", plane.channel.letter(), plane.bit_plane));
                plane.image.save(&path)?;
            }
            log::info!("wrote {} planes to {}", planes.len(), out_dir.display());
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    if let Err(e) = run(cli) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
