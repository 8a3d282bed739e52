//! 7800 cartridge simulator CLI
//!
//! - `inspect`: show the `.a78` header and the cartridge checks the BIOS makes
//! - `render`: play a POKEY write script through the firmware core into a WAV
//! - `sign`: stamp the control byte and signature into a raw image

use anyhow::{Context, Result};
use cart7800_sim::a78::{CONTROL_ADDR, RESET_VECTOR_ADDR, SIGNATURE_ADDR};
use cart7800_sim::{export_to_wav, render, ControlByte, LoadedRom, SimConfig, WriteScript};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

/// Trailing silence rendered after the last scripted write
const TAIL_SECONDS: f64 = 1.0;

#[derive(Parser)]
#[command(name = "cart-sim", version)]
#[command(about = "Atari 7800 cartridge + POKEY simulator")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the .a78 header and cartridge checks
    Inspect {
        /// ROM image (raw or .a78)
        rom: PathBuf,
    },
    /// Stamp the 7800 control byte and signature into an image
    Sign {
        /// ROM image (raw or .a78)
        rom: PathBuf,

        /// Output raw image
        #[arg(short, long)]
        out: PathBuf,

        /// Control byte (bit 0 PAL, bit 1 POKEY@$4000; must be non-zero)
        #[arg(long, default_value = "0x01", value_parser = parse_byte)]
        control: u8,
    },
    /// Render a POKEY write script to WAV
    Render {
        /// ROM image (raw or .a78)
        rom: PathBuf,

        /// JSON write script
        #[arg(short, long)]
        script: PathBuf,

        /// Output WAV file
        #[arg(short, long)]
        out: PathBuf,

        /// JSON simulation config
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Length in seconds (default: script length plus one second)
        #[arg(long)]
        seconds: Option<f64>,

        /// Trace PRNG seed
        #[arg(long)]
        seed: Option<u32>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Args::parse().command {
        Command::Inspect { rom } => inspect(rom),
        Command::Sign { rom, out, control } => {
            let mut image = LoadedRom::from_file(&rom)
                .with_context(|| format!("loading ROM {}", rom.display()))?;
            image
                .sign(ControlByte::from_bits_retain(control))
                .context("signing")?;
            image
                .write_image(&out)
                .with_context(|| format!("writing {}", out.display()))?;
            info!(
                "Signed ${:04X}-${:04X} with control 0x{control:02X} -> {}",
                image.base,
                image.end(),
                out.display()
            );
            Ok(())
        }
        Command::Render {
            rom,
            script,
            out,
            config,
            seconds,
            seed,
        } => {
            let image = LoadedRom::from_file(&rom)
                .with_context(|| format!("loading ROM {}", rom.display()))?;
            let script = WriteScript::from_file(&script)
                .with_context(|| format!("loading script {}", script.display()))?;
            let mut config = match config {
                Some(path) => SimConfig::from_file(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => SimConfig::default(),
            };
            if let Some(seed) = seed {
                config.seed = seed;
            }

            let seconds = seconds.unwrap_or(script.duration() + TAIL_SECONDS);
            info!("{} writes, {:.3}s", script.len(), seconds);
            let report = render(&image, &config, &script, seconds).context("rendering")?;
            export_to_wav(&report, &out)
                .with_context(|| format!("writing {}", out.display()))?;
            Ok(())
        }
    }
}

/// Accept `0x`-prefixed hex or decimal
fn parse_byte(s: &str) -> std::result::Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid byte {s:?}: {e}"))
}

fn inspect(path: PathBuf) -> Result<()> {
    let rom = LoadedRom::from_file(&path)
        .with_context(|| format!("loading ROM {}", path.display()))?;

    println!("File: {}", path.display());
    match &rom.header {
        Some(h) => {
            println!("Header:     .a78");
            println!("  Title:       {}", h.title);
            println!("  Cart type:   {}", h.cart_type);
            println!(
                "  Controllers: 0x{:02X} 0x{:02X}",
                h.controllers[0], h.controllers[1]
            );
            println!("  TV format:   {}", h.tv);
            println!("  Save device: 0x{:02X}", h.save_device);
        }
        None => println!("Header:     none (raw image)"),
    }
    println!(
        "Placement:  ${:04X}-${:04X} ({} bytes)",
        rom.base,
        rom.end(),
        rom.data.len()
    );

    if rom.has_signature() {
        println!("Signature:  ATARI7800 at ${SIGNATURE_ADDR:04X}");
    } else {
        println!("Signature:  missing at ${SIGNATURE_ADDR:04X}");
    }
    match rom.control_byte() {
        Some(ctrl) => println!(
            "Control:    0x{:02X} at ${CONTROL_ADDR:04X} ({}, POKEY@$4000 {})",
            ctrl.bits(),
            if ctrl.contains(ControlByte::PAL) { "PAL" } else { "NTSC" },
            if ctrl.contains(ControlByte::POKEY_4000) { "yes" } else { "no" },
        ),
        None => println!("Control:    not mapped"),
    }
    match rom.reset_vector() {
        Some(v) => println!("Reset:      ${v:04X} (vector at ${RESET_VECTOR_ADDR:04X})"),
        None => println!("Reset:      vector not mapped"),
    }

    Ok(())
}
