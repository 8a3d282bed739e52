//! Atari POKEY sound core for bus-sniffing cartridge firmware
//!
//! A tick-stepped emulation of the audio half of the Atari POKEY chip. A full
//! audio sample is computed by nine bounded micro-steps so the caller can
//! interleave synthesis work with hard real-time bus service, one step per
//! idle bus cycle.
//!
//! # Features
//! - 4 square-wave channels with 8-bit reload divisors
//! - Volume-only (DC) mode per channel
//! - 4-, 5-, 9- and 17-bit polynomial noise counters
//! - 8 distortion modes resolved through a fixed lookup table
//! - STIMER force-reload of all channel counters
//! - `no_std`, no allocation, constant-time steps
//!
//! # Backend Trait
//! The [`PokeyBackend`] trait lets the bus arbiter drive either the real
//! [`Pokey`] core or a test double.
//!
//! # Quick start
//! ```
//! use pokey::Pokey;
//!
//! let mut chip = Pokey::new();
//! chip.write_register(0, 10);   // AUDF1: divisor
//! chip.write_register(1, 0xAF); // AUDC1: pure tone, volume 15
//! chip.write_register(9, 0);    // STIMER: restart all counters
//!
//! let mut samples = 0;
//! for _ in 0..90 {
//!     if chip.tick_step() {
//!         let _level = chip.output();
//!         samples += 1;
//!     }
//! }
//! assert_eq!(samples, 10);
//! ```

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

pub mod backend;
pub mod chip;
pub mod distortion;
pub mod poly;
pub mod registers;
pub mod timer;

pub use backend::PokeyBackend;
pub use chip::{Pokey, TickStep};
pub use distortion::{DistortionMode, DISTORTION_LUT};
pub use poly::{PolyCounter, PolyCounters};
pub use registers::{AudioControl, Register, RegisterBank};
pub use timer::{ChannelTimer, NUM_CHANNELS};
