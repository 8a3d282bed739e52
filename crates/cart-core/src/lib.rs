//! Atari 7800 cartridge emulation core
//!
//! Firmware logic for a microcontroller sitting in a 7800 cartridge slot. It
//! answers every ROM read on the host bus and, in the gaps the bus leaves,
//! sniffs POKEY register writes and advances a [`pokey::Pokey`] sound core
//! one micro-step at a time.
//!
//! # Layout
//! - [`arbiter`] - the real-time loop: address classification, bus drive and
//!   release, POKEY work in idle LOW cycles
//! - [`scheduler`] - debt-based step scheduler clocked by the CPU cycle counter
//! - [`bus`] - the hardware access trait a board support package implements
//! - [`rom`] - the ROM image lookup
//! - [`output`] - sample scaling for the audio output stage
//! - [`config`] - `const`-constructible board configuration
//!
//! # Quick start
//! ```no_run
//! use cart7800::{BusArbiter, CartConfig, CartridgeBus};
//! use pokey::Pokey;
//!
//! fn serve<B: CartridgeBus>(bus: &mut B, rom: &'static [u8]) -> ! {
//!     let now = bus.cycle_count();
//!     let mut arbiter = BusArbiter::new(CartConfig::new(), rom, Pokey::new(), now);
//!     arbiter.run(bus)
//! }
//! ```
//!
//! The core never allocates, never blocks, and has no error or logging path.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

pub mod arbiter;
pub mod bus;
pub mod config;
pub mod output;
pub mod rom;
pub mod scheduler;

// Public API exports
pub use arbiter::{BusArbiter, BusState, Iteration};
pub use bus::CartridgeBus;
pub use config::{ArbiterConfig, CartConfig, TimingPolicy};
pub use output::OutputScale;
pub use rom::{RomImage, OPEN_BUS};
pub use scheduler::{CatchUp, ElasticScheduler, SchedulerConfig};
