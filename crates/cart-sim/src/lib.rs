//! Host-side tooling for the 7800 cartridge core
//!
//! Loads cartridge images (raw or `.a78`), checks what the console's BIOS
//! will look for, and renders POKEY audio by running the firmware core
//! against a simulated host bus.
//!
//! # Quick start
//! ```no_run
//! use cart7800_sim::{export_to_wav, render, LoadedRom, SimConfig, WriteScript};
//!
//! # fn main() -> cart7800_sim::Result<()> {
//! let rom = LoadedRom::from_file("game.a78")?;
//! let script = WriteScript::from_file("tune.json")?;
//! let report = render(&rom, &SimConfig::default(), &script, script.duration() + 1.0)?;
//! export_to_wav(&report, "tune.wav")?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod a78;
pub mod config;
pub mod error;
pub mod render;
pub mod script;
pub mod sim_bus;
pub mod wav;

pub use a78::{A78Header, CartType, ControlByte, LoadedRom, TvFormat};
pub use config::SimConfig;
pub use error::{Result, SimError};
pub use render::{render, RenderReport};
pub use script::{RegisterWrite, WriteScript};
pub use sim_bus::{BusCycle, BusStats, SimulatedBus, TraceGenerator};
pub use wav::export_to_wav;
