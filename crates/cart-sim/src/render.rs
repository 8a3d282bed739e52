//! Offline rendering
//!
//! Runs the real [`BusArbiter`] and [`Pokey`] core against a generated host
//! bus trace and collects the samples the firmware emits.

use crate::a78::LoadedRom;
use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::script::WriteScript;
use crate::sim_bus::{BusStats, SimulatedBus, TraceGenerator};
use cart7800::BusArbiter;
use log::{debug, info, warn};
use pokey::Pokey;

/// Result of a render
#[derive(Debug, Clone)]
pub struct RenderReport {
    /// Emitted samples, already scaled for the output stage
    pub samples: Vec<u16>,
    /// Output value of a full-scale sample
    pub full_scale: u16,
    /// Nominal sample rate
    pub sample_rate: u32,
    /// Simulated time
    pub seconds: f64,
    /// Bus counters
    pub stats: BusStats,
    /// Final POKEY register file
    pub registers: [u8; 16],
}

impl RenderReport {
    /// Effective sample rate over the render
    pub fn achieved_rate(&self) -> f64 {
        self.samples.len() as f64 / self.seconds
    }
}

/// Render `seconds` of host time
pub fn render(
    rom: &LoadedRom,
    config: &SimConfig,
    script: &WriteScript,
    seconds: f64,
) -> Result<RenderReport> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(SimError::Config(format!("render length {seconds} is not positive")));
    }

    let cart = config.cart_config(rom.base)?;
    let window = cart.arbiter.window_base();
    if window >= cart.rom_base {
        warn!(
            "register window ${:04X} lies inside the ROM region (>= ${:04X}); writes will not be seen",
            window, cart.rom_base
        );
    }
    if script.duration() > seconds {
        warn!(
            "script runs to {:.3}s but only {:.3}s is rendered",
            script.duration(),
            seconds
        );
    }

    let bus_cycles = (seconds * config.host_clock_hz as f64).round() as u64;
    info!(
        "Rendering {:.3}s ({} bus cycles, scheduler period {} cycles)",
        seconds, bus_cycles, cart.scheduler.period
    );

    let mut trace = TraceGenerator::new(config, cart.rom_base, rom.data.len(), script);
    let mut bus = SimulatedBus::new(config.cpu_cycles_per_bus_cycle());
    let mut arbiter = BusArbiter::new(cart, &rom.data, Pokey::new(), 0);

    for _ in 0..bus_cycles {
        bus.present(trace.next_cycle());
        arbiter.step(&mut bus);
    }

    let stats = bus.stats();
    debug!("{stats:?}");
    if stats.contended_cycles > 0 {
        warn!("{} cycles with bus contention", stats.contended_cycles);
    }
    if trace.pending_writes() > 0 {
        warn!("{} scripted writes were not issued", trace.pending_writes());
    }
    let backlog = arbiter.scheduler().debt();
    if backlog > 0 {
        debug!("{backlog} steps still owed at end of render");
    }

    let report = RenderReport {
        samples: bus.take_samples(),
        full_scale: cart.arbiter.output.full_scale(),
        sample_rate: config.sample_rate,
        seconds,
        stats,
        registers: arbiter.chip().registers(),
    };
    info!(
        "{} samples ({:.1} Hz effective)",
        report.samples.len(),
        report.achieved_rate()
    );
    Ok(report)
}
