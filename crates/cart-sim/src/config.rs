//! Simulation configuration
//!
//! JSON-loadable settings for the firmware core and for the simulated host
//! bus. Every field has a default, so `{}` is a valid configuration.

use crate::error::{Result, SimError};
use cart7800::config::{DEFAULT_CPU_HZ, DEFAULT_REGISTER_WINDOW, DEFAULT_SAMPLE_RATE};
use cart7800::scheduler::DEFAULT_MAX_DEBT;
use cart7800::{ArbiterConfig, CartConfig, CatchUp, OutputScale, SchedulerConfig, TimingPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// NTSC 7800 bus clock
pub const NTSC_BUS_HZ: u32 = 1_789_772;

/// Bus cycles per scanline
pub const CYCLES_PER_LINE: u32 = 114;

/// Cycle-counter sampling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timing {
    /// Sample only while the CPU owns the bus
    #[default]
    CpuActiveOnly,
    /// Sample on every LOW iteration
    Always,
}

impl From<Timing> for TimingPolicy {
    fn from(t: Timing) -> Self {
        match t {
            Timing::CpuActiveOnly => TimingPolicy::CpuActiveOnly,
            Timing::Always => TimingPolicy::Always,
        }
    }
}

/// Scheduler catch-up mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatchUpMode {
    /// All elapsed periods
    #[default]
    All,
    /// One period per call
    Single,
}

impl From<CatchUpMode> for CatchUp {
    fn from(m: CatchUpMode) -> Self {
        match m {
            CatchUpMode::All => CatchUp::All,
            CatchUpMode::Single => CatchUp::Single,
        }
    }
}

/// Firmware and host bus settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// ROM base override; placement follows the image size when unset
    pub rom_base: Option<u16>,
    /// POKEY register window
    pub register_window: u16,
    /// Firmware core clock
    pub cpu_clock_hz: u32,
    /// Target output sample rate
    pub sample_rate: u32,
    /// Steps owed per scheduler period (1 or 9)
    pub debt_unit: u32,
    /// Backlog ceiling
    pub max_debt: u32,
    /// Scheduler catch-up mode
    pub catch_up: CatchUpMode,
    /// Cycle-counter sampling policy
    pub timing: Timing,
    /// Double-sample the address bus
    pub double_sample: bool,
    /// Output scale multiplier
    pub output_multiplier: u16,
    /// Output scale shift
    pub output_shift: u8,
    /// Host bus clock
    pub host_clock_hz: u32,
    /// Fraction of CPU cycles that fetch from ROM
    pub rom_fetch_ratio: f64,
    /// MARIA DMA cycles at the start of each scanline
    pub dma_cycles_per_line: u32,
    /// Trace PRNG seed
    pub seed: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rom_base: None,
            register_window: DEFAULT_REGISTER_WINDOW,
            cpu_clock_hz: DEFAULT_CPU_HZ,
            sample_rate: DEFAULT_SAMPLE_RATE,
            debt_unit: 1,
            max_debt: DEFAULT_MAX_DEBT,
            catch_up: CatchUpMode::All,
            timing: Timing::CpuActiveOnly,
            double_sample: false,
            output_multiplier: OutputScale::PWM_1500.multiplier,
            output_shift: OutputScale::PWM_1500.shift,
            host_clock_hz: NTSC_BUS_HZ,
            rom_fetch_ratio: 0.5,
            dma_cycles_per_line: 24,
            seed: 0x7800,
        }
    }
}

impl SimConfig {
    /// Parse from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject settings the firmware or the simulator cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.cpu_clock_hz == 0 {
            return Err(SimError::Config("cpu_clock_hz must be non-zero".into()));
        }
        if self.sample_rate == 0 {
            return Err(SimError::Config("sample_rate must be non-zero".into()));
        }
        if self.debt_unit == 0 {
            return Err(SimError::Config("debt_unit must be non-zero".into()));
        }
        if self.max_debt < self.debt_unit {
            return Err(SimError::Config(format!(
                "max_debt {} is below debt_unit {}",
                self.max_debt, self.debt_unit
            )));
        }
        if self.output_shift >= 32 {
            return Err(SimError::Config(format!(
                "output_shift {} out of range",
                self.output_shift
            )));
        }
        if self.host_clock_hz == 0 {
            return Err(SimError::Config("host_clock_hz must be non-zero".into()));
        }
        if !(0.0..=1.0).contains(&self.rom_fetch_ratio) {
            return Err(SimError::Config(format!(
                "rom_fetch_ratio {} not in [0, 1]",
                self.rom_fetch_ratio
            )));
        }
        if self.dma_cycles_per_line >= CYCLES_PER_LINE {
            return Err(SimError::Config(format!(
                "dma_cycles_per_line {} leaves no CPU cycles",
                self.dma_cycles_per_line
            )));
        }
        Ok(())
    }

    /// Scheduler settings derived from the clocks
    pub fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig::for_clock(self.cpu_clock_hz, self.sample_rate, self.debt_unit)
            .with_max_debt(self.max_debt)
            .with_catch_up(self.catch_up.into())
    }

    /// Output scale
    pub fn output_scale(&self) -> OutputScale {
        OutputScale::new(self.output_multiplier, self.output_shift)
    }

    /// Core configuration for an image placed at `default_base`
    pub fn cart_config(&self, default_base: u16) -> Result<CartConfig> {
        self.validate()?;
        Ok(CartConfig {
            rom_base: self.rom_base.unwrap_or(default_base),
            arbiter: ArbiterConfig {
                register_window: self.register_window,
                timing: self.timing.into(),
                double_sample: self.double_sample,
                output: self.output_scale(),
            },
            scheduler: self.scheduler(),
        })
    }

    /// Firmware cycles elapsed per host bus cycle
    pub fn cpu_cycles_per_bus_cycle(&self) -> f64 {
        self.cpu_clock_hz as f64 / self.host_clock_hz as f64
    }
}
