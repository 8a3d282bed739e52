//! Board configuration
//!
//! Everything that differs between boards or builds: where the ROM and the
//! POKEY window live, how the scheduler is clocked and how samples are scaled
//! for the output stage. All of it is `const`-constructible so a firmware
//! image can bake it in.

use crate::output::OutputScale;
use crate::rom::DEFAULT_ROM_BASE;
use crate::scheduler::SchedulerConfig;

/// POKEY window on a stock 7800 cartridge ($0450-$045F)
pub const DEFAULT_REGISTER_WINDOW: u16 = 0x0450;

/// Reference core clock (overclocked Teensy 4.1)
pub const DEFAULT_CPU_HZ: u32 = 816_000_000;

/// Reference output sample rate
pub const DEFAULT_SAMPLE_RATE: u32 = 64_000;

/// When the arbiter samples the cycle counter for the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimingPolicy {
    /// Only while the host CPU owns the bus; time spent under DMA is caught
    /// up on the next CPU-owned LOW cycle
    #[default]
    CpuActiveOnly,
    /// On every LOW-region iteration, DMA or not
    Always,
}

/// Arbiter behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArbiterConfig {
    /// First address of the 16-register POKEY window (low nibble ignored)
    pub register_window: u16,
    /// Cycle-counter sampling policy
    pub timing: TimingPolicy,
    /// Read the address twice and skip the iteration when the reads differ
    pub double_sample: bool,
    /// Scale applied before samples are emitted
    pub output: OutputScale,
}

impl ArbiterConfig {
    /// Stock configuration
    pub const DEFAULT: Self = Self {
        register_window: DEFAULT_REGISTER_WINDOW,
        timing: TimingPolicy::CpuActiveOnly,
        double_sample: false,
        output: OutputScale::PWM_1500,
    };

    /// Window base with the low nibble cleared
    #[inline(always)]
    pub fn window_base(&self) -> u16 {
        self.register_window & 0xFFF0
    }
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Full cartridge configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartConfig {
    /// First address answered from the ROM image
    pub rom_base: u16,
    /// Arbiter behaviour
    pub arbiter: ArbiterConfig,
    /// Scheduler timing
    pub scheduler: SchedulerConfig,
}

impl CartConfig {
    /// 48K cartridge, POKEY at $0450, 816 MHz / 64 kHz
    pub const fn new() -> Self {
        Self {
            rom_base: DEFAULT_ROM_BASE,
            arbiter: ArbiterConfig::DEFAULT,
            scheduler: SchedulerConfig::for_clock(DEFAULT_CPU_HZ, DEFAULT_SAMPLE_RATE, 1),
        }
    }
}

impl Default for CartConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = CartConfig::default();
        assert_eq!(cfg.rom_base, 0x4000);
        assert_eq!(cfg.arbiter.window_base(), 0x0450);
        assert_eq!(cfg.arbiter.timing, TimingPolicy::CpuActiveOnly);
        assert!(!cfg.arbiter.double_sample);
        assert_eq!(cfg.scheduler.period, 1417);
    }

    #[test]
    fn test_window_base_ignores_low_nibble() {
        let cfg = ArbiterConfig {
            register_window: 0x046A,
            ..ArbiterConfig::DEFAULT
        };
        assert_eq!(cfg.window_base(), 0x0460);
    }
}
