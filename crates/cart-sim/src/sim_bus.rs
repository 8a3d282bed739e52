//! Simulated host bus
//!
//! [`TraceGenerator`] produces one [`BusCycle`] per host bus cycle: MARIA DMA
//! at the start of every scanline, then CPU cycles split between ROM fetches
//! and LOW-region RAM accesses, with scripted POKEY writes slotted into the
//! first CPU cycle at or after their due time. [`SimulatedBus`] presents the
//! current cycle to the arbiter through [`CartridgeBus`] and records what the
//! firmware did with it.
//!
//! The firmware loop runs once per bus cycle here; the real board manages
//! several hundred iterations per cycle, so this is the pessimistic case for
//! draining the step backlog.

use crate::config::{SimConfig, CYCLES_PER_LINE};
use crate::script::{RegisterWrite, WriteScript};
use cart7800::CartridgeBus;

/// First address of 7800 system RAM
pub const RAM_BASE: u16 = 0x1800;

/// Size of 7800 system RAM
pub const RAM_LEN: u32 = 0x1000;

/// Deterministic linear congruential generator
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    /// Seeded generator
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Next 15-bit value
    pub fn next_u15(&mut self) -> u16 {
        self.state = self.state.wrapping_mul(214013).wrapping_add(2531011);
        ((self.state >> 16) & 0x7fff) as u16
    }

    /// Uniform value in `0..n` (`n` > 0)
    pub fn below(&mut self, n: u32) -> u32 {
        let r = ((self.next_u15() as u64) << 15) | self.next_u15() as u64;
        ((r * n as u64) >> 30) as u32
    }

    /// True with probability `p`
    pub fn chance(&mut self, p: f64) -> bool {
        (self.next_u15() as f64 / 32768.0) < p
    }
}

/// What the host puts on the bus for one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BusCycle {
    /// Address bus
    pub address: u16,
    /// Data bus as driven by the host (meaningful on writes)
    pub data: u8,
    /// Write strobe
    pub write: bool,
    /// CPU owns the bus (not halted for DMA)
    pub cpu_active: bool,
}

/// Host bus cycle source
#[derive(Debug, Clone)]
pub struct TraceGenerator<'s> {
    writes: &'s [RegisterWrite],
    next_write: usize,
    rng: Lcg,
    cycle: u64,
    host_hz: f64,
    window: u16,
    rom_base: u16,
    rom_len: u32,
    rom_fetch_ratio: f64,
    dma_cycles: u32,
}

impl<'s> TraceGenerator<'s> {
    /// Trace for a ROM of `rom_len` bytes at `rom_base`
    pub fn new(config: &SimConfig, rom_base: u16, rom_len: usize, script: &'s WriteScript) -> Self {
        Self {
            writes: script.writes(),
            next_write: 0,
            rng: Lcg::new(config.seed),
            cycle: 0,
            host_hz: config.host_clock_hz as f64,
            window: config.register_window & 0xFFF0,
            rom_base,
            rom_len: rom_len.min(0x10000 - rom_base as usize) as u32,
            rom_fetch_ratio: config.rom_fetch_ratio,
            dma_cycles: config.dma_cycles_per_line,
        }
    }

    /// Index of the next cycle
    pub fn cycle_index(&self) -> u64 {
        self.cycle
    }

    /// Writes not yet issued
    pub fn pending_writes(&self) -> usize {
        self.writes.len() - self.next_write
    }

    fn write_due(&self) -> Option<RegisterWrite> {
        let w = *self.writes.get(self.next_write)?;
        (w.at * self.host_hz <= self.cycle as f64).then_some(w)
    }

    fn fetch_address(&mut self) -> u16 {
        if self.rom_len > 0 && self.rng.chance(self.rom_fetch_ratio) {
            self.rom_base + self.rng.below(self.rom_len) as u16
        } else {
            RAM_BASE + self.rng.below(RAM_LEN) as u16
        }
    }

    /// Produce the next bus cycle
    pub fn next_cycle(&mut self) -> BusCycle {
        let dma = (self.cycle % CYCLES_PER_LINE as u64) < self.dma_cycles as u64;

        let bus = match self.write_due() {
            Some(w) if !dma => {
                self.next_write += 1;
                BusCycle {
                    address: self.window | w.register as u16,
                    data: w.value,
                    write: true,
                    cpu_active: true,
                }
            }
            _ => BusCycle {
                address: self.fetch_address(),
                data: self.rng.next_u15() as u8,
                write: false,
                cpu_active: !dma,
            },
        };

        self.cycle += 1;
        bus
    }
}

impl Iterator for TraceGenerator<'_> {
    type Item = BusCycle;

    fn next(&mut self) -> Option<BusCycle> {
        Some(self.next_cycle())
    }
}

/// Counters for what the firmware did on the bus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusStats {
    /// Cycles presented
    pub bus_cycles: u64,
    /// Transitions into driving
    pub rom_drives: u64,
    /// Data changes while already driving
    pub rom_updates: u64,
    /// Transitions out of driving
    pub releases: u64,
    /// Host writes the firmware latched
    pub sniffed_writes: u64,
    /// Data-line drives issued while the host was writing
    pub contended_cycles: u64,
}

/// [`CartridgeBus`] over a generated trace
#[derive(Debug, Clone)]
pub struct SimulatedBus {
    current: BusCycle,
    now: u64,
    cpu_cycles_per_bus: f64,
    driving: bool,
    samples: Vec<u16>,
    stats: BusStats,
}

impl SimulatedBus {
    /// Bus whose firmware cycle counter advances `cpu_cycles_per_bus` per cycle
    pub fn new(cpu_cycles_per_bus: f64) -> Self {
        Self {
            current: BusCycle::default(),
            now: 0,
            cpu_cycles_per_bus,
            driving: false,
            samples: Vec::new(),
            stats: BusStats::default(),
        }
    }

    /// Put the next host cycle on the bus
    pub fn present(&mut self, cycle: BusCycle) {
        self.now = self.stats.bus_cycles;
        self.stats.bus_cycles += 1;
        self.current = cycle;
    }

    fn note_drive(&mut self) {
        if self.current.write {
            self.stats.contended_cycles += 1;
        }
    }

    /// Cycle currently on the bus
    pub fn current(&self) -> BusCycle {
        self.current
    }

    /// Whether the firmware is driving the data lines
    pub fn is_driving(&self) -> bool {
        self.driving
    }

    /// Samples emitted so far
    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    /// Take the emitted samples
    pub fn take_samples(&mut self) -> Vec<u16> {
        std::mem::take(&mut self.samples)
    }

    /// Bus counters
    pub fn stats(&self) -> BusStats {
        self.stats
    }
}

impl CartridgeBus for SimulatedBus {
    fn sample_address(&mut self) -> u16 {
        self.current.address
    }

    fn drive_data(&mut self, _data: u8) {
        self.note_drive();
        self.driving = true;
        self.stats.rom_drives += 1;
    }

    fn update_data(&mut self, _data: u8) {
        self.note_drive();
        self.stats.rom_updates += 1;
    }

    fn release_bus(&mut self) {
        self.driving = false;
        self.stats.releases += 1;
    }

    fn read_data(&mut self) -> u8 {
        if self.current.write {
            self.stats.sniffed_writes += 1;
        }
        self.current.data
    }

    fn cpu_active(&mut self) -> bool {
        self.current.cpu_active
    }

    fn write_strobe_active(&mut self) -> bool {
        self.current.write
    }

    fn cycle_count(&mut self) -> u32 {
        (self.now as f64 * self.cpu_cycles_per_bus) as u64 as u32
    }

    fn emit_sample(&mut self, level: u16) {
        self.samples.push(level);
    }
}
