//! POKEY audio core
//!
//! One audio sample is produced by nine micro-steps. Each call to
//! [`Pokey::tick_step`] performs exactly one of them in constant time, which
//! lets the bus loop spend at most one step's worth of time between two
//! address samples.

use crate::backend::PokeyBackend;
use crate::distortion;
use crate::poly::PolyCounters;
use crate::registers::{Register, RegisterBank, NUM_REGISTERS};
use crate::timer::{ChannelTimer, NUM_CHANNELS};

/// Position in the nine-step synthesis cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TickStep {
    /// Advance the polynomial counters, clear the accumulator
    #[default]
    Poly,
    /// Clock channel `n`'s timer (0-3)
    Timer(u8),
    /// Gate and accumulate channel `n`'s volume (0-3); the last one emits
    Mix(u8),
}

impl TickStep {
    /// Numeric step index, 0-8
    pub fn index(self) -> u8 {
        match self {
            TickStep::Poly => 0,
            TickStep::Timer(ch) => 1 + ch,
            TickStep::Mix(ch) => 5 + ch,
        }
    }

    /// Step that follows this one
    #[inline]
    fn next(self) -> Self {
        match self {
            TickStep::Poly => TickStep::Timer(0),
            TickStep::Timer(3) => TickStep::Mix(0),
            TickStep::Timer(ch) => TickStep::Timer(ch + 1),
            TickStep::Mix(3) => TickStep::Poly,
            TickStep::Mix(ch) => TickStep::Mix(ch + 1),
        }
    }
}

/// Tick-stepped POKEY audio emulator
///
/// # Example
///
/// ```
/// use pokey::Pokey;
///
/// let mut chip = Pokey::new();
/// chip.write_register(0x01, 0x1F); // AUDC1: volume-only, volume 15
///
/// let ready: Vec<bool> = (0..9).map(|_| chip.tick_step()).collect();
/// assert_eq!(ready.iter().filter(|&&r| r).count(), 1);
/// assert!(ready[8]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pokey {
    // Hardware registers
    registers: RegisterBank,

    // Generators
    timers: [ChannelTimer; NUM_CHANNELS],
    polys: PolyCounters,

    // Synthesis cycle
    step: TickStep,
    accumulator: u8,

    // Last finished sample
    output: u8,
}

impl Pokey {
    /// Create a new chip in its reset state
    pub const fn new() -> Self {
        Self {
            registers: RegisterBank::new(),
            timers: [ChannelTimer::new(); NUM_CHANNELS],
            polys: PolyCounters::new(),
            step: TickStep::Poly,
            accumulator: 0,
            output: 0,
        }
    }

    /// Reset the chip to its power-on state
    pub fn reset(&mut self) {
        self.registers.clear();
        for timer in self.timers.iter_mut() {
            timer.reset();
        }
        self.polys.reset();
        self.step = TickStep::Poly;
        self.accumulator = 0;
        self.output = 0;
    }

    /// Write to a register
    ///
    /// The address is masked to 4 bits. AUDFx also updates the channel
    /// divisor; any write to STIMER reloads every channel counter.
    pub fn write_register(&mut self, addr: u8, value: u8) {
        let register = Register::from_addr(addr);
        self.registers.write(register.addr(), value);

        if let Some(channel) = register.divisor_channel() {
            self.timers[channel].set_divisor(value);
        } else if register == Register::Stimer {
            for timer in self.timers.iter_mut() {
                timer.reload();
            }
        }
    }

    /// Read back a latched register value
    pub fn read_register(&self, addr: u8) -> u8 {
        self.registers.read(addr)
    }

    /// Run one micro-step of the synthesis cycle
    ///
    /// Returns `true` when the step completed a sample, readable through
    /// [`Pokey::output`].
    pub fn tick_step(&mut self) -> bool {
        let step = self.step;
        self.step = step.next();

        match step {
            TickStep::Poly => {
                self.polys.step();
                self.accumulator = 0;
                false
            }
            TickStep::Timer(ch) => {
                let ch = ch as usize;
                if self.registers.control(ch).is_volume_only() {
                    self.timers[ch].force_high();
                } else {
                    self.timers[ch].clock();
                }
                false
            }
            TickStep::Mix(ch) => {
                let index = ch as usize;
                let control = self.registers.control(index);
                if self.timers[index].output()
                    && distortion::gate(control.distortion(), self.polys.noise_index())
                {
                    self.accumulator += control.volume();
                }

                if ch == 3 {
                    self.output = scale_sum(self.accumulator);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Most recently finished sample
    #[inline]
    pub fn output(&self) -> u8 {
        self.output
    }

    /// Current position in the synthesis cycle
    pub fn current_step(&self) -> TickStep {
        self.step
    }

    /// Timer state of a channel (0-3)
    pub fn channel(&self, channel: usize) -> &ChannelTimer {
        &self.timers[channel & 0x03]
    }

    /// Polynomial counter state
    pub fn polys(&self) -> &PolyCounters {
        &self.polys
    }

    /// Snapshot of all latched registers
    pub fn registers(&self) -> [u8; NUM_REGISTERS] {
        *self.registers.as_array()
    }
}

/// Map the 0-60 volume sum onto 0-255 (x 4.25, truncated)
#[inline]
fn scale_sum(sum: u8) -> u8 {
    let sum = sum as u16;
    ((sum << 2) + (sum >> 2)) as u8
}

impl Default for Pokey {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// PokeyBackend trait implementation
// =============================================================================

impl PokeyBackend for Pokey {
    fn reset(&mut self) {
        Pokey::reset(self)
    }

    fn write_register(&mut self, addr: u8, value: u8) {
        Pokey::write_register(self, addr, value)
    }

    fn read_register(&self, addr: u8) -> u8 {
        Pokey::read_register(self, addr)
    }

    fn dump_registers(&self) -> [u8; NUM_REGISTERS] {
        self.registers()
    }

    fn tick_step(&mut self) -> bool {
        Pokey::tick_step(self)
    }

    fn output(&self) -> u8 {
        Pokey::output(self)
    }
}

// =============================================================================
// Tests
// =============================================================================
