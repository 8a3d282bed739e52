//! POKEY Audio Register Definitions
//!
//! Defines the 16 write-only registers sniffed from the cartridge bus. Only
//! the audio half of POKEY is emulated; the remaining addresses are latched
//! so the bank stays a faithful record of what the host wrote.

use bitflags::bitflags;
use core::fmt;

/// Number of addressable registers
pub const NUM_REGISTERS: usize = 16;

/// POKEY register address (write side)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// Channel 1 frequency divisor - $00
    Audf1 = 0x00,
    /// Channel 1 control - $01
    Audc1 = 0x01,
    /// Channel 2 frequency divisor - $02
    Audf2 = 0x02,
    /// Channel 2 control - $03
    Audc2 = 0x03,
    /// Channel 3 frequency divisor - $04
    Audf3 = 0x04,
    /// Channel 3 control - $05
    Audc3 = 0x05,
    /// Channel 4 frequency divisor - $06
    Audf4 = 0x06,
    /// Channel 4 control - $07
    Audc4 = 0x07,
    /// Global audio control - $08
    Audctl = 0x08,
    /// Start timers (force reload of all counters) - $09
    Stimer = 0x09,
    /// Reset serial status - $0A
    Skres = 0x0A,
    /// Start pot scan - $0B
    Potgo = 0x0B,
    /// Unused - $0C
    Unused = 0x0C,
    /// Serial output - $0D
    Serout = 0x0D,
    /// Interrupt enable - $0E
    Irqen = 0x0E,
    /// Serial port control - $0F
    Skctl = 0x0F,
}

impl Register {
    /// Convert a raw address to a register (wraps modulo 16)
    pub fn from_addr(addr: u8) -> Self {
        match addr & 0x0F {
            0x00 => Register::Audf1,
            0x01 => Register::Audc1,
            0x02 => Register::Audf2,
            0x03 => Register::Audc2,
            0x04 => Register::Audf3,
            0x05 => Register::Audc3,
            0x06 => Register::Audf4,
            0x07 => Register::Audc4,
            0x08 => Register::Audctl,
            0x09 => Register::Stimer,
            0x0A => Register::Skres,
            0x0B => Register::Potgo,
            0x0C => Register::Unused,
            0x0D => Register::Serout,
            0x0E => Register::Irqen,
            _ => Register::Skctl,
        }
    }

    /// Get the register address value
    pub fn addr(&self) -> u8 {
        *self as u8
    }

    /// Channel whose divisor this register holds, if any
    #[inline]
    pub fn divisor_channel(&self) -> Option<usize> {
        let addr = self.addr();
        (addr < 8 && addr & 1 == 0).then_some((addr >> 1) as usize)
    }

    /// Divisor register for a channel (0-3)
    pub fn audf(channel: usize) -> Self {
        Self::from_addr((channel as u8 & 0x03) << 1)
    }

    /// Control register for a channel (0-3)
    pub fn audc(channel: usize) -> Self {
        Self::from_addr(((channel as u8 & 0x03) << 1) | 1)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::Audf1 => write!(f, "$00 (AUDF1 Channel 1 Divisor)"),
            Register::Audc1 => write!(f, "$01 (AUDC1 Channel 1 Control)"),
            Register::Audf2 => write!(f, "$02 (AUDF2 Channel 2 Divisor)"),
            Register::Audc2 => write!(f, "$03 (AUDC2 Channel 2 Control)"),
            Register::Audf3 => write!(f, "$04 (AUDF3 Channel 3 Divisor)"),
            Register::Audc3 => write!(f, "$05 (AUDC3 Channel 3 Control)"),
            Register::Audf4 => write!(f, "$06 (AUDF4 Channel 4 Divisor)"),
            Register::Audc4 => write!(f, "$07 (AUDC4 Channel 4 Control)"),
            Register::Audctl => write!(f, "$08 (AUDCTL Audio Control)"),
            Register::Stimer => write!(f, "$09 (STIMER Start Timers)"),
            Register::Skres => write!(f, "$0A (SKRES Serial Reset)"),
            Register::Potgo => write!(f, "$0B (POTGO Pot Scan)"),
            Register::Unused => write!(f, "$0C (Unused)"),
            Register::Serout => write!(f, "$0D (SEROUT Serial Out)"),
            Register::Irqen => write!(f, "$0E (IRQEN Interrupt Enable)"),
            Register::Skctl => write!(f, "$0F (SKCTL Serial Control)"),
        }
    }
}

bitflags! {
    /// Channel control register (AUDCx) layout
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AudioControl: u8 {
        /// Volume, 0-15
        const VOLUME = 0x0F;
        /// Volume-only mode: output held high, timer frozen
        const VOLUME_ONLY = 0x10;
        /// Distortion selector, 3 bits
        const DISTORTION = 0xE0;
    }
}

impl AudioControl {
    /// Wrap a raw AUDCx value
    #[inline]
    pub fn from_raw(value: u8) -> Self {
        Self::from_bits_retain(value)
    }

    /// Volume nibble (0-15)
    #[inline]
    pub fn volume(self) -> u8 {
        self.bits() & Self::VOLUME.bits()
    }

    /// Distortion mode index (0-7)
    #[inline]
    pub fn distortion(self) -> usize {
        ((self.bits() & Self::DISTORTION.bits()) >> 5) as usize
    }

    /// True when the channel timer is frozen and its output forced high
    #[inline]
    pub fn is_volume_only(self) -> bool {
        self.contains(Self::VOLUME_ONLY)
    }
}

/// Raw register bank (16 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterBank {
    /// Register values $00-$0F
    pub registers: [u8; NUM_REGISTERS],
}

impl RegisterBank {
    /// Create a new register bank with all values set to 0
    pub const fn new() -> Self {
        RegisterBank {
            registers: [0; NUM_REGISTERS],
        }
    }

    /// Read a latched register value
    #[inline]
    pub fn read(&self, addr: u8) -> u8 {
        self.registers[(addr & 0x0F) as usize]
    }

    /// Latch a register value
    #[inline]
    pub fn write(&mut self, addr: u8, value: u8) {
        self.registers[(addr & 0x0F) as usize] = value;
    }

    /// Control register of a channel (0-3)
    #[inline]
    pub fn control(&self, channel: usize) -> AudioControl {
        AudioControl::from_raw(self.registers[(channel & 0x03) * 2 + 1])
    }

    /// Get all registers
    pub fn as_array(&self) -> &[u8; NUM_REGISTERS] {
        &self.registers
    }

    /// Clear every register
    pub fn clear(&mut self) {
        self.registers = [0; NUM_REGISTERS];
    }
}

impl Default for RegisterBank {
    fn default() -> Self {
        Self::new()
    }
}
