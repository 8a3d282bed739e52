//! Hardware access seam
//!
//! Everything the arbiter touches on the physical board goes through
//! [`CartridgeBus`]. A firmware target implements it with GPIO and PWM
//! register accesses; host tools implement it over a recorded or synthetic
//! bus trace.

/// Narrow interface to the cartridge slot signals
///
/// All methods are called from the real-time loop with interrupts disabled.
/// Implementations must be single loads/stores where the hardware allows it
/// and must never block.
pub trait CartridgeBus {
    /// Sample the 16 address lines in one read
    fn sample_address(&mut self) -> u16;

    /// Take ownership of the data bus and put `data` on it
    fn drive_data(&mut self, data: u8);

    /// Change the byte on a bus this side already drives
    ///
    /// Targets where switching direction is expensive override this to only
    /// touch the data lines.
    #[inline]
    fn update_data(&mut self, data: u8) {
        self.drive_data(data);
    }

    /// Tri-state the data lines and hand the bus back to the host
    fn release_bus(&mut self);

    /// Read the byte the host is putting on the data bus
    fn read_data(&mut self) -> u8;

    /// True while the host CPU (not the DMA engine) owns the bus
    fn cpu_active(&mut self) -> bool;

    /// True while the current bus cycle is a write
    fn write_strobe_active(&mut self) -> bool;

    /// Free-running CPU cycle counter (wraps at 2^32)
    fn cycle_count(&mut self) -> u32;

    /// Hand a finished, already scaled sample to the audio output
    fn emit_sample(&mut self, level: u16);
}
