//! Backend trait abstraction for POKEY chip implementations
//!
//! The bus arbiter only needs a handful of operations from the sound core.
//! Keeping them behind a trait lets the arbiter run against the real
//! [`crate::Pokey`] or against an instrumented stand-in in tests.

use crate::registers::NUM_REGISTERS;

/// Common interface for POKEY backends
///
/// Every method is called from inside the real-time bus loop and must
/// complete in bounded time without allocating.
///
/// # Example
///
/// ```
/// use pokey::{Pokey, PokeyBackend};
///
/// fn one_sample<B: PokeyBackend>(chip: &mut B) -> u8 {
///     while !chip.tick_step() {}
///     chip.output()
/// }
///
/// let mut chip = Pokey::new();
/// chip.write_register(0x01, 0xBF); // AUDC1: pure tone, volume-only, volume 15
/// assert_eq!(one_sample(&mut chip), 63);
/// ```
pub trait PokeyBackend {
    /// Reset the backend to its power-on state
    fn reset(&mut self);

    /// Write to a POKEY register
    ///
    /// # Arguments
    ///
    /// * `addr` - Register address, masked to 0x00-0x0F
    /// * `value` - Register value
    fn write_register(&mut self, addr: u8, value: u8);

    /// Read back the value last written to a register
    fn read_register(&self, addr: u8) -> u8;

    /// Dump all 16 latched registers
    fn dump_registers(&self) -> [u8; NUM_REGISTERS];

    /// Run one synthesis micro-step
    ///
    /// # Returns
    ///
    /// `true` when a new sample became available
    fn tick_step(&mut self) -> bool;

    /// Most recently completed 8-bit sample
    fn output(&self) -> u8;

    /// Load all 16 registers in address order
    fn load_registers(&mut self, regs: &[u8; NUM_REGISTERS]) {
        for (addr, &value) in regs.iter().enumerate() {
            self.write_register(addr as u8, value);
        }
    }
}
