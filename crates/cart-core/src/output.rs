//! Audio output scaling
//!
//! The chip produces 0-255. The output stage (a PWM compare register on the
//! reference board) wants its own range, so samples go through a fixed
//! multiply-and-shift before they are emitted.

/// Linear `(sample * multiplier) >> shift` scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputScale {
    /// Multiplier applied to the raw sample
    pub multiplier: u16,
    /// Right shift applied after the multiply
    pub shift: u8,
}

impl OutputScale {
    /// Pass samples through unchanged
    pub const IDENTITY: Self = Self::new(1, 0);

    /// 375 kHz PWM with a 1500-count period
    pub const PWM_1500: Self = Self::new(1500, 8);

    /// Build a scale
    pub const fn new(multiplier: u16, shift: u8) -> Self {
        Self { multiplier, shift }
    }

    /// Scale one sample
    #[inline(always)]
    pub fn apply(&self, sample: u8) -> u16 {
        (sample as u32 * self.multiplier as u32)
            .checked_shr(self.shift as u32)
            .unwrap_or(0) as u16
    }

    /// Output value for a full-scale (255) sample
    pub fn full_scale(&self) -> u16 {
        self.apply(u8::MAX)
    }
}

impl Default for OutputScale {
    fn default() -> Self {
        Self::PWM_1500
    }
}
