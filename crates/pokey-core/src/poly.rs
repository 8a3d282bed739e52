//! Polynomial counters (noise generators)
//!
//! POKEY derives its noise from four linear-feedback shift registers of
//! 4, 5, 9 and 17 bits. Each one shifts left by one bit per full synthesis
//! cycle and feeds the XOR of two tap bits back into bit 0.

/// A single Fibonacci LFSR of fixed width
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolyCounter {
    /// Current register contents (confined to `width` bits)
    state: u32,
    /// Register width in bits
    width: u32,
    /// High feedback tap
    tap_hi: u32,
    /// Low feedback tap
    tap_lo: u32,
}

impl PolyCounter {
    /// Create a counter with the given width and tap positions, seeded all-ones
    pub const fn new(width: u32, tap_hi: u32, tap_lo: u32) -> Self {
        Self {
            state: Self::mask_for(width),
            width,
            tap_hi,
            tap_lo,
        }
    }

    /// 4-bit counter, taps 3 and 2
    pub const fn poly4() -> Self {
        Self::new(4, 3, 2)
    }

    /// 5-bit counter, taps 4 and 2
    pub const fn poly5() -> Self {
        Self::new(5, 4, 2)
    }

    /// 9-bit counter, taps 8 and 4
    pub const fn poly9() -> Self {
        Self::new(9, 8, 4)
    }

    /// 17-bit counter, taps 16 and 13
    pub const fn poly17() -> Self {
        Self::new(17, 16, 13)
    }

    #[inline]
    const fn mask_for(width: u32) -> u32 {
        (1 << width) - 1
    }

    /// Advance the register by one bit
    #[inline]
    pub fn step(&mut self) {
        let feedback = ((self.state >> self.tap_hi) ^ (self.state >> self.tap_lo)) & 1;
        self.state = ((self.state << 1) | feedback) & Self::mask_for(self.width);
    }

    /// Least-significant bit, the value sampled by the distortion gate
    #[inline]
    pub fn bit(&self) -> bool {
        self.state & 1 != 0
    }

    /// Raw register contents
    #[inline]
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Register width in bits
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Reload the all-ones seed
    pub fn reset(&mut self) {
        self.state = Self::mask_for(self.width);
    }
}

/// The four polynomial counters of one POKEY
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolyCounters {
    /// 4-bit counter
    pub poly4: PolyCounter,
    /// 5-bit counter
    pub poly5: PolyCounter,
    /// 9-bit counter
    pub poly9: PolyCounter,
    /// 17-bit counter
    pub poly17: PolyCounter,
}

impl PolyCounters {
    /// Create all four counters in their seeded state
    pub const fn new() -> Self {
        Self {
            poly4: PolyCounter::poly4(),
            poly5: PolyCounter::poly5(),
            poly9: PolyCounter::poly9(),
            poly17: PolyCounter::poly17(),
        }
    }

    /// Advance every counter by exactly one bit
    #[inline]
    pub fn step(&mut self) {
        self.poly4.step();
        self.poly5.step();
        self.poly9.step();
        self.poly17.step();
    }

    /// Pack the four low bits into a distortion table index
    ///
    /// bit0 = poly4, bit1 = poly5, bit2 = poly9, bit3 = poly17
    #[inline]
    pub fn noise_index(&self) -> usize {
        (self.poly4.bit() as usize)
            | (self.poly5.bit() as usize) << 1
            | (self.poly9.bit() as usize) << 2
            | (self.poly17.bit() as usize) << 3
    }

    /// Reseed all counters
    pub fn reset(&mut self) {
        self.poly4.reset();
        self.poly5.reset();
        self.poly9.reset();
        self.poly17.reset();
    }
}

impl Default for PolyCounters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_all_ones() {
        let polys = PolyCounters::new();
        assert_eq!(polys.poly4.state(), 0x0F);
        assert_eq!(polys.poly5.state(), 0x1F);
        assert_eq!(polys.poly9.state(), 0x1FF);
        assert_eq!(polys.poly17.state(), 0x1FFFF);
        assert_eq!(polys.noise_index(), 0x0F);
    }

    #[test]
    fn test_poly4_first_steps() {
        // 1111 -> taps 1^1 = 0 -> 1110 -> taps 1^1 = 0 -> 1100 -> 1^1 = 0 -> 1000 -> 1^0 = 1 -> 0001
        let mut poly = PolyCounter::poly4();
        poly.step();
        assert_eq!(poly.state(), 0b1110);
        poly.step();
        assert_eq!(poly.state(), 0b1100);
        poly.step();
        assert_eq!(poly.state(), 0b1000);
        poly.step();
        assert_eq!(poly.state(), 0b0001);
    }

    #[test]
    fn test_state_stays_within_width_and_never_locks() {
        let mut polys = PolyCounters::new();
        for _ in 0..10_000 {
            polys.step();
            for poly in [polys.poly4, polys.poly5, polys.poly9, polys.poly17] {
                assert!(poly.state() <= (1 << poly.width()) - 1);
                assert_ne!(poly.state(), 0, "width {} locked up", poly.width());
            }
        }
    }

    #[test]
    fn test_poly17_produces_both_bit_values() {
        let mut poly = PolyCounter::poly17();
        let mut ones = 0;
        for _ in 0..1000 {
            poly.step();
            if poly.bit() {
                ones += 1;
            }
        }
        assert!(ones > 100 && ones < 900, "unbalanced noise: {ones} ones");
    }

    #[test]
    fn test_reset_reseeds() {
        let mut polys = PolyCounters::new();
        for _ in 0..37 {
            polys.step();
        }
        polys.reset();
        assert_eq!(polys, PolyCounters::new());
    }
}
