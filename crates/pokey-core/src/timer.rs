//! Channel timers
//!
//! Each audio channel owns an 8-bit divide-down counter. When the counter
//! underflows it is reloaded from the channel divisor (AUDFx) and the
//! channel's square-wave output flips.

/// Number of audio channels
pub const NUM_CHANNELS: usize = 4;

/// Divide-down timer for a single audio channel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelTimer {
    /// Reload value written through AUDFx
    divisor: u8,
    /// Current countdown
    counter: u8,
    /// Square-wave output bit
    output: bool,
}

impl ChannelTimer {
    /// Create a new timer with all state cleared
    pub const fn new() -> Self {
        Self {
            divisor: 0,
            counter: 0,
            output: false,
        }
    }

    /// Set the reload divisor (does not touch the running counter)
    #[inline]
    pub fn set_divisor(&mut self, divisor: u8) {
        self.divisor = divisor;
    }

    /// Current reload divisor
    #[inline]
    pub fn divisor(&self) -> u8 {
        self.divisor
    }

    /// Current countdown value
    #[inline]
    pub fn counter(&self) -> u8 {
        self.counter
    }

    /// Current output bit
    #[inline]
    pub fn output(&self) -> bool {
        self.output
    }

    /// Copy the divisor into the counter (STIMER)
    #[inline]
    pub fn reload(&mut self) {
        self.counter = self.divisor;
    }

    /// Clock the timer once
    ///
    /// A counter at zero reloads and toggles the output, otherwise it counts
    /// down, so the output holds for `divisor + 1` clocks.
    #[inline]
    pub fn clock(&mut self) {
        if self.counter == 0 {
            self.counter = self.divisor;
            self.output = !self.output;
        } else {
            self.counter -= 1;
        }
    }

    /// Volume-only mode: hold the output high, leave the counter alone
    #[inline]
    pub fn force_high(&mut self) {
        self.output = true;
    }

    /// Clear divisor, counter and output
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_creation() {
        let timer = ChannelTimer::new();
        assert_eq!(timer.divisor(), 0);
        assert_eq!(timer.counter(), 0);
        assert!(!timer.output());
    }

    #[test]
    fn test_half_period_is_divisor_plus_one() {
        let mut timer = ChannelTimer::new();
        timer.set_divisor(3);
        timer.reload();

        let mut toggles = Vec::new();
        let mut last = timer.output();
        for clock in 1..=16 {
            timer.clock();
            if timer.output() != last {
                toggles.push(clock);
                last = timer.output();
            }
        }
        assert_eq!(toggles, vec![4, 8, 12, 16]);
    }

    #[test]
    fn test_zero_divisor_toggles_every_clock() {
        let mut timer = ChannelTimer::new();
        timer.clock();
        assert!(timer.output());
        timer.clock();
        assert!(!timer.output());
    }

    #[test]
    fn test_set_divisor_keeps_counter() {
        let mut timer = ChannelTimer::new();
        timer.set_divisor(9);
        timer.reload();
        timer.set_divisor(200);
        assert_eq!(timer.counter(), 9);
        timer.reload();
        assert_eq!(timer.counter(), 200);
    }

    #[test]
    fn test_force_high_freezes_counter() {
        let mut timer = ChannelTimer::new();
        timer.set_divisor(5);
        timer.reload();
        timer.force_high();
        assert!(timer.output());
        assert_eq!(timer.counter(), 5);
    }
}
