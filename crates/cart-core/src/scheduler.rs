//! Elastic synthesis scheduler
//!
//! Converts the free-running CPU cycle counter into a backlog ("debt") of
//! synthesis steps. The reference point advances by whole periods only, so
//! rounding never accumulates into pitch drift. The backlog is capped: after
//! a long stall the excess is dropped instead of being caught up.

/// Steps in one full POKEY sample
pub const STEPS_PER_SAMPLE: u32 = 9;

/// Default backlog ceiling
pub const DEFAULT_MAX_DEBT: u32 = 2000;

/// How many periods a single call may account for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CatchUp {
    /// Every whole period elapsed since the last call
    #[default]
    All,
    /// At most one period per call
    Single,
}

/// Scheduler timing constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// CPU cycles per debt increment
    pub period: u32,
    /// Steps added per elapsed period (1 = per micro-step, 9 = per sample)
    pub unit: u32,
    /// Backlog ceiling
    pub max_debt: u32,
    /// Catch-up behaviour
    pub catch_up: CatchUp,
}

impl SchedulerConfig {
    /// Derive the period from the CPU clock and the target sample rate
    ///
    /// `unit` steps are owed every `cpu_hz * unit / (sample_rate * 9)`
    /// cycles, rounded to nearest. 816 MHz at 64 kHz with unit 1 gives 1417.
    pub const fn for_clock(cpu_hz: u32, sample_rate: u32, unit: u32) -> Self {
        let cycles = cpu_hz as u64 * unit as u64;
        let per = sample_rate as u64 * STEPS_PER_SAMPLE as u64;
        let period = if per == 0 { 0 } else { (cycles + per / 2) / per };
        Self {
            period: if period == 0 { 1 } else { period as u32 },
            unit,
            max_debt: DEFAULT_MAX_DEBT,
            catch_up: CatchUp::All,
        }
    }

    /// Replace the backlog ceiling
    pub const fn with_max_debt(mut self, max_debt: u32) -> Self {
        self.max_debt = max_debt;
        self
    }

    /// Replace the catch-up behaviour
    pub const fn with_catch_up(mut self, catch_up: CatchUp) -> Self {
        self.catch_up = catch_up;
        self
    }
}

impl Default for SchedulerConfig {
    /// 816 MHz core, 64 kHz output, one debt unit per micro-step
    fn default() -> Self {
        Self::for_clock(816_000_000, 64_000, 1)
    }
}

/// Debt-based step scheduler
#[derive(Debug, Clone)]
pub struct ElasticScheduler {
    config: SchedulerConfig,
    /// Cycle stamp of the last accounted period boundary
    last: u32,
    /// Steps owed
    debt: u32,
}

impl ElasticScheduler {
    /// Create a scheduler anchored at cycle `now`
    ///
    /// A zero period is treated as one cycle.
    pub const fn new(mut config: SchedulerConfig, now: u32) -> Self {
        if config.period == 0 {
            config.period = 1;
        }
        Self {
            config,
            last: now,
            debt: 0,
        }
    }

    /// Account for time elapsed up to cycle `now`
    ///
    /// The counter is a wrapping 32-bit cycle counter; differences are taken
    /// modulo 2^32.
    #[inline]
    pub fn note_elapsed(&mut self, now: u32) {
        let period = self.config.period;
        let elapsed = now.wrapping_sub(self.last);
        if elapsed < period {
            return;
        }

        let periods = match self.config.catch_up {
            CatchUp::All => elapsed / period,
            CatchUp::Single => 1,
        };
        self.last = self.last.wrapping_add(periods.wrapping_mul(period));
        self.debt = self
            .debt
            .saturating_add(periods.saturating_mul(self.config.unit))
            .min(self.config.max_debt);
    }

    /// Take one step of debt if any is owed
    #[inline]
    pub fn consume_if_available(&mut self) -> bool {
        if self.debt > 0 {
            self.debt -= 1;
            true
        } else {
            false
        }
    }

    /// Steps currently owed
    #[inline]
    pub fn debt(&self) -> u32 {
        self.debt
    }

    /// Cycle stamp of the last period boundary
    pub fn last_cycle(&self) -> u32 {
        self.last
    }

    /// Active configuration
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Drop all debt and re-anchor at `now`
    pub fn reset(&mut self, now: u32) {
        self.last = now;
        self.debt = 0;
    }
}
