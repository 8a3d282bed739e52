//! Bus arbiter
//!
//! The outermost control loop. Every iteration samples the address bus,
//! answers ROM reads immediately, and only in the LOW region, while the host
//! CPU owns the bus, spends a bounded slice on POKEY work: one register sniff
//! and at most one synthesis micro-step.

use crate::bus::CartridgeBus;
use crate::config::{ArbiterConfig, CartConfig, TimingPolicy};
use crate::rom::RomImage;
use crate::scheduler::ElasticScheduler;
use pokey::{Pokey, PokeyBackend};

/// Ownership of the shared data bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BusState {
    /// Data lines tri-stated, host owns the bus
    #[default]
    Listening,
    /// Firmware is putting ROM data on the bus
    Driving,
}

/// What one iteration of the loop did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Iteration {
    /// Address in the ROM region, data driven
    Rom,
    /// LOW region with the CPU on the bus; POKEY work was allowed
    Low,
    /// LOW region while DMA holds the bus; no POKEY work
    Dma,
    /// Two address samples disagreed, nothing was touched
    Glitch,
}

/// Cartridge bus arbiter, generic over the sound backend
#[derive(Debug, Clone)]
pub struct BusArbiter<'a, C = Pokey> {
    rom: RomImage<'a>,
    chip: C,
    scheduler: ElasticScheduler,
    config: ArbiterConfig,
    window: u16,
    state: BusState,
}

impl<'a, C: PokeyBackend> BusArbiter<'a, C> {
    /// Build an arbiter in the listening state
    ///
    /// `rom` must cover `config.rom_base` upward; `now` anchors the scheduler
    /// to the current cycle counter.
    pub fn new(config: CartConfig, rom: &'a [u8], chip: C, now: u32) -> Self {
        Self {
            rom: RomImage::new(config.rom_base, rom),
            chip,
            scheduler: ElasticScheduler::new(config.scheduler, now),
            config: config.arbiter,
            window: config.arbiter.window_base(),
            state: BusState::Listening,
        }
    }

    /// Run one loop iteration
    #[inline(always)]
    pub fn step<B: CartridgeBus>(&mut self, bus: &mut B) -> Iteration {
        let addr = bus.sample_address();
        if self.config.double_sample && bus.sample_address() != addr {
            return Iteration::Glitch;
        }

        // ROM region: nothing may run ahead of this
        if self.rom.in_region(addr) {
            let data = self.rom.read(addr);
            match self.state {
                BusState::Driving => bus.update_data(data),
                BusState::Listening => {
                    bus.drive_data(data);
                    self.state = BusState::Driving;
                }
            }
            return Iteration::Rom;
        }

        if self.state == BusState::Driving {
            bus.release_bus();
            self.state = BusState::Listening;
        }

        let cpu_active = bus.cpu_active();
        if cpu_active || self.config.timing == TimingPolicy::Always {
            self.scheduler.note_elapsed(bus.cycle_count());
        }
        if !cpu_active {
            return Iteration::Dma;
        }

        if addr & 0xFFF0 == self.window && bus.write_strobe_active() {
            let value = bus.read_data();
            self.chip.write_register((addr & 0x0F) as u8, value);
        }

        if self.scheduler.consume_if_available() && self.chip.tick_step() {
            bus.emit_sample(self.config.output.apply(self.chip.output()));
        }

        Iteration::Low
    }

    /// Serve the bus forever
    ///
    /// The caller disables interrupts before entering.
    pub fn run<B: CartridgeBus>(&mut self, bus: &mut B) -> ! {
        loop {
            self.step(bus);
        }
    }

    /// Current data bus ownership
    pub fn state(&self) -> BusState {
        self.state
    }

    /// Sound backend
    pub fn chip(&self) -> &C {
        &self.chip
    }

    /// Step scheduler
    pub fn scheduler(&self) -> &ElasticScheduler {
        &self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputScale;
    use crate::scheduler::SchedulerConfig;

    /// Scripted bus: one entry per iteration
    #[derive(Default)]
    struct ScriptBus {
        cycles: Vec<(u16, bool, bool, u8, u32)>,
        pos: usize,
        events: Vec<Event>,
    }

    #[derive(Debug, PartialEq, Eq)]
    enum Event {
        Drive(u8),
        Update(u8),
        Release,
        Emit(u16),
    }

    impl ScriptBus {
        fn current(&self) -> (u16, bool, bool, u8, u32) {
            self.cycles[self.pos]
        }
    }

    impl CartridgeBus for ScriptBus {
        fn sample_address(&mut self) -> u16 {
            self.current().0
        }
        fn drive_data(&mut self, data: u8) {
            self.events.push(Event::Drive(data));
        }
        fn update_data(&mut self, data: u8) {
            self.events.push(Event::Update(data));
        }
        fn release_bus(&mut self) {
            self.events.push(Event::Release);
        }
        fn read_data(&mut self) -> u8 {
            self.current().3
        }
        fn cpu_active(&mut self) -> bool {
            self.current().1
        }
        fn write_strobe_active(&mut self) -> bool {
            self.current().2
        }
        fn cycle_count(&mut self) -> u32 {
            self.current().4
        }
        fn emit_sample(&mut self, level: u16) {
            self.events.push(Event::Emit(level));
        }
    }

    fn run_script(
        arbiter: &mut BusArbiter<'_, Pokey>,
        cycles: Vec<(u16, bool, bool, u8, u32)>,
    ) -> (Vec<Iteration>, Vec<Event>) {
        let mut bus = ScriptBus {
            cycles,
            ..Default::default()
        };
        let mut iterations = Vec::new();
        while bus.pos < bus.cycles.len() {
            iterations.push(arbiter.step(&mut bus));
            bus.pos += 1;
        }
        (iterations, bus.events)
    }

    fn test_config() -> CartConfig {
        CartConfig {
            rom_base: 0x4000,
            arbiter: ArbiterConfig {
                output: OutputScale::IDENTITY,
                ..ArbiterConfig::DEFAULT
            },
            scheduler: SchedulerConfig {
                period: 10,
                ..SchedulerConfig::default()
            },
        }
    }

    #[test]
    fn test_consecutive_rom_reads_switch_direction_once() {
        let rom: Vec<u8> = (0..=255u8).collect();
        let mut arbiter = BusArbiter::new(test_config(), &rom, Pokey::new(), 0);
        let (iterations, events) = run_script(
            &mut arbiter,
            vec![
                (0x4001, true, false, 0, 0),
                (0x4002, true, false, 0, 0),
                (0x4003, true, false, 0, 0),
                (0x1800, true, false, 0, 0),
                (0x1801, true, false, 0, 0),
                (0x4004, true, false, 0, 0),
            ],
        );

        assert_eq!(
            iterations,
            vec![
                Iteration::Rom,
                Iteration::Rom,
                Iteration::Rom,
                Iteration::Low,
                Iteration::Low,
                Iteration::Rom
            ]
        );
        assert_eq!(
            events,
            vec![
                Event::Drive(1),
                Event::Update(2),
                Event::Update(3),
                Event::Release,
                Event::Drive(4),
            ]
        );
        assert_eq!(arbiter.state(), BusState::Driving);
    }

    #[test]
    fn test_rom_past_image_reads_open_bus() {
        let rom = [0x11u8; 4];
        let mut arbiter = BusArbiter::new(test_config(), &rom, Pokey::new(), 0);
        let (_, events) = run_script(&mut arbiter, vec![(0x4004, true, false, 0, 0)]);
        assert_eq!(events, vec![Event::Drive(0xFF)]);
    }

    #[test]
    fn test_sniff_requires_window_strobe_and_cpu() {
        let rom = [0u8; 4];
        let mut arbiter = BusArbiter::new(test_config(), &rom, Pokey::new(), 0);
        run_script(
            &mut arbiter,
            vec![
                (0x0452, true, true, 40, 0),  // written
                (0x0453, true, false, 41, 0), // read cycle
                (0x0454, false, true, 42, 0), // DMA owns the bus
                (0x0446, true, true, 43, 0),  // outside the window
                (0x045E, true, true, 44, 0),  // written
            ],
        );
        let regs = arbiter.chip().dump_registers();
        assert_eq!(regs[0x2], 40);
        assert_eq!(regs[0x3], 0);
        assert_eq!(regs[0x4], 0);
        assert_eq!(regs[0x6], 0);
        assert_eq!(regs[0xE], 44);
        assert_eq!(arbiter.chip().channel(1).divisor(), 40);
    }

    #[test]
    fn test_one_step_per_low_iteration() {
        let rom = [0u8; 4];
        let mut arbiter = BusArbiter::new(test_config(), &rom, Pokey::new(), 0);
        // 100 cycles elapsed = 10 steps owed, but only 4 LOW iterations
        let (_, _) = run_script(
            &mut arbiter,
            vec![
                (0x1800, true, false, 0, 100),
                (0x1800, true, false, 0, 100),
                (0x4000, true, false, 0, 100),
                (0x1800, true, false, 0, 100),
                (0x1800, true, false, 0, 100),
            ],
        );
        assert_eq!(arbiter.scheduler().debt(), 6);
        assert_eq!(arbiter.chip().current_step().index(), 4);
    }

    #[test]
    fn test_dma_blocks_work_but_time_is_caught_up() {
        let rom = [0u8; 4];
        let mut arbiter = BusArbiter::new(test_config(), &rom, Pokey::new(), 0);
        let (iterations, _) = run_script(
            &mut arbiter,
            vec![(0x1800, false, false, 0, 50), (0x1800, false, false, 0, 90)],
        );
        assert_eq!(iterations, vec![Iteration::Dma, Iteration::Dma]);
        assert_eq!(arbiter.scheduler().debt(), 0);

        run_script(&mut arbiter, vec![(0x1800, true, false, 0, 95)]);
        assert_eq!(arbiter.scheduler().debt(), 8);
    }

    #[test]
    fn test_always_policy_accounts_during_dma() {
        let rom = [0u8; 4];
        let mut config = test_config();
        config.arbiter.timing = TimingPolicy::Always;
        let mut arbiter = BusArbiter::new(config, &rom, Pokey::new(), 0);
        run_script(&mut arbiter, vec![(0x1800, false, false, 0, 50)]);
        assert_eq!(arbiter.scheduler().debt(), 5);
        assert_eq!(arbiter.chip().current_step().index(), 0);
    }

    #[test]
    fn test_samples_are_scaled_and_emitted() {
        let rom = [0u8; 4];
        let mut config = test_config();
        config.arbiter.output = OutputScale::new(2, 1);
        let mut arbiter = BusArbiter::new(config, &rom, Pokey::new(), 0);

        let mut script = vec![(0x0451, true, true, 0xBF, 0)];
        script.extend((0..9).map(|_| (0x1800, true, false, 0, 1000)));
        let (_, events) = run_script(&mut arbiter, script);
        assert_eq!(events, vec![Event::Emit(63)]);
    }

    #[test]
    fn test_glitch_discards_iteration() {
        struct GlitchBus {
            reads: Vec<u16>,
            drove: bool,
        }
        impl CartridgeBus for GlitchBus {
            fn sample_address(&mut self) -> u16 {
                self.reads.remove(0)
            }
            fn drive_data(&mut self, _: u8) {
                self.drove = true;
            }
            fn release_bus(&mut self) {}
            fn read_data(&mut self) -> u8 {
                0
            }
            fn cpu_active(&mut self) -> bool {
                true
            }
            fn write_strobe_active(&mut self) -> bool {
                false
            }
            fn cycle_count(&mut self) -> u32 {
                0
            }
            fn emit_sample(&mut self, _: u16) {}
        }

        let rom = [0u8; 4];
        let mut config = test_config();
        config.arbiter.double_sample = true;
        let mut arbiter = BusArbiter::new(config, &rom, Pokey::new(), 0);
        let mut bus = GlitchBus {
            reads: vec![0x4000, 0x0400, 0x4000, 0x4000],
            drove: false,
        };
        assert_eq!(arbiter.step(&mut bus), Iteration::Glitch);
        assert!(!bus.drove);
        assert_eq!(arbiter.step(&mut bus), Iteration::Rom);
        assert!(bus.drove);
    }
}
