//! Scan engine
//!
//! Refreshes the whole matrix from a [`BrightnessBuffer`] by time-division
//! multiplexing over the nine columns. One *pass* powers each column in
//! turn and, while it is powered, streams the OFF_L/OFF_H register pair of
//! every (row, channel) output to the driver chips. A *sweep* repeats passes
//! as fast as the bus allows until the requested period has elapsed, so a
//! period usually covers many passes.
//!
//! A sweep always completes at least one pass, even for a zero period, so
//! every column is lit at least once per call.

use heapless::Vec;

use crate::buffer::{BrightnessBuffer, Channel};
use crate::config::DisplayConfig;
use crate::layout::{led_target, CHIP_COUNT, COLUMN_ENABLE, ROWS, SCAN_ORDER};
use crate::retry::{SteadyStatePolicy, WriteOutcome};
use crate::traits::{EnableLines, RegisterWriter, SweepClock};

/// Failed writes recorded individually per sweep
pub const MAX_REPORTED_FAILURES: usize = 8;

/// Register writes issued by one pass
pub const WRITES_PER_PASS: u32 = (COLUMN_ENABLE.len() * ROWS * Channel::ALL.len() * 2) as u32;

/// A register write that was dropped during a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WriteFailure {
    /// Chip address
    pub address: u8,
    /// Register index
    pub register: u8,
}

/// Outcome of one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Full passes over all columns
    pub passes: u32,
    /// Register writes attempted (retries not counted)
    pub writes: u32,
    /// Writes dropped after the steady-state policy gave up
    pub failed_writes: u32,
    /// Writes that needed at least one retry
    pub retried_writes: u32,
    /// Time base reading at exit, relative to entry
    pub elapsed_ms: u32,
    /// The first dropped writes of the sweep
    pub failures: Vec<WriteFailure, MAX_REPORTED_FAILURES>,
}

impl SweepReport {
    /// Check if every write of the sweep landed
    pub fn is_clean(&self) -> bool {
        self.failed_writes == 0
    }
}

/// Totals across all sweeps of an engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanStats {
    pub sweeps: u32,
    pub passes: u32,
    pub writes: u32,
    pub failed_writes: u32,
    pub retried_writes: u32,
}

impl ScanStats {
    fn absorb(&mut self, report: &SweepReport) {
        self.sweeps = self.sweeps.wrapping_add(1);
        self.passes = self.passes.wrapping_add(report.passes);
        self.writes = self.writes.wrapping_add(report.writes);
        self.failed_writes = self.failed_writes.wrapping_add(report.failed_writes);
        self.retried_writes = self.retried_writes.wrapping_add(report.retried_writes);
    }
}

/// Time-multiplexed refresh of the LED matrix
pub struct ScanEngine<W, L, C> {
    writer: W,
    lines: L,
    clock: C,
    chips: [u8; CHIP_COUNT],
    policy: SteadyStatePolicy,
    stats: ScanStats,
}

impl<W, L, C> ScanEngine<W, L, C>
where
    W: RegisterWriter,
    L: EnableLines,
    C: SweepClock,
{
    /// Create a scan engine
    ///
    /// Takes the chip addresses and steady-state policy from `config`.
    pub fn new(writer: W, lines: L, clock: C, config: &DisplayConfig) -> Self {
        Self {
            writer,
            lines,
            clock,
            chips: config.chip_addresses,
            policy: config.steady_state,
            stats: ScanStats::default(),
        }
    }

    /// Refresh the matrix from `buffer` for at least `period_ms`
    ///
    /// Starts the clock, runs passes until `period_ms` has elapsed (at least
    /// one), then stops and resets the clock and powers every column off.
    /// Failed writes never abort the sweep; they are counted in the report.
    pub fn sweep(&mut self, buffer: &BrightnessBuffer, period_ms: u32) -> SweepReport {
        let mut report = SweepReport::default();

        self.clock.start();
        let baseline = self.clock.now_ms();

        loop {
            self.lines.toggle_strobe();
            self.pass(buffer, &mut report);
            report.passes = report.passes.wrapping_add(1);

            let elapsed = self.clock.now_ms().wrapping_sub(baseline);
            if elapsed >= period_ms {
                report.elapsed_ms = elapsed;
                break;
            }
        }

        self.clock.stop();
        self.clock.reset();
        self.lines.all_off();

        #[cfg(feature = "defmt")]
        if report.failed_writes > 0 {
            defmt::warn!(
                "sweep dropped {} of {} register writes",
                report.failed_writes,
                report.writes
            );
        }

        self.stats.absorb(&report);
        report
    }

    /// Power each column in turn and stream its duty values
    fn pass(&mut self, buffer: &BrightnessBuffer, report: &mut SweepReport) {
        for &column in SCAN_ORDER.iter() {
            self.lines.select_column(column);

            for row in 0..ROWS {
                for channel in Channel::ALL {
                    let Some(target) = led_target(row, channel) else {
                        continue;
                    };
                    let address = self.chips[target.chip as usize];
                    let duty = buffer.duty_at(channel, row, column);

                    self.write(address, target.off_low_register(), duty as u8, report);
                    self.write(address, target.off_high_register(), (duty >> 8) as u8, report);
                }
            }
        }
    }

    fn write(&mut self, address: u8, register: u8, value: u8, report: &mut SweepReport) {
        let writer = &mut self.writer;
        report.writes = report.writes.wrapping_add(1);

        let outcome = self.policy.run(|| {
            let result = writer.write_register(address, register, value);
            if result.is_err() {
                // Next transaction must see a fresh START
                writer.recover();
            }
            result
        });

        match outcome {
            WriteOutcome::Written => {}
            WriteOutcome::Retried => {
                report.retried_writes = report.retried_writes.wrapping_add(1);
            }
            WriteOutcome::Dropped => {
                report.failed_writes = report.failed_writes.wrapping_add(1);
                // Full log just stops recording; the counter keeps going
                let _ = report.failures.push(WriteFailure { address, register });
            }
        }
    }

    /// Totals across every sweep so far
    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    /// Register writer, e.g. for chip bring-up on the same bus
    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Enable lines
    pub fn lines(&self) -> &L {
        &self.lines
    }

    /// Mutable access to the enable lines
    pub fn lines_mut(&mut self) -> &mut L {
        &mut self.lines
    }

    /// Sweep clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Give back the hardware handles
    pub fn release(self) -> (W, L, C) {
        (self.writer, self.lines, self.clock)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use core::cell::{Cell, RefCell};
    use std::vec::Vec;

    use super::*;
    use crate::layout::COLUMNS;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        Select(usize),
        AllOff,
        Strobe,
        Write { address: u8, register: u8, value: u8 },
    }

    type Log = RefCell<Vec<Event>>;

    /// Writer that logs every write and fails on a schedule
    struct MockWriter<'a> {
        log: &'a Log,
        calls: u32,
        /// Fail every call whose number is divisible by this (0 = never)
        fail_every: u32,
        recoveries: u32,
    }

    impl RegisterWriter for MockWriter<'_> {
        type Error = ();

        fn write_register(&mut self, address: u8, register: u8, value: u8) -> Result<(), ()> {
            self.calls += 1;
            if self.fail_every != 0 && self.calls % self.fail_every == 0 {
                return Err(());
            }
            self.log.borrow_mut().push(Event::Write {
                address,
                register,
                value,
            });
            Ok(())
        }

        fn recover(&mut self) {
            self.recoveries += 1;
        }
    }

    struct MockLines<'a> {
        log: &'a Log,
        powered: bool,
    }

    impl EnableLines for MockLines<'_> {
        fn select_column(&mut self, column: usize) {
            self.log.borrow_mut().push(Event::Select(column));
        }

        fn all_off(&mut self) {
            self.log.borrow_mut().push(Event::AllOff);
        }

        fn toggle_strobe(&mut self) {
            self.log.borrow_mut().push(Event::Strobe);
        }

        fn power_drivers(&mut self, on: bool) {
            self.powered = on;
        }
    }

    /// Clock that advances by `step` every time it is read
    struct FakeClock {
        now: Cell<u32>,
        step: u32,
        running: bool,
        resets: u32,
    }

    impl FakeClock {
        fn new(start: u32, step: u32) -> Self {
            Self {
                now: Cell::new(start),
                step,
                running: false,
                resets: 0,
            }
        }
    }

    impl SweepClock for FakeClock {
        fn start(&mut self) {
            self.running = true;
        }

        fn stop(&mut self) {
            self.running = false;
        }

        fn now_ms(&self) -> u32 {
            let now = self.now.get();
            self.now.set(now.wrapping_add(self.step));
            now
        }

        fn reset(&mut self) {
            self.now.set(0);
            self.resets += 1;
        }
    }

    fn engine<'a>(
        log: &'a Log,
        fail_every: u32,
        clock: FakeClock,
        config: &DisplayConfig,
    ) -> ScanEngine<MockWriter<'a>, MockLines<'a>, FakeClock> {
        ScanEngine::new(
            MockWriter {
                log,
                calls: 0,
                fail_every,
                recoveries: 0,
            },
            MockLines {
                log,
                powered: false,
            },
            clock,
            config,
        )
    }

    fn writes(log: &Log) -> Vec<(u8, u8, u8)> {
        log.borrow()
            .iter()
            .filter_map(|e| match *e {
                Event::Write {
                    address,
                    register,
                    value,
                } => Some((address, register, value)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_zero_period_runs_one_pass() {
        let log = Log::default();
        let config = DisplayConfig::default();
        let mut engine = engine(&log, 0, FakeClock::new(0, 0), &config);
        let buffer = BrightnessBuffer::new();

        let report = engine.sweep(&buffer, 0);
        assert_eq!(report.passes, 1);
        assert_eq!(report.writes, WRITES_PER_PASS);
        assert!(report.is_clean());

        let selected: Vec<usize> = log
            .borrow()
            .iter()
            .filter_map(|e| match *e {
                Event::Select(c) => Some(c),
                _ => None,
            })
            .collect();
        assert_eq!(selected, SCAN_ORDER.to_vec());
        assert_eq!(log.borrow().last(), Some(&Event::AllOff));
        assert_eq!(log.borrow().first(), Some(&Event::Strobe));
    }

    #[test]
    fn test_sweep_runs_for_period() {
        let log = Log::default();
        let config = DisplayConfig::default();
        let mut engine = engine(&log, 0, FakeClock::new(0, 1), &config);
        let buffer = BrightnessBuffer::new();

        let report = engine.sweep(&buffer, 3);
        assert_eq!(report.passes, 3);
        assert!(report.elapsed_ms >= 3);

        let clock = engine.clock();
        assert!(!clock.running);
        assert_eq!(clock.resets, 1);
        assert_eq!(clock.now.get(), 0);
    }

    #[test]
    fn test_sweep_across_counter_wrap() {
        let log = Log::default();
        let config = DisplayConfig::default();
        let mut engine = engine(&log, 0, FakeClock::new(u32::MAX - 1, 1), &config);
        let buffer = BrightnessBuffer::new();

        let report = engine.sweep(&buffer, 4);
        assert_eq!(report.passes, 4);
        assert_eq!(report.elapsed_ms, 4);
    }

    #[test]
    fn test_duty_written_as_off_time_pair() {
        let log = Log::default();
        let config = DisplayConfig::default();
        let mut engine = engine(&log, 0, FakeClock::new(0, 0), &config);

        let mut buffer = BrightnessBuffer::new();
        buffer.set_duty(Channel::Red, 0, 0, 4095).unwrap();
        buffer.set_duty(Channel::Green, 5, 3, 0x0ABC).unwrap();

        engine.sweep(&buffer, 0);
        let log_events = log.borrow();

        // Column 0, row 0, red: chip 0x68, LED 0 -> OFF_L 8, OFF_H 9
        let col0 = log_events
            .iter()
            .position(|e| *e == Event::Select(0))
            .unwrap();
        assert_eq!(
            log_events[col0 + 1],
            Event::Write {
                address: 0x68,
                register: 8,
                value: 0xFF
            }
        );
        assert_eq!(
            log_events[col0 + 2],
            Event::Write {
                address: 0x68,
                register: 9,
                value: 0x0F
            }
        );
        drop(log_events);

        // Column 3, row 5, green: chip 0x69, LED 1 -> OFF_L 12, OFF_H 13
        let all = writes(&log);
        let per_column = WRITES_PER_PASS as usize / COLUMNS;
        let col3 = &all[3 * per_column..][..per_column];
        assert!(col3.contains(&(0x69, 12, 0xBC)));
        assert!(col3.contains(&(0x69, 13, 0x0A)));
    }

    #[test]
    fn test_writes_only_while_one_column_selected() {
        let log = Log::default();
        let config = DisplayConfig::default();
        let mut engine = engine(&log, 0, FakeClock::new(0, 1), &config);
        engine.sweep(&BrightnessBuffer::new(), 2);

        let mut selected: Option<usize> = None;
        let mut writes_per_column = [0u32; COLUMNS];
        for event in log.borrow().iter() {
            match *event {
                Event::Select(c) => selected = Some(c),
                Event::AllOff => selected = None,
                Event::Strobe => {}
                Event::Write { .. } => {
                    let column = selected.expect("write with no column powered");
                    writes_per_column[column] += 1;
                }
            }
        }
        // Two passes, 54 writes per column each
        assert!(writes_per_column.iter().all(|&n| n == 2 * 54));
        assert_eq!(selected, None);
    }

    #[test]
    fn test_failed_writes_counted_not_retried() {
        let log = Log::default();
        let config = DisplayConfig::default();
        let mut engine = engine(&log, 2, FakeClock::new(0, 0), &config);

        let report = engine.sweep(&BrightnessBuffer::new(), 0);
        assert_eq!(report.writes, WRITES_PER_PASS);
        assert_eq!(report.failed_writes, WRITES_PER_PASS / 2);
        assert_eq!(report.retried_writes, 0);
        assert_eq!(report.failures.len(), MAX_REPORTED_FAILURES);
        assert!(!report.is_clean());
        assert_eq!(engine.writer_mut().calls, WRITES_PER_PASS);
        assert_eq!(engine.writer_mut().recoveries, WRITES_PER_PASS / 2);
    }

    #[test]
    fn test_retry_policy_recovers_writes() {
        let log = Log::default();
        let config = DisplayConfig {
            steady_state: SteadyStatePolicy::Retry(1),
            ..DisplayConfig::default()
        };
        let mut engine = engine(&log, 2, FakeClock::new(0, 0), &config);

        let report = engine.sweep(&BrightnessBuffer::new(), 0);
        assert_eq!(report.failed_writes, 0);
        assert!(report.retried_writes > 0);
        assert_eq!(writes(&log).len(), WRITES_PER_PASS as usize);
        // Bus released after every failed attempt, before the retry
        assert_eq!(engine.writer_mut().recoveries, report.retried_writes);
    }

    #[test]
    fn test_clean_sweep_never_recovers() {
        let log = Log::default();
        let config = DisplayConfig::default();
        let mut engine = engine(&log, 0, FakeClock::new(0, 0), &config);

        engine.sweep(&BrightnessBuffer::new(), 0);
        assert_eq!(engine.writer_mut().recoveries, 0);
    }

    #[test]
    fn test_stats_accumulate() {
        let log = Log::default();
        let config = DisplayConfig::default();
        let mut engine = engine(&log, 0, FakeClock::new(0, 1), &config);
        let buffer = BrightnessBuffer::new();

        engine.sweep(&buffer, 1);
        engine.sweep(&buffer, 2);

        let stats = engine.stats();
        assert_eq!(stats.sweeps, 2);
        assert_eq!(stats.passes, 3);
        assert_eq!(stats.writes, 3 * WRITES_PER_PASS);
        assert_eq!(stats.failed_writes, 0);
    }
}
