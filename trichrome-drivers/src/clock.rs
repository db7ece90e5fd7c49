//! Timer-gated sweep clock
//!
//! Pairs a hardware periodic timer with the shared [`TimeBase`]. Starting
//! the clock starts both the counter and the timer interrupt, so no ticks
//! are spent outside a sweep.

use trichrome_core::timebase::{TimeBase, TICK_PERIOD_US};
use trichrome_core::traits::SweepClock;
use trichrome_hal::timer::PeriodicTimer;

/// Sweep clock backed by a periodic timer interrupt
pub struct TimerClock<'a, T> {
    timer: T,
    base: &'a TimeBase,
}

impl<'a, T: PeriodicTimer> TimerClock<'a, T> {
    /// Create a clock; call [`init`](Self::init) before the first sweep
    pub fn new(timer: T, base: &'a TimeBase) -> Self {
        Self { timer, base }
    }

    /// Program the timer for a 1 ms tick, leaving it stopped
    pub fn init(&mut self) {
        self.timer.stop();
        self.timer.configure(TICK_PERIOD_US);
        self.base.stop();
        self.base.reset();
    }

    /// The shared time base
    pub fn base(&self) -> &'a TimeBase {
        self.base
    }

    /// The underlying timer
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Give back the timer
    pub fn release(self) -> T {
        self.timer
    }
}

impl<T: PeriodicTimer> SweepClock for TimerClock<'_, T> {
    fn start(&mut self) {
        self.base.start();
        self.timer.start();
    }

    fn stop(&mut self) {
        self.timer.stop();
        self.base.stop();
    }

    fn now_ms(&self) -> u32 {
        self.base.now_ms()
    }

    fn reset(&mut self) {
        self.base.reset();
    }
}
