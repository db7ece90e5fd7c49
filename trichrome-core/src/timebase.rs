//! Millisecond time base
//!
//! A free-running counter advanced by a 1 ms timer interrupt. The interrupt
//! handler is the only writer; the scan engine only reads it, so a plain
//! atomic is enough and no lock is ever taken. Place one in a `static` and
//! call [`TimeBase::on_tick`] from the timer ISR:
//!
//! ```ignore
//! static TIME_BASE: TimeBase = TimeBase::new();
//!
//! #[interrupt]
//! fn TIMER3_COMPA() {
//!     TIME_BASE.on_tick();
//! }
//! ```
//!
//! The counter is 32 bits wide and wraps after about 49.7 days of running
//! time. Elapsed-time arithmetic uses wrapping subtraction, so a wrap in the
//! middle of a sweep is harmless.

use portable_atomic::{AtomicBool, AtomicU32, Ordering};

/// Tick period of the time base in microseconds
pub const TICK_PERIOD_US: u32 = 1_000;

/// Interrupt-driven millisecond counter
#[derive(Debug)]
pub struct TimeBase {
    millis: AtomicU32,
    running: AtomicBool,
}

impl Default for TimeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeBase {
    /// Create a stopped counter at zero
    pub const fn new() -> Self {
        Self {
            millis: AtomicU32::new(0),
            running: AtomicBool::new(false),
        }
    }

    /// Interrupt handler hook
    ///
    /// Advances the counter by one when running. Never blocks.
    pub fn on_tick(&self) {
        if self.running.load(Ordering::Relaxed) {
            self.millis.fetch_add(1, Ordering::Release);
        }
    }

    /// Current counter value in milliseconds
    pub fn now_ms(&self) -> u32 {
        self.millis.load(Ordering::Acquire)
    }

    /// Begin counting on each tick
    pub fn start(&self) {
        self.running.store(true, Ordering::Release);
    }

    /// Stop counting; the value is retained until [`reset`](Self::reset)
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Check if ticks currently advance the counter
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Clear the counter to zero
    pub fn reset(&self) {
        self.millis.store(0, Ordering::Release);
    }
}
