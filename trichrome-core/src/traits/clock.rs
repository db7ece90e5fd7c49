//! Sweep clock trait

use crate::timebase::TimeBase;

/// Millisecond clock that bounds a sweep
///
/// The scan engine starts it on entry, polls [`now_ms`](Self::now_ms)
/// between passes, then stops and resets it on return.
pub trait SweepClock {
    /// Begin counting milliseconds
    fn start(&mut self);

    /// Stop counting; the value is retained
    fn stop(&mut self);

    /// Current count in milliseconds (wrapping)
    fn now_ms(&self) -> u32;

    /// Clear the count to zero
    fn reset(&mut self);
}

/// A bare time base whose timer interrupt is always enabled
impl SweepClock for &TimeBase {
    fn start(&mut self) {
        TimeBase::start(self);
    }

    fn stop(&mut self) {
        TimeBase::stop(self);
    }

    fn now_ms(&self) -> u32 {
        TimeBase::now_ms(self)
    }

    fn reset(&mut self) {
        TimeBase::reset(self);
    }
}
