//! Periodic timer abstraction
//!
//! The time base needs a hardware timer that raises an interrupt at a fixed
//! period. The board crate's interrupt handler forwards each expiry to
//! `TimeBase::on_tick` in trichrome-core; this trait only covers the
//! configuration and gating of the interrupt source.

/// Periodic interrupt source
pub trait PeriodicTimer {
    /// Configure the compare period in microseconds without starting the timer
    fn configure(&mut self, period_us: u32);

    /// Start the timer clock so the interrupt begins firing
    fn start(&mut self);

    /// Stop the timer clock; no further interrupts fire until [`start`](Self::start)
    fn stop(&mut self);

    /// Check if the timer is currently running
    fn is_running(&self) -> bool;
}
