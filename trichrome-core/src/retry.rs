//! Retry policies for register writes
//!
//! Bring-up and steady-state refresh deliberately use different policies.
//! While the chips power up, transient bus failures are expected and the
//! only sensible reaction is to keep trying: nothing is on display yet. During
//! a sweep, retrying until success could stall the refresh and leave one
//! column lit, so a failed write is at most retried a few times and then
//! dropped; the next pass rewrites the same register anyway.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Retry policy for writes issued while bringing the driver chips up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BringUpPolicy {
    /// Block until the write succeeds
    #[default]
    UntilSuccess,
    /// Give up after this many attempts (0 is treated as 1)
    Attempts(u32),
}

impl BringUpPolicy {
    /// Run `op` under this policy
    ///
    /// Returns the number of attempts it took, or the last error once the
    /// attempt budget is spent.
    pub fn run<E>(self, mut op: impl FnMut() -> Result<(), E>) -> Result<u32, E> {
        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.saturating_add(1);
            match op() {
                Ok(()) => return Ok(attempts),
                Err(e) => {
                    if let BringUpPolicy::Attempts(limit) = self {
                        if attempts >= limit.max(1) {
                            return Err(e);
                        }
                    }
                }
            }
        }
    }
}

/// Retry policy for writes issued during a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SteadyStatePolicy {
    /// Drop a failed write and move on
    #[default]
    Discard,
    /// Retry a failed write up to this many extra times, then drop it
    Retry(u8),
}

/// Result of one steady-state write under a [`SteadyStatePolicy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteOutcome {
    /// First attempt succeeded
    Written,
    /// Succeeded after at least one retry
    Retried,
    /// Every allowed attempt failed
    Dropped,
}

impl SteadyStatePolicy {
    /// Extra attempts allowed after the first failure
    pub const fn retries(self) -> u8 {
        match self {
            SteadyStatePolicy::Discard => 0,
            SteadyStatePolicy::Retry(n) => n,
        }
    }

    /// Run `op` under this policy
    pub fn run<E>(self, mut op: impl FnMut() -> Result<(), E>) -> WriteOutcome {
        if op().is_ok() {
            return WriteOutcome::Written;
        }
        for _ in 0..self.retries() {
            if op().is_ok() {
                return WriteOutcome::Retried;
            }
        }
        WriteOutcome::Dropped
    }
}
