//! Configuration type definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::layout::CHIP_COUNT;
use crate::retry::{BringUpPolicy, SteadyStatePolicy};

/// Default sweep period in milliseconds
pub const DEFAULT_SWEEP_PERIOD_MS: u32 = 5_000;

/// Default 7-bit addresses of the two PCA9685 chips
///
/// The PCA9685 address is `0b1` followed by the six hardware pins; the
/// board straps the pins to `0b101000` and `0b101001`.
pub const DEFAULT_CHIP_ADDRESSES: [u8; CHIP_COUNT] = [0x40 | 0b10_1000, 0x40 | 0b10_1001];

/// Two-wire bus settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BusConfig {
    /// SCL frequency in Hz
    pub frequency_hz: u32,
    /// Completion-flag polls before a bus phase is declared timed out
    pub timeout_spins: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 100_000,
            timeout_spins: 10_000,
        }
    }
}

/// Complete display configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// Global brightness scale applied to normalized levels
    pub brightness_scale: f32,
    /// Duration of one refresh sweep in milliseconds
    pub sweep_period_ms: u32,
    /// 7-bit addresses of the driver chips, in wiring-table order
    pub chip_addresses: [u8; CHIP_COUNT],
    /// Bus settings
    pub bus: BusConfig,
    /// Retry policy while initializing the chips
    pub bring_up: BringUpPolicy,
    /// Retry policy for writes during a sweep
    pub steady_state: SteadyStatePolicy,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            brightness_scale: 1.0,
            sweep_period_ms: DEFAULT_SWEEP_PERIOD_MS,
            chip_addresses: DEFAULT_CHIP_ADDRESSES,
            bus: BusConfig::default(),
            bring_up: BringUpPolicy::UntilSuccess,
            steady_state: SteadyStatePolicy::Discard,
        }
    }
}

impl DisplayConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the configuration for values the hardware cannot use
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.brightness_scale.is_finite() || self.brightness_scale < 0.0 {
            return Err(ConfigError::InvalidBrightnessScale);
        }

        for (i, &address) in self.chip_addresses.iter().enumerate() {
            if address > 0x7F {
                return Err(ConfigError::InvalidAddress(address));
            }
            if self.chip_addresses[..i].contains(&address) {
                return Err(ConfigError::DuplicateAddress(address));
            }
        }

        if self.bus.frequency_hz == 0 {
            return Err(ConfigError::ZeroBusFrequency);
        }
        if self.bus.timeout_spins == 0 {
            return Err(ConfigError::ZeroBusTimeout);
        }

        Ok(())
    }
}
