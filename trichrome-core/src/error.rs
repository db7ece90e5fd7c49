//! Error types for input validation and configuration
//!
//! Bus failures are reported by the driver layer with their own types, so a
//! caller can always tell a rejected argument apart from a flaky wire.

/// Rejected brightness-buffer access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputError {
    /// Row index outside the matrix
    RowOutOfRange(u8),
    /// Column index outside the matrix
    ColumnOutOfRange(u8),
    /// Colour channel index outside 0..3
    ChannelOutOfRange(u8),
    /// Linear LED index outside 0..81
    LedOutOfRange(u8),
    /// Normalized level is NaN, infinite, or outside [0, 1]
    BrightnessOutOfRange,
}

/// Rejected display configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Brightness scale is negative or not finite
    InvalidBrightnessScale,
    /// Chip address does not fit in 7 bits
    InvalidAddress(u8),
    /// Two driver chips share one address
    DuplicateAddress(u8),
    /// Bus frequency of zero
    ZeroBusFrequency,
    /// Bus completion wait of zero polls
    ZeroBusTimeout,
}
