//! Brightness buffer
//!
//! A channel × row × column store of 12-bit duty values. The animation
//! source writes it between sweeps; the scan engine reads it during one.
//! Every cell always holds a value in `0..=MAX_DUTY`: normalized levels are
//! validated, raw duties are clamped, and indices are bounds-checked.
//!
//! The stored value is the PCA9685 "turn-off tick": the output is on from
//! tick 0 until this tick, so it is the on-fraction of the PWM period.

use crate::error::{ConfigError, InputError};
use crate::layout::{COLUMNS, LED_COUNT, ROWS};

/// Largest duty value (12-bit PWM counter)
pub const MAX_DUTY: u16 = 4095;

/// Number of colour channels per LED
pub const CHANNELS: usize = 3;

/// Colour channel of a tri-colour LED
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    /// All channels in scan order
    pub const ALL: [Channel; CHANNELS] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Buffer plane index
    pub const fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

impl TryFrom<u8> for Channel {
    type Error = InputError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Channel::Red),
            1 => Ok(Channel::Green),
            2 => Ok(Channel::Blue),
            other => Err(InputError::ChannelOutOfRange(other)),
        }
    }
}

/// Convert a normalized level into a duty value
///
/// Returns `round(MAX_DUTY × level × scale)` clamped to `0..=MAX_DUTY`.
/// The level itself must be finite and within `[0, 1]`.
pub fn quantize(level: f32, scale: f32) -> Result<u16, InputError> {
    if !level.is_finite() || !(0.0..=1.0).contains(&level) {
        return Err(InputError::BrightnessOutOfRange);
    }
    let scaled = libm::roundf(MAX_DUTY as f32 * level * scale);
    // NaN (from a non-finite scale) fails both comparisons and lands on 0
    let duty = if scaled >= MAX_DUTY as f32 {
        MAX_DUTY
    } else if scaled > 0.0 {
        scaled as u16
    } else {
        0
    };
    Ok(duty)
}

/// Duty-cycle store for the whole matrix
#[derive(Debug, Clone, PartialEq)]
pub struct BrightnessBuffer {
    duty: [[[u16; COLUMNS]; ROWS]; CHANNELS],
    scale: f32,
}

impl Default for BrightnessBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl BrightnessBuffer {
    /// Create a cleared buffer with a brightness scale of 1.0
    pub const fn new() -> Self {
        Self {
            duty: [[[0; COLUMNS]; ROWS]; CHANNELS],
            scale: 1.0,
        }
    }

    /// Create a cleared buffer with the given global brightness scale
    pub fn with_scale(scale: f32) -> Result<Self, ConfigError> {
        let mut buffer = Self::new();
        buffer.set_scale(scale)?;
        Ok(buffer)
    }

    /// Global brightness scale applied by [`set_brightness`](Self::set_brightness)
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Change the global brightness scale
    ///
    /// Already stored duties are left untouched.
    pub fn set_scale(&mut self, scale: f32) -> Result<(), ConfigError> {
        if !scale.is_finite() || scale < 0.0 {
            return Err(ConfigError::InvalidBrightnessScale);
        }
        self.scale = scale;
        Ok(())
    }

    /// Set one LED channel from a normalized level in `[0, 1]`
    ///
    /// Returns the duty value that was stored.
    pub fn set_brightness(
        &mut self,
        row: u8,
        column: u8,
        channel: Channel,
        level: f32,
    ) -> Result<u16, InputError> {
        let (r, c) = check_position(row, column)?;
        let duty = quantize(level, self.scale)?;
        self.duty[channel.index()][r][c] = duty;
        Ok(duty)
    }

    /// Set one LED channel by linear LED index (`0..81`)
    ///
    /// LEDs are numbered column-major: `column = index / 9`, `row = index % 9`.
    pub fn set_led(&mut self, index: u8, channel: Channel, level: f32) -> Result<u16, InputError> {
        if index as usize >= LED_COUNT {
            return Err(InputError::LedOutOfRange(index));
        }
        let column = index / ROWS as u8;
        let row = index % ROWS as u8;
        self.set_brightness(row, column, channel, level)
    }

    /// Store a raw duty value, clamped to `MAX_DUTY`
    pub fn set_duty(
        &mut self,
        channel: Channel,
        row: u8,
        column: u8,
        duty: u16,
    ) -> Result<(), InputError> {
        let (r, c) = check_position(row, column)?;
        self.duty[channel.index()][r][c] = duty.min(MAX_DUTY);
        Ok(())
    }

    /// Read one duty value
    pub fn duty(&self, channel: Channel, row: u8, column: u8) -> Result<u16, InputError> {
        let (r, c) = check_position(row, column)?;
        Ok(self.duty[channel.index()][r][c])
    }

    /// Read one duty value by already-validated position
    ///
    /// Used by the scan engine, whose loop bounds are the matrix dimensions.
    pub(crate) fn duty_at(&self, channel: Channel, row: usize, column: usize) -> u16 {
        self.duty[channel.index()][row][column]
    }

    /// Zero every cell
    pub fn clear(&mut self) {
        for plane in self.duty.iter_mut() {
            for row in plane.iter_mut() {
                row.fill(0);
            }
        }
    }

    /// Check if every cell is zero
    pub fn is_clear(&self) -> bool {
        self.duty.iter().flatten().flatten().all(|&d| d == 0)
    }
}

fn check_position(row: u8, column: u8) -> Result<(usize, usize), InputError> {
    if row as usize >= ROWS {
        return Err(InputError::RowOutOfRange(row));
    }
    if column as usize >= COLUMNS {
        return Err(InputError::ColumnOutOfRange(column));
    }
    Ok((row as usize, column as usize))
}
