//! Physical wiring of the 9×9 matrix
//!
//! These tables encode how the board is wired, not a formula: logical rows
//! are spread across the two driver chips in non-contiguous LED blocks, and
//! each column is selected by one active-low line on one of two ports.

use crate::buffer::{Channel, CHANNELS};

/// Rows in the matrix
pub const ROWS: usize = 9;

/// Physical columns (one enable line each)
pub const COLUMNS: usize = 9;

/// Tri-colour LEDs in the matrix
pub const LED_COUNT: usize = ROWS * COLUMNS;

/// Number of PWM driver chips on the bus
pub const CHIP_COUNT: usize = 2;

/// Enable-port pattern that leaves every column unpowered
pub const ALL_OFF: EnablePattern = EnablePattern::new(0xFF, 0xFF);

/// Levels driven onto the two enable ports
///
/// Lines are active-low: a 0 bit powers its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EnablePattern {
    pub port_a: u8,
    pub port_d: u8,
}

impl EnablePattern {
    /// Pattern from the two port levels
    pub const fn new(port_a: u8, port_d: u8) -> Self {
        Self { port_a, port_d }
    }

    /// Number of columns this pattern powers
    pub const fn active_lines(&self) -> u32 {
        (!self.port_a).count_ones() + (!self.port_d).count_ones()
    }
}

/// Column enable patterns, indexed by column
///
/// Column 0 hangs off port A bit 0; columns 1-8 use port D bits 0-7.
pub const COLUMN_ENABLE: [EnablePattern; COLUMNS] = [
    EnablePattern::new(0xFE, 0xFF),
    EnablePattern::new(0xFF, 0xFE),
    EnablePattern::new(0xFF, 0xFD),
    EnablePattern::new(0xFF, 0xFB),
    EnablePattern::new(0xFF, 0xF7),
    EnablePattern::new(0xFF, 0xEF),
    EnablePattern::new(0xFF, 0xDF),
    EnablePattern::new(0xFF, 0xBF),
    EnablePattern::new(0xFF, 0x7F),
];

/// Order in which a pass visits the columns
pub const SCAN_ORDER: [usize; COLUMNS] = [0, 1, 2, 3, 4, 5, 6, 7, 8];

/// Driver chip (index into the configured address list) for each row
const ROW_CHIP: [u8; ROWS] = [0, 0, 0, 0, 0, 1, 1, 1, 1];

/// LED output block on the chip, indexed by `[channel][row]`
const LED_BLOCK: [[u8; ROWS]; CHANNELS] = [
    [0, 3, 6, 10, 13, 0, 3, 6, 10],
    [1, 4, 8, 11, 14, 1, 4, 8, 11],
    [2, 5, 9, 12, 15, 2, 5, 9, 12],
];

/// Where one colour channel of one row is wired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedTarget {
    /// Index into the chip address list
    pub chip: u8,
    /// PWM output (0-15) on that chip
    pub led: u8,
}

/// First LED output's OFF_L register on the driver chip
pub const LED0_OFF_L: u8 = 0x08;

/// Register stride between consecutive LED outputs (ON_L, ON_H, OFF_L, OFF_H)
pub const LED_REGISTER_STRIDE: u8 = 4;

impl LedTarget {
    /// OFF_L register of this output; OFF_H follows it
    pub const fn off_low_register(&self) -> u8 {
        LED0_OFF_L + LED_REGISTER_STRIDE * self.led
    }

    /// OFF_H register of this output
    pub const fn off_high_register(&self) -> u8 {
        self.off_low_register() + 1
    }
}

/// Look up the chip and PWM output driving `(row, channel)`
///
/// Returns `None` for a row outside the matrix.
pub fn led_target(row: usize, channel: Channel) -> Option<LedTarget> {
    let chip = *ROW_CHIP.get(row)?;
    let led = *LED_BLOCK[channel.index()].get(row)?;
    Some(LedTarget { chip, led })
}
