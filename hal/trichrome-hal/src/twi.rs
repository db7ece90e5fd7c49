//! Two-wire bus abstractions
//!
//! Models a two-wire (I2C) controller the way AVR-class TWI peripherals
//! expose it: the driver issues one bus phase at a time, polls a completion
//! flag, then inspects a status register whose upper five bits report what
//! happened on the wire.

/// Standard two-wire status codes (upper five bits of the status register)
pub mod status {
    /// Mask applied to the raw status register
    pub const MASK: u8 = 0xF8;
    /// Illegal start or stop condition observed
    pub const BUS_ERROR: u8 = 0x00;
    /// START condition transmitted
    pub const START: u8 = 0x08;
    /// Repeated START condition transmitted
    pub const REPEATED_START: u8 = 0x10;
    /// Address + write transmitted, ACK received
    pub const ADDRESS_WRITE_ACK: u8 = 0x18;
    /// Address + write transmitted, NACK received
    pub const ADDRESS_WRITE_NACK: u8 = 0x20;
    /// Data byte transmitted, ACK received
    pub const DATA_WRITE_ACK: u8 = 0x28;
    /// Data byte transmitted, NACK received
    pub const DATA_WRITE_NACK: u8 = 0x30;
    /// Arbitration lost
    pub const ARBITRATION_LOST: u8 = 0x38;
    /// Address + read transmitted, ACK received
    pub const ADDRESS_READ_ACK: u8 = 0x40;
    /// Address + read transmitted, NACK received
    pub const ADDRESS_READ_NACK: u8 = 0x48;
    /// Data byte received, ACK returned
    pub const DATA_READ_ACK: u8 = 0x50;
    /// Data byte received, NACK returned
    pub const DATA_READ_NACK: u8 = 0x58;
    /// No relevant state information available
    pub const IDLE: u8 = 0xF8;
}

/// One bus phase to be carried out by the peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TwiCommand {
    /// Generate a START (or repeated START) condition
    Start,
    /// Generate a STOP condition
    Stop,
    /// Shift out one byte and sample the peer's acknowledge bit
    Transmit(u8),
    /// Shift in one byte, answering ACK (`true`) or NACK (`false`)
    Receive { ack: bool },
}

/// Two-wire bus controller
///
/// Mirrors a hardware TWI block: [`issue`](Self::issue) kicks off a phase,
/// [`is_complete`](Self::is_complete) is the interrupt flag the driver polls,
/// and [`raw_status`](Self::raw_status) is the unmasked status register.
pub trait TwiPeripheral {
    /// Program the bit rate and enable the peripheral
    fn configure(&mut self, config: TwiConfig);

    /// Start one bus phase
    fn issue(&mut self, command: TwiCommand);

    /// Check if the most recently issued phase has finished
    fn is_complete(&self) -> bool;

    /// Unmasked status register
    fn raw_status(&self) -> u8;

    /// Data register (last byte received)
    fn data(&self) -> u8;
}

/// Two-wire bus configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TwiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for TwiConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl TwiConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self { frequency: 400_000 };

    /// Create a config for the given SCL frequency
    pub const fn new(frequency: u32) -> Self {
        Self { frequency }
    }

    /// Bit-rate register value for a controller clocked at `cpu_hz`
    ///
    /// SCL = cpu / (16 + 2 * divisor) with a prescaler of 1. Saturates at 0
    /// when the CPU is too slow for the requested rate, and at 255.
    pub fn bit_rate_divisor(&self, cpu_hz: u32) -> u8 {
        if self.frequency == 0 {
            return u8::MAX;
        }
        let ratio = cpu_hz / self.frequency;
        let divisor = ratio.saturating_sub(16) / 2;
        divisor.min(u8::MAX as u32) as u8
    }

    /// SCL half-period in nanoseconds, for bit-banged implementations
    pub fn half_period_ns(&self) -> u32 {
        if self.frequency == 0 {
            return 0;
        }
        500_000_000 / self.frequency
    }
}
