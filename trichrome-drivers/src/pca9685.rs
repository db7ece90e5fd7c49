//! PCA9685 16-channel PWM driver (two-wire register interface)
//!
//! The PCA9685 generates 12-bit PWM on 16 outputs. Each output has four
//! registers: ON_L, ON_H, OFF_L, OFF_H. The output turns on at the ON tick
//! and off at the OFF tick of a 4096-tick period. This driver leaves every
//! ON time at zero (via the ALL_LED_ON registers at bring-up), so the OFF
//! tick alone sets the duty cycle.
//!
//! # Register write transaction
//!
//! One register is written per transaction, and the bus status is checked
//! after every phase:
//!
//! | Phase    | Byte sent          | Expected status |
//! |----------|--------------------|-----------------|
//! | START    | -                  | `0x08`          |
//! | ADDRESS  | `address << 1 \| W`| `0x18`          |
//! | REGISTER | register index     | `0x28`          |
//! | DATA     | value              | `0x28`          |
//!
//! The first mismatch aborts the transaction without a STOP; the bus state
//! is then unknown. The retry owner calls [`Pca9685::recover`] to release
//! the bus, and the next transaction starts over from START.

use trichrome_core::retry::BringUpPolicy;
use trichrome_core::traits::RegisterWriter;
use trichrome_hal::twi::{status, TwiPeripheral};

use crate::twi::{BusError, TwiBus};

/// PCA9685 register addresses
pub mod reg {
    /// Mode register 1
    pub const MODE1: u8 = 0x00;
    /// Mode register 2
    pub const MODE2: u8 = 0x01;
    /// Sub-address 1
    pub const SUBADR1: u8 = 0x02;
    /// Sub-address 2
    pub const SUBADR2: u8 = 0x03;
    /// Sub-address 3
    pub const SUBADR3: u8 = 0x04;
    /// All-call address
    pub const ALLCALLADR: u8 = 0x05;
    /// Output 0 ON tick, low byte
    pub const LED0_ON_L: u8 = 0x06;
    /// Output 0 ON tick, high nibble
    pub const LED0_ON_H: u8 = 0x07;
    /// Output 0 OFF tick, low byte
    pub const LED0_OFF_L: u8 = 0x08;
    /// Output 0 OFF tick, high nibble
    pub const LED0_OFF_H: u8 = 0x09;
    /// All outputs ON tick, low byte
    pub const ALL_LED_ON_L: u8 = 0xFA;
    /// All outputs ON tick, high nibble
    pub const ALL_LED_ON_H: u8 = 0xFB;
    /// All outputs OFF tick, low byte
    pub const ALL_LED_OFF_L: u8 = 0xFC;
    /// All outputs OFF tick, high nibble
    pub const ALL_LED_OFF_H: u8 = 0xFD;
    /// PWM frequency prescaler
    pub const PRE_SCALE: u8 = 0xFE;
}

/// MODE1 bits
pub mod mode1 {
    /// Respond to the all-call address
    pub const ALLCALL: u8 = 0x01;
    /// Oscillator off (low-power mode)
    pub const SLEEP: u8 = 0x10;
    /// Register auto-increment
    pub const AI: u8 = 0x20;
    /// Restart PWM after sleep
    pub const RESTART: u8 = 0x80;
}

/// MODE2 bits
pub mod mode2 {
    /// Totem-pole outputs (open-drain when clear)
    pub const OUTDRV: u8 = 0x04;
    /// Outputs change on ACK instead of STOP
    pub const OCH: u8 = 0x08;
    /// Invert output logic
    pub const INVRT: u8 = 0x10;
}

/// PWM outputs per chip
pub const OUTPUTS: u8 = 16;

/// Registers per output (ON_L, ON_H, OFF_L, OFF_H)
pub const REGISTERS_PER_OUTPUT: u8 = 4;

/// Register writes that bring a chip into display mode
///
/// MODE1: oscillator running, all-call enabled. MODE2: totem-pole outputs,
/// update on STOP, not inverted. ALL_LED_ON: every ON tick at zero.
pub const INIT_SEQUENCE: [(u8, u8); 4] = [
    (reg::MODE1, mode1::ALLCALL),
    (reg::MODE2, mode2::OUTDRV),
    (reg::ALL_LED_ON_L, 0x00),
    (reg::ALL_LED_ON_H, 0x00),
];

/// 7-bit bus address for the given A5..A0 strap pins
pub const fn hardware_address(pins: u8) -> u8 {
    0x40 | (pins & 0x3F)
}

/// ON_L register of `output`
pub const fn led_on_l(output: u8) -> u8 {
    reg::LED0_ON_L + REGISTERS_PER_OUTPUT * output
}

/// OFF_L register of `output`
pub const fn led_off_l(output: u8) -> u8 {
    reg::LED0_OFF_L + REGISTERS_PER_OUTPUT * output
}

/// Transaction phase in which a status check failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    Start,
    Address,
    Register,
    Data,
}

/// Register write failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransactionError {
    /// The bus never completed a phase
    Bus(BusError),
    /// The bus reported a different status than the phase expects
    UnexpectedStatus {
        phase: Phase,
        expected: u8,
        observed: u8,
    },
}

impl From<BusError> for TransactionError {
    fn from(e: BusError) -> Self {
        TransactionError::Bus(e)
    }
}

/// PCA9685 register access over a two-wire bus
///
/// One instance serves every chip on the bus; the chip is selected per
/// call by its address.
pub struct Pca9685<P> {
    bus: TwiBus<P>,
}

impl<P: TwiPeripheral> Pca9685<P> {
    /// Create a driver on top of a bus
    pub fn new(bus: TwiBus<P>) -> Self {
        Self { bus }
    }

    /// Configure and enable the bus
    pub fn init(&mut self) {
        self.bus.init();
    }

    /// Write one register with a verified transaction
    pub fn write_register(
        &mut self,
        address: u8,
        register: u8,
        value: u8,
    ) -> Result<(), TransactionError> {
        self.bus.start()?;
        self.expect_status(Phase::Start, status::START)?;

        self.bus.write_byte(address << 1)?;
        self.expect_status(Phase::Address, status::ADDRESS_WRITE_ACK)?;

        self.bus.write_byte(register)?;
        self.expect_status(Phase::Register, status::DATA_WRITE_ACK)?;

        self.bus.write_byte(value)?;
        self.expect_status(Phase::Data, status::DATA_WRITE_ACK)?;

        self.bus.stop();
        Ok(())
    }

    /// Release the bus after a failed transaction
    ///
    /// Issues a STOP so the next START is a fresh one rather than a
    /// repeated start inside the abandoned transaction.
    pub fn recover(&mut self) {
        self.bus.stop();
    }

    fn write_or_recover(
        &mut self,
        address: u8,
        register: u8,
        value: u8,
    ) -> Result<(), TransactionError> {
        let result = self.write_register(address, register, value);
        if result.is_err() {
            self.recover();
        }
        result
    }

    fn expect_status(&self, phase: Phase, expected: u8) -> Result<(), TransactionError> {
        let observed = self.bus.status();
        if observed == expected {
            Ok(())
        } else {
            Err(TransactionError::UnexpectedStatus {
                phase,
                expected,
                observed,
            })
        }
    }

    /// Bring one chip into display mode
    ///
    /// Every write of [`INIT_SEQUENCE`] is repeated under `policy`; with
    /// [`BringUpPolicy::UntilSuccess`] this blocks until the chip answers.
    /// Returns the total number of transactions issued.
    pub fn init_chip(
        &mut self,
        address: u8,
        policy: BringUpPolicy,
    ) -> Result<u32, TransactionError> {
        let mut attempts: u32 = 0;

        for &(register, value) in INIT_SEQUENCE.iter() {
            match policy.run(|| self.write_or_recover(address, register, value)) {
                Ok(n) => attempts = attempts.saturating_add(n),
                Err(e) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!(
                        "PCA9685 {=u8:#x} gave up on register {=u8:#x}: {}",
                        address,
                        register,
                        e
                    );
                    return Err(e);
                }
            }
        }

        #[cfg(feature = "defmt")]
        defmt::info!(
            "PCA9685 {=u8:#x} initialized ({} transactions)",
            address,
            attempts
        );

        Ok(attempts)
    }

    /// Bring every chip in `addresses` into display mode, in order
    pub fn init_chips(
        &mut self,
        addresses: &[u8],
        policy: BringUpPolicy,
    ) -> Result<u32, TransactionError> {
        let mut attempts: u32 = 0;
        for &address in addresses {
            attempts = attempts.saturating_add(self.init_chip(address, policy)?);
        }
        Ok(attempts)
    }

    /// The underlying bus
    pub fn bus(&self) -> &TwiBus<P> {
        &self.bus
    }

    /// Mutable access to the underlying bus
    pub fn bus_mut(&mut self) -> &mut TwiBus<P> {
        &mut self.bus
    }

    /// Give back the bus
    pub fn release(self) -> TwiBus<P> {
        self.bus
    }
}

impl<P: TwiPeripheral> RegisterWriter for Pca9685<P> {
    type Error = TransactionError;

    fn write_register(&mut self, address: u8, register: u8, value: u8) -> Result<(), Self::Error> {
        Pca9685::write_register(self, address, register, value)
    }

    fn recover(&mut self) {
        Pca9685::recover(self);
    }
}
