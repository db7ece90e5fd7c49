//! Blocking two-wire bus driver
//!
//! Each primitive issues one bus phase and polls the peripheral's completion
//! flag. The poll is bounded: after `timeout_spins` unsuccessful polls the
//! phase fails with [`BusError::Timeout`] instead of hanging the caller on a
//! stalled bus. STOP is not waited on, since its completion is not reported
//! by the hardware.
//!
//! None of the primitives are reentrant; one caller owns the bus at a time.

use trichrome_core::config::BusConfig;
use trichrome_hal::twi::{status, TwiCommand, TwiConfig, TwiPeripheral};

/// Bus primitive that was waiting when a timeout hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusOp {
    Start,
    Write,
    Read,
}

/// Two-wire bus errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// Peripheral never reported completion of the phase
    Timeout(BusOp),
}

/// Blocking two-wire bus master
pub struct TwiBus<P> {
    peripheral: P,
    config: TwiConfig,
    timeout_spins: u32,
}

impl<P: TwiPeripheral> TwiBus<P> {
    /// Create a bus driver
    ///
    /// `timeout_spins` is the number of completion polls per phase
    /// (at least one poll is always made).
    pub fn new(peripheral: P, config: TwiConfig, timeout_spins: u32) -> Self {
        Self {
            peripheral,
            config,
            timeout_spins: timeout_spins.max(1),
        }
    }

    /// Create a bus driver from the display's bus settings
    pub fn from_config(peripheral: P, bus: &BusConfig) -> Self {
        Self::new(peripheral, TwiConfig::new(bus.frequency_hz), bus.timeout_spins)
    }

    /// Program the bus speed and enable the peripheral
    ///
    /// Safe to call more than once.
    pub fn init(&mut self) {
        self.peripheral.configure(self.config);
    }

    /// Issue a START condition and wait for it to go out
    pub fn start(&mut self) -> Result<(), BusError> {
        self.peripheral.issue(TwiCommand::Start);
        self.wait(BusOp::Start)
    }

    /// Issue a STOP condition without waiting
    pub fn stop(&mut self) {
        self.peripheral.issue(TwiCommand::Stop);
    }

    /// Transmit one byte and wait for the acknowledge slot
    pub fn write_byte(&mut self, byte: u8) -> Result<(), BusError> {
        self.peripheral.issue(TwiCommand::Transmit(byte));
        self.wait(BusOp::Write)
    }

    /// Receive one byte and acknowledge it
    pub fn read_byte_ack(&mut self) -> Result<u8, BusError> {
        self.read(true)
    }

    /// Receive one byte without acknowledging it (last byte of a read)
    pub fn read_byte_nack(&mut self) -> Result<u8, BusError> {
        self.read(false)
    }

    /// Masked status code of the most recently completed phase
    pub fn status(&self) -> u8 {
        self.peripheral.raw_status() & status::MASK
    }

    fn read(&mut self, ack: bool) -> Result<u8, BusError> {
        self.peripheral.issue(TwiCommand::Receive { ack });
        self.wait(BusOp::Read)?;
        Ok(self.peripheral.data())
    }

    fn wait(&self, op: BusOp) -> Result<(), BusError> {
        for _ in 0..self.timeout_spins {
            if self.peripheral.is_complete() {
                return Ok(());
            }
            core::hint::spin_loop();
        }

        #[cfg(feature = "defmt")]
        defmt::error!("two-wire {} timed out after {} polls", op, self.timeout_spins);

        Err(BusError::Timeout(op))
    }

    /// The underlying peripheral
    pub fn peripheral(&self) -> &P {
        &self.peripheral
    }

    /// Mutable access to the underlying peripheral
    pub fn peripheral_mut(&mut self) -> &mut P {
        &mut self.peripheral
    }

    /// Give back the peripheral
    pub fn release(self) -> P {
        self.peripheral
    }
}
