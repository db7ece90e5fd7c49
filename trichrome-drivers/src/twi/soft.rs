//! Bit-banged two-wire peripheral
//!
//! Drives SDA and SCL as open-drain GPIOs and reports the same status codes
//! a hardware TWI block would, so [`TwiBus`](super::TwiBus) and the PCA9685
//! transaction layer work unchanged on top of it. Every phase completes
//! synchronously inside [`issue`](TwiPeripheral::issue).
//!
//! SDA must be an open-drain pin that can be read back (`set_high` releases
//! the line). Clock stretching and multi-master arbitration are not
//! supported.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use trichrome_hal::twi::{status, TwiCommand, TwiConfig, TwiPeripheral};

/// Position within a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Started,
    Transmitting,
    Receiving,
}

/// A GPIO call failed
struct PinFault;

/// Two-wire peripheral built from two GPIO lines and a delay
pub struct SoftTwi<SDA, SCL, D> {
    sda: SDA,
    scl: SCL,
    delay: D,
    half_period_ns: u32,
    enabled: bool,
    phase: Phase,
    status: u8,
    data: u8,
}

impl<SDA, SCL, D> SoftTwi<SDA, SCL, D>
where
    SDA: OutputPin + InputPin,
    SCL: OutputPin,
    D: DelayNs,
{
    /// Create a disabled peripheral; call `configure` before use
    pub fn new(sda: SDA, scl: SCL, delay: D) -> Self {
        Self {
            sda,
            scl,
            delay,
            half_period_ns: TwiConfig::STANDARD.half_period_ns(),
            enabled: false,
            phase: Phase::Idle,
            status: status::IDLE,
            data: 0,
        }
    }

    /// Give back the pins and delay
    pub fn release(self) -> (SDA, SCL, D) {
        (self.sda, self.scl, self.delay)
    }

    fn half(&mut self) {
        self.delay.delay_ns(self.half_period_ns);
    }

    fn sda(&mut self, high: bool) -> Result<(), PinFault> {
        let result = if high {
            self.sda.set_high()
        } else {
            self.sda.set_low()
        };
        result.map_err(|_| PinFault)
    }

    fn scl(&mut self, high: bool) -> Result<(), PinFault> {
        let result = if high {
            self.scl.set_high()
        } else {
            self.scl.set_low()
        };
        result.map_err(|_| PinFault)
    }

    fn start_condition(&mut self) -> Result<u8, PinFault> {
        let repeated = self.phase != Phase::Idle;

        // Both lines high, then SDA falls while SCL is high
        self.sda(true)?;
        self.half();
        self.scl(true)?;
        self.half();
        self.sda(false)?;
        self.half();
        self.scl(false)?;

        self.phase = Phase::Started;
        Ok(if repeated {
            status::REPEATED_START
        } else {
            status::START
        })
    }

    fn stop_condition(&mut self) -> Result<u8, PinFault> {
        // SDA rises while SCL is high
        self.sda(false)?;
        self.half();
        self.scl(true)?;
        self.half();
        self.sda(true)?;
        self.half();

        self.phase = Phase::Idle;
        Ok(status::IDLE)
    }

    fn write_bit(&mut self, bit: bool) -> Result<(), PinFault> {
        self.sda(bit)?;
        self.half();
        self.scl(true)?;
        self.half();
        self.scl(false)
    }

    fn read_bit(&mut self) -> Result<bool, PinFault> {
        self.sda(true)?;
        self.half();
        self.scl(true)?;
        self.half();
        let bit = self.sda.is_high().map_err(|_| PinFault)?;
        self.scl(false)?;
        Ok(bit)
    }

    fn transmit(&mut self, byte: u8) -> Result<u8, PinFault> {
        if self.phase == Phase::Idle {
            return Ok(status::BUS_ERROR);
        }

        for i in (0..8).rev() {
            self.write_bit(byte & (1 << i) != 0)?;
        }
        // Peer pulls SDA low to acknowledge
        let ack = !self.read_bit()?;

        let code = match self.phase {
            Phase::Started if byte & 0x01 == 0 => {
                self.phase = Phase::Transmitting;
                if ack {
                    status::ADDRESS_WRITE_ACK
                } else {
                    status::ADDRESS_WRITE_NACK
                }
            }
            Phase::Started => {
                self.phase = Phase::Receiving;
                if ack {
                    status::ADDRESS_READ_ACK
                } else {
                    status::ADDRESS_READ_NACK
                }
            }
            _ => {
                if ack {
                    status::DATA_WRITE_ACK
                } else {
                    status::DATA_WRITE_NACK
                }
            }
        };
        Ok(code)
    }

    fn receive(&mut self, ack: bool) -> Result<u8, PinFault> {
        if self.phase == Phase::Idle {
            return Ok(status::BUS_ERROR);
        }

        let mut byte = 0u8;
        for _ in 0..8 {
            byte = (byte << 1) | u8::from(self.read_bit()?);
        }
        // ACK is a low bit in the ninth slot
        self.write_bit(!ack)?;
        self.data = byte;

        Ok(if ack {
            status::DATA_READ_ACK
        } else {
            status::DATA_READ_NACK
        })
    }
}

impl<SDA, SCL, D> TwiPeripheral for SoftTwi<SDA, SCL, D>
where
    SDA: OutputPin + InputPin,
    SCL: OutputPin,
    D: DelayNs,
{
    fn configure(&mut self, config: TwiConfig) {
        self.half_period_ns = config.half_period_ns();
        self.phase = Phase::Idle;
        self.status = status::IDLE;
        // Release both lines to the idle-high state
        self.enabled = self.sda(true).and_then(|()| self.scl(true)).is_ok();
    }

    fn issue(&mut self, command: TwiCommand) {
        if !self.enabled {
            self.status = status::BUS_ERROR;
            return;
        }

        let result = match command {
            TwiCommand::Start => self.start_condition(),
            TwiCommand::Stop => self.stop_condition(),
            TwiCommand::Transmit(byte) => self.transmit(byte),
            TwiCommand::Receive { ack } => self.receive(ack),
        };

        self.status = match result {
            Ok(code) => code,
            Err(PinFault) => {
                self.phase = Phase::Idle;
                status::BUS_ERROR
            }
        };
    }

    fn is_complete(&self) -> bool {
        true
    }

    fn raw_status(&self) -> u8 {
        self.status
    }

    fn data(&self) -> u8 {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use core::cell::RefCell;

    use super::*;
    use crate::twi::mock::{NoDelay, Scl, Sda, Wire};

    fn twi(wire: &RefCell<Wire>) -> SoftTwi<Sda<'_>, Scl<'_>, NoDelay> {
        let mut twi = SoftTwi::new(Sda(wire), Scl(wire), NoDelay);
        twi.configure(TwiConfig::STANDARD);
        let mut w = wire.borrow_mut();
        w.clocked.clear();
        w.sda_edges.clear();
        drop(w);
        twi
    }

    #[test]
    fn test_unconfigured_reports_bus_error() {
        let wire = RefCell::new(Wire::default());
        let mut twi = SoftTwi::new(Sda(&wire), Scl(&wire), NoDelay);
        twi.issue(TwiCommand::Start);
        assert_eq!(twi.raw_status(), status::BUS_ERROR);
    }

    #[test]
    fn test_start_and_repeated_start() {
        let wire = RefCell::new(Wire::default());
        let mut twi = twi(&wire);

        twi.issue(TwiCommand::Start);
        assert!(twi.is_complete());
        assert_eq!(twi.raw_status(), status::START);

        twi.issue(TwiCommand::Start);
        assert_eq!(twi.raw_status(), status::REPEATED_START);

        // First SDA edge after configure is the fall with SCL high
        assert_eq!(wire.borrow().sda_edges.first(), Some(&(false, true)));
    }

    #[test]
    fn test_address_write_acked() {
        let wire = RefCell::new(Wire {
            peer_pulls_low: true,
            ..Wire::default()
        });
        let mut twi = twi(&wire);

        twi.issue(TwiCommand::Start);
        wire.borrow_mut().clocked.clear();
        twi.issue(TwiCommand::Transmit(0xD0));
        assert_eq!(twi.raw_status(), status::ADDRESS_WRITE_ACK);

        // MSB first, then the released ninth bit
        let clocked = wire.borrow().clocked.clone();
        assert_eq!(
            clocked,
            [true, true, false, true, false, false, false, false, true]
        );

        twi.issue(TwiCommand::Transmit(0x08));
        assert_eq!(twi.raw_status(), status::DATA_WRITE_ACK);
    }

    #[test]
    fn test_nack_without_peer() {
        let wire = RefCell::new(Wire::default());
        let mut twi = twi(&wire);

        twi.issue(TwiCommand::Start);
        twi.issue(TwiCommand::Transmit(0xD0));
        assert_eq!(twi.raw_status(), status::ADDRESS_WRITE_NACK);
        twi.issue(TwiCommand::Transmit(0x00));
        assert_eq!(twi.raw_status(), status::DATA_WRITE_NACK);
    }

    #[test]
    fn test_read_address_and_receive() {
        let wire = RefCell::new(Wire::default());
        let mut twi = twi(&wire);

        twi.issue(TwiCommand::Start);
        wire.borrow_mut().peer_pulls_low = true;
        twi.issue(TwiCommand::Transmit(0xD1));
        assert_eq!(twi.raw_status(), status::ADDRESS_READ_ACK);

        // Peer holding SDA low reads as 0x00
        twi.issue(TwiCommand::Receive { ack: true });
        assert_eq!(twi.raw_status(), status::DATA_READ_ACK);
        assert_eq!(twi.data(), 0x00);

        // Released bus reads as 0xFF
        wire.borrow_mut().peer_pulls_low = false;
        twi.issue(TwiCommand::Receive { ack: false });
        assert_eq!(twi.raw_status(), status::DATA_READ_NACK);
        assert_eq!(twi.data(), 0xFF);
    }

    #[test]
    fn test_transmit_outside_transaction() {
        let wire = RefCell::new(Wire::default());
        let mut twi = twi(&wire);

        twi.issue(TwiCommand::Transmit(0xD0));
        assert_eq!(twi.raw_status(), status::BUS_ERROR);
        assert!(wire.borrow().clocked.is_empty());
    }

    #[test]
    fn test_stop_releases_bus() {
        let wire = RefCell::new(Wire::default());
        let mut twi = twi(&wire);

        twi.issue(TwiCommand::Start);
        twi.issue(TwiCommand::Stop);
        assert_eq!(twi.raw_status(), status::IDLE);
        assert_eq!(wire.borrow().sda_edges.last(), Some(&(true, true)));

        // Next start is a fresh START, not a repeated one
        twi.issue(TwiCommand::Start);
        assert_eq!(twi.raw_status(), status::START);
    }

    #[test]
    fn test_abandoned_transaction_needs_stop() {
        let wire = RefCell::new(Wire::default());
        let mut twi = twi(&wire);

        // No peer: address is not acknowledged and the caller walks away
        twi.issue(TwiCommand::Start);
        twi.issue(TwiCommand::Transmit(0xD0));
        assert_eq!(twi.raw_status(), status::ADDRESS_WRITE_NACK);

        // Still inside the old transaction
        twi.issue(TwiCommand::Start);
        assert_eq!(twi.raw_status(), status::REPEATED_START);

        twi.issue(TwiCommand::Stop);
        twi.issue(TwiCommand::Start);
        assert_eq!(twi.raw_status(), status::START);
    }
}
