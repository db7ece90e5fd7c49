//! Test doubles for the two-wire bus
//!
//! [`ScriptedTwi`] replays status codes; [`Wire`] with [`Sda`] and [`Scl`]
//! simulates the two lines under [`SoftTwi`](super::SoftTwi).

extern crate std;

use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use trichrome_hal::twi::{status, TwiCommand, TwiConfig, TwiPeripheral};

/// Peripheral that answers each non-STOP phase with the next scripted status
pub(crate) struct ScriptedTwi {
    statuses: &'static [u8],
    next: usize,
    /// Start over from the first status once the script runs out
    cycle: bool,
    pub rx: &'static [u8],
    rx_next: usize,
    pub commands: Vec<TwiCommand>,
    pub config: Option<TwiConfig>,
    pub configure_calls: u32,
    /// Never report completion
    pub stalled: bool,
    pub polls: Cell<u32>,
    status: u8,
    data: u8,
}

impl ScriptedTwi {
    /// Statuses played once, then BUS_ERROR
    pub fn new(statuses: &'static [u8]) -> Self {
        Self {
            statuses,
            next: 0,
            cycle: false,
            rx: &[],
            rx_next: 0,
            commands: Vec::new(),
            config: None,
            configure_calls: 0,
            stalled: false,
            polls: Cell::new(0),
            status: status::IDLE,
            data: 0,
        }
    }

    /// Statuses played in a loop
    pub fn cycling(statuses: &'static [u8]) -> Self {
        Self {
            cycle: true,
            ..Self::new(statuses)
        }
    }

    /// Bytes transmitted so far
    pub fn transmitted(&self) -> Vec<u8> {
        self.commands
            .iter()
            .filter_map(|c| match *c {
                TwiCommand::Transmit(b) => Some(b),
                _ => None,
            })
            .collect()
    }
}

impl TwiPeripheral for ScriptedTwi {
    fn configure(&mut self, config: TwiConfig) {
        self.config = Some(config);
        self.configure_calls += 1;
    }

    fn issue(&mut self, command: TwiCommand) {
        self.commands.push(command);
        if command == TwiCommand::Stop {
            self.status = status::IDLE;
            return;
        }

        if self.cycle && !self.statuses.is_empty() {
            self.next %= self.statuses.len();
        }
        self.status = self
            .statuses
            .get(self.next)
            .copied()
            .unwrap_or(status::BUS_ERROR);
        self.next += 1;

        if let TwiCommand::Receive { .. } = command {
            self.data = self.rx.get(self.rx_next).copied().unwrap_or(0xFF);
            self.rx_next += 1;
        }
    }

    fn is_complete(&self) -> bool {
        self.polls.set(self.polls.get() + 1);
        !self.stalled
    }

    fn raw_status(&self) -> u8 {
        self.status
    }

    fn data(&self) -> u8 {
        self.data
    }
}

/// Shared state of the two wires
#[derive(Default)]
pub(crate) struct Wire {
    pub sda: bool,
    pub scl: bool,
    /// A peer holds SDA low whenever the master releases it
    pub peer_pulls_low: bool,
    /// Reads of SDA the peer leaves unanswered before it starts pulling low
    pub silent_reads: u32,
    /// SDA level at every SCL rising edge
    pub clocked: Vec<bool>,
    /// SDA transitions as (new level, SCL level at the time)
    pub sda_edges: Vec<(bool, bool)>,
}

pub(crate) struct Sda<'a>(pub &'a RefCell<Wire>);
pub(crate) struct Scl<'a>(pub &'a RefCell<Wire>);
pub(crate) struct NoDelay;

impl ErrorType for Sda<'_> {
    type Error = Infallible;
}

impl OutputPin for Sda<'_> {
    fn set_low(&mut self) -> Result<(), Infallible> {
        let mut w = self.0.borrow_mut();
        if w.sda {
            let scl = w.scl;
            w.sda_edges.push((false, scl));
        }
        w.sda = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        let mut w = self.0.borrow_mut();
        if !w.sda {
            let scl = w.scl;
            w.sda_edges.push((true, scl));
        }
        w.sda = true;
        Ok(())
    }
}

impl InputPin for Sda<'_> {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        let mut w = self.0.borrow_mut();
        if w.sda && w.silent_reads > 0 {
            w.silent_reads -= 1;
            return Ok(true);
        }
        Ok(w.sda && !w.peer_pulls_low)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        self.is_high().map(|h| !h)
    }
}

impl ErrorType for Scl<'_> {
    type Error = Infallible;
}

impl OutputPin for Scl<'_> {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().scl = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        let mut w = self.0.borrow_mut();
        if !w.scl {
            let sda = w.sda;
            w.clocked.push(sda);
        }
        w.scl = true;
        Ok(())
    }
}

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}
