//! Port-driven column enable lines
//!
//! Columns are selected through two 8-bit ports with active-low lines:
//! column 0 on port A bit 0, columns 1..8 on port D bits 0..7. Each pattern
//! from [`COLUMN_ENABLE`] is written port by port, with the port being
//! released written first so two columns never overlap.
//!
//! The heartbeat strobe and the driver-chip supply each sit on their own
//! pin. The supply line is active-low: pulling it low powers both chips
//! and enables their outputs.

use trichrome_core::layout::{EnablePattern, ALL_OFF, COLUMN_ENABLE};
use trichrome_core::traits::EnableLines;
use trichrome_hal::gpio::{OutputPin, OutputPort};

/// Column enable lines on two output ports
pub struct PortEnableLines<A, D, S, PW> {
    port_a: A,
    port_d: D,
    strobe: S,
    power: PW,
}

impl<A, D, S, PW> PortEnableLines<A, D, S, PW>
where
    A: OutputPort,
    D: OutputPort,
    S: OutputPin,
    PW: OutputPin,
{
    /// Take ownership of the lines and drive every column off
    ///
    /// The driver chips are left unpowered.
    pub fn new(port_a: A, port_d: D, strobe: S, power: PW) -> Self {
        let mut lines = Self {
            port_a,
            port_d,
            strobe,
            power,
        };
        lines.all_off();
        lines.power.set_high();
        lines
    }

    /// Pattern currently driven on both ports
    pub fn pattern(&self) -> EnablePattern {
        EnablePattern::new(self.port_a.output(), self.port_d.output())
    }

    /// Whether the driver chips are powered
    pub fn drivers_powered(&self) -> bool {
        !self.power.is_set_high()
    }

    fn apply(&mut self, pattern: EnablePattern) {
        // Release before engage: a port losing its active line goes first
        if pattern.port_a == ALL_OFF.port_a {
            self.port_a.write(pattern.port_a);
            self.port_d.write(pattern.port_d);
        } else {
            self.port_d.write(pattern.port_d);
            self.port_a.write(pattern.port_a);
        }
    }

    /// Give back the ports and pins
    pub fn release(self) -> (A, D, S, PW) {
        (self.port_a, self.port_d, self.strobe, self.power)
    }
}

impl<A, D, S, PW> EnableLines for PortEnableLines<A, D, S, PW>
where
    A: OutputPort,
    D: OutputPort,
    S: OutputPin,
    PW: OutputPin,
{
    fn select_column(&mut self, column: usize) {
        match COLUMN_ENABLE.get(column) {
            Some(&pattern) => self.apply(pattern),
            None => self.apply(ALL_OFF),
        }
    }

    fn all_off(&mut self) {
        self.apply(ALL_OFF);
    }

    fn toggle_strobe(&mut self) {
        self.strobe.toggle();
    }

    fn power_drivers(&mut self, on: bool) {
        self.power.set_state(!on);
    }
}
