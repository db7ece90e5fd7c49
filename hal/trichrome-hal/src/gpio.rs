//! GPIO abstractions
//!
//! Single pins drive the heartbeat strobe; whole 8-bit ports drive the
//! column enable lines, which must change in one write so that two columns
//! are never powered at the same instant.

/// Single output line: the heartbeat strobe or the driver supply enable
///
/// The supply line is active-low, so callers track polarity; the pin itself
/// only knows its electrical level.
pub trait OutputPin {
    /// Drive the line high
    fn set_high(&mut self);

    /// Drive the line low
    fn set_low(&mut self);

    /// Invert the driven level
    fn toggle(&mut self);

    /// Drive the line to `high`
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Level most recently driven
    fn is_set_high(&self) -> bool;
}

/// 8-bit digital output port
///
/// All eight lines are updated by a single register write.
pub trait OutputPort {
    /// Drive the port to the given bit pattern
    fn write(&mut self, bits: u8);

    /// The pattern most recently written
    fn output(&self) -> u8;
}
