//! Hardware-facing traits
//!
//! These traits are the seams between the scan engine and the board:
//! register writes to the PWM chips, the column enable lines, and the
//! elapsed-time clock that bounds a sweep.

pub mod bus;
pub mod clock;
pub mod enable;

pub use bus::RegisterWriter;
pub use clock::SweepClock;
pub use enable::EnableLines;
