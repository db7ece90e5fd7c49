//! Two-wire bus
//!
//! [`TwiBus`] turns a [`TwiPeripheral`](trichrome_hal::TwiPeripheral) into
//! blocking start/stop/write/read primitives. [`SoftTwi`] is a peripheral
//! built from two GPIO lines for boards without a usable hardware block.

pub mod bus;
pub mod soft;

#[cfg(test)]
pub(crate) mod mock;

pub use bus::{BusError, BusOp, TwiBus};
pub use soft::SoftTwi;
