//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in trichrome-core, built on the peripheral traits of trichrome-hal:
//!
//! - Two-wire bus driver with bounded completion waits
//! - Bit-banged two-wire peripheral over `embedded-hal` pins
//! - PCA9685 register map, verified register writes and chip bring-up
//! - Port-based column enable lines with heartbeat strobe
//! - Timer-gated sweep clock

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod enable;
pub mod pca9685;
pub mod twi;

pub use clock::TimerClock;
pub use enable::PortEnableLines;
pub use pca9685::{Pca9685, TransactionError};
pub use twi::{BusError, BusOp, SoftTwi, TwiBus};
