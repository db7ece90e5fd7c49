//! Trichrome Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits that a board crate
//! implements for its microcontroller. The scan engine and bus driver are
//! written against these traits only, so the same display code runs on any
//! chip with a two-wire controller, two 8-bit output ports and a timer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Board crate (ISR, oscillator, main)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  trichrome-drivers / trichrome-core     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  trichrome-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`twi::TwiPeripheral`] - Two-wire (I2C) controller with status register
//! - [`gpio::OutputPin`], [`gpio::OutputPort`] - Digital outputs
//! - [`timer::PeriodicTimer`] - Periodic interrupt source for the time base

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod timer;
pub mod twi;

// Re-export key traits at crate root for convenience
pub use gpio::{OutputPin, OutputPort};
pub use timer::PeriodicTimer;
pub use twi::{TwiCommand, TwiConfig, TwiPeripheral};
