//! Board-agnostic core logic for the Trichrome LED matrix
//!
//! This crate contains all display logic that does not depend on a specific
//! microcontroller:
//!
//! - Brightness buffer (channel × row × column duty values)
//! - Physical wiring tables (column enables, row → chip/LED mapping)
//! - Millisecond time base shared with the timer interrupt
//! - Scan engine (time-multiplexed refresh of the whole matrix)
//! - Retry policies for bring-up and steady-state register writes
//! - Configuration and the random pattern source
//!
//! Hardware access goes through the traits in [`traits`]; concrete
//! implementations live in trichrome-drivers.

#![no_std]
#![deny(unsafe_code)]

pub mod buffer;
pub mod config;
pub mod display;
pub mod error;
pub mod layout;
pub mod pattern;
pub mod retry;
pub mod scan;
pub mod timebase;
pub mod traits;

pub use buffer::{BrightnessBuffer, Channel, MAX_DUTY};
pub use config::DisplayConfig;
pub use display::Display;
pub use error::{ConfigError, InputError};
pub use retry::{BringUpPolicy, SteadyStatePolicy};
pub use scan::{ScanEngine, ScanStats, SweepReport};
pub use timebase::TimeBase;
