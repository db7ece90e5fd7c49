//! Configuration types
//!
//! Board-agnostic settings for the display. Configuration lives only in
//! RAM; it is rebuilt from defaults (or the board crate's constants) on
//! every power-up.

pub mod types;

pub use types::*;
