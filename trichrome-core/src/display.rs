//! Display controller
//!
//! Owns the brightness buffer and the scan engine together, so the
//! "fill, then sweep" alternation is enforced by the borrow checker: the
//! buffer cannot be mutated while a sweep holds it.

use crate::buffer::{BrightnessBuffer, Channel};
use crate::config::DisplayConfig;
use crate::error::{ConfigError, InputError};
use crate::pattern::PatternSource;
use crate::scan::{ScanEngine, SweepReport};
use crate::traits::{EnableLines, RegisterWriter, SweepClock};

/// Brightness buffer plus the engine that scans it out
pub struct Display<W, L, C> {
    buffer: BrightnessBuffer,
    engine: ScanEngine<W, L, C>,
    period_ms: u32,
}

impl<W, L, C> Display<W, L, C>
where
    W: RegisterWriter,
    L: EnableLines,
    C: SweepClock,
{
    /// Create a display from a validated configuration
    pub fn new(writer: W, lines: L, clock: C, config: &DisplayConfig) -> Result<Self, ConfigError> {
        if let Err(e) = config.validate() {
            #[cfg(feature = "defmt")]
            defmt::warn!("rejecting display config: {}", e);
            return Err(e);
        }

        Ok(Self {
            buffer: BrightnessBuffer::with_scale(config.brightness_scale)?,
            engine: ScanEngine::new(writer, lines, clock, config),
            period_ms: config.sweep_period_ms,
        })
    }

    /// Set one LED channel from a normalized level in `[0, 1]`
    ///
    /// `channel` is 0 (red), 1 (green) or 2 (blue).
    pub fn set_brightness(
        &mut self,
        row: u8,
        column: u8,
        channel: u8,
        level: f32,
    ) -> Result<u16, InputError> {
        let channel = Channel::try_from(channel)?;
        self.buffer.set_brightness(row, column, channel, level)
    }

    /// Zero the whole buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Scan the current buffer out for `period_ms`
    pub fn refresh(&mut self, period_ms: u32) -> SweepReport {
        self.engine.sweep(&self.buffer, period_ms)
    }

    /// One animation frame: fill from `pattern`, sweep for the configured
    /// period, then clear the buffer
    pub fn frame<P: PatternSource>(&mut self, pattern: &mut P) -> Result<SweepReport, InputError> {
        pattern.fill(&mut self.buffer)?;
        let report = self.engine.sweep(&self.buffer, self.period_ms);
        self.buffer.clear();
        Ok(report)
    }

    /// Switch the driver chips' supply
    pub fn power(&mut self, on: bool) {
        self.engine.lines_mut().power_drivers(on);
    }

    /// Configured sweep period
    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// The brightness buffer
    pub fn buffer(&self) -> &BrightnessBuffer {
        &self.buffer
    }

    /// Mutable access to the brightness buffer
    pub fn buffer_mut(&mut self) -> &mut BrightnessBuffer {
        &mut self.buffer
    }

    /// The scan engine
    pub fn engine(&self) -> &ScanEngine<W, L, C> {
        &self.engine
    }

    /// Mutable access to the scan engine
    pub fn engine_mut(&mut self) -> &mut ScanEngine<W, L, C> {
        &mut self.engine
    }
}
