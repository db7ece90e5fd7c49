//! Pattern sources
//!
//! A pattern source fills the brightness buffer between sweeps. The only
//! built-in source is [`RandomPattern`], which assigns every channel of every
//! LED an independent random level.

use rand_core::RngCore;

use crate::buffer::{BrightnessBuffer, Channel};
use crate::error::InputError;
use crate::layout::LED_COUNT;

/// Something that can paint a whole frame into a buffer
pub trait PatternSource {
    /// Write the next frame into `buffer`
    fn fill(&mut self, buffer: &mut BrightnessBuffer) -> Result<(), InputError>;
}

/// Random levels from any [`RngCore`]
pub struct RandomPattern<R> {
    rng: R,
}

impl<R: RngCore> RandomPattern<R> {
    /// Create a pattern source drawing from `rng`
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Next level in `[0, 1)`, from a 16-bit sample
    pub fn next_level(&mut self) -> f32 {
        let sample = self.rng.next_u32() as u16;
        sample as f32 / 65536.0
    }

    /// Give back the generator
    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl<R: RngCore> PatternSource for RandomPattern<R> {
    fn fill(&mut self, buffer: &mut BrightnessBuffer) -> Result<(), InputError> {
        for channel in Channel::ALL {
            for led in 0..LED_COUNT as u8 {
                let level = self.next_level();
                buffer.set_led(led, channel, level)?;
            }
        }
        Ok(())
    }
}
