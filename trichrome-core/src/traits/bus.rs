//! Register write trait

/// Verified single-register writes to a driver chip
///
/// Implementations perform one complete bus transaction per call. A failed
/// call leaves the bus state unknown; the caller releases it with
/// [`recover`](Self::recover) and the next call starts over from a START
/// condition. Retrying is the caller's decision.
pub trait RegisterWriter {
    /// Error type for a failed transaction
    type Error: core::fmt::Debug;

    /// Write `value` into `register` of the chip at 7-bit `address`
    fn write_register(&mut self, address: u8, register: u8, value: u8) -> Result<(), Self::Error>;

    /// Return the bus to idle after a failed write
    ///
    /// The default does nothing, for writers without bus state.
    fn recover(&mut self) {}
}

impl<T: RegisterWriter + ?Sized> RegisterWriter for &mut T {
    type Error = T::Error;

    fn write_register(&mut self, address: u8, register: u8, value: u8) -> Result<(), Self::Error> {
        (**self).write_register(address, register, value)
    }

    fn recover(&mut self) {
        (**self).recover();
    }
}
