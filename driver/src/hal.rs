//! Adapter for buses implementing the [embedded_hal] 1.0 blocking I2C trait.
use crate::I2cBus;
use embedded_hal::i2c::I2c;
use log::trace;
use std::fmt::{Debug, Formatter};
use std::time::Duration;

/// Wraps an [embedded_hal::i2c::I2c] bus so it can drive the displays in this crate.
///
/// `embedded-hal` buses take the 7-bit address and apply their own timeout policy, so the address
/// is shifted back and the timeout is ignored.
pub struct EmbeddedHalBus<I> {
    i2c: I,
}

impl<I: I2c> EmbeddedHalBus<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    /// Gives the wrapped bus back.
    pub fn into_inner(self) -> I {
        self.i2c
    }
}

impl<I> Debug for EmbeddedHalBus<I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "EmbeddedHalBus({})", std::any::type_name::<I>())
    }
}

impl<I: I2c> I2cBus for EmbeddedHalBus<I> {
    type Error = I::Error;

    fn transmit(&mut self, address: u8, bytes: &[u8], _timeout: Duration) -> Result<(), Self::Error> {
        trace!("I2C write to {:#04x}: {:02x?}", address >> 1, bytes);
        self.i2c.write(address >> 1, bytes)
    }
}
