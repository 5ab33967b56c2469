pub mod hal;
pub mod lcd;

use std::fmt::Debug;
use std::time::Duration;

/// A blocking I2C transport, as seen by the display drivers.
///
/// Addresses are passed in the shifted 8-bit form (`address << 1`, R/W bit cleared), which is what
/// the drivers compute before every transfer. Implementations that need the plain 7-bit address
/// shift it back.
pub trait I2cBus: Debug {
    type Error: Debug;

    /// Transmits `bytes` to the device at `address`, giving up after `timeout`.
    fn transmit(&mut self, address: u8, bytes: &[u8], timeout: Duration) -> Result<(), Self::Error>;
}

impl<T: I2cBus + ?Sized> I2cBus for &mut T {
    type Error = T::Error;

    fn transmit(&mut self, address: u8, bytes: &[u8], timeout: Duration) -> Result<(), Self::Error> {
        (**self).transmit(address, bytes, timeout)
    }
}
