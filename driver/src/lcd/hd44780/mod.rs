//! HD44780 character LCD module.
//!
//! See [driver::HD44780Driver] for the instruction set and [driver::I2cHD44780Driver] for the
//! driver that talks to the controller through a PCF8574-style I2C expander ("I2C backpack"),
//! as found on the common 16x2 "LCD1602" modules.

pub mod driver;
