use dotenv::dotenv;
use lcd1602_driver::hal::EmbeddedHalBus;
use lcd1602_driver::lcd::hd44780::driver::{DEFAULT_ADDRESS, I2cHD44780Driver};
use linux_embedded_hal::{Delay, I2cdev};
use log::{debug, info};
use std::env::var;
use std::num::ParseIntError;
use std::thread::sleep;
use std::time::Duration;
use sysinfo::System;
use thiserror::Error;
use time::OffsetDateTime;

const UNKNOWN_STR: &str = "???";

#[derive(Debug, Error, Eq, PartialEq, Clone)]
enum AddressError {
    #[error("invalid I2C address: {0}")]
    Parse(#[from] ParseIntError),
    #[error("I2C address {0:#04x} is not a 7-bit address")]
    OutOfRange(u8),
}

/// Parses a 7-bit address given either in decimal or with a `0x` prefix.
fn parse_address(address: &str) -> Result<u8, AddressError> {
    let address = address.trim();
    let address = match address.strip_prefix("0x").or_else(|| address.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16)?,
        None => address.parse()?,
    };
    if address > 0x7F {
        return Err(AddressError::OutOfRange(address));
    }
    Ok(address)
}

/// Pads or cuts `text` to exactly one 16-column line.
fn line(text: &str) -> String {
    format!("{:<16.16}", text)
}

fn main() -> eyre::Result<()> {
    dotenv().ok();
    pretty_env_logger::init();

    let host_name = System::host_name();
    info!(
        "Hello, {}!",
        host_name.as_deref().unwrap_or(UNKNOWN_STR)
    );
    info!(
        "System ver {} kernel ver {}",
        System::long_os_version().as_deref().unwrap_or(UNKNOWN_STR),
        System::kernel_version().as_deref().unwrap_or(UNKNOWN_STR),
    );

    let bus_path = var("LCD1602_I2C_BUS").unwrap_or_else(|_| "/dev/i2c-1".to_string());
    let address = match var("LCD1602_I2C_ADDRESS") {
        Ok(address) => parse_address(&address)?,
        Err(_) => DEFAULT_ADDRESS,
    };

    info!("LCD @ {} address {:#04x}", bus_path, address);

    debug!("Opening I2C adapter...");
    let mut bus = EmbeddedHalBus::new(I2cdev::new(&bus_path)?);
    debug!("{:?} opened.", bus);

    debug!("Initializing LCD driver...");
    let mut lcd = I2cHD44780Driver::with_address(&mut bus, Delay, address)?;
    debug!("{:?} initialized.", lcd);

    lcd.print_string(&line(host_name.as_deref().unwrap_or(UNKNOWN_STR)))?;

    lcd.set_cursor(0, 1)?;
    lcd.print_string("Cursor")?;
    lcd.display_cursor(true)?;
    sleep(Duration::from_secs(2));
    lcd.display_blink(true)?;
    sleep(Duration::from_secs(2));
    lcd.display_cursor(false)?;
    lcd.display_blink(false)?;

    info!("Starting clock...");

    loop {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let clock = format!("{:02}:{:02}:{:02}", now.hour(), now.minute(), now.second());

        lcd.set_cursor(0, 1)?;
        lcd.print_string(&line(&clock))?;

        sleep(Duration::from_secs(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_and_hex_addresses() {
        assert_eq!(parse_address("39").unwrap(), 0x27);
        assert_eq!(parse_address("0x3f").unwrap(), 0x3F);
        assert_eq!(parse_address(" 0X27 ").unwrap(), 0x27);
    }

    #[test]
    fn rejects_addresses_outside_7_bits() {
        assert_eq!(parse_address("0x80"), Err(AddressError::OutOfRange(0x80)));
        assert!(matches!(parse_address("256"), Err(AddressError::Parse(_))));
        assert!(matches!(parse_address("lcd"), Err(AddressError::Parse(_))));
    }

    #[test]
    fn linux_bus_and_delay_fit_the_driver() {
        fn drivable<B: lcd1602_driver::I2cBus, D: embedded_hal::delay::DelayNs>() {}
        drivable::<EmbeddedHalBus<I2cdev>, Delay>();
        drivable::<&mut EmbeddedHalBus<I2cdev>, Delay>();
    }

    #[test]
    fn lines_are_exactly_16_columns() {
        assert_eq!(line("12:00:00"), "12:00:00        ");
        assert_eq!(line("a-very-long-host-name"), "a-very-long-host");
    }
}
