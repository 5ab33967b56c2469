use crate::I2cBus;
use crate::lcd::hd44780::driver::{HD44780Driver, display_control_command};
use embedded_hal::delay::DelayNs;
use log::{debug, trace};
use std::fmt::{Debug, Formatter};
use std::time::Duration;

/// Default address of PCF8574-based backpacks with all address jumpers open.
pub const DEFAULT_ADDRESS: u8 = 0b0100111;

const TRANSMIT_TIMEOUT: Duration = Duration::from_millis(100);

// Expander pins: P0 = RS, P1 = R/W, P2 = E, P3 = backlight, P4..P7 = D4..D7
const REGISTER_SELECT: u8 = 0b00000001;
const ENABLE: u8 = 0b00000100;
const BACKLIGHT: u8 = 0b00001000;

const BLINK_ON: u8 = 0b00000001;
const CURSOR_ON: u8 = 0b00000010;

/// Display on, cursor off, blink off. Also the expander framing (backlight on, E high) used from
/// power-on onwards.
const INITIAL_STATE: u8 = 0b00001100;

const CLEAR_DELAY_MS: u32 = 2;
const SET_CURSOR_DELAY_MS: u32 = 10;
const PRINT_DELAY_MS: u32 = 2;
const CHAR_GAP_MS: u32 = 1;
const COMMAND_DELAY_MS: u32 = 1;

/// Driver for an HD44780 16x2 LCD behind a PCF8574-style I2C expander.
///
/// The expander only exposes the upper four data lines, so every byte goes out as two nibbles. Each
/// nibble takes two single-byte writes: one with E high, then the same byte with E low, the falling
/// edge being what makes the controller latch it.
///
/// All operations block: the delay source is used for the controller's execution times, and every
/// transfer blocks on the bus. Transport errors are returned as they are.
pub struct I2cHD44780Driver<B, D> {
    bus: B,
    delay: D,
    address: u8,
    settings: u8,
    config: u8,
}

impl<B: I2cBus, D: DelayNs> I2cHD44780Driver<B, D> {
    /// Creates the driver for a display at [DEFAULT_ADDRESS] and initializes it.
    ///
    /// Pass `&mut bus` to keep ownership of the bus.
    pub fn new(bus: B, delay: D) -> Result<Self, B::Error> {
        Self::with_address(bus, delay, DEFAULT_ADDRESS)
    }

    /// Creates the driver for a display at the given 7-bit address and initializes it.
    ///
    /// The address is not validated.
    pub fn with_address(bus: B, delay: D, address: u8) -> Result<Self, B::Error> {
        let mut driver = I2cHD44780Driver {
            bus,
            delay,
            address,
            settings: 0,
            config: INITIAL_STATE,
        };
        driver.init()?;
        Ok(driver)
    }

    /// Puts the controller into 4-bit mode, whatever mode it powered on in.
    ///
    /// Three "function set 8-bit" nibbles first resynchronize the controller, then the fourth one
    /// switches to the 4-bit bus and the rest go out as full bytes.
    fn init(&mut self) -> Result<(), B::Error> {
        debug!("Initializing display at {:#04x}", self.address);

        self.delay.delay_ms(15);
        self.send_nibble(0b0011, false)?;
        self.delay.delay_ms(5);
        self.send_nibble(0b0011, false)?;
        self.delay.delay_ms(1);
        self.send_nibble(0b0011, false)?;
        self.delay.delay_ms(1);
        self.send_nibble(0b0010, false)?;

        // 4-bit bus, 2 lines, 5x8 font
        self.send_byte(0b00101000, false)?;
        self.delay.delay_ms(COMMAND_DELAY_MS);
        self.send_byte(INITIAL_STATE, false)?;
        self.delay.delay_ms(COMMAND_DELAY_MS);
        self.send_byte(0b00000001, false)?;
        self.delay.delay_ms(CLEAR_DELAY_MS);
        // Increment, no shift
        self.send_byte(0b00000110, false)?;
        self.delay.delay_ms(COMMAND_DELAY_MS);

        self.settings = INITIAL_STATE;
        self.config = INITIAL_STATE;

        debug!("Display at {:#04x} initialized", self.address);
        Ok(())
    }

    /// Clears the display and returns the cursor home.
    ///
    /// Waits for the ~1.5 ms the controller needs before it accepts the next command.
    pub fn clear(&mut self) -> Result<(), B::Error> {
        self.clear_display()
    }

    /// Moves the cursor to DDRAM address `x + 0x40 * y`.
    ///
    /// Nothing is checked, and the address wraps at 8 bits. On a 16x2 display `x` is the column
    /// (0-15) and `y` the line (0-1).
    pub fn set_cursor(&mut self, x: u8, y: u8) -> Result<(), B::Error> {
        let address = x.wrapping_add(y.wrapping_mul(0x40));
        self.send_byte(0b10000000 | address, false)?;
        self.delay.delay_ms(SET_CURSOR_DELAY_MS);
        Ok(())
    }

    /// Prints a single character code at the cursor, which then advances.
    pub fn print(&mut self, data: u8) -> Result<(), B::Error> {
        self.send_byte(data, true)?;
        self.delay.delay_ms(PRINT_DELAY_MS);
        Ok(())
    }

    /// Prints the bytes of `text` up to the end or the first NUL.
    ///
    /// Bytes go out untranslated, so only ASCII maps to the same glyphs on the standard ROM. Nothing
    /// wraps lines: long strings run into the DDRAM area past the visible 16 columns.
    pub fn print_string(&mut self, text: &str) -> Result<(), B::Error> {
        for &byte in text.as_bytes().iter().take_while(|&&byte| byte != 0) {
            self.print(byte)?;
            self.delay.delay_ms(CHAR_GAP_MS);
        }
        Ok(())
    }

    /// Shows or hides the cursor, leaving blink and display-on as they are.
    pub fn display_cursor(&mut self, state: bool) -> Result<(), B::Error> {
        if state {
            self.settings |= CURSOR_ON;
        } else {
            self.settings &= !CURSOR_ON;
        }
        self.send_byte(self.settings, false)
    }

    /// Turns cursor blinking on or off, leaving the cursor and display-on as they are.
    pub fn display_blink(&mut self, state: bool) -> Result<(), B::Error> {
        if state {
            self.settings |= BLINK_ON;
        } else {
            self.settings &= !BLINK_ON;
        }
        self.send_byte(self.settings, false)
    }

    /// Turns the backlight on or off.
    ///
    /// The new state is written right away with E low, so the controller does not latch anything,
    /// and is kept for all later transfers.
    pub fn set_backlight(&mut self, on: bool) -> Result<(), B::Error> {
        if on {
            self.config |= BACKLIGHT;
        } else {
            self.config &= !BACKLIGHT;
        }
        debug!("Backlight {}", if on { "on" } else { "off" });
        self.transmit(self.config & !ENABLE)
    }

    /// Stores a custom 5x8 glyph in CGRAM slot `slot` (0-7); print it with `print(slot)`.
    ///
    /// Each row uses its low 5 bits, top row first. The address counter is left in CGRAM, so move
    /// the cursor with [Self::set_cursor] before printing again. The data writes need no waits: each
    /// one takes longer on the bus than the controller needs to store it.
    pub fn define_char(&mut self, slot: u8, pattern: [u8; 8]) -> Result<(), B::Error> {
        self.set_cgram_address((slot & 0b111) << 3)?;
        self.delay.delay_ms(COMMAND_DELAY_MS);
        for row in pattern {
            self.send_data(row & 0b00011111)?;
        }
        Ok(())
    }

    /// The 7-bit device address.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// The current display control byte.
    pub fn settings(&self) -> u8 {
        self.settings
    }

    /// The expander control bits merged into every transfer.
    pub fn config(&self) -> u8 {
        self.config
    }

    /// Gives the bus and delay back. The display keeps showing whatever it shows.
    pub fn release(self) -> (B, D) {
        (self.bus, self.delay)
    }

    fn transmit(&mut self, byte: u8) -> Result<(), B::Error> {
        self.bus.transmit(self.address << 1, &[byte], TRANSMIT_TIMEOUT)
    }

    fn send_nibble(&mut self, nibble: u8, is_data: bool) -> Result<(), B::Error> {
        let mut high = self.config | (nibble << 4);
        if is_data {
            high |= REGISTER_SELECT;
        }
        let low = high & !ENABLE;

        trace!("Writing nibble: {:04b}, RS: {} ({:08b}, {:08b})", nibble & 0x0F, is_data, high, low);
        self.transmit(high)?;
        self.transmit(low)
    }

    fn send_byte(&mut self, data: u8, is_data: bool) -> Result<(), B::Error> {
        trace!("Sending data: {:08b}, RS: {}", data, is_data);
        self.send_nibble(data >> 4, is_data)?;
        self.send_nibble(data & 0x0F, is_data)
    }
}

impl<B: I2cBus, D> Debug for I2cHD44780Driver<B, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I2cHD44780Driver")
            .field("bus", &self.bus)
            .field("address", &format_args!("{:#04x}", self.address))
            .field("settings", &format_args!("{:#010b}", self.settings))
            .field("config", &format_args!("{:#010b}", self.config))
            .finish()
    }
}

impl<B: I2cBus, D: DelayNs> HD44780Driver for I2cHD44780Driver<B, D> {
    type Error = B::Error;

    fn clear_display(&mut self) -> Result<(), Self::Error> {
        self.send_byte(0b00000001, false)?;
        self.delay.delay_ms(CLEAR_DELAY_MS);
        Ok(())
    }

    fn return_home(&mut self) -> Result<(), Self::Error> {
        self.send_byte(0b00000010, false)?;
        self.delay.delay_ms(CLEAR_DELAY_MS);
        Ok(())
    }

    fn set_display_control(
        &mut self,
        display_on: bool,
        cursor_on: bool,
        blink_on: bool,
    ) -> Result<(), Self::Error> {
        self.settings = display_control_command(display_on, cursor_on, blink_on);
        self.send_byte(self.settings, false)
    }

    fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
        self.send_byte(command, false)
    }

    fn send_data(&mut self, data: u8) -> Result<(), Self::Error> {
        self.send_byte(data, true)
    }
}
