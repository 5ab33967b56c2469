mod i2c;

pub use i2c::*;
use std::fmt::Debug;

/// The HD44780 instruction set, expressed over two raw write primitives.
///
/// Implementations only provide [Self::send_command] and [Self::send_data]; every other command is
/// composed here. Read commands (busy flag, address counter) are not part of the trait, as the
/// common I2C expander wiring keeps the R/W line tied to write. Neither is function set: the bus
/// width and line count are fixed during initialization.
///
/// Clear and return home take ~1.5 ms to execute. Implementations that do not wait after each
/// command have to override them.
pub trait HD44780Driver: Debug {
    type Error;

    /// Clears the display and sets the cursor to the home position.
    fn clear_display(&mut self) -> Result<(), Self::Error> {
        self.send_command(0b00000001)
    }

    /// Sets the cursor to the home position.
    fn return_home(&mut self) -> Result<(), Self::Error> {
        self.send_command(0b00000010)
    }

    /// Sets the display to the specified entry mode.
    fn set_entry_mode(
        &mut self,
        cursor_direction: CursorDirection,
        shift: bool,
    ) -> Result<(), Self::Error> {
        let mut command = 0b00000100;
        if cursor_direction == CursorDirection::Right {
            command |= 0b00000010;
        }
        if shift {
            command |= 0b00000001;
        }
        self.send_command(command)
    }

    /// Sets the display on/off, cursor on/off, and blinking on/off.
    fn set_display_control(
        &mut self,
        display_on: bool,
        cursor_on: bool,
        blink_on: bool,
    ) -> Result<(), Self::Error> {
        self.send_command(display_control_command(display_on, cursor_on, blink_on))
    }

    /// Moves the cursor or shifts the display.
    fn cursor_shift(
        &mut self,
        display_shift: bool,
        direction: CursorDirection,
    ) -> Result<(), Self::Error> {
        let mut command = 0b00010000;
        if display_shift {
            command |= 0b00001000;
        }
        if direction == CursorDirection::Right {
            command |= 0b00000100;
        }
        self.send_command(command)
    }

    /// Sets the CGRAM address. Only the low 6 bits are used.
    fn set_cgram_address(&mut self, address: u8) -> Result<(), Self::Error> {
        self.send_command(0b01000000 | (address & 0b00111111))
    }

    /// Sets the DDRAM address. Only the low 7 bits are used.
    fn set_ddram_address(&mut self, address: u8) -> Result<(), Self::Error> {
        self.send_command(0b10000000 | (address & 0b01111111))
    }

    /// Sends a command to the HD44780 controller (RS = 0).
    fn send_command(&mut self, command: u8) -> Result<(), Self::Error>;

    /// Sends data to the HD44780 controller (RS = 1).
    fn send_data(&mut self, data: u8) -> Result<(), Self::Error>;
}

pub(crate) fn display_control_command(display_on: bool, cursor_on: bool, blink_on: bool) -> u8 {
    let mut command = 0b00001000;
    if display_on {
        command |= 0b00000100;
    }
    if cursor_on {
        command |= 0b00000010;
    }
    if blink_on {
        command |= 0b00000001;
    }
    command
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CursorDirection {
    /// Moves the cursor to the left after writing data.
    Left,
    /// Moves the cursor to the right after writing data.
    Right,
}
