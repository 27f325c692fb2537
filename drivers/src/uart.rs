/*++

Licensed under the Apache-2.0 license.

File Name:

    uart.rs

Abstract:

    File contains API for the emulator console UART

--*/

use core::fmt;

use crate::reg::console_regs::CONSOLE_REGS;
use tock_registers::interfaces::Writeable;

/// Emulator console UART
#[derive(Default, Debug)]
pub struct Uart {}

impl Uart {
    /// Create an instance of the console UART
    pub fn new() -> Self {
        Self {}
    }

    /// Write the string to the console
    ///
    /// # Arguments
    ///
    /// `str` - String to write to the console
    pub fn write(&mut self, str: &str) {
        for byte in str.bytes() {
            match byte {
                0x20..=0x7e | b'\n' | b'\t' => self.write_byte(byte),
                _ => self.write_byte(0xfe),
            }
        }
    }

    /// Write the byte to the console
    ///
    /// # Arguments
    ///
    /// `byte` - Byte to write to the console
    pub fn write_byte(&mut self, byte: u8) {
        CONSOLE_REGS.tx.set(byte as u32);
    }
}

impl fmt::Write for Uart {
    /// Writes a [`str`] into this writer, returning whether the write succeeded.
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s);
        Ok(())
    }
}
