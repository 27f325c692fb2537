/*++

Licensed under the Apache-2.0 license.

File Name:

    console_regs.rs

Abstract:

    File contains register definitions for the emulator console

--*/

use crate::reg::static_ref::StaticRef;
use tock_registers::register_structs;
use tock_registers::registers::WriteOnly;

register_structs! {
    /// Emulator Console Registers
    pub(crate) ConsoleRegisters {
        /// Transmit Register
        (0x000 => pub(crate) tx: WriteOnly<u32>),

        (0x004 => @END),
    }
}

pub(crate) const CONSOLE_REGS: StaticRef<ConsoleRegisters> =
    unsafe { StaticRef::new(0x4001_F000 as *const ConsoleRegisters) };
