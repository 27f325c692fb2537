/*++

Licensed under the Apache-2.0 license.

File Name:

    mod.rs

Abstract:

    File contains register definitions for the Meridian EC

--*/

pub(crate) mod static_ref;

pub(crate) mod mpu_regs;

cfg_if::cfg_if! {
    if #[cfg(feature = "emu")] {
        pub(crate) mod console_regs;
    }
}
