/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the Meridian driver library.

--*/

#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod reg;

pub mod memory_layout;
mod mpu;
pub mod printer;

pub use meridian_error::{MeridianError, MeridianResult};
pub use mpu::{CortexMpuPort, MemRegion, Mpu, MpuAttr, MpuBootConfig, MpuPort, RegionMap};

cfg_if::cfg_if! {
    if #[cfg(feature = "emu")] {
        mod uart;

        pub use uart::Uart;
    }
}
