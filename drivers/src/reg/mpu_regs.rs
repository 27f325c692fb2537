/*++

Licensed under the Apache-2.0 license.

File Name:

    mpu_regs.rs

Abstract:

    File contains register definitions for the ARMv7-M Memory Protection
    Unit

--*/

use crate::reg::static_ref::StaticRef;
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    /// Memory Protection Unit Registers
    pub(crate) MpuRegisters {
        /// Type Register
        (0x000 => pub(crate) mpu_type: ReadOnly<u32, TYPE::Register>),

        /// Control Register
        (0x004 => pub(crate) ctrl: ReadWrite<u32, CTRL::Register>),

        /// Region Number Register
        (0x008 => pub(crate) rnr: ReadWrite<u32, RNR::Register>),

        /// Region Base Address Register
        (0x00C => pub(crate) rbar: ReadWrite<u32, RBAR::Register>),

        /// Region Attribute and Size Register
        (0x010 => pub(crate) rasr: ReadWrite<u32, RASR::Register>),

        (0x014 => @END),
    }
}

register_bitfields! [
    u32,

    /// Type Register Fields
    pub(crate) TYPE [
        /// Number of instruction regions; always zero for a unified map.
        IREGION OFFSET(16) NUMBITS(8) [],
        /// Number of data regions; zero when no MPU is implemented.
        DREGION OFFSET(8) NUMBITS(8) [],
        /// Unified (0) or separate (1) instruction and data maps.
        SEPARATE OFFSET(0) NUMBITS(1) [],
    ],

    /// Control Register Fields
    pub(crate) CTRL [
        /// Default memory map for privileged access to unmapped addresses
        PRIVDEFENA OFFSET(2) NUMBITS(1) [],
        /// Keep the MPU on during HardFault and NMI handlers
        HFNMIENA OFFSET(1) NUMBITS(1) [],
        /// Global enable
        ENABLE OFFSET(0) NUMBITS(1) [],
    ],

    /// Region Number Register Fields
    pub(crate) RNR [
        /// Region referenced by the RBAR and RASR registers
        REGION OFFSET(0) NUMBITS(8) [],
    ],

    /// Region Base Address Register Fields
    pub(crate) RBAR [
        /// Region base address bits [31:5]
        ADDR OFFSET(5) NUMBITS(27) [],
        /// Use the REGION field of this register instead of the RNR
        VALID OFFSET(4) NUMBITS(1) [],
        /// Region to program when VALID is set
        REGION OFFSET(0) NUMBITS(4) [],
    ],

    /// Region Attribute and Size Register Fields
    pub(crate) RASR [
        /// Attribute half-word: XN, access permissions, TEX/S/C/B
        ATTRS OFFSET(16) NUMBITS(16) [],
        /// Sub-region disable bits, one per eighth of the region
        SRD OFFSET(8) NUMBITS(8) [],
        /// Region size is 2^(SIZE + 1) bytes
        SIZE OFFSET(1) NUMBITS(5) [],
        /// Region enable
        ENABLE OFFSET(0) NUMBITS(1) [],
    ],
];

pub(crate) const MPU_REGS: StaticRef<MpuRegisters> =
    unsafe { StaticRef::new(0xE000_ED90 as *const MpuRegisters) };
