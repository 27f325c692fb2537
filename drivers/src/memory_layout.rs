/*++
Licensed under the Apache-2.0 license.

File Name:

    memory_layout.rs

Abstract:

    The file contains the layout of memory. The constants defined
    in this file define the memory layout of the reference platform.

--*/

//
// Memory Addresses
//

/// Fixed SRAM base. Aligned to every supported region size; also used as
/// the dummy base when slots are wiped at boot.
pub const SRAM_BASE: u32 = 0x2000_0000;

pub const DATA_RAM_BASE: u32 = SRAM_BASE;
pub const IRAM_TEXT_BASE: u32 = SRAM_BASE;
pub const UNCACHED_RAM_BASE: u32 = 0x2004_0000;
pub const CODE_RAM_BASE: u32 = 0x1000_0000;
pub const MAPPED_STORAGE_BASE: u32 = 0x0800_0000;

//
// Flash Partition Offsets
//

pub const RO_MEM_OFF: u32 = 0;
pub const ROLLBACK_OFF: u32 = 0x0004_0000;
pub const RW_MEM_OFF: u32 = 0x0006_0000;

//
// Memory Sizes In Bytes
//

pub const DATA_RAM_SIZE: u32 = 256 * 1024;
pub const IRAM_TEXT_SIZE: u32 = 2 * 1024;
pub const UNCACHED_RAM_SIZE: u32 = 32 * 1024;
pub const CODE_RAM_SIZE: u32 = 256 * 1024;
pub const RO_SIZE: u32 = 256 * 1024;
pub const ROLLBACK_SIZE: u32 = 128 * 1024;
pub const RW_SIZE: u32 = 640 * 1024;
pub const FLASH_SIZE: u32 = 1024 * 1024;

#[test]
#[allow(clippy::assertions_on_constants)]
fn mem_layout_test_flash_partitions() {
    assert_eq!(RO_MEM_OFF + RO_SIZE, ROLLBACK_OFF);
    assert_eq!(ROLLBACK_OFF + ROLLBACK_SIZE, RW_MEM_OFF);
    assert_eq!(RW_MEM_OFF + RW_SIZE, FLASH_SIZE);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn mem_layout_test_uncached_window() {
    assert_eq!(DATA_RAM_BASE + DATA_RAM_SIZE, UNCACHED_RAM_BASE);
    assert_eq!(UNCACHED_RAM_BASE % UNCACHED_RAM_SIZE, 0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn mem_layout_test_iram_text() {
    assert!(IRAM_TEXT_BASE >= DATA_RAM_BASE);
    assert!(IRAM_TEXT_BASE + IRAM_TEXT_SIZE <= DATA_RAM_BASE + DATA_RAM_SIZE);
    assert_eq!(IRAM_TEXT_BASE % IRAM_TEXT_SIZE, 0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn mem_layout_test_rollback_window() {
    // The rollback window and both of its halves must stay size-aligned so
    // either lock strategy can cover them.
    let base = MAPPED_STORAGE_BASE + ROLLBACK_OFF;
    assert_eq!(base % ROLLBACK_SIZE, 0);
    assert_eq!(base % (ROLLBACK_SIZE / 2), 0);
    assert_eq!((base + ROLLBACK_SIZE / 2) % (ROLLBACK_SIZE / 2), 0);
}
