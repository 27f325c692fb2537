/*++

Licensed under the Apache-2.0 license.

File Name:

    mpu.rs

Abstract:

    Driver for the ARMv7-M Memory Protection Unit. Contains the region
    encoder, the boot sequencer and the named protection policies used by
    the firmware.

--*/

use bitfield::bitfield;

use crate::cprintln;
use crate::memory_layout;
use crate::reg::mpu_regs::{MpuRegisters, CTRL, MPU_REGS, RASR, RBAR, TYPE};
use crate::reg::static_ref::StaticRef;
use meridian_error::{MeridianError, MeridianResult};
use tock_registers::interfaces::{Readable, Writeable};

/// Smallest region the hardware supports is 2^5 = 32 bytes.
const MPU_SIZE_BITS_MIN: u8 = 5;

bitfield! {
    /// Region attribute half-word, the upper 16 bits of the RASR program
    /// word (XN, access permissions and TEX/S/C/B memory type).
    #[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
    pub struct MpuAttr(u16);

    /// Bufferable
    pub bufferable, set_bufferable: 0;

    /// Cacheable
    pub cacheable, set_cacheable: 1;

    /// Shareable
    pub shareable, set_shareable: 2;

    /// Type extension field
    pub u16, tex, set_tex: 5, 3;

    /// Access permission field (privileged / unprivileged class)
    pub u16, ap, set_ap: 10, 8;

    /// Instruction fetches from the region fault
    pub execute_never, set_execute_never: 12;
}

impl MpuAttr {
    /// Execute never.
    pub const XN: MpuAttr = MpuAttr(1 << 12);

    /// No access, privileged or unprivileged.
    pub const NO_NO: MpuAttr = MpuAttr(0b000 << 8);

    /// Privileged read-write, unprivileged no access.
    pub const RW_NO: MpuAttr = MpuAttr(0b001 << 8);

    /// Read-write at both privilege levels.
    pub const RW_RW: MpuAttr = MpuAttr(0b011 << 8);

    /// Privileged read-only, unprivileged no access.
    pub const RO_NO: MpuAttr = MpuAttr(0b101 << 8);

    /// Read-only at both privilege levels.
    pub const RO_RO: MpuAttr = MpuAttr(0b110 << 8);

    /// Normal memory, shareable, write-back cacheable (internal SRAM).
    pub const INTERNAL_SRAM: MpuAttr = MpuAttr(0b110);

    /// Normal memory, write-through cacheable (memory-mapped flash).
    pub const FLASH_MEMORY: MpuAttr = MpuAttr(0b010);
}

impl core::ops::BitOr for MpuAttr {
    type Output = MpuAttr;

    fn bitor(self, rhs: MpuAttr) -> MpuAttr {
        MpuAttr(self.0 | rhs.0)
    }
}

/// A named logical memory window supplied by the platform layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemRegion {
    pub base: u32,
    pub size: u32,
}

impl MemRegion {
    pub const fn new(base: u32, size: u32) -> Self {
        Self { base, size }
    }
}

/// Hardware slot assignment for the firmware's logical protection regions.
///
/// On overlap the higher-numbered slot wins, so the executable data-RAM
/// text exemption must sit above the blanket data-RAM slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionMap {
    pub data_ram: u8,
    pub data_ram_text: u8,
    pub storage: u8,
    pub storage2: u8,
    pub chip_reserved: u8,
    pub uncached_ram: u8,
    pub rollback: u8,
}

impl RegionMap {
    /// Reference assignment used by the Cortex-M parts.
    ///
    /// `rollback` is only reachable on 16-region implementations; parts
    /// with 8 regions fall back to `chip_reserved` and `storage2`.
    pub const fn cortex_m_default() -> Self {
        Self {
            data_ram: 0,
            data_ram_text: 1,
            storage: 2,
            storage2: 3,
            chip_reserved: 5,
            uncached_ram: 6,
            rollback: 8,
        }
    }
}

impl Default for RegionMap {
    fn default() -> Self {
        Self::cortex_m_default()
    }
}

/// Boot-time policy selection for `Mpu::pre_init`.
#[derive(Debug, Clone, Copy)]
pub struct MpuBootConfig {
    pub map: RegionMap,

    /// Rollback window to lock at boot, if rollback protection applies to
    /// this platform.
    pub rollback: Option<MemRegion>,

    /// True when the data/instruction caches are turned on after boot.
    pub cache_enable: bool,

    /// Window that must stay uncached for DMA while the caches are on.
    pub uncached: Option<MemRegion>,

    /// External hook that turns the caches on.
    pub enable_caches: Option<fn()>,
}

/// Access port to the MPU register file.
///
/// Every hardware access goes through this trait so the region writer can
/// be exercised on a non-target host against a recording fake.
pub trait MpuPort {
    fn mpu_type(&self) -> u32;
    fn read_ctrl(&self) -> u32;
    fn write_ctrl(&mut self, val: u32);
    fn select_region(&mut self, region: u32);
    fn read_rasr(&self) -> u32;
    fn write_rasr(&mut self, val: u32);
    fn write_rbar(&mut self, val: u32);

    /// Instruction and data synchronization barriers bracketing a region
    /// update, per the hardware documentation.
    fn sync(&mut self);
}

/// Port backed by the memory-mapped register file at 0xE000_ED90.
pub struct CortexMpuPort {
    regs: StaticRef<MpuRegisters>,
}

impl CortexMpuPort {
    /// # Safety
    ///
    /// No other instance may access the MPU register file while this one
    /// is alive.
    pub unsafe fn new() -> Self {
        Self { regs: MPU_REGS }
    }
}

impl MpuPort for CortexMpuPort {
    fn mpu_type(&self) -> u32 {
        self.regs.mpu_type.get()
    }

    fn read_ctrl(&self) -> u32 {
        self.regs.ctrl.get()
    }

    fn write_ctrl(&mut self, val: u32) {
        self.regs.ctrl.set(val)
    }

    fn select_region(&mut self, region: u32) {
        self.regs.rnr.set(region)
    }

    fn read_rasr(&self) -> u32 {
        self.regs.rasr.get()
    }

    fn write_rasr(&mut self, val: u32) {
        self.regs.rasr.set(val)
    }

    fn write_rbar(&mut self, val: u32) {
        self.regs.rbar.set(val)
    }

    fn sync(&mut self) {
        #[cfg(target_arch = "arm")]
        unsafe {
            core::arch::asm!("isb", "dsb");
        }
    }
}

/// ARMv7-M Memory Protection Unit driver.
pub struct Mpu<P: MpuPort> {
    port: P,
}

impl<P: MpuPort> Mpu<P> {
    pub fn new(port: P) -> Self {
        Self { port }
    }

    /// Raw MPU type descriptor word.
    pub fn mpu_type_raw(&self) -> u32 {
        self.port.mpu_type()
    }

    /// Number of regions supported by the MPU. Zero means the processor
    /// does not implement an MPU.
    pub fn num_regions(&self) -> u32 {
        TYPE::DREGION.read(self.port.mpu_type())
    }

    /// Retrieve whether the processor has an MPU
    pub fn has_mpu(&self) -> bool {
        self.num_regions() != 0
    }

    /// Retrieve whether the MPU has unified instruction and data maps
    pub fn is_unified(&self) -> bool {
        !TYPE::SEPARATE.is_set(self.port.mpu_type())
    }

    /// Turn the unit on: protection enabled, kept on during HardFault and
    /// NMI handlers, default memory map for privileged access elsewhere.
    pub fn enable(&mut self) {
        let ctrl = self.port.read_ctrl();
        self.port
            .write_ctrl((CTRL::PRIVDEFENA::SET + CTRL::HFNMIENA::SET + CTRL::ENABLE::SET).modify(ctrl));
    }

    /// Turn the unit off.
    pub fn disable(&mut self) {
        let ctrl = self.port.read_ctrl();
        self.port.write_ctrl(
            (CTRL::PRIVDEFENA::CLEAR + CTRL::HFNMIENA::CLEAR + CTRL::ENABLE::CLEAR).modify(ctrl),
        );
    }

    /// Program one hardware region slot.
    ///
    /// # Arguments
    ///
    /// * `region` - Slot index to program
    /// * `addr` - Region base address, aligned to the region size
    /// * `size_bit` - Region size in power of two
    /// * `attr` - Attribute half-word; overwritten only when enabling
    /// * `enable` - Enables the slot; otherwise only disables it
    /// * `srd` - Sub-region disable mask (bit set = that eighth excluded)
    pub fn update_region(
        &mut self,
        region: u8,
        addr: u32,
        size_bit: u8,
        attr: MpuAttr,
        enable: bool,
        srd: u8,
    ) -> MeridianResult<()> {
        if u32::from(region) >= self.num_regions() {
            return Err(MeridianError::DRIVER_MPU_INVALID_SLOT);
        }

        if !(MPU_SIZE_BITS_MIN..=32).contains(&size_bit) {
            return Err(MeridianError::DRIVER_MPU_INVALID_SIZE);
        }

        // The base address must be aligned to the region size, even for a
        // slot that is only being disabled.
        let align_mask = ((1u64 << size_bit) - 1) as u32;
        if addr & align_mask != 0 {
            return Err(MeridianError::DRIVER_MPU_INVALID_SIZE);
        }

        self.port.sync();

        self.port.select_region(region.into());

        // Always drop the enable bit first so the slot is never live with
        // a half-written base/size pair.
        let rasr = self.port.read_rasr();
        self.port.write_rasr(RASR::ENABLE::CLEAR.modify(rasr));

        if enable {
            self.port.write_rbar(RBAR::ADDR.val(addr >> 5).value);

            // The two half-word RASR accesses the documentation allows are
            // unreliable on at least one chip family; issue one full-word
            // write.
            let program = RASR::ATTRS.val(attr.0 as u32)
                + RASR::SRD.val(srd as u32)
                + RASR::SIZE.val(u32::from(size_bit) - 1)
                + RASR::ENABLE::SET;
            self.port.write_rasr(program.value);
        }

        self.port.sync();

        Ok(())
    }

    /// Configure a protection window.
    ///
    /// Covers `size` bytes at `addr` with one power-of-two region, or with
    /// two adjacent regions plus sub-region masks when the window is not a
    /// power of two.
    ///
    /// # Arguments
    ///
    /// * `region` - First slot index for the window
    /// * `addr` - Window base address
    /// * `size` - Window size in bytes
    /// * `attr` - Attribute half-word; overwritten only when enabling
    /// * `enable` - Enables the covered slot(s); otherwise disables them
    pub fn config_region(
        &mut self,
        region: u8,
        addr: u32,
        size: u32,
        attr: MpuAttr,
        enable: bool,
    ) -> MeridianResult<()> {
        self.config_region_inner(region, addr, size, attr, enable, true)
    }

    fn config_region_inner(
        &mut self,
        region: u8,
        addr: u32,
        size: u32,
        attr: MpuAttr,
        enable: bool,
        allow_second_slot: bool,
    ) -> MeridianResult<()> {
        // Nothing to protect.
        if size == 0 {
            return Ok(());
        }

        // Bit position of the most significant '1' in size.
        let size_bit = (31 - size.leading_zeros()) as u8;
        if size_bit < MPU_SIZE_BITS_MIN {
            return Err(MeridianError::DRIVER_MPU_INVALID_SIZE);
        }

        // An exact power of two fits a single region with every sub-region
        // enabled.
        if size.is_power_of_two() {
            return self.update_region(region, addr, size_bit, attr, enable, 0);
        }

        // Sub-regions are not supported below 128-byte windows.
        if size_bit < 7 {
            return Err(MeridianError::DRIVER_MPU_INVALID_SIZE);
        }

        // The window must be a whole number of 2^(size_bit-5) units and fit
        // in six bits at that granularity to be coverable by two regions.
        if size & !(0x3f_u32 << (size_bit - 5)) != 0 {
            return Err(MeridianError::DRIVER_MPU_INVALID_SIZE);
        }

        // Number of fully occupied eighths of the first region, whose size
        // is the window size rounded up to the next power of two.
        let blocks = size >> (size_bit - 2);
        let srd1 = ((1u32 << blocks) - 1) as u8;

        // Leftover 2^(size_bit-5) units past those eighths, covered by a
        // second region one eighth the first region in size.
        let rem = (size >> (size_bit - 5)) & 0x7;
        let srd2 = ((1u32 << rem) - 1) as u8;

        // A remainder region divides into sub-regions of 2^(size_bit-5)
        // bytes; the hardware needs those to be at least 32 bytes. Some
        // windows must also fit a single slot.
        if srd2 != 0 && (!allow_second_slot || size_bit < 10) {
            return Err(MeridianError::DRIVER_MPU_INVALID_SIZE);
        }

        self.update_region(region, addr, size_bit + 1, attr, enable, !srd1)?;

        if srd2 != 0 {
            // The second region begins at the first eighth the first region
            // leaves unoccupied.
            let addr2 = addr + blocks * (1u32 << (size_bit - 2));
            self.update_region(region + 1, addr2, size_bit - 2, attr, enable, !srd2)?;
        }

        Ok(())
    }

    /// Set a region executable and read-write.
    ///
    /// Only used for exemption windows, which must stay inside one slot.
    fn unlock_region(
        &mut self,
        region: u8,
        addr: u32,
        size: u32,
        texscb: MpuAttr,
    ) -> MeridianResult<()> {
        self.config_region_inner(region, addr, size, MpuAttr::RW_RW | texscb, true, false)
    }

    /// Prevent code execution from data RAM, carving out the privileged
    /// text fragment that must stay executable.
    ///
    /// # Arguments
    ///
    /// * `map` - Slot assignment
    /// * `ram` - The whole data RAM window
    /// * `text` - The executable fragment inside it
    pub fn protect_data_ram(
        &mut self,
        map: &RegionMap,
        ram: MemRegion,
        text: MemRegion,
    ) -> MeridianResult<()> {
        // The exemption only wins over the blanket region from a higher
        // slot index.
        if map.data_ram_text <= map.data_ram {
            return Err(MeridianError::DRIVER_MPU_INVALID_SLOT);
        }

        self.config_region(
            map.data_ram,
            ram.base,
            ram.size,
            MpuAttr::XN | MpuAttr::RW_RW | MpuAttr::INTERNAL_SRAM,
            true,
        )?;

        self.unlock_region(map.data_ram_text, text.base, text.size, MpuAttr::INTERNAL_SRAM)
    }

    /// Prevent write access to code RAM.
    pub fn protect_code_ram(&mut self, map: &RegionMap, code: MemRegion) -> MeridianResult<()> {
        self.config_region(
            map.storage,
            code.base,
            code.size,
            MpuAttr::RO_NO | MpuAttr::INTERNAL_SRAM,
            true,
        )
    }

    /// Prevent execution from the internally mapped read-only flash image.
    pub fn lock_ro_flash(&mut self, map: &RegionMap, ro: MemRegion) -> MeridianResult<()> {
        self.config_region(
            map.storage,
            ro.base,
            ro.size,
            MpuAttr::XN | MpuAttr::RW_RW | MpuAttr::FLASH_MEMORY,
            true,
        )
    }

    /// Prevent execution from the internally mapped read-write flash image.
    ///
    /// The image start is not a compile-time constant on this family, and
    /// a region base must be aligned to the region size, so the lowest set
    /// bit of the start address bounds the first region; any remainder
    /// goes into a second adjacent region. A window two regions cannot
    /// cover is a platform layout defect and propagates `InvalidSize` from
    /// the second region.
    pub fn lock_rw_flash(&mut self, map: &RegionMap, rw: MemRegion) -> MeridianResult<()> {
        let attr = MpuAttr::XN | MpuAttr::RW_RW | MpuAttr::FLASH_MEMORY;

        let aligned_size = 1u32 << rw.base.trailing_zeros().min(31);
        let first_size = aligned_size.min(rw.size);

        self.config_region(map.storage, rw.base, first_size, attr, true)?;

        let second_size = rw.size - first_size;
        if second_size == 0 {
            return Ok(());
        }

        self.config_region(map.storage2, rw.base + first_size, second_size, attr, true)
    }

    /// Lock or unlock the rollback-counter window.
    ///
    /// Idempotent in both directions. May be called after boot; the caller
    /// serializes against any other MPU writer.
    ///
    /// # Arguments
    ///
    /// * `map` - Slot assignment
    /// * `window` - The rollback storage window
    /// * `lock` - Desired lock state
    pub fn lock_rollback(
        &mut self,
        map: &RegionMap,
        window: MemRegion,
        lock: bool,
    ) -> MeridianResult<()> {
        let attr = MpuAttr::XN | MpuAttr::NO_NO;

        // Parts with 16 regions have the window aligned so a single region
        // at the preferred slot covers it.
        if u32::from(map.rollback) < self.num_regions() {
            return self.config_region(map.rollback, window.base, window.size, attr, lock);
        }

        // Not enough regions for the preferred slot. On these parts the
        // window base is not aligned to the full window size, so cover it
        // as two halves in reserved slots.
        let half = window.size / 2;
        self.config_region(map.chip_reserved, window.base, half, attr, lock)?;
        self.config_region(map.storage2, window.base + half, half, attr, lock)
    }

    /// One-time boot initialization of the MPU.
    ///
    /// Wipes every slot to a disabled state, applies the mandatory boot
    /// policies and turns the unit on. Any failure leaves the unit
    /// disabled and must be treated as fatal by the boot flow.
    pub fn pre_init(&mut self, config: &MpuBootConfig) -> MeridianResult<()> {
        if !self.has_mpu() {
            return Err(MeridianError::DRIVER_MPU_HARDWARE_ABSENT);
        }

        // Split instruction/data maps and other region counts are not
        // implemented.
        let num_regions = self.num_regions();
        if !self.is_unified() || (num_regions != 8 && num_regions != 16) {
            return Err(MeridianError::DRIVER_MPU_UNSUPPORTED);
        }

        self.disable();

        for region in 0..num_regions {
            // Disable every slot. The smallest size is used and the base
            // value does not matter for a disabled slot, but it must still
            // satisfy the writer's alignment precondition, so the fixed
            // SRAM base serves for all of them.
            self.update_region(
                region as u8,
                memory_layout::SRAM_BASE,
                MPU_SIZE_BITS_MIN,
                MpuAttr(0),
                false,
                0,
            )?;
        }

        if let Some(rollback) = config.rollback {
            self.lock_rollback(&config.map, rollback, true)?;
        }

        if config.cache_enable {
            if let Some(uncached) = config.uncached {
                self.config_region(
                    config.map.uncached_ram,
                    uncached.base,
                    uncached.size,
                    MpuAttr::XN | MpuAttr::RW_RW,
                    true,
                )?;
            }
        }

        self.enable();

        if config.cache_enable {
            if let Some(enable_caches) = config.enable_caches {
                enable_caches();
            }
        }

        cprintln!("[mpu] protection enabled ({} regions)", num_regions);

        Ok(())
    }
}
