//! flashblk-dummy - In-memory flash chip emulator
//!
//! This crate provides an emulated flash chip backed by memory. It is
//! useful for testing the registration and partition layers without real
//! hardware: writes can only clear bits, erases fill blocks with `0xFF`,
//! and a bad-block table is maintained per erase block.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
use alloc::boxed::Box;
#[cfg(feature = "alloc")]
use alloc::vec;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

#[cfg(feature = "alloc")]
use flashblk_core::chip::{ChipInfo, FlashChip};
use flashblk_core::chip::{
    ChipGeometry, EraseOptions, FlashOps, FlashType, OobMode, OobOptions, OobTransfer,
};
use flashblk_core::error::{Error, Result};

/// Configuration for the emulated chip
#[derive(Debug, Clone)]
pub struct EmulatedConfig {
    /// Flash technology
    pub flash_type: FlashType,
    /// Total chip size in bytes
    pub chip_size: u32,
    /// Erase block size in bytes
    pub erase_size: u32,
    /// Write page size in bytes
    pub write_size: u32,
    /// Out-of-band bytes per page (0 for none)
    pub oob_size: u32,
    /// Out-of-band addressing mode
    pub oob_mode: OobMode,
}

impl Default for EmulatedConfig {
    fn default() -> Self {
        // 16 MiB NOR, 4 KiB sectors
        Self {
            flash_type: FlashType::Nor,
            chip_size: 16 * 1024 * 1024,
            erase_size: 4096,
            write_size: 256,
            oob_size: 0,
            oob_mode: OobMode::Auto,
        }
    }
}

impl EmulatedConfig {
    /// A small NAND chip: 1 MiB, 4 KiB blocks, 512-byte pages, 16 OOB bytes
    pub fn nand_small() -> Self {
        Self {
            flash_type: FlashType::Nand,
            chip_size: 1024 * 1024,
            erase_size: 4096,
            write_size: 512,
            oob_size: 16,
            oob_mode: OobMode::Auto,
        }
    }
}

/// Emulated flash chip
///
/// Implements [`FlashOps`] over in-memory arrays. Reads and writes have
/// partial-length semantics at the chip end; writes AND into the array
/// (flash can only clear bits); erase requires block alignment and fails
/// on bad blocks unless the request scrubs.
#[cfg(feature = "alloc")]
pub struct EmulatedFlash {
    geometry: ChipGeometry,
    data: Vec<u8>,
    oob: Vec<u8>,
    bad: Vec<bool>,
}

#[cfg(feature = "alloc")]
impl EmulatedFlash {
    /// Create an erased chip from a configuration
    pub fn new(config: EmulatedConfig) -> Result<Self> {
        let geometry = ChipGeometry::new(
            config.flash_type,
            config.chip_size,
            config.erase_size,
            config.write_size,
        )?
        .with_oob(config.oob_size, config.oob_mode);

        let pages = geometry.chip_size >> geometry.write_shift;
        Ok(Self {
            data: vec![0xFF; geometry.chip_size as usize],
            oob: vec![0xFF; (pages * geometry.oob_size) as usize],
            bad: vec![false; geometry.block_count() as usize],
            geometry,
        })
    }

    /// Create an erased chip with the default configuration
    pub fn new_default() -> Self {
        // the default configuration is statically valid
        match Self::new(EmulatedConfig::default()) {
            Ok(flash) => flash,
            Err(_) => unreachable!(),
        }
    }

    /// Create a chip pre-filled with data
    pub fn with_data(config: EmulatedConfig, initial_data: &[u8]) -> Result<Self> {
        let mut flash = Self::new(config)?;
        let len = initial_data.len().min(flash.data.len());
        flash.data[..len].copy_from_slice(&initial_data[..len]);
        Ok(flash)
    }

    /// Chip geometry
    pub fn geometry(&self) -> &ChipGeometry {
        &self.geometry
    }

    /// Backing array
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable backing array
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Pre-mark an erase block bad, as a factory marker would
    pub fn seed_bad_block(&mut self, block: usize) {
        self.bad[block] = true;
    }

    /// Wrap the emulator in a [`FlashChip`] ready for registration
    pub fn into_chip(self, name: &str) -> Result<FlashChip> {
        let info = ChipInfo::new(name, self.geometry)?;
        FlashChip::new(info, Box::new(self))
    }

    fn block_index(&self, offset: u32) -> usize {
        (offset >> self.geometry.erase_shift) as usize
    }

    fn page_index(&self, offset: u32) -> usize {
        (offset >> self.geometry.write_shift) as usize
    }
}

#[cfg(feature = "alloc")]
impl FlashOps for EmulatedFlash {
    fn read(&mut self, from: u32, buf: &mut [u8]) -> Result<usize> {
        if from >= self.geometry.chip_size {
            return Err(Error::AddressOutOfBounds);
        }
        let from = from as usize;
        let len = buf.len().min(self.data.len() - from);
        buf[..len].copy_from_slice(&self.data[from..from + len]);
        Ok(len)
    }

    fn write(&mut self, to: u32, buf: &[u8]) -> Result<usize> {
        if to >= self.geometry.chip_size {
            return Err(Error::AddressOutOfBounds);
        }
        let to = to as usize;
        let len = buf.len().min(self.data.len() - to);
        for (cell, byte) in self.data[to..to + len].iter_mut().zip(buf) {
            *cell &= byte;
        }
        Ok(len)
    }

    fn erase(&mut self, opt: &EraseOptions) -> Result<()> {
        if !self.geometry.is_erase_aligned(opt.start) || !self.geometry.is_erase_aligned(opt.len) {
            return Err(Error::InvalidAlignment);
        }
        if !self.geometry.contains(opt.start, opt.len as usize) {
            return Err(Error::AddressOutOfBounds);
        }

        let mut offset = opt.start;
        while offset < opt.start + opt.len {
            let block = self.block_index(offset);
            if self.bad[block] {
                if !opt.scrub {
                    log::warn!("erase skipped bad block at 0x{:08x}", offset);
                    return Err(Error::BadBlock);
                }
                // scrubbing erases the marker along with the block
                self.bad[block] = false;
            }
            let start = offset as usize;
            let end = start + self.geometry.erase_size as usize;
            self.data[start..end].fill(0xFF);
            offset += self.geometry.erase_size;
        }
        Ok(())
    }

    fn read_oob(
        &mut self,
        from: u32,
        opt: &OobOptions,
        data: &mut [u8],
        oob: &mut [u8],
    ) -> Result<OobTransfer> {
        if self.geometry.oob_size == 0 {
            return Err(Error::OobNotSupported);
        }
        if from >= self.geometry.chip_size || opt.oob_offset >= self.geometry.oob_size {
            return Err(Error::AddressOutOfBounds);
        }

        let data_len = self.read(from, data)?;

        let oob_start = self.page_index(from) * self.geometry.oob_size as usize
            + opt.oob_offset as usize;
        let oob_len = oob
            .len()
            .min((self.geometry.oob_size - opt.oob_offset) as usize);
        oob[..oob_len].copy_from_slice(&self.oob[oob_start..oob_start + oob_len]);

        Ok(OobTransfer { data_len, oob_len })
    }

    fn write_oob(
        &mut self,
        to: u32,
        opt: &OobOptions,
        data: &[u8],
        oob: &[u8],
    ) -> Result<OobTransfer> {
        if self.geometry.oob_size == 0 {
            return Err(Error::OobNotSupported);
        }
        if to >= self.geometry.chip_size || opt.oob_offset >= self.geometry.oob_size {
            return Err(Error::AddressOutOfBounds);
        }

        let data_len = self.write(to, data)?;

        let oob_start = self.page_index(to) * self.geometry.oob_size as usize
            + opt.oob_offset as usize;
        let oob_len = oob
            .len()
            .min((self.geometry.oob_size - opt.oob_offset) as usize);
        for (cell, byte) in self.oob[oob_start..oob_start + oob_len].iter_mut().zip(oob) {
            *cell &= byte;
        }

        Ok(OobTransfer { data_len, oob_len })
    }

    fn block_is_bad(&mut self, offset: u32) -> Result<bool> {
        if offset >= self.geometry.chip_size {
            return Err(Error::AddressOutOfBounds);
        }
        let block = self.block_index(offset);
        Ok(self.bad[block])
    }

    fn block_mark_bad(&mut self, offset: u32) -> Result<()> {
        if offset >= self.geometry.chip_size {
            return Err(Error::AddressOutOfBounds);
        }
        let block = self.block_index(offset);
        self.bad[block] = true;
        Ok(())
    }

    fn scan_bad_blocks(&mut self) -> Result<u32> {
        Ok(self.bad.iter().filter(|&&bad| bad).count() as u32)
    }
}
