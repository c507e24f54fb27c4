//! Flash chip model
//!
//! A [`FlashChip`] pairs the chip's identity and geometry with the driver
//! supplied by the physical chip driver. The registry exposes it either as
//! one whole block device or through per-partition proxy devices; see
//! [`crate::registry`].

mod ops;
mod types;

pub use ops::*;
pub use types::*;

#[cfg(feature = "alloc")]
use alloc::boxed::Box;

#[cfg(feature = "alloc")]
use crate::error::{Error, Result};

/// A master flash chip: identity, geometry and the driver operations
///
/// The driver object implements the raw chip I/O ([`FlashOps`]); the chip
/// itself implements the same trait, adding bounds and alignment checks
/// before delegating. A chip is either registered standalone or exclusively
/// through its partition set, never both.
#[cfg(feature = "alloc")]
pub struct FlashChip {
    info: ChipInfo,
    driver: Box<dyn FlashOps>,
}

#[cfg(feature = "alloc")]
impl FlashChip {
    /// Create a chip from its identity and driver
    ///
    /// Validates the geometry (power-of-two sizes, consistent shifts).
    pub fn new(info: ChipInfo, driver: Box<dyn FlashOps>) -> Result<Self> {
        info.geometry.validate()?;
        Ok(Self { info, driver })
    }

    /// Chip identity and geometry
    pub fn info(&self) -> &ChipInfo {
        &self.info
    }

    /// Chip name as reported by the driver
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Chip geometry
    pub fn geometry(&self) -> &ChipGeometry {
        &self.info.geometry
    }
}

#[cfg(feature = "alloc")]
impl FlashOps for FlashChip {
    fn read(&mut self, from: u32, buf: &mut [u8]) -> Result<usize> {
        if from >= self.info.geometry.chip_size {
            return Err(Error::AddressOutOfBounds);
        }
        self.driver.read(from, buf)
    }

    fn write(&mut self, to: u32, buf: &[u8]) -> Result<usize> {
        if to >= self.info.geometry.chip_size {
            return Err(Error::AddressOutOfBounds);
        }
        self.driver.write(to, buf)
    }

    fn erase(&mut self, opt: &EraseOptions) -> Result<()> {
        let geometry = &self.info.geometry;
        if !geometry.contains(opt.start, opt.len as usize) {
            return Err(Error::AddressOutOfBounds);
        }
        if !geometry.is_erase_aligned(opt.start) || !geometry.is_erase_aligned(opt.len) {
            return Err(Error::InvalidAlignment);
        }
        self.driver.erase(opt)
    }

    fn read_oob(
        &mut self,
        from: u32,
        opt: &OobOptions,
        data: &mut [u8],
        oob: &mut [u8],
    ) -> Result<OobTransfer> {
        if self.info.geometry.oob_size == 0 {
            return Err(Error::OobNotSupported);
        }
        if from >= self.info.geometry.chip_size {
            return Err(Error::AddressOutOfBounds);
        }
        self.driver.read_oob(from, opt, data, oob)
    }

    fn write_oob(
        &mut self,
        to: u32,
        opt: &OobOptions,
        data: &[u8],
        oob: &[u8],
    ) -> Result<OobTransfer> {
        if self.info.geometry.oob_size == 0 {
            return Err(Error::OobNotSupported);
        }
        if to >= self.info.geometry.chip_size {
            return Err(Error::AddressOutOfBounds);
        }
        self.driver.write_oob(to, opt, data, oob)
    }

    fn block_is_bad(&mut self, offset: u32) -> Result<bool> {
        if offset >= self.info.geometry.chip_size {
            return Err(Error::AddressOutOfBounds);
        }
        self.driver.block_is_bad(offset)
    }

    fn block_mark_bad(&mut self, offset: u32) -> Result<()> {
        if offset >= self.info.geometry.chip_size {
            return Err(Error::AddressOutOfBounds);
        }
        self.driver.block_mark_bad(offset)
    }

    fn scan_bad_blocks(&mut self) -> Result<u32> {
        self.driver.scan_bad_blocks()
    }
}
