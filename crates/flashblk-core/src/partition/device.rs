//! Partition device proxy
//!
//! A [`PartitionDevice`] presents one partition as an independent flash
//! device. Every operation translates its partition-relative position by
//! the partition base and delegates to the master chip, returning the
//! master's result verbatim.

use alloc::rc::{Rc, Weak};
use core::cell::RefCell;

use super::types::{PartFlags, PartitionDescriptor};
use crate::bridge::MAX_DEV_NAME;
use crate::chip::{ChipGeometry, EraseOptions, FlashChip, FlashOps, OobOptions, OobTransfer};
use crate::error::{Error, Result};

/// A partition of a master chip, exposed as its own device
///
/// Holds a copy of the master's geometry and a non-owning back-reference
/// to the master; the master's slave collection owns the partition. Once
/// the master is unregistered, operations fail with
/// [`Error::MasterDetached`].
pub struct PartitionDevice {
    name: heapless::String<MAX_DEV_NAME>,
    base: u32,
    size: u32,
    flags: PartFlags,
    geometry: ChipGeometry,
    master: Weak<RefCell<FlashChip>>,
}

impl PartitionDevice {
    /// Build a partition device from a parsed descriptor
    ///
    /// Copies the master's geometry and records the back-reference.
    pub(crate) fn new(
        name: &str,
        descriptor: &PartitionDescriptor,
        master: &Rc<RefCell<FlashChip>>,
    ) -> Result<Self> {
        let name = heapless::String::try_from(name).map_err(|_| Error::NameTooLong)?;
        Ok(Self {
            name,
            base: descriptor.base,
            size: descriptor.size,
            flags: descriptor.flags,
            geometry: *master.borrow().geometry(),
            master: Rc::downgrade(master),
        })
    }

    /// Block-device name of this partition
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base offset within the master chip
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Partition size in bytes
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Flags declared in the partition definition
    pub fn flags(&self) -> PartFlags {
        self.flags
    }

    /// Geometry copied from the master chip
    pub fn geometry(&self) -> &ChipGeometry {
        &self.geometry
    }

    /// The master chip, if it is still registered
    pub fn master(&self) -> Option<Rc<RefCell<FlashChip>>> {
        self.master.upgrade()
    }

    fn with_master<T>(&self, f: impl FnOnce(&mut FlashChip) -> Result<T>) -> Result<T> {
        let master = self.master.upgrade().ok_or(Error::MasterDetached)?;
        let mut chip = master.borrow_mut();
        f(&mut chip)
    }

    /// Clamp a transfer starting at `offset` to the partition end
    ///
    /// Preserves the partial-length read/write semantics at the partition
    /// boundary instead of bleeding into the next partition.
    fn clamp(&self, offset: u32, len: usize) -> Result<usize> {
        if offset >= self.size {
            return Err(Error::AddressOutOfBounds);
        }
        Ok(len.min((self.size - offset) as usize))
    }
}

impl FlashOps for PartitionDevice {
    fn read(&mut self, from: u32, buf: &mut [u8]) -> Result<usize> {
        let len = self.clamp(from, buf.len())?;
        let base = self.base;
        self.with_master(|master| master.read(base + from, &mut buf[..len]))
    }

    fn write(&mut self, to: u32, buf: &[u8]) -> Result<usize> {
        let len = self.clamp(to, buf.len())?;
        let base = self.base;
        self.with_master(|master| master.write(base + to, &buf[..len]))
    }

    fn erase(&mut self, opt: &EraseOptions) -> Result<()> {
        let end = opt.start as u64 + opt.len as u64;
        if end > self.size as u64 {
            return Err(Error::AddressOutOfBounds);
        }
        // translate a private copy; the caller's value is left untouched
        let mut translated = *opt;
        translated.start += self.base;
        self.with_master(|master| master.erase(&translated))
    }

    fn read_oob(
        &mut self,
        from: u32,
        opt: &OobOptions,
        data: &mut [u8],
        oob: &mut [u8],
    ) -> Result<OobTransfer> {
        if from >= self.size {
            return Err(Error::AddressOutOfBounds);
        }
        let base = self.base;
        self.with_master(|master| master.read_oob(base + from, opt, data, oob))
    }

    fn write_oob(
        &mut self,
        to: u32,
        opt: &OobOptions,
        data: &[u8],
        oob: &[u8],
    ) -> Result<OobTransfer> {
        if to >= self.size {
            return Err(Error::AddressOutOfBounds);
        }
        let base = self.base;
        self.with_master(|master| master.write_oob(base + to, opt, data, oob))
    }

    fn block_is_bad(&mut self, offset: u32) -> Result<bool> {
        if offset >= self.size {
            return Err(Error::AddressOutOfBounds);
        }
        let base = self.base;
        self.with_master(|master| master.block_is_bad(base + offset))
    }

    fn block_mark_bad(&mut self, offset: u32) -> Result<()> {
        if offset >= self.size {
            return Err(Error::AddressOutOfBounds);
        }
        let base = self.base;
        self.with_master(|master| master.block_mark_bad(base + offset))
    }

    fn scan_bad_blocks(&mut self) -> Result<u32> {
        // whole-chip coordinates, deliberately untranslated
        self.with_master(|master| master.scan_bad_blocks())
    }
}
