//! Flash operation contract
//!
//! The [`FlashOps`] trait is the full operation set a flash device exposes.
//! It is implemented by chip drivers (raw I/O), by [`FlashChip`] (adds
//! bounds checks) and by [`PartitionDevice`] (adds offset translation).
//!
//! [`FlashChip`]: crate::chip::FlashChip
//! [`PartitionDevice`]: crate::partition::PartitionDevice

use super::types::OobMode;
use crate::error::Result;

/// Parameters for an erase request
///
/// `start` and `len` must be aligned to the erase granularity of the device
/// the request is issued against. Implementations never mutate a caller's
/// value; offset translation works on a private copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EraseOptions {
    /// First byte to erase (erase-aligned)
    pub start: u32,
    /// Number of bytes to erase (erase-aligned)
    pub len: u32,
    /// Erase blocks even if they are marked bad
    pub scrub: bool,
}

impl EraseOptions {
    /// Create an erase request for `[start, start + len)`
    pub fn new(start: u32, len: u32) -> Self {
        Self {
            start,
            len,
            scrub: false,
        }
    }

    /// Also erase blocks marked bad
    pub fn scrub(mut self) -> Self {
        self.scrub = true;
        self
    }
}

/// Parameters for an out-of-band transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OobOptions {
    /// How OOB bytes are addressed
    pub mode: OobMode,
    /// Byte offset within the per-page OOB area (Place/Raw modes)
    pub oob_offset: u32,
}

/// Bytes actually transferred by an OOB operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OobTransfer {
    /// In-band bytes transferred
    pub data_len: usize,
    /// Out-of-band bytes transferred
    pub oob_len: usize,
}

/// The flash operation set
///
/// Positions are byte offsets relative to the device the call is made on;
/// for partition devices they are partition-relative. `read` and `write`
/// return the number of bytes actually transferred, which may be less than
/// the buffer length when the range runs past the end of the device.
///
/// `scan_bad_blocks` always operates in whole-chip coordinates, even when
/// invoked through a partition device (see [`crate::partition`]).
pub trait FlashOps {
    /// Read into `buf` starting at `from`; returns bytes read
    fn read(&mut self, from: u32, buf: &mut [u8]) -> Result<usize>;

    /// Write `buf` starting at `to`; returns bytes written
    fn write(&mut self, to: u32, buf: &[u8]) -> Result<usize>;

    /// Erase the blocks covered by `opt`
    fn erase(&mut self, opt: &EraseOptions) -> Result<()>;

    /// Read page data and OOB bytes for the page containing `from`
    fn read_oob(
        &mut self,
        from: u32,
        opt: &OobOptions,
        data: &mut [u8],
        oob: &mut [u8],
    ) -> Result<OobTransfer>;

    /// Write page data and OOB bytes for the page containing `to`
    fn write_oob(
        &mut self,
        to: u32,
        opt: &OobOptions,
        data: &[u8],
        oob: &[u8],
    ) -> Result<OobTransfer>;

    /// Check whether the erase block containing `offset` is marked bad
    fn block_is_bad(&mut self, offset: u32) -> Result<bool>;

    /// Mark the erase block containing `offset` as bad
    fn block_mark_bad(&mut self, offset: u32) -> Result<()>;

    /// Scan the whole chip for factory-marked bad blocks; returns the count
    fn scan_bad_blocks(&mut self) -> Result<u32>;
}
