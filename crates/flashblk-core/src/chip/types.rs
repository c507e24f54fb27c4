//! Flash chip type definitions

use crate::error::{Error, Result};

/// Maximum chip name length, in bytes
pub const MAX_CHIP_NAME: usize = 32;

/// Flash medium technology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashType {
    /// NOR flash: byte-addressable reads, no out-of-band area
    Nor,
    /// NAND flash: page-based access with a per-page out-of-band area
    Nand,
}

/// How the out-of-band area is addressed by OOB transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OobMode {
    /// Driver places data according to its ECC layout
    #[default]
    Auto,
    /// Caller addresses free OOB bytes explicitly
    Place,
    /// Raw access to the whole OOB area, no ECC
    Raw,
}

/// Chip geometry: sizes, their shift forms, and the OOB configuration
///
/// The shift fields are the base-2 logarithms of the corresponding sizes
/// and must stay consistent with them (`1 << shift == size`). Constructing
/// through [`ChipGeometry::new`] derives the shifts; [`validate`] re-checks
/// the invariant for geometries built by hand.
///
/// [`validate`]: ChipGeometry::validate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipGeometry {
    /// Total chip size in bytes
    pub chip_size: u32,
    /// Erase granularity in bytes (minimum erasable unit)
    pub erase_size: u32,
    /// Write granularity in bytes (page size)
    pub write_size: u32,
    /// log2 of the chip size
    pub chip_shift: u32,
    /// log2 of the erase size
    pub erase_shift: u32,
    /// log2 of the write size
    pub write_shift: u32,
    /// Flash technology
    pub flash_type: FlashType,
    /// Out-of-band bytes per write page (0 for none)
    pub oob_size: u32,
    /// Out-of-band addressing mode
    pub oob_mode: OobMode,
}

impl ChipGeometry {
    /// Create a geometry, deriving the shift forms from the sizes
    ///
    /// All sizes must be non-zero powers of two with
    /// `write_size <= erase_size <= chip_size`.
    pub fn new(
        flash_type: FlashType,
        chip_size: u32,
        erase_size: u32,
        write_size: u32,
    ) -> Result<Self> {
        let geometry = Self {
            chip_size,
            erase_size,
            write_size,
            chip_shift: chip_size.trailing_zeros(),
            erase_shift: erase_size.trailing_zeros(),
            write_shift: write_size.trailing_zeros(),
            flash_type,
            oob_size: 0,
            oob_mode: OobMode::Auto,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Set the out-of-band area size and mode
    pub fn with_oob(mut self, oob_size: u32, oob_mode: OobMode) -> Self {
        self.oob_size = oob_size;
        self.oob_mode = oob_mode;
        self
    }

    /// Check size/shift consistency and ordering of the granularities
    pub fn validate(&self) -> Result<()> {
        if !self.chip_size.is_power_of_two() || 1u32.wrapping_shl(self.chip_shift) != self.chip_size
        {
            return Err(Error::InvalidChipSize);
        }
        if !self.erase_size.is_power_of_two()
            || 1u32.wrapping_shl(self.erase_shift) != self.erase_size
            || self.erase_size > self.chip_size
        {
            return Err(Error::InvalidEraseSize);
        }
        if !self.write_size.is_power_of_two()
            || 1u32.wrapping_shl(self.write_shift) != self.write_size
            || self.write_size > self.erase_size
        {
            return Err(Error::InvalidWriteSize);
        }
        Ok(())
    }

    /// Number of erase blocks on the chip
    pub fn block_count(&self) -> u32 {
        self.chip_size >> self.erase_shift
    }

    /// Check if a range lies within the chip
    pub fn contains(&self, offset: u32, len: usize) -> bool {
        // u64 arithmetic to avoid truncation on large ranges
        let end = offset as u64 + len as u64;
        end <= self.chip_size as u64
    }

    /// Check if a value is aligned to the erase granularity
    pub fn is_erase_aligned(&self, value: u32) -> bool {
        value & (self.erase_size - 1) == 0
    }
}

/// Chip identity: bounded-length name plus geometry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipInfo {
    /// Chip name, as used to match partition definition clauses
    pub name: heapless::String<MAX_CHIP_NAME>,
    /// Chip geometry
    pub geometry: ChipGeometry,
}

impl ChipInfo {
    /// Create a chip identity; fails if the name exceeds [`MAX_CHIP_NAME`]
    pub fn new(name: &str, geometry: ChipGeometry) -> Result<Self> {
        let name = heapless::String::try_from(name).map_err(|_| Error::NameTooLong)?;
        Ok(Self { name, geometry })
    }
}
