//! Error types for flashblk-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

/// Details about a rejected partition definition string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFailure {
    /// The `<mtd-id>:` separator is missing
    MissingSeparator,
    /// A size or offset token could not be parsed as a magnitude
    BadMagnitude,
    /// A size or offset token overflows the address space
    MagnitudeOverflow,
    /// The running cursor reached the end of the chip before a definition
    CursorBeyondChip,
    /// A partition's base + size exceeds the chip size
    PartitionOutOfBounds,
    /// A partition resolved to zero bytes
    ZeroSize,
    /// A partition name exceeds the bounded name length
    NameTooLong,
    /// A partition name is missing its closing parenthesis
    UnterminatedName,
    /// More partitions than the supported maximum
    TooManyPartitions,
    /// Unrecognized characters after a partition definition
    TrailingInput,
}

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Specification errors
    /// Partition definition string is malformed
    MalformedSpec(SpecFailure),
    /// Configuration value exceeds the bounded configuration length
    ConfigTooLong,

    // Geometry errors
    /// Chip size is zero or not a power of two
    InvalidChipSize,
    /// Erase size is zero, not a power of two, or larger than the chip
    InvalidEraseSize,
    /// Write size is zero, not a power of two, or larger than an erase block
    InvalidWriteSize,

    // Registration errors
    /// Chip or device name exceeds the bounded name length
    NameTooLong,
    /// A chip with the same name is already registered
    DuplicateChip,
    /// No registered chip with the given name
    ChipNotFound,
    /// Letter-suffixed device names are exhausted (26 whole-chip devices)
    TooManyDevices,
    /// The block-device bridge rejected a registration
    RegistrationRejected,

    // Operation errors
    /// Position or length is beyond the device size
    AddressOutOfBounds,
    /// Operation requires an erase-aligned position or length
    InvalidAlignment,
    /// The master chip of a partition has been unregistered
    MasterDetached,
    /// Read operation failed
    ReadError,
    /// Write/program operation failed
    WriteError,
    /// Erase operation failed
    EraseError,
    /// The targeted erase block is marked bad
    BadBlock,
    /// The chip has no out-of-band area
    OobNotSupported,
    /// I/O error occurred
    IoError,
}

impl fmt::Display for SpecFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSeparator => write!(f, "missing ':' separator"),
            Self::BadMagnitude => write!(f, "invalid size or offset"),
            Self::MagnitudeOverflow => write!(f, "size or offset overflows the address space"),
            Self::CursorBeyondChip => write!(f, "partition would start beyond the chip"),
            Self::PartitionOutOfBounds => write!(f, "partition exceeds the chip size"),
            Self::ZeroSize => write!(f, "partition resolves to zero bytes"),
            Self::NameTooLong => write!(f, "partition name too long"),
            Self::UnterminatedName => write!(f, "partition name missing ')'"),
            Self::TooManyPartitions => write!(f, "too many partitions"),
            Self::TrailingInput => write!(f, "unexpected characters after partition definition"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedSpec(failure) => {
                write!(f, "malformed partition definition: {}", failure)
            }
            Self::ConfigTooLong => write!(f, "configuration value too long"),
            Self::InvalidChipSize => write!(f, "invalid chip size"),
            Self::InvalidEraseSize => write!(f, "invalid erase size"),
            Self::InvalidWriteSize => write!(f, "invalid write size"),
            Self::NameTooLong => write!(f, "device name too long"),
            Self::DuplicateChip => write!(f, "chip name already registered"),
            Self::ChipNotFound => write!(f, "chip not registered"),
            Self::TooManyDevices => write!(f, "device letter suffixes exhausted"),
            Self::RegistrationRejected => write!(f, "block-device registration rejected"),
            Self::AddressOutOfBounds => write!(f, "address out of bounds"),
            Self::InvalidAlignment => write!(f, "invalid alignment"),
            Self::MasterDetached => write!(f, "master chip has been unregistered"),
            Self::ReadError => write!(f, "read operation failed"),
            Self::WriteError => write!(f, "write operation failed"),
            Self::EraseError => write!(f, "erase operation failed"),
            Self::BadBlock => write!(f, "block is marked bad"),
            Self::OobNotSupported => write!(f, "chip has no out-of-band area"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
