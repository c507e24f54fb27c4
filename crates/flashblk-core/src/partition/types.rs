//! Partition descriptor types

/// Maximum number of partitions per chip
pub const MAX_PARTITIONS: usize = 16;

/// Maximum partition name length, in bytes
pub const MAX_PART_NAME: usize = 16;

bitflags::bitflags! {
    /// Optional trailing flags on a partition definition
    ///
    /// These are parsed and carried on the descriptor but not enforced by
    /// this layer; enforcement belongs to the block-device bridge.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PartFlags: u8 {
        /// `ro`: partition declared read-only
        const READ_ONLY = 1 << 0;
        /// `lk`: partition declared locked at boot
        const LOCKED = 1 << 1;
    }
}

/// One parsed partition definition
///
/// Ephemeral parser output: consumed during registration, not retained.
/// `base + size` never exceeds the chip size, and both are multiples of
/// the chip's erase granularity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionDescriptor {
    /// Partition name from the `(name)` field; empty if absent
    pub name: heapless::String<MAX_PART_NAME>,
    /// Base offset within the master chip, in bytes
    pub base: u32,
    /// Partition size in bytes
    pub size: u32,
    /// Declared `ro`/`lk` flags
    pub flags: PartFlags,
}
