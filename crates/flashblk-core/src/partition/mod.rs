//! Partition support
//!
//! A partition is a named sub-range of a master chip, exposed as its own
//! block device. The [`parser`] module turns the partition definition
//! string from the configuration store into [`PartitionDescriptor`]s; the
//! registry materializes each descriptor as a [`PartitionDevice`] that
//! translates partition-relative offsets onto the master.
//!
//! One operation is deliberately not offset-translated:
//! `scan_bad_blocks` runs in whole-chip coordinates regardless of which
//! partition it is invoked through, matching the behavior drivers have
//! historically relied on.

mod device;
pub mod parser;
mod types;

pub use device::PartitionDevice;
pub use parser::parse_partitions;
pub use types::{PartFlags, PartitionDescriptor, MAX_PARTITIONS, MAX_PART_NAME};
