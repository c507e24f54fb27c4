//! flashblk-core - Flash block-device abstraction layer
//!
//! This crate sits between physical flash chip drivers and the external
//! block-device registry. A chip driver hands a [`chip::FlashChip`] to the
//! [`registry::FlashRegistry`]; the registry consults the system
//! configuration store for a partition definition string and either exposes
//! the chip as a single block device, or splits it into partition devices
//! that translate partition-relative offsets onto the master chip.
//!
//! It is designed to be `no_std` compatible for use in embedded
//! environments.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable heap allocation (partition devices and the registry)
//!
//! # Example
//!
//! ```ignore
//! use flashblk_core::registry::FlashRegistry;
//!
//! let mut registry = FlashRegistry::new(bridge, config);
//! registry.register(chip)?;
//! ```
//!
//! The sibling image-packaging tool (16-byte header, magic `0x5A5A5A5A`,
//! ones'-complement checksum) is an independent offline artifact format and
//! is not handled by this crate.

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod bridge;
pub mod chip;
pub mod error;
#[cfg(feature = "alloc")]
pub mod partition;
#[cfg(feature = "alloc")]
pub mod registry;

pub use error::{Error, Result};
