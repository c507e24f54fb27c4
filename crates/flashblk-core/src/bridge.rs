//! External collaborator interfaces
//!
//! The registry talks to two external subsystems: the block-device registry
//! (fops wiring, device nodes) and the system configuration store that
//! supplies the partition definition string. Both are specified here only
//! as traits; the implementations live outside this crate.

use crate::error::{Error, Result};

/// Maximum block-device name length, in bytes
pub const MAX_DEV_NAME: usize = 16;

/// Maximum configuration value length accepted from the store, in bytes
pub const MAX_CONF_VAL: usize = 512;

/// Configuration attribute holding the partition definition string
pub const CONF_FLASH_PART: &str = "flash.part";

/// A block device handed to the external registry
///
/// All fields are populated before [`BlockDeviceBridge::register_device`]
/// is called; the bridge is expected to wire the device operation table
/// during registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDevice {
    /// Device name (bounded, unique within the bridge)
    pub name: heapless::String<MAX_DEV_NAME>,
    /// Base offset of the device within its master chip
    pub base: u32,
    /// Device size in bytes
    pub size: u32,
}

impl BlockDevice {
    /// Create a block device descriptor; fails if the name exceeds
    /// [`MAX_DEV_NAME`]
    pub fn new(name: &str, base: u32, size: u32) -> Result<Self> {
        let name = heapless::String::try_from(name).map_err(|_| Error::NameTooLong)?;
        Ok(Self { name, base, size })
    }
}

/// Bridge to the external block-device registry
pub trait BlockDeviceBridge {
    /// Register a block device; errors are surfaced to the caller
    fn register_device(&mut self, device: &BlockDevice) -> Result<()>;

    /// Unregister a previously registered device by name
    fn unregister_device(&mut self, name: &str) -> Result<()>;
}

/// Read-only view of the system configuration store
pub trait ConfigStore {
    /// Look up a configuration attribute; `None` means not configured
    fn get_attr(&self, key: &str) -> Option<&str>;
}
