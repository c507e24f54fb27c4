//! Flash registry
//!
//! Process-wide catalog of registered master chips. Registration consults
//! the configuration store for a partition definition, then exposes the
//! chip either as one whole block device or as one device per partition.
//! The registry is an explicitly owned object; there is no hidden global.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt::Write as _;

use crate::bridge::{
    BlockDevice, BlockDeviceBridge, ConfigStore, CONF_FLASH_PART, MAX_CONF_VAL, MAX_DEV_NAME,
};
use crate::chip::FlashChip;
use crate::error::{Error, Result};
use crate::partition::{parse_partitions, PartitionDescriptor, PartitionDevice};

/// Base name for block devices derived from flash chips
///
/// Whole-chip devices get a letter suffix (`mtdblockA`, `mtdblockB`, ...);
/// partition devices get a 1-based numeric suffix (`mtdblock1`, ...).
pub const FLASH_BDEV_NAME: &str = "mtdblock";

/// Letter suffixes bound the number of whole-chip devices
const MAX_WHOLE_DEVICES: u32 = 26;

struct MasterEntry {
    chip: Rc<RefCell<FlashChip>>,
    /// Partition devices owned by this master; empty for whole-chip entries
    slaves: Vec<Rc<RefCell<PartitionDevice>>>,
    /// Names registered with the bridge for this master, in order
    devices: Vec<heapless::String<MAX_DEV_NAME>>,
}

/// Catalog of registered master chips
///
/// `B` is the bridge to the external block-device registry, `C` the system
/// configuration store. `register`/`unregister` are expected to run to
/// completion without preemption by another registration call; there is no
/// internal locking.
pub struct FlashRegistry<B, C> {
    bridge: B,
    config: C,
    masters: Vec<MasterEntry>,
    flash_count: u32,
}

impl<B: BlockDeviceBridge, C: ConfigStore> FlashRegistry<B, C> {
    /// Create an empty registry
    pub fn new(bridge: B, config: C) -> Self {
        Self {
            bridge,
            config,
            masters: Vec::new(),
            flash_count: 0,
        }
    }

    /// Register a master chip
    ///
    /// Looks up the `flash.part` attribute and selects the clause whose
    /// `<mtd-id>` matches the chip name. No clause (or no configuration at
    /// all) registers the chip as a single whole device; a malformed clause
    /// aborts the registration. Registration is all-or-nothing: on any
    /// bridge rejection, devices already registered by this call are
    /// unregistered again and the chip is not added to the catalog.
    pub fn register(&mut self, chip: FlashChip) -> Result<()> {
        if self.find(chip.name()).is_some() {
            return Err(Error::DuplicateChip);
        }
        log::info!("registering flash device \"{}\"", chip.name());

        let descriptors = self.scan_partitions(&chip)?;

        let entry = if descriptors.is_empty() {
            self.register_whole(chip)?
        } else {
            self.register_partitions(chip, &descriptors)?
        };

        self.masters.push(entry);
        self.flash_count += 1;
        Ok(())
    }

    /// Unregister a master chip by name
    ///
    /// Unregisters all of the master's devices from the bridge and drops
    /// the slave collection; partition handles still held elsewhere go
    /// dead (their operations fail with [`Error::MasterDetached`]).
    pub fn unregister(&mut self, name: &str) -> Result<()> {
        let index = self
            .masters
            .iter()
            .position(|entry| entry.chip.borrow().name() == name)
            .ok_or(Error::ChipNotFound)?;
        let entry = self.masters.remove(index);

        log::info!("unregistering flash device \"{}\"", name);

        let mut result = Ok(());
        for device in &entry.devices {
            if let Err(err) = self.bridge.unregister_device(device) {
                log::warn!("failed to unregister \"{}\": {}", device, err);
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        result
    }

    /// Number of successful registrations so far
    ///
    /// Monotonically increasing; never decremented by unregistration, so
    /// letter suffixes stay unique across the process lifetime.
    pub fn flash_count(&self) -> u32 {
        self.flash_count
    }

    /// Number of currently registered masters
    pub fn len(&self) -> usize {
        self.masters.len()
    }

    /// Check if no masters are registered
    pub fn is_empty(&self) -> bool {
        self.masters.is_empty()
    }

    /// Registered masters, in insertion order
    pub fn masters(&self) -> impl Iterator<Item = &Rc<RefCell<FlashChip>>> {
        self.masters.iter().map(|entry| &entry.chip)
    }

    /// Look up a registered master by chip name
    pub fn master(&self, name: &str) -> Option<&Rc<RefCell<FlashChip>>> {
        self.find(name).map(|entry| &entry.chip)
    }

    /// Partition devices of a registered master; empty for whole-chip
    /// registrations
    pub fn partitions(&self, name: &str) -> Option<&[Rc<RefCell<PartitionDevice>>]> {
        self.find(name).map(|entry| entry.slaves.as_slice())
    }

    /// Block-device names registered for a master, in registration order
    pub fn device_names(&self, name: &str) -> Option<&[heapless::String<MAX_DEV_NAME>]> {
        self.find(name).map(|entry| entry.devices.as_slice())
    }

    /// The underlying block-device bridge
    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    fn find(&self, name: &str) -> Option<&MasterEntry> {
        self.masters
            .iter()
            .find(|entry| entry.chip.borrow().name() == name)
    }

    /// Resolve the partition definition for a chip
    ///
    /// An absent attribute, an absent clause for this chip, or a clause
    /// with no definitions means "no partitioning" and yields an empty
    /// list; anything else that fails to parse is an error.
    fn scan_partitions(&self, chip: &FlashChip) -> Result<Vec<PartitionDescriptor>> {
        let Some(raw) = self.config.get_attr(CONF_FLASH_PART) else {
            return Ok(Vec::new());
        };
        if raw.len() > MAX_CONF_VAL {
            return Err(Error::ConfigTooLong);
        }

        let clause = raw
            .split(';')
            .find(|clause| clause.split(':').next().map(str::trim) == Some(chip.name()));
        match clause {
            Some(clause) => parse_partitions(chip.geometry(), clause),
            None => Ok(Vec::new()),
        }
    }

    fn register_whole(&mut self, chip: FlashChip) -> Result<MasterEntry> {
        if self.flash_count >= MAX_WHOLE_DEVICES {
            return Err(Error::TooManyDevices);
        }
        let letter = (b'A' + self.flash_count as u8) as char;
        let mut name = heapless::String::new();
        write!(name, "{}{}", FLASH_BDEV_NAME, letter).map_err(|_| Error::NameTooLong)?;

        let device = BlockDevice {
            name: name.clone(),
            base: 0,
            size: chip.geometry().chip_size,
        };
        self.bridge.register_device(&device)?;
        log::info!(
            "  \"{}\": whole chip, {} bytes",
            name,
            chip.geometry().chip_size
        );

        let mut devices = Vec::with_capacity(1);
        devices.push(name);
        Ok(MasterEntry {
            chip: Rc::new(RefCell::new(chip)),
            slaves: Vec::new(),
            devices,
        })
    }

    fn register_partitions(
        &mut self,
        chip: FlashChip,
        descriptors: &[PartitionDescriptor],
    ) -> Result<MasterEntry> {
        let master = Rc::new(RefCell::new(chip));
        let mut slaves = Vec::with_capacity(descriptors.len());
        let mut devices = Vec::with_capacity(descriptors.len());

        // build every slave before touching the bridge
        for (index, descriptor) in descriptors.iter().enumerate() {
            let mut name = heapless::String::new();
            write!(name, "{}{}", FLASH_BDEV_NAME, index + 1).map_err(|_| Error::NameTooLong)?;
            let slave = PartitionDevice::new(&name, descriptor, &master)?;
            slaves.push(Rc::new(RefCell::new(slave)));
            devices.push(name);
        }

        for (index, name) in devices.iter().enumerate() {
            let descriptor = &descriptors[index];
            let device = BlockDevice {
                name: name.clone(),
                base: descriptor.base,
                size: descriptor.size,
            };
            if let Err(err) = self.bridge.register_device(&device) {
                log::error!("block-device registration failed for \"{}\": {}", name, err);
                // roll back devices registered earlier in this call
                for registered in &devices[..index] {
                    if let Err(rollback_err) = self.bridge.unregister_device(registered) {
                        log::warn!(
                            "rollback: failed to unregister \"{}\": {}",
                            registered,
                            rollback_err
                        );
                    }
                }
                return Err(err);
            }
            log::debug!(
                "  \"{}\" ({}): base 0x{:08x}, {} bytes",
                name,
                descriptor.name,
                descriptor.base,
                descriptor.size
            );
        }

        Ok(MasterEntry {
            chip: master,
            slaves,
            devices,
        })
    }
}
