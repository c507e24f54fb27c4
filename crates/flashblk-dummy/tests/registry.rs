//! End-to-end tests: emulated chips registered through the flash registry

use flashblk_core::bridge::{BlockDevice, BlockDeviceBridge, ConfigStore, CONF_FLASH_PART};
use flashblk_core::chip::{EraseOptions, FlashOps};
use flashblk_core::registry::FlashRegistry;
use flashblk_core::Result;
use flashblk_dummy::{EmulatedConfig, EmulatedFlash};

#[derive(Default)]
struct MemBridge {
    registered: Vec<BlockDevice>,
}

impl BlockDeviceBridge for MemBridge {
    fn register_device(&mut self, device: &BlockDevice) -> Result<()> {
        self.registered.push(device.clone());
        Ok(())
    }

    fn unregister_device(&mut self, name: &str) -> Result<()> {
        self.registered.retain(|device| device.name.as_str() != name);
        Ok(())
    }
}

struct MemConfig(Option<&'static str>);

impl ConfigStore for MemConfig {
    fn get_attr(&self, key: &str) -> Option<&str> {
        if key == CONF_FLASH_PART {
            self.0
        } else {
            None
        }
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn whole_chip_registration_and_io() {
    init_logging();
    let mut registry = FlashRegistry::new(MemBridge::default(), MemConfig(None));

    let chip = EmulatedFlash::new_default().into_chip("nor0").unwrap();
    registry.register(chip).unwrap();

    assert_eq!(registry.bridge().registered.len(), 1);
    assert_eq!(registry.bridge().registered[0].name.as_str(), "mtdblockA");
    assert_eq!(registry.bridge().registered[0].size, 16 * 1024 * 1024);

    let master = registry.master("nor0").unwrap();
    let payload = b"boot configuration";
    master.borrow_mut().write(0x1000, payload).unwrap();

    let mut buf = vec![0u8; payload.len()];
    master.borrow_mut().read(0x1000, &mut buf).unwrap();
    assert_eq!(&buf, payload);
}

#[test]
fn partition_io_reaches_master_at_translated_offsets() {
    init_logging();
    let mut registry = FlashRegistry::new(
        MemBridge::default(),
        MemConfig(Some("nand0:256k(boot),256k(data),-(root)")),
    );

    let chip = EmulatedFlash::new(EmulatedConfig::nand_small())
        .unwrap()
        .into_chip("nand0")
        .unwrap();
    registry.register(chip).unwrap();

    let slaves = registry.partitions("nand0").unwrap().to_vec();
    assert_eq!(slaves.len(), 3);
    let base = slaves[1].borrow().base();
    assert_eq!(base, 256 << 10);

    // write through the partition, read back through the master
    let payload = b"partition payload";
    slaves[1].borrow_mut().write(100, payload).unwrap();

    let master = registry.master("nand0").unwrap();
    let mut buf = vec![0u8; payload.len()];
    master.borrow_mut().read(base + 100, &mut buf).unwrap();
    assert_eq!(&buf, payload);

    // and the reverse: master writes are visible partition-relative
    master.borrow_mut().write(base + 8192, payload).unwrap();
    slaves[1].borrow_mut().read(8192, &mut buf).unwrap();
    assert_eq!(&buf, payload);

    // erase through the partition clears the master range
    slaves[1]
        .borrow_mut()
        .erase(&EraseOptions::new(0, 4096))
        .unwrap();
    master.borrow_mut().read(base + 100, &mut buf).unwrap();
    assert!(buf.iter().all(|&b| b == 0xFF));

    // bad-block marking lands on the master block
    slaves[1].borrow_mut().block_mark_bad(4096).unwrap();
    assert!(master.borrow_mut().block_is_bad(base + 4096).unwrap());
    assert!(slaves[1].borrow_mut().block_is_bad(4096).unwrap());

    // scan sees the whole chip, from any partition
    assert_eq!(slaves[0].borrow_mut().scan_bad_blocks().unwrap(), 1);
}

#[test]
fn empty_partition_clause_registers_whole_chip() {
    init_logging();
    let mut registry = FlashRegistry::new(MemBridge::default(), MemConfig(Some("nor0:")));

    let chip = EmulatedFlash::new_default().into_chip("nor0").unwrap();
    registry.register(chip).unwrap();

    assert_eq!(registry.bridge().registered.len(), 1);
    assert_eq!(registry.bridge().registered[0].name.as_str(), "mtdblockA");
    assert!(registry.partitions("nor0").unwrap().is_empty());
}

#[test]
fn partition_devices_cover_the_chip() {
    init_logging();
    let mut registry = FlashRegistry::new(
        MemBridge::default(),
        MemConfig(Some("nand0:256k(boot),256k(data),-(root)")),
    );

    let chip = EmulatedFlash::new(EmulatedConfig::nand_small())
        .unwrap()
        .into_chip("nand0")
        .unwrap();
    registry.register(chip).unwrap();

    let devices = &registry.bridge().registered;
    assert_eq!(devices.len(), 3);
    let names: Vec<&str> = devices.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["mtdblock1", "mtdblock2", "mtdblock3"]);
    let total: u32 = devices.iter().map(|d| d.size).sum();
    assert_eq!(total, 1024 * 1024);
}

#[test]
fn unregister_removes_devices_and_detaches_partitions() {
    init_logging();
    let mut registry = FlashRegistry::new(
        MemBridge::default(),
        MemConfig(Some("nand0:256k(boot),-(root)")),
    );

    let chip = EmulatedFlash::new(EmulatedConfig::nand_small())
        .unwrap()
        .into_chip("nand0")
        .unwrap();
    registry.register(chip).unwrap();

    let slave = registry.partitions("nand0").unwrap()[0].clone();

    registry.unregister("nand0").unwrap();
    assert!(registry.bridge().registered.is_empty());
    assert!(registry.master("nand0").is_none());

    let mut buf = [0u8; 4];
    assert!(slave.borrow_mut().read(0, &mut buf).is_err());
}
