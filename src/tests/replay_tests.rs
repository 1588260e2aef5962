// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::config::Layout;
use crate::replay::replay;
use crate::storage::record::encode_generation;
use crate::storage::{Medium, RamFlash, Record};
use crate::tests::config_for;
use crate::types::RegionId;

#[test]
fn test_last_write_wins() {
    let config = config_for(8, Layout::Plain);
    let geometry = config.geometry;
    let mut flash = RamFlash::new(geometry);
    let log = [(0u16, 11), (1, 21), (0, 12), (2, -5), (0, 13)];
    for (slot, (id, value)) in log.iter().enumerate() {
        let address = geometry.slot_address(RegionId::A, slot as u32);
        flash.program_record(address, &Record::new(*id, *value).encode()).unwrap();
    }

    let mut table = [10, 20, 30, 40];
    let stats = replay(&flash, RegionId::A, &mut table);

    assert_eq!(table, [13, 21, -5, 40]);
    assert_eq!(stats.applied, 5);
    assert_eq!(stats.slots_scanned, 5);
    assert_eq!(stats.corrupt, 0);
}

#[test]
fn test_empty_region_keeps_defaults() {
    let config = config_for(4, Layout::Plain);
    let flash = RamFlash::new(config.geometry);
    let mut table = [1, 2, 3];
    let stats = replay(&flash, RegionId::B, &mut table);
    assert_eq!(table, [1, 2, 3]);
    assert_eq!(stats.slots_scanned, 0);
}

#[test]
fn test_corrupt_slots_are_skipped_not_fatal() {
    let config = config_for(6, Layout::Plain);
    let geometry = config.geometry;
    let mut flash = RamFlash::new(geometry);

    flash.program_record(geometry.slot_address(RegionId::A, 0), &Record::new(0, 1).encode()).unwrap();
    flash.inject_corruption(geometry.slot_address(RegionId::A, 1), 8);
    // Tag intact but id outside the table.
    flash.program_record(geometry.slot_address(RegionId::A, 2), &Record::new(9, 1).encode()).unwrap();
    flash.program_record(geometry.slot_address(RegionId::A, 3), &Record::new(1, 2).encode()).unwrap();

    let mut table = [0, 0];
    let stats = replay(&flash, RegionId::A, &mut table);

    assert_eq!(table, [1, 2]);
    assert_eq!(stats.applied, 2);
    assert_eq!(stats.corrupt, 2);
    assert_eq!(stats.slots_scanned, 4);
}

#[test]
fn test_scan_stops_at_first_erased_slot() {
    let config = config_for(6, Layout::Plain);
    let geometry = config.geometry;
    let mut flash = RamFlash::new(geometry);

    flash.program_record(geometry.slot_address(RegionId::A, 0), &Record::new(0, 1).encode()).unwrap();
    // Beyond the end of the log; violates the prefix invariant, must be ignored.
    flash.program_record(geometry.slot_address(RegionId::A, 2), &Record::new(0, 99).encode()).unwrap();

    let mut table = [0];
    let stats = replay(&flash, RegionId::A, &mut table);
    assert_eq!(table, [1]);
    assert_eq!(stats.slots_scanned, 1);
}

#[test]
fn test_generation_marker_is_not_a_parameter() {
    let config = config_for(4, Layout::Generational);
    let geometry = config.geometry;
    let mut flash = RamFlash::new(geometry);
    flash.program_record(geometry.slot_address(RegionId::B, 0), &encode_generation(5)).unwrap();
    flash.program_record(geometry.slot_address(RegionId::B, 1), &Record::new(0, 8).encode()).unwrap();

    let mut table = [0, 0];
    let stats = replay(&flash, RegionId::B, &mut table);
    assert_eq!(table, [8, 0]);
    assert_eq!(stats.generation, Some(5));
    assert_eq!(stats.corrupt, 0);
}
