// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::config::{Geometry, Layout, StoreConfig};
use crate::error::KernelError;
use crate::resolve::ResolveOutcome;
use crate::storage::{RamFlash, Record, SlotState};
use crate::store::{ParamStore, SaveOutcome};
use crate::tests::{boot, config_for, slots, Lcg};
use crate::types::RegionId;
use std::vec::Vec;

#[test]
fn test_concrete_scenario() {
    let config = config_for(4, Layout::Plain);
    let defaults = [10, 20];
    let mut flash = RamFlash::new(config.geometry);

    {
        let (mut store, mut table, report) = boot(&mut flash, config, &defaults);
        assert_eq!(report.resolution.outcome, ResolveOutcome::Fresh);
        assert_eq!(table, vec![10, 20]);

        for (id, value) in [(0u16, 11), (1, 21), (0, 12)] {
            table[id as usize] = value;
            store.save(&table, id, value).unwrap();
        }
    }
    assert_eq!(
        slots(&flash, RegionId::A, 2),
        vec![
            SlotState::Valid(Record::new(0, 11)),
            SlotState::Valid(Record::new(1, 21)),
            SlotState::Valid(Record::new(0, 12)),
            SlotState::Erased,
        ]
    );

    {
        let (mut store, mut table, _) = boot(&mut flash, config, &defaults);
        assert_eq!(table, vec![12, 21]);

        table[1] = 22;
        let outcome = store.save(&table, 1, 22).unwrap();
        assert_eq!(outcome, SaveOutcome::Appended { region: RegionId::A, slot: 3 });
        assert_eq!(store.free_slots(), 0);
    }

    {
        let (mut store, table, _) = boot(&mut flash, config, &defaults);
        assert_eq!(table, vec![12, 22]);

        let outcome = store.save_current(&table, 0).unwrap();
        assert_eq!(outcome, SaveOutcome::Compacted { region: RegionId::B, generation: 1 });
        assert_eq!(store.active_region(), RegionId::B);
    }

    assert_eq!(
        slots(&flash, RegionId::B, 2),
        vec![
            SlotState::Valid(Record::new(0, 12)),
            SlotState::Valid(Record::new(1, 22)),
            SlotState::Erased,
            SlotState::Erased,
        ]
    );
    assert!(slots(&flash, RegionId::A, 2).iter().all(SlotState::is_erased));

    let (store, table, report) = boot(&mut flash, config, &defaults);
    assert_eq!(report.resolution.active, RegionId::B);
    assert_eq!(store.active_region(), RegionId::B);
    assert_eq!(table, vec![12, 22]);
}

#[test]
fn test_capacity_then_single_compaction() {
    const C: u32 = 8;
    let config = config_for(C, Layout::Plain);
    let mut flash = RamFlash::new(config.geometry);
    let (mut store, mut table, _) = boot(&mut flash, config, &[0, 0, 0]);

    for i in 0..C {
        let id = (i % 3) as u16;
        table[id as usize] = i as i32;
        let outcome = store.save(&table, id, i as i32).unwrap();
        assert_eq!(outcome, SaveOutcome::Appended { region: RegionId::A, slot: i });
    }
    assert_eq!(store.medium().total_erase_count(), 0);

    table[1] = 100;
    let outcome = store.save(&table, 1, 100).unwrap();
    assert!(matches!(outcome, SaveOutcome::Compacted { region: RegionId::B, .. }));
    assert_eq!(store.medium().erase_count(RegionId::A), 1);
    assert_eq!(store.medium().erase_count(RegionId::B), 1);

    // Next save is a plain append after the snapshot.
    table[2] = 5;
    let outcome = store.save(&table, 2, 5).unwrap();
    assert_eq!(outcome, SaveOutcome::Appended { region: RegionId::B, slot: 3 });
    assert_eq!(store.medium().total_erase_count(), 2);

    drop(store);
    let (_, table, _) = boot(&mut flash, config, &[0, 0, 0]);
    assert_eq!(table, vec![6, 100, 5]);
}

#[test]
fn test_round_trip_across_restarts() {
    for layout in [Layout::Plain, Layout::Generational] {
        let config = config_for(16, layout);
        let defaults = [100, 200, 300, 400, 500];
        let mut flash = RamFlash::new(config.geometry);
        let mut expected = defaults.to_vec();
        let mut rng = Lcg::new(7);

        for _ in 0..20 {
            let (mut store, mut table, _) = boot(&mut flash, config, &defaults);
            assert_eq!(table, expected, "replay diverged ({layout:?})");

            for _ in 0..rng.below(12) {
                let id = rng.below(defaults.len() as u32) as u16;
                let value = rng.next_u32() as i32;
                table[id as usize] = value;
                store.save(&table, id, value).unwrap();
                expected[id as usize] = value;
            }
        }

        let (_, table, _) = boot(&mut flash, config, &defaults);
        assert_eq!(table, expected);
        // Enough saves went through to force several swaps.
        assert!(flash.total_erase_count() >= 4);
    }
}

#[test]
fn test_generational_counter_advances() {
    let config = config_for(4, Layout::Generational);
    let mut flash = RamFlash::new(config.geometry);
    let (mut store, table, _) = boot(&mut flash, config, &[1, 2]);
    assert_eq!(store.generation(), 0);

    store.compact(&table).unwrap();
    store.compact(&table).unwrap();
    assert_eq!(store.generation(), 2);
    assert_eq!(store.active_region(), RegionId::A);

    drop(store);
    let (store, table, report) = boot(&mut flash, config, &[0, 0]);
    assert_eq!(report.replay.generation, Some(2));
    assert_eq!(store.generation(), 2);
    assert_eq!(table, vec![1, 2]);
}

#[test]
fn test_out_of_range_rejected_before_medium_access() {
    let config = config_for(4, Layout::Plain);
    let mut flash = RamFlash::new(config.geometry);
    let (mut store, table, _) = boot(&mut flash, config, &[0, 0]);

    let result = store.save(&table, 2, 1);
    assert_eq!(result, Err(KernelError::OutOfRange { param_id: 2, param_count: 2 }));
    assert!(matches!(store.save_current(&table, 9), Err(KernelError::OutOfRange { .. })));
    assert_eq!(store.medium().program_count(), 0);
}

#[test]
fn test_save_before_load_is_rejected() {
    let config = config_for(4, Layout::Plain);
    let mut store = ParamStore::new(RamFlash::new(config.geometry), config);
    assert_eq!(store.save(&[0, 0], 0, 1), Err(KernelError::NotLoaded));
}

#[test]
fn test_table_length_is_fixed_at_load() {
    let config = config_for(4, Layout::Plain);
    let mut flash = RamFlash::new(config.geometry);
    let (mut store, _, _) = boot(&mut flash, config, &[0, 0]);
    let result = store.save(&[0, 0, 0], 0, 1);
    assert_eq!(result, Err(KernelError::TableLengthMismatch { expected: 2, found: 3 }));
}

#[test]
fn test_snapshot_must_fit_region() {
    // Marker plus two records fills three slots exactly: rejected.
    let config = config_for(3, Layout::Generational);
    let mut store = ParamStore::new(RamFlash::new(config.geometry), config);
    let mut table = [0, 0];
    assert!(matches!(store.init_and_load(&mut table), Err(KernelError::InvalidGeometry(_))));
    assert!(config_for(4, Layout::Generational).validate(2).is_ok());
}

#[test]
fn test_mismatched_medium_geometry() {
    let config = config_for(4, Layout::Plain);
    let other = StoreConfig {
        geometry: Geometry::contiguous(0x2000, 4).unwrap(),
        ..config
    };
    let mut store = ParamStore::new(RamFlash::new(config.geometry), other);
    let mut table = [0];
    assert!(matches!(store.init_and_load(&mut table), Err(KernelError::InvalidGeometry(_))));
}

#[test]
fn test_overlapping_geometry_rejected() {
    let geometry = Geometry {
        region_a: 0x1000,
        region_b: 0x1008,
        region_size: 64,
    };
    assert!(geometry.validate().is_err());
    assert!(Geometry::default().validate().is_ok());
    assert_eq!(Geometry::default().slots(), 256);
}

#[test]
fn test_default_table_survives_empty_device() {
    let config = config_for(5, Layout::Plain);
    let mut flash = RamFlash::new(config.geometry);
    let defaults: Vec<i32> = (0..4).map(|i| i * 11).collect();
    let (store, table, report) = boot(&mut flash, config, &defaults);
    assert_eq!(table, defaults);
    assert_eq!(report.replay.applied, 0);
    assert_eq!(store.free_slots(), 5);
}

#[test]
fn test_plain_compaction_waits_for_full_region() {
    let config = config_for(8, Layout::Plain);
    let mut flash = RamFlash::new(config.geometry);
    let (mut store, mut table, _) = boot(&mut flash, config, &[10, 20, 30]);
    for (id, value) in [(0u16, 1), (1, 2), (2, 3)] {
        table[id as usize] = value;
        store.save(&table, id, value).unwrap();
    }

    let programs = store.medium().program_count();
    let result = store.compact(&table);
    assert_eq!(result, Err(KernelError::RegionNotFull { region: RegionId::A }));
    assert_eq!(store.medium().program_count(), programs);
    assert_eq!(store.medium().total_erase_count(), 0);
    assert_eq!(store.active_region(), RegionId::A);

    for value in 4..9 {
        table[0] = value;
        store.save(&table, 0, value).unwrap();
    }
    assert_eq!(store.free_slots(), 0);
    assert_eq!(store.compact(&table), Ok(RegionId::B));
    assert_eq!(store.medium().erase_count(RegionId::A), 1);

    drop(store);
    let (_, table, _) = boot(&mut flash, config, &[10, 20, 30]);
    assert_eq!(table, vec![8, 2, 3]);
}

/// Two short logs that neither look like a snapshot nor fill their region.
fn undecidable_device(config: StoreConfig) -> RamFlash {
    let mut flash = RamFlash::new(config.geometry);
    let geometry = config.geometry;
    flash.poke(geometry.slot_address(RegionId::A, 0), &Record::new(0, 1).encode());
    flash.poke(geometry.slot_address(RegionId::B, 0), &Record::new(0, 1).encode());
    flash.poke(geometry.slot_address(RegionId::B, 1), &Record::new(1, 2).encode());
    flash
}

#[test]
fn test_undecidable_boot_retires_b_for_good() {
    let config = config_for(8, Layout::Plain);
    let mut flash = undecidable_device(config);
    {
        let (mut store, mut table, report) = boot(&mut flash, config, &[10, 20, 30]);
        assert_eq!(report.resolution.outcome, ResolveOutcome::Ambiguous);
        assert_eq!(report.resolution.active, RegionId::A);
        assert_eq!(report.repaired, Some(RegionId::B));
        assert_eq!(table, vec![1, 20, 30]);

        // Fill A exactly; B must not come back as the full-log survivor.
        for value in 100..=106 {
            table[2] = value;
            store.save(&table, 2, value).unwrap();
        }
        assert_eq!(store.free_slots(), 0);
    }

    let (store, table, report) = boot(&mut flash, config, &[10, 20, 30]);
    assert_eq!(report.resolution.outcome, ResolveOutcome::Clean);
    assert_eq!(store.active_region(), RegionId::A);
    assert_eq!(table, vec![1, 20, 106]);
}

#[test]
fn test_stale_region_erased_before_first_write_without_repair() {
    let config = StoreConfig {
        repair_on_load: false,
        ..config_for(8, Layout::Plain)
    };
    let mut flash = undecidable_device(config);
    {
        let (mut store, mut table, report) = boot(&mut flash, config, &[10, 20, 30]);
        assert_eq!(report.resolution.outcome, ResolveOutcome::Ambiguous);
        assert_eq!(report.repaired, None);
        assert_eq!(store.stale_region(), Some(RegionId::B));
        assert_eq!(store.medium().total_erase_count(), 0);

        table[2] = 100;
        store.save(&table, 2, 100).unwrap();
        assert_eq!(store.stale_region(), None);
        assert_eq!(store.medium().erase_count(RegionId::B), 1);
        assert!(store.medium().region_bytes(RegionId::B).iter().all(|&b| b == 0xFF));

        for value in 101..=106 {
            table[2] = value;
            store.save(&table, 2, value).unwrap();
        }
    }

    let (_, table, report) = boot(&mut flash, config, &[10, 20, 30]);
    assert_eq!(report.resolution.outcome, ResolveOutcome::Clean);
    assert_eq!(report.resolution.active, RegionId::A);
    assert_eq!(table, vec![1, 20, 106]);
}

#[test]
fn test_contiguous_geometry_rejects_address_overflow() {
    assert_eq!(Geometry::contiguous(0xFFFF_FF00, 64), None);
    assert_eq!(Geometry::contiguous(0, u32::MAX), None);
    assert_eq!(Geometry::contiguous(0, 0x1000_0000), None);
    let geometry = Geometry::contiguous(0x8000_0000, 0x0400_0000).unwrap();
    assert_eq!(geometry.region_b, 0xA000_0000);
    assert!(geometry.validate().is_ok());
}
