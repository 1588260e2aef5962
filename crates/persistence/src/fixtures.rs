// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Ready-made device images for tests and demos.

use crate::error::Result;
use crate::file::FileFlash;
use crate::image::ImageHeader;
use seesaw_kernel::config::RECORD_SIZE;
use seesaw_kernel::storage::{Medium, RamFlash};
use seesaw_kernel::{Geometry, KernelError, Layout, MediumError, ParamStore, RegionId};

use std::fs;
use std::path::{Path, PathBuf};

/// Defaults every fixture boots with.
pub const FIXTURE_DEFAULTS: [i32; 4] = [100, 200, 300, 400];

/// Slots per region in fixture images.
pub const FIXTURE_SLOTS: u32 = 8;

pub struct TestPaths {
    /// Image that went through one compaction and has room left.
    pub clean: PathBuf,
    /// Table `clean` replays to.
    pub clean_table: Vec<i32>,
    /// Image cut off between writing a snapshot and retiring the old log.
    pub interrupted: PathBuf,
    /// Table `interrupted` replays to.
    pub interrupted_table: Vec<i32>,
}

pub fn fixture_header(layout: Layout) -> ImageHeader {
    ImageHeader::new(
        Geometry {
            region_a: 0x0803_F000,
            region_b: 0x0803_F000 + FIXTURE_SLOTS * RECORD_SIZE as u32,
            region_size: FIXTURE_SLOTS * RECORD_SIZE as u32,
        },
        layout,
        FIXTURE_DEFAULTS.len() as u16,
        1_700_000_000,
    )
}

/// Boots a store over `flash` and applies `saves`. Returns the final table.
pub fn apply_saves<M: Medium>(
    store: &mut ParamStore<M>,
    defaults: &[i32],
    saves: &[(u16, i32)],
) -> std::result::Result<Vec<i32>, KernelError> {
    let mut table = defaults.to_vec();
    store.init_and_load(&mut table)?;
    for &(id, value) in saves {
        if let Some(slot) = table.get_mut(id as usize) {
            *slot = value;
        }
        store.save(&table, id, value)?;
    }
    Ok(table)
}

pub fn generate_test_scenario(dir: &Path) -> Result<TestPaths> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    let header = fixture_header(Layout::Plain);
    let config = header.config(true);

    // 1. clean.img: ten saves on eight slots forces one swap.
    let clean = dir.join("clean.img");
    let saves: Vec<(u16, i32)> = (0..10).map(|i| ((i % 4) as u16, 1000 + i as i32)).collect();
    let clean_table = {
        let flash = FileFlash::create(&clean, header)?;
        let mut store = ParamStore::new(flash, config);
        apply_saves(&mut store, &FIXTURE_DEFAULTS, &saves)?
    };

    // 2. interrupted.img: fill A, then cut power right before A is erased.
    let interrupted = dir.join("interrupted.img");
    let mut ram = RamFlash::new(header.geometry);
    let fill: Vec<(u16, i32)> = (0..FIXTURE_SLOTS).map(|i| ((i % 4) as u16, -(i as i32))).collect();
    let mut interrupted_table = {
        let mut store = ParamStore::new(&mut ram, config);
        apply_saves(&mut store, &FIXTURE_DEFAULTS, &fill)?
    };
    // Erase B, four snapshot records, then the erase of A never happens.
    ram.schedule_power_loss(1 + FIXTURE_DEFAULTS.len() as u64, false);
    interrupted_table[3] = 4242;
    {
        let mut store = ParamStore::new(&mut ram, config);
        let mut table = FIXTURE_DEFAULTS.to_vec();
        store.init_and_load(&mut table)?;
        match store.save(&interrupted_table, 3, 4242) {
            Err(KernelError::Medium(MediumError::PowerLost)) => {}
            Err(e) => return Err(e.into()),
            Ok(_) => tracing::warn!("fixture save completed without a power cut"),
        }
    }
    ram.power_cycle();
    FileFlash::create_with_regions(
        &interrupted,
        header,
        ram.region_bytes(RegionId::A),
        ram.region_bytes(RegionId::B),
    )?;

    Ok(TestPaths {
        clean,
        clean_table,
        interrupted,
        interrupted_table,
    })
}
