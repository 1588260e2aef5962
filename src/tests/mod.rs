#[cfg(test)]
// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod codec_tests;
pub mod replay_tests;
pub mod store_tests;

use std::vec::Vec;

use crate::config::{Geometry, Layout, StoreConfig};
use crate::region::scan_slots;
use crate::storage::{RamFlash, SlotState};
use crate::store::{LoadReport, ParamStore};
use crate::types::RegionId;

pub(crate) const BASE: u32 = 0x0800_0000;

pub(crate) fn config_for(slots: u32, layout: Layout) -> StoreConfig {
    StoreConfig {
        geometry: Geometry::contiguous(BASE, slots).unwrap(),
        layout,
        repair_on_load: true,
    }
}

/// Simulated startup: fresh table from `defaults`, resolve and replay.
pub(crate) fn boot<'a>(
    flash: &'a mut RamFlash,
    config: StoreConfig,
    defaults: &[i32],
) -> (ParamStore<&'a mut RamFlash>, Vec<i32>, LoadReport) {
    let mut table = defaults.to_vec();
    let mut store = ParamStore::new(flash, config);
    let report = store.init_and_load(&mut table).unwrap();
    (store, table, report)
}

/// Decoded state of every slot in `region`.
pub(crate) fn slots(flash: &RamFlash, region: RegionId, param_count: usize) -> Vec<SlotState> {
    scan_slots(flash, region, param_count).map(|(_, state)| state).collect()
}

/// Small deterministic generator for workloads.
pub(crate) struct Lcg(u64);

impl Lcg {
    pub(crate) fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub(crate) fn next_u32(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }

    pub(crate) fn below(&mut self, n: u32) -> u32 {
        self.next_u32() % n
    }
}
