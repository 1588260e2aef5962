// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use anyhow::Context;
use seesaw_kernel::RegionId;

use crate::device::boot;
use std::path::Path;

/// Forces a swap: snapshots the live table into the other region.
pub fn compact(image: &Path, defaults: Option<&str>) -> anyhow::Result<RegionId> {
    let mut booted = boot(image, defaults, true)?;
    let from = booted.store.active_region();
    let to = booted.store.compact(&booted.table).context("compaction failed")?;
    tracing::info!(%from, %to, generation = booted.store.generation(), "manual compaction");
    Ok(to)
}

pub fn run(image: &Path, defaults: Option<&str>) -> anyhow::Result<()> {
    let region = compact(image, defaults)?;
    println!("Compacted into region {region}");
    Ok(())
}
