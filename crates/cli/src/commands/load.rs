// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use serde::Serialize;

use crate::device::{boot, print_json};
use seesaw_kernel::LoadReport;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LoadSummary {
    pub report: LoadReport,
    pub table: Vec<i32>,
    pub free_slots: u32,
}

/// Runs startup recovery on the image, repairing it unless `repair` is off.
pub fn load(image: &Path, defaults: Option<&str>, repair: bool) -> anyhow::Result<LoadSummary> {
    let booted = boot(image, defaults, repair)?;
    Ok(LoadSummary {
        report: booted.report,
        free_slots: booted.store.free_slots(),
        table: booted.table,
    })
}

pub fn run(image: &Path, defaults: Option<&str>, repair: bool, json: bool) -> anyhow::Result<()> {
    let summary = load(image, defaults, repair)?;
    if json {
        return print_json(&summary);
    }

    let report = &summary.report;
    println!("\nActive region: {} ({:?})", report.resolution.active, report.resolution.outcome);
    if let Some(region) = report.repaired {
        println!("Repaired:      erased stale region {region}");
    } else if let Some(region) = report.resolution.stale {
        println!("Stale:         region {region} left in place until the next write");
    }
    println!(
        "Replayed:      {} records ({} corrupt skipped), {} slots free",
        report.replay.applied, report.replay.corrupt, summary.free_slots
    );

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Param", "Value"]);
    for (id, value) in summary.table.iter().enumerate() {
        table.add_row(vec![id.to_string(), value.to_string()]);
    }
    println!("{table}\n");
    Ok(())
}
