// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use serde::Serialize;

use crate::device::{open_image, print_json};
use seesaw_kernel::region::{survey_region, RegionSurvey};
use seesaw_kernel::resolve::{resolve_active_region, Resolution};
use seesaw_kernel::RegionId;
use seesaw_persistence::ImageHeader;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub header: ImageHeader,
    pub created: String,
    pub regions: Vec<RegionSurvey>,
    /// What a load would pick. Nothing is written while inspecting.
    pub resolution: Resolution,
}

pub fn report(image: &Path) -> anyhow::Result<InspectReport> {
    let flash = open_image(image)?;
    let header = *flash.header();
    let params = header.param_count as usize;

    let regions = RegionId::BOTH
        .iter()
        .map(|&region| survey_region(&flash, region, params, header.layout))
        .collect();
    let resolution = resolve_active_region(&flash, params, header.layout);

    Ok(InspectReport {
        header,
        created: chrono::DateTime::from_timestamp(header.created_at as i64, 0)
            .unwrap_or_default()
            .to_rfc3339(),
        regions,
        resolution,
    })
}

pub fn run(image: &Path, json: bool) -> anyhow::Result<()> {
    let report = report(image)?;
    if json {
        return print_json(&report);
    }

    let h = &report.header;
    println!("\nDevice Image {}", image.display());
    println!("--------------------");
    println!("Version:    {}", h.version);
    println!("Created:    {}", report.created);
    println!("Params:     {}", h.param_count);
    println!("Layout:     {:?}", h.layout);
    println!(
        "Regions:    A @ {:#010x}, B @ {:#010x}, {} bytes each",
        h.geometry.region_a, h.geometry.region_b, h.geometry.region_size
    );

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Region", "Role", "Used", "Valid", "Corrupt", "Free", "Generation", "Snapshot"]);

    let r = &report.resolution;
    for survey in &report.regions {
        let role = if survey.region == r.active && !survey.is_erased() {
            "ACTIVE"
        } else if Some(survey.region) == r.stale {
            "STALE"
        } else if survey.is_erased() {
            "ERASED"
        } else {
            "UNRESOLVED"
        };
        table.add_row(vec![
            survey.region.to_string(),
            role.to_string(),
            format!("{}/{}", survey.used_slots, survey.capacity),
            survey.valid.to_string(),
            survey.corrupt.to_string(),
            survey.free_slots().to_string(),
            survey.generation.map_or_else(|| "-".to_string(), |g| g.to_string()),
            if survey.snapshot_complete { "complete" } else { "-" }.to_string(),
        ]);
    }
    println!("{table}");
    println!("Resolution: {:?}, active region {}\n", r.outcome, r.active);
    Ok(())
}
