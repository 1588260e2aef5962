// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use serde::Serialize;

use crate::device::{open_image, print_json};
use seesaw_kernel::region::scan_slots;
use seesaw_kernel::storage::{Medium, SlotState};
use seesaw_kernel::RegionId;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotRow {
    pub region: RegionId,
    pub slot: u32,
    pub address: u32,
    pub raw: String,
    pub state: String,
}

fn describe(state: &SlotState) -> String {
    match state {
        SlotState::Erased => "erased".to_string(),
        SlotState::Valid(record) => format!("param {} = {}", record.param_id, record.value),
        SlotState::Generation(g) => format!("generation {g}"),
        SlotState::Corrupt => "corrupt".to_string(),
    }
}

/// Slots of `region` (both when `None`). The erased tail is skipped unless `all`.
pub fn slots(image: &Path, region: Option<RegionId>, all: bool) -> anyhow::Result<Vec<SlotRow>> {
    let flash = open_image(image)?;
    let params = flash.header().param_count as usize;
    let geometry = flash.geometry();
    let regions = match region {
        Some(r) => vec![r],
        None => RegionId::BOTH.to_vec(),
    };

    let mut rows = Vec::new();
    for region in regions {
        for (slot, state) in scan_slots(&flash, region, params) {
            if state.is_erased() && !all {
                break;
            }
            let address = geometry.slot_address(region, slot);
            let raw = flash.read_word(address);
            rows.push(SlotRow {
                region,
                slot,
                address,
                raw: raw.iter().map(|b| format!("{b:02x}")).collect(),
                state: describe(&state),
            });
        }
    }
    Ok(rows)
}

pub fn run(image: &Path, region: Option<RegionId>, all: bool, json: bool) -> anyhow::Result<()> {
    let rows = slots(image, region, all)?;
    if json {
        return print_json(&rows);
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Region", "Slot", "Address", "Raw", "Contents"]);
    for row in &rows {
        table.add_row(vec![
            row.region.to_string(),
            row.slot.to_string(),
            format!("{:#010x}", row.address),
            row.raw.clone(),
            row.state.clone(),
        ]);
    }
    println!("{table}");
    println!("{} slots shown\n", rows.len());
    Ok(())
}
