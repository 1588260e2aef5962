// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use anyhow::Context;
use seesaw_kernel::SaveOutcome;

use crate::device::{boot, print_json};
use std::path::Path;

pub fn save(image: &Path, defaults: Option<&str>, param_id: u16, value: i32) -> anyhow::Result<SaveOutcome> {
    let mut booted = boot(image, defaults, true)?;
    if let Some(slot) = booted.table.get_mut(param_id as usize) {
        *slot = value;
    }
    let outcome = booted
        .store
        .save(&booted.table, param_id, value)
        .with_context(|| format!("failed to save parameter {param_id}"))?;
    tracing::info!(param_id, value, ?outcome, "parameter saved");
    Ok(outcome)
}

pub fn run(image: &Path, defaults: Option<&str>, param_id: u16, value: i32, json: bool) -> anyhow::Result<()> {
    let outcome = save(image, defaults, param_id, value)?;
    if json {
        return print_json(&outcome);
    }
    match outcome {
        SaveOutcome::Appended { region, slot } => {
            println!("param {param_id} = {value}: appended to region {region}, slot {slot}")
        }
        SaveOutcome::Compacted { region, generation } => println!(
            "param {param_id} = {value}: region full, compacted into region {region} (generation {generation})"
        ),
    }
    Ok(())
}
