// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Power-cut sweep on a simulated device.
//!
//! Replays one seeded workload of saves and forced compactions once per
//! medium operation, cutting power at that operation, then reboots and checks
//! that the recovered table equals either the state before the interrupted
//! operation or the state after it. The recovered device then takes enough
//! saves to swap regions again and must still agree after another reboot.

use anyhow::{anyhow, bail};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use serde::Serialize;

use crate::device::print_json;
use seesaw_kernel::resolve::ResolveOutcome;
use seesaw_kernel::storage::RamFlash;
use seesaw_kernel::{Geometry, KernelError, Layout, MediumError, ParamStore, StoreConfig};

#[derive(Debug, Clone, Copy)]
pub struct StressArgs {
    pub slots: u32,
    pub params: u16,
    pub saves: u32,
    pub seed: u64,
    pub layout: Layout,
    /// Interrupted programs leave half a record behind.
    pub torn: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct StressSummary {
    pub cut_points: u64,
    /// Recovered to the state before the interrupted save.
    pub rolled_back: u64,
    /// Recovered with the interrupted save already durable.
    pub rolled_forward: u64,
    pub clean_boots: u64,
    pub recovered_boots: u64,
    pub repairs: u64,
    /// Erases spent by the uninterrupted workload.
    pub erases: u32,
}

/// xorshift64*; enough to spread ids and values.
struct Workload(u64);

impl Workload {
    fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    fn next(&mut self) -> u64 {
        self.0 ^= self.0 >> 12;
        self.0 ^= self.0 << 25;
        self.0 ^= self.0 >> 27;
        self.0.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// One operation in six is a forced compaction.
    fn ops(args: &StressArgs) -> Vec<Op> {
        let mut rng = Self::new(args.seed);
        (0..args.saves)
            .map(|_| match rng.next() % 6 {
                0 => Op::Compact,
                _ => Op::Save((rng.next() % args.params as u64) as u16, rng.next() as i32),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Save(u16, i32),
    Compact,
}

enum Run {
    Finished,
    Cut { before: Vec<i32>, after: Vec<i32> },
}

fn execute(flash: &mut RamFlash, config: StoreConfig, defaults: &[i32], ops: &[Op]) -> anyhow::Result<Run> {
    let mut store = ParamStore::new(flash, config);
    let mut table = defaults.to_vec();
    match store.init_and_load(&mut table) {
        Ok(_) => {}
        Err(KernelError::Medium(MediumError::PowerLost)) => {
            return Ok(Run::Cut { before: table.clone(), after: table })
        }
        Err(e) => return Err(e.into()),
    }

    let mut before = table.clone();
    for &op in ops {
        let result = match op {
            Op::Save(id, value) => {
                table[id as usize] = value;
                store.save(&table, id, value).map(|_| ())
            }
            // Plain layout only swaps a full region; a refusal changes nothing.
            Op::Compact => match store.compact(&table) {
                Err(KernelError::RegionNotFull { .. }) => Ok(()),
                other => other.map(|_| ()),
            },
        };
        match result {
            Ok(()) => before = table.clone(),
            Err(KernelError::Medium(MediumError::PowerLost)) => return Ok(Run::Cut { before, after: table }),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(Run::Finished)
}

/// Saves enough values to param 0 to force a swap, then reboots and checks
/// that the recovered table is what the device reports.
fn keep_saving(flash: &mut RamFlash, config: StoreConfig, defaults: &[i32], recovered: &[i32]) -> anyhow::Result<()> {
    let slots = config.geometry.slots();
    let mut expected = recovered.to_vec();
    {
        let mut store = ParamStore::new(&mut *flash, config);
        let mut table = defaults.to_vec();
        store.init_and_load(&mut table)?;
        if table != expected {
            bail!("second boot recovered {table:?}, expected {expected:?}");
        }
        for value in 0..=slots as i32 {
            table[0] = value;
            store.save(&table, 0, value)?;
        }
        expected = table;
    }

    let mut store = ParamStore::new(flash, config);
    let mut table = defaults.to_vec();
    store.init_and_load(&mut table)?;
    if table != expected {
        bail!("after further saves recovered {table:?}, expected {expected:?}");
    }
    Ok(())
}

pub fn simulate(args: &StressArgs) -> anyhow::Result<StressSummary> {
    let geometry = Geometry::contiguous(0x0800_0000, args.slots)
        .ok_or_else(|| anyhow!("{} slots per region exceed the address space", args.slots))?;
    let config = StoreConfig {
        geometry,
        layout: args.layout,
        repair_on_load: true,
    };
    config.validate(args.params as usize)?;
    if args.params == 0 {
        bail!("at least one parameter is needed");
    }

    let defaults: Vec<i32> = (0..args.params as i32).collect();
    let ops = Workload::ops(args);
    let mut summary = StressSummary::default();

    for cut in 0.. {
        let mut flash = RamFlash::new(geometry);
        flash.schedule_power_loss(cut, args.torn);

        let (before, after) = match execute(&mut flash, config, &defaults, &ops)? {
            Run::Finished => {
                summary.erases = flash.total_erase_count();
                break;
            }
            Run::Cut { before, after } => (before, after),
        };
        summary.cut_points += 1;

        flash.power_cycle();
        let mut table = defaults.clone();
        let report = ParamStore::new(&mut flash, config).init_and_load(&mut table)?;

        match report.resolution.outcome {
            ResolveOutcome::Ambiguous => bail!("cut {cut}: could not tell the regions apart"),
            ResolveOutcome::Recovered => summary.recovered_boots += 1,
            ResolveOutcome::Fresh | ResolveOutcome::Clean => summary.clean_boots += 1,
        }
        if report.repaired.is_some() {
            summary.repairs += 1;
        }

        if table == before {
            summary.rolled_back += 1;
        } else if table == after {
            summary.rolled_forward += 1;
        } else {
            return Err(anyhow!(
                "cut {cut}: recovered {table:?}, expected {before:?} or {after:?}"
            ));
        }
        keep_saving(&mut flash, config, &defaults, &table).map_err(|e| anyhow!("cut {cut}: {e}"))?;
        tracing::debug!(cut, outcome = ?report.resolution.outcome, "cut point verified");
    }

    tracing::info!(cut_points = summary.cut_points, "power-cut sweep passed");
    Ok(summary)
}

pub fn run(args: &StressArgs, json: bool) -> anyhow::Result<()> {
    let summary = simulate(args)?;
    if json {
        return print_json(&summary);
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Cut points".to_string(), summary.cut_points.to_string()]);
    table.add_row(vec!["Rolled back".to_string(), summary.rolled_back.to_string()]);
    table.add_row(vec!["Rolled forward".to_string(), summary.rolled_forward.to_string()]);
    table.add_row(vec!["Clean boots".to_string(), summary.clean_boots.to_string()]);
    table.add_row(vec!["Recovered boots".to_string(), summary.recovered_boots.to_string()]);
    table.add_row(vec!["Repairs".to_string(), summary.repairs.to_string()]);
    table.add_row(vec!["Erases (full run)".to_string(), summary.erases.to_string()]);
    println!("{table}");
    println!("All {} power cuts recovered consistently.\n", summary.cut_points);
    Ok(())
}
