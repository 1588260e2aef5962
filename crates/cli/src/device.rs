// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Shared plumbing for commands that open a device image.

use anyhow::{bail, Context};
use clap::ValueEnum;
use seesaw_kernel::{Layout, LoadReport, ParamStore, RegionId};
use seesaw_persistence::FileFlash;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LayoutArg {
    Plain,
    Generational,
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Plain => Layout::Plain,
            LayoutArg::Generational => Layout::Generational,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RegionArg {
    A,
    B,
}

impl From<RegionArg> for RegionId {
    fn from(arg: RegionArg) -> Self {
        match arg {
            RegionArg::A => RegionId::A,
            RegionArg::B => RegionId::B,
        }
    }
}

/// A store booted from an image, with the table it replayed.
pub struct Booted {
    pub store: ParamStore<FileFlash>,
    pub table: Vec<i32>,
    pub report: LoadReport,
}

pub fn open_image(image: &Path) -> anyhow::Result<FileFlash> {
    FileFlash::open(image).with_context(|| format!("failed to open image {}", image.display()))
}

/// Opens `image` and runs startup recovery on it.
pub fn boot(image: &Path, defaults: Option<&str>, repair: bool) -> anyhow::Result<Booted> {
    let flash = open_image(image)?;
    let header = *flash.header();
    let mut table = parse_defaults(defaults, header.param_count as usize)?;

    let mut store = ParamStore::new(flash, header.config(repair));
    let report = store
        .init_and_load(&mut table)
        .context("startup load failed")?;
    Ok(Booted { store, table, report })
}

/// Default table from `--defaults`: a JSON file holding an array of
/// integers, or an inline comma-separated list. Absent means all zeros.
pub fn parse_defaults(arg: Option<&str>, count: usize) -> anyhow::Result<Vec<i32>> {
    let Some(arg) = arg else {
        return Ok(vec![0; count]);
    };

    let values: Vec<i32> = if Path::new(arg).is_file() {
        let text = std::fs::read_to_string(arg).with_context(|| format!("failed to read {arg}"))?;
        serde_json::from_str(&text).with_context(|| format!("{arg} is not a JSON array of integers"))?
    } else {
        arg.split(',')
            .map(|v| v.trim().parse::<i32>().with_context(|| format!("bad default value {v:?}")))
            .collect::<anyhow::Result<_>>()?
    };

    if values.len() != count {
        bail!("image holds {count} parameters but {} defaults were given", values.len());
    }
    Ok(values)
}

/// Parses decimal or `0x`-prefixed hex addresses.
pub fn parse_u32(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse::<u32>(),
    };
    parsed.map_err(|e| format!("invalid number {s:?}: {e}"))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
