// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use clap::{Parser, Subcommand};
use seesaw_cli::commands::{compact, dump, format, inspect, load, save, stress};
use seesaw_cli::device::{parse_u32, LayoutArg, RegionArg};
use seesaw_cli::telemetry;
use seesaw_kernel::config::{DEFAULT_REGION_A, DEFAULT_REGION_B, DEFAULT_REGION_SIZE};
use seesaw_kernel::Geometry;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "seesaw")]
#[command(about = "Seesaw - wear-leveled parameter storage on ping-pong flash regions", long_about = None)]
struct Cli {
    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fresh device image with both regions erased.
    Format {
        image: PathBuf,

        /// Number of parameters in the table.
        #[arg(long, short)]
        params: u16,

        #[arg(long, value_enum, default_value_t = LayoutArg::Plain)]
        layout: LayoutArg,

        #[arg(long, value_parser = parse_u32, default_value_t = DEFAULT_REGION_A)]
        region_a: u32,

        #[arg(long, value_parser = parse_u32, default_value_t = DEFAULT_REGION_B)]
        region_b: u32,

        #[arg(long, value_parser = parse_u32, default_value_t = DEFAULT_REGION_SIZE)]
        region_size: u32,

        /// Overwrite an existing image.
        #[arg(long)]
        force: bool,
    },
    /// Show header, region usage and which region a load would pick.
    Inspect {
        image: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// List raw slots of one or both regions.
    Dump {
        image: PathBuf,
        #[arg(long, value_enum)]
        region: Option<RegionArg>,
        /// Include the erased tail.
        #[arg(long)]
        all: bool,
        #[arg(long)]
        json: bool,
    },
    /// Run startup recovery and print the parameter table.
    Load {
        image: PathBuf,
        /// JSON file with an array of defaults, or a comma-separated list.
        #[arg(long, short)]
        defaults: Option<String>,
        /// Leave a stale region in place instead of erasing it.
        #[arg(long)]
        no_repair: bool,
        #[arg(long)]
        json: bool,
    },
    /// Persist one parameter value.
    Save {
        image: PathBuf,
        param_id: u16,
        #[arg(allow_hyphen_values = true)]
        value: i32,
        #[arg(long, short)]
        defaults: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Force a snapshot into the other region (plain layout: only once the active region is full).
    Compact {
        image: PathBuf,
        #[arg(long, short)]
        defaults: Option<String>,
    },
    /// Cut power at every medium operation of a random workload and verify recovery.
    Stress {
        #[arg(long, default_value_t = 16)]
        slots: u32,
        #[arg(long, default_value_t = 4)]
        params: u16,
        #[arg(long, default_value_t = 64)]
        saves: u32,
        #[arg(long, default_value_t = 1)]
        seed: u64,
        #[arg(long, value_enum, default_value_t = LayoutArg::Plain)]
        layout: LayoutArg,
        /// Interrupted programs leave half a record behind.
        #[arg(long)]
        torn: bool,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_logging(cli.verbose);

    match cli.command {
        Commands::Format {
            image,
            params,
            layout,
            region_a,
            region_b,
            region_size,
            force,
        } => format::run(
            &image,
            &format::FormatArgs {
                params,
                layout: layout.into(),
                geometry: Geometry {
                    region_a,
                    region_b,
                    region_size,
                },
                force,
            },
        ),
        Commands::Inspect { image, json } => inspect::run(&image, json),
        Commands::Dump {
            image,
            region,
            all,
            json,
        } => dump::run(&image, region.map(Into::into), all, json),
        Commands::Load {
            image,
            defaults,
            no_repair,
            json,
        } => load::run(&image, defaults.as_deref(), !no_repair, json),
        Commands::Save {
            image,
            param_id,
            value,
            defaults,
            json,
        } => save::run(&image, defaults.as_deref(), param_id, value, json),
        Commands::Compact { image, defaults } => compact::run(&image, defaults.as_deref()),
        Commands::Stress {
            slots,
            params,
            saves,
            seed,
            layout,
            torn,
            json,
        } => stress::run(
            &stress::StressArgs {
                slots,
                params,
                saves,
                seed,
                layout: layout.into(),
                torn,
            },
            json,
        ),
    }
}
