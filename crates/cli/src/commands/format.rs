// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use anyhow::bail;
use seesaw_kernel::{Geometry, Layout};
use seesaw_persistence::{FileFlash, ImageHeader};
use std::path::Path;

pub struct FormatArgs {
    pub params: u16,
    pub layout: Layout,
    pub geometry: Geometry,
    /// Overwrite an existing image.
    pub force: bool,
}

pub fn run(image: &Path, args: &FormatArgs) -> anyhow::Result<()> {
    if image.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", image.display());
    }

    let created_at = chrono::Utc::now().timestamp().max(0) as u64;
    let header = ImageHeader::new(args.geometry, args.layout, args.params, created_at);
    let flash = FileFlash::create(image, header)?;

    tracing::info!(
        image = %image.display(),
        params = args.params,
        layout = ?args.layout,
        slots = args.geometry.slots(),
        "formatted device image"
    );
    println!(
        "Formatted {}: {} parameters, {:?} layout, 2 x {} slots ({} bytes per region)",
        image.display(),
        flash.header().param_count,
        flash.header().layout,
        args.geometry.slots(),
        args.geometry.region_size,
    );
    Ok(())
}
