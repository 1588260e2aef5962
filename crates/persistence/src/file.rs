// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Memory-mapped device image.
//!
//! [`FileFlash`] implements the kernel's `Medium` over an image file, with
//! the same NOR rules as the in-memory simulator. Every erase and program is
//! flushed before it returns, so the file always reflects the last completed
//! operation and a killed process leaves a usable image behind.

use crate::error::{PersistenceError, Result};
use crate::image::ImageHeader;
use memmap2::{MmapMut, MmapOptions};
use seesaw_kernel::config::{ERASED_BYTE, ERASED_RECORD, RECORD_SIZE};
use seesaw_kernel::storage::{Medium, RamFlash, RawRecord};
use seesaw_kernel::{Geometry, MediumError, RegionId};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

pub struct FileFlash {
    header: ImageHeader,
    map: MmapMut,
}

impl FileFlash {
    /// Writes a fresh image with both regions erased.
    pub fn create(path: impl AsRef<Path>, header: ImageHeader) -> Result<Self> {
        let erased = vec![ERASED_BYTE; header.geometry.region_size as usize];
        Self::create_with_regions(path, header, &erased, &erased)
    }

    /// Writes an image from existing region contents, e.g. a captured RamFlash.
    pub fn create_with_regions(
        path: impl AsRef<Path>,
        header: ImageHeader,
        region_a: &[u8],
        region_b: &[u8],
    ) -> Result<Self> {
        header.config(true).validate(header.param_count as usize)?;
        let size = header.geometry.region_size as usize;
        if region_a.len() != size || region_b.len() != size {
            return Err(PersistenceError::InvalidFormat(format!(
                "region contents must be {size} bytes each"
            )));
        }

        let mut file = File::create(path.as_ref())?;
        file.write_all(&header.to_bytes())?;
        file.write_all(region_a)?;
        file.write_all(region_b)?;
        file.sync_data()?;
        drop(file);

        tracing::debug!(path = %path.as_ref().display(), bytes = header.image_len(), "image written");
        Self::open(path)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut file = OpenOptions::new().read(true).write(true).open(path.as_ref())?;
        let header = ImageHeader::read_from(&mut file)?;

        let len = file.metadata()?.len();
        if len != header.image_len() {
            return Err(PersistenceError::InvalidFormat(format!(
                "image is {len} bytes, header describes {}",
                header.image_len()
            )));
        }

        // SAFETY: the mapping is private to this process for the lifetime of
        // the FileFlash; concurrent writers to the same image are not supported.
        let map = unsafe { MmapOptions::new().map_mut(&file)? };
        Ok(Self { header, map })
    }

    pub fn header(&self) -> &ImageHeader {
        &self.header
    }

    pub fn region_bytes(&self, region: RegionId) -> &[u8] {
        let start = self.region_start(region);
        &self.map[start..start + self.header.geometry.region_size as usize]
    }

    /// Copies the image contents into a simulator for dry runs.
    pub fn to_ram(&self) -> RamFlash {
        RamFlash::from_regions(
            self.header.geometry,
            self.region_bytes(RegionId::A),
            self.region_bytes(RegionId::B),
        )
    }

    fn region_start(&self, region: RegionId) -> usize {
        ImageHeader::SIZE + region.index() * self.header.geometry.region_size as usize
    }

    fn offset_of(&self, address: u32) -> Option<usize> {
        let (region, offset) = self.header.geometry.locate(address)?;
        Some(self.region_start(region) + offset as usize)
    }
}

impl Medium for FileFlash {
    fn geometry(&self) -> Geometry {
        self.header.geometry
    }

    fn read_word(&self, address: u32) -> RawRecord {
        let mut buf = ERASED_RECORD;
        if let Some(offset) = self.offset_of(address) {
            let end = (offset + RECORD_SIZE).min(self.map.len());
            buf[..end - offset].copy_from_slice(&self.map[offset..end]);
        }
        buf
    }

    fn erase_region(&mut self, region: RegionId) -> std::result::Result<(), MediumError> {
        let start = self.region_start(region);
        let size = self.header.geometry.region_size as usize;
        self.map[start..start + size].fill(ERASED_BYTE);
        self.map.flush_range(start, size).map_err(|e| {
            tracing::error!(%region, error = %e, "erase did not reach the image");
            MediumError::EraseFailed { region }
        })
    }

    fn program_record(&mut self, address: u32, bits: &RawRecord) -> std::result::Result<(), MediumError> {
        let offset = self
            .offset_of(address)
            .ok_or(MediumError::OutOfBounds { address })?;
        if (offset - ImageHeader::SIZE) % RECORD_SIZE != 0 {
            return Err(MediumError::Misaligned { address });
        }
        let slot = &mut self.map[offset..offset + RECORD_SIZE];
        if *slot != ERASED_RECORD {
            return Err(MediumError::NotErased { address });
        }
        for (cell, byte) in slot.iter_mut().zip(bits) {
            *cell &= *byte;
        }
        self.map.flush_range(offset, RECORD_SIZE).map_err(|e| {
            tracing::error!(address = format_args!("{address:#010x}"), error = %e, "program did not reach the image");
            MediumError::ProgramFailed { address }
        })
    }
}
