// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! In-memory flash simulation.
//!
//! Behaves like NOR flash: programming only clears bits, a slot must be
//! erased before it is programmed, and erase works on whole regions.
//! Supports scheduled power loss (optionally tearing the interrupted
//! record), corruption injection and per-region erase counters for wear
//! checks.
//!
//! ```
//! use seesaw_kernel::config::Geometry;
//! use seesaw_kernel::storage::{Medium, RamFlash, Record};
//! use seesaw_kernel::types::RegionId;
//!
//! let geometry = Geometry::contiguous(0x1000, 4).unwrap();
//! let mut flash = RamFlash::new(geometry);
//!
//! let addr = geometry.slot_address(RegionId::A, 0);
//! flash.program_record(addr, &Record::new(0, 42).encode()).unwrap();
//! assert_eq!(flash.read_word(addr), Record::new(0, 42).encode());
//!
//! flash.erase_region(RegionId::A).unwrap();
//! assert_eq!(flash.erase_count(RegionId::A), 1);
//! ```

use std::vec::Vec;

use crate::config::{Geometry, ERASED_BYTE, ERASED_RECORD, RECORD_SIZE};
use crate::error::MediumError;
use crate::storage::medium::Medium;
use crate::storage::record::RawRecord;
use crate::types::RegionId;

/// Pattern written by [`RamFlash::inject_corruption`].
pub const CORRUPT_BYTE: u8 = 0xAA;

#[derive(Debug, Clone, Default)]
struct PowerState {
    /// Mutating operations still allowed before the supply drops.
    remaining: Option<u64>,
    /// Interrupted program leaves half a record behind.
    torn: bool,
    lost: bool,
}

#[derive(Debug, Clone)]
pub struct RamFlash {
    geometry: Geometry,
    /// Region A bytes followed by region B bytes.
    storage: Vec<u8>,
    erase_counts: [u32; 2],
    program_count: u64,
    power: PowerState,
}

impl RamFlash {
    /// Fresh device: both regions erased, no wear.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            storage: vec![ERASED_BYTE; geometry.region_size as usize * 2],
            erase_counts: [0; 2],
            program_count: 0,
            power: PowerState::default(),
        }
    }

    /// Device whose regions hold the given raw bytes.
    pub fn from_regions(geometry: Geometry, region_a: &[u8], region_b: &[u8]) -> Self {
        let mut flash = Self::new(geometry);
        let size = geometry.region_size as usize;
        let a = region_a.len().min(size);
        let b = region_b.len().min(size);
        flash.storage[..a].copy_from_slice(&region_a[..a]);
        flash.storage[size..size + b].copy_from_slice(&region_b[..b]);
        flash
    }

    pub fn region_bytes(&self, region: RegionId) -> &[u8] {
        let size = self.geometry.region_size as usize;
        let start = region.index() * size;
        &self.storage[start..start + size]
    }

    /// Raw bits of `slot` in `region`.
    pub fn slot(&self, region: RegionId, slot: u32) -> RawRecord {
        self.read_word(self.geometry.slot_address(region, slot))
    }

    pub fn erase_count(&self, region: RegionId) -> u32 {
        self.erase_counts[region.index()]
    }

    pub fn total_erase_count(&self) -> u32 {
        self.erase_counts.iter().sum()
    }

    pub fn program_count(&self) -> u64 {
        self.program_count
    }

    /// Drop the supply after `after_ops` more successful erase/program calls.
    ///
    /// The interrupted call fails with [`MediumError::PowerLost`], as does
    /// every later call until [`RamFlash::power_cycle`].
    pub fn schedule_power_loss(&mut self, after_ops: u64, torn: bool) {
        self.power = PowerState {
            remaining: Some(after_ops),
            torn,
            lost: false,
        };
    }

    /// Restore power. Contents survive, pending schedules are cleared.
    pub fn power_cycle(&mut self) {
        self.power = PowerState::default();
    }

    pub fn has_lost_power(&self) -> bool {
        self.power.lost
    }

    /// Overwrite bytes at `address` with a corrupt pattern, bypassing flash rules.
    pub fn inject_corruption(&mut self, address: u32, len: usize) {
        if let Some(offset) = self.offset_of(address) {
            let end = (offset + len).min(self.storage.len());
            self.storage[offset..end].fill(CORRUPT_BYTE);
        }
    }

    /// Overwrite a slot with arbitrary bits, bypassing flash rules.
    pub fn poke(&mut self, address: u32, bits: &RawRecord) {
        if let Some(offset) = self.offset_of(address) {
            self.storage[offset..offset + RECORD_SIZE].copy_from_slice(bits);
        }
    }

    fn offset_of(&self, address: u32) -> Option<usize> {
        let (region, offset) = self.geometry.locate(address)?;
        Some(region.index() * self.geometry.region_size as usize + offset as usize)
    }

    /// Consumes one operation from the power budget.
    /// `Ok(false)` means this operation is the one that gets interrupted.
    fn draw_power(&mut self) -> Result<bool, MediumError> {
        if self.power.lost {
            return Err(MediumError::PowerLost);
        }
        match self.power.remaining {
            Some(0) => {
                self.power.lost = true;
                Ok(false)
            }
            Some(n) => {
                self.power.remaining = Some(n - 1);
                Ok(true)
            }
            None => Ok(true),
        }
    }
}

impl Medium for RamFlash {
    fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn read_word(&self, address: u32) -> RawRecord {
        let mut buf = ERASED_RECORD;
        if let Some(offset) = self.offset_of(address) {
            let end = (offset + RECORD_SIZE).min(self.storage.len());
            buf[..end - offset].copy_from_slice(&self.storage[offset..end]);
        }
        buf
    }

    fn erase_region(&mut self, region: RegionId) -> Result<(), MediumError> {
        if !self.draw_power()? {
            return Err(MediumError::PowerLost);
        }
        let size = self.geometry.region_size as usize;
        let start = region.index() * size;
        self.storage[start..start + size].fill(ERASED_BYTE);
        self.erase_counts[region.index()] += 1;
        Ok(())
    }

    fn program_record(&mut self, address: u32, bits: &RawRecord) -> Result<(), MediumError> {
        let offset = self
            .offset_of(address)
            .ok_or(MediumError::OutOfBounds { address })?;
        if offset % RECORD_SIZE != 0 {
            return Err(MediumError::Misaligned { address });
        }
        if self.storage[offset..offset + RECORD_SIZE] != ERASED_RECORD {
            return Err(MediumError::NotErased { address });
        }

        let write_len = if self.draw_power()? {
            RECORD_SIZE
        } else if self.power.torn {
            RECORD_SIZE / 2
        } else {
            0
        };

        // Flash can only clear bits.
        for (cell, byte) in self.storage[offset..offset + write_len].iter_mut().zip(bits) {
            *cell &= *byte;
        }
        if write_len < RECORD_SIZE {
            return Err(MediumError::PowerLost);
        }
        self.program_count += 1;
        Ok(())
    }
}
