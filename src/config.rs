// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Configuration constants and store geometry.

use crate::error::{KernelError, KernelResult};
use crate::types::RegionId;

/// Size in bytes of one record slot (one double word).
pub const RECORD_SIZE: usize = 8;

/// Sentinel stored in the last two bytes of every completed record.
pub const RECORD_TAG: u16 = 0xA55A;

/// Byte value of an erased flash cell.
pub const ERASED_BYTE: u8 = 0xFF;

/// Bit pattern of a fully erased slot.
pub const ERASED_RECORD: [u8; RECORD_SIZE] = [ERASED_BYTE; RECORD_SIZE];

/// Parameter ids at or above this value are reserved for marker records.
pub const RESERVED_ID_BASE: u16 = 0xFFF0;

/// Marker id carrying the region generation (generational layout only).
pub const GENERATION_MARKER_ID: u16 = RESERVED_ID_BASE;

/// Largest parameter table the record format can address.
pub const MAX_PARAMS: usize = RESERVED_ID_BASE as usize;

/// Default region A base: second-to-last 2 KB page of a 256 KB STM32G4.
pub const DEFAULT_REGION_A: u32 = 0x0803_F000;

/// Default region B base: last 2 KB page of a 256 KB STM32G4.
pub const DEFAULT_REGION_B: u32 = 0x0803_F800;

/// Default region (page) size in bytes.
pub const DEFAULT_REGION_SIZE: u32 = 2048;

/// Physical placement of the two ping-pong regions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Geometry {
    pub region_a: u32,
    pub region_b: u32,
    pub region_size: u32,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            region_a: DEFAULT_REGION_A,
            region_b: DEFAULT_REGION_B,
            region_size: DEFAULT_REGION_SIZE,
        }
    }
}

impl Geometry {
    /// Two adjacent regions of `slots` records each, starting at `base`.
    /// `None` when region B would not fit in the 32-bit address space.
    pub const fn contiguous(base: u32, slots: u32) -> Option<Self> {
        let Some(region_size) = slots.checked_mul(RECORD_SIZE as u32) else {
            return None;
        };
        let Some(region_b) = base.checked_add(region_size) else {
            return None;
        };
        if region_b.checked_add(region_size).is_none() {
            return None;
        }
        Some(Self {
            region_a: base,
            region_b,
            region_size,
        })
    }

    /// Number of record slots per region.
    pub const fn slots(&self) -> u32 {
        self.region_size / RECORD_SIZE as u32
    }

    pub const fn base(&self, region: RegionId) -> u32 {
        match region {
            RegionId::A => self.region_a,
            RegionId::B => self.region_b,
        }
    }

    /// Absolute address of `slot` inside `region`.
    pub const fn slot_address(&self, region: RegionId, slot: u32) -> u32 {
        self.base(region) + slot * RECORD_SIZE as u32
    }

    /// Maps an absolute address back to `(region, byte offset)`.
    pub fn locate(&self, address: u32) -> Option<(RegionId, u32)> {
        for region in RegionId::BOTH {
            let base = self.base(region);
            if address >= base && address - base < self.region_size {
                return Some((region, address - base));
            }
        }
        None
    }

    pub fn validate(&self) -> KernelResult<()> {
        let record = RECORD_SIZE as u32;
        if self.region_size == 0 || self.region_size % record != 0 {
            return Err(KernelError::InvalidGeometry("region size must be a non-zero multiple of the record size"));
        }
        if self.region_a % record != 0 || self.region_b % record != 0 {
            return Err(KernelError::InvalidGeometry("region bases must be record aligned"));
        }
        let (lo, hi) = if self.region_a <= self.region_b {
            (self.region_a, self.region_b)
        } else {
            (self.region_b, self.region_a)
        };
        match lo.checked_add(self.region_size) {
            Some(end) if end <= hi => {}
            _ => return Err(KernelError::InvalidGeometry("regions overlap")),
        }
        if hi.checked_add(self.region_size).is_none() {
            return Err(KernelError::InvalidGeometry("region exceeds the address space"));
        }
        Ok(())
    }
}

/// On-medium layout of compacted regions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Layout {
    /// Flat records only. A compacted region starts directly with the snapshot.
    #[default]
    Plain,
    /// A compacted region starts with a generation marker, then the snapshot.
    Generational,
}

impl Layout {
    /// Slots a compacted region spends before the first snapshot record.
    pub const fn snapshot_offset(&self) -> u32 {
        match self {
            Layout::Plain => 0,
            Layout::Generational => 1,
        }
    }

    pub const fn as_u8(&self) -> u8 {
        match self {
            Layout::Plain => 0,
            Layout::Generational => 1,
        }
    }

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Layout::Plain),
            1 => Some(Layout::Generational),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoreConfig {
    pub geometry: Geometry,
    pub layout: Layout,
    /// Erase the losing region when startup finds an interrupted compaction.
    pub repair_on_load: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            geometry: Geometry::default(),
            layout: Layout::Plain,
            repair_on_load: true,
        }
    }
}

impl StoreConfig {
    /// Checks the geometry and that a full snapshot of `param_count` values
    /// fits a region with at least one slot to spare.
    ///
    /// A snapshot that fills its region exactly would be indistinguishable
    /// from a full log after an interrupted compaction.
    pub fn validate(&self, param_count: usize) -> KernelResult<()> {
        self.geometry.validate()?;
        if param_count > MAX_PARAMS {
            return Err(KernelError::TooManyParams { count: param_count });
        }
        let needed = param_count as u64 + self.layout.snapshot_offset() as u64;
        if needed >= self.geometry.slots() as u64 {
            return Err(KernelError::InvalidGeometry("a full snapshot must leave a free slot in its region"));
        }
        Ok(())
    }
}
