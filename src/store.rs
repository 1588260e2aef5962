// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Parameter store: the caller-facing surface.
//!
//! Owns the medium handle and the active-region pointer. The parameter
//! table itself stays with the caller; the store writes into it only
//! during [`ParamStore::init_and_load`] and reads it only to build a
//! compaction snapshot.

use crate::append::append;
use crate::compact::{compact, PendingSave};
use crate::config::{Layout, StoreConfig};
use crate::error::{KernelError, KernelResult};
use crate::region::first_free_slot;
use crate::replay::{replay, ReplayStats};
use crate::resolve::{resolve_active_region, Resolution};
use crate::storage::{Medium, Record};
use crate::types::RegionId;

/// What startup found and did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadReport {
    pub resolution: Resolution,
    pub replay: ReplayStats,
    /// Region erased to finish an interrupted compaction.
    pub repaired: Option<RegionId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SaveOutcome {
    /// One record programmed into the active region.
    Appended { region: RegionId, slot: u32 },
    /// The active region was full; the value went out with a fresh snapshot.
    Compacted { region: RegionId, generation: u32 },
}

#[derive(Debug)]
pub struct ParamStore<M> {
    medium: M,
    config: StoreConfig,
    active: RegionId,
    generation: u32,
    /// Table length fixed by `init_and_load`, `None` before it ran.
    param_count: Option<usize>,
    /// Losing region left in place by a load without repair. Erased before
    /// the next write.
    stale: Option<RegionId>,
}

impl<M: Medium> ParamStore<M> {
    pub fn new(medium: M, config: StoreConfig) -> Self {
        Self {
            medium,
            config,
            active: RegionId::A,
            generation: 0,
            param_count: None,
            stale: None,
        }
    }

    /// Resolves the active region and replays its log into `table`.
    ///
    /// `table` must already hold the factory defaults; entries never logged
    /// keep them. Must run exactly once before any save.
    pub fn init_and_load(&mut self, table: &mut [i32]) -> KernelResult<LoadReport> {
        self.config.validate(table.len())?;
        if self.medium.geometry() != self.config.geometry {
            return Err(KernelError::InvalidGeometry("medium geometry differs from store config"));
        }

        let resolution = resolve_active_region(&self.medium, table.len(), self.config.layout);

        let mut repaired = None;
        self.stale = None;
        if let Some(stale) = resolution.stale {
            if self.config.repair_on_load {
                tracing::warn!(region = %stale, "erasing leftover of interrupted compaction");
                self.medium.erase_region(stale)?;
                repaired = Some(stale);
            } else {
                self.stale = Some(stale);
            }
        }

        let stats = replay(&self.medium, resolution.active, table);

        self.active = resolution.active;
        self.generation = stats.generation.unwrap_or(0);
        self.param_count = Some(table.len());

        tracing::info!(
            active = %self.active,
            outcome = ?resolution.outcome,
            applied = stats.applied,
            corrupt = stats.corrupt,
            "parameters loaded"
        );

        Ok(LoadReport {
            resolution,
            replay: stats,
            repaired,
        })
    }

    /// Persists `value` for `param_id`.
    ///
    /// The common path programs one record. When the active region is full
    /// the store compacts instead: the snapshot is built from `table` with
    /// `value` overlaid for `param_id`, which persists the save without a
    /// second record.
    pub fn save(&mut self, table: &[i32], param_id: u16, value: i32) -> KernelResult<SaveOutcome> {
        let param_count = self.check_table(table)?;
        if param_id as usize >= param_count {
            return Err(KernelError::OutOfRange { param_id, param_count });
        }
        self.retire_stale()?;

        match append(&mut self.medium, self.active, Record::new(param_id, value)) {
            Ok(slot) => Ok(SaveOutcome::Appended {
                region: self.active,
                slot,
            }),
            Err(KernelError::RegionFull { region }) => {
                tracing::info!(%region, "active region full, compacting");
                let pending = PendingSave { param_id, value };
                self.swap(table, Some(pending))?;
                Ok(SaveOutcome::Compacted {
                    region: self.active,
                    generation: self.generation,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Persists the value the caller already placed in `table[param_id]`.
    pub fn save_current(&mut self, table: &[i32], param_id: u16) -> KernelResult<SaveOutcome> {
        let param_count = self.check_table(table)?;
        let value = *table
            .get(param_id as usize)
            .ok_or(KernelError::OutOfRange { param_id, param_count })?;
        self.save(table, param_id, value)
    }

    /// Rewrites `table` into the other region on demand.
    ///
    /// The generational layout compacts at any fill level. The plain layout
    /// has no marker to tell an interrupted swap apart from a short log, so
    /// it only swaps out a full region and returns
    /// [`KernelError::RegionNotFull`] otherwise, leaving the medium untouched.
    pub fn compact(&mut self, table: &[i32]) -> KernelResult<RegionId> {
        self.check_table(table)?;
        if self.config.layout == Layout::Plain && first_free_slot(&self.medium, self.active).is_some() {
            return Err(KernelError::RegionNotFull { region: self.active });
        }
        self.retire_stale()?;
        self.swap(table, None)?;
        Ok(self.active)
    }

    /// Finishes the interrupted compaction a load without repair left behind.
    fn retire_stale(&mut self) -> KernelResult<()> {
        if let Some(stale) = self.stale {
            tracing::warn!(region = %stale, "erasing stale region before first write");
            self.medium.erase_region(stale)?;
            self.stale = None;
        }
        Ok(())
    }

    fn swap(&mut self, table: &[i32], pending: Option<PendingSave>) -> KernelResult<()> {
        let done = compact(
            &mut self.medium,
            self.active,
            table,
            self.config.layout,
            self.generation,
            pending,
        )?;
        self.active = done.target;
        self.generation = done.generation;
        Ok(())
    }

    fn check_table(&self, table: &[i32]) -> KernelResult<usize> {
        let expected = self.param_count.ok_or(KernelError::NotLoaded)?;
        if table.len() != expected {
            return Err(KernelError::TableLengthMismatch {
                expected,
                found: table.len(),
            });
        }
        Ok(expected)
    }

    pub fn active_region(&self) -> RegionId {
        self.active
    }

    /// Compactions seen by this region lineage (generational layout) or
    /// since startup (plain layout).
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Region still awaiting the erase a load without repair deferred.
    pub fn stale_region(&self) -> Option<RegionId> {
        self.stale
    }

    pub fn param_count(&self) -> Option<usize> {
        self.param_count
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Erased slots left in the active region.
    pub fn free_slots(&self) -> u32 {
        let slots = self.medium.geometry().slots();
        first_free_slot(&self.medium, self.active).map_or(0, |first| slots - first)
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    pub fn medium_mut(&mut self) -> &mut M {
        &mut self.medium
    }

    pub fn into_medium(self) -> M {
        self.medium
    }
}
