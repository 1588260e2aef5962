// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Compactor: garbage collection by region swap.
//!
//! Order matters for crash safety. The snapshot is fully programmed into
//! the inactive region before the old log is erased, so at every instant
//! at least one region holds a complete view of the table:
//!
//! 1. erase the inactive region
//! 2. (generational layout) program the generation marker at slot 0
//! 3. program one record per id, `0..N` in order
//! 4. erase the previously active region
//!
//! The caller flips its active pointer only after all steps succeed.

use crate::config::Layout;
use crate::error::KernelResult;
use crate::storage::record::encode_generation;
use crate::storage::{Medium, Record};
use crate::types::RegionId;

/// Value overlaid on the snapshot for a save that triggered the compaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingSave {
    pub param_id: u16,
    pub value: i32,
}

/// Result of a completed region swap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Compaction {
    /// Region now holding the snapshot.
    pub target: RegionId,
    pub generation: u32,
    /// Slots used in the target after the swap.
    pub used_slots: u32,
}

/// Snapshots `table` from `active` into its partner and retires `active`.
///
/// `pending`, when set, replaces the table entry for its id in the
/// snapshot. Medium errors abort the sequence and are returned verbatim;
/// the partially written target then loses to the intact source at the
/// next startup.
pub fn compact<M: Medium + ?Sized>(
    medium: &mut M,
    active: RegionId,
    table: &[i32],
    layout: Layout,
    generation: u32,
    pending: Option<PendingSave>,
) -> KernelResult<Compaction> {
    let geometry = medium.geometry();
    let target = active.other();
    let next_generation = generation.saturating_add(1);

    medium.erase_region(target)?;

    let mut slot = 0;
    if layout == Layout::Generational {
        medium.program_record(geometry.slot_address(target, slot), &encode_generation(next_generation))?;
        slot += 1;
    }

    for (param_id, current) in table.iter().enumerate() {
        let param_id = param_id as u16;
        let value = match pending {
            Some(save) if save.param_id == param_id => save.value,
            _ => *current,
        };
        let bits = Record::new(param_id, value).encode();
        medium.program_record(geometry.slot_address(target, slot), &bits)?;
        slot += 1;
    }

    medium.erase_region(active)?;

    tracing::info!(
        from = %active,
        to = %target,
        generation = next_generation,
        records = table.len(),
        "compaction complete"
    );

    Ok(Compaction {
        target,
        generation: next_generation,
        used_slots: slot,
    })
}
