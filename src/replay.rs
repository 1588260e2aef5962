//! Deterministic Replay Logic.

// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

use crate::region::log_slots;
use crate::storage::{Medium, SlotState};
use crate::types::RegionId;

/// What a replay pass saw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReplayStats {
    /// Slots read before the end of the log.
    pub slots_scanned: u32,
    /// Valid records applied to the table.
    pub applied: u32,
    /// Torn or foreign slots skipped.
    pub corrupt: u32,
    /// Generation marker of the region, if any.
    pub generation: Option<u32>,
}

/// Replays the log of `region` on top of `table`.
///
/// Later records win over earlier ones for the same id. Entries of `table`
/// that never appear in the log keep whatever the caller put there.
/// Corrupt slots are skipped, never reported as errors: a torn write from an
/// earlier power loss is a legitimate part of the log.
pub fn replay<M: Medium + ?Sized>(medium: &M, region: RegionId, table: &mut [i32]) -> ReplayStats {
    let mut stats = ReplayStats::default();

    for (slot, state) in log_slots(medium, region, table.len()) {
        stats.slots_scanned += 1;
        match state {
            SlotState::Valid(record) => {
                table[record.param_id as usize] = record.value;
                stats.applied += 1;
            }
            SlotState::Generation(generation) if slot == 0 => stats.generation = Some(generation),
            SlotState::Generation(_) | SlotState::Corrupt => {
                tracing::warn!(%region, slot, "skipping corrupt slot");
                stats.corrupt += 1;
            }
            SlotState::Erased => break,
        }
    }

    stats
}
