// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Slot scanning over a single region.
//!
//! All lookups are bounded linear scans from slot 0. The log is
//! prefix-valid-then-erased, so the first erased slot ends every scan.

use crate::config::Layout;
use crate::storage::{Medium, SlotState};
use crate::types::RegionId;

/// Iterator over the decoded slots of one region, in address order.
pub struct SlotIter<'a, M: Medium + ?Sized> {
    medium: &'a M,
    region: RegionId,
    param_count: usize,
    next: u32,
    end: u32,
}

impl<'a, M: Medium + ?Sized> Iterator for SlotIter<'a, M> {
    type Item = (u32, SlotState);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let slot = self.next;
        self.next += 1;
        let address = self.medium.geometry().slot_address(self.region, slot);
        let raw = self.medium.read_word(address);
        Some((slot, SlotState::decode(&raw, self.param_count)))
    }
}

/// Every slot of `region`, including the erased tail.
pub fn scan_slots<M: Medium + ?Sized>(medium: &M, region: RegionId, param_count: usize) -> SlotIter<'_, M> {
    SlotIter {
        medium,
        region,
        param_count,
        next: 0,
        end: medium.geometry().slots(),
    }
}

/// Slots of the log, stopping at the first erased slot.
pub fn log_slots<M: Medium + ?Sized>(
    medium: &M,
    region: RegionId,
    param_count: usize,
) -> impl Iterator<Item = (u32, SlotState)> + '_ {
    scan_slots(medium, region, param_count).take_while(|(_, state)| !state.is_erased())
}

pub fn is_first_slot_erased<M: Medium + ?Sized>(medium: &M, region: RegionId) -> bool {
    let geometry = medium.geometry();
    let raw = medium.read_word(geometry.slot_address(region, 0));
    // Id range is irrelevant for the erased check.
    SlotState::decode(&raw, 0).is_erased()
}

/// Index of the first erased slot, or `None` when the region is full.
pub fn first_free_slot<M: Medium + ?Sized>(medium: &M, region: RegionId) -> Option<u32> {
    scan_slots(medium, region, 0)
        .find(|(_, state)| state.is_erased())
        .map(|(slot, _)| slot)
}

/// Summary of a region's contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionSurvey {
    pub region: RegionId,
    pub capacity: u32,
    /// Slots before the first erased slot.
    pub used_slots: u32,
    pub valid: u32,
    pub corrupt: u32,
    /// Generation marker found at slot 0.
    pub generation: Option<u32>,
    /// A full snapshot (ids 0..N in order) follows the layout's snapshot offset.
    pub snapshot_complete: bool,
}

impl RegionSurvey {
    pub fn is_erased(&self) -> bool {
        self.used_slots == 0
    }

    pub fn is_full(&self) -> bool {
        self.used_slots == self.capacity
    }

    pub fn free_slots(&self) -> u32 {
        self.capacity - self.used_slots
    }
}

/// Walks the log of `region` once and classifies it.
pub fn survey_region<M: Medium + ?Sized>(
    medium: &M,
    region: RegionId,
    param_count: usize,
    layout: Layout,
) -> RegionSurvey {
    let mut survey = RegionSurvey {
        region,
        capacity: medium.geometry().slots(),
        used_slots: 0,
        valid: 0,
        corrupt: 0,
        generation: None,
        snapshot_complete: false,
    };

    let offset = layout.snapshot_offset();
    // Ids 0..next matched in order so far; None once the prefix broke.
    let mut expected: Option<usize> = Some(0);
    let advance = |expected: Option<usize>, id: Option<usize>| match expected {
        Some(next) if next >= param_count => Some(next),
        Some(next) if id == Some(next) => Some(next + 1),
        _ => None,
    };

    for (slot, state) in log_slots(medium, region, param_count) {
        survey.used_slots = slot + 1;
        let id = match state {
            SlotState::Valid(record) => {
                survey.valid += 1;
                Some(record.param_id as usize)
            }
            SlotState::Generation(generation) => {
                if slot == 0 {
                    survey.generation = Some(generation);
                }
                None
            }
            SlotState::Corrupt => {
                survey.corrupt += 1;
                None
            }
            SlotState::Erased => break,
        };
        if slot >= offset {
            expected = advance(expected, id);
        }
    }

    let has_prefix_slot = match layout {
        Layout::Plain => true,
        Layout::Generational => survey.generation.is_some(),
    };
    survey.snapshot_complete = has_prefix_slot && expected.is_some_and(|next| next >= param_count);
    survey
}
