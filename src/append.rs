// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Append Writer.

use crate::error::{KernelError, KernelResult};
use crate::region::first_free_slot;
use crate::storage::{Medium, Record};
use crate::types::RegionId;

/// Programs `record` into the first erased slot of `region`.
///
/// Exactly one program operation, never an erase. Returns the slot index,
/// or [`KernelError::RegionFull`] without touching the medium when no
/// erased slot is left.
pub fn append<M: Medium + ?Sized>(medium: &mut M, region: RegionId, record: Record) -> KernelResult<u32> {
    let slot = first_free_slot(medium, region).ok_or(KernelError::RegionFull { region })?;
    let address = medium.geometry().slot_address(region, slot);
    medium.program_record(address, &record.encode())?;

    tracing::debug!(%region, slot, param_id = record.param_id, value = record.value, "record appended");
    Ok(slot)
}
