// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Medium driver boundary.
//!
//! The store never touches flash directly. Everything goes through these
//! three primitives, each of which is assumed indivisible at record
//! granularity: a program either lands completely or leaves a slot that
//! fails the sentinel check, and an erase either completes or leaves the
//! region untouched.

use crate::config::Geometry;
use crate::error::MediumError;
use crate::storage::record::RawRecord;
use crate::types::RegionId;

pub trait Medium {
    /// Placement of the two regions on this medium.
    fn geometry(&self) -> Geometry;

    /// Non-destructive read of one slot. Never-written cells read as erased.
    fn read_word(&self, address: u32) -> RawRecord;

    /// Erase a whole region back to the erased pattern.
    fn erase_region(&mut self, region: RegionId) -> Result<(), MediumError>;

    /// Program one record into an erased, slot-aligned location.
    fn program_record(&mut self, address: u32, bits: &RawRecord) -> Result<(), MediumError>;
}

impl<T: Medium + ?Sized> Medium for &mut T {
    fn geometry(&self) -> Geometry {
        (**self).geometry()
    }

    fn read_word(&self, address: u32) -> RawRecord {
        (**self).read_word(address)
    }

    fn erase_region(&mut self, region: RegionId) -> Result<(), MediumError> {
        (**self).erase_region(region)
    }

    fn program_record(&mut self, address: u32, bits: &RawRecord) -> Result<(), MediumError> {
        (**self).program_record(address, bits)
    }
}
