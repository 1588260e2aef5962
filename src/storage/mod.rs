// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Record codec, medium boundary and the in-memory medium.

pub mod medium;
pub mod record;

#[cfg(any(test, feature = "std"))]
pub mod ram;

pub use medium::Medium;
pub use record::{RawRecord, Record, SlotState};

#[cfg(any(test, feature = "std"))]
pub use ram::RamFlash;
