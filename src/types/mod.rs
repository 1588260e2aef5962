// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Core identifiers.

pub mod region;

pub use region::RegionId;
