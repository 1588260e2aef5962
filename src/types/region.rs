// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Region identifiers for the ping-pong pair.

use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum RegionId {
    A = 0,
    B = 1,
}

impl RegionId {
    /// Both regions in resolver priority order.
    pub const BOTH: [RegionId; 2] = [RegionId::A, RegionId::B];

    /// The partner region of the pair.
    pub const fn other(self) -> Self {
        match self {
            RegionId::A => RegionId::B,
            RegionId::B => RegionId::A,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionId::A => f.write_str("A"),
            RegionId::B => f.write_str("B"),
        }
    }
}
