// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.

use thiserror::Error;

use crate::types::RegionId;

/// Failures reported by the medium driver.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediumError {
    #[error("address {address:#010x} is not slot aligned")]
    Misaligned { address: u32 },

    #[error("address {address:#010x} is outside both regions")]
    OutOfBounds { address: u32 },

    #[error("slot at {address:#010x} is not erased")]
    NotErased { address: u32 },

    #[error("erase of region {region} failed")]
    EraseFailed { region: RegionId },

    #[error("program at {address:#010x} failed")]
    ProgramFailed { address: u32 },

    /// Supply dropped while the operation was in flight.
    #[error("power lost during medium operation")]
    PowerLost,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelError {
    #[error("medium error: {0}")]
    Medium(#[from] MediumError),

    #[error("parameter id {param_id} out of range (table holds {param_count})")]
    OutOfRange { param_id: u16, param_count: usize },

    /// Active region has no erased slot left.
    #[error("region {region} is full")]
    RegionFull { region: RegionId },

    /// Plain layout only swaps out a full region.
    #[error("region {region} still has free slots")]
    RegionNotFull { region: RegionId },

    #[error("store used before init_and_load")]
    NotLoaded,

    #[error("parameter table length mismatch: expected {expected}, found {found}")]
    TableLengthMismatch { expected: usize, found: usize },

    #[error("invalid geometry: {0}")]
    InvalidGeometry(&'static str),

    #[error("{count} parameters exceed the addressable id range")]
    TooManyParams { count: usize },
}

pub type KernelResult<T> = core::result::Result<T, KernelError>;
pub type Result<T> = KernelResult<T>;
