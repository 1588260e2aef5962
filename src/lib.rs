// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
#![no_std]

//! seesaw-kernel: a no_std, log-structured, wear-leveled parameter store
//! over two ping-pong flash regions.

#[cfg(any(test, feature = "std"))]
#[macro_use]
extern crate std;

pub mod config;
pub mod error;
pub mod types;
pub mod storage;
pub mod region;
pub mod resolve;
pub mod replay;
pub mod append;
pub mod compact;
pub mod store;

pub use config::{Geometry, Layout, StoreConfig};
pub use error::{KernelError, KernelResult, MediumError};
pub use store::{LoadReport, ParamStore, SaveOutcome};
pub use types::RegionId;

#[cfg(test)]
pub mod tests;
