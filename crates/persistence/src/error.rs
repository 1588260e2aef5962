// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use seesaw_kernel::KernelError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Invalid magic bytes in image header")]
    InvalidMagic,
    #[error("Unsupported image version {0}")]
    UnsupportedVersion(u32),
    #[error("Header checksum mismatch: expected {expected:#018x}, found {found:#018x}")]
    ChecksumMismatch {
        expected: u64,
        found: u64,
    },
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Invalid image format: {0}")]
    InvalidFormat(String),
    #[error("Kernel rejected image: {0}")]
    Kernel(#[from] KernelError),
}

pub type Result<T> = std::result::Result<T, PersistenceError>;
