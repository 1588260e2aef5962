// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod error;
pub mod image;
pub mod file;
pub mod fixtures;

pub use error::{PersistenceError, Result};
pub use file::FileFlash;
pub use image::ImageHeader;
