// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod compact;
pub mod dump;
pub mod format;
pub mod inspect;
pub mod load;
pub mod save;
pub mod stress;
