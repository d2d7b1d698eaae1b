// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Private Forge — Core types, errors, and settings shared across all crates.

pub mod config;
pub mod entries;
pub mod error;
pub mod human_errors;
pub mod summary;
pub mod types;

pub use config::{Settings, SettingsStore};
pub use entries::EntryList;
pub use error::ForgeError;
pub use summary::{AssemblySummary, default_output_filename, default_output_filename_today};
pub use types::*;
