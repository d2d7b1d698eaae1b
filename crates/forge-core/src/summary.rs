// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Naming and reporting for a finished merge.

use chrono::{Local, NaiveDate};

use crate::types::GenerationOptions;

/// File name for a merged document created on `date`.
pub fn default_output_filename(date: NaiveDate) -> String {
    format!("combined-files-{}.pdf", date.format("%Y-%m-%d"))
}

/// [`default_output_filename`] for today's local date.
pub fn default_output_filename_today() -> String {
    default_output_filename(Local::now().date_naive())
}

/// What a successful merge produced, for the success notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblySummary {
    pub entries: usize,
    pub pages: usize,
    pub bytes: usize,
    pub options: GenerationOptions,
}

impl AssemblySummary {
    pub fn describe(&self) -> String {
        let mut text = format!("Combined {} file(s) into a new PDF", self.entries);
        if self.options.compress {
            text.push_str(&format!(" with {}% quality", self.options.quality));
        }
        text
    }
}
