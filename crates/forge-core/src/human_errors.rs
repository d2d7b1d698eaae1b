// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every merge failure collapses into one generic notification; the specific
// error kind is for the log, not the user. Input and storage errors get their
// own wording because the user can fix them directly.

use crate::error::ForgeError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The user can fix the input and try again.
    ActionRequired,
    /// Retrying with the same input will fail the same way.
    Permanent,
}

/// A human-readable error with a plain English message and a suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether offering a retry makes sense.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `ForgeError` into a notification a user can act on.
pub fn humanize_error(err: &ForgeError) -> HumanError {
    match err {
        ForgeError::Assembly { .. }
        | ForgeError::Decode(_)
        | ForgeError::Encode(_)
        | ForgeError::Embed(_)
        | ForgeError::SourceDocument(_)
        | ForgeError::Pdf(_)
        | ForgeError::Task(_) => HumanError {
            message: "Error generating PDF".into(),
            suggestion: "Please check your files and try again".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        ForgeError::NoEntries => HumanError {
            message: "Please add at least one file".into(),
            suggestion: "Add images or PDFs, then generate again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ForgeError::UnsupportedMediaType(detail) => HumanError {
            message: "This type of file isn't supported.".into(),
            suggestion: format!("Only images and PDF files can be combined. (File type: {detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        ForgeError::InvalidQuality(detail) => HumanError {
            message: "Image quality must be a number.".into(),
            suggestion: format!("Enter a value from 1 to 100. (Got: {detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ForgeError::InvalidGeometry(detail) => HumanError {
            message: "Unknown page size.".into(),
            suggestion: format!(
                "Choose one of A4, Letter, Legal, A3, A5, Tabloid or Original Size. (Got: {detail})"
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ForgeError::Io(io_err) => HumanError {
            message: "A file couldn't be read or written.".into(),
            suggestion: format!("Check the file exists and that you can write to the output folder. ({io_err})"),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        ForgeError::Serialization(_) => HumanError {
            message: "Your saved settings couldn't be stored.".into(),
            suggestion: "Try resetting the settings to their defaults.".into(),
            retriable: true,
            severity: Severity::Permanent,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_assembly_failure_reads_the_same() {
        let kinds = [
            ForgeError::Decode("x".into()),
            ForgeError::Encode("x".into()),
            ForgeError::Embed("x".into()),
            ForgeError::SourceDocument("x".into()),
            ForgeError::at_entry(0, ForgeError::Embed("x".into())),
        ];
        for err in &kinds {
            let human = humanize_error(err);
            assert_eq!(human.message, "Error generating PDF");
            assert!(human.retriable);
        }
    }

    #[test]
    fn empty_input_is_action_required() {
        let human = humanize_error(&ForgeError::NoEntries);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
    }

    #[test]
    fn unsupported_type_is_permanent() {
        let human = humanize_error(&ForgeError::UnsupportedMediaType("text/plain".into()));
        assert_eq!(human.severity, Severity::Permanent);
        assert!(human.suggestion.contains("text/plain"));
    }
}
