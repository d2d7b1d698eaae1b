// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Private Forge.

use thiserror::Error;

/// Top-level error type for all Private Forge operations.
#[derive(Debug, Error)]
pub enum ForgeError {
    // -- Per-entry errors --
    #[error("image decode failed: {0}")]
    Decode(String),

    #[error("image encode failed: {0}")]
    Encode(String),

    #[error("image embed failed: {0}")]
    Embed(String),

    #[error("source PDF is unreadable: {0}")]
    SourceDocument(String),

    /// Any per-entry failure, tagged with the zero-based entry index. A single
    /// failing entry aborts the whole merge.
    #[error("assembly failed at entry {index}: {source}")]
    Assembly {
        index: usize,
        #[source]
        source: Box<ForgeError>,
    },

    // -- Input errors --
    #[error("no files to combine")]
    NoEntries,

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("invalid image quality: {0}")]
    InvalidQuality(String),

    #[error("unknown page size: {0}")]
    InvalidGeometry(String),

    // -- Output errors --
    #[error("PDF operation failed: {0}")]
    Pdf(String),

    #[error("background task failed: {0}")]
    Task(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ForgeError {
    /// Wrap a per-entry error in [`ForgeError::Assembly`].
    pub fn at_entry(index: usize, source: ForgeError) -> Self {
        Self::Assembly {
            index,
            source: Box::new(source),
        }
    }

    /// The innermost error, looking through any `Assembly` wrapper.
    pub fn root_cause(&self) -> &ForgeError {
        match self {
            Self::Assembly { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Index of the entry that failed, if this error came from an assembly.
    pub fn entry_index(&self) -> Option<usize> {
        match self {
            Self::Assembly { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ForgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_cause_unwraps_assembly() {
        let err = ForgeError::at_entry(3, ForgeError::Embed("bad png".into()));
        assert_eq!(err.entry_index(), Some(3));
        assert!(matches!(err.root_cause(), ForgeError::Embed(_)));
        assert_eq!(
            err.to_string(),
            "assembly failed at entry 3: image embed failed: bad png"
        );
    }

    #[test]
    fn plain_error_is_its_own_root() {
        let err = ForgeError::NoEntries;
        assert!(matches!(err.root_cause(), ForgeError::NoEntries));
        assert_eq!(err.entry_index(), None);
    }
}
