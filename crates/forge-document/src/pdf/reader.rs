// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — load source PDFs and count their pages using the `lopdf` crate.

use forge_core::error::{ForgeError, Result};
use lopdf::Document;
use tracing::{debug, instrument, warn};

/// A parsed source PDF, ready to have its pages imported.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
}

impl PdfReader {
    /// Parse a PDF from raw bytes.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            ForgeError::SourceDocument(format!("failed to load PDF from memory: {err}"))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self { document })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Consume the reader and return the underlying `lopdf::Document`.
    pub fn into_document(self) -> Document {
        self.document
    }
}

/// Count the pages of a PDF, failing on malformed input.
pub fn count_pages(data: &[u8]) -> Result<u32> {
    Ok(PdfReader::from_bytes(data)?.page_count() as u32)
}

/// Count the pages of a PDF for display, reporting 1 when the file can't be
/// read. Never use this for anything but display.
pub fn probe_page_count(data: &[u8]) -> u32 {
    match count_pages(data) {
        Ok(count) => count,
        Err(err) => {
            warn!(%err, "Error reading PDF page count, assuming 1");
            1
        }
    }
}
