// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — reading source PDFs, embedding images, importing pages, and
// assembling the merged output document.

pub mod assembler;
pub mod embed;
mod import;
pub mod output;
pub mod reader;

pub use assembler::DocumentAssembler;
pub use embed::EmbeddedImage;
pub use output::OutputDocument;
pub use reader::PdfReader;
