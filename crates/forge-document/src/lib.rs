// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// forge-document — the file-combination pipeline for Private Forge.
//
// Provides the image rasterizer (decode, fit onto a page-sized canvas,
// re-encode as JPEG), image embedding, page import from existing PDFs, and the
// document assembler that merges an ordered list of entries into one PDF.

pub mod raster;
pub mod layout;
pub mod pdf;

// Re-export the primary types so callers can use `forge_document::DocumentAssembler` etc.
pub use raster::rasterizer::{ImageRasterizer, Rasterize};
pub use layout::Placement;
pub use pdf::assembler::DocumentAssembler;
pub use pdf::reader::{PdfReader, count_pages, probe_page_count};
