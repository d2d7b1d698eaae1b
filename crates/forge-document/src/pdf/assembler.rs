// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document assembler — merge an ordered list of images and PDFs into one PDF.
//
// Each entry is first *prepared* (image decoded/re-encoded and placed, or
// source PDF parsed) and then *appended* to the output document. The
// sequential path does both per entry, in list order. The concurrent path
// prepares entries on blocking worker threads and appends them afterwards in
// list order, so page order never depends on completion order.

use forge_core::error::{ForgeError, Result};
use forge_core::types::{Entry, EntryKind, GenerationOptions, ImageEncoding};
use lopdf::Document;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument};

use crate::layout::{Placement, fit_to_page};
use crate::pdf::embed::EmbeddedImage;
use crate::pdf::output::OutputDocument;
use crate::pdf::reader::PdfReader;
use crate::raster::rasterizer::{ImageRasterizer, Rasterize};

/// Merges entries into a single PDF using a rasterizer for compressed images.
///
/// The assembler holds no state between calls; the rasterizer is a service
/// value supplied at construction.
#[derive(Debug, Clone)]
pub struct DocumentAssembler<R = ImageRasterizer> {
    rasterizer: R,
}

/// An entry that has been decoded and is ready to become pages.
enum PreparedEntry {
    Image {
        image: EmbeddedImage,
        page_size: (f32, f32),
        placement: Placement,
    },
    Pdf(Document),
}

impl DocumentAssembler<ImageRasterizer> {
    /// Assembler using the default [`ImageRasterizer`].
    pub fn with_default_rasterizer() -> Self {
        Self::new(ImageRasterizer)
    }
}

impl Default for DocumentAssembler<ImageRasterizer> {
    fn default() -> Self {
        Self::with_default_rasterizer()
    }
}

impl<R: Rasterize> DocumentAssembler<R> {
    pub fn new(rasterizer: R) -> Self {
        Self { rasterizer }
    }

    /// Merge `entries`, in order, into one PDF and return its bytes.
    ///
    /// The first failing entry aborts the whole call with
    /// [`ForgeError::Assembly`] carrying that entry's index.
    #[instrument(
        skip_all,
        fields(
            entries = entries.len(),
            compress = options.compress,
            quality = options.quality.get(),
            geometry = %options.page_geometry,
        )
    )]
    pub fn assemble(&self, entries: &[Entry], options: &GenerationOptions) -> Result<Vec<u8>> {
        if entries.is_empty() {
            return Err(ForgeError::NoEntries);
        }
        info!("Assembling document");

        let mut output = OutputDocument::new();
        for (index, entry) in entries.iter().enumerate() {
            let prepared = prepare_entry(&self.rasterizer, entry, options)
                .map_err(|err| ForgeError::at_entry(index, err))?;
            append_entry(&mut output, prepared).map_err(|err| ForgeError::at_entry(index, err))?;
            debug!(index, pages = output.page_count(), "Entry appended");
        }

        output.finish()
    }
}

impl<R> DocumentAssembler<R>
where
    R: Rasterize + Clone + Send + Sync + 'static,
{
    /// Like [`DocumentAssembler::assemble`], but decodes and re-encodes
    /// entries in parallel on blocking worker threads.
    ///
    /// Pages are still appended in entry order. When several entries fail,
    /// the lowest index is reported; dropping the returned future cancels
    /// the call.
    #[instrument(
        skip_all,
        fields(
            entries = entries.len(),
            compress = options.compress,
            quality = options.quality.get(),
            geometry = %options.page_geometry,
        )
    )]
    pub async fn assemble_concurrent(
        &self,
        entries: Vec<Entry>,
        options: GenerationOptions,
    ) -> Result<Vec<u8>> {
        if entries.is_empty() {
            return Err(ForgeError::NoEntries);
        }
        info!("Assembling document concurrently");

        let total = entries.len();
        let mut tasks = JoinSet::new();
        for (index, entry) in entries.into_iter().enumerate() {
            let rasterizer = self.rasterizer.clone();
            tasks.spawn_blocking(move || (index, prepare_entry(&rasterizer, &entry, &options)));
        }

        // Drain every worker so the reported failure is the lowest index,
        // as in the sequential path.
        let mut slots: Vec<Option<PreparedEntry>> = (0..total).map(|_| None).collect();
        let mut first_failure: Option<(usize, ForgeError)> = None;
        while let Some(joined) = tasks.join_next().await {
            let (index, prepared) =
                joined.map_err(|err| ForgeError::Task(format!("entry worker failed: {err}")))?;
            match prepared {
                Ok(prepared) => {
                    slots[index] = Some(prepared);
                    debug!(index, "Entry prepared");
                }
                Err(err) => {
                    debug!(index, %err, "Entry failed");
                    if first_failure.as_ref().is_none_or(|(lowest, _)| index < *lowest) {
                        first_failure = Some((index, err));
                    }
                }
            }
        }
        if let Some((index, err)) = first_failure {
            return Err(ForgeError::at_entry(index, err));
        }

        tokio::task::spawn_blocking(move || {
            let mut output = OutputDocument::new();
            for (index, slot) in slots.into_iter().enumerate() {
                let prepared = slot.ok_or_else(|| {
                    ForgeError::at_entry(index, ForgeError::Task("entry was never prepared".into()))
                })?;
                append_entry(&mut output, prepared)
                    .map_err(|err| ForgeError::at_entry(index, err))?;
            }
            output.finish()
        })
        .await
        .map_err(|err| ForgeError::Task(format!("output worker failed: {err}")))?
    }
}

fn prepare_entry<R: Rasterize>(
    rasterizer: &R,
    entry: &Entry,
    options: &GenerationOptions,
) -> Result<PreparedEntry> {
    match &entry.kind {
        EntryKind::Image(encoding) => prepare_image(rasterizer, encoding, &entry.payload, options),
        EntryKind::Pdf => Ok(PreparedEntry::Pdf(
            PdfReader::from_bytes(&entry.payload)?.into_document(),
        )),
    }
}

fn prepare_image<R: Rasterize>(
    rasterizer: &R,
    encoding: &ImageEncoding,
    payload: &[u8],
    options: &GenerationOptions,
) -> Result<PreparedEntry> {
    let image = if options.compress {
        let jpeg = rasterizer.rasterize(payload, encoding, options.page_geometry, options.quality)?;
        EmbeddedImage::from_jpeg(&jpeg)
            .map_err(|err| ForgeError::Encode(format!("rasterizer output is unusable: {err}")))?
    } else {
        EmbeddedImage::from_source(encoding, payload)?
    };

    let natural = image.dimensions();
    let (page_size, placement) = match options.page_geometry.dimensions() {
        Some(page_size) => (page_size, fit_to_page(page_size, natural)),
        None => (natural, Placement::full_bleed(natural.0, natural.1)),
    };

    Ok(PreparedEntry::Image {
        image,
        page_size,
        placement,
    })
}

fn append_entry(output: &mut OutputDocument, prepared: PreparedEntry) -> Result<()> {
    match prepared {
        PreparedEntry::Image {
            image,
            page_size,
            placement,
        } => {
            output.add_image_page(image, page_size, placement)?;
        }
        PreparedEntry::Pdf(source) => {
            output.import_document(&source)?;
        }
    }
    Ok(())
}
