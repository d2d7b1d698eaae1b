// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output document — the single append-only PDF a merge builds.
//
// Pages are collected in a flat /Kids list under one /Pages node. The page
// tree, catalog and trailer are written once, in `finish`, which consumes the
// document so it cannot be appended to or serialised twice.

use forge_core::error::{ForgeError, Result};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use tracing::{debug, info, instrument};

use crate::layout::Placement;
use crate::pdf::embed::EmbeddedImage;
use crate::pdf::import::import_pages;

const PDF_VERSION: &str = "1.7";
const PRODUCER: &str = "Private Forge";
const IMAGE_RESOURCE: &str = "Im0";

/// An in-progress merged PDF.
pub struct OutputDocument {
    document: Document,
    /// Reserved ID of the /Pages node, written in `finish`.
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
}

impl OutputDocument {
    pub fn new() -> Self {
        let mut document = Document::with_version(PDF_VERSION);
        let pages_id = document.new_object_id();
        Self {
            document,
            pages_id,
            kids: Vec::new(),
        }
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append one page of `page_size` points showing `image` at `placement`.
    pub fn add_image_page(
        &mut self,
        image: EmbeddedImage,
        page_size: (f32, f32),
        placement: Placement,
    ) -> Result<ObjectId> {
        let EmbeddedImage {
            mut stream,
            soft_mask,
            ..
        } = image;
        if let Some(mask) = soft_mask {
            let mask_id = self.document.add_object(mask);
            stream.dict.set("SMask", Object::Reference(mask_id));
        }
        let image_id = self.document.add_object(stream);

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Real(placement.width),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Real(placement.height),
                        Object::Real(placement.x),
                        Object::Real(placement.y),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(IMAGE_RESOURCE.as_bytes().to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content
            .encode()
            .map_err(|err| ForgeError::Pdf(format!("failed to encode page content: {err}")))?;
        let content_id = self
            .document
            .add_object(Stream::new(dictionary! {}, encoded));

        let (page_w, page_h) = page_size;
        let page_id = self.document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(page_w),
                Object::Real(page_h),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    IMAGE_RESOURCE => image_id,
                },
            },
        });
        self.kids.push(page_id);

        debug!(
            page = self.kids.len(),
            page_w,
            page_h,
            x = placement.x,
            y = placement.y,
            scale = placement.scale,
            "Image page added"
        );
        Ok(page_id)
    }

    /// Append every page of `source`, in source order.
    pub fn import_document(&mut self, source: &Document) -> Result<usize> {
        let imported = import_pages(source, &mut self.document, self.pages_id)?;
        let count = imported.len();
        self.kids.extend(imported);
        Ok(count)
    }

    /// Write the page tree and catalog, compress streams, and serialise.
    #[instrument(skip(self), fields(pages = self.kids.len()))]
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let count = self.kids.len() as i64;
        let kids: Vec<Object> = self.kids.into_iter().map(Object::Reference).collect();
        self.document.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        let info_id = self.document.add_object(dictionary! {
            "Producer" => Object::string_literal(PRODUCER),
            "Creator" => Object::string_literal(PRODUCER),
        });
        self.document.trailer.set("Root", Object::Reference(catalog_id));
        self.document.trailer.set("Info", Object::Reference(info_id));

        self.document.compress();

        let mut output = Vec::new();
        self.document
            .save_to(&mut output)
            .map_err(|err| ForgeError::Pdf(format!("failed to serialise output PDF: {err}")))?;

        info!(output_bytes = output.len(), "Output document serialised");
        Ok(output)
    }
}

impl Default for OutputDocument {
    fn default() -> Self {
        Self::new()
    }
}
