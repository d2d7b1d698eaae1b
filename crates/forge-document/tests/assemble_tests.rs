// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end merge tests. Fixtures are synthesised in memory; outputs are
// reloaded with lopdf and checked structurally.

use std::io::Cursor;

use forge_core::error::ForgeError;
use forge_core::types::{Entry, GenerationOptions, ImageEncoding, PageGeometry, Quality};
use forge_document::{DocumentAssembler, count_pages};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), format).unwrap();
    buffer
}

fn jpeg(width: u32, height: u32) -> Entry {
    let image = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
    Entry::image(
        ImageEncoding::Jpeg,
        encode(DynamicImage::ImageRgb8(image), ImageFormat::Jpeg),
    )
}

fn translucent_png(width: u32, height: u32) -> Entry {
    let image = RgbaImage::from_pixel(width, height, Rgba([20, 40, 60, 100]));
    Entry::image(
        ImageEncoding::Png,
        encode(DynamicImage::ImageRgba8(image), ImageFormat::Png),
    )
}

fn media_box(width: i64, height: i64) -> Vec<Object> {
    vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(width),
        Object::Integer(height),
    ]
}

/// A PDF whose pages are `widths` points wide and 500 points tall, each with
/// a small content stream and a shared font resource.
fn pdf_with_widths(widths: &[i64]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let kids: Vec<Object> = widths
        .iter()
        .map(|&width| {
            let content = format!("BT /F1 12 Tf 10 10 Td (page {width}) Tj ET");
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            Object::Reference(doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box(width, 500),
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            }))
        })
        .collect();
    finish_pdf(doc, pages_id, kids, dictionary! {})
}

/// A PDF whose pages inherit MediaBox and Resources from the page tree root.
fn pdf_with_inherited_box(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            Object::Reference(doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
            }))
        })
        .collect();
    let inherited = dictionary! {
        "MediaBox" => media_box(321, 654),
        "Resources" => dictionary! {},
    };
    finish_pdf(doc, pages_id, kids, inherited)
}

fn finish_pdf(
    mut doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    extra: lopdf::Dictionary,
) -> Vec<u8> {
    let mut pages = dictionary! {
        "Type" => "Pages",
        "Count" => kids.len() as i64,
        "Kids" => kids,
    };
    for (key, value) in extra.iter() {
        pages.set(key.clone(), value.clone());
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn options(compress: bool, quality: i64, page_geometry: PageGeometry) -> GenerationOptions {
    GenerationOptions {
        compress,
        quality: Quality::new(quality),
        page_geometry,
    }
}

// ---------------------------------------------------------------------------
// Output inspection
// ---------------------------------------------------------------------------

fn number(object: &Object) -> f32 {
    match object {
        Object::Integer(value) => *value as f32,
        Object::Real(value) => *value,
        other => panic!("expected a number, got {other:?}"),
    }
}

fn pages(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

fn page_size(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    let page = doc.get_dictionary(page_id).unwrap();
    let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
    (number(&media_box[2]), number(&media_box[3]))
}

/// Operands of the image placement (`cm`) operator on an image page.
fn image_transform(doc: &Document, page_id: ObjectId) -> [f32; 6] {
    let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
    let cm = content
        .operations
        .iter()
        .find(|op| op.operator == "cm")
        .expect("image page has a cm operator");
    let values: Vec<f32> = cm.operands.iter().map(number).collect();
    values.try_into().unwrap()
}

fn image_xobject<'a>(doc: &'a Document, page_id: ObjectId) -> &'a Stream {
    let page = doc.get_dictionary(page_id).unwrap();
    let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
    let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
    let image_id = xobjects.get(b"Im0").unwrap().as_reference().unwrap();
    doc.get_object(image_id).unwrap().as_stream().unwrap()
}

fn is_image_page(doc: &Document, page_id: ObjectId) -> bool {
    doc.get_dictionary(page_id)
        .unwrap()
        .get(b"Resources")
        .and_then(Object::as_dict)
        .map(|resources| resources.has(b"XObject"))
        .unwrap_or(false)
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 0.01
}

fn assemble(entries: &[Entry], options: &GenerationOptions) -> Document {
    let bytes = DocumentAssembler::with_default_rasterizer()
        .assemble(entries, options)
        .unwrap();
    Document::load_mem(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn page_order_follows_entry_order() {
    let entries = [
        jpeg(40, 30),
        Entry::pdf(pdf_with_widths(&[101, 102, 103])),
        jpeg(30, 40),
        Entry::pdf(pdf_with_widths(&[201, 202])),
    ];
    let doc = assemble(&entries, &options(false, 85, PageGeometry::OriginalSize));
    let ids = pages(&doc);
    assert_eq!(ids.len(), 1 + 3 + 1 + 2);

    let sizes: Vec<(f32, f32)> = ids.iter().map(|&id| page_size(&doc, id)).collect();
    assert_eq!(
        sizes,
        vec![
            (40.0, 30.0),
            (101.0, 500.0),
            (102.0, 500.0),
            (103.0, 500.0),
            (30.0, 40.0),
            (201.0, 500.0),
            (202.0, 500.0),
        ]
    );
    assert!(is_image_page(&doc, ids[0]));
    assert!(!is_image_page(&doc, ids[1]));
    assert!(is_image_page(&doc, ids[4]));
}

#[test]
fn original_size_page_matches_pixels_at_origin() {
    let doc = assemble(&[jpeg(64, 48)], &options(false, 85, PageGeometry::OriginalSize));
    let page = pages(&doc)[0];
    assert_eq!(page_size(&doc, page), (64.0, 48.0));
    let [width, b, c, height, x, y] = image_transform(&doc, page);
    assert!(close(width, 64.0) && close(height, 48.0));
    assert!(close(b, 0.0) && close(c, 0.0));
    assert!(close(x, 0.0) && close(y, 0.0));
}

#[test]
fn fixed_geometry_scales_to_fit_and_centres() {
    let doc = assemble(&[jpeg(1200, 800)], &options(false, 85, PageGeometry::A4));
    let page = pages(&doc)[0];
    assert_eq!(page_size(&doc, page), (595.0, 842.0));

    let scale = (595.0f32 / 1200.0).min(842.0 / 800.0);
    let [width, _, _, height, x, y] = image_transform(&doc, page);
    assert!(close(width, 1200.0 * scale));
    assert!(close(height, 800.0 * scale));
    assert!(close(x, (595.0 - 1200.0 * scale) / 2.0));
    assert!(close(y, (842.0 - 800.0 * scale) / 2.0));
}

#[test]
fn every_fixed_geometry_produces_its_table_size() {
    for geometry in PageGeometry::ALL {
        let Some(expected) = geometry.dimensions() else {
            continue;
        };
        let doc = assemble(&[jpeg(50, 70)], &options(false, 85, geometry));
        assert_eq!(page_size(&doc, pages(&doc)[0]), expected, "{geometry}");
    }
}

#[test]
fn image_then_pdf_on_a4() {
    let source = pdf_with_widths(&[310, 320, 330]);
    let entries = [jpeg(1200, 800), Entry::pdf(source)];
    let doc = assemble(&entries, &options(false, 85, PageGeometry::A4));
    let ids = pages(&doc);
    assert_eq!(ids.len(), 4);

    assert_eq!(page_size(&doc, ids[0]), (595.0, 842.0));
    let [width, _, _, _, _, _] = image_transform(&doc, ids[0]);
    assert!(close(width / 1200.0, 0.495_833));

    for (id, width) in ids[1..].iter().zip([310.0, 320.0, 330.0]) {
        assert_eq!(page_size(&doc, *id), (width, 500.0));
        let content = doc.get_page_content(*id).unwrap();
        let text = String::from_utf8_lossy(&content);
        assert!(text.contains(&format!("page {width}")), "{text}");
    }
}

#[test]
fn compressed_original_size_reencodes_at_native_size() {
    let doc = assemble(&[jpeg(320, 200)], &options(true, 50, PageGeometry::OriginalSize));
    let ids = pages(&doc);
    assert_eq!(ids.len(), 1);
    assert_eq!(page_size(&doc, ids[0]), (320.0, 200.0));

    let image = image_xobject(&doc, ids[0]);
    assert_eq!(image.dict.get(b"Filter").unwrap().as_name().unwrap(), b"DCTDecode");
    assert_eq!(image.dict.get(b"Width").unwrap().as_i64().unwrap(), 320);
    assert_eq!(image.dict.get(b"Height").unwrap().as_i64().unwrap(), 200);

    let [width, _, _, height, x, y] = image_transform(&doc, ids[0]);
    assert!(close(width, 320.0) && close(height, 200.0));
    assert!(close(x, 0.0) && close(y, 0.0));
}

#[test]
fn compressed_fixed_geometry_fills_the_page() {
    let doc = assemble(&[jpeg(1200, 800)], &options(true, 70, PageGeometry::Letter));
    let page = pages(&doc)[0];
    assert_eq!(page_size(&doc, page), (612.0, 792.0));

    // The rasterizer already letterboxed onto a page-sized canvas.
    let image = image_xobject(&doc, page);
    assert_eq!(image.dict.get(b"Width").unwrap().as_i64().unwrap(), 612);
    assert_eq!(image.dict.get(b"Height").unwrap().as_i64().unwrap(), 792);
    let [width, _, _, height, x, y] = image_transform(&doc, page);
    assert!(close(width, 612.0) && close(height, 792.0));
    assert!(close(x, 0.0) && close(y, 0.0));
}

#[test]
fn uncompressed_png_keeps_its_alpha() {
    let doc = assemble(
        &[translucent_png(12, 9)],
        &options(false, 85, PageGeometry::OriginalSize),
    );
    let image = image_xobject(&doc, pages(&doc)[0]);
    assert!(image.dict.has(b"SMask"));
    assert_eq!(image.dict.get(b"Width").unwrap().as_i64().unwrap(), 12);
}

#[test]
fn pdf_round_trip_keeps_page_count() {
    let source = pdf_with_widths(&[100, 200, 300, 400, 500]);
    let bytes = DocumentAssembler::with_default_rasterizer()
        .assemble(&[Entry::pdf(source.clone())], &GenerationOptions::default())
        .unwrap();
    assert_eq!(count_pages(&bytes).unwrap(), count_pages(&source).unwrap());
}

#[test]
fn inherited_page_attributes_are_materialised() {
    let doc = assemble(
        &[Entry::pdf(pdf_with_inherited_box(2))],
        &GenerationOptions::default(),
    );
    let ids = pages(&doc);
    assert_eq!(ids.len(), 2);
    for id in ids {
        assert_eq!(page_size(&doc, id), (321.0, 654.0));
        assert!(doc.get_dictionary(id).unwrap().has(b"Resources"));
    }
}

#[test]
fn repeated_assembly_is_structurally_identical() {
    let entries = [
        jpeg(200, 150),
        Entry::pdf(pdf_with_widths(&[111, 222])),
        translucent_png(30, 60),
    ];
    let opts = options(true, 40, PageGeometry::A5);
    let first = assemble(&entries, &opts);
    let second = assemble(&entries, &opts);

    let first_sizes: Vec<_> = pages(&first).into_iter().map(|id| page_size(&first, id)).collect();
    let second_sizes: Vec<_> = pages(&second)
        .into_iter()
        .map(|id| page_size(&second, id))
        .collect();
    assert_eq!(first_sizes.len(), 4);
    assert_eq!(first_sizes, second_sizes);
}

#[test]
fn any_bad_entry_aborts_the_merge() {
    let entries = [
        jpeg(10, 10),
        Entry::pdf(pdf_with_widths(&[100])),
        Entry::image(ImageEncoding::Jpeg, b"truncated".to_vec()),
        jpeg(10, 10),
    ];

    let err = DocumentAssembler::with_default_rasterizer()
        .assemble(&entries, &options(false, 85, PageGeometry::A4))
        .unwrap_err();
    assert_eq!(err.entry_index(), Some(2));
    assert!(matches!(err.root_cause(), ForgeError::Embed(_)));

    let err = DocumentAssembler::with_default_rasterizer()
        .assemble(&entries, &options(true, 85, PageGeometry::A4))
        .unwrap_err();
    assert_eq!(err.entry_index(), Some(2));
    assert!(matches!(err.root_cause(), ForgeError::Decode(_)));
}

#[test]
fn malformed_pdf_entry_is_a_source_error() {
    let err = DocumentAssembler::with_default_rasterizer()
        .assemble(
            &[Entry::pdf(b"%PDF-garbage".to_vec())],
            &GenerationOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err.root_cause(), ForgeError::SourceDocument(_)));
}

#[tokio::test]
async fn concurrent_assembly_preserves_entry_order() {
    let entries = vec![
        Entry::pdf(pdf_with_widths(&[101, 102])),
        jpeg(400, 300),
        Entry::pdf(pdf_with_widths(&[201])),
        jpeg(30, 20),
        Entry::pdf(pdf_with_widths(&[301, 302, 303])),
    ];
    let opts = options(true, 60, PageGeometry::OriginalSize);
    let assembler = DocumentAssembler::with_default_rasterizer();

    let sequential = Document::load_mem(&assembler.assemble(&entries, &opts).unwrap()).unwrap();
    let concurrent =
        Document::load_mem(&assembler.assemble_concurrent(entries, opts).await.unwrap()).unwrap();

    let sizes = |doc: &Document| -> Vec<(f32, f32)> {
        pages(doc).into_iter().map(|id| page_size(doc, id)).collect()
    };
    assert_eq!(sizes(&concurrent), sizes(&sequential));
    assert_eq!(
        sizes(&concurrent),
        vec![
            (101.0, 500.0),
            (102.0, 500.0),
            (400.0, 300.0),
            (201.0, 500.0),
            (30.0, 20.0),
            (301.0, 500.0),
            (302.0, 500.0),
            (303.0, 500.0),
        ]
    );
}

#[tokio::test]
async fn concurrent_assembly_reports_failures() {
    let entries = vec![jpeg(10, 10), Entry::pdf(b"nope".to_vec())];
    let err = DocumentAssembler::with_default_rasterizer()
        .assemble_concurrent(entries, GenerationOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.entry_index(), Some(1));
    assert!(matches!(err.root_cause(), ForgeError::SourceDocument(_)));
}
