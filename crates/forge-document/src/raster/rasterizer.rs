// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image rasterizer — decode a source image, draw it onto a white canvas sized
// to the target page, and re-encode the canvas as JPEG. Uses the `image`
// crate for decoding, resampling, compositing and encoding.

use std::io::Cursor;

use forge_core::error::{ForgeError, Result};
use forge_core::types::{ImageEncoding, PageGeometry, Quality};
use image::imageops::{self, FilterType};
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader, Rgba, RgbaImage};
use tracing::{debug, instrument};

use crate::layout::fit_to_canvas;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Re-encodes one image for a page. Implementations must not keep state
/// between calls.
pub trait Rasterize {
    /// Return JPEG bytes for `image_bytes` drawn onto a canvas for `geometry`.
    fn rasterize(
        &self,
        image_bytes: &[u8],
        encoding: &ImageEncoding,
        geometry: PageGeometry,
        quality: Quality,
    ) -> Result<Vec<u8>>;
}

/// Default rasterizer backed by the `image` crate.
///
/// For a fixed page geometry the canvas is the page size in points, treated as
/// pixels (72 DPI), and the image is fitted and centred on it. For
/// [`PageGeometry::OriginalSize`] the canvas is the image's own size and the
/// image is drawn 1:1.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageRasterizer;

impl ImageRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl Rasterize for ImageRasterizer {
    #[instrument(
        skip(self, image_bytes, encoding),
        fields(bytes_len = image_bytes.len(), %geometry, quality = quality.get())
    )]
    fn rasterize(
        &self,
        image_bytes: &[u8],
        encoding: &ImageEncoding,
        geometry: PageGeometry,
        quality: Quality,
    ) -> Result<Vec<u8>> {
        let source = decode(image_bytes, encoding)?;
        debug!(
            width = source.width(),
            height = source.height(),
            "Source image decoded"
        );

        let canvas = match geometry.dimensions() {
            Some((width, height)) => draw_fitted(&source, width as u32, height as u32),
            None => draw_original(&source),
        };
        drop(source);

        let (canvas_w, canvas_h) = canvas.dimensions();
        let output = encode_jpeg(canvas, quality)?;
        debug!(canvas_w, canvas_h, output_bytes = output.len(), "Canvas encoded");
        Ok(output)
    }
}

/// Decode `bytes`, sniffing the format and falling back to the declared one.
/// EXIF orientation is applied, so the result is upright.
pub fn decode(bytes: &[u8], encoding: &ImageEncoding) -> Result<DynamicImage> {
    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| ForgeError::Decode(format!("cannot read image: {err}")))?;

    if reader.format().is_none()
        && let Some(format) = declared_format(encoding)
    {
        reader.set_format(format);
    }

    let mut decoder = reader
        .into_decoder()
        .map_err(|err| ForgeError::Decode(format!("failed to decode image: {err}")))?;
    let orientation = decoder.orientation().unwrap_or_else(|err| {
        debug!(%err, "Unreadable orientation metadata, drawing as stored");
        Orientation::NoTransforms
    });
    let mut image = DynamicImage::from_decoder(decoder)
        .map_err(|err| ForgeError::Decode(format!("failed to decode image: {err}")))?;
    image.apply_orientation(orientation);

    if image.width() == 0 || image.height() == 0 {
        return Err(ForgeError::Decode("image has zero width or height".into()));
    }
    Ok(image)
}

fn declared_format(encoding: &ImageEncoding) -> Option<ImageFormat> {
    match encoding {
        ImageEncoding::Jpeg => Some(ImageFormat::Jpeg),
        ImageEncoding::Png => Some(ImageFormat::Png),
        ImageEncoding::Unknown(subtype) => ImageFormat::from_mime_type(format!("image/{subtype}")),
    }
}

/// Fit `source` onto a white `width` x `height` canvas, centred.
fn draw_fitted(source: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, WHITE);

    let placement = fit_to_canvas(
        (width as f32, height as f32),
        (source.width() as f32, source.height() as f32),
    );
    let draw_w = (placement.width.round() as u32).clamp(1, width);
    let draw_h = (placement.height.round() as u32).clamp(1, height);

    let scaled = imageops::resize(&source.to_rgba8(), draw_w, draw_h, FilterType::Triangle);
    imageops::overlay(
        &mut canvas,
        &scaled,
        placement.x.round() as i64,
        placement.y.round() as i64,
    );
    canvas
}

/// Draw `source` 1:1 on a white canvas of its own size.
fn draw_original(source: &DynamicImage) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(source.width(), source.height(), WHITE);
    imageops::overlay(&mut canvas, &source.to_rgba8(), 0, 0);
    canvas
}

/// Encode an opaque canvas as baseline JPEG at `quality`.
fn encode_jpeg(canvas: RgbaImage, quality: Quality) -> Result<Vec<u8>> {
    let rgb = DynamicImage::ImageRgba8(canvas).into_rgb8();
    let mut buffer = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.get());
    rgb.write_with_encoder(encoder)
        .map_err(|err| ForgeError::Encode(format!("JPEG encoding failed: {err}")))?;

    if buffer.is_empty() {
        return Err(ForgeError::Encode("JPEG encoder produced no output".into()));
    }
    Ok(buffer)
}
