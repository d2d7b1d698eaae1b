// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image embedding — turn encoded image bytes into PDF image XObject streams.
//
// JPEG data is embedded as-is behind a DCTDecode filter. PNG data is decoded
// to 8-bit samples (colour or grey) with the alpha channel, if any, split out
// into a soft mask; both streams are Flate-compressed when the output document
// is serialised.

use std::io::Cursor;

use forge_core::error::{ForgeError, Result};
use forge_core::types::ImageEncoding;
use image::codecs::jpeg::JpegDecoder;
use image::{ExtendedColorType, ImageDecoder, ImageFormat};
use lopdf::{Object, Stream, dictionary};
use tracing::{debug, warn};

/// An image ready to be added to a PDF as an XObject.
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    /// Pixel width; also the image's natural size in points.
    pub width: u32,
    /// Pixel height; also the image's natural size in points.
    pub height: u32,
    pub(crate) stream: Stream,
    pub(crate) soft_mask: Option<Stream>,
}

impl EmbeddedImage {
    /// Embed source bytes without re-encoding, choosing the path from the
    /// declared encoding. Unknown encodings take the JPEG path.
    pub fn from_source(encoding: &ImageEncoding, bytes: &[u8]) -> Result<Self> {
        match encoding {
            ImageEncoding::Png => Self::from_png(bytes),
            ImageEncoding::Jpeg => Self::from_jpeg(bytes),
            ImageEncoding::Unknown(subtype) => {
                warn!(subtype, "Unrecognised image subtype, embedding as JPEG");
                Self::from_jpeg(bytes)
            }
        }
    }

    /// Wrap JPEG bytes in a DCTDecode image stream. Only the header is parsed.
    pub fn from_jpeg(bytes: &[u8]) -> Result<Self> {
        let decoder = JpegDecoder::new(Cursor::new(bytes))
            .map_err(|err| ForgeError::Embed(format!("not a readable JPEG: {err}")))?;
        let (width, height) = decoder.dimensions();
        if width == 0 || height == 0 {
            return Err(ForgeError::Embed("JPEG has zero width or height".into()));
        }

        let (color_space, components) = match decoder.original_color_type() {
            ExtendedColorType::L1 | ExtendedColorType::L8 | ExtendedColorType::L16 => {
                ("DeviceGray", 1)
            }
            ExtendedColorType::Cmyk8 => ("DeviceCMYK", 4),
            _ => ("DeviceRGB", 3),
        };

        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        };
        if components == 4 {
            // Adobe CMYK JPEGs store inverted samples.
            let decode: Vec<Object> = (0..components)
                .flat_map(|_| [Object::Integer(1), Object::Integer(0)])
                .collect();
            dict.set("Decode", decode);
        }

        debug!(width, height, color_space, "JPEG embedded as-is");
        Ok(Self {
            width,
            height,
            stream: Stream::new(dict, bytes.to_vec()).with_compression(false),
            soft_mask: None,
        })
    }

    /// Decode PNG bytes into raw samples plus an optional alpha soft mask.
    pub fn from_png(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .map_err(|err| ForgeError::Embed(format!("not a readable PNG: {err}")))?;
        let (width, height) = (decoded.width(), decoded.height());
        if width == 0 || height == 0 {
            return Err(ForgeError::Embed("PNG has zero width or height".into()));
        }

        let color = decoded.color();
        let (samples, color_space) = if color.has_color() {
            (decoded.to_rgb8().into_raw(), "DeviceRGB")
        } else {
            (decoded.to_luma8().into_raw(), "DeviceGray")
        };

        let soft_mask = color.has_alpha().then(|| {
            let alpha: Vec<u8> = decoded.to_rgba8().pixels().map(|pixel| pixel.0[3]).collect();
            Stream::new(sample_dict(width, height, "DeviceGray"), alpha)
        });

        debug!(
            width,
            height,
            color_space,
            has_alpha = soft_mask.is_some(),
            "PNG decoded for embedding"
        );
        Ok(Self {
            width,
            height,
            stream: Stream::new(sample_dict(width, height, color_space), samples),
            soft_mask,
        })
    }

    /// Natural size in points (one point per pixel).
    pub fn dimensions(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }

    pub fn has_soft_mask(&self) -> bool {
        self.soft_mask.is_some()
    }
}

fn sample_dict(width: u32, height: u32, color_space: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => color_space,
        "BitsPerComponent" => 8,
    }
}
