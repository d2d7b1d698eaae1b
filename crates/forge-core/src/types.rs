// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Private Forge.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ForgeError;

/// Unique identifier for an entry in the merge list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How an image payload is encoded, as declared by its media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageEncoding {
    Jpeg,
    Png,
    /// Any other `image/*` subtype. Embedded through the JPEG path when
    /// compression is off.
    Unknown(String),
}

impl ImageEncoding {
    /// Classify an image subtype (the part after `image/`).
    fn from_subtype(subtype: &str) -> Self {
        if subtype.contains("png") {
            Self::Png
        } else if subtype.contains("jpg") || subtype.contains("jpeg") {
            Self::Jpeg
        } else {
            Self::Unknown(subtype.to_string())
        }
    }
}

/// What kind of file an entry holds. Resolved once, when the entry is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    Image(ImageEncoding),
    Pdf,
}

impl EntryKind {
    /// Classify a declared media type such as `image/png` or `application/pdf`.
    pub fn from_media_type(media_type: &str) -> Result<Self, ForgeError> {
        let lowered = media_type.trim().to_ascii_lowercase();
        if let Some(subtype) = lowered.strip_prefix("image/") {
            Ok(Self::Image(ImageEncoding::from_subtype(subtype)))
        } else if lowered == "application/pdf" {
            Ok(Self::Pdf)
        } else {
            Err(ForgeError::UnsupportedMediaType(media_type.to_string()))
        }
    }

    pub fn is_pdf(&self) -> bool {
        matches!(self, Self::Pdf)
    }
}

/// Media type for a file extension, for callers that only have a path.
pub fn media_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "pdf" => Some("application/pdf"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        _ => None,
    }
}

/// One user-supplied file in the ordered merge list.
#[derive(Debug, Clone)]
pub struct Entry {
    pub id: EntryId,
    pub kind: EntryKind,
    pub payload: Vec<u8>,
    /// Display name, usually the original file name.
    pub name: Option<String>,
    /// Page count for PDFs, for display only. The assembler never reads it.
    pub page_count: Option<u32>,
}

impl Entry {
    /// Build an entry from raw bytes and a declared media type.
    pub fn classify(media_type: &str, payload: Vec<u8>) -> Result<Self, ForgeError> {
        let kind = EntryKind::from_media_type(media_type)?;
        Ok(Self::new(kind, payload))
    }

    pub fn new(kind: EntryKind, payload: Vec<u8>) -> Self {
        Self {
            id: EntryId::new(),
            kind,
            payload,
            name: None,
            page_count: None,
        }
    }

    pub fn image(encoding: ImageEncoding, payload: Vec<u8>) -> Self {
        Self::new(EntryKind::Image(encoding), payload)
    }

    pub fn pdf(payload: Vec<u8>) -> Self {
        Self::new(EntryKind::Pdf, payload)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_page_count(mut self, page_count: u32) -> Self {
        self.page_count = Some(page_count);
        self
    }
}

/// Output page size for image entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageGeometry {
    A4,
    Letter,
    Legal,
    A3,
    A5,
    Tabloid,
    /// Use the source image's pixel dimensions as the page size.
    #[serde(rename = "Original Size")]
    OriginalSize,
}

impl PageGeometry {
    pub const ALL: [PageGeometry; 7] = [
        Self::A4,
        Self::Letter,
        Self::Legal,
        Self::A3,
        Self::A5,
        Self::Tabloid,
        Self::OriginalSize,
    ];

    /// Page size in points (width, height). `None` for [`PageGeometry::OriginalSize`].
    pub fn dimensions(&self) -> Option<(f32, f32)> {
        match self {
            Self::A4 => Some((595.0, 842.0)),
            Self::Letter => Some((612.0, 792.0)),
            Self::Legal => Some((612.0, 1008.0)),
            Self::A3 => Some((842.0, 1191.0)),
            Self::A5 => Some((420.0, 595.0)),
            Self::Tabloid => Some((792.0, 1224.0)),
            Self::OriginalSize => None,
        }
    }

    pub fn is_original(&self) -> bool {
        matches!(self, Self::OriginalSize)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::A4 => "A4",
            Self::Letter => "Letter",
            Self::Legal => "Legal",
            Self::A3 => "A3",
            Self::A5 => "A5",
            Self::Tabloid => "Tabloid",
            Self::OriginalSize => "Original Size",
        }
    }
}

impl fmt::Display for PageGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PageGeometry {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalised.as_str() {
            "a4" => Ok(Self::A4),
            "letter" => Ok(Self::Letter),
            "legal" => Ok(Self::Legal),
            "a3" => Ok(Self::A3),
            "a5" => Ok(Self::A5),
            "tabloid" => Ok(Self::Tabloid),
            "original" | "originalsize" => Ok(Self::OriginalSize),
            _ => Err(ForgeError::InvalidGeometry(s.to_string())),
        }
    }
}

/// JPEG quality for re-encoded images, always within 1..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct Quality(u8);

impl Quality {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 100;

    /// Clamp `value` into 1..=100.
    pub fn new(value: i64) -> Self {
        Self(value.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

impl From<i64> for Quality {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<Quality> for i64 {
    fn from(quality: Quality) -> Self {
        quality.0 as i64
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Quality {
    type Err = ForgeError;

    /// Parse an integer and clamp it. Non-numeric input is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self::new)
            .map_err(|_| ForgeError::InvalidQuality(s.to_string()))
    }
}

/// Options for a single assembly call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Re-encode images as JPEG at `quality` before embedding.
    pub compress: bool,
    pub quality: Quality,
    pub page_geometry: PageGeometry,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            compress: true,
            quality: Quality::default(),
            page_geometry: PageGeometry::OriginalSize,
        }
    }
}
