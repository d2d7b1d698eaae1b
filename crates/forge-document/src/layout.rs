// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Placement math for putting an image into a box.
//
// Two fits are used: the rasterizer's aspect-ratio branch (which side of the
// canvas the image spans) and the page fit (`min` of the two axis scales).
// Both keep the aspect ratio and centre the result; they differ only in how
// they are written, so the assembler and the rasterizer agree on geometry.

/// Where an image is drawn inside a box, in the box's units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Left edge offset.
    pub x: f32,
    /// Bottom (PDF) or top (canvas) edge offset.
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Uniform scale applied to the source dimensions.
    pub scale: f32,
}

impl Placement {
    /// Draw at native size from the origin.
    pub fn full_bleed(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            scale: 1.0,
        }
    }
}

/// Scale `image` to fit inside `page` and centre it on both axes.
///
/// `scale = min(page_w / image_w, page_h / image_h)` and each offset is
/// `(page − scaled) / 2`.
pub fn fit_to_page(page: (f32, f32), image: (f32, f32)) -> Placement {
    let (page_w, page_h) = page;
    let (image_w, image_h) = image;

    let scale = (page_w / image_w).min(page_h / image_h);
    let width = image_w * scale;
    let height = image_h * scale;

    Placement {
        x: (page_w - width) / 2.0,
        y: (page_h - height) / 2.0,
        width,
        height,
        scale,
    }
}

/// Fit `image` onto `canvas` by comparing aspect ratios.
///
/// A relatively wider image spans the canvas width and is centred vertically;
/// otherwise it spans the canvas height and is centred horizontally.
pub fn fit_to_canvas(canvas: (f32, f32), image: (f32, f32)) -> Placement {
    let (canvas_w, canvas_h) = canvas;
    let (image_w, image_h) = image;

    let image_aspect = image_w / image_h;
    let canvas_aspect = canvas_w / canvas_h;

    if image_aspect > canvas_aspect {
        let height = canvas_w / image_aspect;
        Placement {
            x: 0.0,
            y: (canvas_h - height) / 2.0,
            width: canvas_w,
            height,
            scale: canvas_w / image_w,
        }
    } else {
        let width = canvas_h * image_aspect;
        Placement {
            x: (canvas_w - width) / 2.0,
            y: 0.0,
            width,
            height: canvas_h,
            scale: canvas_h / image_h,
        }
    }
}
