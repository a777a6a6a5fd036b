// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification — orders the detected page corners and warps the
// enclosed quadrilateral onto an upright rectangle.

use image::{DynamicImage, ImageBuffer, Luma, Pixel, Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use scanwerk_core::error::{Result, ScanwerkError};
use tracing::{debug, info, instrument};

use super::corners::{Quad, shoelace_area};

/// Page corners assigned to their positions on the upright page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderedCorners {
    pub top_left: (f32, f32),
    pub top_right: (f32, f32),
    pub bottom_right: (f32, f32),
    pub bottom_left: (f32, f32),
}

impl OrderedCorners {
    /// Corners clockwise from the top-left.
    pub fn as_array(&self) -> [(f32, f32); 4] {
        [self.top_left, self.top_right, self.bottom_right, self.bottom_left]
    }

    /// Output page size: the longer of each pair of opposite edges, with each
    /// edge length truncated to whole pixels.
    pub fn target_dimensions(&self) -> (u32, u32) {
        let bottom = edge_length(self.bottom_right, self.bottom_left);
        let top = edge_length(self.top_right, self.top_left);
        let right = edge_length(self.top_right, self.bottom_right);
        let left = edge_length(self.top_left, self.bottom_left);
        (bottom.max(top), right.max(left))
    }
}

/// Assign the four corners by the sum/difference rule.
///
/// The top-left corner has the smallest `x + y` and the bottom-right the
/// largest. The top-right corner has the smallest `y - x` and the bottom-left
/// the largest. Ties go to the earliest point, so the assignment does not
/// depend on the order the corners were detected in unless two corners tie.
pub fn order_corners(quad: &Quad) -> OrderedCorners {
    let sum = |p: &(f32, f32)| p.0 + p.1;
    let diff = |p: &(f32, f32)| p.1 - p.0;
    let points = &quad.points;

    OrderedCorners {
        top_left: points[arg_extreme(points, sum, |a, b| a < b)],
        bottom_right: points[arg_extreme(points, sum, |a, b| a > b)],
        top_right: points[arg_extreme(points, diff, |a, b| a < b)],
        bottom_left: points[arg_extreme(points, diff, |a, b| a > b)],
    }
}

/// Warp the page outlined by `quad` onto an upright rectangle.
///
/// The output is exactly the size reported by
/// [`OrderedCorners::target_dimensions`]. Grayscale input stays grayscale;
/// anything else comes back as RGB.
///
/// # Errors
///
/// - [`ScanwerkError::Validation`] if the rectangle would be narrower or
///   shorter than `min_dimension`, or the corners enclose no area
///   (collinear or coincident points).
/// - [`ScanwerkError::Transform`] if no projective transform maps the corners
///   onto the rectangle.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn fix_perspective(image: &DynamicImage, quad: &Quad, min_dimension: u32) -> Result<DynamicImage> {
    let ordered = order_corners(quad);
    let (out_w, out_h) = ordered.target_dimensions();
    debug!(corners = ?ordered, out_w, out_h, "Corners ordered");

    if out_w < min_dimension || out_h < min_dimension {
        return Err(ScanwerkError::Validation(format!(
            "rectified page would be {out_w}x{out_h} px, below the {min_dimension}px minimum"
        )));
    }

    let src = ordered.as_array();
    if shoelace_area(&src) < 1.0 {
        return Err(ScanwerkError::Validation(format!(
            "corners {src:?} enclose no area"
        )));
    }

    let right = (out_w - 1) as f32;
    let bottom = (out_h - 1) as f32;
    let dest: [(f32, f32); 4] = [
        (0.0, 0.0),      // top-left
        (right, 0.0),    // top-right
        (right, bottom), // bottom-right
        (0.0, bottom),   // bottom-left
    ];

    let projection = Projection::from_control_points(src, dest).ok_or_else(|| {
        ScanwerkError::Transform(format!("no projective transform maps {src:?} to {dest:?}"))
    })?;

    let warped = match image {
        DynamicImage::ImageLuma8(gray) => {
            DynamicImage::ImageLuma8(warp_page(gray, &projection, Luma([0u8]), out_w, out_h))
        }
        other => {
            let rgb: RgbImage = other.to_rgb8();
            DynamicImage::ImageRgb8(warp_page(&rgb, &projection, Rgb([0u8, 0, 0]), out_w, out_h))
        }
    };

    info!(out_w, out_h, "Perspective correction applied");
    Ok(warped)
}

fn warp_page<P>(
    input: &ImageBuffer<P, Vec<u8>>,
    projection: &Projection,
    fill: P,
    out_w: u32,
    out_h: u32,
) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8> + Send + Sync,
{
    let mut output = ImageBuffer::from_pixel(out_w, out_h, fill);
    warp_into(input, projection, Interpolation::Bilinear, fill, &mut output);
    output
}

fn arg_extreme(
    points: &[(f32, f32); 4],
    key: impl Fn(&(f32, f32)) -> f32,
    better: impl Fn(f32, f32) -> bool,
) -> usize {
    let mut best = 0;
    for i in 1..points.len() {
        if better(key(&points[i]), key(&points[best])) {
            best = i;
        }
    }
    best
}

fn edge_length(a: (f32, f32), b: (f32, f32)) -> u32 {
    let dx = (a.0 - b.0) as f64;
    let dy = (a.1 - b.1) as f64;
    (dx * dx + dy * dy).sqrt() as u32
}

// -- Tests --------------------------------------------------------------------
