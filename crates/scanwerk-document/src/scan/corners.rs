// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page corner detection — finds the quadrilateral outline of a photographed
// document using edge detection, contour tracing, and polygon simplification.

use image::DynamicImage;
use imageproc::contours::{Contour, find_contours};
use imageproc::edges::canny;
use imageproc::geometry::{approximate_polygon_dp, arc_length, contour_area};
use imageproc::point::Point;
use scanwerk_core::ScanConfig;
use scanwerk_core::error::{Result, ScanwerkError};
use tracing::{debug, instrument, trace};

/// Four page corners in pixel coordinates, in the order they were detected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub points: [(f32, f32); 4],
}

impl Quad {
    pub fn new(points: [(f32, f32); 4]) -> Self {
        Self { points }
    }
}

/// Locate the document outline in `image`.
///
/// ## Pipeline
///
/// 1. Convert to grayscale
/// 2. Canny edge detection (Canny smooths with its own fixed Gaussian first)
/// 3. Trace every contour in the edge map, keep the largest few by area
/// 4. Walk the candidates from largest to smallest, skipping ones that are
///    too small or too short, and accept the first whose simplified outline
///    has exactly four vertices
///
/// Returns `Ok(None)` when no candidate qualifies. That is the normal outcome
/// for close-ups and photos without visible page edges. Errors are reserved
/// for inputs the detector cannot run on at all.
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn find_document_corners(image: &DynamicImage, config: &ScanConfig) -> Result<Option<Quad>> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(ScanwerkError::Detection("image has no pixels".into()));
    }
    if !(config.canny_low < config.canny_high) {
        return Err(ScanwerkError::Detection(format!(
            "unusable Canny thresholds {}..{}",
            config.canny_low, config.canny_high
        )));
    }

    let image_area = width as f64 * height as f64;
    let min_area = image_area * config.min_area_ratio;

    let gray = image.to_luma8();
    let edges = canny(&gray, config.canny_low, config.canny_high);

    let contours: Vec<Contour<i32>> = find_contours(&edges);
    let traced = contours.len();

    let mut candidates: Vec<(f64, Vec<Point<i32>>)> = contours
        .into_iter()
        .filter(|contour| contour.points.len() >= 3)
        .map(|contour| (contour_area(&contour.points).abs(), contour.points))
        .collect();
    candidates.sort_by(|a, b| b.0.total_cmp(&a.0));
    candidates.truncate(config.max_candidates);

    debug!(traced, kept = candidates.len(), min_area, "Contours traced");

    for (rank, (area, points)) in candidates.iter().enumerate() {
        if *area < min_area {
            trace!(rank, area, "Candidate below minimum area");
            continue;
        }

        let perimeter = arc_length(points, true);
        if perimeter < config.min_perimeter {
            trace!(rank, perimeter, "Candidate perimeter too short");
            continue;
        }

        let outline = simplify_closed(points, config.approx_epsilon_ratio * perimeter);
        trace!(rank, area, perimeter, vertices = outline.len(), "Candidate simplified");

        if let &[a, b, c, d] = outline.as_slice() {
            let quad = Quad::new([to_f32(a), to_f32(b), to_f32(c), to_f32(d)]);
            debug!(rank, area, corners = ?quad.points, "Document outline found");
            return Ok(Some(quad));
        }
    }

    debug!("No quadrilateral candidate");
    Ok(None)
}

/// Douglas-Peucker simplification of a closed contour.
///
/// `approximate_polygon_dp` always keeps both endpoints of the point list,
/// and those sit next to each other on a closed contour. Trailing vertices
/// that lie within `epsilon` of the first one are folded back into it.
fn simplify_closed(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if epsilon <= 0.0 || points.len() < 3 {
        return points.to_vec();
    }
    let mut outline = approximate_polygon_dp(points, epsilon, true);
    while outline.len() > 1 {
        let first = outline[0];
        let last = outline[outline.len() - 1];
        if point_distance(first, last) <= epsilon {
            outline.pop();
        } else {
            break;
        }
    }
    outline
}

/// Compute the area of a quadrilateral given by four vertices using the
/// shoelace formula. The vertices should be in order (CW or CCW).
pub(crate) fn shoelace_area(corners: &[(f32, f32); 4]) -> f32 {
    let n = corners.len();
    let mut area = 0.0f32;
    for i in 0..n {
        let j = (i + 1) % n;
        area += corners[i].0 * corners[j].1;
        area -= corners[j].0 * corners[i].1;
    }
    area.abs() / 2.0
}

fn point_distance(a: Point<i32>, b: Point<i32>) -> f64 {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    (dx * dx + dy * dy).sqrt()
}

fn to_f32(p: Point<i32>) -> (f32, f32) {
    (p.x as f32, p.y as f32)
}

// -- Tests --------------------------------------------------------------------
