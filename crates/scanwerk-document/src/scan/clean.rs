// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page cleanup — Sauvola adaptive binarization followed by a small
// morphological opening that removes isolated specks.

use image::imageops::invert;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::morphology::{Mask, grayscale_dilate, grayscale_erode};
use scanwerk_core::ScanConfig;
use scanwerk_core::error::{Result, ScanwerkError};
use tracing::{debug, info, instrument};

/// Binarize and despeckle a page for printing.
///
/// 1. Convert to grayscale (if needed)
/// 2. Sauvola threshold over a `sauvola_window` square neighbourhood
/// 3. Pixels brighter than their threshold become white (255), others black
/// 4. Invert, erode and dilate once with a 2x2 element, invert back
///
/// The result is always single-channel and the same size as the input.
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn clean_page(image: &DynamicImage, config: &ScanConfig) -> Result<GrayImage> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(ScanwerkError::Cleaning("image has no pixels".into()));
    }
    if config.sauvola_window < 1 || config.sauvola_window % 2 == 0 {
        return Err(ScanwerkError::Cleaning(format!(
            "Sauvola window must be odd, got {}",
            config.sauvola_window
        )));
    }
    if !(config.sauvola_r > 0.0) {
        return Err(ScanwerkError::Cleaning(format!(
            "Sauvola range must be positive, got {}",
            config.sauvola_r
        )));
    }

    let gray = image.to_luma8();
    let binary = sauvola_binarize(&gray, config.sauvola_window, config.sauvola_k, config.sauvola_r);
    debug!(window = config.sauvola_window, "Sauvola binarization complete");

    let mut ink = binary;
    invert(&mut ink);
    let mut cleaned = open_2x2(&ink);
    invert(&mut cleaned);

    info!("Page cleaned");
    Ok(cleaned)
}

/// Threshold each pixel against `mean * (1 + k * (stddev / r - 1))` of its
/// `window` x `window` neighbourhood.
pub fn sauvola_binarize(gray: &GrayImage, window: u32, k: f64, r: f64) -> GrayImage {
    let (width, height) = gray.dimensions();
    let tables = IntegralTables::reflect_padded(gray, window / 2);
    let count = (window as f64) * (window as f64);

    GrayImage::from_fn(width, height, |x, y| {
        let (sum, sum_sq) = tables.window_sums(x, y, window);
        let mean = sum / count;
        let variance = (sum_sq / count - mean * mean).max(0.0);
        let threshold = mean * (1.0 + k * (variance.sqrt() / r - 1.0));
        let value = gray.get_pixel(x, y).0[0] as f64;
        Luma([if value > threshold { 255u8 } else { 0u8 }])
    })
}

// -- Integral image helpers ---------------------------------------------------

/// Summed-area tables of pixel values and squared pixel values over the
/// image padded by `pad` on every side with mirror reflection (the edge pixel
/// itself is not repeated).
///
/// `sum[y * stride + x]` contains the sum over the padded rectangle
/// [0, 0) to (x, y), exclusive on both axes.
struct IntegralTables {
    stride: usize,
    sum: Vec<u64>,
    sum_sq: Vec<u64>,
}

impl IntegralTables {
    fn reflect_padded(gray: &GrayImage, pad: u32) -> Self {
        let (w, h) = gray.dimensions();
        let padded_w = (w + 2 * pad) as usize;
        let padded_h = (h + 2 * pad) as usize;
        let stride = padded_w + 1;
        let mut sum = vec![0u64; stride * (padded_h + 1)];
        let mut sum_sq = vec![0u64; stride * (padded_h + 1)];

        let source_x: Vec<u32> = (0..padded_w)
            .map(|px| reflect(px as i64 - pad as i64, w))
            .collect();

        for py in 0..padded_h {
            let sy = reflect(py as i64 - pad as i64, h);
            let mut row_sum = 0u64;
            let mut row_sum_sq = 0u64;
            for (px, &sx) in source_x.iter().enumerate() {
                let v = gray.get_pixel(sx, sy).0[0] as u64;
                row_sum += v;
                row_sum_sq += v * v;
                let idx = (py + 1) * stride + px + 1;
                let above = py * stride + px + 1;
                sum[idx] = row_sum + sum[above];
                sum_sq[idx] = row_sum_sq + sum_sq[above];
            }
        }

        Self { stride, sum, sum_sq }
    }

    /// Sums over the window whose top-left corner is (x, y) in padded
    /// coordinates, i.e. the window centred on image pixel (x, y).
    fn window_sums(&self, x: u32, y: u32, window: u32) -> (f64, f64) {
        let (x1, y1) = (x as usize, y as usize);
        let (x2, y2) = (x1 + window as usize, y1 + window as usize);
        let s = self.stride;
        let rect = |t: &[u64]| -> f64 {
            (t[y2 * s + x2] + t[y1 * s + x1]) as f64 - (t[y1 * s + x2] + t[y2 * s + x1]) as f64
        };
        (rect(&self.sum), rect(&self.sum_sq))
    }
}

/// Mirror an out-of-range index back into `0..len` without repeating the
/// edge sample (`-1 -> 1`, `len -> len - 2`).
fn reflect(index: i64, len: u32) -> u32 {
    let n = len as i64;
    if n <= 1 {
        return 0;
    }
    let period = 2 * (n - 1);
    let mut m = index.rem_euclid(period);
    if m >= n {
        m = period - m;
    }
    m as u32
}

// -- Morphology ---------------------------------------------------------------

/// Erode then dilate once with a 2x2 element anchored at its bottom-right
/// cell: each output pixel looks at itself and its left, upper, and
/// upper-left neighbours. Neighbours outside the image are ignored.
fn open_2x2(img: &GrayImage) -> GrayImage {
    let element = Mask::from_image(&GrayImage::from_pixel(2, 2, Luma([255u8])), 1, 1);
    grayscale_dilate(&grayscale_erode(img, &element), &element)
}

// -- Tests --------------------------------------------------------------------
