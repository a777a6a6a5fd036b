// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline — page corner detection, perspective rectification,
// adaptive cleanup, and the orchestrator that chains them with fallbacks.

pub mod clean;
pub mod corners;
pub mod pipeline;
pub mod rectify;

pub use clean::clean_page;
pub use corners::{Quad, find_document_corners};
pub use pipeline::{ScanOutcome, ScanPipeline};
pub use rectify::{OrderedCorners, fix_perspective, order_corners};

/// Synthetic page photos shared by the scan tests.
#[cfg(test)]
pub(crate) mod test_support {
    use image::{DynamicImage, Rgb, RgbImage};
    use imageproc::drawing::{draw_filled_rect_mut, draw_polygon_mut};
    use imageproc::point::Point;
    use imageproc::rect::Rect;

    pub const BACKGROUND: Rgb<u8> = Rgb([25, 30, 35]);
    pub const PAPER: Rgb<u8> = Rgb([235, 235, 230]);
    pub const INK: Rgb<u8> = Rgb([20, 20, 20]);

    /// A dark frame with a light page drawn as the given polygon.
    pub fn photo_with_page(width: u32, height: u32, corners: [(i32, i32); 4]) -> DynamicImage {
        let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
        let poly: Vec<Point<i32>> = corners.iter().map(|&(x, y)| Point::new(x, y)).collect();
        draw_polygon_mut(&mut img, &poly, PAPER);
        DynamicImage::ImageRgb8(img)
    }

    /// An axis-aligned page with a few "text lines" printed on it.
    pub fn photo_with_text_page(width: u32, height: u32, left: i32, top: i32, right: i32, bottom: i32) -> DynamicImage {
        let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
        draw_filled_rect_mut(
            &mut img,
            Rect::at(left, top).of_size((right - left) as u32, (bottom - top) as u32),
            PAPER,
        );
        let mut y = top + 30;
        while y + 6 < bottom - 30 {
            draw_filled_rect_mut(
                &mut img,
                Rect::at(left + 30, y).of_size((right - left - 60) as u32, 6),
                INK,
            );
            y += 24;
        }
        DynamicImage::ImageRgb8(img)
    }

    /// A close-up of printed text: no page border anywhere in frame.
    pub fn close_up_text(width: u32, height: u32) -> DynamicImage {
        let mut img = RgbImage::from_pixel(width, height, PAPER);
        let mut y = 10;
        while y + 4 < height as i32 {
            let mut x = 8;
            while x + 10 < width as i32 {
                draw_filled_rect_mut(&mut img, Rect::at(x, y).of_size(10, 4), INK);
                x += 16;
            }
            y += 14;
        }
        DynamicImage::ImageRgb8(img)
    }

    pub fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
        ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
    }
}
