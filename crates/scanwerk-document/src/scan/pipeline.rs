// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan pipeline — runs detect → rectify → clean on one photo, falling back to
// the last good image whenever a stage fails. Always yields a page.

use image::{DynamicImage, GrayImage};
use scanwerk_core::error::Result;
use scanwerk_core::{Outcome, ScanConfig, Stage, StageReport, StatusLevel};
use tracing::{info, instrument, warn};

use super::clean::clean_page;
use super::corners::{Quad, find_document_corners};
use super::rectify::fix_perspective;

/// The page produced for one photo, plus what happened along the way.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Final single-channel page image.
    pub image: GrayImage,
    /// One report per stage, in execution order.
    pub stages: Vec<StageReport>,
}

impl ScanOutcome {
    /// Report for `stage`, if it was recorded.
    pub fn report(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|r| r.stage == stage)
    }

    /// Whether the page was perspective corrected.
    pub fn rectified(&self) -> bool {
        self.report(Stage::Rectify)
            .is_some_and(|r| r.outcome == Outcome::Succeeded)
    }

    /// The most severe notification level among the stage reports.
    pub fn worst_level(&self) -> StatusLevel {
        if self.stages.iter().any(|r| r.level == StatusLevel::Warning) {
            StatusLevel::Warning
        } else if self.stages.iter().any(|r| r.level == StatusLevel::Info) {
            StatusLevel::Info
        } else {
            StatusLevel::Success
        }
    }
}

/// Turns a photographed document into a clean, upright page.
///
/// ```ignore
/// let outcome = ScanPipeline::new(ScanConfig::default()).process(&photo);
/// for report in &outcome.stages {
///     println!("{}: {}", report.stage, report.message);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScanPipeline {
    config: ScanConfig,
}

impl ScanPipeline {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Run the full pipeline on `image`. Never fails.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn process(&self, image: &DynamicImage) -> ScanOutcome {
        let detection = find_document_corners(image, &self.config);
        self.process_detected(image, detection)
    }

    /// Rectify and clean `image` given the detector's answer for it.
    fn process_detected(&self, image: &DynamicImage, detection: Result<Option<Quad>>) -> ScanOutcome {
        let mut stages = Vec::with_capacity(3);

        // -- Detect + rectify -------------------------------------------------
        let rectified = match detection {
            Ok(Some(quad)) => {
                stages.push(StageReport::new(
                    Stage::DetectCorners,
                    Outcome::Succeeded,
                    StatusLevel::Success,
                    "Document edges detected",
                ));
                match fix_perspective(image, &quad, self.config.min_dimension) {
                    Ok(warped) => {
                        stages.push(StageReport::new(
                            Stage::Rectify,
                            Outcome::Succeeded,
                            StatusLevel::Success,
                            "Document detected and perspective corrected",
                        ));
                        Some(warped)
                    }
                    Err(err) => {
                        warn!(error = %err, "Perspective correction failed; using original image");
                        stages.push(StageReport::new(
                            Stage::Rectify,
                            Outcome::FellBack,
                            StatusLevel::Warning,
                            "Document detected but perspective correction failed - using original image",
                        ));
                        None
                    }
                }
            }
            Ok(None) => {
                info!("No document edges; using original image");
                stages.push(StageReport::new(
                    Stage::DetectCorners,
                    Outcome::NotFound,
                    StatusLevel::Info,
                    "No suitable document edges detected - using original image",
                ));
                stages.push(skipped(Stage::Rectify));
                None
            }
            Err(err) => {
                warn!(error = %err, "Document detection failed; using original image");
                stages.push(StageReport::new(
                    Stage::DetectCorners,
                    Outcome::FellBack,
                    StatusLevel::Warning,
                    "Document detection failed - using original image",
                ));
                stages.push(skipped(Stage::Rectify));
                None
            }
        };
        let page = rectified.as_ref().unwrap_or(image);

        // -- Clean ------------------------------------------------------------
        let cleaned = match clean_page(page, &self.config) {
            Ok(cleaned) => {
                stages.push(StageReport::new(
                    Stage::Clean,
                    Outcome::Succeeded,
                    StatusLevel::Success,
                    "Page cleaned",
                ));
                cleaned
            }
            Err(err) => {
                warn!(error = %err, "Advanced cleaning failed; using grayscale");
                stages.push(StageReport::new(
                    Stage::Clean,
                    Outcome::FellBack,
                    StatusLevel::Warning,
                    "Advanced cleaning failed - using basic processing",
                ));
                page.to_luma8()
            }
        };

        info!(
            out_w = cleaned.width(),
            out_h = cleaned.height(),
            rectified = rectified.is_some(),
            "Scan pipeline complete"
        );
        ScanOutcome {
            image: cleaned,
            stages,
        }
    }
}

fn skipped(stage: Stage) -> StageReport {
    StageReport::new(stage, Outcome::Skipped, StatusLevel::Info, "Skipped")
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::test_support::{close_up_text, photo_with_page, photo_with_text_page};
    use image::Luma;
    use scanwerk_core::ScanwerkError;

    #[test]
    fn visible_page_is_rectified_and_cleaned() {
        let photo = photo_with_text_page(480, 360, 60, 40, 420, 320);
        let outcome = ScanPipeline::default().process(&photo);

        assert!(outcome.rectified(), "{:?}", outcome.stages);
        let rectify = outcome.report(Stage::Rectify).expect("rectify report");
        assert_eq!(rectify.level, StatusLevel::Success);
        assert_eq!(outcome.report(Stage::Clean).map(|r| r.outcome), Some(Outcome::Succeeded));

        // Cropped to roughly the 360x280 page.
        let (w, h) = outcome.image.dimensions();
        assert!((350..=370).contains(&w), "width {w}");
        assert!((270..=290).contains(&h), "height {h}");
        assert!(outcome.image.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        assert_eq!(outcome.worst_level(), StatusLevel::Success);
    }

    #[test]
    fn close_up_is_cleaned_without_rectification() {
        let photo = close_up_text(240, 160);
        let outcome = ScanPipeline::default().process(&photo);

        let detect = outcome.report(Stage::DetectCorners).expect("detect report");
        assert_eq!(detect.outcome, Outcome::NotFound);
        assert_eq!(detect.level, StatusLevel::Info);
        assert_eq!(outcome.report(Stage::Rectify).map(|r| r.outcome), Some(Outcome::Skipped));
        assert!(!outcome.rectified());

        let expected = clean_page(&photo, &ScanConfig::default()).expect("clean");
        assert_eq!(outcome.image, expected);
    }

    #[test]
    fn degenerate_corners_fall_back_to_cleaned_original() {
        let photo = photo_with_page(300, 200, [(20, 20), (280, 20), (280, 180), (20, 180)]);
        let collinear = Quad::new([(0.0, 0.0), (100.0, 100.0), (200.0, 200.0), (250.0, 250.0)]);
        let pipeline = ScanPipeline::default();
        let outcome = pipeline.process_detected(&photo, Ok(Some(collinear)));

        let rectify = outcome.report(Stage::Rectify).expect("rectify report");
        assert_eq!(rectify.outcome, Outcome::FellBack);
        assert_eq!(rectify.level, StatusLevel::Warning);
        assert_eq!(outcome.worst_level(), StatusLevel::Warning);

        let expected = clean_page(&photo, pipeline.config()).expect("clean");
        assert_eq!(outcome.image, expected);
    }

    #[test]
    fn thin_strip_keeps_original_dimensions() {
        // 900x44 strip: over 10% of the frame, but under 50px tall.
        let photo = photo_with_page(1000, 200, [(50, 78), (950, 78), (950, 122), (50, 122)]);
        let outcome = ScanPipeline::default().process(&photo);

        assert!(!outcome.rectified(), "{:?}", outcome.stages);
        assert_eq!(outcome.image.dimensions(), (1000, 200));
    }

    #[test]
    fn undersized_corners_fall_back_with_warning() {
        let photo = photo_with_page(1000, 200, [(50, 78), (950, 78), (950, 122), (50, 122)]);
        let strip = Quad::new([(50.0, 78.0), (950.0, 78.0), (950.0, 122.0), (50.0, 122.0)]);
        let outcome = ScanPipeline::default().process_detected(&photo, Ok(Some(strip)));

        assert_eq!(
            outcome.report(Stage::DetectCorners).map(|r| r.outcome),
            Some(Outcome::Succeeded)
        );
        let rectify = outcome.report(Stage::Rectify).expect("rectify report");
        assert_eq!(rectify.outcome, Outcome::FellBack);
        assert_eq!(rectify.level, StatusLevel::Warning);
        assert_eq!(
            rectify.message,
            "Document detected but perspective correction failed - using original image"
        );
        assert_eq!(outcome.image.dimensions(), (1000, 200));
    }

    #[test]
    fn detector_error_is_reported_as_warning() {
        let photo = close_up_text(120, 80);
        let outcome = ScanPipeline::default()
            .process_detected(&photo, Err(ScanwerkError::Detection("boom".into())));
        let detect = outcome.report(Stage::DetectCorners).expect("detect report");
        assert_eq!(detect.outcome, Outcome::FellBack);
        assert_eq!(detect.level, StatusLevel::Warning);
        assert_eq!(outcome.image.dimensions(), (120, 80));
    }

    #[test]
    fn cleaning_failure_falls_back_to_grayscale() {
        let config = ScanConfig {
            sauvola_window: 4,
            ..ScanConfig::default()
        };
        let photo = close_up_text(90, 60);
        let outcome = ScanPipeline::new(config).process(&photo);

        let clean = outcome.report(Stage::Clean).expect("clean report");
        assert_eq!(clean.outcome, Outcome::FellBack);
        assert_eq!(clean.level, StatusLevel::Warning);
        assert_eq!(outcome.image, photo.to_luma8());
    }

    #[test]
    fn empty_image_still_yields_a_page() {
        let photo = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        let outcome = ScanPipeline::default().process(&photo);
        assert_eq!(outcome.image.dimensions(), (0, 0));
        assert_eq!(outcome.stages.len(), 3);
        assert_eq!(outcome.report(Stage::Clean).map(|r| r.outcome), Some(Outcome::FellBack));
    }

    #[test]
    fn grayscale_fallback_passes_gray_through() {
        let gray = GrayImage::from_fn(40, 30, |x, y| Luma([(x + y) as u8]));
        let photo = DynamicImage::ImageLuma8(gray.clone());
        let config = ScanConfig {
            sauvola_r: 0.0,
            ..ScanConfig::default()
        };
        let outcome = ScanPipeline::new(config).process(&photo);
        assert_eq!(outcome.image, gray);
    }
}
