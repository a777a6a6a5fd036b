// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application and pipeline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanwerkError};

/// Files larger than this are downscaled by half before processing.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Tuning knobs for the detect / rectify / clean pipeline.
///
/// The defaults reproduce the reference behaviour; changing them is meant
/// for experimentation on unusual inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Canny hysteresis low threshold. Canny applies its own fixed Gaussian
    /// blur before the gradient, so no extra smoothing is configured.
    pub canny_low: f32,
    /// Canny hysteresis high threshold.
    pub canny_high: f32,
    /// Number of largest contours considered as page candidates.
    pub max_candidates: usize,
    /// Minimum contour area as a fraction of the image area.
    pub min_area_ratio: f64,
    /// Minimum contour perimeter in pixels.
    pub min_perimeter: f64,
    /// Polygon simplification tolerance as a fraction of the perimeter.
    pub approx_epsilon_ratio: f64,
    /// Smallest accepted width/height of a rectified page.
    pub min_dimension: u32,
    /// Side of the square Sauvola window (odd).
    pub sauvola_window: u32,
    /// Sauvola sensitivity `k`.
    pub sauvola_k: f64,
    /// Sauvola dynamic range of the standard deviation `R`.
    pub sauvola_r: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            canny_low: 70.0,
            canny_high: 150.0,
            max_candidates: 6,
            min_area_ratio: 0.1,
            min_perimeter: 100.0,
            approx_epsilon_ratio: 0.02,
            min_dimension: 50,
            sauvola_window: 25,
            sauvola_k: 0.2,
            sauvola_r: 127.5,
        }
    }
}

impl ScanConfig {
    /// Reject values that would make a stage meaningless.
    pub fn validate(&self) -> Result<()> {
        if !(self.canny_low < self.canny_high) {
            return Err(ScanwerkError::Config(format!(
                "canny_low ({}) must be below canny_high ({})",
                self.canny_low, self.canny_high
            )));
        }
        if self.max_candidates == 0 {
            return Err(ScanwerkError::Config("max_candidates must be at least 1".into()));
        }
        if !(self.min_perimeter >= 0.0) {
            return Err(ScanwerkError::Config(format!(
                "min_perimeter must not be negative, got {}",
                self.min_perimeter
            )));
        }
        if self.min_dimension == 0 {
            return Err(ScanwerkError::Config("min_dimension must be at least 1".into()));
        }
        for (name, ratio) in [
            ("min_area_ratio", self.min_area_ratio),
            ("approx_epsilon_ratio", self.approx_epsilon_ratio),
        ] {
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(ScanwerkError::Config(format!(
                    "{name} must be in (0, 1], got {ratio}"
                )));
            }
        }
        if self.sauvola_window < 3 || self.sauvola_window % 2 == 0 {
            return Err(ScanwerkError::Config(format!(
                "sauvola_window must be odd and at least 3, got {}",
                self.sauvola_window
            )));
        }
        if !(self.sauvola_r > 0.0) {
            return Err(ScanwerkError::Config("sauvola_r must be positive".into()));
        }
        Ok(())
    }
}

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Page format of assembled PDFs.
    pub paper_size: crate::PaperSize,
    /// Uploads above this many bytes are halved in each dimension.
    pub max_upload_bytes: u64,
    /// Title written into the PDF metadata.
    pub pdf_title: String,
    /// Pipeline tuning.
    pub scan: ScanConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            paper_size: crate::PaperSize::A4,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            pdf_title: "Scanned Document".into(),
            scan: ScanConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load a JSON configuration file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_upload_bytes == 0 {
            return Err(ScanwerkError::Config("max_upload_bytes must be non-zero".into()));
        }
        if let crate::PaperSize::Custom { width_mm, height_mm } = self.paper_size {
            if width_mm == 0 || height_mm == 0 {
                return Err(ScanwerkError::Config("custom paper size must be non-zero".into()));
            }
        }
        self.scan.validate()
    }
}
