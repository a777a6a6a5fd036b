// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — turns uploads into scanned pages and scanned pages into
// files. The command-line front end calls only into this module.

use std::path::{Path, PathBuf};

use scanwerk_core::AppConfig;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_document::image::kind_for_path;
use scanwerk_document::{ImageProcessor, PdfWriter, ScanPipeline};
use tracing::{debug, info, instrument};

use crate::session::{PageSequence, ScannedPage};

pub struct ScanService {
    config: AppConfig,
    pipeline: ScanPipeline,
}

impl ScanService {
    pub fn new(config: AppConfig) -> Self {
        let pipeline = ScanPipeline::new(config.scan.clone());
        Self { config, pipeline }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Read, decode and scan the photo at `path`.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn ingest_file(&self, path: &Path) -> Result<ScannedPage> {
        kind_for_path(path)?;
        let bytes = std::fs::read(path)?;
        self.ingest_bytes(label_for(path), &bytes)
    }

    /// Like [`ingest_file`](Self::ingest_file), but returns `Ok(None)` without
    /// reading the file when `pages` already holds a page with its label.
    pub fn ingest_new(&self, pages: &PageSequence, path: &Path) -> Result<Option<ScannedPage>> {
        if pages.contains_label(&label_for(path)) {
            debug!(path = %path.display(), "Already added; not scanned again");
            return Ok(None);
        }
        self.ingest_file(path).map(Some)
    }

    /// Decode and scan an uploaded photo.
    #[instrument(skip_all, fields(bytes_len = bytes.len()))]
    pub fn ingest_bytes(&self, label: impl Into<String>, bytes: &[u8]) -> Result<ScannedPage> {
        let photo = ImageProcessor::from_bytes(bytes)?
            .fit_upload(bytes.len() as u64, self.config.max_upload_bytes)
            .into_dynamic();
        let outcome = self.pipeline.process(&photo);
        Ok(ScannedPage::new(label, photo, outcome))
    }

    /// Assemble every processed page into one PDF at `path`.
    #[instrument(skip_all, fields(pages = pages.len()))]
    pub fn export_pdf(&self, pages: &PageSequence, path: &Path) -> Result<()> {
        if pages.is_empty() {
            return Err(ScanwerkError::EmptySequence);
        }
        let mut writer = PdfWriter::new(self.config.paper_size);
        writer.set_title(self.config.pdf_title.clone());
        writer.write_pages_to_file(&pages.processed_images(), path)
    }

    /// Write each processed page as `page_001.png`, `page_002.png`, ... under
    /// `dir`, creating it if needed. Returns the written paths in order.
    pub fn save_pages(&self, pages: &PageSequence, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(pages.len());
        for (index, image) in pages.processed_images().into_iter().enumerate() {
            let path = dir.join(format!("page_{:03}.png", index + 1));
            ImageProcessor::from_dynamic(image).save(&path)?;
            written.push(path);
        }
        info!(count = written.len(), dir = %dir.display(), "Processed pages saved");
        Ok(written)
    }
}

/// The session label of an uploaded file: its file name.
pub fn label_for(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load the configuration at `path`, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => {
            let config = AppConfig::load(path)?;
            info!(path = %path.display(), "Configuration loaded");
            Ok(config)
        }
        None => Ok(AppConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use scanwerk_core::Stage;

    fn photo_bytes(format: ImageFormat) -> Vec<u8> {
        let mut img = RgbImage::from_pixel(160, 120, Rgb([235, 235, 230]));
        for y in (20..100).step_by(12) {
            for x in 20..140 {
                img.put_pixel(x, y, Rgb([20, 20, 20]));
                img.put_pixel(x, y + 1, Rgb([20, 20, 20]));
            }
        }
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), format)
            .expect("encode");
        bytes
    }

    #[test]
    fn ingest_reports_every_stage() {
        let service = ScanService::new(AppConfig::default());
        let page = service.ingest_bytes("photo.png", &photo_bytes(ImageFormat::Png)).expect("ingest");
        let stages: Vec<Stage> = page.reports.iter().map(|r| r.stage).collect();
        assert_eq!(stages, [Stage::DetectCorners, Stage::Rectify, Stage::Clean]);
        assert_eq!(page.label, "photo.png");
        assert_eq!(page.original.width(), 160);
    }

    #[test]
    fn oversized_upload_is_halved_before_scanning() {
        let config = AppConfig {
            max_upload_bytes: 16,
            ..AppConfig::default()
        };
        let service = ScanService::new(config);
        let page = service.ingest_bytes("big.jpg", &photo_bytes(ImageFormat::Jpeg)).expect("ingest");
        assert_eq!((page.original.width(), page.original.height()), (80, 60));
    }

    #[test]
    fn unsupported_extension_is_rejected_before_reading() {
        let service = ScanService::new(AppConfig::default());
        assert!(matches!(
            service.ingest_file(Path::new("does/not/exist.gif")),
            Err(ScanwerkError::UnsupportedImage(_))
        ));
    }

    #[test]
    fn export_and_save_pages() {
        let dir = tempfile::tempdir().expect("tempdir");
        let photo = dir.path().join("receipt.png");
        std::fs::write(&photo, photo_bytes(ImageFormat::Png)).expect("write photo");

        let service = ScanService::new(AppConfig::default());
        let mut pages = PageSequence::new();
        pages.push(service.ingest_file(&photo).expect("ingest"));
        pages.push(service.ingest_bytes("second.png", &photo_bytes(ImageFormat::Png)).expect("ingest"));

        let pdf = dir.path().join("out.pdf");
        service.export_pdf(&pages, &pdf).expect("export");
        assert!(std::fs::read(&pdf).expect("pdf").starts_with(b"%PDF"));

        let written = service.save_pages(&pages, &dir.path().join("pages")).expect("save");
        assert_eq!(written.len(), 2);
        assert!(written[1].ends_with("page_002.png"));
        assert!(written.iter().all(|p| p.exists()));
    }

    #[test]
    fn known_label_is_not_read_again() {
        let service = ScanService::new(AppConfig::default());
        let mut pages = PageSequence::new();
        pages.push(service.ingest_bytes("receipt.png", &photo_bytes(ImageFormat::Png)).expect("ingest"));

        // The path does not exist; a read would fail with an I/O error.
        let again = service
            .ingest_new(&pages, Path::new("elsewhere/receipt.png"))
            .expect("duplicate is not an error");
        assert!(again.is_none());
        assert!(matches!(
            service.ingest_new(&pages, Path::new("elsewhere/other.png")),
            Err(ScanwerkError::Io(_))
        ));
    }

    #[test]
    fn exporting_nothing_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = ScanService::new(AppConfig::default());
        assert!(matches!(
            service.export_pdf(&PageSequence::new(), &dir.path().join("x.pdf")),
            Err(ScanwerkError::EmptySequence)
        ));
    }

    #[test]
    fn missing_config_path_uses_defaults() {
        let config = load_config(None).expect("defaults");
        assert_eq!(config.pdf_title, AppConfig::default().pdf_title);
    }
}
