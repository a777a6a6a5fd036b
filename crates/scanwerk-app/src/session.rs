// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan session — the ordered list of pages waiting to be exported.
//
// Each entry keeps the uploaded photo, the processed page, and the stage
// reports together, so reordering or removing a page can never pair one
// page's photo with another page's result.

use chrono::{DateTime, Utc};
use image::{DynamicImage, GrayImage};
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::{PageId, StageReport, StatusLevel};
use scanwerk_document::ScanOutcome;
use tracing::{debug, info};

/// One uploaded photo and what the scan pipeline made of it.
#[derive(Debug, Clone)]
pub struct ScannedPage {
    pub id: PageId,
    /// Upload name, used to skip duplicate uploads.
    pub label: String,
    pub original: DynamicImage,
    pub processed: GrayImage,
    pub reports: Vec<StageReport>,
    /// Most severe level among `reports`.
    pub summary: StatusLevel,
    pub added_at: DateTime<Utc>,
}

impl ScannedPage {
    pub fn new(label: impl Into<String>, original: DynamicImage, outcome: ScanOutcome) -> Self {
        let summary = outcome.worst_level();
        Self {
            id: PageId::new(),
            label: label.into(),
            original,
            summary,
            processed: outcome.image,
            reports: outcome.stages,
            added_at: Utc::now(),
        }
    }
}

/// Pages in export order.
#[derive(Debug, Default)]
pub struct PageSequence {
    pages: Vec<ScannedPage>,
}

impl PageSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `page` unless a page with the same label is already present.
    /// Returns whether the page was added.
    pub fn push(&mut self, page: ScannedPage) -> bool {
        if self.contains_label(&page.label) {
            debug!(label = %page.label, "Duplicate upload skipped");
            return false;
        }
        info!(label = %page.label, position = self.pages.len() + 1, "Page added");
        self.pages.push(page);
        true
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.pages.iter().any(|p| p.label == label)
    }

    /// Swap page `index` with the one before it.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.pages.len() {
            return false;
        }
        self.pages.swap(index - 1, index);
        true
    }

    /// Swap page `index` with the one after it.
    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.pages.len() {
            return false;
        }
        self.pages.swap(index, index + 1);
        true
    }

    /// Remove and return page `index`.
    pub fn remove(&mut self, index: usize) -> Result<ScannedPage> {
        if index >= self.pages.len() {
            return Err(ScanwerkError::PageIndex {
                index,
                len: self.pages.len(),
            });
        }
        let page = self.pages.remove(index);
        info!(label = %page.label, "Page removed");
        Ok(page)
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScannedPage> {
        self.pages.iter()
    }

    /// Processed pages in order, ready for PDF assembly.
    pub fn processed_images(&self) -> Vec<DynamicImage> {
        self.pages
            .iter()
            .map(|p| DynamicImage::ImageLuma8(p.processed.clone()))
            .collect()
    }
}
