// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-document — Document processing for Scanwerk.
//
// Provides the scan pipeline (page corner detection, perspective rectification,
// adaptive cleanup, and the fallback-aware orchestrator), image decoding and
// encoding, and multi-page PDF assembly.

pub mod image;
pub mod pdf;
pub mod scan;

// Re-export the primary structs so callers can use `scanwerk_document::ScanPipeline` etc.
pub use crate::image::processor::ImageProcessor;
pub use pdf::writer::PdfWriter;
pub use scan::pipeline::{ScanOutcome, ScanPipeline};
pub use scan::corners::Quad;
