// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanwerk.

use thiserror::Error;

/// Top-level error type for all Scanwerk operations.
#[derive(Debug, Error)]
pub enum ScanwerkError {
    // -- Scan pipeline errors --
    #[error("document detection failed: {0}")]
    Detection(String),

    #[error("degenerate page geometry: {0}")]
    Validation(String),

    #[error("perspective transform failed: {0}")]
    Transform(String),

    #[error("page cleaning failed: {0}")]
    Cleaning(String),

    // -- Document errors --
    #[error("unsupported image type: {0}")]
    UnsupportedImage(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    // -- Page sequence --
    #[error("page index {index} out of range (sequence has {len} pages)")]
    PageIndex { index: usize, len: usize },

    #[error("no pages to export")]
    EmptySequence,

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanwerkError>;
