// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how the front end presents it.

use crate::error::ScanwerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The page was still produced, just with less processing.
    Degraded,
    /// User must do something (pick another file, fix a setting).
    ActionRequired,
    /// Cannot be fixed by retrying: broken file, unwritable disk, etc.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// Severity level.
    pub severity: Severity,
}

/// Convert a `ScanwerkError` into a `HumanError`.
pub fn humanize_error(err: &ScanwerkError) -> HumanError {
    match err {
        // -- Scan pipeline: these never stop a page, they only lower its quality --
        ScanwerkError::Detection(_) => HumanError {
            message: "We couldn't look for the page edges in this photo.".into(),
            suggestion: "The photo is still included. Retake it if the page looks tilted.".into(),
            severity: Severity::Degraded,
        },

        ScanwerkError::Validation(_) | ScanwerkError::Transform(_) => HumanError {
            message: "We found the page but couldn't straighten it.".into(),
            suggestion: "The photo is still included. Try shooting from directly above the page.".into(),
            severity: Severity::Degraded,
        },

        ScanwerkError::Cleaning(_) => HumanError {
            message: "We couldn't sharpen the text on this page.".into(),
            suggestion: "A plain black-and-white version is used instead.".into(),
            severity: Severity::Degraded,
        },

        // -- Documents --
        ScanwerkError::UnsupportedImage(detail) => HumanError {
            message: "This type of file isn't supported.".into(),
            suggestion: format!("Use a PNG or JPEG photo. (File: {detail})"),
            severity: Severity::ActionRequired,
        },

        ScanwerkError::ImageError(detail) => HumanError {
            message: "This photo couldn't be opened.".into(),
            suggestion: format!("The file may be damaged. Try exporting it again. ({detail})"),
            severity: Severity::Permanent,
        },

        ScanwerkError::PdfError(detail) => HumanError {
            message: "The PDF couldn't be created.".into(),
            suggestion: format!("Try again with fewer pages. ({detail})"),
            severity: Severity::Permanent,
        },

        // -- Page sequence --
        ScanwerkError::PageIndex { index, len } => HumanError {
            message: "That page doesn't exist.".into(),
            suggestion: format!("Pick a page between 1 and {len}. (Requested {})", index + 1),
            severity: Severity::ActionRequired,
        },

        ScanwerkError::EmptySequence => HumanError {
            message: "There are no pages yet.".into(),
            suggestion: "Add at least one photo before creating the PDF.".into(),
            severity: Severity::ActionRequired,
        },

        // -- Configuration / persistence --
        ScanwerkError::Config(detail) => HumanError {
            message: "A setting has an invalid value.".into(),
            suggestion: format!("Fix the configuration file and try again. ({detail})"),
            severity: Severity::ActionRequired,
        },

        ScanwerkError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "A file couldn't be found.".into(),
                    suggestion: format!("Check the file name and try again. ({io_err})"),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "A file couldn't be read or written.".into(),
                    suggestion: format!("Check that the folder exists and you can write to it. ({io_err})"),
                    severity: Severity::Permanent,
                }
            }
        }

        ScanwerkError::Serialization(detail) => HumanError {
            message: "The configuration file couldn't be read.".into(),
            suggestion: format!("Make sure it is valid JSON. ({detail})"),
            severity: Severity::ActionRequired,
        },
    }
}
