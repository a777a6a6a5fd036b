// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decodes uploaded photos, shrinks oversized uploads, and
// encodes finished pages. Operates on in-memory images using the `image` crate.

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use scanwerk_core::ImageKind;
use scanwerk_core::error::{Result, ScanwerkError};
use tracing::{debug, info, instrument};

/// A single in-memory image on its way into or out of the scan pipeline.
///
/// Transformations consume `self` and return a new `ImageProcessor`, so calls
/// chain:
///
/// ```ignore
/// let photo = ImageProcessor::from_bytes(&upload)?
///     .fit_upload(upload.len() as u64, config.max_upload_bytes)
///     .into_dynamic();
/// ```
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path. Only PNG and JPEG files are accepted.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let kind = kind_for_path(path)?;
        let img = image::open(path).map_err(|err| {
            ScanwerkError::ImageError(format!("failed to open {}: {}", path.display(), err))
        })?;
        info!(width = img.width(), height = img.height(), ?kind, "Image loaded");
        Ok(Self { image: img })
    }

    /// Decode raw PNG or JPEG bytes.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let format = image::guess_format(data)
            .map_err(|err| ScanwerkError::ImageError(format!("unrecognised image data: {}", err)))?;
        if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg) {
            return Err(ScanwerkError::UnsupportedImage(format!("{:?}", format)));
        }
        let img = image::load_from_memory_with_format(data, format)
            .map_err(|err| ScanwerkError::ImageError(format!("failed to decode image: {}", err)))?;
        debug!(width = img.width(), height = img.height(), ?format, "Image decoded from bytes");
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Halve both dimensions with Lanczos3 filtering. Never shrinks an axis
    /// below one pixel.
    #[instrument(skip(self), fields(from_w = self.image.width(), from_h = self.image.height()))]
    pub fn halve(self) -> Self {
        let w = (self.image.width() / 2).max(1);
        let h = (self.image.height() / 2).max(1);
        let resized = self.image.resize_exact(w, h, FilterType::Lanczos3);
        debug!(new_w = w, new_h = h, "Image halved");
        Self { image: resized }
    }

    /// Halve the image once if its encoded size exceeded `limit` bytes.
    pub fn fit_upload(self, encoded_len: u64, limit: u64) -> Self {
        if encoded_len > limit {
            info!(encoded_len, limit, "Upload exceeds size limit; halving resolution");
            self.halve()
        } else {
            self
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.image
            .write_to(&mut std::io::Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|err| ScanwerkError::ImageError(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Write the image to a file. The format is inferred from the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.image.save(path.as_ref()).map_err(|err| {
            ScanwerkError::ImageError(format!(
                "failed to save image to {}: {}",
                path.as_ref().display(),
                err
            ))
        })
    }
}

/// The accepted image kind for `path`, judged by its extension.
pub fn kind_for_path(path: &Path) -> Result<ImageKind> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    ImageKind::from_extension(ext).ok_or_else(|| {
        ScanwerkError::UnsupportedImage(path.display().to_string())
    })
}

// -- Tests --------------------------------------------------------------------
