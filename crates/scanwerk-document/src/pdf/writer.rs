// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — one page per scanned image using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use std::path::Path;

use image::DynamicImage;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use scanwerk_core::PaperSize;
use scanwerk_core::error::{Result, ScanwerkError};
use tracing::{debug, info, instrument};

/// Nominal image resolution handed to printpdf. Placement is computed in
/// points, so this only fixes the unscaled image size.
const IMAGE_DPI: f32 = 300.0;

/// Assembles scanned page images into a multi-page PDF.
pub struct PdfWriter {
    paper_size: PaperSize,
    title: Option<String>,
}

impl PdfWriter {
    pub fn new(paper_size: PaperSize) -> Self {
        Self {
            paper_size,
            title: None,
        }
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    fn page_dimensions(&self) -> (Mm, Mm) {
        let (w_mm, h_mm) = self.paper_size.dimensions_mm();
        (Mm(w_mm as f32), Mm(h_mm as f32))
    }

    /// Build a PDF with one page per image, in order.
    ///
    /// Each image is scaled uniformly to the largest size that fits the page
    /// (small scans are enlarged) and centred. No margins are added.
    #[instrument(skip_all, fields(pages = pages.len(), paper = ?self.paper_size))]
    pub fn create_from_pages(&self, pages: &[DynamicImage]) -> Result<Vec<u8>> {
        if pages.is_empty() {
            return Err(ScanwerkError::EmptySequence);
        }

        let (page_w, page_h) = self.page_dimensions();
        let page_w_pt = page_w.into_pt().0;
        let page_h_pt = page_h.into_pt().0;
        let title = self.title.as_deref().unwrap_or("Scanned Document");

        let mut doc = PdfDocument::new(title);
        let mut pdf_pages = Vec::with_capacity(pages.len());

        for (index, page) in pages.iter().enumerate() {
            let (img_w, img_h) = (page.width(), page.height());
            if img_w == 0 || img_h == 0 {
                return Err(ScanwerkError::PdfError(format!("page {} has no pixels", index + 1)));
            }

            let raw = RawImage {
                pixels: RawImageData::U8(page.to_rgb8().into_raw()),
                width: img_w as usize,
                height: img_h as usize,
                data_format: RawImageFormat::RGB8,
                tag: Vec::new(),
            };
            let xobject_id = doc.add_image(&raw);

            let placement = fit_centered(
                (page_w_pt, page_h_pt),
                (img_w as f32 / IMAGE_DPI * 72.0, img_h as f32 / IMAGE_DPI * 72.0),
            );
            debug!(page = index + 1, ?placement, "Image placed on page");

            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(placement.x)),
                    translate_y: Some(Pt(placement.y)),
                    scale_x: Some(placement.scale),
                    scale_y: Some(placement.scale),
                    dpi: Some(IMAGE_DPI),
                    rotate: None,
                },
            }];
            pdf_pages.push(PdfPage::new(page_w, page_h, ops));
        }

        doc.with_pages(pdf_pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        info!(bytes = output.len(), warnings = warnings.len(), "PDF assembled");
        Ok(output)
    }

    /// Build the PDF and write it to `path`.
    pub fn write_pages_to_file(&self, pages: &[DynamicImage], path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.create_from_pages(pages)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote scanned PDF to {}", path.as_ref().display());
        Ok(())
    }
}

/// Where and how large an image lands on the page, in points from the
/// bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Placement {
    x: f32,
    y: f32,
    scale: f32,
}

fn fit_centered(page: (f32, f32), image: (f32, f32)) -> Placement {
    let scale = (page.0 / image.0).min(page.1 / image.1);
    Placement {
        x: (page.0 - image.0 * scale) / 2.0,
        y: (page.1 - image.1 * scale) / 2.0,
        scale,
    }
}

// -- Tests --------------------------------------------------------------------
