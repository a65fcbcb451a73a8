// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — encode a `DocumentLayout` with `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`. PDF y coordinates grow upwards from the bottom edge,
// so every top-relative placement is flipped here.

use std::path::Path;

use image::DynamicImage;
use notenband_core::LayoutConfig;
use notenband_core::error::Result;
use notenband_core::types::HeaderFont;
use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, RawImage,
    RawImageData, RawImageFormat, TextItem, XObjectTransform,
};
use tracing::{debug, info, instrument, warn};

use crate::canvas::Canvas;
use crate::layout::{DocumentLayout, PlacedLine, PlacedText};

/// Average builtin-font glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// Turns a page layout plus the canvas it refers to into PDF bytes.
pub struct PdfWriter {
    font: HeaderFont,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl PdfWriter {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            font: config.font,
            title: None,
        }
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    fn builtin_font(&self) -> BuiltinFont {
        match self.font {
            HeaderFont::Helvetica => BuiltinFont::Helvetica,
            HeaderFont::Times => BuiltinFont::TimesRoman,
            HeaderFont::Courier => BuiltinFont::Courier,
        }
    }

    /// Encode every page of `layout`.
    #[instrument(skip_all, fields(pages = layout.pages.len()))]
    pub fn render(&self, canvas: &Canvas, layout: &DocumentLayout) -> Result<Vec<u8>> {
        let title = self.title.as_deref().unwrap_or("Notenband Score");
        let page_w = Mm(layout.page_width_mm);
        let page_h = Mm(layout.page_height_mm);
        let page_h_pt = page_h.into_pt().0;
        let scale = 1.0 / layout.pixels_per_point;

        let mut doc = PdfDocument::new(title);
        let mut pages = Vec::with_capacity(layout.pages.len());

        for plan in &layout.pages {
            let mut ops: Vec<Op> = Vec::new();
            for text in &plan.texts {
                ops.extend(self.text_ops(text, page_h_pt));
            }
            for placed in &plan.lines {
                let raw = strip_image(canvas, placed);
                let xobject_id = doc.add_image(&raw);
                ops.push(Op::UseXobject {
                    id: xobject_id,
                    transform: XObjectTransform {
                        translate_x: Some(Pt(placed.x_pt)),
                        translate_y: Some(Pt(page_h_pt - placed.y_pt - placed.height_pt)),
                        scale_x: Some(scale),
                        scale_y: Some(scale),
                        // One pixel is one point before scaling.
                        dpi: Some(72.0),
                        rotate: None,
                    },
                });
            }
            pages.push(PdfPage::new(page_w, page_h, ops));
        }

        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            warn!(count = warnings.len(), "printpdf reported warnings");
        }
        debug!(bytes = output.len(), "PDF encoded");
        Ok(output)
    }

    /// Encode `layout` and write it to `path`.
    pub fn write_to_file(
        &self,
        canvas: &Canvas,
        layout: &DocumentLayout,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let bytes = self.render(canvas, layout)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote PDF to {}", path.as_ref().display());
        Ok(())
    }

    /// A single centred line of header text.
    fn text_ops(&self, text: &PlacedText, page_h_pt: f32) -> Vec<Op> {
        let estimated_width = text.text.chars().count() as f32 * AVG_GLYPH_WIDTH * text.font_size_pt;
        let x = text.x_pt + ((text.width_pt - estimated_width) / 2.0).max(0.0);
        // Baseline one font size below the top of the text box.
        let y = page_h_pt - text.y_pt - text.font_size_pt;

        vec![
            Op::StartTextSection,
            Op::SetTextCursor {
                pos: Point { x: Pt(x), y: Pt(y) },
            },
            Op::SetFontSizeBuiltinFont {
                size: Pt(text.font_size_pt),
                font: self.builtin_font(),
            },
            Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(text.text.clone())],
                font: self.builtin_font(),
            },
            Op::EndTextSection,
        ]
    }
}

/// Cut the canvas strip for one placed line into an RGB image for printpdf.
fn strip_image(canvas: &Canvas, placed: &PlacedLine) -> RawImage {
    let region = canvas.region(placed.source_x_px, placed.source_width_px);
    let (width, height) = region.dimensions();
    let rgb = DynamicImage::ImageLuma8(region).to_rgb8();
    RawImage {
        pixels: RawImageData::U8(rgb.into_raw()),
        width: width as usize,
        height: height as usize,
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Header, PageLayoutEngine};
    use image::{GrayImage, Luma};
    use notenband_core::types::{Bar, Line, Measure};

    fn lines(count: u32, width: u32) -> Vec<Line> {
        (0..count)
            .map(|i| {
                let start = i * width;
                Line::starting_with(Measure::new(
                    Bar::new(start, start),
                    Bar::new(start + width - 1, start + width - 1),
                ))
            })
            .collect()
    }

    #[test]
    fn renders_one_pdf_page_per_plan() {
        let canvas = Canvas::from_gray(GrayImage::from_pixel(400, 60, Luma([200u8])));
        let config = LayoutConfig::default();
        let header = Header::new(Some("Study".into()), None);
        let layout = PageLayoutEngine::new(&config, header)
            .layout(60, &lines(4, 100))
            .unwrap();

        let mut writer = PdfWriter::new(&config);
        writer.set_title("Study");
        let bytes = writer.render(&canvas, &layout).unwrap();

        assert!(bytes.starts_with(b"%PDF"));
        let parsed = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), layout.pages.len());
    }

    #[test]
    fn strip_matches_placed_range() {
        let mut gray = GrayImage::from_pixel(30, 5, Luma([255u8]));
        gray.put_pixel(10, 0, Luma([0u8]));
        let canvas = Canvas::from_gray(gray);
        let placed = PlacedLine {
            line_index: 0,
            source_x_px: 10,
            source_width_px: 8,
            x_pt: 0.0,
            y_pt: 0.0,
            width_pt: 8.0,
            height_pt: 5.0,
        };
        let raw = strip_image(&canvas, &placed);
        assert_eq!((raw.width, raw.height), (8, 5));
        match raw.pixels {
            RawImageData::U8(bytes) => {
                assert_eq!(bytes.len(), 8 * 5 * 3);
                assert_eq!(&bytes[0..3], &[0, 0, 0]);
                assert_eq!(&bytes[3..6], &[255, 255, 255]);
            }
            _ => panic!("expected 8-bit pixels"),
        }
    }
}
