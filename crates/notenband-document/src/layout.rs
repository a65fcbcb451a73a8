// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page layout — decide where every packed line and header text goes.
//
// One scale for the whole document: the widest line exactly fills the
// printable width, every other line uses the same pixels-per-point factor so
// note size is constant. Lines flow top to bottom and break to a new page
// when the next one would cross the bottom margin. All y coordinates here are
// measured from the top edge of the page, in points.

use notenband_core::LayoutConfig;
use notenband_core::error::{NotenbandError, Result};
use notenband_core::types::Line;
use printpdf::Mm;
use tracing::{debug, info, instrument};

/// Optional title/composer printed above the music on the first page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub title: Option<String>,
    pub composer: Option<String>,
}

impl Header {
    pub fn new(title: Option<String>, composer: Option<String>) -> Self {
        Self { title, composer }
    }
}

/// A header text box, centred within `width_pt`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub text: String,
    pub font_size_pt: f32,
    pub x_pt: f32,
    pub y_pt: f32,
    pub width_pt: f32,
}

/// A canvas strip placed on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    /// Position of the line in the packed sequence.
    pub line_index: usize,
    /// First canvas column of the strip.
    pub source_x_px: u32,
    /// Canvas columns covered by the strip.
    pub source_width_px: u32,
    pub x_pt: f32,
    pub y_pt: f32,
    pub width_pt: f32,
    pub height_pt: f32,
}

/// Everything placed on one output page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PagePlan {
    pub texts: Vec<PlacedText>,
    pub lines: Vec<PlacedLine>,
    /// Vertical cursor after the last placement.
    pub cursor_pt: f32,
}

/// Complete placement plan, ready for PDF encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    /// Canvas pixels per PDF point, shared by every line.
    pub pixels_per_point: f32,
    pub line_height_pt: f32,
    pub pages: Vec<PagePlan>,
}

/// Lays packed lines out on fixed-size pages.
#[derive(Debug, Clone)]
pub struct PageLayoutEngine {
    page_width_mm: f32,
    page_height_mm: f32,
    page_width_pt: f32,
    page_height_pt: f32,
    margin_top_pt: f32,
    margin_right_pt: f32,
    margin_bottom_pt: f32,
    margin_left_pt: f32,
    line_spacing_pt: f32,
    header_advance_pt: f32,
    title_font_size: f32,
    composer_font_size: f32,
    header: Header,
}

fn mm_to_pt(mm: f32) -> f32 {
    Mm(mm).into_pt().0
}

impl PageLayoutEngine {
    pub fn new(config: &LayoutConfig, header: Header) -> Self {
        let (width_mm, height_mm) = config.paper_size.dimensions_mm();
        let margins = config.margins_mm;
        Self {
            page_width_mm: width_mm,
            page_height_mm: height_mm,
            page_width_pt: mm_to_pt(width_mm),
            page_height_pt: mm_to_pt(height_mm),
            margin_top_pt: mm_to_pt(margins.top),
            margin_right_pt: mm_to_pt(margins.right),
            margin_bottom_pt: mm_to_pt(margins.bottom),
            margin_left_pt: mm_to_pt(margins.left),
            line_spacing_pt: mm_to_pt(config.line_spacing_mm),
            header_advance_pt: mm_to_pt(config.header_advance_mm),
            title_font_size: config.title_font_size,
            composer_font_size: config.composer_font_size,
            header,
        }
    }

    /// Width between the left and right margins, in points.
    pub fn printable_width_pt(&self) -> f32 {
        self.page_width_pt - self.margin_left_pt - self.margin_right_pt
    }

    /// Place `lines`, cut from a canvas `canvas_height_px` tall, on pages.
    #[instrument(skip_all, fields(lines = lines.len(), canvas_height_px))]
    pub fn layout(&self, canvas_height_px: u32, lines: &[Line]) -> Result<DocumentLayout> {
        let widest_px = lines
            .iter()
            .map(Line::length)
            .max()
            .ok_or(NotenbandError::NothingToLayout)?;

        let printable_width = self.printable_width_pt();
        if printable_width <= 0.0 {
            return Err(NotenbandError::Config(format!(
                "margins leave no printable width ({printable_width:.1}pt)"
            )));
        }

        let pixels_per_point = widest_px as f32 / printable_width;
        let line_height = canvas_height_px as f32 / pixels_per_point;

        let required = self.margin_top_pt + self.margin_bottom_pt + line_height;
        if required > self.page_height_pt {
            return Err(NotenbandError::PageTooSmall {
                required_pt: required,
                page_height_pt: self.page_height_pt,
            });
        }

        let bottom_limit = self.page_height_pt - self.margin_bottom_pt;
        let mut pages = Vec::new();
        let mut page = PagePlan::default();
        let mut y = self.margin_top_pt;

        let header_lines = [
            (self.header.title.as_deref(), self.title_font_size),
            (self.header.composer.as_deref(), self.composer_font_size),
        ];
        for (text, font_size_pt) in header_lines {
            let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
                continue;
            };
            page.texts.push(PlacedText {
                text: text.to_string(),
                font_size_pt,
                x_pt: self.margin_left_pt,
                y_pt: y,
                width_pt: printable_width,
            });
            y += self.header_advance_pt;
        }

        for (line_index, line) in lines.iter().enumerate() {
            if y + line_height > bottom_limit {
                page.cursor_pt = y;
                pages.push(std::mem::take(&mut page));
                y = self.margin_top_pt;
                debug!(page = pages.len(), line_index, "page break");
            }
            page.lines.push(PlacedLine {
                line_index,
                source_x_px: line.start_pos(),
                source_width_px: line.length(),
                x_pt: self.margin_left_pt,
                y_pt: y,
                width_pt: line.length() as f32 / pixels_per_point,
                height_pt: line_height,
            });
            y += line_height + self.line_spacing_pt;
        }
        page.cursor_pt = y;
        pages.push(page);

        info!(
            pages = pages.len(),
            pixels_per_point,
            line_height_pt = line_height,
            "layout complete"
        );
        Ok(DocumentLayout {
            page_width_mm: self.page_width_mm,
            page_height_mm: self.page_height_mm,
            pixels_per_point,
            line_height_pt: line_height,
            pages,
        })
    }
}
