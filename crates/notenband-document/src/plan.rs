// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end reflow of fetched pages: stitch, detect, measure, pack, lay out.
// Every intermediate result is kept so callers can inspect or dump it.

use std::path::Path;

use image::{DynamicImage, RgbImage};
use notenband_core::NotenbandConfig;
use notenband_core::error::Result;
use notenband_core::types::{Bar, Line, Measure};
use tracing::{info, instrument};

use crate::bars::BarDetector;
use crate::canvas::{Canvas, CanvasStitcher};
use crate::layout::{DocumentLayout, Header, PageLayoutEngine};
use crate::lines::LinePacker;
use crate::measures::build_measures;
use crate::overlay::debug_overlay;
use crate::pdf::writer::PdfWriter;

/// A fully planned document.
pub struct ReflowPlan {
    pub canvas: Canvas,
    pub bars: Vec<Bar>,
    pub measures: Vec<Measure>,
    pub lines: Vec<Line>,
    pub layout: DocumentLayout,
    writer: PdfWriter,
}

impl ReflowPlan {
    /// Run every stage over `pages`, in order. The first failing stage ends
    /// the run.
    #[instrument(skip_all, fields(pages = pages.len()))]
    pub fn build(pages: &[DynamicImage], config: &NotenbandConfig) -> Result<Self> {
        let canvas = CanvasStitcher::new(config.detection.ink).stitch(pages)?;
        let bars = BarDetector::new(&config.detection).detect(canvas.as_gray());
        let measures = build_measures(&bars)?;
        let lines = LinePacker::new(config.layout.max_line_width_px).pack(&measures)?;

        let header = Header::new(config.title.clone(), config.composer.clone());
        let layout = PageLayoutEngine::new(&config.layout, header).layout(canvas.height(), &lines)?;

        let mut writer = PdfWriter::new(&config.layout);
        if let Some(title) = &config.title {
            writer.set_title(title.clone());
        }

        info!(
            bars = bars.len(),
            measures = measures.len(),
            lines = lines.len(),
            pages = layout.pages.len(),
            "reflow planned"
        );
        Ok(Self {
            canvas,
            bars,
            measures,
            lines,
            layout,
            writer,
        })
    }

    /// Encode the plan as PDF bytes.
    pub fn render_pdf(&self) -> Result<Vec<u8>> {
        self.writer.render(&self.canvas, &self.layout)
    }

    /// Encode the plan and write it to `path`.
    pub fn write_pdf(&self, path: impl AsRef<Path>) -> Result<()> {
        self.writer.write_to_file(&self.canvas, &self.layout, path)
    }

    /// Canvas with detection results drawn on it.
    pub fn overlay(&self) -> RgbImage {
        debug_overlay(&self.canvas, &self.bars, &self.lines)
    }
}
