// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Run configuration. Everything the pipeline stages need is carried here and
// handed to each stage at construction; there are no process-wide settings.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NotenbandError, Result};
use crate::types::{HeaderFont, InkSource, Margins, PaperSize};

/// Complete settings for one reflow run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotenbandConfig {
    pub detection: DetectionConfig,
    pub layout: LayoutConfig,
    pub fetch: FetchConfig,
    /// Song title printed centred above the first line.
    pub title: Option<String>,
    /// Composer printed below the title.
    pub composer: Option<String>,
}

/// Bar-line detection thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Canvas values strictly below this count as ink.
    pub darkness_threshold: u8,
    /// Fraction of a column that must be ink for it to belong to a bar line.
    pub dark_ratio: f32,
    /// Maximum run of non-bar columns, in pixels, still absorbed into an open
    /// bar region.
    pub bar_tolerance: u32,
    /// How source pixels map to canvas darkness.
    pub ink: InkSource,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            darkness_threshold: 25,
            dark_ratio: 0.5,
            bar_tolerance: 10,
            ink: InkSource::Opacity,
        }
    }
}

/// Line packing and page geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Upper bound (exclusive) on a packed line's width in canvas pixels.
    pub max_line_width_px: u32,
    pub paper_size: PaperSize,
    pub margins_mm: Margins,
    /// Vertical gap between consecutive music lines.
    pub line_spacing_mm: f32,
    pub title_font_size: f32,
    pub composer_font_size: f32,
    /// Cursor advance after each header text line.
    pub header_advance_mm: f32,
    pub font: HeaderFont,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_line_width_px: 2500,
            paper_size: PaperSize::A4,
            margins_mm: Margins::uniform(10.5),
            line_spacing_mm: 3.5,
            title_font_size: 20.0,
            composer_font_size: 13.33,
            header_advance_mm: 10.5,
            font: HeaderFont::Helvetica,
        }
    }
}

/// Page discovery and download behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Physical number of the first page (`0.png` vs `1.png`).
    pub first_index: usize,
    /// First index probed before the search starts doubling.
    pub initial_window: usize,
    /// Give up if pages still exist past this index.
    pub max_extent: usize,
    /// Concurrent downloads; `None` fetches every page at once.
    pub concurrency: Option<usize>,
    /// Extension of local page files; `png` when unset. HTTP sources take
    /// theirs from the page URL.
    pub page_extension: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            first_index: 0,
            initial_window: 4,
            max_extent: 4096,
            concurrency: None,
            page_extension: None,
        }
    }
}

impl NotenbandConfig {
    /// Load settings from a JSON file. Fields left out take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no stage can work with.
    pub fn validate(&self) -> Result<()> {
        let ratio = self.detection.dark_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(NotenbandError::Config(format!(
                "dark_ratio must be in (0, 1], got {ratio}"
            )));
        }
        if self.layout.max_line_width_px == 0 {
            return Err(NotenbandError::Config(
                "max_line_width_px must be positive".into(),
            ));
        }
        let layout = &self.layout;
        let m = layout.margins_mm;
        let distances = [
            ("top margin", m.top),
            ("right margin", m.right),
            ("bottom margin", m.bottom),
            ("left margin", m.left),
            ("line_spacing_mm", layout.line_spacing_mm),
            ("header_advance_mm", layout.header_advance_mm),
        ];
        if let Some((name, value)) = distances
            .iter()
            .find(|(_, v)| !(v.is_finite() && *v >= 0.0))
        {
            return Err(NotenbandError::Config(format!(
                "{name} must be a non-negative number, got {value}"
            )));
        }
        let font_sizes = [
            ("title_font_size", layout.title_font_size),
            ("composer_font_size", layout.composer_font_size),
        ];
        if let Some((name, value)) = font_sizes
            .iter()
            .find(|(_, v)| !(v.is_finite() && *v > 0.0))
        {
            return Err(NotenbandError::Config(format!(
                "{name} must be positive, got {value}"
            )));
        }
        if self.fetch.initial_window == 0 {
            return Err(NotenbandError::Config(
                "initial_window must be at least 1".into(),
            ));
        }
        if self.fetch.concurrency == Some(0) {
            return Err(NotenbandError::Config(
                "concurrency must be at least 1 when set".into(),
            ));
        }
        if let Some(ext) = &self.fetch.page_extension {
            if ext.is_empty() || ext.contains(['.', '/', '\\']) {
                return Err(NotenbandError::Config(format!(
                    "page_extension must be a bare extension like 'png', got '{ext}'"
                )));
            }
        }
        Ok(())
    }
}
