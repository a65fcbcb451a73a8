// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bar-line detection on the stitched canvas.
//
// Bar lines are the tallest vertical ink on a score: a column belongs to one
// when the share of dark pixels in it exceeds `dark_ratio`. Note stems and
// ledger lines stay well below that share. Adjacent bar columns form a
// region; a region only closes once more than `tolerance` non-bar columns
// follow it, so a thin interruption inside a bar line (or a double bar) is
// not reported as two bars.

use image::GrayImage;
use notenband_core::DetectionConfig;
use notenband_core::types::Bar;
use tracing::{debug, instrument};

/// Scans canvas columns for vertical bar lines.
#[derive(Debug, Clone, Copy)]
pub struct BarDetector {
    darkness_threshold: u8,
    dark_ratio: f32,
    tolerance: u32,
}

impl BarDetector {
    pub fn new(config: &DetectionConfig) -> Self {
        Self::with_thresholds(config.darkness_threshold, config.dark_ratio, config.bar_tolerance)
    }

    pub fn with_thresholds(darkness_threshold: u8, dark_ratio: f32, tolerance: u32) -> Self {
        Self {
            darkness_threshold,
            dark_ratio,
            tolerance,
        }
    }

    /// Bars in left-to-right order, separated by more than `tolerance`.
    #[instrument(skip_all, fields(width = canvas.width(), height = canvas.height()))]
    pub fn detect(&self, canvas: &GrayImage) -> Vec<Bar> {
        let height = canvas.height();
        if height == 0 {
            return Vec::new();
        }

        let dark_per_column = self.dark_pixels_per_column(canvas);
        let mut bars = Vec::new();
        let mut open: Option<(u32, u32)> = None;

        for (x, dark) in (0u32..).zip(dark_per_column) {
            let ratio = dark as f32 / height as f32;
            if ratio > self.dark_ratio {
                open = Some(match open {
                    Some((start, _)) => (start, x),
                    None => (x, x),
                });
            } else if let Some((start, end)) = open {
                if x - end > self.tolerance {
                    bars.push(Bar::new(start, end));
                    open = None;
                }
            }
        }
        if let Some((start, end)) = open {
            bars.push(Bar::new(start, end));
        }

        debug!(bars = bars.len(), "bar detection complete");
        bars
    }

    /// Count of pixels darker than the threshold, per column. One row-major
    /// pass over the buffer.
    fn dark_pixels_per_column(&self, canvas: &GrayImage) -> Vec<u32> {
        let mut counts = vec![0u32; canvas.width() as usize];
        for (x, _, pixel) in canvas.enumerate_pixels() {
            if pixel.0[0] < self.darkness_threshold {
                counts[x as usize] += 1;
            }
        }
        counts
    }
}
