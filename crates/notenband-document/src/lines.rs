// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Greedy line packing: keep appending measures to the current line while the
// line stays narrower than the bound, then start a new one.

use notenband_core::error::{NotenbandError, Result};
use notenband_core::types::{Line, Measure};
use tracing::{debug, instrument};

/// Groups consecutive measures into lines narrower than `max_width` pixels.
#[derive(Debug, Clone, Copy)]
pub struct LinePacker {
    max_width: u32,
}

impl LinePacker {
    pub fn new(max_width: u32) -> Self {
        Self { max_width }
    }

    /// Pack `measures` in order. Every returned line is strictly narrower
    /// than `max_width`.
    ///
    /// Fails with [`NotenbandError::LineTooNarrow`] if any single measure is
    /// already `max_width` or wider, since no line could hold it.
    #[instrument(skip_all, fields(measures = measures.len(), max_width = self.max_width))]
    pub fn pack(&self, measures: &[Measure]) -> Result<Vec<Line>> {
        if let Some(widest) = measures.iter().map(Measure::length).max() {
            if widest >= self.max_width {
                return Err(NotenbandError::LineTooNarrow {
                    max_width: self.max_width,
                    measure_width: widest,
                });
            }
        }

        let mut lines = Vec::new();
        let mut current: Option<Line> = None;
        for measure in measures {
            current = match current.take() {
                Some(mut line) if line.projected_length(measure) < self.max_width => {
                    line.push(*measure);
                    Some(line)
                }
                Some(line) => {
                    lines.push(line);
                    Some(Line::starting_with(*measure))
                }
                None => Some(Line::starting_with(*measure)),
            };
        }
        lines.extend(current);

        debug!(lines = lines.len(), "measures packed");
        Ok(lines)
    }
}
