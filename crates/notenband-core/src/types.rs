// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Notenband: bar lines, measures, packed lines, and the
// print-format vocabulary shared by the layout engine and the PDF writer.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::NotenbandError;

/// A detected vertical bar line, as an inclusive pixel-column interval on the
/// stitched canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub start_pos: u32,
    pub end_pos: u32,
}

impl Bar {
    pub fn new(start_pos: u32, end_pos: u32) -> Self {
        debug_assert!(start_pos <= end_pos);
        Self { start_pos, end_pos }
    }

    /// Width of the bar line in pixels.
    pub fn width(&self) -> u32 {
        self.end_pos - self.start_pos + 1
    }
}

/// The musical segment between two consecutive bar lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measure {
    pub start: Bar,
    pub end: Bar,
}

impl Measure {
    pub fn new(start: Bar, end: Bar) -> Self {
        Self { start, end }
    }

    /// Width in pixels, both bounding bar lines included.
    pub fn length(&self) -> u32 {
        self.end.end_pos - self.start.start_pos + 1
    }
}

/// A non-empty run of consecutive measures printed as one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    measures: Vec<Measure>,
}

impl Line {
    /// Open a new line holding a single measure.
    pub fn starting_with(measure: Measure) -> Self {
        Self {
            measures: vec![measure],
        }
    }

    /// Append a measure to the end of the line.
    pub fn push(&mut self, measure: Measure) {
        self.measures.push(measure);
    }

    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }

    /// First pixel column covered by the line.
    pub fn start_pos(&self) -> u32 {
        self.measures[0].start.start_pos
    }

    /// Last pixel column covered by the line (inclusive).
    pub fn end_pos(&self) -> u32 {
        self.measures[self.measures.len() - 1].end.end_pos
    }

    /// Width in pixels from the first measure's start to the last measure's end.
    pub fn length(&self) -> u32 {
        self.end_pos() - self.start_pos() + 1
    }

    /// Width the line would have if `measure` were appended.
    pub fn projected_length(&self, measure: &Measure) -> u32 {
        measure.end.end_pos - self.start_pos() + 1
    }
}

/// Standard paper sizes (portrait).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match self {
            Self::A4 => (210.0, 297.0),
            Self::A3 => (297.0, 420.0),
            Self::A5 => (148.0, 210.0),
            Self::Letter => (215.9, 279.4),
            Self::Legal => (215.9, 355.6),
        }
    }
}

impl FromStr for PaperSize {
    type Err = NotenbandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a4" => Ok(Self::A4),
            "a3" => Ok(Self::A3),
            "a5" => Ok(Self::A5),
            "letter" => Ok(Self::Letter),
            "legal" => Ok(Self::Legal),
            other => Err(NotenbandError::Config(format!("unknown paper size '{other}'"))),
        }
    }
}

/// Page margins in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    /// The same margin on every side.
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// How a source pixel is turned into a darkness value on the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InkSource {
    /// `255 - alpha`: more opaque means darker. Suits transparent score
    /// renderings where ink is the only opaque content.
    #[default]
    Opacity,
    /// Composite over white, then take luma. Suits opaque scans.
    Composite,
}

impl FromStr for InkSource {
    type Err = NotenbandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "opacity" | "alpha" => Ok(Self::Opacity),
            "composite" | "luma" => Ok(Self::Composite),
            other => Err(NotenbandError::Config(format!("unknown ink source '{other}'"))),
        }
    }
}

/// Builtin PDF font used for the title/composer header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderFont {
    #[default]
    Helvetica,
    Times,
    Courier,
}
