// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// notenband-document — From page rasters to a paginated PDF.
//
// Stitches pages into one horizontal strip, finds bar lines, cuts the strip
// into measures, packs measures into print lines, lays the lines out on
// pages, and encodes the result with `printpdf`.

pub mod bars;
pub mod canvas;
pub mod layout;
pub mod lines;
pub mod measures;
pub mod overlay;
pub mod pdf;
pub mod plan;

pub use bars::BarDetector;
pub use canvas::{Canvas, CanvasStitcher};
pub use layout::{DocumentLayout, Header, PageLayoutEngine, PagePlan, PlacedLine, PlacedText};
pub use lines::LinePacker;
pub use measures::build_measures;
pub use overlay::debug_overlay;
pub use pdf::writer::PdfWriter;
pub use plan::ReflowPlan;
