// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Notenband.

use thiserror::Error;

/// Top-level error type for all Notenband operations.
///
/// Every variant is fatal for the current run; nothing is retried internally.
#[derive(Debug, Error)]
pub enum NotenbandError {
    // -- Page discovery and fetching --
    #[error("could not determine whether page {index} exists: {reason}")]
    ProbeFailed { index: usize, reason: String },

    #[error("page source still reports pages beyond index {limit}")]
    ExtentLimitExceeded { limit: usize },

    #[error("fetching page {index} failed: {reason}")]
    Fetch { index: usize, reason: String },

    #[error("page {index} is missing")]
    PageMissing { index: usize },

    // -- Canvas and detection --
    #[error("invalid pages: page {index} has height {height} != {expected}")]
    HeightMismatch {
        index: usize,
        height: u32,
        expected: u32,
    },

    #[error("no page content to stitch")]
    EmptyCanvas,

    #[error("only {found} bars detected, at least 2 are needed")]
    InsufficientBars { found: usize },

    // -- Packing and layout --
    #[error("maximum line length too small: {max_width}px (a measure is {measure_width}px wide)")]
    LineTooNarrow { max_width: u32, measure_width: u32 },

    #[error("can't print one line per page: {required_pt:.1}pt needed, page is {page_height_pt:.1}pt")]
    PageTooSmall {
        required_pt: f32,
        page_height_pt: f32,
    },

    #[error("no lines to lay out")]
    NothingToLayout,

    // -- Encoding --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("page metadata not found: {0}")]
    Metadata(String),

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, NotenbandError>;
