// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Measures from bar lines.

use notenband_core::error::{NotenbandError, Result};
use notenband_core::types::{Bar, Measure};

/// Pair each bar with its successor: `k` bars give `k - 1` measures, and
/// consecutive measures share their boundary bar.
pub fn build_measures(bars: &[Bar]) -> Result<Vec<Measure>> {
    if bars.len() < 2 {
        return Err(NotenbandError::InsufficientBars { found: bars.len() });
    }
    Ok(bars
        .windows(2)
        .map(|pair| Measure::new(pair[0], pair[1]))
        .collect())
}
