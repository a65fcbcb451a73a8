// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page source abstraction. A source answers "give me page N" with the decoded
// raster, an authoritative "no such page", or an error. Absence drives the
// extent search; errors abort the run.

use async_trait::async_trait;
use image::DynamicImage;
use notenband_core::error::{NotenbandError, Result};

/// Outcome of fetching one page.
#[derive(Debug)]
pub enum PageFetch {
    Found(DynamicImage),
    /// The source is certain the page does not exist.
    Absent,
}

impl PageFetch {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Supplies decoded page rasters by zero-based logical index.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch and decode page `index`.
    async fn fetch(&self, index: usize) -> Result<PageFetch>;

    /// Human-readable location of the pages, for logs.
    fn describe(&self) -> String;
}

/// Decode encoded page bytes off the async runtime.
pub(crate) async fn decode_page(index: usize, bytes: Vec<u8>) -> Result<DynamicImage> {
    tokio::task::spawn_blocking(move || {
        image::load_from_memory(&bytes).map_err(|err| {
            NotenbandError::ImageError(format!("failed to decode page {index}: {err}"))
        })
    })
    .await
    .map_err(|err| NotenbandError::Fetch {
        index,
        reason: format!("decoder task failed: {err}"),
    })?
}
