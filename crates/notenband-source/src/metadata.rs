// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Title/composer extraction from a saved score web page. The score header is
// rendered as the composer in a `<span>` directly followed by the title in an
// `<h4>`.

use std::path::Path;

use notenband_core::error::{NotenbandError, Result};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

/// Header text for the printed score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub composer: String,
}

impl PageMetadata {
    /// Extract metadata from HTML source.
    pub fn from_html(html: &str) -> Result<Self> {
        let document = Html::parse_document(html);
        let selector = Selector::parse("span + h4")
            .map_err(|err| NotenbandError::Metadata(format!("bad selector: {err}")))?;

        document
            .select(&selector)
            .find_map(|heading| {
                let title = element_text(&heading);
                let composer = heading
                    .prev_siblings()
                    .find_map(ElementRef::wrap)
                    .map(|span| element_text(&span))?;
                (!title.is_empty() && !composer.is_empty()).then_some(Self { title, composer })
            })
            .ok_or_else(|| {
                NotenbandError::Metadata("no composer <span> followed by a title <h4>".into())
            })
    }

    /// Read and parse a saved HTML page.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let html = std::fs::read_to_string(path.as_ref())?;
        let metadata = Self::from_html(&html)?;
        debug!(title = %metadata.title, composer = %metadata.composer, "metadata found");
        Ok(metadata)
    }
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
