// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One run of the tool: pick a page source, fetch every page, plan the reflow
// and write the PDF.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notenband_core::NotenbandConfig;
use notenband_core::error::{NotenbandError, Result};
use notenband_document::ReflowPlan;
use notenband_source::{
    DirectoryPageSource, HttpPageSource, PageMetadata, PageSource, discover_and_fetch,
};
use tracing::{info, instrument, warn};

/// File name used when the score has no usable title.
const FALLBACK_STEM: &str = "sheet";

/// Where the pages come from.
#[derive(Debug, Clone)]
pub enum Input {
    Url(String),
    Directory(PathBuf),
    SavedPage(PathBuf),
}

/// Output locations for a run.
#[derive(Debug, Clone, Default)]
pub struct Outputs {
    /// PDF path; derived from the title when absent.
    pub pdf: Option<PathBuf>,
    /// The stitched darkness canvas exactly as bar detection sees it.
    pub canvas_dump: Option<PathBuf>,
    /// The canvas with bars, line edges and page seams drawn on it.
    pub overlay_dump: Option<PathBuf>,
}

/// Run the whole pipeline and return the path of the written PDF.
#[instrument(skip_all, fields(input = ?input))]
pub async fn run(input: Input, mut config: NotenbandConfig, outputs: Outputs) -> Result<PathBuf> {
    config.validate()?;

    let (source, local): (Arc<dyn PageSource>, Option<Arc<DirectoryPageSource>>) = match &input {
        Input::Url(url) => (
            Arc::new(HttpPageSource::from_page_url(url, config.fetch.first_index)?),
            None,
        ),
        Input::Directory(dir) => {
            let source = Arc::new(local_source(dir, &config));
            (source.clone(), Some(source))
        }
        Input::SavedPage(html) => {
            fill_metadata(&mut config, html);
            let dir = html
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let source = Arc::new(local_source(dir, &config));
            (source.clone(), Some(source))
        }
    };

    let pages = discover_and_fetch(source, &config.fetch).await?;
    if let Some(local) = &local {
        check_no_gaps(local, pages.len())?;
    }
    info!(pages = pages.len(), "pages fetched");

    let pdf_path = outputs
        .pdf
        .unwrap_or_else(|| output_path_for(config.title.as_deref()));

    let plan = tokio::task::spawn_blocking(move || ReflowPlan::build(&pages, &config))
        .await
        .map_err(|err| NotenbandError::ImageError(format!("reflow task failed: {err}")))??;

    if let Some(dump) = &outputs.canvas_dump {
        plan.canvas.save(dump)?;
        info!(path = %dump.display(), "canvas dump written");
    }
    if let Some(dump) = &outputs.overlay_dump {
        plan.overlay().save(dump).map_err(|err| {
            NotenbandError::ImageError(format!("cannot write overlay {}: {err}", dump.display()))
        })?;
        info!(path = %dump.display(), "overlay written");
    }

    plan.write_pdf(&pdf_path)?;
    info!(
        path = %pdf_path.display(),
        lines = plan.lines.len(),
        pages = plan.layout.pages.len(),
        "score written"
    );
    Ok(pdf_path)
}

fn local_source(dir: &Path, config: &NotenbandConfig) -> DirectoryPageSource {
    let source = DirectoryPageSource::new(dir, config.fetch.first_index);
    match &config.fetch.page_extension {
        Some(ext) => source.with_extension(ext.as_str()),
        None => source,
    }
}

/// Take title and composer from the saved page unless already configured.
/// Unreadable metadata only costs the header.
fn fill_metadata(config: &mut NotenbandConfig, html: &Path) {
    match PageMetadata::from_file(html) {
        Ok(metadata) => {
            config.title.get_or_insert(metadata.title);
            config.composer.get_or_insert(metadata.composer);
        }
        Err(err) => warn!(error = %err, "no metadata in saved page"),
    }
}

/// A numbered page beyond the contiguous run means one in between is missing.
fn check_no_gaps(source: &DirectoryPageSource, extent: usize) -> Result<()> {
    match source.list_pages()?.into_iter().find(|&index| index >= extent) {
        Some(stray) => {
            warn!(
                dir = %source.dir().display(),
                stray,
                "page files continue past a gap"
            );
            Err(NotenbandError::PageMissing { index: extent })
        }
        None => Ok(()),
    }
}

/// `<title>.pdf` with path-hostile characters replaced, or `sheet.pdf`.
pub fn output_path_for(title: Option<&str>) -> PathBuf {
    let stem: String = title
        .unwrap_or_default()
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.' | ',' | '\'') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_matches(|c: char| c == '.' || c.is_whitespace());
    let stem = if stem.is_empty() { FALLBACK_STEM } else { stem };
    PathBuf::from(format!("{stem}.pdf"))
}
