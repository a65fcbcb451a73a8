// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use notenband_core::NotenbandConfig;
use notenband_core::types::{InkSource, PaperSize};

use crate::pipeline::Input;

#[derive(Debug, Parser)]
#[command(name = "notenband")]
#[command(about = "Reflow scrolling sheet-music pages into a printable PDF")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub options: RenderOptions,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download numbered pages next to the given page image URL
    Url {
        /// URL of any one page image, e.g. https://host/score/0.png
        url: String,
    },
    /// Read pages 0.png, 1.png, ... from a directory
    Dir {
        /// Directory holding the page images
        dir: PathBuf,
    },
    /// Use a saved score web page: pages from its folder, title and composer
    /// from its markup
    Page {
        /// The saved HTML file
        html: PathBuf,
    },
}

impl Command {
    pub fn input(&self) -> Input {
        match self {
            Self::Url { url } => Input::Url(url.clone()),
            Self::Dir { dir } => Input::Directory(dir.clone()),
            Self::Page { html } => Input::SavedPage(html.clone()),
        }
    }
}

/// Flags shared by every input mode. Each one overrides the config file.
#[derive(Debug, Args)]
pub struct RenderOptions {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Song title (also names the output file)
    #[arg(short, long, global = true)]
    pub title: Option<String>,

    /// Composer printed below the title
    #[arg(long, global = true)]
    pub composer: Option<String>,

    /// Maximum line length in canvas pixels
    #[arg(long = "max-line-length-px", global = true)]
    pub max_line_length_px: Option<u32>,

    /// Paper size: a4, a3, a5, letter, legal
    #[arg(long, global = true)]
    pub paper: Option<PaperSize>,

    /// How pixels become ink: opacity (transparent renders) or composite (scans)
    #[arg(long, global = true)]
    pub ink: Option<InkSource>,

    /// Share of a column that must be ink to count as a bar line
    #[arg(long = "dark-ratio", global = true)]
    pub dark_ratio: Option<f32>,

    /// Clear columns tolerated inside one bar line
    #[arg(long, global = true)]
    pub tolerance: Option<u32>,

    /// Canvas values below this are ink (0-255)
    #[arg(long, global = true)]
    pub darkness: Option<u8>,

    /// Number of the first page file
    #[arg(long = "first-index", global = true)]
    pub first_index: Option<usize>,

    /// Extension of local page files in dir/page mode (default: png)
    #[arg(long = "ext", global = true)]
    pub page_extension: Option<String>,

    /// Maximum simultaneous downloads (default: all at once)
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// Output PDF path (default: <title>.pdf)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Also write the stitched canvas that bar detection reads
    #[arg(long = "dump-canvas", global = true)]
    pub dump_canvas: Option<PathBuf>,

    /// Also write the canvas with detected bars, line edges and page seams marked
    #[arg(long = "dump-overlay", global = true)]
    pub dump_overlay: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl RenderOptions {
    /// Layer command-line values over `config`.
    pub fn apply(&self, config: &mut NotenbandConfig) {
        if let Some(title) = &self.title {
            config.title = Some(title.clone());
        }
        if let Some(composer) = &self.composer {
            config.composer = Some(composer.clone());
        }
        if let Some(px) = self.max_line_length_px {
            config.layout.max_line_width_px = px;
        }
        if let Some(paper) = self.paper {
            config.layout.paper_size = paper;
        }
        if let Some(ink) = self.ink {
            config.detection.ink = ink;
        }
        if let Some(ratio) = self.dark_ratio {
            config.detection.dark_ratio = ratio;
        }
        if let Some(tolerance) = self.tolerance {
            config.detection.bar_tolerance = tolerance;
        }
        if let Some(darkness) = self.darkness {
            config.detection.darkness_threshold = darkness;
        }
        if let Some(first_index) = self.first_index {
            config.fetch.first_index = first_index;
        }
        if let Some(concurrency) = self.concurrency {
            config.fetch.concurrency = Some(concurrency);
        }
        if let Some(ext) = &self.page_extension {
            config.fetch.page_extension = Some(ext.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "notenband",
            "dir",
            "pages",
            "--title",
            "Etude",
            "--max-line-length-px",
            "1800",
            "--paper",
            "letter",
            "--ink",
            "composite",
            "--tolerance",
            "100",
            "--ext",
            "jpg",
        ]);
        let mut config = NotenbandConfig::default();
        cli.options.apply(&mut config);

        assert_eq!(config.title.as_deref(), Some("Etude"));
        assert_eq!(config.layout.max_line_width_px, 1800);
        assert_eq!(config.layout.paper_size, PaperSize::Letter);
        assert_eq!(config.detection.ink, InkSource::Composite);
        assert_eq!(config.detection.bar_tolerance, 100);
        assert_eq!(config.detection.dark_ratio, 0.5);
        assert_eq!(config.fetch.page_extension.as_deref(), Some("jpg"));
        assert!(matches!(cli.command.input(), Input::Directory(dir) if dir == PathBuf::from("pages")));
    }

    #[test]
    fn unknown_paper_is_rejected() {
        assert!(Cli::try_parse_from(["notenband", "dir", "x", "--paper", "b7"]).is_err());
    }
}
