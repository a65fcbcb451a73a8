// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Local directory page source: pages are `0.png`, `1.png`, ... in one folder,
// as left behind by a saved score page or a previous download.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use notenband_core::error::{NotenbandError, Result};
use tracing::debug;

use crate::source::{PageFetch, PageSource, decode_page};

/// Reads numbered page images from a directory.
pub struct DirectoryPageSource {
    dir: PathBuf,
    extension: String,
    first_index: usize,
}

impl DirectoryPageSource {
    /// Pages are `<dir>/<first_index + i>.png`.
    pub fn new(dir: impl Into<PathBuf>, first_index: usize) -> Self {
        Self {
            dir: dir.into(),
            extension: "png".to_string(),
            first_index,
        }
    }

    /// Use a different file extension (case-insensitive when listing).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().to_ascii_lowercase();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of logical page `index`.
    pub fn page_path(&self, index: usize) -> PathBuf {
        self.dir
            .join(format!("{}.{}", self.first_index + index, self.extension))
    }

    /// Logical indices of every numbered page file present, sorted.
    ///
    /// Used to spot files past a gap, which extent discovery cannot see.
    pub fn list_pages(&self) -> Result<Vec<usize>> {
        let mut indices = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some((stem, ext)) = name.to_str().and_then(|n| n.split_once('.')) else {
                continue;
            };
            if !ext.eq_ignore_ascii_case(&self.extension) {
                continue;
            }
            if let Ok(number) = stem.parse::<usize>() {
                if let Some(index) = number.checked_sub(self.first_index) {
                    indices.push(index);
                }
            }
        }
        indices.sort_unstable();
        Ok(indices)
    }
}

#[async_trait]
impl PageSource for DirectoryPageSource {
    async fn fetch(&self, index: usize) -> Result<PageFetch> {
        let path = self.page_path(index);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(index, path = %path.display(), "page file absent");
                return Ok(PageFetch::Absent);
            }
            Err(err) => {
                return Err(NotenbandError::Fetch {
                    index,
                    reason: format!("reading {}: {err}", path.display()),
                });
            }
        };
        decode_page(index, bytes).await.map(PageFetch::Found)
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn write_page(dir: &Path, name: &str, width: u32) {
        GrayImage::from_pixel(width, 3, Luma([255u8]))
            .save(dir.join(name))
            .unwrap();
    }

    #[tokio::test]
    async fn reads_numbered_pages() {
        let tmp = tempfile::tempdir().unwrap();
        write_page(tmp.path(), "0.png", 5);
        write_page(tmp.path(), "1.png", 6);

        let source = DirectoryPageSource::new(tmp.path(), 0);
        match source.fetch(1).await.unwrap() {
            PageFetch::Found(page) => assert_eq!(page.width(), 6),
            PageFetch::Absent => panic!("page 1 should exist"),
        }
        assert!(!source.fetch(2).await.unwrap().is_found());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error_not_absence() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("0.png"), b"broken").unwrap();
        let source = DirectoryPageSource::new(tmp.path(), 0);
        assert!(source.fetch(0).await.is_err());
    }

    #[tokio::test]
    async fn custom_extension_is_used_for_paths_and_listing() {
        let tmp = tempfile::tempdir().unwrap();
        GrayImage::from_pixel(4, 3, Luma([255u8]))
            .save_with_format(tmp.path().join("0.webp2"), image::ImageFormat::Png)
            .unwrap();
        write_page(tmp.path(), "1.png", 5);

        let source = DirectoryPageSource::new(tmp.path(), 0).with_extension("WEBP2");
        assert_eq!(source.page_path(3), tmp.path().join("3.webp2"));
        assert!(source.fetch(0).await.unwrap().is_found());
        assert!(!source.fetch(1).await.unwrap().is_found());
        assert_eq!(source.list_pages().unwrap(), vec![0]);
    }

    #[test]
    fn lists_only_numbered_pages() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["1.png", "2.PNG", "4.png", "cover.png", "3.txt"] {
            std::fs::write(tmp.path().join(name), b"x").unwrap();
        }

        let source = DirectoryPageSource::new(tmp.path(), 1);
        assert_eq!(source.list_pages().unwrap(), vec![0, 1, 3]);
    }
}
