// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fetched-page cache shared by the extent probe and the bulk download.
//
// Probing a page downloads it as a side effect; the probe stores those pages
// here and the bulk phase takes them back out instead of fetching again.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use image::DynamicImage;

/// Index-keyed store of already-decoded pages.
#[derive(Debug, Default)]
pub struct PageCache {
    pages: Mutex<HashMap<usize, DynamicImage>>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember page `index`, replacing any earlier copy.
    pub fn insert(&self, index: usize, page: DynamicImage) {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(index, page);
    }

    /// Remove and return page `index` if it was cached.
    pub fn take(&self, index: usize) -> Option<DynamicImage> {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&index)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.pages.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
