// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Extent discovery: find how many pages exist when the count is unknown.
//
// Assumes pages exist for every index below some threshold T and for none at
// or above it. Probes n = w, 2w, 4w, ... until one is absent, then bisects the
// bracket between the last present and the first absent index. O(log T)
// probes instead of a linear scan.

use async_trait::async_trait;
use notenband_core::FetchConfig;
use notenband_core::error::{NotenbandError, Result};
use tracing::{debug, info, instrument};

use crate::cache::PageCache;
use crate::source::{PageFetch, PageSource};

/// Answers whether page `index` exists.
///
/// `Ok(false)` means authoritatively absent. An `Err` means existence could
/// not be determined and aborts the search.
#[async_trait]
pub trait PageProbe: Send + Sync {
    async fn exists(&self, index: usize) -> Result<bool>;
}

/// Result of an extent search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtentReport {
    /// Number of existing pages.
    pub extent: usize,
    /// Probe calls spent finding it.
    pub probes: usize,
}

/// Half-open search interval `[l, r)`: everything below `l` is known to
/// exist, `r` is known to be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bracket {
    l: usize,
    r: usize,
}

impl Bracket {
    fn is_resolved(&self) -> bool {
        self.r <= self.l
    }

    fn midpoint(&self) -> usize {
        self.l + (self.r - self.l) / 2
    }

    fn narrow(&mut self, probed: usize, exists: bool) {
        if exists {
            self.l = probed + 1;
        } else {
            self.r = probed;
        }
    }
}

/// Exponential-then-binary search for the page count.
#[derive(Debug, Clone, Copy)]
pub struct ExtentProbe {
    initial_window: usize,
    max_extent: usize,
}

impl ExtentProbe {
    /// `initial_window` is the first index probed (clamped to at least 1);
    /// the search fails once a page at or past `max_extent` still exists.
    pub fn new(initial_window: usize, max_extent: usize) -> Self {
        Self {
            initial_window: initial_window.max(1),
            max_extent,
        }
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(config.initial_window, config.max_extent)
    }

    /// Find the smallest index from which `probe` reports absence.
    #[instrument(skip_all, fields(initial_window = self.initial_window))]
    pub async fn find_extent<P>(&self, probe: &P) -> Result<ExtentReport>
    where
        P: PageProbe + ?Sized,
    {
        let mut probes = 0;
        let mut last_present: Option<usize> = None;
        let mut n = self.initial_window;

        // Doubling phase: find some absent index.
        loop {
            probes += 1;
            let exists = probe.exists(n).await?;
            debug!(index = n, exists, "doubling probe");
            if !exists {
                break;
            }
            if n >= self.max_extent {
                return Err(NotenbandError::ExtentLimitExceeded {
                    limit: self.max_extent,
                });
            }
            last_present = Some(n);
            n = n.saturating_mul(2);
        }

        // Bisection phase over the bracket the doubling phase left behind.
        let mut bracket = Bracket {
            l: last_present.map_or(0, |i| i + 1),
            r: n,
        };
        while !bracket.is_resolved() {
            let mid = bracket.midpoint();
            probes += 1;
            let exists = probe.exists(mid).await?;
            bracket.narrow(mid, exists);
            debug!(index = mid, exists, l = bracket.l, r = bracket.r, "bisect probe");
        }

        info!(extent = bracket.l, probes, "page extent discovered");
        Ok(ExtentReport {
            extent: bracket.l,
            probes,
        })
    }
}

/// Probe backed by a real page source. Every page it sees is stored in the
/// shared cache so the bulk download can skip it.
pub struct CachingProbe<'a> {
    source: &'a dyn PageSource,
    cache: &'a PageCache,
}

impl<'a> CachingProbe<'a> {
    pub fn new(source: &'a dyn PageSource, cache: &'a PageCache) -> Self {
        Self { source, cache }
    }
}

#[async_trait]
impl PageProbe for CachingProbe<'_> {
    async fn exists(&self, index: usize) -> Result<bool> {
        if self.cache.contains(index) {
            return Ok(true);
        }
        let fetched = self
            .source
            .fetch(index)
            .await
            .map_err(|err| NotenbandError::ProbeFailed {
                index,
                reason: err.to_string(),
            })?;
        match fetched {
            PageFetch::Found(page) => {
                self.cache.insert(index, page);
                Ok(true)
            }
            PageFetch::Absent => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// `exists(n) = n < threshold`, counting calls.
    struct Threshold {
        threshold: usize,
        calls: AtomicUsize,
    }

    impl Threshold {
        fn new(threshold: usize) -> Self {
            Self {
                threshold,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PageProbe for Threshold {
        async fn exists(&self, index: usize) -> Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(index < self.threshold)
        }
    }

    fn ceil_log2(n: usize) -> usize {
        (usize::BITS - n.max(1).saturating_sub(1).leading_zeros()) as usize
    }

    #[tokio::test]
    async fn finds_every_threshold_up_to_300() {
        let search = ExtentProbe::new(4, 4096);
        for t in 0..=300 {
            let probe = Threshold::new(t);
            let report = search.find_extent(&probe).await.unwrap();
            assert_eq!(report.extent, t, "threshold {t}");
            assert_eq!(report.probes, probe.calls.load(Ordering::SeqCst));
        }
    }

    #[tokio::test]
    async fn probe_count_is_logarithmic() {
        let search = ExtentProbe::new(4, 1 << 20);
        for t in [1usize, 10, 100, 1000, 10_000, 500_000] {
            let probe = Threshold::new(t);
            let report = search.find_extent(&probe).await.unwrap();
            assert_eq!(report.extent, t);
            // Doubling and bisection each cost about log2(T) probes.
            assert!(
                report.probes <= 2 * ceil_log2(t) + 4,
                "T={t} took {} probes",
                report.probes
            );
        }
    }

    #[tokio::test]
    async fn ten_pages_yield_extent_ten() {
        let report = ExtentProbe::new(4, 4096)
            .find_extent(&Threshold::new(10))
            .await
            .unwrap();
        assert_eq!(report.extent, 10);
    }

    struct Failing;

    #[async_trait]
    impl PageProbe for Failing {
        async fn exists(&self, index: usize) -> Result<bool> {
            if index >= 8 {
                Err(NotenbandError::ProbeFailed {
                    index,
                    reason: "connection reset".into(),
                })
            } else {
                Ok(true)
            }
        }
    }

    #[tokio::test]
    async fn probe_error_aborts_search() {
        let err = ExtentProbe::new(4, 4096).find_extent(&Failing).await.unwrap_err();
        assert!(matches!(err, NotenbandError::ProbeFailed { index: 8, .. }));
    }

    #[tokio::test]
    async fn endless_source_hits_limit() {
        let err = ExtentProbe::new(4, 64)
            .find_extent(&Threshold::new(usize::MAX))
            .await
            .unwrap_err();
        assert!(matches!(err, NotenbandError::ExtentLimitExceeded { limit: 64 }));
    }

    #[test]
    fn bracket_resolves_when_bounds_meet() {
        let mut bracket = Bracket { l: 5, r: 8 };
        assert!(!bracket.is_resolved());
        assert_eq!(bracket.midpoint(), 6);
        bracket.narrow(6, true);
        assert_eq!(bracket, Bracket { l: 7, r: 8 });
        bracket.narrow(7, false);
        assert!(bracket.is_resolved());
        assert_eq!(bracket.l, 7);
    }

    /// Source holding `count` one-pixel pages, recording every fetch.
    struct CountingSource {
        count: usize,
        fetched: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl PageSource for CountingSource {
        async fn fetch(&self, index: usize) -> Result<PageFetch> {
            self.fetched.lock().unwrap().push(index);
            if index < self.count {
                Ok(PageFetch::Found(image::DynamicImage::new_luma8(1, 1)))
            } else {
                Ok(PageFetch::Absent)
            }
        }

        fn describe(&self) -> String {
            "counting".into()
        }
    }

    #[tokio::test]
    async fn caching_probe_stores_found_pages() {
        let source = CountingSource {
            count: 6,
            fetched: Mutex::new(Vec::new()),
        };
        let cache = PageCache::new();
        let report = ExtentProbe::new(4, 4096)
            .find_extent(&CachingProbe::new(&source, &cache))
            .await
            .unwrap();

        assert_eq!(report.extent, 6);
        let fetched = source.fetched.lock().unwrap().clone();
        for index in fetched.iter().filter(|i| **i < 6) {
            assert!(cache.contains(*index), "page {index} should be cached");
        }
        assert!(!cache.contains(6));
    }
}
