// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bulk page download once the extent is known.
//
// One task per missing page inside a single `JoinSet`. Each result is written
// into the slot for its index, so no ordering between tasks is needed. The
// first failure aborts every other task and is returned; partial results are
// never handed back.

use std::collections::HashMap;
use std::sync::Arc;

use image::DynamicImage;
use notenband_core::FetchConfig;
use notenband_core::error::{NotenbandError, Result};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::cache::PageCache;
use crate::probe::{CachingProbe, ExtentProbe};
use crate::source::{PageFetch, PageSource};

/// Fetch pages `0..extent`, reusing whatever `cache` already holds.
///
/// `concurrency` bounds the number of simultaneous fetches; `None` starts
/// them all at once.
#[instrument(skip(source, cache), fields(source = %source.describe()))]
pub async fn fetch_all(
    source: Arc<dyn PageSource>,
    extent: usize,
    cache: &PageCache,
    concurrency: Option<usize>,
) -> Result<Vec<DynamicImage>> {
    let mut slots: Vec<Option<DynamicImage>> = (0..extent).map(|i| cache.take(i)).collect();
    let reused = slots.iter().filter(|slot| slot.is_some()).count();
    info!(extent, reused, "fetching remaining pages");

    let limiter = concurrency.map(|n| Arc::new(Semaphore::new(n.max(1))));
    let mut tasks = JoinSet::new();
    let mut task_pages = HashMap::new();

    for index in (0..extent).filter(|i| slots[*i].is_none()) {
        let source = Arc::clone(&source);
        let limiter = limiter.clone();
        let handle = tasks.spawn(async move {
            let _permit = match limiter {
                Some(semaphore) => Some(semaphore.acquire_owned().await.map_err(|err| {
                    NotenbandError::Fetch {
                        index,
                        reason: err.to_string(),
                    }
                })?),
                None => None,
            };
            let fetched = source.fetch(index).await?;
            Ok::<_, NotenbandError>((index, fetched))
        });
        task_pages.insert(handle.id(), index);
    }

    while let Some(joined) = tasks.join_next_with_id().await {
        let outcome = match joined {
            Ok((_, outcome)) => outcome,
            Err(err) => {
                let index = task_pages.get(&err.id()).copied().unwrap_or_default();
                Err(NotenbandError::Fetch {
                    index,
                    reason: format!("fetch task failed: {err}"),
                })
            }
        };

        match outcome {
            Ok((index, PageFetch::Found(page))) => {
                debug!(index, width = page.width(), height = page.height(), "page fetched");
                slots[index] = Some(page);
            }
            Ok((index, PageFetch::Absent)) => {
                tasks.abort_all();
                warn!(index, "page vanished after discovery");
                return Err(NotenbandError::Fetch {
                    index,
                    reason: "page no longer exists".into(),
                });
            }
            Err(err) => {
                tasks.abort_all();
                warn!(error = %err, "page fetch failed, cancelling remaining fetches");
                return Err(err);
            }
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| slot.ok_or(NotenbandError::PageMissing { index }))
        .collect()
}

/// Discover the page count, then download every page.
///
/// Pages downloaded while probing are handed to the bulk phase through a
/// fresh [`PageCache`].
#[instrument(skip_all, fields(source = %source.describe()))]
pub async fn discover_and_fetch(
    source: Arc<dyn PageSource>,
    config: &FetchConfig,
) -> Result<Vec<DynamicImage>> {
    let cache = PageCache::new();
    let report = {
        let probe = CachingProbe::new(source.as_ref(), &cache);
        ExtentProbe::from_config(config).find_extent(&probe).await?
    };
    if report.extent == 0 {
        warn!("source has no pages");
    }
    fetch_all(source, report.extent, &cache, config.concurrency).await
}
