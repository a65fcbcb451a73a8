// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// notenband-source — Where the page images come from.
//
// Discovers how many pages a score has without knowing the count up front
// (exponential + binary search over a page probe), downloads all of them
// concurrently while reusing pages already fetched during discovery, and
// reads title/composer metadata from a saved score page.

pub mod cache;
pub mod directory;
pub mod fetch;
pub mod http;
pub mod metadata;
pub mod probe;
pub mod source;

pub use cache::PageCache;
pub use directory::DirectoryPageSource;
pub use fetch::{discover_and_fetch, fetch_all};
pub use http::HttpPageSource;
pub use metadata::PageMetadata;
pub use probe::{CachingProbe, ExtentProbe, ExtentReport, PageProbe};
pub use source::{PageFetch, PageSource};
