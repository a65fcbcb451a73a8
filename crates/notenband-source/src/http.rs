// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP page source. Score viewers typically serve each page as a numbered
// image next to the others (`.../score/0.png`, `.../score/1.png`, ...), so the
// URL of any one page is enough to address all of them.

use async_trait::async_trait;
use notenband_core::error::{NotenbandError, Result};
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, instrument};

use crate::source::{PageFetch, PageSource, decode_page};

/// Fetches numbered page images relative to a known page URL.
pub struct HttpPageSource {
    client: Client,
    /// URL of some page; siblings are resolved relative to it.
    anchor: Url,
    extension: String,
    first_index: usize,
}

impl HttpPageSource {
    /// Build a source from the URL of any page of the score.
    ///
    /// The extension of that page's file name (default `png`) is used for
    /// every page.
    pub fn from_page_url(page_url: &str, first_index: usize) -> Result<Self> {
        let anchor = Url::parse(page_url).map_err(|err| {
            NotenbandError::Config(format!("invalid page URL '{page_url}': {err}"))
        })?;
        let extension = anchor
            .path_segments()
            .and_then(|segments| segments.last())
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .unwrap_or_else(|| "png".to_string());

        let client = Client::builder()
            .user_agent(concat!("notenband/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| NotenbandError::Config(format!("HTTP client setup failed: {err}")))?;

        Ok(Self {
            client,
            anchor,
            extension,
            first_index,
        })
    }

    /// URL of logical page `index`.
    pub fn page_url(&self, index: usize) -> Result<Url> {
        let name = format!("{}.{}", self.first_index + index, self.extension);
        self.anchor.join(&name).map_err(|err| NotenbandError::Fetch {
            index,
            reason: format!("cannot build URL for {name}: {err}"),
        })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    #[instrument(skip(self))]
    async fn fetch(&self, index: usize) -> Result<PageFetch> {
        let url = self.page_url(index)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| NotenbandError::Fetch {
                index,
                reason: format!("GET {url}: {err}"),
            })?;

        let status = response.status();
        // Viewers answer 403 rather than 404 past the last page.
        if status == StatusCode::FORBIDDEN || status == StatusCode::NOT_FOUND {
            debug!(index, %status, "page absent");
            return Ok(PageFetch::Absent);
        }
        if !status.is_success() {
            return Err(NotenbandError::Fetch {
                index,
                reason: format!("GET {url}: HTTP {status}"),
            });
        }

        let bytes = response.bytes().await.map_err(|err| NotenbandError::Fetch {
            index,
            reason: format!("reading body of {url}: {err}"),
        })?;
        debug!(index, bytes = bytes.len(), "page downloaded");
        decode_page(index, bytes.to_vec()).await.map(PageFetch::Found)
    }

    fn describe(&self) -> String {
        self.anchor.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;

    use image::{DynamicImage, ImageFormat};
    use notenband_core::FetchConfig;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::fetch::discover_and_fetch;

    fn png_bytes(width: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::new_luma8(width, 8)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    async fn serve(server: &MockServer, page: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(format!("/score/{page}")))
            .respond_with(response)
            .with_priority(1)
            .mount(server)
            .await;
    }

    #[test]
    fn siblings_resolve_next_to_anchor() {
        let source =
            HttpPageSource::from_page_url("https://scores.example.org/s/123/abc/2.png?x=1", 0)
                .unwrap();
        assert_eq!(
            source.page_url(0).unwrap().as_str(),
            "https://scores.example.org/s/123/abc/0.png"
        );
        assert_eq!(
            source.page_url(11).unwrap().as_str(),
            "https://scores.example.org/s/123/abc/11.png"
        );
    }

    #[test]
    fn extension_follows_anchor() {
        let source = HttpPageSource::from_page_url("https://example.org/p/0.JPG", 0).unwrap();
        assert!(source.page_url(3).unwrap().as_str().ends_with("/p/3.jpg"));
    }

    #[test]
    fn first_index_offsets_numbering() {
        let source = HttpPageSource::from_page_url("https://example.org/p/1.png", 1).unwrap();
        assert!(source.page_url(0).unwrap().as_str().ends_with("/p/1.png"));
        assert!(source.page_url(4).unwrap().as_str().ends_with("/p/5.png"));
    }

    #[test]
    fn bad_url_is_config_error() {
        assert!(matches!(
            HttpPageSource::from_page_url("not a url", 0),
            Err(NotenbandError::Config(_))
        ));
    }

    #[tokio::test]
    async fn statuses_map_to_found_absent_or_error() {
        let server = MockServer::start().await;
        serve(&server, "0.png", ResponseTemplate::new(200).set_body_bytes(png_bytes(3))).await;
        serve(&server, "1.png", ResponseTemplate::new(403)).await;
        serve(&server, "2.png", ResponseTemplate::new(404)).await;
        serve(&server, "3.png", ResponseTemplate::new(500)).await;

        let source =
            HttpPageSource::from_page_url(&format!("{}/score/0.png", server.uri()), 0).unwrap();

        match source.fetch(0).await.unwrap() {
            PageFetch::Found(page) => assert_eq!(page.width(), 3),
            PageFetch::Absent => panic!("page 0 should exist"),
        }
        assert!(!source.fetch(1).await.unwrap().is_found());
        assert!(!source.fetch(2).await.unwrap().is_found());
        assert!(matches!(
            source.fetch(3).await,
            Err(NotenbandError::Fetch { index: 3, .. })
        ));
    }

    #[tokio::test]
    async fn undecodable_body_is_an_error() {
        let server = MockServer::start().await;
        serve(&server, "0.png", ResponseTemplate::new(200).set_body_bytes(b"<html>".to_vec())).await;

        let source =
            HttpPageSource::from_page_url(&format!("{}/score/0.png", server.uri()), 0).unwrap();
        assert!(source.fetch(0).await.is_err());
    }

    #[tokio::test]
    async fn forbidden_past_the_end_bounds_discovery() {
        let server = MockServer::start().await;
        for index in 0..3 {
            let page = format!("{index}.png");
            serve(&server, &page, ResponseTemplate::new(200).set_body_bytes(png_bytes(index + 1)))
                .await;
        }
        Mock::given(method("GET"))
            .and(path_regex(r"^/score/\d+\.png$"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let source =
            HttpPageSource::from_page_url(&format!("{}/score/1.png", server.uri()), 0).unwrap();
        let pages = discover_and_fetch(Arc::new(source), &FetchConfig::default())
            .await
            .unwrap();
        let widths: Vec<u32> = pages.iter().map(|page| page.width()).collect();
        assert_eq!(widths, vec![1, 2, 3]);
    }
}
