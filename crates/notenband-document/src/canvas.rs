// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Canvas stitching — concatenate page rasters left to right into one
// single-channel strip where dark means ink.

use image::{DynamicImage, GrayImage, Luma, Rgba, imageops};
use notenband_core::InkSource;
use notenband_core::error::{NotenbandError, Result};
use tracing::{debug, info, instrument};

/// The stitched score: all pages side by side, one byte per pixel, 0 = ink.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: GrayImage,
    page_widths: Vec<u32>,
}

impl Canvas {
    /// Wrap an existing darkness raster as a single-page canvas.
    pub fn from_gray(image: GrayImage) -> Self {
        let page_widths = vec![image.width()];
        Self { image, page_widths }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Widths of the source pages, in stitching order.
    pub fn page_widths(&self) -> &[u32] {
        &self.page_widths
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.image
    }

    /// Full-height copy of columns `x .. x + width`, clamped to the canvas.
    pub fn region(&self, x: u32, width: u32) -> GrayImage {
        imageops::crop_imm(&self.image, x, 0, width, self.image.height()).to_image()
    }

    /// Write the canvas to an image file; the format follows the extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        self.image.save(path.as_ref()).map_err(|err| {
            NotenbandError::ImageError(format!(
                "failed to save canvas to {}: {}",
                path.as_ref().display(),
                err
            ))
        })
    }
}

/// Joins page rasters into a [`Canvas`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CanvasStitcher {
    ink: InkSource,
}

impl CanvasStitcher {
    pub fn new(ink: InkSource) -> Self {
        Self { ink }
    }

    /// Stitch fully fetched pages.
    pub fn stitch(&self, pages: &[DynamicImage]) -> Result<Canvas> {
        self.stitch_pages(pages.iter().collect())
    }

    /// Stitch index-addressed slots; an empty slot is a missing page.
    pub fn stitch_slots(&self, slots: &[Option<DynamicImage>]) -> Result<Canvas> {
        let pages = slots
            .iter()
            .enumerate()
            .map(|(index, slot)| slot.as_ref().ok_or(NotenbandError::PageMissing { index }))
            .collect::<Result<Vec<_>>>()?;
        self.stitch_pages(pages)
    }

    #[instrument(skip_all, fields(pages = pages.len(), ink = ?self.ink))]
    fn stitch_pages(&self, pages: Vec<&DynamicImage>) -> Result<Canvas> {
        let Some(first) = pages.first() else {
            return Err(NotenbandError::EmptyCanvas);
        };
        let height = first.height();
        for (index, page) in pages.iter().enumerate() {
            if page.height() != height {
                return Err(NotenbandError::HeightMismatch {
                    index,
                    height: page.height(),
                    expected: height,
                });
            }
        }

        let page_widths: Vec<u32> = pages.iter().map(|page| page.width()).collect();
        let width: u32 = page_widths.iter().sum();
        if width == 0 || height == 0 {
            return Err(NotenbandError::EmptyCanvas);
        }

        let mut canvas = GrayImage::new(width, height);
        let mut x_offset = 0i64;
        for (index, page) in pages.iter().enumerate() {
            let rgba = page.to_rgba8();
            let darkness = GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
                Luma([self.darkness(rgba.get_pixel(x, y))])
            });
            imageops::replace(&mut canvas, &darkness, x_offset, 0);
            debug!(index, x_offset, width = page.width(), "page stitched");
            x_offset += i64::from(page.width());
        }

        info!(width, height, "canvas stitched");
        Ok(Canvas {
            image: canvas,
            page_widths,
        })
    }

    /// Canvas value for one source pixel: low = ink.
    fn darkness(&self, pixel: &Rgba<u8>) -> u8 {
        let Rgba([r, g, b, a]) = *pixel;
        match self.ink {
            InkSource::Opacity => 255 - a,
            InkSource::Composite => {
                // Composite over white, then Rec. 709 luma.
                let over_white = |c: u8| -> f32 {
                    let alpha = f32::from(a) / 255.0;
                    f32::from(c) * alpha + 255.0 * (1.0 - alpha)
                };
                let luma =
                    0.2126 * over_white(r) + 0.7152 * over_white(g) + 0.0722 * over_white(b);
                luma.round().clamp(0.0, 255.0) as u8
            }
        }
    }
}
