// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Diagnostic overlay: the stitched canvas with detected bars and packed line
// boundaries drawn on top, for tuning detection thresholds. Page seams get a
// short green tick along the top edge, since a bar split across two pages is
// the usual cause of a merged or missed bar.

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use notenband_core::types::{Bar, Line};

use crate::canvas::Canvas;

const BAR_COLOUR: Rgb<u8> = Rgb([220, 30, 30]);
const LINE_COLOUR: Rgb<u8> = Rgb([30, 60, 220]);
const SEAM_COLOUR: Rgb<u8> = Rgb([30, 170, 60]);

/// RGB copy of `canvas` with bars filled red, line edges marked blue and
/// page seams ticked green.
pub fn debug_overlay(canvas: &Canvas, bars: &[Bar], lines: &[Line]) -> RgbImage {
    let mut out = DynamicImage::ImageLuma8(canvas.as_gray().clone()).to_rgb8();
    let height = canvas.height();
    if height == 0 {
        return out;
    }

    for bar in bars {
        let rect = Rect::at(bar.start_pos as i32, 0).of_size(bar.width(), height);
        draw_filled_rect_mut(&mut out, rect, BAR_COLOUR);
    }

    let bottom = (height - 1) as f32;
    for line in lines {
        for x in [line.start_pos(), line.end_pos()] {
            draw_line_segment_mut(&mut out, (x as f32, 0.0), (x as f32, bottom), LINE_COLOUR);
        }
    }

    let tick = (height / 8).max(1);
    let widths = canvas.page_widths();
    let mut seam = 0;
    for width in &widths[..widths.len().saturating_sub(1)] {
        seam += width;
        draw_filled_rect_mut(&mut out, Rect::at(seam as i32, 0).of_size(1, tick), SEAM_COLOUR);
    }
    out
}
