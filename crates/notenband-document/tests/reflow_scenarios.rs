// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end scenarios over synthetic score pages: transparent background,
// opaque black bar lines.

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use notenband_core::NotenbandConfig;
use notenband_core::error::NotenbandError;
use notenband_core::types::Bar;
use notenband_document::{BarDetector, CanvasStitcher, LinePacker, ReflowPlan, build_measures};

const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// A transparent page with 2px full-height bar lines at `bar_columns`.
fn page(width: u32, height: u32, bar_columns: &[u32]) -> DynamicImage {
    let mut img = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    for &x in bar_columns {
        draw_filled_rect_mut(&mut img, Rect::at(x as i32, 0).of_size(2, height), INK);
    }
    // A note head and stem that must not register as a bar.
    draw_filled_rect_mut(&mut img, Rect::at(15, 40).of_size(1, 30), INK);
    DynamicImage::ImageRgba8(img)
}

fn two_pages() -> Vec<DynamicImage> {
    vec![page(50, 100, &[5, 30]), page(60, 100, &[10, 45])]
}

#[test]
fn two_pages_stitch_detect_and_measure() {
    let config = NotenbandConfig::default();
    let canvas = CanvasStitcher::new(config.detection.ink)
        .stitch(&two_pages())
        .unwrap();
    assert_eq!((canvas.width(), canvas.height()), (110, 100));

    let bars = BarDetector::new(&config.detection).detect(canvas.as_gray());
    assert_eq!(
        bars,
        vec![
            Bar::new(5, 6),
            Bar::new(30, 31),
            Bar::new(60, 61),
            Bar::new(95, 96)
        ]
    );

    let measures = build_measures(&bars).unwrap();
    let lengths: Vec<u32> = measures.iter().map(|m| m.length()).collect();
    assert_eq!(lengths, vec![27, 32, 37]);
}

#[test]
fn packing_follows_line_width() {
    let mut config = NotenbandConfig::default();
    config.layout.max_line_width_px = 70;
    let canvas = CanvasStitcher::default().stitch(&two_pages()).unwrap();
    let bars = BarDetector::new(&config.detection).detect(canvas.as_gray());
    let measures = build_measures(&bars).unwrap();

    // 27 + 32 share bar 30..31: 5..61 is 57px, adding the third overflows.
    let lines = LinePacker::new(config.layout.max_line_width_px)
        .pack(&measures)
        .unwrap();
    let lengths: Vec<u32> = lines.iter().map(|l| l.length()).collect();
    assert_eq!(lengths, vec![57, 37]);
}

#[test]
fn full_plan_renders_a_pdf() {
    let mut config = NotenbandConfig::default();
    config.layout.max_line_width_px = 100;
    config.title = Some("Two Page Study".into());
    config.composer = Some("Anonymous".into());

    let plan = ReflowPlan::build(&two_pages(), &config).unwrap();
    assert_eq!(plan.measures.len(), 3);
    assert_eq!(plan.lines.len(), 1);
    assert_eq!(plan.lines[0].length(), 92);
    assert_eq!(plan.layout.pages.len(), 1);
    assert_eq!(plan.layout.pages[0].texts.len(), 2);

    let bytes = plan.render_pdf().unwrap();
    let parsed = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(parsed.get_pages().len(), 1);

    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("study.pdf");
    plan.write_pdf(&path).unwrap();
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
}

#[test]
fn too_tall_for_the_page_fails() {
    // Widest line is 57px for a 100px tall canvas: scaled taller than A4.
    let mut config = NotenbandConfig::default();
    config.layout.max_line_width_px = 70;
    let err = ReflowPlan::build(&two_pages(), &config).err().unwrap();
    assert!(matches!(err, NotenbandError::PageTooSmall { .. }));
}

#[test]
fn line_width_one_below_longest_measure_fails() {
    let mut config = NotenbandConfig::default();
    config.layout.max_line_width_px = 37 - 1;
    let err = ReflowPlan::build(&two_pages(), &config).err().unwrap();
    assert!(matches!(
        err,
        NotenbandError::LineTooNarrow {
            max_width: 36,
            measure_width: 37
        }
    ));
}

#[test]
fn mismatched_heights_name_second_page() {
    let pages = vec![page(50, 100, &[5]), page(60, 101, &[10])];
    let err = ReflowPlan::build(&pages, &NotenbandConfig::default())
        .err()
        .unwrap();
    assert!(matches!(
        err,
        NotenbandError::HeightMismatch {
            index: 1,
            height: 101,
            expected: 100
        }
    ));
}

#[test]
fn single_bar_is_not_enough() {
    let pages = vec![page(50, 100, &[20])];
    let err = ReflowPlan::build(&pages, &NotenbandConfig::default())
        .err()
        .unwrap();
    assert!(matches!(err, NotenbandError::InsufficientBars { found: 1 }));
}

#[test]
fn bar_split_across_page_seam_is_one_bar() {
    // Last column of page one and first column of page two.
    let first = page(50, 100, &[10, 48]);
    let second = page(40, 100, &[0, 30]);
    let canvas = CanvasStitcher::default().stitch(&[first, second]).unwrap();
    let bars = BarDetector::with_thresholds(25, 0.5, 10).detect(canvas.as_gray());
    assert_eq!(
        bars,
        vec![Bar::new(10, 11), Bar::new(48, 51), Bar::new(80, 81)]
    );
}

#[test]
fn overlay_matches_canvas_size() {
    let mut config = NotenbandConfig::default();
    config.layout.max_line_width_px = 200;
    let plan = ReflowPlan::build(&two_pages(), &config).unwrap();
    assert_eq!(plan.overlay().dimensions(), (110, 100));
}
