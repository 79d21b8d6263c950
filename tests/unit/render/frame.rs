use super::*;
use crate::content::model::{AudioLocator, Difficulty};
use std::path::PathBuf;

const CANDIDATE_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

fn engine_or_skip() -> Option<TextLayoutEngine> {
    let from_env = std::env::var_os("LESSON_REEL_FONT").map(PathBuf::from);
    let path = from_env
        .into_iter()
        .chain(CANDIDATE_FONTS.iter().map(PathBuf::from))
        .find(|p| p.is_file());
    match path {
        Some(p) => Some(TextLayoutEngine::from_path(&p).unwrap()),
        None => {
            eprintln!("skipping: no system font found (set LESSON_REEL_FONT)");
            None
        }
    }
}

fn content() -> PresentationContent {
    PresentationContent {
        title: "Photosynthesis".to_string(),
        summary: "Plants use sunlight, water and carbon dioxide to make glucose and oxygen."
            .to_string(),
        key_points: vec![],
        difficulty: Difficulty::Grade9To10,
        audio: AudioLocator::File(PathBuf::from("n.wav")),
    }
}

#[test]
fn pixel_lookup_is_bounds_checked() {
    let frame = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![1, 2, 3, 4, 5, 6, 7, 8],
        premultiplied: true,
    };
    assert_eq!(frame.pixel(1, 0), Some([5, 6, 7, 8]));
    assert_eq!(frame.pixel(2, 0), None);
    assert_eq!(frame.pixel(0, 1), None);
}

#[test]
fn gradient_rows_interpolate_between_stops() {
    let top = Rgba8::new(0, 0, 0, 255);
    let bottom = Rgba8::new(200, 100, 50, 255);
    let paint = gradient_paint(top, bottom, 4, 3);
    assert!(paint.is_ok());
    assert!(gradient_paint(top, bottom, 70_000, 1).is_err());
}

#[test]
fn engine_measures_longer_text_wider() {
    let Some(mut engine) = engine_or_skip() else {
        return;
    };
    use crate::layout::wrap::TextMeasure as _;
    assert!(!engine.family_name().trim().is_empty());
    assert_eq!(engine.measure("", 32.0).unwrap(), 0.0);
    let short = engine.measure("cell", 32.0).unwrap();
    let long = engine.measure("cell membrane", 32.0).unwrap();
    assert!(short > 0.0);
    assert!(long > short);
    let big = engine.measure("cell", 64.0).unwrap();
    assert!(big > short * 1.5);
}

#[test]
fn renders_opaque_full_hd_frame() {
    let Some(engine) = engine_or_skip() else {
        return;
    };
    let style = FrameStyle::default();
    let mut renderer = FrameRenderer::new(engine, style.clone());
    let frame = renderer.render(&content()).unwrap();

    assert_eq!((frame.width, frame.height), (1920, 1080));
    assert_eq!(frame.data.len(), 1920 * 1080 * 4);
    assert!(frame.premultiplied);
    assert!(frame.data.chunks_exact(4).all(|px| px[3] == 255));

    let corner = frame.pixel(0, 0).unwrap();
    let expected = style.gradient_top.premultiplied();
    for c in 0..3 {
        assert!(corner[c].abs_diff(expected[c]) <= 2, "corner {corner:?} vs {expected:?}");
    }
}

#[test]
fn title_glyphs_are_drawn_inside_their_line_box() {
    let Some(engine) = engine_or_skip() else {
        return;
    };
    let mut renderer = FrameRenderer::new(engine, FrameStyle::default());
    let layout = renderer.layout(&content()).unwrap();
    let frame = renderer.render_layout(&layout).unwrap();

    let title = &layout.lines[1];
    let y0 = title.rect.y0.max(0.0) as u32;
    let y1 = title.rect.y1.min(1079.0) as u32;
    let x0 = title.rect.x0.max(0.0) as u32;
    let x1 = title.rect.x1.min(1919.0) as u32;
    let mut white = 0;
    for y in y0..y1 {
        for x in x0..x1 {
            let px = frame.pixel(x, y).unwrap();
            if px[0] > 240 && px[1] > 240 && px[2] > 240 {
                white += 1;
            }
        }
    }
    assert!(white > 100, "expected title glyph coverage, found {white} white pixels");
}
