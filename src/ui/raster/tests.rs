use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

use super::{GlyphSet, SurfaceView, rasterize};
use crate::{
    scene::sky::{SkyColors, paint_sky},
    surface::{ElementId, ElementKind, PathData, Point, Rgb, Surface, Viewport},
    ui::theme::ColorCapability,
};

// 10 x 10 cells of 8 x 16 units each.
fn surface() -> Surface {
    Surface::new(Viewport::new(80.0, 160.0)).expect("surface")
}

fn vertical_line(s: &mut Surface, parent: ElementId, offset: f64) -> ElementId {
    let line = s.create(parent, ElementKind::Line);
    s.set(line)
        .attr("x1", 40.0)
        .attr("y1", 0.0)
        .attr("x2", 40.0)
        .attr("y2", 160.0)
        .attr("stroke", "#4444ff")
        .attr("stroke-width", 8.0)
        .attr("stroke-dasharray", "160 160")
        .attr("stroke-dashoffset", offset);
    line
}

#[test]
fn sky_gradient_darkens_upwards() {
    let mut s = surface();
    let viewport = s.viewport();
    paint_sky(
        &mut s,
        viewport,
        &SkyColors {
            gradient_start: "#000000".to_string(),
            gradient_end: "#ffffff".to_string(),
        },
    );
    let canvas = rasterize(&s, 10, 10, GlyphSet::Unicode);
    let top = canvas.pixel(0, 0).expect("top").bg;
    let bottom = canvas.pixel(0, 9).expect("bottom").bg;
    assert!(top.0 < 40, "top row {top:?}");
    assert_eq!(bottom, Rgb::WHITE);
    assert_eq!(canvas.row_text(0).trim(), "");
}

#[test]
fn filled_path_covers_its_cells_only() {
    let mut s = surface();
    let root = s.root();
    let mut d = PathData::new();
    d.move_to(Point::new(0.0, 0.0))
        .line_to(Point::new(40.0, 0.0))
        .line_to(Point::new(40.0, 80.0))
        .line_to(Point::new(0.0, 80.0))
        .close();
    let path = s.create(root, ElementKind::Path);
    s.set(path).attr("d", d).attr("fill", "#336699");

    let canvas = rasterize(&s, 10, 10, GlyphSet::Unicode);
    assert_eq!(canvas.pixel(2, 2).expect("inside").bg, Rgb(0x33, 0x66, 0x99));
    assert_eq!(canvas.pixel(4, 4).expect("corner").bg, Rgb(0x33, 0x66, 0x99));
    assert_eq!(canvas.pixel(5, 2).expect("right").bg, Rgb::BLACK);
    assert_eq!(canvas.pixel(2, 7).expect("below").bg, Rgb::BLACK);
}

#[test]
fn dash_offset_hides_then_reveals_a_core_line() {
    let mut s = surface();
    let root = s.root();
    let line = vertical_line(&mut s, root, 160.0);
    let hidden = rasterize(&s, 10, 10, GlyphSet::Unicode);
    assert!((0..10).all(|y| hidden.row_text(y).trim().is_empty()));

    s.set(line).attr("stroke-dashoffset", 80.0);
    let half = rasterize(&s, 10, 10, GlyphSet::Unicode);
    assert_eq!(half.pixel(5, 2).and_then(|px| px.glyph), Some('│'));
    assert_eq!(half.pixel(5, 8).and_then(|px| px.glyph), None);

    s.set(line).attr("stroke-dashoffset", 0.0);
    let full = rasterize(&s, 10, 10, GlyphSet::Ascii);
    for y in 0..10 {
        assert_eq!(full.row_text(y), "     |    ");
    }
    assert_eq!(full.pixel(5, 9).expect("cell").fg, Rgb(0x44, 0x44, 0xff));
}

#[test]
fn diagonal_strokes_pick_slanted_glyphs() {
    assert_eq!(GlyphSet::Unicode.stroke(1.0, 1.0), '╲');
    assert_eq!(GlyphSet::Unicode.stroke(-1.0, 1.0), '╱');
    assert_eq!(GlyphSet::Unicode.stroke(5.0, 0.1), '─');
    assert_eq!(GlyphSet::Ascii.stroke(0.0, -3.0), '|');
}

#[test]
fn glow_under_blur_filter_tints_without_glyphs() {
    let mut s = surface();
    let root = s.root();
    let filter = s.create_filter("ray-blur-1");
    s.create(filter, ElementKind::FeGaussianBlur);
    let group = s.create(root, ElementKind::Group);
    s.set(group).attr("filter", "url(#ray-blur-1)");
    vertical_line(&mut s, group, 0.0);

    let canvas = rasterize(&s, 10, 10, GlyphSet::Unicode);
    let px = canvas.pixel(5, 5).expect("cell");
    assert_eq!(px.glyph, None);
    assert_ne!(px.bg, Rgb::BLACK);
    assert!(px.bg.2 > px.bg.0);
    assert_eq!(canvas.pixel(0, 5).expect("far").bg, Rgb::BLACK);
}

#[test]
fn stars_become_dots_and_opaque_fills_cover_them() {
    let mut s = surface();
    let root = s.root();
    let star = s.create(root, ElementKind::Circle);
    s.set(star)
        .attr("cx", 44.0)
        .attr("cy", 88.0)
        .attr("r", 1.0)
        .attr("fill", "white")
        .attr("opacity", 0.5);

    let unicode = rasterize(&s, 10, 10, GlyphSet::Unicode);
    assert_eq!(unicode.pixel(5, 5).and_then(|px| px.glyph), Some('·'));
    let ascii = rasterize(&s, 10, 10, GlyphSet::Ascii);
    assert_eq!(ascii.pixel(5, 5).and_then(|px| px.glyph), Some('.'));

    let cover = s.create(root, ElementKind::Rect);
    s.set(cover)
        .attr("x", 0.0)
        .attr("y", 80.0)
        .attr("width", 80.0)
        .attr("height", 80.0)
        .attr("fill", "#202020");
    let covered = rasterize(&s, 10, 10, GlyphSet::Unicode);
    assert_eq!(covered.pixel(5, 5).and_then(|px| px.glyph), None);
    assert_eq!(covered.pixel(5, 5).expect("cell").bg, Rgb(0x20, 0x20, 0x20));
}

#[test]
fn widget_writes_quantized_cells_into_the_buffer() {
    let mut s = surface();
    let root = s.root();
    vertical_line(&mut s, root, 0.0);
    let area = Rect::new(0, 0, 10, 10);
    let mut buf = Buffer::empty(area);
    SurfaceView::new(&s, ColorCapability::TrueColor).render(area, &mut buf);

    let cell = &buf[(5, 3)];
    assert_eq!(cell.symbol(), "│");
    assert_eq!(cell.fg, Color::Rgb(0x44, 0x44, 0xff));
    assert_eq!(buf[(0, 0)].bg, Color::Rgb(0, 0, 0));
}
