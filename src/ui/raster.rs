#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

//! Rasterizes the vector surface into terminal cells.
//!
//! Each cell is sampled at its centre. Fills and gradients tint the cell
//! background, filled paths use an even-odd scanline, bolt cores become
//! box-drawing glyphs and anything under a blurring filter becomes a soft
//! background glow.

use std::collections::HashMap;

use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use crate::{
    surface::{Affine, AttrValue, Element, ElementId, ElementKind, Point, Rgb, Surface},
    ui::theme::{ColorCapability, quantize},
};

const OPAQUE: f64 = 0.99;
const GLOW_ALPHA: f64 = 0.45;
const CORE_TINT: f64 = 0.25;
const STAR_FLOOR: f64 = 0.3;
const STEEP: f64 = 2.4;
/// Dash lengths are serialized with three decimals.
const MIN_REVEAL: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlyphSet {
    #[default]
    Unicode,
    Ascii,
}

impl GlyphSet {
    fn star(self, big: bool) -> char {
        match (self, big) {
            (GlyphSet::Unicode, true) => '✦',
            (GlyphSet::Unicode, false) => '·',
            (GlyphSet::Ascii, true) => '*',
            (GlyphSet::Ascii, false) => '.',
        }
    }

    /// Stroke glyph for a direction in cell space. Cells are about twice as
    /// tall as wide, so vertical travel counts double.
    fn stroke(self, dx: f64, dy: f64) -> char {
        let (run, rise) = (dx.abs(), (dy * 2.0).abs());
        let shape = if rise > STEEP * run {
            0
        } else if run > STEEP * rise {
            1
        } else if dx * dy > 0.0 {
            2
        } else {
            3
        };
        match (self, shape) {
            (GlyphSet::Unicode, 0) => '│',
            (GlyphSet::Unicode, 1) => '─',
            (GlyphSet::Unicode, 2) => '╲',
            (GlyphSet::Unicode, _) => '╱',
            (GlyphSet::Ascii, 0) => '|',
            (GlyphSet::Ascii, 1) => '-',
            (GlyphSet::Ascii, 2) => '\\',
            (GlyphSet::Ascii, _) => '/',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pixel {
    pub bg: Rgb,
    pub fg: Rgb,
    pub glyph: Option<char>,
}

/// Cell grid produced by [`rasterize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl Canvas {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Pixel::default(); width * height],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Pixel> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    fn pixel_mut(&mut self, x: i64, y: i64) -> Option<&mut Pixel> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(&mut self.pixels[y as usize * self.width + x as usize])
    }

    fn blend(&mut self, x: i64, y: i64, color: Rgb, alpha: f64) {
        let Some(px) = self.pixel_mut(x, y) else {
            return;
        };
        px.bg = color.over(px.bg, alpha);
        if alpha >= OPAQUE {
            px.glyph = None;
        } else if px.glyph.is_some() {
            px.fg = color.over(px.fg, alpha);
        }
    }

    fn put(&mut self, x: i64, y: i64, glyph: char, fg: Rgb) {
        if let Some(px) = self.pixel_mut(x, y) {
            px.glyph = Some(glyph);
            px.fg = fg;
        }
    }

    /// Row of glyphs, blanks for empty cells.
    #[must_use]
    pub fn row_text(&self, y: usize) -> String {
        (0..self.width)
            .map(|x| self.pixel(x, y).and_then(|px| px.glyph).unwrap_or(' '))
            .collect()
    }

    pub fn paint(&self, area: Rect, buf: &mut Buffer, capability: ColorCapability) {
        for (i, px) in self.pixels.iter().enumerate() {
            let (x, y) = ((i % self.width) as u16, (i / self.width) as u16);
            if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
                cell.set_char(px.glyph.unwrap_or(' '))
                    .set_bg(quantize(px.bg, capability))
                    .set_fg(quantize(px.fg, capability));
            }
        }
    }
}

/// Widget drawing a [`Surface`] stretched over its area.
pub struct SurfaceView<'a> {
    surface: &'a Surface,
    capability: ColorCapability,
    glyphs: GlyphSet,
}

impl<'a> SurfaceView<'a> {
    #[must_use]
    pub fn new(surface: &'a Surface, capability: ColorCapability) -> Self {
        Self {
            surface,
            capability,
            glyphs: GlyphSet::Unicode,
        }
    }

    #[must_use]
    pub fn glyphs(mut self, glyphs: GlyphSet) -> Self {
        self.glyphs = glyphs;
        self
    }
}

impl Widget for SurfaceView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        rasterize(self.surface, area.width, area.height, self.glyphs).paint(
            area,
            buf,
            self.capability,
        );
    }
}

#[derive(Clone, Copy)]
struct Context {
    matrix: Affine,
    opacity: f64,
    glow: bool,
}

#[must_use]
pub fn rasterize(surface: &Surface, width: u16, height: u16, glyphs: GlyphSet) -> Canvas {
    let mut canvas = Canvas::new(usize::from(width), usize::from(height));
    let viewport = surface.viewport();
    let context = Context {
        matrix: Affine::scale(
            f64::from(width) / viewport.width,
            f64::from(height) / viewport.height,
        ),
        opacity: 1.0,
        glow: false,
    };
    Rasterizer {
        surface,
        glyphs,
        canvas: &mut canvas,
    }
    .walk(surface.root(), context);
    canvas
}

struct Rasterizer<'a> {
    surface: &'a Surface,
    glyphs: GlyphSet,
    canvas: &'a mut Canvas,
}

impl Rasterizer<'_> {
    fn walk(&mut self, id: ElementId, parent: Context) {
        let surface = self.surface;
        let Some(el) = surface.get(id) else {
            return;
        };
        let context = Context {
            matrix: parent.matrix.then_before(el.transform()),
            opacity: parent.opacity * el.number("opacity").unwrap_or(1.0),
            glow: parent.glow || el.text("filter").is_some_and(|f| self.blurs(f)),
        };
        match el.kind {
            ElementKind::Svg | ElementKind::Group => {
                for child in el.children() {
                    self.walk(*child, context);
                }
            }
            ElementKind::Rect => self.rect(el, context),
            ElementKind::Path => self.path(el, context),
            ElementKind::Circle => self.circle(el, context),
            ElementKind::Line => self.line(el, context),
            _ => {}
        }
    }

    fn blurs(&self, filter: &str) -> bool {
        self.surface
            .resolve_url(filter)
            .and_then(|id| self.surface.get(id))
            .is_some_and(|el| {
                el.children().iter().any(|child| {
                    self.surface.get(*child).map(|c| c.kind) == Some(ElementKind::FeGaussianBlur)
                })
            })
    }

    fn fill(&self, el: &Element, context: Context) -> Option<(Paint, f64)> {
        let paint = Paint::resolve(self.surface, el.text("fill")?)?;
        let alpha = context.opacity * el.number("fill-opacity").unwrap_or(1.0);
        (alpha > 0.0).then_some((paint, alpha.min(1.0)))
    }

    fn rect(&mut self, el: &Element, context: Context) {
        let Some((paint, alpha)) = self.fill(el, context) else {
            return;
        };
        let (x, y) = (el.number("x").unwrap_or(0.0), el.number("y").unwrap_or(0.0));
        let (w, h) = (
            el.number("width").unwrap_or(0.0),
            el.number("height").unwrap_or(0.0),
        );
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let a = context.matrix.apply(Point::new(x, y));
        let b = context.matrix.apply(Point::new(x + w, y + h));
        let (x0, x1) = (a.x.min(b.x), a.x.max(b.x));
        let (y0, y1) = (a.y.min(b.y), a.y.max(b.y));

        for cy in cell_span(y0, y1, self.canvas.height) {
            let v = (cy as f64 + 0.5 - y0) / (y1 - y0);
            for cx in cell_span(x0, x1, self.canvas.width) {
                let u = (cx as f64 + 0.5 - x0) / (x1 - x0);
                let (color, stop_alpha) = paint.sample(u, v);
                self.canvas.blend(cx, cy, color, alpha * stop_alpha);
            }
        }
    }

    fn path(&mut self, el: &Element, context: Context) {
        let Some((paint, alpha)) = self.fill(el, context) else {
            return;
        };
        let Some(AttrValue::Path(data)) = el.attrs.get("d") else {
            return;
        };
        let polygons = data.flatten(context.matrix);
        for cy in 0..self.canvas.height as i64 {
            let scan = cy as f64 + 0.5;
            let mut crossings: Vec<f64> = Vec::new();
            for polygon in &polygons {
                for (i, p) in polygon.iter().enumerate() {
                    let q = polygon[(i + 1) % polygon.len()];
                    if (p.y <= scan) != (q.y <= scan) {
                        crossings.push(p.x + (scan - p.y) / (q.y - p.y) * (q.x - p.x));
                    }
                }
            }
            crossings.sort_by(f64::total_cmp);
            for pair in crossings.chunks_exact(2) {
                for cx in cell_span(pair[0], pair[1], self.canvas.width) {
                    let (color, stop_alpha) = paint.sample(0.0, 0.0);
                    self.canvas.blend(cx, cy, color, alpha * stop_alpha);
                }
            }
        }
    }

    fn circle(&mut self, el: &Element, context: Context) {
        let Some((paint, alpha)) = self.fill(el, context) else {
            return;
        };
        let centre = context.matrix.apply(Point::new(
            el.number("cx").unwrap_or(0.0),
            el.number("cy").unwrap_or(0.0),
        ));
        let (x, y) = (centre.x.floor() as i64, centre.y.floor() as i64);
        let radius = el.number("r").unwrap_or(0.0);
        let (color, _) = paint.sample(0.5, 0.5);
        let glyph = self.glyphs.star(radius >= 1.2);
        if let Some(px) = self.canvas.pixel_mut(x, y)
            && px.glyph.is_none()
        {
            px.fg = color.over(px.bg, STAR_FLOOR + (1.0 - STAR_FLOOR) * alpha);
            px.glyph = Some(glyph);
        }
    }

    fn line(&mut self, el: &Element, context: Context) {
        let Some(stroke) = el.text("stroke").and_then(|s| Rgb::parse(s).ok()) else {
            return;
        };
        let start = Point::new(
            el.number("x1").unwrap_or(0.0),
            el.number("y1").unwrap_or(0.0),
        );
        let end = Point::new(
            el.number("x2").unwrap_or(0.0),
            el.number("y2").unwrap_or(0.0),
        );
        let fraction = revealed_fraction(el, start.distance(end));
        if fraction <= MIN_REVEAL {
            return;
        }
        let p0 = context.matrix.apply(start);
        let p1 = context.matrix.apply(start.lerp(end, fraction));
        let width = el.number("stroke-width").unwrap_or(1.0) * context.matrix.mean_scale();
        let (dx, dy) = (p1.x - p0.x, p1.y - p0.y);
        let steps = (p0.distance(p1) * 2.0).ceil().max(1.0) as usize;

        if context.glow {
            let radius = (width / 2.0).max(0.5);
            let mut coverage: HashMap<(i64, i64), f64> = HashMap::new();
            for step in 0..=steps {
                let p = p0.lerp(p1, step as f64 / steps as f64);
                let reach = radius.ceil() as i64;
                let (px, py) = (p.x.floor() as i64, p.y.floor() as i64);
                for cy in py - reach..=py + reach {
                    for cx in px - reach..=px + reach {
                        let d = Point::new(cx as f64 + 0.5, cy as f64 + 0.5).distance(p);
                        if d <= radius + 0.5 {
                            let a = GLOW_ALPHA * context.opacity * (1.0 - d / (radius + 1.0));
                            let slot = coverage.entry((cx, cy)).or_insert(0.0);
                            *slot = slot.max(a);
                        }
                    }
                }
            }
            for ((cx, cy), a) in coverage {
                self.canvas.blend(cx, cy, stroke, a);
            }
            return;
        }

        let glyph = self.glyphs.stroke(dx, dy);
        let mut last = None;
        for step in 0..=steps {
            let p = p0.lerp(p1, step as f64 / steps as f64);
            let cell = (p.x.floor() as i64, p.y.floor() as i64);
            if last == Some(cell) {
                continue;
            }
            last = Some(cell);
            self.canvas.blend(cell.0, cell.1, stroke, CORE_TINT * context.opacity);
            self.canvas.put(cell.0, cell.1, glyph, stroke);
        }
    }
}

/// Share of a dashed line currently drawn. A `L L` dash pattern shifted by
/// `o` shows the first `L - o` units.
fn revealed_fraction(el: &Element, length: f64) -> f64 {
    if length <= 0.0 {
        return 0.0;
    }
    let Some(dash) = el
        .text("stroke-dasharray")
        .and_then(|d| d.split_whitespace().next())
        .and_then(|d| d.parse::<f64>().ok())
    else {
        return 1.0;
    };
    let offset = el.number("stroke-dashoffset").unwrap_or(0.0);
    ((dash - offset) / length).clamp(0.0, 1.0)
}

/// Cells whose centres fall in `[from, to)`, clipped to `0..limit`.
fn cell_span(from: f64, to: f64, limit: usize) -> std::ops::Range<i64> {
    let first = (from - 0.5).ceil().max(0.0) as i64;
    let last = ((to - 0.5).ceil().min(limit as f64)).max(0.0) as i64;
    first..last.max(first)
}

enum Paint {
    Solid(Rgb),
    Linear {
        from: Point,
        to: Point,
        stops: Vec<Stop>,
    },
    Radial {
        centre: Point,
        radius: f64,
        stops: Vec<Stop>,
    },
}

#[derive(Clone, Copy)]
struct Stop {
    offset: f64,
    color: Rgb,
    opacity: f64,
}

impl Paint {
    fn resolve(surface: &Surface, value: &str) -> Option<Paint> {
        if value.trim() == "none" {
            return None;
        }
        if !value.trim_start().starts_with("url(") {
            return Rgb::parse(value).ok().map(Paint::Solid);
        }
        let gradient = surface.get(surface.resolve_url(value)?)?;
        let stops = gradient_stops(surface, gradient);
        if stops.is_empty() {
            return None;
        }
        let n = |name: &str, default: f64| gradient.number(name).unwrap_or(default);
        match gradient.kind {
            ElementKind::LinearGradient => Some(Paint::Linear {
                from: Point::new(n("x1", 0.0), n("y1", 0.0)),
                to: Point::new(n("x2", 1.0), n("y2", 0.0)),
                stops,
            }),
            ElementKind::RadialGradient => Some(Paint::Radial {
                centre: Point::new(n("cx", 0.5), n("cy", 0.5)),
                radius: n("r", 0.5),
                stops,
            }),
            _ => None,
        }
    }

    /// Colour and opacity at bounding-box coordinates `(u, v)`.
    fn sample(&self, u: f64, v: f64) -> (Rgb, f64) {
        let p = Point::new(u, v);
        match self {
            Paint::Solid(color) => (*color, 1.0),
            Paint::Linear { from, to, stops } => {
                let axis = *to - *from;
                let len2 = axis.x * axis.x + axis.y * axis.y;
                let t = if len2 > 0.0 {
                    let rel = p - *from;
                    (rel.x * axis.x + rel.y * axis.y) / len2
                } else {
                    0.0
                };
                interpolate(stops, t)
            }
            Paint::Radial {
                centre,
                radius,
                stops,
            } => {
                let t = if *radius > 0.0 {
                    p.distance(*centre) / radius
                } else {
                    1.0
                };
                interpolate(stops, t)
            }
        }
    }
}

fn gradient_stops(surface: &Surface, gradient: &Element) -> Vec<Stop> {
    let mut stops: Vec<Stop> = gradient
        .children()
        .iter()
        .filter_map(|id| surface.get(*id))
        .filter(|el| el.kind == ElementKind::Stop)
        .filter_map(|el| {
            Some(Stop {
                offset: parse_offset(el.attrs.get("offset")?)?,
                color: Rgb::parse(el.text("stop-color")?).ok()?,
                opacity: el.number("stop-opacity").unwrap_or(1.0),
            })
        })
        .collect();
    stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
    stops
}

fn parse_offset(value: &AttrValue) -> Option<f64> {
    if let Some(text) = value.as_text()
        && let Some(percent) = text.trim().strip_suffix('%')
    {
        return percent.trim().parse::<f64>().ok().map(|p| p / 100.0);
    }
    value.as_number()
}

fn interpolate(stops: &[Stop], t: f64) -> (Rgb, f64) {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return (Rgb::BLACK, 0.0);
    };
    if t <= first.offset {
        return (first.color, first.opacity);
    }
    if t >= last.offset {
        return (last.color, last.opacity);
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let k = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
            return (a.color.lerp(b.color, k), a.opacity + (b.opacity - a.opacity) * k);
        }
    }
    (last.color, last.opacity)
}

#[cfg(test)]
mod tests;
