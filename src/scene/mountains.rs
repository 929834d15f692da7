use std::f64::consts::TAU;

use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};
use serde::{Deserialize, Serialize};

use crate::{
    error::{LandscapeError, Result, ensure_non_negative},
    generate::Gen,
    scene::{
        animation::{Animation, AnimationStatus},
        filter::{DisplacementParams, TurbulenceParams, create_distortion_filter},
    },
    surface::{ElementId, ElementKind, PathData, Point, Rgb, Surface, Viewport, curve_through},
};

/// Filler rects start slightly below the valley so displaced edges leave no gap.
const FILLER_OVERLAP: f64 = 1.01;
const NOISE_RADIUS: f32 = 1.0;
const JAG_RATIO: f64 = 0.08;
const MAX_PEAKS: u32 = 512;
const MAX_SEGMENTS: u32 = 8_192;

/// How a layer's outline is generated. The two strategies read different fields:
/// peak/valley ignores `segments`, the height field samples `segments + 1` points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Silhouette {
    #[default]
    PeakValley,
    HeightField,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MountainLayer {
    pub number_of_peaks: u32,
    pub distance_between_valley_peak: f64,
    pub color: String,
    #[serde(default)]
    pub valley_y_position: Option<f64>,
    pub speed: f64,
    #[serde(default = "default_segments")]
    pub segments: u32,
    #[serde(default)]
    pub silhouette: Silhouette,
}

fn default_segments() -> u32 {
    100
}

/// A configured layer whose valley sits `valley_inset` above the canvas bottom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerPreset {
    pub id: String,
    pub valley_inset: f64,
    #[serde(flatten)]
    pub layer: MountainLayer,
}

impl LayerPreset {
    /// The layer with its valley resolved against the canvas height, unless pinned explicitly.
    #[must_use]
    pub fn resolve(&self, viewport: Viewport) -> MountainLayer {
        let mut layer = self.layer.clone();
        if layer.valley_y_position.is_none() {
            layer.valley_y_position = Some(viewport.height - self.valley_inset);
        }
        layer
    }
}

impl MountainLayer {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_PEAKS).contains(&self.number_of_peaks) {
            return Err(LandscapeError::InvalidParameter {
                name: "number_of_peaks",
                value: f64::from(self.number_of_peaks),
                range: "[1, 512]",
            });
        }
        ensure_non_negative(
            "distance_between_valley_peak",
            self.distance_between_valley_peak,
        )?;
        ensure_non_negative("speed", self.speed)?;
        if let Some(valley) = self.valley_y_position
            && !valley.is_finite()
        {
            return Err(LandscapeError::InvalidParameter {
                name: "valley_y_position",
                value: valley,
                range: "finite",
            });
        }
        if self.segments > MAX_SEGMENTS
            || (self.silhouette == Silhouette::HeightField && self.segments < 2)
        {
            return Err(LandscapeError::InvalidParameter {
                name: "segments",
                value: f64::from(self.segments),
                range: "[2, 8192]",
            });
        }
        Rgb::parse(&self.color).map(|_| ())
    }
}

/// Horizontal offsets of the two tiled copies of a layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    pub even_x: f64,
    pub odd_x: f64,
}

impl ScrollState {
    #[must_use]
    pub fn new(width: f64) -> Self {
        Self {
            even_x: 0.0,
            odd_x: width,
        }
    }

    /// Moves both copies left; a copy a full width off-screen jumps behind its sibling.
    pub fn advance(&mut self, speed: f64, width: f64) {
        self.even_x -= speed;
        self.odd_x -= speed;
        if self.even_x <= -width {
            self.even_x = self.odd_x + width;
        }
        if self.odd_x <= -width {
            self.odd_x = self.even_x + width;
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParallaxLayer {
    id: String,
    even: ElementId,
    odd: ElementId,
    state: ScrollState,
    speed: f64,
    width: f64,
}

impl ParallaxLayer {
    pub fn advance(&mut self, surface: &mut Surface) {
        self.state.advance(self.speed, self.width);
        surface.translate(self.even, self.state.even_x, 0.0);
        surface.translate(self.odd, self.state.odd_x, 0.0);
    }

    #[must_use]
    pub fn state(&self) -> ScrollState {
        self.state
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn copies(&self) -> [ElementId; 2] {
        [self.even, self.odd]
    }
}

impl Animation for ParallaxLayer {
    fn tick(&mut self, surface: &mut Surface) -> AnimationStatus {
        self.advance(surface);
        AnimationStatus::Running
    }
}

/// Paints two identical copies of a layer side by side and returns their scroller.
pub fn paint_mountains(
    surface: &mut Surface,
    viewport: Viewport,
    layer: &MountainLayer,
    layer_id: &str,
    rng: &mut Gen,
) -> ParallaxLayer {
    let valley_y = layer.valley_y_position.unwrap_or(viewport.height);
    let (outline, filter_url) = match layer.silhouette {
        Silhouette::PeakValley => {
            let filter_id = format!("mountain-distortion-{layer_id}");
            create_distortion_filter(
                surface,
                &filter_id,
                &TurbulenceParams::fractal(0.005, rng.random(2.0, 5.0, true) as u32),
                &DisplacementParams::from_noise(rng.random(50.0, 100.0, false)),
            );
            let points = peak_valley_points(layer, valley_y, viewport.width);
            (
                close_to_bottom(curve_through(&points, 1.0), &points, viewport.height),
                Some(format!("url(#{filter_id})")),
            )
        }
        Silhouette::HeightField => {
            let seed = rng.random(0.0, 1_000_000.0, true) as i32;
            let points = height_field_points(layer, valley_y, viewport.width, seed);
            (polygon_to_bottom(&points, viewport.height), None)
        }
    };

    let even = create_mountain(surface, viewport, layer, valley_y, &outline, filter_url.as_deref());
    let odd = create_mountain(surface, viewport, layer, valley_y, &outline, filter_url.as_deref());
    let state = ScrollState::new(viewport.width);
    surface.translate(even, state.even_x, 0.0);
    surface.translate(odd, state.odd_x, 0.0);

    tracing::debug!(
        layer = layer_id,
        silhouette = ?layer.silhouette,
        valley_y,
        speed = layer.speed,
        "painted mountain layer"
    );

    ParallaxLayer {
        id: layer_id.to_string(),
        even,
        odd,
        state,
        speed: layer.speed,
        width: viewport.width,
    }
}

fn create_mountain(
    surface: &mut Surface,
    viewport: Viewport,
    layer: &MountainLayer,
    valley_y: f64,
    outline: &PathData,
    filter_url: Option<&str>,
) -> ElementId {
    let root = surface.root();
    let group = surface.create(root, ElementKind::Group);
    let shape = surface.create(group, ElementKind::Path);
    surface
        .set(shape)
        .attr("d", outline.clone())
        .attr("fill", layer.color.as_str())
        .attr("stroke", "none");
    if let Some(url) = filter_url {
        surface.set(shape).attr("filter", url);
    }

    if layer.silhouette == Silhouette::PeakValley {
        let filler = surface.create(group, ElementKind::Rect);
        surface
            .set(filler)
            .attr("x", 0.0)
            .attr("y", valley_y * FILLER_OVERLAP)
            .attr("width", viewport.width)
            .attr("height", (viewport.height - valley_y).max(0.0))
            .attr("fill", layer.color.as_str());
    }
    group
}

/// `2 * peaks + 1` points alternating valley and peak, evenly spread over `width`.
#[must_use]
pub fn peak_valley_points(layer: &MountainLayer, valley_y: f64, width: f64) -> Vec<Point> {
    let count = 2 * layer.number_of_peaks as usize + 1;
    let peak_y = valley_y - layer.distance_between_valley_peak;
    let step = width / (f64::from(layer.number_of_peaks) * 2.0);
    (0..count)
        .map(|i| {
            let y = if i % 2 == 1 { peak_y } else { valley_y };
            Point::new(step * i as f64, y)
        })
        .collect()
}

/// Sinusoidal ridges modulated by fBm noise plus a small high-frequency jag.
///
/// Noise is sampled on a circle so the first and last samples coincide and
/// the two tiled copies join without a seam.
#[must_use]
pub fn height_field_points(
    layer: &MountainLayer,
    valley_y: f64,
    width: f64,
    seed: i32,
) -> Vec<Point> {
    let mut broad = FastNoiseLite::with_seed(seed);
    broad.set_noise_type(Some(NoiseType::OpenSimplex2));
    broad.set_frequency(Some(1.5));
    broad.set_fractal_type(Some(FractalType::FBm));
    broad.set_fractal_octaves(Some(3));

    let mut jagged = FastNoiseLite::with_seed(seed.wrapping_add(9999));
    jagged.set_noise_type(Some(NoiseType::OpenSimplex2));
    jagged.set_frequency(Some(12.0));

    let segments = layer.segments.max(1);
    let period = width / f64::from(layer.number_of_peaks.max(1));
    let amplitude = layer.distance_between_valley_peak;
    (0..=segments)
        .map(|i| {
            let x = width * f64::from(i) / f64::from(segments);
            let theta = TAU * x / width;
            let (nx, ny) = (
                theta.cos() as f32 * NOISE_RADIUS,
                theta.sin() as f32 * NOISE_RADIUS,
            );
            let ridge = 0.75 + 0.25 * f64::from(broad.get_noise_2d(nx, ny));
            let jag = f64::from(jagged.get_noise_2d(nx, ny));
            let wave = 0.5 - 0.5 * (TAU * x / period).cos();
            let y = valley_y - amplitude * wave * ridge - amplitude * JAG_RATIO * jag;
            Point::new(x, y)
        })
        .collect()
}

fn close_to_bottom(mut path: PathData, points: &[Point], drop: f64) -> PathData {
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        path.line_to(Point::new(last.x, last.y + drop))
            .line_to(Point::new(first.x, first.y + drop))
            .close();
    }
    path
}

fn polygon_to_bottom(points: &[Point], drop: f64) -> PathData {
    let mut path = PathData::new();
    let Some(first) = points.first() else {
        return path;
    };
    path.move_to(*first);
    for p in &points[1..] {
        path.line_to(*p);
    }
    close_to_bottom(path, points, drop)
}
