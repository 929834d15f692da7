//! Recursive lightning bolts and their stroke-reveal animation.
//!
//! A strike first grows a [`BoltTree`] from the root parameters, then
//! materializes every branch as a pair of lines (a wide blurred glow and a
//! thin core) hidden behind a full-length dash offset. [`BoltAnimation`]
//! shrinks the offsets frame by frame, removes each line once revealed and
//! finally removes the strike's groups and filters.

mod tree;

pub use tree::{BoltTree, BranchNode, BranchParams};

use crate::{
    error::{LandscapeError, Result},
    generate::Gen,
    scene::{
        animation::{Animation, AnimationStatus},
        filter::{DisplacementParams, TurbulenceParams, add_blur, create_distortion_filter, reseed},
        flash::SkyFlash,
    },
    surface::{ElementId, ElementKind, Rgb, Surface, Viewport, format_number},
};

/// Frames a segment needs to go from hidden to fully revealed.
const DECAY_STEPS: f64 = 7.0;
const OFFSET_EPSILON: f64 = 1e-6;
const GLOW_WIDTH_FACTOR: f64 = 3.0;
const TURBULENCE_FREQUENCY: f64 = 0.005;
const TURBULENCE_OCTAVES: u32 = 5;
const DISPLACEMENT_SCALE: f64 = 150.0;
const BLUR_STD_DEVIATION: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoltColors {
    pub inner: String,
    pub outer: String,
}

/// One rendered line of a bolt and its reveal progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchSegment {
    pub level: u32,
    pub offset: f64,
    pub updated_offset: f64,
    pub handle: Option<ElementId>,
}

#[derive(Debug)]
pub struct BoltStrike {
    pub animation: BoltAnimation,
    pub flash: SkyFlash,
}

/// Paints bolts onto a surface. Each strike gets its own filter pair so
/// overlapping strikes never share a seed.
#[derive(Debug, Clone)]
pub struct Bolt {
    colors: BoltColors,
    viewport: Viewport,
    seed: f64,
    strikes: u64,
}

impl Bolt {
    #[must_use]
    pub fn new(colors: BoltColors, viewport: Viewport) -> Self {
        Self {
            colors,
            viewport,
            seed: 0.0,
            strikes: 0,
        }
    }

    #[must_use]
    pub fn colors(&self) -> &BoltColors {
        &self.colors
    }

    /// Noise seed used by the most recent strike.
    #[must_use]
    pub fn seed(&self) -> f64 {
        self.seed
    }

    #[must_use]
    pub fn strikes(&self) -> u64 {
        self.strikes
    }

    pub fn paint(
        &mut self,
        surface: &mut Surface,
        position_x: f64,
        root: &BranchParams,
        levels: u32,
        color: &str,
        rng: &mut Gen,
    ) -> Result<BoltStrike> {
        root.validate()?;
        if levels == 0 {
            return Err(LandscapeError::InvalidParameter {
                name: "levels",
                value: 0.0,
                range: "[1, inf)",
            });
        }
        if !position_x.is_finite() {
            return Err(LandscapeError::InvalidParameter {
                name: "position_x",
                value: position_x,
                range: "finite",
            });
        }
        Rgb::parse(color)?;
        self.colors.outer = color.to_string();

        self.strikes += 1;
        let strike = self.strikes;
        let (distortion_id, blur_id) = (
            format!("ray-distortion-{strike}"),
            format!("ray-blur-{strike}"),
        );
        let filters = self.create_filters(surface, &distortion_id, &blur_id);
        self.seed = rng.random(10.0, 20.0, false);
        reseed(surface, &distortion_id, self.seed);
        reseed(surface, &blur_id, self.seed);

        let top = surface.root();
        let glow_root = surface.create(top, ElementKind::Group);
        surface.set(glow_root).attr("filter", format!("url(#{blur_id})"));
        let inner_root = surface.create(top, ElementKind::Group);
        surface
            .set(inner_root)
            .attr("filter", format!("url(#{distortion_id})"));

        let tree = BoltTree::grow(*root, levels, rng);
        let segments = self.materialize(surface, &tree, glow_root, inner_root);

        // Positioning replaces the root rotation.
        surface.translate(glow_root, position_x, 0.0);
        surface.translate(inner_root, position_x, 0.0);

        tracing::debug!(
            strike,
            position_x,
            levels,
            branches = tree.len(),
            seed = self.seed,
            "bolt painted"
        );

        let flash = SkyFlash::paint(surface, self.viewport, position_x, color, strike);
        Ok(BoltStrike {
            animation: BoltAnimation {
                levels,
                segments,
                roots: [glow_root, inner_root],
                filters,
            },
            flash,
        })
    }

    fn create_filters(
        &self,
        surface: &mut Surface,
        distortion_id: &str,
        blur_id: &str,
    ) -> [ElementId; 2] {
        let turbulence = TurbulenceParams::fractal(TURBULENCE_FREQUENCY, TURBULENCE_OCTAVES);
        let displacement = DisplacementParams::from_noise(DISPLACEMENT_SCALE);
        let distortion = create_distortion_filter(surface, distortion_id, &turbulence, &displacement);
        let blur = create_distortion_filter(surface, blur_id, &turbulence, &displacement);
        add_blur(surface, blur, &displacement.result, BLUR_STD_DEVIATION);
        [distortion, blur]
    }

    fn materialize(
        &self,
        surface: &mut Surface,
        tree: &BoltTree,
        glow_root: ElementId,
        inner_root: ElementId,
    ) -> Vec<BranchSegment> {
        let mut groups: Vec<(ElementId, ElementId)> = Vec::with_capacity(tree.len());
        let mut segments = Vec::with_capacity(tree.len() * 2);
        for node in tree.nodes() {
            let (glow, inner) = match node.parent.and_then(|parent| groups.get(parent).copied()) {
                Some((parent_glow, parent_inner)) => {
                    let glow = surface.create(parent_glow, ElementKind::Group);
                    let inner = surface.create(parent_inner, ElementKind::Group);
                    let start = node.params.start_point;
                    surface.rotate(glow, node.params.rotation, start.x, start.y);
                    surface.rotate(inner, node.params.rotation, start.x, start.y);
                    (glow, inner)
                }
                None => (glow_root, inner_root),
            };
            groups.push((glow, inner));

            let params = &node.params;
            for (group, width, stroke) in [
                (glow, GLOW_WIDTH_FACTOR * params.width, self.colors.outer.as_str()),
                (inner, params.width, self.colors.inner.as_str()),
            ] {
                let line = hidden_line(surface, group, params, width, stroke);
                segments.push(BranchSegment {
                    level: node.level,
                    offset: params.length,
                    updated_offset: params.length,
                    handle: Some(line),
                });
            }
        }
        segments
    }
}

fn hidden_line(
    surface: &mut Surface,
    group: ElementId,
    params: &BranchParams,
    width: f64,
    stroke: &str,
) -> ElementId {
    let start = params.start_point;
    let length = params.length;
    let line = surface.create(group, ElementKind::Line);
    surface
        .set(line)
        .attr("x1", start.x)
        .attr("y1", start.y)
        .attr("x2", start.x)
        .attr("y2", start.y + length)
        .attr("fill", "none")
        .attr("stroke-width", width)
        .attr("stroke", stroke)
        .attr(
            "stroke-dasharray",
            format!("{0} {0}", format_number(length)),
        )
        .attr("stroke-dashoffset", length);
    line
}

/// Reveal-then-remove animation of one strike.
#[derive(Debug, Clone)]
pub struct BoltAnimation {
    levels: u32,
    segments: Vec<BranchSegment>,
    roots: [ElementId; 2],
    filters: [ElementId; 2],
}

impl BoltAnimation {
    #[must_use]
    pub fn segments(&self) -> &[BranchSegment] {
        &self.segments
    }

    /// Glow root group first, then the core root group.
    #[must_use]
    pub fn roots(&self) -> [ElementId; 2] {
        self.roots
    }

    #[must_use]
    pub fn filters(&self) -> [ElementId; 2] {
        self.filters
    }

    fn step_segment(segment: &mut BranchSegment, surface: &mut Surface) {
        let Some(handle) = segment.handle else {
            return;
        };
        if segment.updated_offset > 0.0 {
            let next = segment.updated_offset - segment.offset / DECAY_STEPS;
            segment.updated_offset = if next < OFFSET_EPSILON { 0.0 } else { next };
            surface
                .set(handle)
                .attr("stroke-dashoffset", segment.updated_offset);
        } else {
            surface.remove(handle);
            segment.handle = None;
        }
    }
}

impl Animation for BoltAnimation {
    fn tick(&mut self, surface: &mut Surface) -> AnimationStatus {
        for level in (1..=self.levels).rev() {
            for segment in self.segments.iter_mut().filter(|s| s.level == level) {
                Self::step_segment(segment, surface);
            }
        }
        if self.segments.iter().any(|segment| segment.handle.is_some()) {
            return AnimationStatus::Running;
        }
        for id in self.roots.into_iter().chain(self.filters) {
            surface.remove(id);
        }
        tracing::trace!("bolt animation finished");
        AnimationStatus::Finished
    }
}
