use crate::{
    scene::{
        animation::{Animation, AnimationStatus},
        sky::add_stop,
    },
    surface::{ElementId, ElementKind, Surface, Viewport},
};

const START_OPACITY: f64 = 0.6;
const OPACITY_STEP: f64 = 0.02;
const OPACITY_EPSILON: f64 = 1e-9;

/// Radial glow lighting the sky above a strike, fading out over ~30 frames.
#[derive(Debug, Clone)]
pub struct SkyFlash {
    gradient: ElementId,
    rect: ElementId,
    opacity: f64,
}

impl SkyFlash {
    /// Paints `radialGradient#sky-light-<strike>` and the full-viewport rect it fills.
    pub fn paint(
        surface: &mut Surface,
        viewport: Viewport,
        position_x: f64,
        color: &str,
        strike: u64,
    ) -> Self {
        let root = surface.root();
        let gradient_id = format!("sky-light-{strike}");
        let gradient = surface.create(root, ElementKind::RadialGradient);
        surface
            .set(gradient)
            .attr("id", gradient_id.as_str())
            .attr("cx", position_x / viewport.width)
            .attr("cy", 0.0)
            .attr("r", 2.0);
        add_stop(surface, gradient, "10%", color, 0.4);
        add_stop(surface, gradient, "50%", color, 0.05);

        let rect = surface.create(root, ElementKind::Rect);
        surface
            .set(rect)
            .attr("x", 0.0)
            .attr("y", 0.0)
            .attr("width", viewport.width)
            .attr("height", viewport.height)
            .attr("fill", format!("url(#{gradient_id})"))
            .attr("fill-opacity", START_OPACITY);

        Self {
            gradient,
            rect,
            opacity: START_OPACITY,
        }
    }

    #[must_use]
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    #[must_use]
    pub fn rect(&self) -> ElementId {
        self.rect
    }
}

impl Animation for SkyFlash {
    fn tick(&mut self, surface: &mut Surface) -> AnimationStatus {
        if self.opacity > 0.0 {
            let next = self.opacity - OPACITY_STEP;
            self.opacity = if next < OPACITY_EPSILON { 0.0 } else { next };
            surface.set(self.rect).attr("fill-opacity", self.opacity);
            AnimationStatus::Running
        } else {
            surface.remove(self.gradient);
            surface.remove(self.rect);
            AnimationStatus::Finished
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fades_then_removes_both_elements() {
        let viewport = Viewport::new(200.0, 100.0);
        let mut surface = Surface::new(viewport).expect("surface");
        let mut flash = SkyFlash::paint(&mut surface, viewport, 50.0, "#4444ff", 1);

        let gradient = surface.find_by_dom_id("sky-light-1").expect("gradient");
        assert_eq!(
            surface.get(gradient).and_then(|el| el.number("cx")),
            Some(0.25)
        );

        let mut ticks = 0;
        while flash.tick(&mut surface) == AnimationStatus::Running {
            ticks += 1;
            assert!(ticks < 100, "flash never finished");
        }
        assert_eq!(ticks, 30);
        assert!(!surface.contains(gradient));
        assert!(!surface.contains(flash.rect()));
        assert_eq!(surface.live_count(), 1);
    }

    #[test]
    fn opacity_never_goes_negative() {
        let viewport = Viewport::new(10.0, 10.0);
        let mut surface = Surface::new(viewport).expect("surface");
        let mut flash = SkyFlash::paint(&mut surface, viewport, 0.0, "white", 7);
        let mut last = flash.opacity();
        while flash.tick(&mut surface) == AnimationStatus::Running {
            assert!(flash.opacity() >= 0.0);
            assert!(flash.opacity() <= last);
            last = flash.opacity();
        }
    }
}
