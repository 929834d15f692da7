use crate::{
    generate::Gen,
    surface::{ElementId, ElementKind, Surface, Viewport},
};

pub const SKY_GRADIENT_ID: &str = "skyGradient";

#[derive(Debug, Clone, PartialEq)]
pub struct SkyColors {
    pub gradient_start: String,
    pub gradient_end: String,
}

/// Full-viewport rect filled with a vertical two-stop gradient.
pub fn paint_sky(surface: &mut Surface, viewport: Viewport, colors: &SkyColors) -> ElementId {
    let root = surface.root();
    let gradient = surface.create(root, ElementKind::LinearGradient);
    surface
        .set(gradient)
        .attr("id", SKY_GRADIENT_ID)
        .attr("x1", 0.0)
        .attr("y1", 0.0)
        .attr("x2", 0.0)
        .attr("y2", 1.0);
    add_stop(surface, gradient, "0%", &colors.gradient_start, 1.0);
    add_stop(surface, gradient, "50%", &colors.gradient_end, 1.0);

    let rect = surface.create(root, ElementKind::Rect);
    surface
        .set(rect)
        .attr("x", 0.0)
        .attr("y", 0.0)
        .attr("width", viewport.width)
        .attr("height", viewport.height)
        .attr("fill", format!("url(#{SKY_GRADIENT_ID})"));
    rect
}

pub(crate) fn add_stop(
    surface: &mut Surface,
    gradient: ElementId,
    offset: &str,
    color: &str,
    opacity: f64,
) {
    let stop = surface.create(gradient, ElementKind::Stop);
    surface
        .set(stop)
        .attr("offset", offset)
        .attr("stop-color", color)
        .attr("stop-opacity", opacity);
}

/// Scatters `count` static white dots with random position, radius and opacity.
pub fn paint_stars(surface: &mut Surface, viewport: Viewport, count: usize, rng: &mut Gen) {
    let root = surface.root();
    for _ in 0..count {
        let star = surface.create(root, ElementKind::Circle);
        let cx = rng.random(0.0, viewport.width, false);
        let cy = rng.random(0.0, viewport.height, false);
        let r = rng.random(0.5, 1.5, false);
        let opacity = rng.random(0.1, 0.8, false);
        surface
            .set(star)
            .attr("cx", cx)
            .attr("cy", cy)
            .attr("r", r)
            .attr("fill", "white")
            .attr("opacity", opacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> (Surface, Viewport) {
        let viewport = Viewport::new(320.0, 180.0);
        (Surface::new(viewport).expect("surface"), viewport)
    }

    #[test]
    fn sky_rect_references_gradient() {
        let (mut s, viewport) = surface();
        let rect = paint_sky(
            &mut s,
            viewport,
            &SkyColors {
                gradient_start: "#000011".to_string(),
                gradient_end: "#222244".to_string(),
            },
        );
        let fill = s.get(rect).and_then(|el| el.text("fill")).expect("fill");
        let gradient = s.resolve_url(fill).expect("gradient");
        let stops = s.get(gradient).expect("gradient").children().to_vec();
        assert_eq!(stops.len(), 2);
        assert_eq!(
            s.get(stops[1]).and_then(|el| el.text("stop-color")),
            Some("#222244")
        );
        assert_eq!(s.get(rect).and_then(|el| el.number("height")), Some(180.0));
    }

    #[test]
    fn stars_stay_inside_viewport_ranges() {
        let (mut s, viewport) = surface();
        let mut rng = Gen::seeded(5);
        paint_stars(&mut s, viewport, 250, &mut rng);
        assert_eq!(s.count_kind(ElementKind::Circle), 250);

        let root = s.get(s.root()).expect("root");
        for id in root.children() {
            let star = s.get(*id).expect("star");
            let cx = star.number("cx").expect("cx");
            let cy = star.number("cy").expect("cy");
            let r = star.number("r").expect("r");
            let opacity = star.number("opacity").expect("opacity");
            assert!((0.0..320.0).contains(&cx));
            assert!((0.0..180.0).contains(&cy));
            assert!((0.5..1.5).contains(&r));
            assert!((0.1..0.8).contains(&opacity));
        }
    }

    #[test]
    fn zero_stars_paints_nothing() {
        let (mut s, viewport) = surface();
        paint_stars(&mut s, viewport, 0, &mut Gen::seeded(1));
        assert_eq!(s.count_kind(ElementKind::Circle), 0);
    }
}
