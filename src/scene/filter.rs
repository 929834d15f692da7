use crate::surface::{ElementId, ElementKind, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseKind {
    FractalNoise,
    Turbulence,
}

impl NoiseKind {
    fn as_str(self) -> &'static str {
        match self {
            NoiseKind::FractalNoise => "fractalNoise",
            NoiseKind::Turbulence => "turbulence",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurbulenceParams {
    pub base_frequency: f64,
    pub num_octaves: u32,
    pub stitch_tiles: bool,
    pub noise: NoiseKind,
    pub result: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplacementParams {
    pub input: String,
    pub input2: String,
    pub scale: f64,
    pub result: String,
}

impl TurbulenceParams {
    #[must_use]
    pub fn fractal(base_frequency: f64, num_octaves: u32) -> Self {
        Self {
            base_frequency,
            num_octaves,
            stitch_tiles: true,
            noise: NoiseKind::FractalNoise,
            result: "noise".to_string(),
        }
    }
}

impl DisplacementParams {
    #[must_use]
    pub fn from_noise(scale: f64) -> Self {
        Self {
            input: "SourceGraphic".to_string(),
            input2: "noise".to_string(),
            scale,
            result: "ray".to_string(),
        }
    }
}

#[must_use]
pub fn turbulence_id(filter_id: &str) -> String {
    format!("turbulence-{filter_id}")
}

/// Declares `<filter id>` with a turbulence node (`turbulence-<id>`) and a displacement map.
pub fn create_distortion_filter(
    surface: &mut Surface,
    id: &str,
    turbulence: &TurbulenceParams,
    displacement: &DisplacementParams,
) -> ElementId {
    let filter = surface.create_filter(id);

    let noise = surface.create(filter, ElementKind::FeTurbulence);
    surface
        .set(noise)
        .attr("baseFrequency", turbulence.base_frequency)
        .attr("numOctaves", turbulence.num_octaves)
        .attr(
            "stitchTiles",
            if turbulence.stitch_tiles {
                "stitch"
            } else {
                "noStitch"
            },
        )
        .attr("type", turbulence.noise.as_str())
        .attr("result", turbulence.result.as_str())
        .attr("id", turbulence_id(id));

    let displace = surface.create(filter, ElementKind::FeDisplacementMap);
    surface
        .set(displace)
        .attr("in", displacement.input.as_str())
        .attr("in2", displacement.input2.as_str())
        .attr("scale", displacement.scale)
        .attr("result", displacement.result.as_str());

    filter
}

/// Appends a blur over the displaced output.
pub fn add_blur(surface: &mut Surface, filter: ElementId, input: &str, std_deviation: f64) {
    let blur = surface.create(filter, ElementKind::FeGaussianBlur);
    surface
        .set(blur)
        .attr("in", input)
        .attr("stdDeviation", std_deviation);
}

/// Rewrites the noise seed of an existing filter. Returns `false` when the filter is gone.
pub fn reseed(surface: &mut Surface, filter_id: &str, seed: f64) -> bool {
    match surface.find_by_dom_id(&turbulence_id(filter_id)) {
        Some(node) => {
            surface.set(node).attr("seed", seed);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Viewport, to_svg};

    fn surface() -> Surface {
        Surface::new(Viewport::new(10.0, 10.0)).expect("surface")
    }

    #[test]
    fn declares_turbulence_and_displacement() {
        let mut s = surface();
        create_distortion_filter(
            &mut s,
            "ray-distortion",
            &TurbulenceParams::fractal(0.005, 5),
            &DisplacementParams::from_noise(150.0),
        );

        insta::assert_snapshot!(to_svg(&s), @r#"
        <svg xmlns="http://www.w3.org/2000/svg" height="10" id="svgBox" viewBox="0 0 10 10" width="10" x="0" y="0">
          <filter id="ray-distortion">
            <feTurbulence baseFrequency="0.005" id="turbulence-ray-distortion" numOctaves="5" result="noise" stitchTiles="stitch" type="fractalNoise"/>
            <feDisplacementMap in="SourceGraphic" in2="noise" result="ray" scale="150"/>
          </filter>
        </svg>
        "#);
    }

    #[test]
    fn reseed_targets_turbulence_node() {
        let mut s = surface();
        create_distortion_filter(
            &mut s,
            "mountain-distortion-far",
            &TurbulenceParams::fractal(0.005, 3),
            &DisplacementParams::from_noise(60.0),
        );
        assert!(reseed(&mut s, "mountain-distortion-far", 14.0));
        let node = s
            .find_by_dom_id("turbulence-mountain-distortion-far")
            .expect("turbulence node");
        assert_eq!(s.get(node).and_then(|el| el.number("seed")), Some(14.0));
    }

    #[test]
    fn reseed_on_missing_filter_reports_false() {
        let mut s = surface();
        assert!(!reseed(&mut s, "nope", 1.0));
    }

    #[test]
    fn blur_is_appended_last() {
        let mut s = surface();
        let filter = create_distortion_filter(
            &mut s,
            "ray-blur",
            &TurbulenceParams::fractal(0.005, 5),
            &DisplacementParams::from_noise(150.0),
        );
        add_blur(&mut s, filter, "ray", 10.0);
        let children = s.get(filter).expect("filter").children().to_vec();
        assert_eq!(children.len(), 3);
        assert_eq!(
            s.get(children[2]).map(|el| el.kind),
            Some(ElementKind::FeGaussianBlur)
        );
    }
}
