use std::fmt;

use crate::{
    config::LandscapeConfig,
    error::Result,
    generate::Gen,
    scene::{
        animation::{Animation, FrameDriver},
        bolt::{Bolt, BoltColors, BoltStrike, BranchParams},
        mountains::{ParallaxLayer, paint_mountains},
        sky::{SkyColors, paint_sky, paint_stars},
    },
    surface::{Affine, Point, Surface, Viewport},
};

type LeaveCallback = Box<dyn FnMut() + Send>;

/// Owns the surface and everything painted on it.
pub struct Landscape {
    surface: Surface,
    config: LandscapeConfig,
    rng: Gen,
    bolt: Bolt,
    layers: Vec<ParallaxLayer>,
    driver: FrameDriver,
    on_pointer_leave: Option<LeaveCallback>,
}

impl fmt::Debug for Landscape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Landscape")
            .field("viewport", &self.surface.viewport())
            .field("layers", &self.layers.len())
            .field("active_animations", &self.driver.len())
            .field("strikes", &self.bolt.strikes())
            .finish_non_exhaustive()
    }
}

impl Landscape {
    /// Builds the surface and paints the static scenery. Fails when the
    /// viewport has no area or the config does not validate.
    pub fn new(config: LandscapeConfig, viewport: Viewport, mut rng: Gen) -> Result<Self> {
        config.validate()?;
        let mut surface = Surface::new(viewport)?;

        if config.should_paint.sky {
            paint_sky(
                &mut surface,
                viewport,
                &SkyColors {
                    gradient_start: config.colors.sky_gradient_start.clone(),
                    gradient_end: config.colors.sky_gradient_end.clone(),
                },
            );
        }
        if config.should_paint.stars {
            paint_stars(&mut surface, viewport, config.star_count, &mut rng);
        }

        let layers = if config.should_paint.mountains {
            config
                .mountains
                .iter()
                .map(|preset| {
                    paint_mountains(
                        &mut surface,
                        viewport,
                        &preset.resolve(viewport),
                        &preset.id,
                        &mut rng,
                    )
                })
                .collect()
        } else {
            Vec::new()
        };

        let bolt = Bolt::new(
            BoltColors {
                inner: config.colors.bolt_inner.clone(),
                outer: config.colors.bolt_glow.clone(),
            },
            viewport,
        );

        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            layers = layers.len(),
            elements = surface.live_count(),
            "landscape painted"
        );

        Ok(Self {
            surface,
            config,
            rng,
            bolt,
            layers,
            driver: FrameDriver::new(),
            on_pointer_leave: None,
        })
    }

    #[must_use]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.surface.viewport()
    }

    #[must_use]
    pub fn config(&self) -> &LandscapeConfig {
        &self.config
    }

    #[must_use]
    pub fn bolt(&self) -> &Bolt {
        &self.bolt
    }

    #[must_use]
    pub fn layers(&self) -> &[ParallaxLayer] {
        &self.layers
    }

    /// Bolt and flash animations still running.
    #[must_use]
    pub fn active_animations(&self) -> usize {
        self.driver.len()
    }

    /// Updates the surface-to-screen mapping after the host resized.
    pub fn set_screen_transform(&mut self, ctm: Affine) {
        self.surface.set_screen_transform(ctm);
    }

    pub fn on_pointer_leave(&mut self, callback: impl FnMut() + Send + 'static) {
        self.on_pointer_leave = Some(Box::new(callback));
    }

    pub fn pointer_leave(&mut self) {
        if let Some(callback) = self.on_pointer_leave.as_mut() {
            callback();
        }
    }

    /// Strikes at the pointer's surface-local x. Returns the local point.
    pub fn pointer_down(&mut self, screen: Point, color: &str) -> Result<Point> {
        let local = self.surface.screen_to_local(screen);
        tracing::debug!(
            screen_x = screen.x,
            screen_y = screen.y,
            local_x = local.x,
            "pointer down"
        );
        self.strike(local.x, color)?;
        Ok(local)
    }

    /// Samples root parameters from the configured ranges.
    pub fn random_branch_params(&mut self) -> BranchParams {
        let strike = &self.config.strike;
        let rotation = self.rng.random_range(strike.rotation);
        let segments = self
            .rng
            .random(strike.segments.min, strike.segments.max, true) as u32;
        let sub_branches_length = self.rng.random_range(strike.sub_branches_length);
        BranchParams {
            start_point: Point::new(0.0, 0.0),
            length: self.surface.viewport().height,
            angle: 0.0,
            rotation,
            segments,
            sub_branches_length,
            width: strike.width,
            width_reduction_rate: strike.width_reduction_rate,
        }
    }

    pub fn strike(&mut self, x: f64, color: &str) -> Result<()> {
        let params = self.random_branch_params();
        self.strike_with(x, &params, color)
    }

    pub fn strike_with(&mut self, x: f64, params: &BranchParams, color: &str) -> Result<()> {
        let BoltStrike { animation, flash } = self.bolt.paint(
            &mut self.surface,
            x,
            params,
            self.config.strike.levels,
            color,
            &mut self.rng,
        )?;
        self.driver.push(animation);
        self.driver.push(flash);
        Ok(())
    }

    /// Advances every mountain layer and running animation by one frame.
    pub fn tick(&mut self) {
        for layer in &mut self.layers {
            layer.tick(&mut self.surface);
        }
        let finished = self.driver.tick(&mut self.surface);
        if finished > 0 {
            tracing::trace!(finished, remaining = self.driver.len(), "animations done");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::{
        config::ShouldPaint,
        error::LandscapeError,
        surface::ElementKind,
    };

    fn landscape(config: LandscapeConfig) -> Landscape {
        Landscape::new(config, Viewport::new(1280.0, 720.0), Gen::seeded(21)).expect("landscape")
    }

    #[test]
    fn empty_viewport_is_missing_surface() {
        let err = Landscape::new(
            LandscapeConfig::default(),
            Viewport::new(0.0, 720.0),
            Gen::seeded(1),
        )
        .expect_err("no area");
        assert!(matches!(err, LandscapeError::MissingSurface { .. }));
    }

    #[test]
    fn default_scene_has_sky_stars_and_three_ranges() {
        let scene = landscape(LandscapeConfig::default());
        let surface = scene.surface();
        assert!(surface.find_by_dom_id("skyGradient").is_some());
        assert_eq!(surface.count_kind(ElementKind::Circle), 100);
        assert_eq!(surface.count_kind(ElementKind::Path), 6);
        let ids: Vec<_> = scene.layers().iter().map(ParallaxLayer::id).collect();
        assert_eq!(ids, ["far-mountains", "mid-mountains", "near-mountains"]);
    }

    #[test]
    fn nothing_painted_when_all_flags_off() {
        let config = LandscapeConfig {
            should_paint: ShouldPaint {
                sky: false,
                stars: false,
                mountains: false,
            },
            ..LandscapeConfig::default()
        };
        let scene = landscape(config);
        assert_eq!(scene.surface().live_count(), 1);
        assert!(scene.layers().is_empty());
    }

    #[test]
    fn pointer_down_uses_inverse_screen_transform() {
        let mut scene = landscape(LandscapeConfig::default());
        scene.set_screen_transform(Affine::scale(0.125, 0.0625));
        let local = scene
            .pointer_down(Point::new(10.5, 3.5), "#44ff44")
            .expect("strike");
        assert_eq!(local, Point::new(84.0, 56.0));
        assert_eq!(scene.active_animations(), 2);
        assert_eq!(scene.bolt().colors().outer, "#44ff44");
    }

    #[test]
    fn pointer_leave_runs_callback() {
        let mut scene = landscape(LandscapeConfig::default());
        scene.pointer_leave();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        scene.on_pointer_leave(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        scene.pointer_leave();
        scene.pointer_leave();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn sampled_params_respect_ranges() {
        let mut scene = landscape(LandscapeConfig::default());
        for _ in 0..200 {
            let params = scene.random_branch_params();
            assert!((20.0..30.0).contains(&params.rotation));
            assert!((3..=6).contains(&params.segments));
            assert!((0.4..0.6).contains(&params.sub_branches_length));
            assert_eq!(params.length, 720.0);
            assert_eq!(params.width, 6.0);
            assert!(params.validate().is_ok());
        }
    }

    #[test]
    fn strike_animations_drain_while_mountains_keep_scrolling() {
        let mut scene = landscape(LandscapeConfig::default());
        let baseline = scene.surface().live_count();
        scene.strike(640.0, "#4444ff").expect("strike");
        assert!(scene.surface().live_count() > baseline);

        for _ in 0..40 {
            scene.tick();
        }
        assert_eq!(scene.active_animations(), 0);
        assert_eq!(scene.surface().live_count(), baseline);
        assert!((scene.layers()[0].state().even_x + 40.0 * 0.05).abs() < 1e-9);
    }
}
