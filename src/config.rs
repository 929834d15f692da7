use std::{fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    cli::Cli,
    error::{LandscapeError, Result, ensure_non_negative, ensure_open_range, ensure_positive},
    scene::mountains::{LayerPreset, MountainLayer, Silhouette},
    surface::Rgb,
};

const MAX_STARS: usize = 5_000;
const MAX_LEVELS: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn validate(self, name: &'static str) -> Result<()> {
        if self.min.is_finite() && self.max.is_finite() && self.min <= self.max {
            Ok(())
        } else {
            Err(LandscapeError::InvalidParameter {
                name,
                value: self.min,
                range: "min <= max",
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandscapeColors {
    pub sky_gradient_start: String,
    pub sky_gradient_end: String,
    pub bolt_inner: String,
    pub bolt_glow: String,
}

impl Default for LandscapeColors {
    fn default() -> Self {
        Self {
            sky_gradient_start: "#03031a".to_string(),
            sky_gradient_end: "#24244f".to_string(),
            bolt_inner: "#ffffff".to_string(),
            bolt_glow: crate::app::state::BOLT_PALETTE[0].to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShouldPaint {
    pub sky: bool,
    pub stars: bool,
    pub mountains: bool,
}

impl Default for ShouldPaint {
    fn default() -> Self {
        Self {
            sky: true,
            stars: true,
            mountains: true,
        }
    }
}

/// Ranges the orchestrator samples a root branch from on every strike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrikeConfig {
    pub levels: u32,
    pub rotation: Span,
    pub segments: Span,
    pub sub_branches_length: Span,
    pub width: f64,
    pub width_reduction_rate: f64,
}

impl Default for StrikeConfig {
    fn default() -> Self {
        Self {
            levels: 3,
            rotation: Span::new(20.0, 30.0),
            segments: Span::new(3.0, 6.0),
            sub_branches_length: Span::new(0.4, 0.6),
            width: 6.0,
            width_reduction_rate: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandscapeConfig {
    pub colors: LandscapeColors,
    pub should_paint: ShouldPaint,
    pub star_count: usize,
    pub mountains: Vec<LayerPreset>,
    pub strike: StrikeConfig,
}

impl Default for LandscapeConfig {
    fn default() -> Self {
        Self {
            colors: LandscapeColors::default(),
            should_paint: ShouldPaint::default(),
            star_count: 100,
            mountains: default_mountains(),
            strike: StrikeConfig::default(),
        }
    }
}

/// Far, mid and near ranges, back to front.
#[must_use]
pub fn default_mountains() -> Vec<LayerPreset> {
    let layer = |peaks: u32, distance: f64, color: &str, speed: f64| MountainLayer {
        number_of_peaks: peaks,
        distance_between_valley_peak: distance,
        color: color.to_string(),
        valley_y_position: None,
        speed,
        segments: 100,
        silhouette: Silhouette::PeakValley,
    };
    vec![
        LayerPreset {
            id: "far-mountains".to_string(),
            valley_inset: 150.0,
            layer: layer(3, 25.0, "#0D0D2D", 0.05),
        },
        LayerPreset {
            id: "mid-mountains".to_string(),
            valley_inset: 90.0,
            layer: layer(4, 35.0, "#1A1A38", 0.075),
        },
        LayerPreset {
            id: "near-mountains".to_string(),
            valley_inset: 30.0,
            layer: layer(1, 50.0, "#262643", 0.1),
        },
    ]
}

impl LandscapeConfig {
    pub fn validate(&self) -> Result<()> {
        for color in [
            &self.colors.sky_gradient_start,
            &self.colors.sky_gradient_end,
            &self.colors.bolt_inner,
            &self.colors.bolt_glow,
        ] {
            Rgb::parse(color)?;
        }
        if self.star_count > MAX_STARS {
            return Err(LandscapeError::InvalidParameter {
                name: "star_count",
                value: self.star_count as f64,
                range: "[0, 5000]",
            });
        }
        for preset in &self.mountains {
            ensure_non_negative("valley_inset", preset.valley_inset)?;
            preset.layer.validate()?;
        }
        self.strike.validate()
    }

    /// Command-line flags win over file values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if cli.no_sky {
            self.should_paint.sky = false;
        }
        if cli.no_stars {
            self.should_paint.stars = false;
        }
        if cli.no_mountains {
            self.should_paint.mountains = false;
        }
        if let Some(count) = cli.star_count {
            self.star_count = count;
        }
        if let Some(levels) = cli.levels {
            self.strike.levels = u32::from(levels);
        }
        if let Some(silhouette) = cli.silhouette {
            for preset in &mut self.mountains {
                preset.layer.silhouette = silhouette.into();
            }
        }
    }
}

impl StrikeConfig {
    fn validate(&self) -> Result<()> {
        if self.levels == 0 || self.levels > MAX_LEVELS {
            return Err(LandscapeError::InvalidParameter {
                name: "levels",
                value: f64::from(self.levels),
                range: "[1, 6]",
            });
        }
        self.rotation.validate("rotation")?;
        self.segments.validate("segments")?;
        if self.segments.min < 1.0 || self.segments.max > 12.0 {
            return Err(LandscapeError::InvalidParameter {
                name: "segments",
                value: self.segments.max,
                range: "[1, 12]",
            });
        }
        self.sub_branches_length.validate("sub_branches_length")?;
        ensure_open_range(
            "sub_branches_length",
            self.sub_branches_length.min,
            0.0,
            1.0,
            "(0, 1)",
        )?;
        ensure_open_range(
            "sub_branches_length",
            self.sub_branches_length.max,
            0.0,
            1.0,
            "(0, 1)",
        )?;
        ensure_positive("width", self.width)?;
        ensure_open_range(
            "width_reduction_rate",
            self.width_reduction_rate,
            0.0,
            1.0,
            "(0, 1)",
        )
    }
}

pub fn load_config(path: &Path) -> anyhow::Result<LandscapeConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config file {} failed", path.display()))?;
    let config: LandscapeConfig =
        serde_json::from_str(&content).context("parsing landscape config failed")?;
    config.validate().context("landscape config is invalid")?;
    Ok(config)
}

/// File config (or defaults) with CLI overrides applied, validated.
pub fn resolve_config(cli: &Cli) -> anyhow::Result<LandscapeConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => LandscapeConfig::default(),
    };
    config.apply_cli(cli);
    config
        .validate()
        .context("landscape options are invalid")?;
    Ok(config)
}

#[cfg(test)]
mod tests;
