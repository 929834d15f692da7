#![allow(clippy::missing_errors_doc)]

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::{app::state::BOLT_PALETTE, scene::mountains::Silhouette};

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ColorArg {
    Auto,
    Always,
    Never,
}

/// Starting glow colour, one per palette entry.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum BoltColorArg {
    #[default]
    Blue,
    Red,
    Green,
    Yellow,
    Magenta,
    Cyan,
}

impl BoltColorArg {
    #[must_use]
    pub fn palette_index(self) -> usize {
        match self {
            BoltColorArg::Blue => 0,
            BoltColorArg::Red => 1,
            BoltColorArg::Green => 2,
            BoltColorArg::Yellow => 3,
            BoltColorArg::Magenta => 4,
            BoltColorArg::Cyan => 5,
        }
    }

    #[must_use]
    pub fn hex(self) -> &'static str {
        BOLT_PALETTE[self.palette_index()]
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SilhouetteArg {
    PeakValley,
    HeightField,
}

impl From<SilhouetteArg> for Silhouette {
    fn from(value: SilhouetteArg) -> Self {
        match value {
            SilhouetteArg::PeakValley => Silhouette::PeakValley,
            SilhouetteArg::HeightField => Silhouette::HeightField,
        }
    }
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Parser, Clone)]
#[command(
    name = "terminal-lightning",
    version,
    about = "Night landscape with click-to-strike lightning"
)]
pub struct Cli {
    /// Target FPS (15..60)
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u8).range(15..=60))]
    pub fps: u8,

    /// Seed for a reproducible landscape
    #[arg(long)]
    pub seed: Option<u64>,

    /// JSON landscape config
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Starting bolt glow colour
    #[arg(long, value_enum, default_value_t = BoltColorArg::Blue)]
    pub bolt_color: BoltColorArg,

    /// Color output policy
    #[arg(long, value_enum, default_value_t = ColorArg::Auto, conflicts_with = "no_color")]
    pub color: ColorArg,

    /// Alias for --color never
    #[arg(long, conflicts_with = "color")]
    pub no_color: bool,

    /// Skip the sky gradient
    #[arg(long)]
    pub no_sky: bool,

    /// Skip the stars
    #[arg(long)]
    pub no_stars: bool,

    /// Skip the mountain ranges
    #[arg(long)]
    pub no_mountains: bool,

    /// Number of stars
    #[arg(long)]
    pub star_count: Option<usize>,

    /// Branching depth of each bolt (1..6)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=6))]
    pub levels: Option<u8>,

    /// Mountain outline strategy
    #[arg(long, value_enum)]
    pub silhouette: Option<SilhouetteArg>,

    /// Force ASCII glyphs
    #[arg(long)]
    pub ascii: bool,

    /// Write tracing output to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Print the landscape as SVG to stdout and exit (non-interactive)
    #[arg(long)]
    pub snapshot: bool,

    /// Snapshot viewport width
    #[arg(long, default_value_t = 1280.0, requires = "snapshot")]
    pub width: f64,

    /// Snapshot viewport height
    #[arg(long, default_value_t = 720.0, requires = "snapshot")]
    pub height: f64,

    /// Strike a bolt at this x before the snapshot
    #[arg(long, requires = "snapshot")]
    pub strike_x: Option<f64>,

    /// Frames to advance before the snapshot
    #[arg(long, default_value_t = 0, requires = "snapshot")]
    pub frames: u32,
}

impl Cli {
    #[must_use]
    pub fn effective_color_mode(&self) -> ColorArg {
        if self.no_color {
            ColorArg::Never
        } else {
            self.color
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.width.is_finite() && self.width > 0.0)
            || !(self.height.is_finite() && self.height > 0.0)
        {
            anyhow::bail!("--width and --height must be positive");
        }
        if let Some(x) = self.strike_x
            && !(0.0..=self.width).contains(&x)
        {
            anyhow::bail!("--strike-x must lie within 0..={}", self.width);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{BoltColorArg, Cli, ColorArg, SilhouetteArg};

    #[test]
    fn parses_color_enum_values() {
        let cli = Cli::parse_from(["terminal-lightning", "--color", "always"]);
        assert_eq!(cli.color, ColorArg::Always);
        assert!(!cli.no_color);
    }

    #[test]
    fn rejects_color_and_no_color_together() {
        let err = Cli::try_parse_from(["terminal-lightning", "--color", "always", "--no-color"])
            .expect_err("expected conflict");
        let rendered = err.to_string();
        assert!(rendered.contains("--color"));
        assert!(rendered.contains("--no-color"));
    }

    #[test]
    fn effective_color_mode_prefers_no_color() {
        let cli = Cli::parse_from(["terminal-lightning", "--no-color"]);
        assert_eq!(cli.effective_color_mode(), ColorArg::Never);

        let cli = Cli::parse_from(["terminal-lightning"]);
        assert_eq!(cli.effective_color_mode(), ColorArg::Auto);
    }

    #[test]
    fn bolt_color_maps_to_palette() {
        let cli = Cli::parse_from(["terminal-lightning", "--bolt-color", "cyan"]);
        assert_eq!(cli.bolt_color, BoltColorArg::Cyan);
        assert_eq!(cli.bolt_color.hex(), "#44ffff");
        assert_eq!(BoltColorArg::default().hex(), "#4444ff");
    }

    #[test]
    fn levels_outside_range_are_rejected() {
        assert!(Cli::try_parse_from(["terminal-lightning", "--levels", "0"]).is_err());
        assert!(Cli::try_parse_from(["terminal-lightning", "--levels", "7"]).is_err());
        let cli = Cli::parse_from(["terminal-lightning", "--levels", "4"]);
        assert_eq!(cli.levels, Some(4));
    }

    #[test]
    fn fps_outside_range_is_rejected() {
        assert!(Cli::try_parse_from(["terminal-lightning", "--fps", "10"]).is_err());
        assert_eq!(Cli::parse_from(["terminal-lightning"]).fps, 30);
    }

    #[test]
    fn snapshot_flags_require_snapshot() {
        assert!(Cli::try_parse_from(["terminal-lightning", "--frames", "5"]).is_err());
        let cli = Cli::parse_from([
            "terminal-lightning",
            "--snapshot",
            "--width",
            "640",
            "--strike-x",
            "320",
            "--silhouette",
            "height-field",
        ]);
        assert!(cli.snapshot);
        assert_eq!(cli.width, 640.0);
        assert_eq!(cli.strike_x, Some(320.0));
        assert_eq!(cli.silhouette, Some(SilhouetteArg::HeightField));
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn strike_outside_viewport_fails_validation() {
        let cli = Cli::parse_from(["terminal-lightning", "--snapshot", "--strike-x", "5000"]);
        assert!(cli.validate().is_err());
    }
}
