#![allow(dead_code)]

use terminal_lightning::{
    app::state::AppState,
    cli::{BoltColorArg, Cli, ColorArg},
    config::LandscapeConfig,
    generate::Gen,
    scene::{BoltColors, BranchParams, Landscape},
    surface::{Point, Viewport},
};

pub fn test_cli() -> Cli {
    Cli {
        fps: 30,
        seed: Some(42),
        config: None,
        bolt_color: BoltColorArg::Blue,
        color: ColorArg::Always,
        no_color: false,
        no_sky: false,
        no_stars: false,
        no_mountains: false,
        star_count: None,
        levels: None,
        silhouette: None,
        ascii: false,
        log_file: None,
        snapshot: false,
        width: 1280.0,
        height: 720.0,
        strike_x: None,
        frames: 0,
    }
}

pub fn snapshot_cli() -> Cli {
    Cli {
        snapshot: true,
        ..test_cli()
    }
}

pub fn landscape(seed: u64) -> Landscape {
    Landscape::new(
        LandscapeConfig::default(),
        Viewport::new(1280.0, 720.0),
        Gen::seeded(seed),
    )
    .expect("landscape")
}

pub fn ready_state(cli: &Cli, grid: (u16, u16)) -> AppState {
    AppState::new(cli, LandscapeConfig::default(), grid).expect("state")
}

pub fn bolt_colors() -> BoltColors {
    BoltColors {
        inner: "white".to_string(),
        outer: "#4444ff".to_string(),
    }
}

pub fn branch_params(segments: u32, length: f64) -> BranchParams {
    BranchParams {
        start_point: Point::new(0.0, 0.0),
        length,
        angle: 0.0,
        rotation: 25.0,
        segments,
        sub_branches_length: 0.5,
        width: 6.0,
        width_reduction_rate: 0.4,
    }
}
