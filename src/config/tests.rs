use std::io::Write;

use clap::Parser;

use super::*;

#[test]
fn defaults_validate() {
    let config = LandscapeConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.star_count, 100);
    assert_eq!(config.mountains.len(), 3);
    assert_eq!(config.colors.bolt_glow, "#4444ff");
}

#[test]
fn partial_file_keeps_defaults_for_missing_fields() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        r##"{{ "star_count": 12, "colors": {{ "bolt_inner": "#eeeeff" }}, "strike": {{ "levels": 2 }} }}"##
    )
    .expect("write config");

    let config = load_config(file.path()).expect("load");
    assert_eq!(config.star_count, 12);
    assert_eq!(config.colors.bolt_inner, "#eeeeff");
    assert_eq!(config.colors.sky_gradient_start, "#03031a");
    assert_eq!(config.strike.levels, 2);
    assert_eq!(config.strike.rotation, Span::new(20.0, 30.0));
}

#[test]
fn serialized_defaults_load_back() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("landscape.json");
    let json = serde_json::to_string_pretty(&LandscapeConfig::default()).expect("serialize");
    fs::write(&path, json).expect("write");
    assert_eq!(
        load_config(&path).expect("load"),
        LandscapeConfig::default()
    );
}

#[test]
fn invalid_file_reports_context() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, r#"{{ "strike": {{ "width_reduction_rate": 1.5 }} }}"#).expect("write config");
    let err = load_config(file.path()).expect_err("rate above one");
    assert_eq!(err.to_string(), "landscape config is invalid");
    assert!(format!("{err:#}").contains("width_reduction_rate"));
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = load_config(&dir.path().join("absent.json")).expect_err("missing");
    assert!(err.to_string().starts_with("reading config file"));
}

#[test]
fn rejects_bad_colours_and_levels() {
    let mut config = LandscapeConfig::default();
    config.colors.sky_gradient_end = "dusk".to_string();
    assert!(matches!(
        config.validate(),
        Err(LandscapeError::InvalidColor(_))
    ));

    let mut config = LandscapeConfig::default();
    config.strike.levels = 0;
    assert!(config.validate().is_err());

    let mut config = LandscapeConfig::default();
    config.strike.segments = Span::new(6.0, 3.0);
    assert!(config.validate().is_err());
}

#[test]
fn oversized_mountain_layer_fails_at_load() {
    let mut config = LandscapeConfig::default();
    config.mountains[0].layer.number_of_peaks = 4_000_000_000;
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        "{}",
        serde_json::to_string(&config).expect("serialize")
    )
    .expect("write config");

    let err = load_config(file.path()).expect_err("too many peaks");
    assert!(format!("{err:#}").contains("number_of_peaks"));
}

#[test]
fn cli_flags_override_file_values() {
    let cli = Cli::parse_from([
        "terminal-lightning",
        "--no-stars",
        "--star-count",
        "7",
        "--levels",
        "5",
        "--silhouette",
        "height-field",
    ]);
    let config = resolve_config(&cli).expect("resolve");
    assert!(config.should_paint.sky);
    assert!(!config.should_paint.stars);
    assert_eq!(config.star_count, 7);
    assert_eq!(config.strike.levels, 5);
    assert!(
        config
            .mountains
            .iter()
            .all(|preset| preset.layer.silhouette == Silhouette::HeightField)
    );
}

#[test]
fn too_many_stars_fail_resolution() {
    let cli = Cli::parse_from(["terminal-lightning", "--star-count", "100000"]);
    assert!(resolve_config(&cli).is_err());
}
