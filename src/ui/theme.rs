#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use ratatui::style::Color;

use crate::{cli::ColorArg, surface::Rgb};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorCapability {
    TrueColor,
    Xterm256,
    Basic16,
}

/// Colours of the overlay panels drawn over the landscape.
#[derive(Debug, Clone, Copy)]
pub struct OverlayTheme {
    pub panel: Color,
    pub border: Color,
    pub text: Color,
    pub muted_text: Color,
    pub accent: Color,
    pub warning: Color,
}

pub fn detect_color_capability(mode: ColorArg) -> ColorCapability {
    let term = std::env::var("TERM").ok();
    let colorterm = std::env::var("COLORTERM").ok();
    let no_color = std::env::var("NO_COLOR").ok();
    detect_color_capability_from(
        mode,
        term.as_deref(),
        colorterm.as_deref(),
        no_color.as_deref(),
    )
}

fn detect_color_capability_from(
    mode: ColorArg,
    term: Option<&str>,
    colorterm: Option<&str>,
    no_color: Option<&str>,
) -> ColorCapability {
    if should_force_basic16(mode, term, no_color) {
        return ColorCapability::Basic16;
    }
    if mode == ColorArg::Always || supports_truecolor(colorterm, term) {
        return ColorCapability::TrueColor;
    }
    if supports_256_color(term) {
        ColorCapability::Xterm256
    } else {
        ColorCapability::Basic16
    }
}

fn should_force_basic16(mode: ColorArg, term: Option<&str>, no_color: Option<&str>) -> bool {
    mode == ColorArg::Never
        || (mode == ColorArg::Auto && no_color.is_some_and(|value| !value.is_empty()))
        || (mode == ColorArg::Auto && term.is_some_and(|value| value.eq_ignore_ascii_case("dumb")))
}

fn supports_truecolor(colorterm: Option<&str>, term: Option<&str>) -> bool {
    let colorterm = colorterm.unwrap_or_default().to_lowercase();
    let term = term.unwrap_or_default().to_lowercase();
    truecolor_hint(&colorterm) || truecolor_hint(&term)
}

fn truecolor_hint(value: &str) -> bool {
    value.contains("truecolor")
        || value.contains("24bit")
        || value.contains("-direct")
        || value.ends_with("direct")
}

fn supports_256_color(term: Option<&str>) -> bool {
    term.unwrap_or_default().to_lowercase().contains("256color")
}

#[must_use]
pub fn overlay_theme(accent: Rgb, capability: ColorCapability) -> OverlayTheme {
    let panel = Rgb(12, 12, 34);
    OverlayTheme {
        panel: quantize(panel, capability),
        border: quantize(accent.lerp(panel, 0.35), capability),
        text: quantize(Rgb(230, 232, 245), capability),
        muted_text: quantize(Rgb(140, 144, 176), capability),
        accent: quantize(ensure_contrast(accent, panel, 3.0), capability),
        warning: quantize(Rgb(255, 196, 92), capability),
    }
}

/// Black or white, whichever reads better on `bg`.
#[must_use]
pub fn text_on(bg: Rgb, capability: ColorCapability) -> Color {
    let text = if contrast_ratio(Rgb::WHITE, bg) >= contrast_ratio(Rgb::BLACK, bg) {
        Rgb::WHITE
    } else {
        Rgb::BLACK
    };
    quantize(text, capability)
}

fn ensure_contrast(fg: Rgb, bg: Rgb, min_ratio: f32) -> Rgb {
    if contrast_ratio(fg, bg) >= min_ratio {
        return fg;
    }
    let target = if contrast_ratio(Rgb::WHITE, bg) >= contrast_ratio(Rgb::BLACK, bg) {
        Rgb::WHITE
    } else {
        Rgb::BLACK
    };
    let mut best = fg;
    for step in 1..=24 {
        let candidate = fg.lerp(target, f64::from(step) / 24.0);
        best = candidate;
        if contrast_ratio(candidate, bg) >= min_ratio {
            break;
        }
    }
    best
}

fn contrast_ratio(a: Rgb, b: Rgb) -> f32 {
    let l1 = relative_luminance(a);
    let l2 = relative_luminance(b);
    let (hi, lo) = if l1 >= l2 { (l1, l2) } else { (l2, l1) };
    (hi + 0.05) / (lo + 0.05)
}

fn relative_luminance(rgb: Rgb) -> f32 {
    0.2126 * srgb_to_linear(rgb.0) + 0.7152 * srgb_to_linear(rgb.1) + 0.0722 * srgb_to_linear(rgb.2)
}

fn srgb_to_linear(v: u8) -> f32 {
    let s = f32::from(v) / 255.0;
    if s <= 0.04045 {
        s / 12.92
    } else {
        ((s + 0.055) / 1.055).powf(2.4)
    }
}

pub fn quantize(rgb: Rgb, capability: ColorCapability) -> Color {
    let Rgb(r, g, b) = rgb;
    match capability {
        ColorCapability::TrueColor => Color::Rgb(r, g, b),
        ColorCapability::Xterm256 => {
            let to_cube = |v: u8| -> u8 { ((f32::from(v) / 255.0) * 5.0).round() as u8 };
            Color::Indexed(16 + 36 * to_cube(r) + 6 * to_cube(g) + to_cube(b))
        }
        ColorCapability::Basic16 => basic16_from_rgb(r, g, b),
    }
}

fn basic16_from_rgb(r: u8, g: u8, b: u8) -> Color {
    let rf = f32::from(r) / 255.0;
    let gf = f32::from(g) / 255.0;
    let bf = f32::from(b) / 255.0;

    let max = rf.max(gf.max(bf));
    let min = rf.min(gf.min(bf));
    let delta = max - min;
    let light = (max + min) / 2.0;

    if delta < 0.08 {
        if light < 0.20 {
            return Color::Black;
        }
        if light < 0.40 {
            return Color::DarkGray;
        }
        if light < 0.72 {
            return Color::Gray;
        }
        return Color::White;
    }

    // Dark saturated tones read as black.
    if light < 0.12 {
        return Color::Black;
    }

    let hue = if (max - rf).abs() < f32::EPSILON {
        60.0 * ((gf - bf) / delta).rem_euclid(6.0)
    } else if (max - gf).abs() < f32::EPSILON {
        60.0 * (((bf - rf) / delta) + 2.0)
    } else {
        60.0 * (((rf - gf) / delta) + 4.0)
    };

    let bright = light >= 0.55;
    let (dim, lit) = match hue {
        h if !(30.0..330.0).contains(&h) => (Color::Red, Color::LightRed),
        h if h < 90.0 => (Color::Yellow, Color::LightYellow),
        h if h < 150.0 => (Color::Green, Color::LightGreen),
        h if h < 210.0 => (Color::Cyan, Color::LightCyan),
        h if h < 270.0 => (Color::Blue, Color::LightBlue),
        _ => (Color::Magenta, Color::LightMagenta),
    };
    if bright { lit } else { dim }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_forces_basic16() {
        let capability = detect_color_capability_from(
            ColorArg::Never,
            Some("xterm-256color"),
            Some("truecolor"),
            None,
        );
        assert_eq!(capability, ColorCapability::Basic16);
    }

    #[test]
    fn no_color_only_applies_in_auto_mode() {
        assert_eq!(
            detect_color_capability_from(ColorArg::Auto, Some("xterm"), None, Some("1")),
            ColorCapability::Basic16
        );
        assert_eq!(
            detect_color_capability_from(ColorArg::Always, Some("xterm"), None, Some("1")),
            ColorCapability::TrueColor
        );
    }

    #[test]
    fn detects_truecolor_and_256() {
        assert_eq!(
            detect_color_capability_from(ColorArg::Auto, Some("xterm"), Some("24bit"), None),
            ColorCapability::TrueColor
        );
        assert_eq!(
            detect_color_capability_from(ColorArg::Auto, Some("screen-256color"), None, None),
            ColorCapability::Xterm256
        );
        assert_eq!(
            detect_color_capability_from(ColorArg::Auto, Some("dumb"), None, None),
            ColorCapability::Basic16
        );
    }

    #[test]
    fn quantize_maps_into_cube() {
        assert_eq!(
            quantize(Rgb(255, 0, 0), ColorCapability::Xterm256),
            Color::Indexed(196)
        );
        assert_eq!(
            quantize(Rgb(1, 2, 3), ColorCapability::TrueColor),
            Color::Rgb(1, 2, 3)
        );
    }

    #[test]
    fn basic16_keeps_palette_hues() {
        let q = |hex: &str| quantize(Rgb::parse(hex).expect("hex"), ColorCapability::Basic16);
        assert_eq!(q("#4444ff"), Color::LightBlue);
        assert_eq!(q("#ff4444"), Color::LightRed);
        assert_eq!(q("#44ff44"), Color::LightGreen);
        assert_eq!(q("#03031a"), Color::Black);
        assert_eq!(q("#ffffff"), Color::White);
    }

    #[test]
    fn text_on_picks_readable_ink() {
        assert_eq!(text_on(Rgb(255, 255, 68), ColorCapability::TrueColor), Color::Rgb(0, 0, 0));
        assert_eq!(
            text_on(Rgb(12, 12, 34), ColorCapability::TrueColor),
            Color::Rgb(255, 255, 255)
        );
    }

    #[test]
    fn accent_is_lifted_off_dark_panels() {
        let dark = Rgb(20, 20, 60);
        let lifted = ensure_contrast(dark, Rgb(12, 12, 34), 3.0);
        assert!(contrast_ratio(lifted, Rgb(12, 12, 34)) >= 3.0);
    }
}
