pub mod overlay;
pub mod raster;
pub mod theme;

use ratatui::{
    Frame,
    widgets::{Block, Borders, Paragraph},
};

use crate::{
    app::state::AppState,
    surface::Rgb,
    ui::{
        raster::{GlyphSet, SurfaceView},
        theme::{ColorCapability, overlay_theme},
    },
};

pub const MIN_WIDTH: u16 = 20;
pub const MIN_HEIGHT: u16 = 8;

pub fn render(frame: &mut Frame, state: &AppState, capability: ColorCapability, ascii: bool) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let warning = Paragraph::new(format!(
            "Terminal too small. Resize to at least {MIN_WIDTH}x{MIN_HEIGHT}."
        ))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("terminal-lightning"),
        );
        frame.render_widget(warning, area);
        return;
    }

    let glyphs = if ascii {
        GlyphSet::Ascii
    } else {
        GlyphSet::Unicode
    };
    frame.render_widget(
        SurfaceView::new(state.landscape.surface(), capability).glyphs(glyphs),
        area,
    );

    let accent = Rgb::parse(state.lightning.color()).unwrap_or(Rgb::WHITE);
    let theme = overlay_theme(accent, capability);
    if state.toggles.show_info {
        overlay::render_info(frame, area, state, theme);
    }
    if state.toggles.show_settings {
        overlay::render_settings(frame, area, state, theme, capability);
    } else if state.toggles.show_instructions {
        overlay::render_instructions(frame, area, theme);
    }
}
