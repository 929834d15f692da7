use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::{
    app::state::{AppState, BOLT_PALETTE},
    surface::Rgb,
    ui::theme::{ColorCapability, OverlayTheme, quantize, text_on},
};

/// One-line status bar along the top edge.
pub fn render_info(frame: &mut Frame, area: Rect, state: &AppState, theme: OverlayTheme) {
    let bar = Rect { height: 1, ..area };
    let sound = if state.toggles.is_muted { "muted" } else { "bell" };
    let mut spans = vec![
        Span::styled(
            " ⚡ terminal-lightning ",
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                "strikes {}  bolts {}  colour {}  sound {} ",
                state.strikes,
                state.landscape.bolt().strikes(),
                state.lightning.color(),
                sound
            ),
            Style::default().fg(theme.text),
        ),
        Span::styled(
            "s settings  i info  h help  q quit",
            Style::default().fg(theme.muted_text),
        ),
    ];
    if let Some(err) = &state.last_error {
        spans.push(Span::styled(
            format!("  {err}"),
            Style::default().fg(theme.warning),
        ));
    }
    frame.render_widget(Clear, bar);
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.panel)),
        bar,
    );
}

pub fn render_instructions(frame: &mut Frame, area: Rect, theme: OverlayTheme) {
    let popup = centered_rect(60, 40, area);
    frame.render_widget(Clear, popup);

    let panel_style = Style::default().fg(theme.text).bg(theme.panel);
    let block = panel_block("Lightning", theme, panel_style);
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let lines = vec![
        Line::from(Span::styled(
            "Click anywhere to summon lightning",
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("c cycle bolt colour  |  s colour picker"),
        Line::from("m mute bell  |  i info bar  |  h this help"),
        Line::from(Span::styled(
            "q / Esc quit",
            Style::default().fg(theme.muted_text),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .style(panel_style)
            .centered()
            .wrap(Wrap { trim: true }),
        inner,
    );
}

/// Colour picker listing the palette swatches and the mute state.
pub fn render_settings(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    theme: OverlayTheme,
    capability: ColorCapability,
) {
    let popup = centered_rect(50, 50, area);
    frame.render_widget(Clear, popup);

    let panel_style = Style::default().fg(theme.text).bg(theme.panel);
    let block = panel_block("Settings", theme, panel_style);
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(1),
    ])
    .split(inner);

    frame.render_widget(
        Paragraph::new("Bolt colour").style(panel_style.add_modifier(Modifier::BOLD)),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(swatch_line(state.lightning.index(), capability)).style(panel_style),
        chunks[1],
    );

    let mute = if state.toggles.is_muted { "on" } else { "off" };
    frame.render_widget(
        Paragraph::new(format!("Mute: {mute}")).style(panel_style),
        chunks[2],
    );
    frame.render_widget(
        Paragraph::new("←/→ or 1-6 pick  |  m mute  |  Esc/Enter close")
            .style(Style::default().fg(theme.muted_text).bg(theme.panel))
            .wrap(Wrap { trim: true }),
        chunks[3],
    );
}

fn swatch_line(selected: usize, capability: ColorCapability) -> Line<'static> {
    let spans = BOLT_PALETTE
        .iter()
        .enumerate()
        .flat_map(|(i, hex)| {
            let bg = Rgb::parse(hex).unwrap_or(Rgb::WHITE);
            let label = if i == selected {
                format!("[{}]", i + 1)
            } else {
                format!(" {} ", i + 1)
            };
            let mut style = Style::default()
                .bg(quantize(bg, capability))
                .fg(text_on(bg, capability));
            if i == selected {
                style = style.add_modifier(Modifier::BOLD);
            }
            [Span::styled(label, style), Span::raw(" ")]
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

fn panel_block(title: &'static str, theme: OverlayTheme, panel_style: Style) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .style(panel_style)
        .border_style(Style::default().fg(theme.border).bg(theme.panel))
}

pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_stays_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(50, 50, outer);
        assert_eq!(inner.width, 50);
        assert_eq!(inner.height, 20);
        assert_eq!(inner.x, 25);
        assert_eq!(inner.y, 10);
    }

    #[test]
    fn swatches_mark_selected_entry() {
        let line = swatch_line(2, ColorCapability::TrueColor);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, " 1   2  [3]  4   5   6  ");
        assert_eq!(
            line.spans[4].style.bg,
            Some(ratatui::style::Color::Rgb(0x44, 0xff, 0x44))
        );
    }
}
