use anyhow::{Context, Result};
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use tokio::sync::mpsc;

use crate::{
    app::events::{AppEvent, start_frame_task},
    cli::Cli,
    config::LandscapeConfig,
    generate::Gen,
    scene::Landscape,
    surface::{Affine, Point, Viewport},
};

mod input;

use input::{command_char, palette_digit, settings_close_key};

pub const BOLT_PALETTE: [&str; 6] = [
    "#4444ff", "#ff4444", "#44ff44", "#ffff44", "#ff44ff", "#44ffff",
];

/// Surface units per terminal cell. A cell is roughly twice as tall as wide.
pub const CELL_WIDTH: f64 = 8.0;
pub const CELL_HEIGHT: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiToggles {
    pub show_instructions: bool,
    pub is_muted: bool,
    pub show_info: bool,
    pub show_settings: bool,
}

impl Default for UiToggles {
    fn default() -> Self {
        Self {
            show_instructions: true,
            is_muted: false,
            show_info: true,
            show_settings: false,
        }
    }
}

/// Selected bolt glow colour out of [`BOLT_PALETTE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightningState {
    index: usize,
}

impl LightningState {
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self {
            index: index.min(BOLT_PALETTE.len() - 1),
        }
    }

    #[must_use]
    pub fn color(&self) -> &'static str {
        BOLT_PALETTE[self.index]
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Selects `color` if it is one of the palette entries.
    pub fn set_color(&mut self, color: &str) -> bool {
        match BOLT_PALETTE
            .iter()
            .position(|entry| entry.eq_ignore_ascii_case(color))
        {
            Some(index) => {
                self.index = index;
                true
            }
            None => false,
        }
    }

    pub fn cycle(&mut self, step: isize) {
        let len = BOLT_PALETTE.len() as isize;
        self.index = (self.index as isize + step).rem_euclid(len) as usize;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Running,
    Quit,
}

#[derive(Debug)]
pub struct AppState {
    pub mode: AppMode,
    pub running: bool,
    pub toggles: UiToggles,
    pub lightning: LightningState,
    pub landscape: Landscape,
    pub grid: (u16, u16),
    pub frame_tick: u64,
    pub strikes: u64,
    pub last_error: Option<String>,
    pending_bell: bool,
}

/// Viewport for a terminal grid; fixed for the lifetime of the landscape.
#[must_use]
pub fn viewport_for_grid(cols: u16, rows: u16) -> Viewport {
    Viewport::new(
        f64::from(cols.max(1)) * CELL_WIDTH,
        f64::from(rows.max(1)) * CELL_HEIGHT,
    )
}

/// Maps surface units onto a `cols` x `rows` cell grid.
#[must_use]
pub fn grid_transform(viewport: Viewport, cols: u16, rows: u16) -> Affine {
    Affine::scale(
        f64::from(cols) / viewport.width,
        f64::from(rows) / viewport.height,
    )
}

impl AppState {
    pub fn new(cli: &Cli, config: LandscapeConfig, grid: (u16, u16)) -> Result<Self> {
        let (cols, rows) = grid;
        let viewport = viewport_for_grid(cols, rows);
        let rng = cli.seed.map_or_else(Gen::from_entropy, Gen::seeded);
        let mut landscape =
            Landscape::new(config, viewport, rng).context("building landscape failed")?;
        landscape.set_screen_transform(grid_transform(viewport, cols, rows));

        Ok(Self {
            mode: AppMode::Running,
            running: true,
            toggles: UiToggles::default(),
            lightning: LightningState::new(cli.bolt_color.palette_index()),
            landscape,
            grid,
            frame_tick: 0,
            strikes: 0,
            last_error: None,
            pending_bell: false,
        })
    }

    pub async fn handle_event(
        &mut self,
        event: AppEvent,
        tx: &mpsc::Sender<AppEvent>,
        cli: &Cli,
    ) -> Result<()> {
        match event {
            AppEvent::Bootstrap => {
                cli.validate()?;
                let leave_tx = tx.clone();
                self.landscape.on_pointer_leave(move || {
                    if let Err(err) = leave_tx.try_send(AppEvent::PointerLeft) {
                        tracing::trace!(%err, "pointer leave event dropped");
                    }
                });
                start_frame_task(tx.clone(), cli.fps);
                tracing::info!(fps = cli.fps, grid = ?self.grid, "frame loop started");
            }
            AppEvent::TickFrame => {
                self.frame_tick = self.frame_tick.saturating_add(1);
                self.landscape.tick();
            }
            AppEvent::Input(event) => self.handle_input(event, tx).await?,
            AppEvent::PointerLeft => {
                self.toggles.show_settings = false;
            }
            AppEvent::Quit => {
                self.mode = AppMode::Quit;
            }
        }

        Ok(())
    }

    async fn handle_input(&mut self, event: Event, tx: &mpsc::Sender<AppEvent>) -> Result<()> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key, tx).await?,
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::FocusLost => self.landscape.pointer_leave(),
            Event::Resize(cols, rows) => self.resize(cols, rows),
            _ => {}
        }
        Ok(())
    }

    async fn handle_key(&mut self, key: KeyEvent, tx: &mpsc::Sender<AppEvent>) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            tx.send(AppEvent::Quit).await?;
            return Ok(());
        }
        if self.toggles.show_settings {
            self.handle_settings_key(key);
            return Ok(());
        }
        if key.code == KeyCode::Esc {
            tx.send(AppEvent::Quit).await?;
            return Ok(());
        }
        match command_char(key) {
            Some('q') => tx.send(AppEvent::Quit).await?,
            Some('c') => self.lightning.cycle(1),
            Some('s') => self.toggles.show_settings = true,
            Some('i') => self.toggles.show_info = !self.toggles.show_info,
            Some('h') => self.toggles.show_instructions = !self.toggles.show_instructions,
            Some('m') => self.toggles.is_muted = !self.toggles.is_muted,
            _ => {}
        }
        Ok(())
    }

    fn handle_settings_key(&mut self, key: KeyEvent) {
        if settings_close_key(key.code) {
            self.toggles.show_settings = false;
            return;
        }
        match key.code {
            KeyCode::Left | KeyCode::Up => self.lightning.cycle(-1),
            KeyCode::Right | KeyCode::Down => self.lightning.cycle(1),
            KeyCode::Char('m') => self.toggles.is_muted = !self.toggles.is_muted,
            KeyCode::Char(ch) => {
                if let Some(index) = palette_digit(ch) {
                    self.lightning = LightningState::new(index);
                }
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let screen = Point::new(f64::from(mouse.column) + 0.5, f64::from(mouse.row) + 0.5);
        self.strike_at(screen);
    }

    /// Strikes where the pointer went down, in cell coordinates.
    pub fn strike_at(&mut self, screen: Point) {
        let color = self.lightning.color();
        match self.landscape.pointer_down(screen, color) {
            Ok(local) => {
                self.strikes += 1;
                self.toggles.show_instructions = false;
                self.pending_bell = !self.toggles.is_muted;
                self.last_error = None;
                tracing::debug!(x = local.x, color, "strike");
            }
            Err(err) => {
                tracing::warn!(%err, "strike rejected");
                self.last_error = Some(err.to_string());
            }
        }
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        self.grid = (cols, rows);
        let ctm = grid_transform(self.landscape.viewport(), cols, rows);
        self.landscape.set_screen_transform(ctm);
        tracing::debug!(cols, rows, "terminal resized");
    }

    /// Whether a strike since the last call should ring the terminal bell.
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.pending_bell)
    }
}
