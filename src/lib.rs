pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod generate;
pub mod logging;
pub mod scene;
pub mod surface;
pub mod ui;

use std::io::{self, Stdout, Write};

use anyhow::{Context, Result};
use app::events::{AppEvent, spawn_input_task};
use app::state::{AppMode, AppState};
use cli::Cli;
use config::LandscapeConfig;
use crossterm::{
    event::{DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture},
    execute,
    style::Print,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use generate::Gen;
use ratatui::{Terminal, backend::CrosstermBackend};
use scene::Landscape;
use surface::{Viewport, to_svg};
use tokio::sync::mpsc;
use ui::theme::detect_color_capability;

pub async fn run(cli: Cli) -> Result<()> {
    cli.validate()?;
    logging::init_logging(cli.log_file.as_deref())?;
    let config = config::resolve_config(&cli)?;

    if cli.snapshot {
        let svg = render_snapshot(&cli, config)?;
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{svg}").context("writing snapshot to stdout")?;
        return Ok(());
    }

    let mut terminal = setup_terminal().context("terminal setup failed")?;
    let result = run_inner(&mut terminal, cli, config).await;
    restore_terminal(&mut terminal)?;
    result
}

/// Builds the landscape off-screen, optionally strikes once, advances
/// `cli.frames` ticks and returns the surface as SVG markup.
pub fn render_snapshot(cli: &Cli, config: LandscapeConfig) -> Result<String> {
    let rng = cli.seed.map_or_else(Gen::from_entropy, Gen::seeded);
    let mut landscape = Landscape::new(config, Viewport::new(cli.width, cli.height), rng)
        .context("building snapshot landscape failed")?;
    if let Some(x) = cli.strike_x {
        landscape
            .strike(x, cli.bolt_color.hex())
            .with_context(|| format!("strike at x={x} failed"))?;
    }
    for _ in 0..cli.frames {
        landscape.tick();
    }
    tracing::info!(
        frames = cli.frames,
        elements = landscape.surface().live_count(),
        "snapshot rendered"
    );
    Ok(to_svg(landscape.surface()))
}

async fn run_inner(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    cli: Cli,
    config: LandscapeConfig,
) -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<AppEvent>(256);
    let input_stream = spawn_input_task();
    tokio::pin!(input_stream);
    let grid = crossterm::terminal::size().context("reading terminal size")?;
    let mut app = AppState::new(&cli, config, grid)?;
    let capability = detect_color_capability(cli.effective_color_mode());

    tx.send(AppEvent::Bootstrap).await?;

    while app.running {
        tokio::select! {
            maybe_input = input_stream.next() => {
                if let Some(input) = maybe_input {
                    app.handle_event(AppEvent::Input(input), &tx, &cli).await?;
                }
            }
            maybe_event = rx.recv() => {
                if let Some(event) = maybe_event {
                    app.handle_event(event, &tx, &cli).await?;
                }
            }
        }

        terminal.draw(|frame| ui::render(frame, &app, capability, cli.ascii))?;

        if app.take_bell() {
            execute!(terminal.backend_mut(), Print('\x07'))?;
        }

        if app.mode == AppMode::Quit {
            app.running = false;
        }
    }

    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    install_panic_hook();
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn install_panic_hook() {
    let existing = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(
            stdout,
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableFocusChange
        );
        existing(panic);
    }));
}
