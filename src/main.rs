//! Dynamic popup - terminal renderer for markdown forms
//!
//! Usage: `dynamic-popup <popup.json>`
//!
//! Renders the popup in the terminal. On submit the answers are written as
//! JSON to the configured output file, or to stdout once the terminal is
//! restored.

mod app;
mod platform;
mod ui;

use anyhow::{Context, Result};
use app::App;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dynamic_popup::completion::{Completion, CompletionSink};
use dynamic_popup::config::{PopupConfig, Settings};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load().unwrap_or_else(|err| {
        eprintln!("Ignoring unreadable settings: {err:#}");
        Settings::default()
    });

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: dynamic-popup <popup.json>")?;
    let config = PopupConfig::from_file(&config_path)?;
    let mut app = App::new(&config, &settings)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Handle any errors
    if let Err(err) = result {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }

    match app.take_completion() {
        Some(Completion::Submitted(payload)) => {
            if app.sink.output_path().is_none() {
                println!("{}", CompletionSink::render(&payload)?);
            }
        }
        Some(Completion::Dismissed) => tracing::debug!("dismissed, nothing to print"),
        // Aborted with Ctrl+C
        None => std::process::exit(1),
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    // Global quit: Ctrl+C
                    if key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        app.abort();
                    } else {
                        app.handle_key(key).await?;
                    }
                }
                Event::Resize(_width, _height) => {
                    // Layout is recomputed on the next draw
                }
                _ => {}
            }
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}
