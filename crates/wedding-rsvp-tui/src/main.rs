//! Wedding RSVP - a terminal client for confirming wedding attendance.
//!
//! Guests find their party by name and confirm each member in turn; hosts
//! sign in to see the guest list and its numbers.

mod app;
mod ui;
mod utils;

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use wedding_rsvp_core::admin;
use wedding_rsvp_core::auth::{CredentialStore, Session};
use wedding_rsvp_core::{Config, MemoryStore, SupabaseClient};

use app::{App, AppState, Backend};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE: &str = "wedding-rsvp.log";

/// Command line options
#[derive(Debug, Default)]
struct Options {
    demo: bool,
    export_guests: bool,
    login: bool,
}

impl Options {
    fn parse(args: impl Iterator<Item = String>) -> Result<Self> {
        let mut options = Options::default();
        for arg in args {
            match arg.as_str() {
                "--demo" => options.demo = true,
                "--export-guests" => options.export_guests = true,
                "--login" => options.login = true,
                other => anyhow::bail!(
                    "Unknown argument: {} (expected --demo, --export-guests or --login)",
                    other
                ),
            }
        }
        Ok(options)
    }
}

/// Initialize the tracing subscriber.
///
/// The terminal belongs to the UI, so records go to a log file in the cache
/// directory. Use RUST_LOG to control the level (e.g., RUST_LOG=debug).
fn init_tracing(log_dir: &Path) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if std::fs::create_dir_all(log_dir).is_err() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::sink))
            .with(filter)
            .init();
        return None;
    }

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();
    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let options = Options::parse(std::env::args().skip(1))?;
    let config = Config::load().context("Failed to load configuration")?;

    let log_dir = config.cache_dir()?;
    let _log_guard = init_tracing(&log_dir);
    info!(?options, "Wedding RSVP starting");

    if options.login {
        return login_interactive(config).await;
    }
    if options.export_guests {
        return export_guests(&config, options.demo).await;
    }

    let backend = if options.demo {
        Backend::Demo(Arc::new(MemoryStore::demo()))
    } else {
        App::hosted_backend(&config)?
    };
    let mut app = App::new(config, backend)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Wedding RSVP shutting down");
    Ok(())
}

/// Sign a host in from the command line and save the session
async fn login_interactive(mut config: Config) -> Result<()> {
    let (url, key) = config
        .backend()
        .context("No backend configured. Set SUPABASE_URL and SUPABASE_ANON_KEY")?;
    let client = SupabaseClient::new(url, key)?;

    eprint!("Email: ");
    io::stderr().flush()?;
    let mut email = String::new();
    io::stdin().read_line(&mut email)?;
    let email = email.trim().to_string();
    if email.is_empty() {
        anyhow::bail!("Email is required");
    }

    let password = rpassword::prompt_password("Password: ")?;
    let data = client
        .sign_in(&email, &password)
        .await
        .context("Sign-in failed")?;

    let mut session = Session::new(config.cache_dir()?);
    session.update(data);
    session.save()?;

    if let Err(e) = CredentialStore::default().remember(&email, &password) {
        eprintln!("Warning: could not store password in keychain: {}", e);
    }
    config.last_host_email = Some(email.clone());
    config.save()?;

    eprintln!("Signed in as {}", email);
    Ok(())
}

/// Print every guest as JSON
async fn export_guests(config: &Config, demo: bool) -> Result<()> {
    let list = if demo {
        admin::load_guests(&MemoryStore::demo()).await?
    } else {
        let (url, key) = config
            .backend()
            .context("No backend configured. Set SUPABASE_URL and SUPABASE_ANON_KEY")?;
        let mut session = Session::new(config.cache_dir()?);
        session.load()?;
        let token = session
            .token()
            .context("No saved session. Run with --login first.")?
            .to_string();
        let client = SupabaseClient::new(url, key)?.with_token(token);
        admin::load_guests(&client).await?
    };

    println!("{}", serde_json::to_string_pretty(&list.guests)?);
    eprintln!(
        "{} guests: {} attending, {} not attending, {} pending",
        list.stats.total, list.stats.attending, list.stats.not_attending, list.stats.pending
    );
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Options> {
        Options::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_no_args() {
        let options = parse(&[]).expect("parse");
        assert!(!options.demo && !options.export_guests && !options.login);
    }

    #[test]
    fn test_parse_flags() {
        let options = parse(&["--demo", "--export-guests"]).expect("parse");
        assert!(options.demo);
        assert!(options.export_guests);
        assert!(!options.login);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(parse(&["--verbose"]).is_err());
    }
}
