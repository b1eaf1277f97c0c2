//! book-manager binary entry point.
//!
//! Loads configuration, sets up file logging, initializes the terminal in
//! raw mode, runs the TUI event loop, and restores the terminal state on
//! exit.
//!
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing_subscriber::EnvFilter;

use book_manager::api::HttpApiClient;
use book_manager::app::controller::Controller;
use book_manager::app::keymap::Keymap;
use book_manager::app::task::Worker;
use book_manager::app::{self, AppState};
use book_manager::config::{self, Config, Overrides};
use book_manager::session::{FileTokenStore, Session};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Base URL of the book API
    #[arg(long = "api-url", env = "BOOK_API_URL")]
    api_url: Option<String>,

    /// Configuration file (default: <config_dir>/book-manager/config.conf)
    #[arg(long)]
    config: Option<PathBuf>,

    /// File holding the login token
    #[arg(long)]
    token_file: Option<PathBuf>,

    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

/// Send tracing output to `path`; stdout is owned by the TUI.
fn init_logging(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create log directory {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Program entry point: run the TUI and report any top-level error to stderr.
fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config::config_dir().join("config.conf"));
    let cfg = Config::load_or_init(&config_path)
        .map_err(|e| anyhow::anyhow!("{e}"))?
        .apply(Overrides {
            api_base_url: args.api_url,
            token_file: args.token_file,
            log_file: args.log_file,
            timeout_secs: args.timeout_secs,
        });

    init_logging(&cfg.log_file)?;
    tracing::info!(api = %cfg.api_base_url, config = %config_path.display(), "starting");

    let keymap = Keymap::load_or_init(&config::config_dir().join("keybinds.conf"));
    let store = FileTokenStore::new(cfg.token_file.clone());
    let session = Session::restore(&store);
    let state = AppState::new(session, cfg.theme, keymap);
    let mut ctrl = Controller::new(state, store);
    let mut worker = Worker::spawn(HttpApiClient::new(&cfg.api_base_url, cfg.timeout));

    let mut terminal = init_terminal().context("init terminal")?;

    let res = app::run(&mut terminal, &mut ctrl, &mut worker);

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();

    if let Err(err) = res {
        tracing::error!(error = %err, "application error");
        eprintln!("application error: {err}");
    }
    Ok(())
}
