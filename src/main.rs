use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    cursor::Show,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use reflex::{
    app::App,
    app_dirs::AppDirs,
    clock::SystemClock,
    config::{Config, ConfigStore, FileConfigStore},
    delay::RandomDelay,
    logging,
    round_timer::RoundTimer,
    runtime::{CrosstermEventSource, Runner},
    session::SessionConfig,
    ui, ReflexError,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};
use tracing::info;

/// wait for green, then hit space as fast as you can
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal reaction-time game. The surface turns red, then green after a random delay; click it or press space as soon as it does. Each session runs a fixed number of rounds and reports your average reaction time."
)]
pub struct Cli {
    /// number of rounds per session
    #[clap(short = 'n', long)]
    attempts: Option<usize>,

    /// shortest wait before the surface turns green, in seconds
    #[clap(long)]
    min_delay: Option<u64>,

    /// longest wait before the surface turns green, in seconds
    #[clap(long)]
    max_delay: Option<u64>,

    /// seconds after turning green before a round counts as missed
    #[clap(short = 'm', long)]
    miss_window: Option<u64>,

    /// event loop tick interval in milliseconds
    #[clap(long)]
    tick_rate: Option<u64>,

    /// seed for the random delays, for repeatable sessions
    #[clap(long)]
    seed: Option<u64>,

    /// read settings from this file instead of the default config location
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Command line values win over the stored config
    fn apply(&self, cfg: Config) -> Config {
        Config {
            max_attempts: self.attempts.unwrap_or(cfg.max_attempts),
            min_delay_secs: self.min_delay.unwrap_or(cfg.min_delay_secs),
            max_delay_secs: self.max_delay.unwrap_or(cfg.max_delay_secs),
            miss_window_secs: self.miss_window.unwrap_or(cfg.miss_window_secs),
            tick_rate_ms: self.tick_rate.unwrap_or(cfg.tick_rate_ms),
        }
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, ReflexError::NotATty).exit();
    }

    if let Some(log_path) = AppDirs::log_path() {
        if let Err(err) = logging::init(&log_path) {
            eprintln!("reflex: {err}");
        }
    }

    let config = cli.apply(cli.config_store().load());
    config.validate()?;
    info!(?config, "starting");

    install_panic_hook();
    let guard = TerminalGuard::enter()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let timer = RoundTimer::new(
        SessionConfig::from(&config),
        SystemClock::new(),
        RandomDelay::new(cli.seed),
    );
    let mut app = App::new(timer);
    let result = start_tui(
        &mut terminal,
        &mut app,
        Duration::from_millis(config.tick_rate_ms),
    );

    drop(guard);
    result
}

/// Leaves raw mode, the alternate screen and mouse capture. Every step is
/// attempted even if an earlier one fails.
fn restore_terminal() -> io::Result<()> {
    let raw = disable_raw_mode();
    let screen = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture, Show);
    raw.and(screen)
}

/// Holds the terminal in raw mode on the alternate screen until dropped
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard;
        execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = restore_terminal();
    }
}

/// Restores the terminal before the default hook prints the panic message
fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        previous(info);
    }));
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    tick: Duration,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), tick);

    terminal.draw(|f| ui::draw(app, f))?;

    while !app.should_quit {
        if app.on_event(runner.step()) {
            terminal.draw(|f| ui::draw(app, f))?;
        }
    }

    info!("bye");
    Ok(())
}
