use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use bughunt::{
    app::{self, App},
    app_dirs::AppDirs,
    catalog::Catalog,
    config::{Config, ConfigStore, FileConfigStore},
    controller::SessionSettings,
    logging,
    runtime::{ChannelScheduler, CrosstermEventSource, FixedTicker, Runner},
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

/// How long the loop waits for input before checking the quit flag again
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// timed bug-hunting quiz for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Spot the planted bugs in a code sample before the clock runs out. Each bug you flag is worth 20 points; wrong guesses cost nothing."
)]
pub struct Cli {
    /// track to open with, or "random"
    #[clap(short = 't', long)]
    track: Option<String>,

    /// seconds on the clock
    #[clap(short = 's', long)]
    time_limit: Option<u32>,

    /// pause between submitting and the summary, in milliseconds
    #[clap(long)]
    reveal_delay_ms: Option<u64>,

    /// list the available tracks and exit
    #[clap(short = 'l', long)]
    list: bool,

    /// write the log here instead of the state directory
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// store the effective settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Layer command line overrides on top of the stored config
    fn apply(&self, mut config: Config) -> Config {
        if let Some(secs) = self.time_limit {
            config.time_limit_secs = secs;
        }
        if let Some(ms) = self.reveal_delay_ms {
            config.reveal_delay_ms = ms;
        }
        if let Some(track) = &self.track {
            config.default_track = Some(track.clone());
        }
        config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(path) = cli.log_file.clone().or_else(AppDirs::log_path) {
        if let Err(err) = logging::init(&path) {
            eprintln!("bughunt: logging disabled: {err}");
        }
    }

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());
    if cli.save_config {
        store.save(&config)?;
        info!(path = %store.path().display(), "settings saved");
    }

    let catalog = Arc::new(Catalog::embedded()?);
    if cli.list {
        print_tracks(&catalog);
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = CrosstermEventSource::new();
    let scheduler = ChannelScheduler::new(events.sender());
    let mut app = App::new(
        catalog,
        SessionSettings::from(&config),
        Box::new(scheduler),
    );
    if let Some(id) = &config.default_track {
        app::preselect(&mut app, id);
    }

    info!(
        time_limit_secs = config.time_limit_secs,
        reveal_delay_ms = config.reveal_delay_ms,
        "starting"
    );
    let runner = Runner::new(events, FixedTicker::new(POLL_INTERVAL));
    let result = app::run(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result?;
    Ok(())
}

fn print_tracks(catalog: &Catalog) {
    for track in catalog.tracks() {
        println!(
            "{:<8} {:<8} {} bugs  {}",
            track.id(),
            track.language(),
            track.bugs().len(),
            track.title()
        );
    }
    for (id, err) in catalog.rejected() {
        eprintln!("{id:<8} unavailable: {err}");
    }
}
