use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use focus_study::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{CrosstermEventSource, EventSource, Runner},
    timer::TickScheduler,
    Flow, SessionState, StudySession, TimerMode,
};
use log::{info, warn};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};
use webbrowser::Browser;

const POLL_INTERVAL_MS: u64 = 250;

/// distraction-free study tui with a video loader, timer, and progress tracker
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A study companion for the terminal: load a YouTube video or playlist, run pomodoro work/break cycles or a plain stopwatch, and keep track of how far through a course you are."
)]
pub struct Cli {
    /// minutes per pomodoro work phase
    #[clap(short = 'w', long)]
    work_minutes: Option<u32>,

    /// minutes per pomodoro break phase
    #[clap(short = 'b', long)]
    break_minutes: Option<u32>,

    /// number of videos in the course
    #[clap(short = 't', long)]
    total: Option<u32>,

    /// start with the counter (stopwatch) instead of pomodoro
    #[clap(long)]
    counter: bool,

    /// start with the smaller player
    #[clap(long)]
    no_theatre: bool,

    /// start with the progress panel collapsed
    #[clap(long)]
    hide_progress: bool,

    /// YouTube video or playlist URL to load at startup
    #[clap(short = 'u', long)]
    url: Option<String>,

    /// config file to read startup defaults from
    #[clap(long)]
    config: Option<PathBuf>,

    /// file to write logs to (filter with RUST_LOG)
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Flags given on the command line win over the config file
    fn apply_to(&self, cfg: &mut Config) {
        if let Some(minutes) = self.work_minutes {
            cfg.work_minutes = minutes;
        }
        if let Some(minutes) = self.break_minutes {
            cfg.break_minutes = minutes;
        }
        if let Some(total) = self.total {
            cfg.total_count = total;
        }
        if self.counter {
            cfg.timer_mode = TimerMode::Counter;
        }
        if self.no_theatre {
            cfg.theatre_mode = false;
        }
        if self.hide_progress {
            cfg.progress_visible = false;
        }
    }

    fn load_config(&self) -> Config {
        let store = match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        };
        let mut cfg = store.load();
        self.apply_to(&mut cfg);
        cfg
    }
}

/// Logs go to a file; the terminal belongs to the TUI.
fn init_logging(path: Option<PathBuf>) {
    let Some(path) = path.or_else(AppDirs::log_path) else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let Ok(file) = fs::OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging(cli.log_file.clone());
    let config = cli.load_config();
    info!("starting with {:?}", config);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = CrosstermEventSource::new();
    let mut session = StudySession::new(SessionState::from(&config), events.tick_scheduler());
    if let Some(url) = &cli.url {
        session.load(url);
    }
    let runner = Runner::new(events, Duration::from_millis(POLL_INTERVAL_MS));

    let result = start_tui(&mut terminal, &runner, &mut session);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    info!("exiting");
    result
}

fn start_tui<B: Backend, E: EventSource, S: TickScheduler>(
    terminal: &mut Terminal<B>,
    runner: &Runner<E>,
    session: &mut StudySession<S>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| f.render_widget(&*session, f.area()))?;

    loop {
        let Some(event) = runner.step() else {
            continue;
        };

        match session.handle_event(event) {
            Flow::Quit => break,
            Flow::Open(video) => open_in_browser(&video.embed_url()),
            Flow::Continue(update) => {
                if update.needs_redraw() {
                    terminal.draw(|f| f.render_widget(&*session, f.area()))?;
                }
            }
        }
    }

    Ok(())
}

fn open_in_browser(url: &str) {
    if !Browser::is_available() {
        warn!("no browser available to open {}", url);
        return;
    }
    match webbrowser::open(url) {
        Ok(()) => info!("opened {} in browser", url),
        Err(e) => warn!("could not open {}: {}", url, e),
    }
}
