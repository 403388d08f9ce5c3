pub mod app_dirs;
pub mod config;
pub mod content;
pub mod engine;
pub mod records;
pub mod runtime;
pub mod session;
pub mod speech;
pub mod stats;
pub mod ui;
pub mod util;

use crate::config::{AppConfig, ConfigStore, FileConfigStore};
use crate::engine::Engine;
use crate::records::{BestRecord, FileRecordStore, RecordBook, RecordStore, SessionLog};
use crate::runtime::AppEvent;
use crate::session::{
    ChallengeKind, ConfigPatch, EssayCategory, Mode, Snapshot, Status, TestConfig,
};
use crate::speech::{Narrator, SilentNarrator, SystemNarrator};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    sync::mpsc::{self, Receiver},
    thread,
    time::Duration,
};
use webbrowser::Browser;

/// typing drills in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Typing drills in the terminal: timed runs, fixed word counts, IELTS essay transcription, and word challenges with spoken playback."
)]
pub struct Cli {
    /// run a timed drill of this many seconds
    #[clap(short = 's', long)]
    seconds: Option<u64>,

    /// run a drill over this many words
    #[clap(short = 'w', long)]
    words: Option<usize>,

    /// transcribe an ielts essay, optionally from one task category
    #[clap(short = 'e', long, value_enum, num_args = 0..=1, default_missing_value = "all")]
    essay: Option<EssayCategory>,

    /// word challenge against a per-word timer; listening hides the word
    #[clap(short = 'c', long, value_enum)]
    challenge: Option<ChallengeKind>,

    /// do not read or write records, the session log, or saved config
    #[clap(long)]
    no_history: bool,

    /// disable spoken playback of challenge words
    #[clap(long)]
    mute: bool,
}

impl Cli {
    /// Mode flags beat each other in order: challenge > essay > words >
    /// seconds; every flag given still updates its own parameter, so a
    /// losing flag takes effect on the next mode switch. No flag means the
    /// persisted config runs unchanged.
    fn config_patch(&self) -> Option<ConfigPatch> {
        let mode = if self.challenge.is_some() {
            Mode::Challenge
        } else if self.essay.is_some() {
            Mode::Ielts
        } else if self.words.is_some() {
            Mode::Words
        } else if self.seconds.is_some() {
            Mode::Time
        } else {
            return None;
        };

        Some(ConfigPatch {
            mode: Some(mode),
            duration_secs: self.seconds,
            word_count: self.words,
            essay_category: self.essay,
            challenge_kind: self.challenge,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Typing,
    Results,
}

/// Everything the app persists between runs. Absent entirely under
/// `--no-history`.
pub struct History {
    pub book: RecordBook,
    pub store: FileRecordStore,
    pub log: SessionLog,
    pub config_store: FileConfigStore,
}

impl History {
    fn open() -> Self {
        let store = FileRecordStore::new();
        Self {
            book: store.load(),
            store,
            log: SessionLog::new(),
            config_store: FileConfigStore::new(),
        }
    }
}

const TIME_PRESETS: [u64; 3] = [30, 60, 120];
const WORD_PRESETS: [usize; 4] = [10, 25, 50, 100];

pub struct App {
    pub engine: Engine,
    pub snapshot: Snapshot,
    pub state: AppState,
    pub app_config: AppConfig,
    pub history: Option<History>,
    pub narrator: Box<dyn Narrator>,
    /// Finished snapshot the results screen renders from; live `snapshot`
    /// keeps moving once the next session is configured.
    pub results: Option<Snapshot>,
    pub new_best: bool,
    pub previous_best: Option<BestRecord>,
    finished_rx: Receiver<Snapshot>,
}

impl App {
    pub fn new(cli: &Cli) -> Self {
        let history = if cli.no_history {
            None
        } else {
            Some(History::open())
        };

        let mut app_config = history
            .as_ref()
            .map(|h| h.config_store.load())
            .unwrap_or_default();
        if let Some(patch) = cli.config_patch() {
            app_config.test = app_config.test.apply(patch);
        }

        let narrator: Box<dyn Narrator> = if cli.mute || !app_config.speak_words {
            Box::new(SilentNarrator)
        } else {
            match SystemNarrator::detect() {
                Some(n) => Box::new(n),
                None => Box::new(SilentNarrator),
            }
        };

        Self::with_parts(app_config.test, app_config, history, narrator)
    }

    pub fn with_parts(
        test: TestConfig,
        app_config: AppConfig,
        history: Option<History>,
        narrator: Box<dyn Narrator>,
    ) -> Self {
        let mut engine = Engine::with_config(test);
        let (tx, finished_rx) = mpsc::channel();
        let _ = engine.subscribe(move |snapshot| {
            if snapshot.status == Status::Finished {
                let _ = tx.send(snapshot.clone());
            }
        });
        let snapshot = engine.snapshot();

        Self {
            engine,
            snapshot,
            state: AppState::Typing,
            app_config,
            history,
            narrator,
            results: None,
            new_best: false,
            previous_best: None,
            finished_rx,
        }
    }

    /// History-free app used by tests and render checks.
    pub fn headless(test: TestConfig) -> Self {
        Self::with_parts(test, AppConfig::default(), None, Box::new(SilentNarrator))
    }

    /// Refresh the cached snapshot and absorb any finish that the last
    /// engine call produced.
    pub fn sync(&mut self) {
        self.snapshot = self.engine.snapshot();
        while let Ok(finished) = self.finished_rx.try_recv() {
            self.on_finish(finished);
        }
    }

    fn on_finish(&mut self, snapshot: Snapshot) {
        self.state = AppState::Results;
        self.new_best = false;
        self.previous_best = None;

        if self.app_config.save_history {
            if let Some(history) = &mut self.history {
                self.previous_best = history.book.best_for(&snapshot.config).cloned();
                self.new_best = history.book.submit(&snapshot);
                let _ = history.store.save(&history.book);
                let _ = history.log.append(&snapshot);
            }
        }

        self.app_config.test = snapshot.config;
        self.persist_config();
        self.results = Some(snapshot);
    }

    fn persist_config(&self) {
        if !self.app_config.save_history {
            return;
        }
        if let Some(history) = &self.history {
            let _ = history.config_store.save(&self.app_config);
        }
    }

    pub fn on_tick(&mut self) {
        self.engine.tick();
        self.sync();
    }

    pub fn type_char(&mut self, c: char) {
        let mut next = self.snapshot.input.clone();
        next.push(c);
        self.engine.handle_input(&next);
        self.sync();
    }

    pub fn backspace(&mut self) {
        let mut chars: Vec<char> = self.snapshot.input.chars().collect();
        chars.pop();
        let next: String = chars.into_iter().collect();
        self.engine.handle_input(&next);
        self.sync();
    }

    /// Speak the current listening word and release its input gate. Pressing
    /// enter again replays the word.
    pub fn play_word(&mut self) {
        if self.snapshot.config.mode != Mode::Challenge
            || self.snapshot.config.challenge_kind != ChallengeKind::Listening
        {
            return;
        }
        let word = self.snapshot.text.clone();
        self.narrator.speak(&word);
        self.engine.start_challenge_word();
        self.sync();
    }

    pub fn reveal(&mut self) {
        self.engine.reveal_challenge_word();
        self.sync();
    }

    /// Fresh session with the current config and regenerated text.
    pub fn retry(&mut self) {
        self.engine.reset();
        self.state = AppState::Typing;
        self.results = None;
        self.new_best = false;
        self.previous_best = None;
        self.sync();
    }

    pub fn cycle_mode(&mut self) {
        let next = match self.engine.config().mode {
            Mode::Time => Mode::Words,
            Mode::Words => Mode::Ielts,
            Mode::Ielts => Mode::Challenge,
            Mode::Challenge => Mode::Time,
        };
        self.reconfigure(ConfigPatch {
            mode: Some(next),
            ..ConfigPatch::default()
        });
    }

    /// Cycle the active mode's parameter: time and word presets wrap
    /// around, essay categories walk the bank, challenge kinds toggle.
    pub fn cycle_param(&mut self) {
        let config = self.engine.config();
        let patch = match config.mode {
            Mode::Time => ConfigPatch {
                duration_secs: Some(next_preset(&TIME_PRESETS, config.duration_secs)),
                ..ConfigPatch::default()
            },
            Mode::Words => ConfigPatch {
                word_count: Some(next_preset(&WORD_PRESETS, config.word_count)),
                ..ConfigPatch::default()
            },
            Mode::Ielts => {
                let next = match config.essay_category {
                    EssayCategory::All => EssayCategory::Opinion,
                    EssayCategory::Opinion => EssayCategory::Discussion,
                    EssayCategory::Discussion => EssayCategory::ProblemSolution,
                    EssayCategory::ProblemSolution => EssayCategory::AdvantagesDisadvantages,
                    EssayCategory::AdvantagesDisadvantages => EssayCategory::DirectQuestion,
                    EssayCategory::DirectQuestion => EssayCategory::All,
                };
                ConfigPatch {
                    essay_category: Some(next),
                    ..ConfigPatch::default()
                }
            }
            Mode::Challenge => {
                let next = match config.challenge_kind {
                    ChallengeKind::Listening => ChallengeKind::Typing,
                    ChallengeKind::Typing => ChallengeKind::Listening,
                };
                ConfigPatch {
                    challenge_kind: Some(next),
                    ..ConfigPatch::default()
                }
            }
        };
        self.reconfigure(patch);
    }

    fn reconfigure(&mut self, patch: ConfigPatch) {
        self.engine.configure(patch);
        self.sync();
        self.app_config.test = self.engine.config();
        self.persist_config();
    }

    pub fn tweet(&self) {
        if !Browser::is_available() {
            return;
        }
        if let Some(results) = &self.results {
            webbrowser::open(&format!(
                "https://twitter.com/intent/tweet?text={}%20wpm%20%2F%20{}%25%20acc%20%2F%20{}%20pts",
                results.stats.wpm,
                results.stats.accuracy,
                stats::score(results)
            ))
            .unwrap_or_default();
        }
    }
}

fn next_preset<T: Copy + PartialEq>(presets: &[T], current: T) -> T {
    match presets.iter().position(|p| *p == current) {
        Some(i) => presets[(i + 1) % presets.len()],
        None => presets[0],
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin is not a tty").exit();
    }

    let mut app = App::new(&cli);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let events = get_app_events();

    loop {
        terminal.draw(|f| ui(app, f))?;

        match events.recv()? {
            AppEvent::Tick => {
                app.on_tick();
            }
            AppEvent::Resize => {}
            AppEvent::Key(key) => match key.code {
                KeyCode::Esc => break,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                KeyCode::Backspace => {
                    if app.state == AppState::Typing {
                        app.backspace();
                    }
                }
                KeyCode::Enter => {
                    if app.state == AppState::Typing {
                        app.play_word();
                    }
                }
                KeyCode::Tab => {
                    if app.state == AppState::Typing {
                        app.reveal();
                    }
                }
                KeyCode::Left => {
                    app.retry();
                }
                KeyCode::Char(c) => match app.state {
                    AppState::Typing => app.type_char(c),
                    AppState::Results => match c {
                        'r' => app.retry(),
                        'm' => app.cycle_mode(),
                        'c' => app.cycle_param(),
                        't' => app.tweet(),
                        _ => {}
                    },
                },
                _ => {}
            },
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

/// One channel fed by two threads: a fixed-cadence tick source and the
/// crossterm reader. Ticks keep flowing while keys arrive, which is what
/// keeps session time honest during fast typing.
fn get_app_events() -> mpsc::Receiver<AppEvent> {
    let (tx, rx) = mpsc::channel();

    let tick_tx = tx.clone();
    thread::spawn(move || loop {
        if tick_tx.send(AppEvent::Tick).is_err() {
            break;
        }

        thread::sleep(Duration::from_millis(engine::TICK_RATE_MS))
    });

    thread::spawn(move || loop {
        let evt = match event::read() {
            Ok(Event::Key(key)) => Some(AppEvent::Key(key)),
            Ok(Event::Resize(_, _)) => Some(AppEvent::Resize),
            Ok(_) => None,
            Err(_) => break,
        };

        if let Some(evt) = evt {
            if tx.send(evt).is_err() {
                break;
            }
        }
    });

    rx
}
