use crate::content::ContentLibrary;
use crate::session::{
    ChallengeKind, ConfigPatch, ModeState, Session, Snapshot, Status, TestConfig,
};
use crate::stats;

/// Wall-clock interval between logical ticks, in milliseconds.
pub const TICK_RATE_MS: u64 = 100;

/// Logical time one tick advances.
pub const TICK_SECS: f64 = TICK_RATE_MS as f64 / 1000.0;

/// Per-word countdown for challenge sessions in the typing sub-mode.
pub const CHALLENGE_TIME_LIMIT_SECS: f64 = 5.0;

/// Handle returned by [`Engine::subscribe`]; pass it back to
/// [`Engine::unsubscribe`] to stop receiving snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

type Observer = Box<dyn FnMut(&Snapshot)>;

/// The session engine: owns exactly one live [`Session`], applies events to
/// it one at a time (input, ticks, lifecycle calls), and pushes a fresh
/// [`Snapshot`] to every registered observer after each mutation.
///
/// The engine holds no timer and never reads the wall clock; the host is
/// expected to call [`Engine::tick`] every [`TICK_RATE_MS`] while a session
/// runs. Ticks outside the running state are ignored, so a stale or extra
/// tick source can never corrupt a session.
pub struct Engine {
    session: Session,
    library: ContentLibrary,
    observers: Vec<(u64, Observer)>,
    next_observer_id: u64,
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(TestConfig::default())
    }

    pub fn with_config(config: TestConfig) -> Self {
        let library = ContentLibrary::load();
        let session = Session::prepare(config, &library);

        Self {
            session,
            library,
            observers: Vec::new(),
            next_observer_id: 0,
        }
    }

    pub fn config(&self) -> TestConfig {
        self.session.config
    }

    /// Current state as an owned, flattened copy.
    pub fn snapshot(&self) -> Snapshot {
        self.session.snapshot()
    }

    /// Register an observer. It is called once immediately with the current
    /// snapshot, then after every mutation, until unsubscribed.
    pub fn subscribe<F>(&mut self, mut observer: F) -> Subscription
    where
        F: FnMut(&Snapshot) + 'static,
    {
        observer(&self.session.snapshot());

        let id = self.next_observer_id;
        self.next_observer_id += 1;
        self.observers.push((id, Box::new(observer)));

        Subscription(id)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) {
        self.observers.retain(|(id, _)| *id != subscription.0);
    }

    /// Merge a partial config and rebuild: the current session is discarded
    /// and a fresh idle one is generated for the merged config.
    pub fn configure(&mut self, patch: ConfigPatch) {
        let config = self.session.config.apply(patch);
        self.session = Session::prepare(config, &self.library);
        self.notify();
    }

    /// Rebuild a fresh idle session with the current config and regenerated
    /// content.
    pub fn reset(&mut self) {
        self.session = Session::prepare(self.session.config, &self.library);
        self.notify();
    }

    /// Begin the session: idle becomes running. A no-op in any other state,
    /// so calling it repeatedly cannot speed up time or revive a finished
    /// session.
    pub fn start(&mut self) {
        if self.session.status != Status::Idle {
            return;
        }

        self.session.status = Status::Running;
        self.notify();
    }

    /// Apply one input event. `input` is always the entire current input
    /// string, never a delta.
    pub fn handle_input(&mut self, input: &str) {
        if self.session.status == Status::Finished {
            return;
        }
        if self.session.waiting_for_audio() {
            return;
        }
        if self.session.status == Status::Idle {
            if input.is_empty() {
                return;
            }
            self.start();
        }

        let is_challenge = self.session.is_challenge();
        let delta = stats::diff_input(&self.session.input, input, &self.session.text);
        let prev_chars = self.session.input_chars();
        let new_chars = input.chars().count();

        // Backspace outside challenge mode: accept the shorter input and
        // refresh stats, nothing else. Challenge mode deliberately takes the
        // general path below so an edited word still hits the exact-match
        // check.
        if !is_challenge && new_chars < prev_chars {
            self.session.input = input.to_string();
            self.recompute_stats();
            self.notify();
            return;
        }

        // Overtyping past the target is rejected without a notification.
        if new_chars > self.session.text_chars() {
            return;
        }

        if delta.grew {
            self.session.stats.keystrokes += 1;

            if !is_challenge && delta.completed_word {
                self.session.stats.words_completed += 1;
                if self.session.stats.words_completed % 5 == 0 {
                    self.session.stats.combo += 1;
                }
            }
        }

        self.session.input = input.to_string();

        if is_challenge {
            if self.session.input == self.session.text {
                self.session.stats.words_completed += 1;
                self.session.stats.combo += 1;

                if let ModeState::Challenge {
                    solved,
                    revealed: false,
                    ..
                } = &mut self.session.mode
                {
                    // Revealed words advance without scoring
                    *solved += 1;
                }

                self.next_challenge_word();
                return;
            }
        } else if self.session.input_chars() == self.session.text_chars() {
            self.finish();
            return;
        }

        self.recompute_stats();
        self.notify();
    }

    /// Release the waiting-for-audio gate for the current listening word.
    /// Only meaningful in a challenge+listening session that has not
    /// finished.
    pub fn start_challenge_word(&mut self) {
        if self.session.status == Status::Finished {
            return;
        }

        match &mut self.session.mode {
            ModeState::Challenge {
                kind: ChallengeKind::Listening,
                waiting_for_audio,
                ..
            } => *waiting_for_audio = false,
            _ => return,
        }

        if self.session.status == Status::Idle {
            self.start();
        } else {
            self.notify();
        }
    }

    /// Show the hidden listening word at the cost of one life. The word
    /// still has to be typed in full to advance; its score point is
    /// forfeited.
    pub fn reveal_challenge_word(&mut self) {
        if self.session.status == Status::Finished {
            return;
        }

        let exhausted = match &mut self.session.mode {
            ModeState::Challenge {
                kind: ChallengeKind::Listening,
                revealed,
                lives,
                ..
            } => {
                if *revealed {
                    return;
                }
                *lives -= 1;
                *lives <= 0
            }
            _ => return,
        };

        if exhausted {
            self.finish();
            return;
        }

        if let ModeState::Challenge {
            revealed,
            waiting_for_audio,
            ..
        } = &mut self.session.mode
        {
            *revealed = true;
            *waiting_for_audio = false;
        }

        if self.session.status == Status::Idle {
            self.start();
        }
        self.notify();
    }

    /// Advance logical time by one tick. Ignored unless running; frozen
    /// entirely while a listening word waits for playback.
    pub fn tick(&mut self) {
        if self.session.status != Status::Running {
            return;
        }
        if self.session.waiting_for_audio() {
            return;
        }

        self.session.elapsed_secs += TICK_SECS;

        let mut time_exhausted = false;
        if let ModeState::Time { time_left } = &mut self.session.mode {
            *time_left -= TICK_SECS;
            time_exhausted = *time_left <= 0.0;
        }
        if time_exhausted {
            self.finish();
            return;
        }

        let mut word_timed_out = false;
        if let ModeState::Challenge {
            kind: ChallengeKind::Typing,
            word_timer,
            ..
        } = &mut self.session.mode
        {
            *word_timer -= TICK_SECS;
            word_timed_out = *word_timer <= 0.0;
        }
        if word_timed_out && self.fail_challenge_word() {
            return;
        }

        self.recompute_stats();
        self.notify();
    }

    /// A word failed (timeout). Returns true when this exhausted the lives
    /// and finished the session.
    fn fail_challenge_word(&mut self) -> bool {
        let exhausted = match &mut self.session.mode {
            ModeState::Challenge { lives, .. } => {
                *lives -= 1;
                *lives <= 0
            }
            _ => return false,
        };

        if exhausted {
            self.finish();
            true
        } else {
            self.next_challenge_word();
            false
        }
    }

    fn next_challenge_word(&mut self) {
        self.session.advance_challenge(&self.library);
        self.notify();
    }

    fn finish(&mut self) {
        self.session.status = Status::Finished;
        self.recompute_stats();
        self.notify();
    }

    fn recompute_stats(&mut self) {
        let session = &mut self.session;
        session
            .stats
            .recompute(&session.input, &session.text, session.elapsed_secs);
    }

    fn notify(&mut self) {
        let snapshot = self.session.snapshot();
        for (_, observer) in self.observers.iter_mut() {
            observer(&snapshot);
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
