use crate::content::{self, ContentLibrary};
use crate::engine::CHALLENGE_TIME_LIMIT_SECS;
use crate::stats::Stats;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[strum(serialize = "time")]
    Time,
    #[strum(serialize = "words")]
    Words,
    #[strum(serialize = "ielts")]
    Ielts,
    #[strum(serialize = "challenge")]
    Challenge,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeKind {
    #[strum(serialize = "listening")]
    Listening,
    #[strum(serialize = "typing")]
    Typing,
}

impl ChallengeKind {
    /// Failure budget for a fresh challenge session. Listening is more
    /// forgiving because the word is hidden.
    pub fn initial_lives(&self) -> i32 {
        match self {
            ChallengeKind::Listening => 5,
            ChallengeKind::Typing => 3,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
pub enum EssayCategory {
    #[serde(rename = "All")]
    #[strum(serialize = "All")]
    All,
    #[serde(rename = "Opinion")]
    #[strum(serialize = "Opinion")]
    Opinion,
    #[serde(rename = "Discussion")]
    #[strum(serialize = "Discussion")]
    Discussion,
    #[serde(rename = "Problem Solution")]
    #[strum(serialize = "Problem Solution")]
    ProblemSolution,
    #[serde(rename = "Advantages Disadvantages")]
    #[strum(serialize = "Advantages Disadvantages")]
    AdvantagesDisadvantages,
    #[serde(rename = "Direct Question")]
    #[strum(serialize = "Direct Question")]
    DirectQuestion,
}

/// Per-session configuration. Only the parameter matching `mode` is
/// semantically active; the rest ride along so switching modes keeps the
/// last-used values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    pub mode: Mode,
    pub duration_secs: u64,
    pub word_count: usize,
    pub essay_category: EssayCategory,
    pub challenge_kind: ChallengeKind,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Time,
            duration_secs: 60,
            word_count: 50,
            essay_category: EssayCategory::All,
            challenge_kind: ChallengeKind::Listening,
        }
    }
}

impl TestConfig {
    /// Merge a partial update into this config, yielding the config for the
    /// next session. `None` fields keep their current value.
    pub fn apply(&self, patch: ConfigPatch) -> Self {
        Self {
            mode: patch.mode.unwrap_or(self.mode),
            duration_secs: patch.duration_secs.unwrap_or(self.duration_secs),
            word_count: patch.word_count.unwrap_or(self.word_count),
            essay_category: patch.essay_category.unwrap_or(self.essay_category),
            challenge_kind: patch.challenge_kind.unwrap_or(self.challenge_kind),
        }
    }
}

/// All-optional mirror of `TestConfig` for partial reconfiguration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigPatch {
    pub mode: Option<Mode>,
    pub duration_secs: Option<u64>,
    pub word_count: Option<usize>,
    pub essay_category: Option<EssayCategory>,
    pub challenge_kind: Option<ChallengeKind>,
}

impl ConfigPatch {
    pub fn timed(duration_secs: u64) -> Self {
        Self {
            mode: Some(Mode::Time),
            duration_secs: Some(duration_secs),
            ..Self::default()
        }
    }

    pub fn words(word_count: usize) -> Self {
        Self {
            mode: Some(Mode::Words),
            word_count: Some(word_count),
            ..Self::default()
        }
    }

    pub fn essay(category: EssayCategory) -> Self {
        Self {
            mode: Some(Mode::Ielts),
            essay_category: Some(category),
            ..Self::default()
        }
    }

    pub fn challenge(kind: ChallengeKind) -> Self {
        Self {
            mode: Some(Mode::Challenge),
            challenge_kind: Some(kind),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Running,
    Finished,
}

/// Mode-specific session state; each variant carries only what its mode
/// needs.
#[derive(Debug, Clone, PartialEq)]
pub enum ModeState {
    Time {
        time_left: f64,
    },
    Words,
    Ielts {
        prompt: String,
    },
    Challenge {
        kind: ChallengeKind,
        lives: i32,
        word_timer: f64,
        solved: u32,
        waiting_for_audio: bool,
        revealed: bool,
    },
}

/// One practice session from idle to finished. Owned exclusively by the
/// engine; discarded wholesale on reset or reconfiguration.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub status: Status,
    pub config: TestConfig,
    pub text: String,
    pub input: String,
    pub elapsed_secs: f64,
    pub mode: ModeState,
    pub stats: Stats,
}

impl Session {
    /// Build a fresh idle session for `config`, generating its target text
    /// from the library.
    pub fn prepare(config: TestConfig, library: &ContentLibrary) -> Self {
        let (text, mode) = match config.mode {
            Mode::Time => (
                library.random_words(content::time_mode_word_count(config.duration_secs)),
                ModeState::Time {
                    time_left: config.duration_secs as f64,
                },
            ),
            Mode::Words => (library.random_words(config.word_count), ModeState::Words),
            Mode::Ielts => {
                let task = library.pick_essay(config.essay_category);
                (
                    task.text.clone(),
                    ModeState::Ielts {
                        prompt: task.prompt.clone(),
                    },
                )
            }
            Mode::Challenge => {
                let kind = config.challenge_kind;
                (
                    library.random_word(),
                    ModeState::Challenge {
                        kind,
                        lives: kind.initial_lives(),
                        word_timer: CHALLENGE_TIME_LIMIT_SECS,
                        solved: 0,
                        waiting_for_audio: kind == ChallengeKind::Listening,
                        revealed: false,
                    },
                )
            }
        };

        Self {
            status: Status::Idle,
            config,
            text,
            input: String::new(),
            elapsed_secs: 0.0,
            mode,
            stats: Stats::default(),
        }
    }

    /// Swap in the next challenge word: new target, cleared input, timer
    /// back to the limit, reveal cleared; listening re-enters the
    /// waiting-for-audio gate.
    pub fn advance_challenge(&mut self, library: &ContentLibrary) {
        if let ModeState::Challenge {
            kind,
            word_timer,
            waiting_for_audio,
            revealed,
            ..
        } = &mut self.mode
        {
            *word_timer = CHALLENGE_TIME_LIMIT_SECS;
            *revealed = false;
            if *kind == ChallengeKind::Listening {
                *waiting_for_audio = true;
            }
        } else {
            return;
        }

        self.text = library.random_word();
        self.input.clear();
    }

    pub fn is_challenge(&self) -> bool {
        matches!(self.mode, ModeState::Challenge { .. })
    }

    pub fn waiting_for_audio(&self) -> bool {
        matches!(
            self.mode,
            ModeState::Challenge {
                waiting_for_audio: true,
                ..
            }
        )
    }

    pub fn text_chars(&self) -> usize {
        self.text.chars().count()
    }

    pub fn input_chars(&self) -> usize {
        self.input.chars().count()
    }

    /// Deep-copied, flattened view of the session for observers and the UI.
    /// Fields of inactive modes read as zero/false/empty.
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot {
            status: self.status,
            config: self.config,
            text: self.text.clone(),
            input: self.input.clone(),
            essay_prompt: None,
            time_left: 0.0,
            elapsed_secs: self.elapsed_secs,
            lives: 0,
            word_timer: 0.0,
            solved_words: 0,
            waiting_for_audio: false,
            revealed: false,
            stats: self.stats,
        };

        match &self.mode {
            ModeState::Time { time_left } => snapshot.time_left = *time_left,
            ModeState::Words => {}
            ModeState::Ielts { prompt } => snapshot.essay_prompt = Some(prompt.clone()),
            ModeState::Challenge {
                lives,
                word_timer,
                solved,
                waiting_for_audio,
                revealed,
                ..
            } => {
                snapshot.lives = *lives;
                snapshot.word_timer = *word_timer;
                snapshot.solved_words = *solved;
                snapshot.waiting_for_audio = *waiting_for_audio;
                snapshot.revealed = *revealed;
            }
        }

        snapshot
    }
}

/// What subscribers receive after every mutation: an owned copy that never
/// aliases engine internals.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub status: Status,
    pub config: TestConfig,
    pub text: String,
    pub input: String,
    pub essay_prompt: Option<String>,
    pub time_left: f64,
    pub elapsed_secs: f64,
    pub lives: i32,
    pub word_timer: f64,
    pub solved_words: u32,
    pub waiting_for_audio: bool,
    pub revealed: bool,
    pub stats: Stats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn library() -> ContentLibrary {
        ContentLibrary::load()
    }

    #[test]
    fn test_default_config() {
        let config = TestConfig::default();

        assert_eq!(config.mode, Mode::Time);
        assert_eq!(config.duration_secs, 60);
        assert_eq!(config.word_count, 50);
        assert_eq!(config.essay_category, EssayCategory::All);
        assert_eq!(config.challenge_kind, ChallengeKind::Listening);
    }

    #[test]
    fn test_apply_empty_patch_keeps_config() {
        let config = TestConfig::default();

        assert_eq!(config.apply(ConfigPatch::default()), config);
    }

    #[test]
    fn test_apply_patch_merges_fields() {
        let config = TestConfig::default();
        let merged = config.apply(ConfigPatch {
            mode: Some(Mode::Words),
            word_count: Some(10),
            ..ConfigPatch::default()
        });

        assert_eq!(merged.mode, Mode::Words);
        assert_eq!(merged.word_count, 10);
        // untouched fields survive
        assert_eq!(merged.duration_secs, 60);
        assert_eq!(merged.essay_category, EssayCategory::All);
    }

    #[test]
    fn test_patch_helpers_set_mode_and_param() {
        let config = TestConfig::default();

        let timed = config.apply(ConfigPatch::timed(30));
        assert_eq!(timed.mode, Mode::Time);
        assert_eq!(timed.duration_secs, 30);

        let words = config.apply(ConfigPatch::words(25));
        assert_eq!(words.mode, Mode::Words);
        assert_eq!(words.word_count, 25);

        let essay = config.apply(ConfigPatch::essay(EssayCategory::Opinion));
        assert_eq!(essay.mode, Mode::Ielts);
        assert_eq!(essay.essay_category, EssayCategory::Opinion);

        let challenge = config.apply(ConfigPatch::challenge(ChallengeKind::Typing));
        assert_eq!(challenge.mode, Mode::Challenge);
        assert_eq!(challenge.challenge_kind, ChallengeKind::Typing);
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = TestConfig {
            mode: Mode::Ielts,
            essay_category: EssayCategory::ProblemSolution,
            ..TestConfig::default()
        };

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"ielts\""));
        assert!(json.contains("\"Problem Solution\""));

        let back: TestConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_fresh_session_is_idle_and_clean() {
        let library = library();

        for config in [
            TestConfig::default(),
            TestConfig {
                mode: Mode::Words,
                ..TestConfig::default()
            },
            TestConfig {
                mode: Mode::Ielts,
                ..TestConfig::default()
            },
            TestConfig {
                mode: Mode::Challenge,
                ..TestConfig::default()
            },
        ] {
            let session = Session::prepare(config, &library);

            assert_eq!(session.status, Status::Idle);
            assert_eq!(session.input, "");
            assert_eq!(session.elapsed_secs, 0.0);
            assert_eq!(session.stats.accuracy, 100);
            assert_eq!(session.stats.combo, 0);
            assert!(!session.text.is_empty());
        }
    }

    #[test]
    fn test_time_session_sizing() {
        let library = library();
        let config = TestConfig {
            mode: Mode::Time,
            duration_secs: 30,
            ..TestConfig::default()
        };
        let session = Session::prepare(config, &library);

        assert_eq!(session.text.split(' ').count(), 100);
        assert_matches!(session.mode, ModeState::Time { time_left } if time_left == 30.0);
    }

    #[test]
    fn test_words_session_sizing() {
        let library = library();
        let config = TestConfig {
            mode: Mode::Words,
            word_count: 12,
            ..TestConfig::default()
        };
        let session = Session::prepare(config, &library);

        assert_eq!(session.text.split(' ').count(), 12);
        assert_eq!(session.mode, ModeState::Words);
    }

    #[test]
    fn test_ielts_session_carries_prompt() {
        let library = library();
        let config = TestConfig {
            mode: Mode::Ielts,
            essay_category: EssayCategory::Discussion,
            ..TestConfig::default()
        };
        let session = Session::prepare(config, &library);

        assert_matches!(&session.mode, ModeState::Ielts { prompt } if !prompt.is_empty());
        assert!(session.text.len() > 500);
    }

    #[test]
    fn test_challenge_session_lives_and_gating() {
        let library = library();

        let listening = Session::prepare(
            TestConfig {
                mode: Mode::Challenge,
                challenge_kind: ChallengeKind::Listening,
                ..TestConfig::default()
            },
            &library,
        );
        assert_matches!(
            listening.mode,
            ModeState::Challenge {
                lives: 5,
                waiting_for_audio: true,
                revealed: false,
                solved: 0,
                ..
            }
        );
        assert!(!listening.text.contains(' '));

        let typing = Session::prepare(
            TestConfig {
                mode: Mode::Challenge,
                challenge_kind: ChallengeKind::Typing,
                ..TestConfig::default()
            },
            &library,
        );
        assert_matches!(
            typing.mode,
            ModeState::Challenge {
                lives: 3,
                waiting_for_audio: false,
                ..
            }
        );
    }

    #[test]
    fn test_snapshot_flattens_inactive_fields_to_zero() {
        let library = library();
        let session = Session::prepare(TestConfig::default(), &library);
        let snapshot = session.snapshot();

        assert_eq!(snapshot.time_left, 60.0);
        assert_eq!(snapshot.lives, 0);
        assert_eq!(snapshot.word_timer, 0.0);
        assert_eq!(snapshot.solved_words, 0);
        assert!(!snapshot.waiting_for_audio);
        assert!(!snapshot.revealed);
        assert_eq!(snapshot.essay_prompt, None);
    }

    #[test]
    fn test_snapshot_is_a_deep_copy() {
        let library = library();
        let mut session = Session::prepare(TestConfig::default(), &library);
        let snapshot = session.snapshot();

        session.input.push('x');
        session.text.clear();

        assert_eq!(snapshot.input, "");
        assert!(!snapshot.text.is_empty());
    }

    #[test]
    fn test_advance_challenge_resets_word_state() {
        let library = library();
        let config = TestConfig {
            mode: Mode::Challenge,
            challenge_kind: ChallengeKind::Listening,
            ..TestConfig::default()
        };
        let mut session = Session::prepare(config, &library);

        session.input = "half".to_string();
        if let ModeState::Challenge {
            word_timer,
            waiting_for_audio,
            revealed,
            ..
        } = &mut session.mode
        {
            *word_timer = 0.7;
            *waiting_for_audio = false;
            *revealed = true;
        }

        session.advance_challenge(&library);

        assert_eq!(session.input, "");
        assert!(library.knows_word(&session.text));
        assert_matches!(
            session.mode,
            ModeState::Challenge {
                word_timer,
                waiting_for_audio: true,
                revealed: false,
                ..
            } if word_timer == CHALLENGE_TIME_LIMIT_SECS
        );
    }

    #[test]
    fn test_advance_challenge_outside_challenge_is_noop() {
        let library = library();
        let mut session = Session::prepare(TestConfig::default(), &library);
        let text_before = session.text.clone();

        session.advance_challenge(&library);

        assert_eq!(session.text, text_before);
    }

    #[test]
    fn test_initial_lives() {
        assert_eq!(ChallengeKind::Listening.initial_lives(), 5);
        assert_eq!(ChallengeKind::Typing.initial_lives(), 3);
    }

    #[test]
    fn test_mode_display_tokens() {
        assert_eq!(Mode::Time.to_string(), "time");
        assert_eq!(Mode::Ielts.to_string(), "ielts");
        assert_eq!(ChallengeKind::Listening.to_string(), "listening");
        assert_eq!(
            EssayCategory::AdvantagesDisadvantages.to_string(),
            "Advantages Disadvantages"
        );
    }
}
