use crate::session::{Mode, Snapshot};

/// Floor for elapsed time so WPM never divides by zero at t=0.
const MIN_ELAPSED_SECS: f64 = 0.001;

/// Live statistics for one session. `keystrokes`, `words_completed` and
/// `combo` accumulate; everything else is recomputed from scratch on each
/// update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub wpm: u32,
    pub accuracy: u32,
    pub correct_chars: usize,
    pub incorrect_chars: usize,
    pub keystrokes: u32,
    pub combo: u32,
    pub words_completed: u32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            wpm: 0,
            accuracy: 100,
            correct_chars: 0,
            incorrect_chars: 0,
            keystrokes: 0,
            combo: 0,
            words_completed: 0,
        }
    }
}

impl Stats {
    /// Refresh the derived fields from the current input, target and elapsed
    /// time. The accumulated counters are left alone.
    pub fn recompute(&mut self, input: &str, target: &str, elapsed_secs: f64) {
        let (correct, incorrect) = char_comparison(input, target);

        self.correct_chars = correct;
        self.incorrect_chars = incorrect;
        self.wpm = wpm(correct, elapsed_secs);
        self.accuracy = accuracy(correct, input.chars().count());
    }
}

/// Position-by-position comparison of `input` against `target`, up to the
/// input length. Characters past the end of the target count as incorrect.
pub fn char_comparison(input: &str, target: &str) -> (usize, usize) {
    let mut correct = 0;
    let mut incorrect = 0;
    let mut target_chars = target.chars();

    for c in input.chars() {
        match target_chars.next() {
            Some(t) if t == c => correct += 1,
            _ => incorrect += 1,
        }
    }

    (correct, incorrect)
}

/// Net words per minute using the 5-characters-per-word convention, floored
/// at zero and rounded to the nearest integer.
pub fn wpm(correct_chars: usize, elapsed_secs: f64) -> u32 {
    let minutes = elapsed_secs.max(MIN_ELAPSED_SECS) / 60.0;
    let net = (correct_chars as f64 / 5.0) / minutes;

    net.max(0.0).round() as u32
}

/// Percentage of typed characters that match the target; 100 before any
/// typing.
pub fn accuracy(correct_chars: usize, input_chars: usize) -> u32 {
    if input_chars == 0 {
        return 100;
    }

    (correct_chars as f64 / input_chars as f64 * 100.0).round() as u32
}

/// What one input event did, as a pure function of the previous input, the
/// new input and the target text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputDelta {
    /// The input grew (char count strictly increased).
    pub grew: bool,
    /// The newly reached position sits on a word boundary: the target
    /// character there is a space, or it is the final character of the
    /// whole target.
    pub completed_word: bool,
}

pub fn diff_input(prev: &str, new: &str, target: &str) -> InputDelta {
    let prev_len = prev.chars().count();
    let new_len = new.chars().count();
    let grew = new_len > prev_len;

    if !grew || new_len == 0 {
        return InputDelta {
            grew,
            completed_word: false,
        };
    }

    let last_index = new_len - 1;
    let target_len = target.chars().count();
    let completed_word = target.chars().nth(last_index) == Some(' ')
        || (target_len > 0 && last_index == target_len - 1);

    InputDelta {
        grew,
        completed_word,
    }
}

/// Session score shown on the results screen and recorded in history:
/// challenge sessions score one point per word solved without a reveal;
/// every other mode scores `combo * 10 - incorrect`, which can go negative.
pub fn score(snapshot: &Snapshot) -> i64 {
    match snapshot.config.mode {
        Mode::Challenge => snapshot.solved_words as i64,
        _ => snapshot.stats.combo as i64 * 10 - snapshot.stats.incorrect_chars as i64,
    }
}
