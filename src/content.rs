use crate::session::EssayCategory;
use include_dir::{include_dir, Dir};
use itertools::Itertools;
use rand::{seq::SliceRandom, Rng};
use serde::Deserialize;
use serde_json::from_str;

static DATA_DIR: Dir = include_dir!("src/data");

/// Sizing budget for timed sessions: enough words to sustain 200 WPM for the
/// whole duration.
const TIME_MODE_WPM_BUDGET: f64 = 200.0;

#[derive(Deserialize, Clone, Debug)]
pub struct Vocabulary {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct EssayTask {
    pub category: EssayCategory,
    pub prompt: String,
    pub text: String,
}

#[derive(Deserialize, Clone, Debug)]
struct EssayFile {
    tasks: Vec<EssayTask>,
}

/// The embedded practice material: a flat vocabulary list sampled uniformly
/// with replacement, and a small bank of essay tasks tagged by category.
#[derive(Clone, Debug)]
pub struct ContentLibrary {
    vocabulary: Vocabulary,
    tasks: Vec<EssayTask>,
}

impl ContentLibrary {
    pub fn load() -> Self {
        let vocabulary: Vocabulary = read_data_file("words.json");
        let EssayFile { mut tasks } = read_data_file("essays.json");

        // Essay bodies must be typeable as a single line
        for task in &mut tasks {
            task.text = task.text.split_whitespace().join(" ");
        }

        Self { vocabulary, tasks }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.words.len()
    }

    pub fn knows_word(&self, word: &str) -> bool {
        self.vocabulary.words.iter().any(|w| w == word)
    }

    /// One uniformly random vocabulary word.
    pub fn random_word(&self) -> String {
        let mut rng = rand::thread_rng();

        self.vocabulary
            .words
            .choose(&mut rng)
            .expect("vocabulary is empty")
            .clone()
    }

    /// `count` random words joined by single spaces; uniform with
    /// replacement, no dedup, no weighting.
    pub fn random_words(&self, count: usize) -> String {
        let mut rng = rand::thread_rng();

        (0..count)
            .map(|_| {
                self.vocabulary
                    .words
                    .choose(&mut rng)
                    .expect("vocabulary is empty")
                    .as_str()
            })
            .join(" ")
    }

    /// Pick one essay task matching the category filter, uniformly at
    /// random. `All`, or a filter with no matching tasks, falls back to the
    /// whole bank.
    pub fn pick_essay(&self, category: EssayCategory) -> &EssayTask {
        let mut rng = rand::thread_rng();

        let matching: Vec<&EssayTask> = match category {
            EssayCategory::All => Vec::new(),
            _ => self.tasks.iter().filter(|t| t.category == category).collect(),
        };

        if matching.is_empty() {
            self.tasks.choose(&mut rng).expect("essay bank is empty")
        } else {
            matching[rng.gen_range(0..matching.len())]
        }
    }

    pub fn essay_count(&self) -> usize {
        self.tasks.len()
    }
}

/// Number of words generated for a timed session of `duration_secs`.
pub fn time_mode_word_count(duration_secs: u64) -> usize {
    (duration_secs as f64 / 60.0 * TIME_MODE_WPM_BUDGET).ceil() as usize
}

fn read_data_file<T: for<'de> Deserialize<'de>>(file_name: &str) -> T {
    let file = DATA_DIR.get_file(file_name).expect("data file not found");

    let contents = file
        .contents_utf8()
        .expect("unable to interpret data file as a string");

    from_str(contents).expect("unable to deserialize data json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_loads_embedded_data() {
        let library = ContentLibrary::load();

        assert!(library.vocabulary_len() > 400);
        assert_eq!(library.essay_count(), 5);
    }

    #[test]
    fn test_vocabulary_is_lowercase_tokens() {
        let library = ContentLibrary::load();

        assert!(library.knows_word("the"));
        assert!(library.knows_word("serendipity"));
        assert!(!library.knows_word("THE"));
    }

    #[test]
    fn test_random_word_comes_from_vocabulary() {
        let library = ContentLibrary::load();

        for _ in 0..20 {
            let word = library.random_word();
            assert!(library.knows_word(&word));
        }
    }

    #[test]
    fn test_random_words_count_and_join() {
        let library = ContentLibrary::load();
        let text = library.random_words(25);

        assert_eq!(text.split(' ').count(), 25);
        assert!(!text.starts_with(' '));
        assert!(!text.ends_with(' '));
        assert!(!text.contains("  "));
    }

    #[test]
    fn test_random_words_zero() {
        let library = ContentLibrary::load();

        assert_eq!(library.random_words(0), "");
    }

    #[test]
    fn test_time_mode_word_count() {
        assert_eq!(time_mode_word_count(60), 200);
        assert_eq!(time_mode_word_count(30), 100);
        assert_eq!(time_mode_word_count(15), 50);
    }

    #[test]
    fn test_time_mode_word_count_rounds_up() {
        assert_eq!(time_mode_word_count(1), 4);
        assert_eq!(time_mode_word_count(31), 104);
    }

    #[test]
    fn test_pick_essay_respects_category() {
        let library = ContentLibrary::load();

        for _ in 0..10 {
            let task = library.pick_essay(EssayCategory::Discussion);
            assert_eq!(task.category, EssayCategory::Discussion);
        }
    }

    #[test]
    fn test_pick_essay_all_uses_whole_bank() {
        let library = ContentLibrary::load();
        let task = library.pick_essay(EssayCategory::All);

        assert!(!task.text.is_empty());
        assert!(!task.prompt.is_empty());
    }

    #[test]
    fn test_essay_bodies_are_single_line() {
        let library = ContentLibrary::load();

        for category in [
            EssayCategory::Opinion,
            EssayCategory::Discussion,
            EssayCategory::ProblemSolution,
            EssayCategory::AdvantagesDisadvantages,
            EssayCategory::DirectQuestion,
        ] {
            let task = library.pick_essay(category);
            assert!(!task.text.contains('\n'));
            assert!(!task.text.contains("  "));
        }
    }
}
