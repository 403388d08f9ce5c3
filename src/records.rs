use crate::app_dirs::AppDirs;
use crate::session::{Mode, Snapshot, TestConfig};
use crate::stats;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// Storage key for one best-record slot. Each mode keys on its active
/// parameter so different durations/counts track separate bests.
pub fn record_key(config: &TestConfig) -> String {
    match config.mode {
        Mode::Time => format!("time-{}", config.duration_secs),
        Mode::Words => format!("words-{}", config.word_count),
        Mode::Ielts => "ielts".to_string(),
        Mode::Challenge => format!("challenge-{}", config.challenge_kind),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestRecord {
    pub score: i64,
    pub wpm: u32,
    pub time_secs: f64,
    pub date: DateTime<Local>,
}

/// Whether `candidate` beats `existing` for the given mode: challenge wants
/// a higher score, time and ielts a higher WPM, words a lower elapsed time.
/// Ties never displace a record.
fn beats(candidate: &BestRecord, existing: &BestRecord, mode: Mode) -> bool {
    match mode {
        Mode::Challenge => candidate.score > existing.score,
        Mode::Time | Mode::Ielts => candidate.wpm > existing.wpm,
        Mode::Words => candidate.time_secs < existing.time_secs,
    }
}

/// Keyed map of best records across all configurations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordBook {
    records: HashMap<String, BestRecord>,
}

impl RecordBook {
    pub fn best_for(&self, config: &TestConfig) -> Option<&BestRecord> {
        self.records.get(&record_key(config))
    }

    /// Offer a finished session to the book. Returns true when it became
    /// the new best for its key (the first record for a key always does).
    pub fn submit(&mut self, snapshot: &Snapshot) -> bool {
        let candidate = BestRecord {
            score: stats::score(snapshot),
            wpm: snapshot.stats.wpm,
            time_secs: snapshot.elapsed_secs,
            date: Local::now(),
        };

        let key = record_key(&snapshot.config);
        let improved = match self.records.get(&key) {
            Some(existing) => beats(&candidate, existing, snapshot.config.mode),
            None => true,
        };

        if improved {
            self.records.insert(key, candidate);
        }

        improved
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub trait RecordStore {
    fn load(&self) -> RecordBook;
    fn save(&self, book: &RecordBook) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileRecordStore {
    path: PathBuf,
}

impl FileRecordStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::records_file(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for FileRecordStore {
    fn load(&self) -> RecordBook {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(book) = serde_json::from_slice::<RecordBook>(&bytes) {
                return book;
            }
        }
        RecordBook::default()
    }

    fn save(&self, book: &RecordBook) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(book).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

/// Append-only CSV history, one row per finished session.
#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    pub fn new() -> Self {
        Self {
            path: AppDirs::log_file(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn append(&self, snapshot: &Snapshot) -> Result<(), Box<dyn Error>> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let needs_header = !self.path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if needs_header {
            writer.write_record([
                "date",
                "key",
                "wpm",
                "accuracy",
                "score",
                "elapsed_secs",
                "keystrokes",
            ])?;
        }

        writer.write_record([
            Local::now().format("%c").to_string(),
            record_key(&snapshot.config),
            snapshot.stats.wpm.to_string(),
            snapshot.stats.accuracy.to_string(),
            stats::score(snapshot).to_string(),
            format!("{:.2}", snapshot.elapsed_secs),
            snapshot.stats.keystrokes.to_string(),
        ])?;
        writer.flush()?;

        Ok(())
    }
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new()
    }
}
