use std::env;
use std::path::Path;
use std::process::{Child, Command, Stdio};

/// Speaks challenge words out loud. The engine never calls this directly;
/// the app narrates when the learner asks for playback.
pub trait Narrator {
    fn speak(&mut self, text: &str);
    fn available(&self) -> bool;
}

/// Narrator backed by whatever text-to-speech command the host has installed.
pub struct SystemNarrator {
    command: String,
    child: Option<Child>,
}

/// Probed in order; all of these accept the text as a positional argument.
const SPEECH_COMMANDS: &[&str] = &["say", "espeak-ng", "espeak", "spd-say"];

impl SystemNarrator {
    /// Finds the first known speech command on PATH, if any.
    pub fn detect() -> Option<Self> {
        SPEECH_COMMANDS
            .iter()
            .find(|cmd| find_in_path(cmd))
            .map(|cmd| Self::with_command(*cmd))
    }

    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            child: None,
        }
    }

    fn reap(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Narrator for SystemNarrator {
    fn speak(&mut self, text: &str) {
        // A new word interrupts the previous one.
        self.reap();
        self.child = Command::new(&self.command)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .ok();
    }

    fn available(&self) -> bool {
        true
    }
}

impl Drop for SystemNarrator {
    fn drop(&mut self) {
        self.reap();
    }
}

/// No-op narrator for `--mute`, disabled speech, or hosts without an engine.
pub struct SilentNarrator;

impl Narrator for SilentNarrator {
    fn speak(&mut self, _text: &str) {}

    fn available(&self) -> bool {
        false
    }
}

fn find_in_path(command: &str) -> bool {
    let Some(paths) = env::var_os("PATH") else {
        return false;
    };
    env::split_paths(&paths).any(|dir| {
        let candidate = Path::new(&dir).join(command);
        candidate.is_file()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_narrator_is_unavailable() {
        let mut narrator = SilentNarrator;
        narrator.speak("hello");
        assert!(!narrator.available());
    }

    #[test]
    fn unknown_command_is_not_on_path() {
        assert!(!find_in_path("definitely-not-a-real-speech-engine"));
    }

    #[cfg(unix)]
    #[test]
    fn system_narrator_spawns_and_reaps() {
        // `true` exits immediately, which exercises the interrupt/reap path
        // without making noise.
        let mut narrator = SystemNarrator::with_command("true");
        assert!(narrator.available());
        narrator.speak("first");
        narrator.speak("second");
    }
}
