//! Stage progress for a filter run.
//!
//! Progress goes to **stderr** so the prompt and the summary on stdout stay
//! readable when stdout is captured.

use std::io::Write;

/// A pipeline stage that has just finished.
#[derive(Clone, Debug)]
pub enum StageEvent {
    Unpacked { entries: usize },
    Filtered { kept: usize, scanned: usize },
    MediaPruned { removed: usize, retained: usize },
    /// Nothing referenced media, so every file was left in place.
    MediaKept,
    NotesDeleted { notes: u64, cards: u64 },
    /// Nothing matched, so the collection keeps all notes.
    NotesKept,
    DeckRenamed { from: String, to: String },
    Packed { entries: usize },
}

pub trait ProgressReporter {
    fn report(&self, event: StageEvent);
}

/// Human-friendly progress on stderr: "filter  kept 1,234 / 5,000 notes".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: StageEvent) {
        let line = match &event {
            StageEvent::Unpacked { entries } => {
                format!("unpack  {} entries\n", format_number(*entries as u64))
            }
            StageEvent::Filtered { kept, scanned } => format!(
                "filter  kept {} / {} notes\n",
                format_number(*kept as u64),
                format_number(*scanned as u64)
            ),
            StageEvent::MediaPruned { removed, retained } => format!(
                "media   removed {}, retained {}\n",
                format_number(*removed as u64),
                format_number(*retained as u64)
            ),
            StageEvent::MediaKept => "media   no references, all files kept\n".to_string(),
            StageEvent::NotesDeleted { notes, cards } => format!(
                "notes   deleted {} notes, {} cards\n",
                format_number(*notes),
                format_number(*cards)
            ),
            StageEvent::NotesKept => "notes   no matches, collection unchanged\n".to_string(),
            StageEvent::DeckRenamed { from, to } => format!("deck    '{}' -> '{}'\n", from, to),
            StageEvent::Packed { entries } => {
                format!("pack    {} entries\n", format_number(*entries as u64))
            }
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: StageEvent) {}
}

pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
}

impl ProgressMode {
    /// Human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
        }
    }
}
