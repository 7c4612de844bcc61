use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::Level;

/// Something a walk wants the user to know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// An entry was (or in a dry run, would be) renamed.
    Renamed { from: PathBuf, to: PathBuf },
    /// A single line of a file was (or would be) rewritten.
    LineChanged {
        path: PathBuf,
        line: usize,
        before: String,
        after: String,
    },
    /// A file's rewrite was committed to disk.
    Rewritten { path: PathBuf },
    /// The transform left this entry's name as it was.
    Ignored { path: PathBuf },
    /// The transform left this file's content as it was.
    Unchanged { path: PathBuf },
    /// The name or content is not valid UTF-8 and was left alone.
    NotText { path: PathBuf },
    /// A symlink was not followed.
    Symlink { path: PathBuf },
    /// A recoverable I/O failure; the walk carried on.
    Failed { path: PathBuf, message: String },
}

impl Event {
    pub fn level(&self) -> Level {
        match self {
            Event::Renamed { .. } | Event::LineChanged { .. } | Event::Rewritten { .. } => {
                Level::INFO
            }
            Event::Ignored { .. }
            | Event::Unchanged { .. }
            | Event::NotText { .. }
            | Event::Symlink { .. } => Level::DEBUG,
            Event::Failed { .. } => Level::ERROR,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Renamed { from, to } => {
                write!(f, "Renaming '{}' to '{}'", from.display(), to.display())
            }
            Event::LineChanged {
                path,
                line,
                before,
                after,
            } => write!(
                f,
                "{}:{}: {} => {}",
                path.display(),
                line,
                before.trim(),
                after.trim()
            ),
            Event::Rewritten { path } => write!(f, "Rewrote {}", path.display()),
            Event::Ignored { path } => write!(f, "Ignoring '{}'", path.display()),
            Event::Unchanged { path } => write!(f, "Skipping {}", path.display()),
            Event::NotText { path } => write!(f, "Ignoring non UTF-8 entry: {}", path.display()),
            Event::Symlink { path } => write!(f, "Not following symlink: {}", path.display()),
            Event::Failed { path, message } => write!(f, "{}: {}", path.display(), message),
        }
    }
}

/// Receives events from the tree walkers.
///
/// Walkers never configure logging themselves; the caller decides where
/// events go by passing a reporter in.
pub trait Reporter {
    fn report(&self, event: Event);
}

/// Forwards events to `tracing` at the event's level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, event: Event) {
        let level = event.level();
        if level == Level::ERROR {
            tracing::error!("{event}");
        } else if level == Level::INFO {
            tracing::info!("{event}");
        } else {
            tracing::debug!("{event}");
        }
    }
}

/// Keeps every event in memory, in the order it was reported.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<Event>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of everything reported so far.
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Takes the recorded events, leaving the reporter empty.
    pub fn take(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, event: Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
