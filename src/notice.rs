// ABOUTME: User-facing notices with five levels and four verbosity modes
// ABOUTME: Sink trait decouples delivery so tests can capture messages

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Error,
    Warning,
    Info,
    Success,
    Debug,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Error => "error",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
            NoticeLevel::Debug => "debug",
        }
    }
}

/// How much the sync surfaces to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeMode {
    Minimal,
    Normal,
    Extensive,
    Debug,
}

impl Default for NoticeMode {
    fn default() -> Self {
        NoticeMode::Normal
    }
}

pub trait NoticeSink: Send + Sync {
    fn show(&self, level: NoticeLevel, message: &str);
}

/// Default sink: errors and warnings to stderr, the rest to stdout.
pub struct ConsoleSink;

impl NoticeSink for ConsoleSink {
    fn show(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Error | NoticeLevel::Warning => eprintln!("{}", message),
            _ => println!("{}", message),
        }
    }
}

/// Captures notices for assertions in tests.
#[derive(Default)]
pub struct MemorySink {
    messages: Mutex<Vec<(NoticeLevel, String)>>,
}

impl MemorySink {
    pub fn messages(&self) -> Vec<(NoticeLevel, String)> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }
}

impl NoticeSink for MemorySink {
    fn show(&self, level: NoticeLevel, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push((level, message.to_string()));
        }
    }
}

pub struct NoticeManager {
    mode: NoticeMode,
    sink: Arc<dyn NoticeSink>,
}

impl NoticeManager {
    pub fn new(mode: NoticeMode) -> Self {
        Self::with_sink(mode, Arc::new(ConsoleSink))
    }

    pub fn with_sink(mode: NoticeMode, sink: Arc<dyn NoticeSink>) -> Self {
        NoticeManager { mode, sink }
    }

    pub fn error(&self, message: &str) {
        self.notify(NoticeLevel::Error, message);
    }

    pub fn warning(&self, message: &str) {
        self.notify(NoticeLevel::Warning, message);
    }

    pub fn info(&self, message: &str) {
        self.notify(NoticeLevel::Info, message);
    }

    pub fn success(&self, message: &str) {
        self.notify(NoticeLevel::Success, message);
    }

    pub fn debug(&self, message: &str) {
        self.notify(NoticeLevel::Debug, message);
    }

    fn enabled(&self, level: NoticeLevel) -> bool {
        match self.mode {
            NoticeMode::Minimal => matches!(level, NoticeLevel::Error),
            NoticeMode::Normal => matches!(
                level,
                NoticeLevel::Error | NoticeLevel::Warning | NoticeLevel::Success
            ),
            NoticeMode::Extensive => !matches!(level, NoticeLevel::Debug),
            NoticeMode::Debug => true,
        }
    }

    fn notify(&self, level: NoticeLevel, message: &str) {
        if !self.enabled(level) {
            return;
        }
        if self.mode == NoticeMode::Debug {
            self.sink
                .show(level, &format!("[{}] {}", level.as_str(), message));
        } else {
            self.sink.show(level, message);
        }
    }
}
