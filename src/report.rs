//! Progress and diagnostics sink.
//!
//! Components never log on their own; they are handed a [`Reporter`] so the
//! binary can route messages through `tracing` while tests record them.

/// Receiver for user-facing progress messages.
pub trait Reporter {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
    /// A step finished successfully.
    fn success(&self, msg: &str);
    /// Pre-rendered text meant for the terminal, such as release notes.
    fn display(&self, text: &str);
}

/// Reporter backed by `tracing` events; installed by the CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    fn success(&self, msg: &str) {
        tracing::info!(outcome = "success", "{msg}");
    }

    fn display(&self, text: &str) {
        println!("{text}");
    }
}

#[cfg(test)]
pub mod testing {
    use super::Reporter;
    use std::cell::RefCell;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Level {
        Info,
        Warn,
        Error,
        Success,
        Display,
    }

    /// Keeps every message so tests can assert on diagnostics.
    #[derive(Debug, Default)]
    pub struct RecordingReporter {
        events: RefCell<Vec<(Level, String)>>,
    }

    impl RecordingReporter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn messages(&self, level: Level) -> Vec<String> {
            self.events
                .borrow()
                .iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, m)| m.clone())
                .collect()
        }

        pub fn contains(&self, level: Level, needle: &str) -> bool {
            self.messages(level).iter().any(|m| m.contains(needle))
        }

        fn push(&self, level: Level, msg: &str) {
            self.events.borrow_mut().push((level, msg.to_string()));
        }
    }

    impl Reporter for RecordingReporter {
        fn info(&self, msg: &str) {
            self.push(Level::Info, msg);
        }
        fn warn(&self, msg: &str) {
            self.push(Level::Warn, msg);
        }
        fn error(&self, msg: &str) {
            self.push(Level::Error, msg);
        }
        fn success(&self, msg: &str) {
            self.push(Level::Success, msg);
        }
        fn display(&self, text: &str) {
            self.push(Level::Display, text);
        }
    }
}
