//! Log sinks - ポリシーが整形済みメッセージを書き出す先
//!
//! Sinks are constructed explicitly and handed to a policy as
//! `Arc<dyn LogSink>`. There is no process-wide logger.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Destination for pre-formatted retry diagnostics.
pub trait LogSink: Send + Sync {
    fn log(&self, message: &str);
}

/// Shared sink handle as stored by policies.
pub type SharedSink = Arc<dyn LogSink>;

/// Severity used by [`TracingSink`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

/// Default sink: emits every message as a `tracing` event.
///
/// Where the event ends up (console, JSON, nowhere) is decided by the
/// subscriber the binary installs.
#[derive(Debug, Clone, Default)]
pub struct TracingSink {
    level: LogLevel,
    prefix: Option<String>,
}

impl TracingSink {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            prefix: None,
        }
    }

    /// Attach a prefix (e.g. the name of the thing being retried).
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn shared(self) -> SharedSink {
        Arc::new(self)
    }
}

impl LogSink for TracingSink {
    fn log(&self, message: &str) {
        let prefix = self.prefix.as_deref().unwrap_or("");
        match self.level {
            LogLevel::Trace => tracing::trace!(target: "weft::retry", prefix, "{message}"),
            LogLevel::Debug => tracing::debug!(target: "weft::retry", prefix, "{message}"),
            LogLevel::Info => tracing::info!(target: "weft::retry", prefix, "{message}"),
            LogLevel::Warn => tracing::warn!(target: "weft::retry", prefix, "{message}"),
            LogLevel::Error => tracing::error!(target: "weft::retry", prefix, "{message}"),
            LogLevel::Off => {}
        }
    }
}

/// Adapts a closure into a sink.
pub struct FnSink<F>(pub F);

impl<F> LogSink for FnSink<F>
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, message: &str) {
        (self.0)(message)
    }
}

impl<F> fmt::Debug for FnSink<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnSink")
    }
}

/// Test helper: a sink that records every line.
#[cfg(test)]
pub(crate) mod capture {
    use std::sync::{Arc, Mutex};

    use super::LogSink;

    #[derive(Debug, Clone, Default)]
    pub struct CaptureSink {
        lines: Arc<Mutex<Vec<String>>>,
    }

    impl CaptureSink {
        pub fn lines(&self) -> Vec<String> {
            self.lines.lock().unwrap().clone()
        }
    }

    impl LogSink for CaptureSink {
        fn log(&self, message: &str) {
            self.lines.lock().unwrap().push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn fn_sink_forwards_messages() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = Arc::clone(&seen);
            FnSink(move |m: &str| seen.lock().unwrap().push(m.to_string()))
        };

        sink.log("one");
        sink.log("two");
        assert_eq!(*seen.lock().unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn tracing_sink_accepts_every_level() {
        for level in [
            LogLevel::Trace,
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
            LogLevel::Off,
        ] {
            let sink = TracingSink::new(level).with_prefix("test");
            assert_eq!(sink.level(), level);
            sink.log("message");
        }
    }

    #[test]
    fn log_level_parses_snake_case() {
        let level: LogLevel = serde_json::from_str("\"warn\"").unwrap();
        assert_eq!(level, LogLevel::Warn);
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }
}
