//! Logging sinks for session transcripts and diagnostics
//!
//! A session reports two kinds of messages: the text read from the child
//! (info) and lifecycle details such as the spawned PID or raw buffers
//! (debug). The sink is shared between sessions, so implementations must be
//! safe to call from several threads.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Severity of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Lifecycle and raw-buffer diagnostics.
    Debug,
    /// Transcript text read from the child.
    Info,
}

/// A shareable logging sink.
pub trait Logger: Send + Sync {
    /// Record a message at the given severity.
    fn log(&self, severity: Severity, message: &str);

    /// Record transcript text.
    fn info(&self, message: &str) {
        self.log(Severity::Info, message);
    }

    /// Record a diagnostic message.
    fn debug(&self, message: &str) {
        self.log(Severity::Debug, message);
    }
}

/// Writes messages to an [`io::Write`] target.
///
/// Info messages are written exactly as given, so the transcript reads like
/// the terminal did. Every other severity is terminated with a newline.
/// Messages below the configured level are dropped.
///
/// The default logger is `StreamLogger::stdout()` at [`Severity::Info`].
///
/// # Examples
///
/// ```
/// use pity::{Logger, Severity, StreamLogger};
///
/// let logger = StreamLogger::new(Vec::new()).level(Severity::Debug);
/// logger.info("$ ");
/// logger.debug("Sent: ls");
/// assert_eq!(logger.into_inner(), b"$ Sent: ls\n");
/// ```
pub struct StreamLogger<W> {
    writer: Mutex<W>,
    level: Severity,
}

impl StreamLogger<io::Stdout> {
    /// Log to standard output at info level.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> StreamLogger<W> {
    /// Log to `writer` at info level.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            level: Severity::Info,
        }
    }

    /// Set the minimum severity that gets written.
    pub fn level(mut self, level: Severity) -> Self {
        self.level = level;
        self
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> Logger for StreamLogger<W> {
    fn log(&self, severity: Severity, message: &str) {
        if severity < self.level {
            return;
        }

        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // A broken log target must never fail the session.
        let _ = match severity {
            Severity::Info => writer.write_all(message.as_bytes()),
            _ => writeln!(writer, "{message}"),
        };
        let _ = writer.flush();
    }
}

/// Forwards messages to the [`log`] crate facade under the `pity` target.
///
/// Use this when the host application already installs a logger such as
/// `env_logger`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacade;

impl Logger for LogFacade {
    fn log(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => log::info!(target: "pity", "{message}"),
            Severity::Debug => log::debug!(target: "pity", "{message}"),
        }
    }
}

/// The logger used when the caller does not supply one.
pub fn default_logger() -> Arc<dyn Logger> {
    Arc::new(StreamLogger::stdout())
}
