//! Session management for PTY-based process automation

mod builder;
mod prompt;
mod read;
mod spawn;
mod stream;

pub use builder::{
    SessionBuilder, DEFAULT_COMMAND, POLL_INTERVAL, PROMPT_CAPTURE_TIMEOUT, READ_CHUNK_SIZE,
    TIMEOUT,
};
pub use spawn::Termination;

use crate::pattern::Pattern;
use crate::result::{ExpectError, Output};
use read::ReadSettings;
use spawn::Terminal;
use std::time::Duration;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The prompt is known; nothing has been sent or read since.
    PromptCaptured,
    /// At least one send or read has happened.
    Interactive,
    /// The termination signal has been sent (or the child was already gone).
    Terminated,
}

/// A running program attached to a pseudo-terminal.
///
/// The prompt is fixed when the session is created: either given explicitly
/// or captured from the program's first line of output. Every read starts
/// from an empty buffer; output not consumed by one read is seen by the next.
///
/// When a `Session` is dropped without [`terminate`](Session::terminate)
/// having been called, the child is terminated then.
///
/// # Examples
///
/// ```no_run
/// use pity::{Pattern, Session};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut session = Session::builder().prompt("$ ").spawn("sh").await?;
///
/// session.send_line("echo marker123").await?;
/// let output = session.expect(Pattern::exact("marker123")).await?;
/// assert!(output.contains("marker123"));
///
/// session.terminate()?;
/// # Ok(())
/// # }
/// ```
pub struct Session {
    terminal: Terminal,
    prompt: Pattern,
    prompt_text: String,
    settings: ReadSettings,
    timeout: Duration,
    state: SessionState,
}

impl Session {
    /// Create a new session builder.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Spawn a command with default settings and capture its prompt.
    ///
    /// Shorthand for `Session::builder().spawn(command)`.
    pub async fn spawn(command: &str) -> Result<Self, ExpectError> {
        SessionBuilder::new().spawn(command).await
    }

    /// Spawn a command with default settings, run `interaction`, then
    /// terminate the child.
    ///
    /// See [`SessionBuilder::run`].
    pub async fn run<T, E, F>(command: &str, interaction: F) -> Result<T, E>
    where
        F: AsyncFnOnce(&mut Session) -> Result<T, E>,
        E: From<ExpectError>,
    {
        SessionBuilder::new().run(command, interaction).await
    }

    /// The prompt text, as given or captured.
    pub fn prompt(&self) -> &str {
        &self.prompt_text
    }

    /// OS process id of the child, if the platform reports one.
    pub fn process_id(&self) -> Option<u32> {
        self.terminal.pid()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        if self.terminal.is_terminated() {
            SessionState::Terminated
        } else {
            self.state
        }
    }

    /// Send raw bytes to the program and flush.
    ///
    /// Nothing is appended; use this for control characters such as Ctrl-C
    /// (`&[0x03]`) or Ctrl-D (`&[0x04]`).
    pub async fn send(&mut self, data: &[u8]) -> Result<(), ExpectError> {
        self.state = SessionState::Interactive;
        self.terminal.input.write_flush(data.to_vec()).await?;
        self.terminal
            .logger()
            .debug(&format!("Sent: {:?}", String::from_utf8_lossy(data)));
        Ok(())
    }

    /// Send `line` followed by a newline, then flush.
    ///
    /// The text is passed through unchanged.
    pub async fn send_line(&mut self, line: &str) -> Result<(), ExpectError> {
        self.state = SessionState::Interactive;
        let mut data = Vec::with_capacity(line.len() + 1);
        data.extend_from_slice(line.as_bytes());
        data.push(b'\n');

        self.terminal.input.write_flush(data).await?;
        self.terminal.logger().debug(&format!("Sent: {line}"));
        Ok(())
    }

    /// Read until the output ends with the prompt, using the default timeout.
    pub async fn read_line(&mut self) -> Result<Output, ExpectError> {
        self.read_line_within(self.timeout).await
    }

    /// Read until the output ends with the prompt or `timeout` elapses.
    pub async fn read_line_within(&mut self, timeout: Duration) -> Result<Output, ExpectError> {
        let prompt = self.prompt.clone();
        self.expect_within(prompt, timeout).await
    }

    /// Read until `pattern` matches, using the default timeout.
    ///
    /// A timeout or the program exiting is not an error; check
    /// [`Output::matched`] or the text itself.
    pub async fn expect(&mut self, pattern: Pattern) -> Result<Output, ExpectError> {
        self.expect_within(pattern, self.timeout).await
    }

    /// Read until `pattern` matches or `timeout` elapses.
    ///
    /// # Errors
    ///
    /// Returns [`ExpectError::Pattern`] for an empty exact or glob pattern and
    /// [`ExpectError::Io`] if reading from the terminal fails.
    pub async fn expect_within(
        &mut self,
        pattern: Pattern,
        timeout: Duration,
    ) -> Result<Output, ExpectError> {
        let matcher = pattern.to_matcher()?;
        self.read_until(timeout, |buf| matcher.find(buf).is_some()).await
    }

    /// Read until `predicate` holds for everything read so far, the program
    /// closes the terminal, or `timeout` elapses.
    ///
    /// The predicate sees the whole accumulated output on every call, so it
    /// can match text that arrived in several pieces.
    pub async fn read_until<P>(
        &mut self,
        timeout: Duration,
        predicate: P,
    ) -> Result<Output, ExpectError>
    where
        P: FnMut(&[u8]) -> bool,
    {
        self.state = SessionState::Interactive;
        let settings = self.settings;
        let (output, logger) = self.terminal.reader();
        read::read_until(output, settings, logger, timeout, predicate).await
    }

    /// Check if the process is still alive.
    pub fn is_alive(&mut self) -> Result<bool, ExpectError> {
        self.terminal.is_alive()
    }

    /// Send the termination signal to the child.
    ///
    /// Only the first call signals; later calls, and a child that has
    /// already exited, report [`Termination::AlreadyExited`]. The call does
    /// not wait for the child to exit.
    pub fn terminate(&mut self) -> Result<Termination, ExpectError> {
        self.terminal.terminate()
    }
}
