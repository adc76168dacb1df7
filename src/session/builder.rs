//! Session builder for configuration

use super::prompt;
use super::read::ReadSettings;
use super::spawn::{StopWith, Terminal};
use crate::logger::{default_logger, Logger};
use crate::pattern::Pattern;
use crate::result::ExpectError;
use crate::session::{Session, SessionState};
use portable_pty::PtySize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[cfg(unix)]
use nix::sys::signal::Signal;

/// Bytes requested from the terminal per read.
pub const READ_CHUNK_SIZE: usize = 512;

/// Longest single wait for output before the timeout is re-checked.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Default timeout for `expect` and `read_line`.
pub const TIMEOUT: Duration = Duration::from_secs(5);

/// Default time allowed for the program to print its prompt.
pub const PROMPT_CAPTURE_TIMEOUT: Duration = Duration::from_secs(1);

/// Command used by [`SessionBuilder::run_default`].
pub const DEFAULT_COMMAND: &str = "bash";

/// Default PTY rows
const DEFAULT_PTY_ROWS: u16 = 24;

/// Default PTY columns
const DEFAULT_PTY_COLS: u16 = 80;

/// Builder for configuring and spawning sessions.
///
/// # Defaults
///
/// - Timeout: [`TIMEOUT`] (5 seconds)
/// - Prompt capture timeout: [`PROMPT_CAPTURE_TIMEOUT`] (1 second)
/// - Read chunk size: [`READ_CHUNK_SIZE`] (512 bytes)
/// - Poll interval: [`POLL_INTERVAL`] (10 ms)
/// - Prompt: captured from the program's first line of output
/// - Logger: [`StreamLogger::stdout`](crate::StreamLogger::stdout) at info level
/// - PTY size: 24 rows × 80 columns
/// - Termination signal: `SIGTERM` (unix)
///
/// # Examples
///
/// ```no_run
/// use pity::Session;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let session = Session::builder()
///     .timeout(Duration::from_secs(10))
///     .prompt(">>> ")
///     .pty_size(40, 120)
///     .spawn("python3 -i")
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SessionBuilder {
    timeout: Duration,
    prompt_timeout: Duration,
    read_chunk_size: usize,
    poll_interval: Duration,
    prompt: Option<String>,
    logger: Option<Arc<dyn Logger>>,
    env: Vec<(String, String)>,
    pty_size: PtySize,
    stop_with: StopWith,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionBuilder")
            .field("timeout", &self.timeout)
            .field("prompt_timeout", &self.prompt_timeout)
            .field("read_chunk_size", &self.read_chunk_size)
            .field("poll_interval", &self.poll_interval)
            .field("prompt", &self.prompt)
            .field("env", &self.env)
            .field("pty_size", &self.pty_size)
            .finish_non_exhaustive()
    }
}

impl SessionBuilder {
    /// Create a new session builder with default configuration.
    pub fn new() -> Self {
        Self {
            timeout: TIMEOUT,
            prompt_timeout: PROMPT_CAPTURE_TIMEOUT,
            read_chunk_size: READ_CHUNK_SIZE,
            poll_interval: POLL_INTERVAL,
            prompt: None,
            logger: None,
            env: Vec::new(),
            pty_size: PtySize {
                rows: DEFAULT_PTY_ROWS,
                cols: DEFAULT_PTY_COLS,
                pixel_width: 0,
                pixel_height: 0,
            },
            stop_with: StopWith::default(),
        }
    }

    /// Set the default timeout for `expect` and `read_line`.
    ///
    /// Individual calls can override it with the `*_within` variants.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set how long to wait for the program's first line when capturing the prompt.
    pub fn prompt_timeout(mut self, timeout: Duration) -> Self {
        self.prompt_timeout = timeout;
        self
    }

    /// Use `prompt` instead of capturing it.
    ///
    /// No read happens during spawn when a prompt is given. The text is
    /// matched literally at the end of the output.
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Set the logging sink. Sinks may be shared between sessions.
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Set an environment variable for the spawned program.
    ///
    /// The program otherwise inherits this process's environment. Setting
    /// `PS1` is a convenient way to give a shell a predictable prompt.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Set the number of bytes requested per read (minimum 1).
    pub fn read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size.max(1);
        self
    }

    /// Set the poll interval.
    ///
    /// Reads return at most one poll interval after their timeout.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set PTY (terminal) size.
    pub fn pty_size(mut self, rows: u16, cols: u16) -> Self {
        self.pty_size = PtySize {
            rows,
            cols,
            pixel_width: 0,
            pixel_height: 0,
        };
        self
    }

    /// Set the signal sent to the child when the session ends.
    ///
    /// Interactive shells ignore `SIGTERM`; use `SIGHUP` or `SIGKILL` to stop them.
    #[cfg(unix)]
    pub fn termination_signal(mut self, signal: Signal) -> Self {
        self.stop_with.signal = signal;
        self
    }

    /// Spawn `command` and establish its prompt.
    ///
    /// The command is split on whitespace; no shell quoting is applied.
    ///
    /// # Errors
    ///
    /// Returns [`ExpectError::Spawn`] if the command is empty or cannot be
    /// started, before any output is read. Returns [`ExpectError::Pty`] if
    /// the terminal cannot be allocated.
    pub async fn spawn(self, command: &str) -> Result<Session, ExpectError> {
        let logger = self.logger.unwrap_or_else(default_logger);
        let settings = ReadSettings {
            chunk_size: self.read_chunk_size,
            poll_interval: self.poll_interval,
        };

        let mut terminal = Terminal::launch(
            command,
            &self.env,
            self.pty_size,
            self.read_chunk_size,
            self.stop_with,
            logger,
        )?;

        let prompt_text = match self.prompt {
            Some(prompt) => prompt,
            None => prompt::capture(&mut terminal, settings, self.prompt_timeout).await?,
        };
        let prompt = Pattern::literal_suffix(&prompt_text)?;
        terminal
            .logger()
            .debug(&format!("Captured prompt: {prompt_text:?}"));

        Ok(Session {
            terminal,
            prompt,
            prompt_text,
            settings,
            timeout: self.timeout,
            state: SessionState::PromptCaptured,
        })
    }

    /// Spawn `command`, run `interaction` against the session, then terminate
    /// the child.
    ///
    /// Termination happens whether `interaction` succeeds or fails; an error
    /// from `interaction` takes precedence over a cleanup error. A spawn
    /// failure is returned before `interaction` runs.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pity::{ExpectError, Session};
    ///
    /// # async fn example() -> Result<(), ExpectError> {
    /// let listing = Session::builder()
    ///     .prompt("$ ")
    ///     .run("sh", async |sh| {
    ///         sh.send_line("ls").await?;
    ///         sh.read_line().await
    ///     })
    ///     .await?;
    /// println!("{listing}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run<T, E, F>(self, command: &str, interaction: F) -> Result<T, E>
    where
        F: AsyncFnOnce(&mut Session) -> Result<T, E>,
        E: From<ExpectError>,
    {
        let mut session = self.spawn(command).await?;
        let outcome = interaction(&mut session).await;
        let cleanup = session.terminate();

        let value = outcome?;
        cleanup?;
        Ok(value)
    }

    /// [`run`](Self::run) with [`DEFAULT_COMMAND`].
    pub async fn run_default<T, E, F>(self, interaction: F) -> Result<T, E>
    where
        F: AsyncFnOnce(&mut Session) -> Result<T, E>,
        E: From<ExpectError>,
    {
        self.run(DEFAULT_COMMAND, interaction).await
    }
}
