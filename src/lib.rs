//! pity: drive interactive programs over a pseudo-terminal
//!
//! pity spawns a shell or REPL attached to a PTY, learns its prompt, sends
//! input lines, and waits for output matching a pattern within a bounded
//! time. It is meant for scripting interactive sessions, such as integration
//! tests that "type" commands and assert on the responses.
//!
//! # Features
//!
//! - **Prompt capture**: the program's first line of output becomes its prompt,
//!   matched literally at the end of later output
//! - **Timeout-bounded reads**: every read returns within its timeout plus one
//!   poll interval, with whatever arrived so far
//! - **Pattern matching**: exact strings, regex and glob patterns, evaluated
//!   against everything read so far
//! - **Guaranteed cleanup**: the child is signalled when the session ends,
//!   whether the interaction succeeded, failed or panicked
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pity::{ExpectError, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ExpectError> {
//!     Session::run("bash", async |bash| {
//!         bash.send_line("ls").await?;
//!         let listing = bash.read_line().await?;
//!         assert!(listing.contains("Cargo.toml"));
//!         Ok(())
//!     })
//!     .await
//! }
//! ```
//!
//! # Reads never fail on timeout
//!
//! A read that times out, or that ends because the program closed the
//! terminal, returns the text accumulated so far. Inspect the returned
//! [`Output`] to decide whether the expectation was met:
//!
//! ```rust,no_run
//! use pity::{Pattern, Session, StopReason};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let mut session = Session::builder().prompt("$ ").spawn("sh").await?;
//! let output = session
//!     .expect_within(Pattern::exact("done"), Duration::from_millis(500))
//!     .await?;
//!
//! match output.stop_reason() {
//!     StopReason::Matched => println!("finished: {output}"),
//!     StopReason::Timeout => println!("still running, so far: {output}"),
//!     StopReason::Eof => println!("program exited: {output}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Logging
//!
//! Sessions write the transcript (info) and lifecycle details (debug) to a
//! [`Logger`]. The default is [`StreamLogger::stdout`] at info level; use
//! [`LogFacade`] to route through the `log` crate instead.
//!
//! ```rust,no_run
//! use pity::{LogFacade, Session};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = Session::builder()
//!     .logger(Arc::new(LogFacade))
//!     .spawn("bash")
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod buffer;
mod logger;
mod pattern;
mod result;
mod session;

// Public API exports
pub use logger::{default_logger, LogFacade, Logger, Severity, StreamLogger};
pub use pattern::{Match, Matcher, Pattern};
pub use result::{ExpectError, Output, PatternError, StopReason};
pub use session::{
    Session, SessionBuilder, SessionState, Termination, DEFAULT_COMMAND, POLL_INTERVAL,
    PROMPT_CAPTURE_TIMEOUT, READ_CHUNK_SIZE, TIMEOUT,
};

// Re-export commonly used types
#[cfg(unix)]
pub use nix::sys::signal::Signal;
