//! Error types for pity

use thiserror::Error;

/// Errors that can occur while driving a session.
///
/// A read that times out or hits end-of-stream is *not* an error: the
/// accumulated text is returned and its [`StopReason`](crate::StopReason)
/// tells the caller why the read ended.
///
/// # Examples
///
/// ```no_run
/// use pity::{ExpectError, Session};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// match Session::spawn("/no/such/program").await {
///     Ok(_) => println!("spawned"),
///     Err(ExpectError::Spawn(reason)) => eprintln!("could not start: {reason}"),
///     Err(e) => return Err(e.into()),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Error, Debug)]
pub enum ExpectError {
    /// Process spawning error.
    ///
    /// Returned synchronously from session creation when the command is
    /// empty or cannot be started. No session exists afterwards.
    #[error("Failed to spawn process: {0}")]
    Spawn(String),

    /// PTY error.
    ///
    /// Returned when the pseudo-terminal cannot be allocated or its master
    /// side cannot be split into reader and writer.
    #[error("PTY error: {0}")]
    Pty(String),

    /// I/O error.
    ///
    /// Any read or write failure other than "would block" and end-of-stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Signal delivery failed for a reason other than "no such process".
    #[error("Failed to signal process {pid}: {reason}")]
    Signal {
        /// Target process id
        pid: u32,
        /// OS description of the failure
        reason: String,
    },

    /// Invalid pattern.
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] PatternError),
}

/// Errors related to pattern creation.
#[derive(Error, Debug)]
pub enum PatternError {
    /// Invalid regex pattern.
    #[error("Invalid regex: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// Invalid glob pattern.
    #[error("Invalid glob: {0}")]
    InvalidGlob(String),

    /// Empty pattern.
    ///
    /// Returned when an exact or glob pattern is built from an empty string.
    #[error("Pattern cannot be empty")]
    EmptyPattern,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_error_message() {
        let err = ExpectError::Spawn("no such file".to_string());
        assert_eq!(err.to_string(), "Failed to spawn process: no such file");
    }

    #[test]
    fn test_pattern_error_converts() {
        let err: ExpectError = PatternError::EmptyPattern.into();
        assert!(matches!(err, ExpectError::Pattern(PatternError::EmptyPattern)));
    }
}
