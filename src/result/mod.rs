//! Result types for read operations

mod error;

pub use error::{ExpectError, PatternError};

use std::fmt;
use std::ops::Deref;

/// Why a read operation stopped accumulating output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The predicate was satisfied by the accumulated buffer.
    Matched,
    /// The timeout elapsed before the predicate was satisfied.
    Timeout,
    /// The child closed its side of the terminal.
    Eof,
}

/// Everything accumulated by one read operation.
///
/// `Output` dereferences to `str`, so the usual string methods work on it
/// directly. An unmet expectation is not an error: check [`Output::matched`]
/// or inspect the text.
///
/// # Examples
///
/// ```no_run
/// use pity::{Pattern, Session};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let mut session = Session::builder().prompt("$ ").spawn("sh").await?;
/// session.send_line("echo hello").await?;
/// let output = session.expect(Pattern::exact("hello")).await?;
///
/// if output.matched() {
///     println!("Got: {}", output);
/// } else {
///     println!("Gave up after {:?}: {:?}", output.stop_reason(), output.as_str());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    text: String,
    stop_reason: StopReason,
}

impl Output {
    pub(crate) fn new(text: String, stop_reason: StopReason) -> Self {
        Self { text, stop_reason }
    }

    /// The accumulated text (lossily decoded as UTF-8).
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Why the read stopped.
    pub fn stop_reason(&self) -> StopReason {
        self.stop_reason
    }

    /// Whether the predicate was satisfied.
    pub fn matched(&self) -> bool {
        self.stop_reason == StopReason::Matched
    }

    /// Consume the output, returning the text.
    pub fn into_string(self) -> String {
        self.text
    }
}

impl Deref for Output {
    type Target = str;

    fn deref(&self) -> &str {
        &self.text
    }
}

impl AsRef<str> for Output {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<Output> for String {
    fn from(output: Output) -> Self {
        output.text
    }
}
