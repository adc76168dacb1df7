//! Pattern matching for expect operations

mod matcher;

pub use matcher::{Match, Matcher};

use crate::result::PatternError;
use regex::bytes::Regex;

/// Pattern types for matching process output.
///
/// A pattern is evaluated against the *whole* output accumulated by the
/// current read, so text split across several chunks still matches.
///
/// # Examples
///
/// ```
/// use pity::Pattern;
///
/// // Exact string (fastest)
/// let p1 = Pattern::exact("password: ");
///
/// // Regular expression
/// let p2 = Pattern::regex(r"\d+").unwrap();
///
/// // Glob pattern
/// let p3 = Pattern::glob("*.txt");
///
/// // Literal text that must end the buffer
/// let p4 = Pattern::literal_suffix("user@host:~$ ").unwrap();
/// ```
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Exact string match.
    ///
    /// Uses Boyer-Moore-Horspool for O(n/m) average-case performance.
    Exact(String),

    /// Regular expression match over raw bytes.
    Regex(Regex),

    /// Glob pattern match (shell-style wildcards).
    ///
    /// Matches if any substring of the output matches the glob. This is
    /// quadratic in the buffer length; prefer exact or regex patterns for
    /// large outputs.
    Glob(String),
}

impl Pattern {
    /// Create an exact string pattern.
    pub fn exact(s: impl Into<String>) -> Self {
        Pattern::Exact(s.into())
    }

    /// Create a regex pattern.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::InvalidRegex`] if the pattern does not compile.
    ///
    /// # Examples
    ///
    /// ```
    /// use pity::Pattern;
    ///
    /// let pattern = Pattern::regex(r"(?i)hello").unwrap();
    /// ```
    pub fn regex(pattern: &str) -> Result<Self, PatternError> {
        Ok(Pattern::Regex(Regex::new(pattern)?))
    }

    /// Create a glob pattern.
    pub fn glob(pattern: &str) -> Self {
        Pattern::Glob(pattern.to_string())
    }

    /// Match `text` literally, but only at the very end of the buffer.
    ///
    /// Every character of `text` is escaped, so regex metacharacters such as
    /// `$`, `.` or `*` stand for themselves. This is how prompts are matched:
    /// the read stops once the output ends in the prompt.
    ///
    /// ```
    /// use pity::Pattern;
    ///
    /// let prompt = Pattern::literal_suffix("a.b$ ").unwrap();
    /// assert!(prompt.is_match(b"output\r\na.b$ "));
    /// assert!(!prompt.is_match(b"output\r\naxb$ "));
    /// assert!(!prompt.is_match(b"a.b$ more"));
    /// ```
    pub fn literal_suffix(text: &str) -> Result<Self, PatternError> {
        let anchored = format!(r"{}\z", regex::escape(text));
        Ok(Pattern::Regex(Regex::new(&anchored)?))
    }

    /// Whether this pattern matches anywhere in `buffer`.
    ///
    /// Builds a fresh matcher; use [`Pattern::to_matcher`] when matching the
    /// same pattern repeatedly.
    pub fn is_match(&self, buffer: &[u8]) -> bool {
        self.to_matcher()
            .map(|matcher| matcher.find(buffer).is_some())
            .unwrap_or(false)
    }

    /// Convert pattern to a matcher implementation
    ///
    /// # Examples
    ///
    /// ```
    /// use pity::{Match, Matcher, Pattern};
    ///
    /// let matcher: Box<dyn Matcher> = Pattern::exact("42").to_matcher().unwrap();
    /// assert_eq!(matcher.find(b"answer: 42"), Some(Match { start: 8, end: 10 }));
    /// ```
    pub fn to_matcher(&self) -> Result<Box<dyn Matcher>, PatternError> {
        use matcher::{ExactMatcher, GlobMatcher, RegexMatcher};

        match self {
            Pattern::Exact(s) => Ok(Box::new(ExactMatcher::new(s.as_bytes())?)),
            Pattern::Regex(r) => Ok(Box::new(RegexMatcher::from_regex(r.clone()))),
            Pattern::Glob(g) => Ok(Box::new(GlobMatcher::new(g)?)),
        }
    }
}
