//! Pattern matcher implementations

use crate::result::PatternError;
use globset::{Glob, GlobMatcher as GlobsetMatcher};
use regex::bytes::Regex;

/// Result of a pattern match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Start position of the match
    pub start: usize,
    /// End position of the match
    pub end: usize,
}

/// Trait for pattern matching
pub trait Matcher: Send + Sync {
    /// Find the first match in the buffer
    fn find(&self, buffer: &[u8]) -> Option<Match>;
}

/// Exact string matcher using Boyer-Moore-Horspool algorithm
pub struct ExactMatcher {
    pattern: Vec<u8>,
    bad_char_table: [usize; 256],
}

impl ExactMatcher {
    /// Create a new exact matcher
    pub fn new(pattern: impl Into<Vec<u8>>) -> Result<Self, PatternError> {
        let pattern = pattern.into();

        if pattern.is_empty() {
            return Err(PatternError::EmptyPattern);
        }

        let mut bad_char_table = [pattern.len(); 256];
        for (i, &byte) in pattern.iter().enumerate().take(pattern.len() - 1) {
            bad_char_table[byte as usize] = pattern.len() - 1 - i;
        }

        Ok(Self {
            pattern,
            bad_char_table,
        })
    }
}

impl Matcher for ExactMatcher {
    fn find(&self, buffer: &[u8]) -> Option<Match> {
        let len = self.pattern.len();
        let mut pos = 0;

        while pos + len <= buffer.len() {
            if buffer[pos..pos + len] == self.pattern[..] {
                return Some(Match {
                    start: pos,
                    end: pos + len,
                });
            }
            pos += self.bad_char_table[buffer[pos + len - 1] as usize];
        }

        None
    }
}

/// Regex matcher over raw bytes, so invalid UTF-8 in the output never hides a match
pub struct RegexMatcher {
    regex: Regex,
}

impl RegexMatcher {
    /// Compile a new regex matcher
    #[cfg(test)]
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    /// Wrap an already compiled regex
    pub fn from_regex(regex: Regex) -> Self {
        Self { regex }
    }
}

impl Matcher for RegexMatcher {
    fn find(&self, buffer: &[u8]) -> Option<Match> {
        self.regex.find(buffer).map(|m| Match {
            start: m.start(),
            end: m.end(),
        })
    }
}

/// Glob pattern matcher.
///
/// Checks every substring that starts and ends on a character boundary, so
/// it is quadratic in the buffer length.
pub struct GlobMatcher {
    matcher: GlobsetMatcher,
}

impl GlobMatcher {
    /// Create a new glob matcher
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::EmptyPattern);
        }
        let glob = Glob::new(pattern).map_err(|e| PatternError::InvalidGlob(e.to_string()))?;

        Ok(Self {
            matcher: glob.compile_matcher(),
        })
    }
}

impl Matcher for GlobMatcher {
    fn find(&self, buffer: &[u8]) -> Option<Match> {
        let text = String::from_utf8_lossy(buffer);
        if text.len() != buffer.len() {
            // Replacement characters would shift offsets; only plain UTF-8 is searched.
            return None;
        }

        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();

        for (i, &start) in boundaries.iter().enumerate() {
            for &end in &boundaries[i + 1..] {
                if self.matcher.is_match(&text[start..end]) {
                    return Some(Match { start, end });
                }
            }
        }

        None
    }
}
