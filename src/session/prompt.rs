//! Prompt capture
//!
//! Without an explicit prompt, the first line the program prints is taken to
//! be its ready-prompt. A program that prints a banner first will have the
//! banner recorded instead; pass an explicit prompt for such programs.

use super::read::{read_until, ReadSettings};
use super::spawn::Terminal;
use crate::result::ExpectError;
use std::time::Duration;

/// Read until the first line terminator (or `timeout`) and return the text
/// without its trailing terminator.
pub(crate) async fn capture(
    terminal: &mut Terminal,
    settings: ReadSettings,
    timeout: Duration,
) -> Result<String, ExpectError> {
    let (output, logger) = terminal.reader();
    let captured = read_until(output, settings, logger, timeout, |buf| {
        buf.contains(&b'\n')
    })
    .await?;

    Ok(chomp(captured.as_str()).to_string())
}

/// Strip one trailing `\r\n`, `\n` or `\r`.
pub(crate) fn chomp(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .or_else(|| text.strip_suffix('\r'))
        .unwrap_or(text)
}
