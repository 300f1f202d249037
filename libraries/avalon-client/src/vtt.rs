//! WebVTT validation for caption uploads.

use std::fmt;
use std::path::Path;

const SIGNATURE: &str = "WEBVTT";
const TIMING_ARROW: &str = "-->";

/// The first problem found in a caption document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VttError {
    /// 1-based line number, 0 for whole-document problems
    pub line: usize,
    pub reason: String,
}

impl fmt::Display for VttError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.reason)
        } else {
            write!(f, "line {}: {}", self.line, self.reason)
        }
    }
}

impl std::error::Error for VttError {}

/// Check that `text` is a WebVTT document with at least one well-formed cue.
pub fn validate_vtt(text: &str) -> Result<(), VttError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.lines().enumerate();

    let header = lines.next().map(|(_, line)| line).unwrap_or_default();
    if !is_signature(header) {
        return Err(VttError {
            line: 1,
            reason: format!("expected {} signature", SIGNATURE),
        });
    }

    let mut cues = 0usize;
    for (index, line) in lines {
        if !line.contains(TIMING_ARROW) {
            continue;
        }
        let line_number = index + 1;
        let fail = |reason: String| VttError {
            line: line_number,
            reason,
        };

        let (start, rest) = line
            .split_once(TIMING_ARROW)
            .ok_or_else(|| fail("malformed cue timing".into()))?;
        // Cue settings may follow the end timestamp.
        let end = rest.split_whitespace().next().unwrap_or_default();

        let start_ms = parse_timestamp(start.trim())
            .ok_or_else(|| fail(format!("invalid start timestamp '{}'", start.trim())))?;
        let end_ms =
            parse_timestamp(end).ok_or_else(|| fail(format!("invalid end timestamp '{}'", end)))?;

        if end_ms < start_ms {
            return Err(fail("cue ends before it starts".into()));
        }
        cues += 1;
    }

    if cues == 0 {
        return Err(VttError {
            line: 0,
            reason: "no cues found".into(),
        });
    }

    Ok(())
}

/// Read and validate a caption file. Unreadable files are invalid.
pub fn is_valid_vtt(path: impl AsRef<Path>) -> bool {
    std::fs::read_to_string(path)
        .map(|text| validate_vtt(&text).is_ok())
        .unwrap_or(false)
}

fn is_signature(line: &str) -> bool {
    match line.strip_prefix(SIGNATURE) {
        Some(rest) => rest.is_empty() || rest.starts_with([' ', '\t']),
        None => false,
    }
}

/// Parse `[HH:]MM:SS.mmm` into milliseconds.
fn parse_timestamp(value: &str) -> Option<u64> {
    let (clock, millis) = value.split_once('.')?;
    if millis.len() != 3 || !millis.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let parts: Vec<&str> = clock.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, s] => ("0", *m, *s),
        [h, m, s] if h.len() >= 2 => (*h, *m, *s),
        _ => return None,
    };

    if minutes.len() != 2 || seconds.len() != 2 {
        return None;
    }

    let hours: u64 = digits(hours)?;
    let minutes: u64 = digits(minutes)?;
    let seconds: u64 = digits(seconds)?;
    let millis: u64 = millis.parse().ok()?;

    if minutes >= 60 || seconds >= 60 {
        return None;
    }

    hours
        .checked_mul(60)?
        .checked_add(minutes)?
        .checked_mul(60)?
        .checked_add(seconds)?
        .checked_mul(1000)?
        .checked_add(millis)
}

fn digits(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}
