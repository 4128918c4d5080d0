//! Locating a structured payload inside noisy analyzer output
//!
//! Analyzers print progress lines, warnings and banners around their report.
//! The JSON scanner runs as a small state machine:
//!
//! 1. `SeekStart` finds the first `{` or `[`.
//! 2. `SeekEnd` finds the last closing bracket of the same kind.
//! 3. `TrimComma` drops commas (and whitespace) left dangling right before
//!    that closing bracket.
//!
//! Running the scanner over its own output returns the same text.

use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    SeekStart { from: usize },
    SeekEnd { start: usize, close: char },
    TrimComma { start: usize, end: usize, close: char },
}

/// Extract the JSON payload starting at the first bracket
pub fn extract_json(input: &str) -> Option<Cow<'_, str>> {
    scan_json(input, 0).map(|(_, payload)| payload)
}

/// Candidate payloads, one per opening bracket that yields a bracket pair
///
/// The first candidate equals [`extract_json`]. Later ones start at later
/// opening brackets, which recovers payloads preceded by bracketed log
/// prefixes such as `[INFO]`.
pub fn json_candidates(input: &str) -> impl Iterator<Item = Cow<'_, str>> {
    let mut from = 0;
    std::iter::from_fn(move || {
        let (start, payload) = scan_json(input, from)?;
        from = start + 1;
        Some(payload)
    })
}

fn scan_json(input: &str, from: usize) -> Option<(usize, Cow<'_, str>)> {
    let mut state = ScanState::SeekStart { from };

    loop {
        state = match state {
            ScanState::SeekStart { from } => {
                let offset = input.get(from..)?.find(['{', '['])?;
                let start = from + offset;
                let close = if input[start..].starts_with('{') { '}' } else { ']' };
                ScanState::SeekEnd { start, close }
            }
            ScanState::SeekEnd { start, close } => match input[start..].rfind(close) {
                Some(offset) => ScanState::TrimComma {
                    start,
                    end: start + offset,
                    close,
                },
                // unterminated; a later bracket may still pair up
                None => ScanState::SeekStart { from: start + 1 },
            },
            ScanState::TrimComma { start, end, close } => {
                let body = &input[start..end];
                let trimmed = body.trim_end();
                let payload = if trimmed.ends_with(',') {
                    let body = body.trim_end_matches(|c: char| c == ',' || c.is_whitespace());
                    Cow::Owned(format!("{}{}", body, close))
                } else {
                    Cow::Borrowed(&input[start..end + close.len_utf8()])
                };
                return Some((start, payload));
            }
        };
    }
}

/// Extract an XML document: from the first `<` to the last `>`
pub fn extract_xml(input: &str) -> Option<&str> {
    let start = input.find('<')?;
    let end = input.rfind('>')?;
    (end > start).then(|| &input[start..=end])
}
