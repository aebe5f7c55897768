//! Finds time-of-day values in free form text

use std::sync::LazyLock;

use regex::{CaptureMatches, Regex};

/// Hour 0-29, minute 00-59.
///
/// Hours past 23 are let through on purpose, timetables write trips after
/// midnight as "24:15" and similar.
static TIME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([0-2]?[0-9]):([0-5][0-9])\b").expect("valid time regex"));

/// Lazily yields every time in `text` as zero padded `HH:MM`, left to right.
/// Call again to start over.
pub fn extract_times(text: &str) -> TimeTokens<'_> {
    TimeTokens {
        captures: TIME_PATTERN.captures_iter(text),
    }
}

/// The first time found in `text`, if any.
pub fn first_time(text: &str) -> Option<String> {
    extract_times(text).next()
}

pub struct TimeTokens<'t> {
    captures: CaptureMatches<'static, 't>,
}

impl Iterator for TimeTokens<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let caps = self.captures.next()?;
        Some(format!("{:0>2}:{}", &caps[1], &caps[2]))
    }
}
