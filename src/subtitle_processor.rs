use std::fmt;
use std::ops::Deref;

use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::CueError;

// @module: Timed cue parsing for WebVTT and SRT subtitle text

// @const: Optional WebVTT file header
static WEBVTT_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^WEBVTT").unwrap()
});

// @const: Cue index line (cosmetic, SRT style)
static CUE_INDEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+$").unwrap()
});

const RANGE_SEPARATOR: &str = "-->";

// @struct: Single timed subtitle line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedCue {
    // @field: Start time in ms
    pub start_ms: u64,

    // @field: End time in ms (inclusive)
    pub end_ms: u64,

    // @field: Cue text, lines joined with a single space
    pub text: String,
}

impl TimedCue {
    /// Creates a cue without validation - used by tests and external consumers
    pub fn new(start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        TimedCue {
            start_ms,
            end_ms,
            text: text.into(),
        }
    }

    /// Whether `time_ms` falls inside `[start_ms, end_ms]`
    pub fn contains(&self, time_ms: u64) -> bool {
        time_ms >= self.start_ms && time_ms <= self.end_ms
    }

    /// Start position in seconds, as consumed by the playback clock
    pub fn start_seconds(&self) -> f64 {
        self.start_ms as f64 / 1000.0
    }

    /// Convert start time to formatted WebVTT timestamp
    pub fn format_start_time(&self) -> String {
        format_timestamp(self.start_ms)
    }

    /// Convert end time to formatted WebVTT timestamp
    pub fn format_end_time(&self) -> String {
        format_timestamp(self.end_ms)
    }
}

impl fmt::Display for TimedCue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Cues ordered ascending by start time.
///
/// Overlapping ranges are allowed. An empty sequence means "no subtitles
/// available" and is a normal state, not an error. Sequences are never
/// mutated after construction; a re-parse produces a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CueSequence {
    cues: Vec<TimedCue>,
}

impl CueSequence {
    /// Build a sequence from cues in any order. Sorting is stable, so cues
    /// sharing a start time keep their relative order.
    pub fn from_unsorted(mut cues: Vec<TimedCue>) -> Self {
        cues.sort_by_key(|cue| cue.start_ms);
        CueSequence { cues }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of adjacent pairs whose ranges overlap
    pub fn overlap_count(&self) -> usize {
        self.cues
            .windows(2)
            .filter(|pair| pair[0].end_ms > pair[1].start_ms)
            .count()
    }
}

impl Deref for CueSequence {
    type Target = [TimedCue];

    fn deref(&self) -> &[TimedCue] {
        &self.cues
    }
}

impl<'a> IntoIterator for &'a CueSequence {
    type Item = &'a TimedCue;
    type IntoIter = std::slice::Iter<'a, TimedCue>;

    fn into_iter(self) -> Self::IntoIter {
        self.cues.iter()
    }
}

impl fmt::Display for CueSequence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "WEBVTT")?;
        writeln!(f)?;
        for cue in &self.cues {
            write!(f, "{}", cue)?;
        }
        Ok(())
    }
}

/// Parse WebVTT or SRT text into a sorted cue sequence.
///
/// Never fails: blocks that cannot be parsed are skipped and logged at debug
/// level, so the result may be partial or empty.
pub fn parse_subtitles(raw: &str) -> CueSequence {
    let normalized = raw.replace('\u{FEFF}', "").replace('\r', "");
    let text = normalized.trim();
    if text.is_empty() {
        return CueSequence::empty();
    }

    let body = strip_header(text);
    let mut cues = Vec::new();
    let mut skipped = 0;

    for (block_no, block) in split_blocks(body).iter().enumerate() {
        match parse_block(block) {
            Ok(cue) => cues.push(cue),
            Err(e) => {
                skipped += 1;
                debug!("Skipping cue block {}: {}", block_no + 1, e);
            }
        }
    }

    let sequence = CueSequence::from_unsorted(cues);
    if skipped > 0 {
        debug!("Parsed {} cues, skipped {} malformed blocks", sequence.len(), skipped);
    }
    let overlaps = sequence.overlap_count();
    if overlaps > 0 {
        trace!("Found {} overlapping cue pairs", overlaps);
    }
    sequence
}

/// Drop a leading `WEBVTT` line and any header lines up to the next blank line.
/// A timing line ends the header early when the blank line is missing.
fn strip_header(text: &str) -> &str {
    if !WEBVTT_HEADER.is_match(text) {
        return text;
    }
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim().is_empty() || (offset > 0 && line.contains(RANGE_SEPARATOR)) {
            return text[offset..].trim_start();
        }
        offset += line.len();
    }
    ""
}

/// Group trimmed, non-empty lines into blocks separated by blank lines
fn split_blocks(body: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in body.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn parse_block(lines: &[&str]) -> Result<TimedCue, CueError> {
    let mut rows = lines.iter().copied();
    let mut time_row = rows.next().ok_or(CueError::MissingSeparator)?;
    if CUE_INDEX.is_match(time_row) {
        time_row = rows.next().ok_or(CueError::MissingSeparator)?;
    }

    let (start_raw, end_raw) = time_row
        .split_once(RANGE_SEPARATOR)
        .ok_or(CueError::MissingSeparator)?;
    let start_ms = parse_timestamp(start_raw)?;
    let end_ms = parse_timestamp(end_raw)?;

    let text = rows.collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        return Err(CueError::EmptyText);
    }

    Ok(TimedCue { start_ms, end_ms, text })
}

/// Parse `HH:MM:SS.mmm` or `MM:SS.mmm` into milliseconds.
///
/// Accepts `,` as the decimal separator. The fraction is right-padded with
/// zeros and cut to three digits, never rounded. Anything after the first
/// whitespace (WebVTT cue settings) is ignored.
pub fn parse_timestamp(raw: &str) -> Result<u64, CueError> {
    let invalid = || CueError::InvalidTimestamp(raw.trim().to_string());

    let token = raw.split_whitespace().next().ok_or_else(invalid)?;
    let clean = token.replacen(',', ".", 1);

    let fields: Vec<&str> = clean.split(':').collect();
    let (hours, minutes, rest) = match fields.as_slice() {
        [mm, rest] => ("0", *mm, *rest),
        [hh, mm, rest] => (*hh, *mm, *rest),
        _ => return Err(invalid()),
    };
    let (seconds, fraction) = rest.split_once('.').unwrap_or((rest, "0"));

    let hours = parse_digits(hours).ok_or_else(invalid)?;
    let minutes = parse_digits(minutes).ok_or_else(invalid)?;
    let seconds = parse_digits(seconds).ok_or_else(invalid)?;
    let millis = parse_fraction(fraction).ok_or_else(invalid)?;

    hours
        .checked_mul(3_600_000)
        .and_then(|ms| ms.checked_add(minutes.checked_mul(60_000)?))
        .and_then(|ms| ms.checked_add(seconds.checked_mul(1_000)?))
        .and_then(|ms| ms.checked_add(millis))
        .ok_or_else(invalid)
}

fn parse_digits(field: &str) -> Option<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

fn parse_fraction(fraction: &str) -> Option<u64> {
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut digits: String = fraction.chars().take(3).collect();
    while digits.len() < 3 {
        digits.push('0');
    }
    digits.parse().ok()
}

/// Format milliseconds as a WebVTT timestamp (HH:MM:SS.mmm)
pub fn format_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}
