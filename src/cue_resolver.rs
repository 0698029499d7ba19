/*!
 * Active cue resolution.
 *
 * Maps a playback position to the cue that should be highlighted. Two
 * strategies are provided with identical results:
 * - [`active_index`]: linear scan, the reference behaviour.
 * - [`CueTimeline`]: precomputed running maximum of end times, resolved by
 *   binary search. Used by the scene session, which resolves on every tick.
 *
 * Both return the FIRST cue (lowest index) whose inclusive range
 * `[start_ms, end_ms]` contains the time, so overlapping cues resolve to the
 * earlier one.
 */

use crate::subtitle_processor::{CueSequence, TimedCue};

/// Index of the first cue containing `time_ms`, or `None`
pub fn active_index(cues: &[TimedCue], time_ms: u64) -> Option<usize> {
    cues.iter().position(|cue| cue.contains(time_ms))
}

/// Convert a clock position in seconds to resolver milliseconds.
///
/// Truncates toward zero. Non-finite and negative positions have no
/// millisecond equivalent.
pub fn seconds_to_ms(seconds: f64) -> Option<u64> {
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some((seconds * 1000.0).floor() as u64)
}

/// Cue sequence indexed for repeated lookups
#[derive(Debug, Clone, Default)]
pub struct CueTimeline {
    cues: CueSequence,
    /// `max_end[i]` is the largest `end_ms` among `cues[..=i]`
    max_end: Vec<u64>,
}

impl CueTimeline {
    pub fn new(cues: CueSequence) -> Self {
        let max_end = cues
            .iter()
            .scan(0u64, |max, cue| {
                *max = (*max).max(cue.end_ms);
                Some(*max)
            })
            .collect();
        CueTimeline { cues, max_end }
    }

    /// Same result as [`active_index`] in O(log n).
    ///
    /// The running maximum is non-decreasing, so the first index where it
    /// reaches `time_ms` is the first cue ending at or after `time_ms`. Cues
    /// are sorted by start, so if that cue starts after `time_ms` every later
    /// one does too.
    pub fn active_index(&self, time_ms: u64) -> Option<usize> {
        let idx = self.max_end.partition_point(|&end| end < time_ms);
        let cue = self.cues.get(idx)?;
        (cue.start_ms <= time_ms).then_some(idx)
    }

    /// Resolve directly from a clock position in seconds
    pub fn active_at_seconds(&self, seconds: f64) -> Option<usize> {
        seconds_to_ms(seconds).and_then(|ms| self.active_index(ms))
    }

    pub fn cue(&self, index: usize) -> Option<&TimedCue> {
        self.cues.get(index)
    }

    pub fn cues(&self) -> &CueSequence {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}
