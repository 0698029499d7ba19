use serde::Serialize;

/// One observation of the playback clock.
///
/// `previous` is the position before this event and `current` the position
/// after it. Seeks and play/pause produce samples with `previous == current`,
/// so crossing detection never sees the jump.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaybackSample {
    pub previous: f64,
    pub current: f64,
    pub is_playing: bool,
}

impl PlaybackSample {
    pub fn new(previous: f64, current: f64, is_playing: bool) -> Self {
        Self { previous, current, is_playing }
    }

    /// A sample that cannot cross anything
    pub fn at(position: f64, is_playing: bool) -> Self {
        Self::new(position, position, is_playing)
    }

    /// Both positions finite and non-negative
    pub fn is_valid(&self) -> bool {
        [self.previous, self.current]
            .iter()
            .all(|t| t.is_finite() && *t >= 0.0)
    }

    /// `previous < threshold <= current` while playing
    pub fn crosses(&self, threshold: f64) -> bool {
        self.is_playing && self.previous < threshold && threshold <= self.current
    }
}

/// One-shot trigger armed against a playback position.
///
/// Fires at most once per forward crossing of `threshold_seconds` and
/// re-arms once a sample lands below the threshold again (e.g. after a
/// backward seek).
#[derive(Debug, Clone)]
pub struct ThresholdWatcher<E> {
    threshold_seconds: f64,
    fired: bool,
    effect: E,
}

impl<E: Clone> ThresholdWatcher<E> {
    pub fn new(threshold_seconds: f64, effect: E) -> Self {
        Self {
            threshold_seconds,
            fired: false,
            effect,
        }
    }

    pub fn threshold_seconds(&self) -> f64 {
        self.threshold_seconds
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Feed one sample; returns the effect if this sample fires the watcher.
    /// Invalid samples change nothing.
    pub fn observe(&mut self, sample: &PlaybackSample) -> Option<E> {
        if !sample.is_valid() {
            return None;
        }
        if sample.current < self.threshold_seconds {
            self.fired = false;
            return None;
        }
        if !self.fired && sample.crosses(self.threshold_seconds) {
            self.fired = true;
            return Some(self.effect.clone());
        }
        None
    }
}
