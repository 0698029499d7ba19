use std::time::Duration;

use log::{debug, info};
use serde::Serialize;

use crate::app_config::{ChoreographyConfig, Config, FinaleConfig, LabelConfig, PresentationConfig};

use super::stage::Stage;
use super::threshold::{PlaybackSample, ThresholdWatcher};
use super::timer::TimerSlot;

/// One-shot effects handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    Fireworks { bursts: u32 },
}

/// What changed as the result of one controller input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChoreographyEvent {
    StageChanged { from: Stage, to: Stage },
    Effect(Effect),
    FireworksFaded,
}

/// Read-only view of the controller consumed by the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoreographySnapshot {
    pub stage: Stage,
    pub action_label: String,
    pub manual_override: bool,
    /// Position lies inside the finale window
    pub finale_window: bool,
    /// Finale presentation is on (window or manual override)
    pub finale_active: bool,
    /// Seconds into the finale, clamped to the window length
    pub finale_progress: f64,
    pub reel_active: bool,
    pub reel_fade_out: bool,
    pub blessing_active: bool,
    pub blessing_fade_out: bool,
    pub fireworks_visible: bool,
}

/// Stage machine for the ceremony.
///
/// Time is passed in as `now`, the elapsed time since the session started,
/// so the controller itself never sleeps or reads a clock. The driver calls
/// [`poll`](Self::poll) at [`next_deadline`](Self::next_deadline).
#[derive(Debug)]
pub struct ChoreographyController {
    timings: ChoreographyConfig,
    finale: FinaleConfig,
    presentation: PresentationConfig,
    labels: LabelConfig,

    stage: Stage,
    timer: TimerSlot,
    manual_override: bool,
    action_label: String,

    finale_watcher: ThresholdWatcher<Effect>,
    sample: PlaybackSample,
    duration: Option<f64>,
    fireworks_until: Option<Duration>,
}

impl ChoreographyController {
    /// Create a controller in `establish` with its timer armed from `now`
    pub fn new(config: &Config, now: Duration) -> Self {
        let finale_effect = Effect::Fireworks {
            bursts: config.choreography.finale_bursts,
        };
        let mut controller = Self {
            timings: config.choreography.clone(),
            finale: config.finale.clone(),
            presentation: config.presentation.clone(),
            labels: config.labels.clone(),
            stage: Stage::Establish,
            timer: TimerSlot::new(),
            manual_override: false,
            action_label: config.labels.initial.clone(),
            finale_watcher: ThresholdWatcher::new(config.finale.start_seconds, finale_effect),
            sample: PlaybackSample::at(0.0, false),
            duration: None,
            fireworks_until: None,
        };
        controller.arm_stage_timer(now);
        controller
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn action_label(&self) -> &str {
        &self.action_label
    }

    pub fn manual_override(&self) -> bool {
        self.manual_override
    }

    /// The ceremony button.
    ///
    /// From `before` starts the song sequence with fireworks and forces the
    /// finale presentation; from `freeze` starts over. Ignored elsewhere.
    pub fn advance(&mut self, now: Duration) -> Vec<ChoreographyEvent> {
        if !self.stage.accepts_advance() {
            debug!("Ignoring advance in stage {}", self.stage);
            return Vec::new();
        }
        match self.stage {
            Stage::Before => {
                self.manual_override = true;
                let changed = self.enter_stage(Stage::Singing, now);
                let bursts = self.timings.ceremony_bursts;
                let fireworks = self.apply_effect(Effect::Fireworks { bursts }, now);
                vec![changed, fireworks]
            }
            _ => {
                self.manual_override = false;
                self.action_label = self.labels.initial.clone();
                vec![self.enter_stage(Stage::Establish, now)]
            }
        }
    }

    /// The replay action; only meaningful from `freeze`
    pub fn reset(&mut self, now: Duration) -> Vec<ChoreographyEvent> {
        if self.stage != Stage::Freeze {
            debug!("Ignoring reset in stage {}", self.stage);
            return Vec::new();
        }
        self.advance(now)
    }

    /// Re-enter `establish` from any stage, dropping whatever timer was pending
    pub fn restart(&mut self, now: Duration) -> Vec<ChoreographyEvent> {
        self.manual_override = false;
        self.action_label = self.labels.initial.clone();
        vec![self.enter_stage(Stage::Establish, now)]
    }

    /// Feed one playback sample to the threshold watchers.
    ///
    /// Invalid samples are dropped and the derived state keeps the last valid
    /// sample.
    pub fn observe(&mut self, sample: PlaybackSample, now: Duration) -> Vec<ChoreographyEvent> {
        if !sample.is_valid() {
            debug!("Ignoring invalid playback sample {:?}", sample);
            return Vec::new();
        }
        self.sample = sample;

        match self.finale_watcher.observe(&sample) {
            Some(effect) => {
                info!("Playback crossed finale start at {:.2}s", sample.current);
                vec![self.apply_effect(effect, now)]
            }
            None => Vec::new(),
        }
    }

    /// Track length for the blessing fade-out; `None` while unknown
    pub fn set_duration(&mut self, duration: Option<f64>) {
        self.duration = duration.filter(|d| d.is_finite() && *d > 0.0);
    }

    /// Fire whatever is due at `now`
    pub fn poll(&mut self, now: Duration) -> Vec<ChoreographyEvent> {
        let mut events = Vec::new();

        if let Some(timer) = self.timer.take_due(now, self.stage) {
            events.push(self.enter_stage(timer.target, now));
        }

        if self.fireworks_until.is_some_and(|until| until <= now) {
            self.fireworks_until = None;
            events.push(ChoreographyEvent::FireworksFaded);
        }

        events
    }

    /// Earliest time at which [`poll`](Self::poll) has something to do
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.timer.deadline(), self.fireworks_until) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Release every timer the controller holds
    pub fn shutdown(&mut self) {
        if let Some(timer) = self.timer.cancel() {
            debug!("Cancelled pending {} -> {} transition", timer.owner, timer.target);
        }
        self.fireworks_until = None;
    }

    pub fn snapshot(&self) -> ChoreographySnapshot {
        let t = self.sample.current;
        let playing = self.sample.is_playing;
        let p = &self.presentation;

        let finale_window = t >= self.finale.start_seconds && t <= self.finale.end_seconds;
        let finale_progress =
            (t - self.finale.start_seconds).clamp(0.0, self.finale.duration_seconds());
        let blessing_fade_out = playing
            && self
                .duration
                .is_some_and(|d| t >= (d - p.blessing_tail_seconds).max(0.0));

        ChoreographySnapshot {
            stage: self.stage,
            action_label: self.action_label.clone(),
            manual_override: self.manual_override,
            finale_window,
            finale_active: finale_window || self.manual_override,
            finale_progress,
            reel_active: playing && t >= p.reel_start_seconds,
            reel_fade_out: t >= p.reel_fade_seconds,
            blessing_active: playing && t >= p.blessing_start_seconds,
            blessing_fade_out,
            fireworks_visible: self.fireworks_until.is_some(),
        }
    }

    /// Every stage entry goes through here: the old timer is cancelled
    /// before the new stage arms its own.
    fn enter_stage(&mut self, next: Stage, now: Duration) -> ChoreographyEvent {
        let from = self.stage;
        self.timer.cancel();
        self.stage = next;

        if next == Stage::Freeze {
            self.action_label = self.labels.replay.clone();
            self.manual_override = false;
        }

        self.arm_stage_timer(now);
        info!("Stage {} -> {}", from, next);
        ChoreographyEvent::StageChanged { from, to: next }
    }

    fn arm_stage_timer(&mut self, now: Duration) {
        if let Some((delay, target)) = self.stage.timed_transition(&self.timings) {
            self.timer.arm(self.stage, target, now + delay);
        }
    }

    fn apply_effect(&mut self, effect: Effect, now: Duration) -> ChoreographyEvent {
        match effect {
            Effect::Fireworks { bursts } => {
                debug!("Launching {} firework bursts", bursts);
                self.fireworks_until =
                    Some(now + Duration::from_millis(self.timings.fireworks_visible_ms));
            }
        }
        ChoreographyEvent::Effect(effect)
    }
}
