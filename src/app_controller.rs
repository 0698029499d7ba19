use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::app_config::Config;
use crate::choreography::{
    ChoreographyController, ChoreographyEvent, ChoreographySnapshot, PlaybackClock, PlaybackSample, Stage,
};
use crate::cue_resolver::CueTimeline;
use crate::file_utils;
use crate::subtitle_processor::CueSequence;

// @module: Scene session driving the choreography from transport and UI events

/// Inputs from the audio transport and the UI
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// Periodic position report, seconds
    TimeUpdate(f64),
    Play,
    Pause,
    /// User moved the playhead, seconds
    Seek(f64),
    /// User clicked a subtitle line
    SeekToLine(usize),
    /// Track length became known, seconds
    Duration(f64),
    /// Ceremony button
    Advance,
    /// Replay button
    Reset,
    /// Open the envelope
    Unseal,
    /// End the session and release its timers
    Shutdown,
}

/// Everything the renderer needs after one input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSnapshot {
    pub choreography: ChoreographySnapshot,
    pub position: f64,
    pub duration: Option<f64>,
    pub is_playing: bool,
    pub active_line: Option<usize>,
    pub active_text: Option<String>,
    /// False shows the "no subtitles" placeholder
    pub has_subtitles: bool,
    pub sealed: bool,
}

/// One scene: choreography, playback clock and subtitle timeline.
///
/// Cue highlighting and the threshold watchers read the same clock but do
/// not depend on each other.
#[derive(Debug)]
pub struct SceneSession {
    controller: ChoreographyController,
    clock: PlaybackClock,
    timeline: CueTimeline,
    sealed: bool,
    active_line: Option<usize>,
}

impl SceneSession {
    pub fn new(config: &Config, cues: CueSequence, now: Duration) -> Self {
        Self {
            controller: ChoreographyController::new(config, now),
            clock: PlaybackClock::new(),
            timeline: CueTimeline::new(cues),
            sealed: true,
            active_line: None,
        }
    }

    pub fn controller(&self) -> &ChoreographyController {
        &self.controller
    }

    pub fn timeline(&self) -> &CueTimeline {
        &self.timeline
    }

    /// Apply one input at session time `now`
    pub fn handle(&mut self, event: SceneEvent, now: Duration) -> Vec<ChoreographyEvent> {
        let changes = match event {
            SceneEvent::TimeUpdate(position) => {
                let sample = self.clock.time_update(position);
                self.observe(sample, now)
            }
            SceneEvent::Play => {
                let sample = self.clock.play();
                self.controller.observe(sample, now)
            }
            SceneEvent::Pause => {
                let sample = self.clock.pause();
                self.controller.observe(sample, now)
            }
            SceneEvent::Seek(position) => {
                let sample = self.clock.seek(position);
                self.observe(sample, now)
            }
            SceneEvent::SeekToLine(index) => match self.timeline.cue(index) {
                Some(cue) => {
                    let sample = self.clock.seek(cue.start_seconds());
                    self.observe(sample, now)
                }
                None => {
                    debug!("Ignoring seek to missing line {}", index);
                    Vec::new()
                }
            },
            SceneEvent::Duration(duration) => {
                match self.clock.set_duration(duration) {
                    Ok(()) => self.controller.set_duration(self.clock.duration()),
                    Err(e) => debug!("Ignoring track duration: {}", e),
                }
                Vec::new()
            }
            SceneEvent::Advance => self.controller.advance(now),
            SceneEvent::Reset => self.controller.reset(now),
            SceneEvent::Unseal => {
                self.sealed = false;
                Vec::new()
            }
            SceneEvent::Shutdown => {
                self.shutdown();
                Vec::new()
            }
        };

        self.track_active_line();
        changes
    }

    pub fn poll(&mut self, now: Duration) -> Vec<ChoreographyEvent> {
        self.controller.poll(now)
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.controller.next_deadline()
    }

    pub fn shutdown(&mut self) {
        self.controller.shutdown();
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        let active_text = self
            .active_line
            .and_then(|i| self.timeline.cue(i))
            .map(|cue| cue.text.clone());

        SceneSnapshot {
            choreography: self.controller.snapshot(),
            position: self.clock.position(),
            duration: self.clock.duration(),
            is_playing: self.clock.is_playing(),
            active_line: self.active_line,
            active_text,
            has_subtitles: !self.timeline.is_empty(),
            sealed: self.sealed,
        }
    }

    fn observe<E: std::fmt::Display>(
        &mut self,
        sample: Result<PlaybackSample, E>,
        now: Duration,
    ) -> Vec<ChoreographyEvent> {
        match sample {
            Ok(sample) => self.controller.observe(sample, now),
            Err(e) => {
                debug!("Ignoring clock sample: {}", e);
                Vec::new()
            }
        }
    }

    fn track_active_line(&mut self) {
        let line = self.timeline.active_at_seconds(self.clock.position());
        if line == self.active_line {
            return;
        }
        self.active_line = line;
        if let Some(cue) = line.and_then(|i| self.timeline.cue(i)) {
            info!("♪ {}", cue.text);
        }
    }
}

/// Counters reported when a session ends
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSummary {
    pub events_handled: usize,
    pub stage_changes: usize,
    pub effects: usize,
    pub final_stage: Stage,
}

impl SessionSummary {
    fn record(&mut self, changes: &[ChoreographyEvent]) {
        for change in changes {
            match change {
                ChoreographyEvent::StageChanged { .. } => self.stage_changes += 1,
                ChoreographyEvent::Effect(_) => self.effects += 1,
                ChoreographyEvent::FireworksFaded => {}
            }
        }
    }
}

/// Drive a session until a `Shutdown` event arrives or every sender is gone.
///
/// Runs on the caller's task: events are applied one at a time and the
/// pending timers are polled when their deadline passes. A snapshot is
/// published after every input.
pub async fn run_session(
    mut session: SceneSession,
    started: Instant,
    mut events: mpsc::Receiver<SceneEvent>,
    snapshots: watch::Sender<SceneSnapshot>,
) -> SessionSummary {
    let mut summary = SessionSummary::default();

    loop {
        let deadline = session.next_deadline().map(|d| started + d);
        let changes = tokio::select! {
            event = events.recv() => match event {
                None | Some(SceneEvent::Shutdown) => break,
                Some(event) => {
                    summary.events_handled += 1;
                    session.handle(event, started.elapsed())
                }
            },
            _ = sleep_until_deadline(deadline) => session.poll(started.elapsed()),
        };
        summary.record(&changes);
        snapshots.send_replace(session.snapshot());
    }

    session.shutdown();
    let last = session.snapshot();
    summary.final_stage = last.choreography.stage;
    snapshots.send_replace(last);
    summary
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

/// Handle to a running session task
pub struct SceneHandle {
    events: mpsc::Sender<SceneEvent>,
    snapshots: watch::Receiver<SceneSnapshot>,
    task: JoinHandle<SessionSummary>,
}

impl SceneHandle {
    pub async fn send(&self, event: SceneEvent) -> Result<()> {
        self.events
            .send(event)
            .await
            .map_err(|_| anyhow::anyhow!("Scene session has stopped"))
    }

    /// A sender the audio transport can own
    pub fn sender(&self) -> mpsc::Sender<SceneEvent> {
        self.events.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SceneSnapshot> {
        self.snapshots.clone()
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Stop the session and wait for it to release its timers
    pub async fn shutdown(self) -> Result<SessionSummary> {
        // the task may already have stopped; joining still yields its summary
        let _ = self.events.send(SceneEvent::Shutdown).await;
        self.task.await.context("Scene session task failed")
    }
}

/// Main application controller for the scene
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load subtitles from the configured candidates. Missing files give an
    /// empty sequence.
    pub fn load_cues(&self) -> CueSequence {
        let candidates = self.config.subtitles.candidate_paths();
        match file_utils::find_subtitles(&candidates) {
            Ok(loaded) => {
                info!("Loaded {} subtitle lines from {:?}", loaded.cues.len(), loaded.path);
                loaded.cues
            }
            Err(e) => {
                warn!("No subtitles available: {}", e);
                CueSequence::empty()
            }
        }
    }

    /// Spawn a session task on the current runtime
    pub fn start(&self, cues: CueSequence) -> SceneHandle {
        let started = Instant::now();
        let session = SceneSession::new(&self.config, cues, Duration::ZERO);
        let (events_tx, events_rx) = mpsc::channel(64);
        let (snapshots_tx, snapshots_rx) = watch::channel(session.snapshot());
        let task = tokio::spawn(run_session(session, started, events_rx, snapshots_tx));

        SceneHandle {
            events: events_tx,
            snapshots: snapshots_rx,
            task,
        }
    }
}
