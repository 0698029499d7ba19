use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles the scene configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Where to look for subtitle files
    #[serde(default)]
    pub subtitles: SubtitleConfig,

    /// Stage delays and effect sizes
    #[serde(default)]
    pub choreography: ChoreographyConfig,

    /// Playback window of the finale
    #[serde(default)]
    pub finale: FinaleConfig,

    /// Position thresholds for presentation-only flags
    #[serde(default)]
    pub presentation: PresentationConfig,

    /// Action button texts
    #[serde(default)]
    pub labels: LabelConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Subtitle asset lookup
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubtitleConfig {
    // @field: Directory candidate paths are relative to
    #[serde(default = "default_asset_root")]
    pub asset_root: PathBuf,

    // @field: Candidate files, most preferred first
    #[serde(default = "default_candidates")]
    pub candidates: Vec<PathBuf>,
}

impl SubtitleConfig {
    /// Candidate paths resolved against the asset root
    pub fn candidate_paths(&self) -> Vec<PathBuf> {
        self.candidates
            .iter()
            .map(|candidate| self.asset_root.join(candidate))
            .collect()
    }
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            asset_root: default_asset_root(),
            candidates: default_candidates(),
        }
    }
}

/// Stage delays in milliseconds and firework sizes
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChoreographyConfig {
    #[serde(default = "default_establish_ms")]
    pub establish_ms: u64,

    #[serde(default = "default_vows_ms")]
    pub vows_ms: u64,

    #[serde(default = "default_singing_ms")]
    pub singing_ms: u64,

    #[serde(default = "default_kiss_ms")]
    pub kiss_ms: u64,

    #[serde(default = "default_celebration_ms")]
    pub celebration_ms: u64,

    /// How long fireworks stay visible after the last burst
    #[serde(default = "default_fireworks_visible_ms")]
    pub fireworks_visible_ms: u64,

    /// Bursts launched by the ceremony action
    #[serde(default = "default_ceremony_bursts")]
    pub ceremony_bursts: u32,

    /// Bursts launched when playback enters the finale
    #[serde(default = "default_finale_bursts")]
    pub finale_bursts: u32,
}

impl Default for ChoreographyConfig {
    fn default() -> Self {
        Self {
            establish_ms: default_establish_ms(),
            vows_ms: default_vows_ms(),
            singing_ms: default_singing_ms(),
            kiss_ms: default_kiss_ms(),
            celebration_ms: default_celebration_ms(),
            fireworks_visible_ms: default_fireworks_visible_ms(),
            ceremony_bursts: default_ceremony_bursts(),
            finale_bursts: default_finale_bursts(),
        }
    }
}

/// Finale window in playback seconds
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FinaleConfig {
    #[serde(default = "default_finale_start")]
    pub start_seconds: f64,

    #[serde(default = "default_finale_end")]
    pub end_seconds: f64,
}

impl FinaleConfig {
    pub fn duration_seconds(&self) -> f64 {
        (self.end_seconds - self.start_seconds).max(0.0)
    }
}

impl Default for FinaleConfig {
    fn default() -> Self {
        Self {
            start_seconds: default_finale_start(),
            end_seconds: default_finale_end(),
        }
    }
}

/// Thresholds for the film reel and blessing banner
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PresentationConfig {
    #[serde(default = "default_reel_start")]
    pub reel_start_seconds: f64,

    #[serde(default = "default_reel_fade")]
    pub reel_fade_seconds: f64,

    #[serde(default = "default_blessing_start")]
    pub blessing_start_seconds: f64,

    /// Blessing fades out this many seconds before the track ends
    #[serde(default = "default_blessing_tail")]
    pub blessing_tail_seconds: f64,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            reel_start_seconds: default_reel_start(),
            reel_fade_seconds: default_reel_fade(),
            blessing_start_seconds: default_blessing_start(),
            blessing_tail_seconds: default_blessing_tail(),
        }
    }
}

/// Action button texts
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LabelConfig {
    /// Shown until the ceremony has played through
    #[serde(default = "default_initial_label")]
    pub initial: String,

    /// Shown in the final tableau
    #[serde(default = "default_replay_label")]
    pub replay: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            initial: default_initial_label(),
            replay: default_replay_label(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_asset_root() -> PathBuf {
    PathBuf::from("public")
}

fn default_candidates() -> Vec<PathBuf> {
    ["lyrics/song.vtt", "lyrics/song.srt", "assets/song.vtt", "assets/song.srt"]
        .iter()
        .map(PathBuf::from)
        .collect()
}

fn default_establish_ms() -> u64 {
    1400
}

fn default_vows_ms() -> u64 {
    1500
}

fn default_singing_ms() -> u64 {
    1800
}

fn default_kiss_ms() -> u64 {
    1800
}

fn default_celebration_ms() -> u64 {
    3200
}

fn default_fireworks_visible_ms() -> u64 {
    15_000
}

fn default_ceremony_bursts() -> u32 {
    7
}

fn default_finale_bursts() -> u32 {
    8
}

fn default_finale_start() -> f64 {
    169.6
}

fn default_finale_end() -> f64 {
    202.6
}

fn default_reel_start() -> f64 {
    28.0
}

fn default_reel_fade() -> f64 {
    160.0
}

fn default_blessing_start() -> f64 {
    169.0
}

fn default_blessing_tail() -> f64 {
    3.0
}

fn default_initial_label() -> String {
    "💍 结婚".to_string()
}

fn default_replay_label() -> String {
    "🎉 再来一次".to_string()
}

impl Config {
    /// Load a JSON config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write the config as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Load the config, or write and return the defaults if the file is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<(Self, bool)> {
        let path = path.as_ref();
        if path.exists() {
            return Ok((Self::from_file(path)?, false));
        }
        let config = Self::default();
        config.save(path)?;
        Ok((config, true))
    }

    pub fn validate(&self) -> Result<()> {
        if self.subtitles.candidates.is_empty() {
            return Err(anyhow!("At least one subtitle candidate path is required"));
        }

        let c = &self.choreography;
        let delays = [
            ("establish_ms", c.establish_ms),
            ("vows_ms", c.vows_ms),
            ("singing_ms", c.singing_ms),
            ("kiss_ms", c.kiss_ms),
            ("celebration_ms", c.celebration_ms),
            ("fireworks_visible_ms", c.fireworks_visible_ms),
        ];
        if let Some((name, _)) = delays.iter().find(|(_, ms)| *ms == 0) {
            return Err(anyhow!("Choreography delay {} must be greater than zero", name));
        }

        let f = &self.finale;
        if !f.start_seconds.is_finite() || !f.end_seconds.is_finite() || f.start_seconds < 0.0 {
            return Err(anyhow!("Finale window must be finite and non-negative"));
        }
        if f.end_seconds < f.start_seconds {
            return Err(anyhow!(
                "Finale end {} is before finale start {}",
                f.end_seconds, f.start_seconds
            ));
        }

        let p = &self.presentation;
        let thresholds = [
            p.reel_start_seconds,
            p.reel_fade_seconds,
            p.blessing_start_seconds,
            p.blessing_tail_seconds,
        ];
        if thresholds.iter().any(|t| !t.is_finite() || *t < 0.0) {
            return Err(anyhow!("Presentation thresholds must be finite and non-negative"));
        }

        if self.labels.initial.trim().is_empty() || self.labels.replay.trim().is_empty() {
            return Err(anyhow!("Action labels cannot be empty"));
        }

        Ok(())
    }
}
