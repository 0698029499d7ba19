/*!
 * # pixelwalk - choreography core of an audio-synchronized ceremony scene
 *
 * Everything visual (sprites, particles, layout) lives in the renderer. This
 * crate holds the parts with behaviour worth testing:
 *
 * - Parse WebVTT and SRT lyrics into sorted timed cues
 * - Resolve which lyric line is active at a playback position
 * - Drive the ceremony through its stages with delayed transitions,
 *   user actions and one-shot playback thresholds
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `subtitle_processor`: Cue parsing for both subtitle dialects
 * - `cue_resolver`: Active line lookup (linear and indexed)
 * - `choreography`: Stage machine, pending timer, threshold watchers,
 *   playback clock
 * - `file_utils`: Subtitle asset lookup across candidate paths
 * - `app_controller`: Scene session driven by transport and UI events
 * - `app_config`: Configuration management
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod choreography;
pub mod cue_resolver;
pub mod errors;
pub mod file_utils;
pub mod subtitle_processor;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, SceneEvent, SceneSession, SceneSnapshot};
pub use choreography::{ChoreographyController, PlaybackSample, Stage, ThresholdWatcher};
pub use cue_resolver::{active_index, CueTimeline};
pub use errors::{AppError, CueError, LoadError, SampleError};
pub use subtitle_processor::{parse_subtitles, CueSequence, TimedCue};
