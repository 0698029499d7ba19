/*!
 * Error types for the pixelwalk scene core.
 *
 * None of these errors is fatal to a running scene: malformed cue blocks are
 * skipped, missing subtitle files degrade to an empty cue list and invalid
 * clock samples are ignored. The types exist so each recovery site can log
 * what it dropped, and so callers of the lower-level helpers can match on it.
 */

use std::path::PathBuf;

use thiserror::Error;

/// Reasons a single cue block is rejected by the parser
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CueError {
    /// The block has no line containing the `-->` range separator
    #[error("missing '-->' range separator")]
    MissingSeparator,

    /// A start or end timestamp could not be parsed
    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    /// The block has timing but no text lines
    #[error("cue has no text")]
    EmptyText,
}

/// Errors raised while locating subtitle assets
#[derive(Error, Debug)]
pub enum LoadError {
    /// None of the candidate paths exists or parses to at least one cue
    #[error("no usable subtitle file among {} candidates", tried.len())]
    Absent {
        /// Every path that was tried, in preference order
        tried: Vec<PathBuf>,
    },

    /// A candidate exists but could not be read
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Rejected playback clock values
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SampleError {
    /// NaN or infinite position
    #[error("non-finite playback position: {0}")]
    NonFinite(f64),

    /// Position before the start of the track
    #[error("negative playback position: {0}")]
    Negative(f64),

    /// Position past the known end of the track
    #[error("playback position {position} beyond duration {duration}")]
    BeyondDuration { position: f64, duration: f64 },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error loading subtitles
    #[error("Subtitle load error: {0}")]
    Load(#[from] LoadError),

    /// Invalid playback sample
    #[error("Sample error: {0}")]
    Sample(#[from] SampleError),

    /// Configuration rejected by validation
    #[error("Config error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
