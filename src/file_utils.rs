use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::LoadError;
use crate::subtitle_processor::{parse_subtitles, CueSequence};

// @module: File utilities and subtitle asset lookup

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file, creating parent directories
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))
    }

    /// Guess the subtitle dialect from the extension, then the content
    pub fn detect_subtitle_format<P: AsRef<Path>>(path: P, content: &str) -> SubtitleFormat {
        if let Some(ext) = path.as_ref().extension() {
            match ext.to_string_lossy().to_lowercase().as_str() {
                "vtt" => return SubtitleFormat::WebVtt,
                "srt" => return SubtitleFormat::Srt,
                _ => {}
            }
        }

        let head = content.trim_start_matches('\u{FEFF}').trim_start();
        if head.get(..6).is_some_and(|h| h.eq_ignore_ascii_case("webvtt")) {
            SubtitleFormat::WebVtt
        } else if content.contains("-->") {
            SubtitleFormat::Srt
        } else {
            SubtitleFormat::Unknown
        }
    }
}

/// Subtitle dialects the cue parser understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    WebVtt,
    Srt,
    Unknown,
}

/// Subtitles picked from the candidate list
#[derive(Debug, Clone)]
pub struct LoadedSubtitles {
    pub path: PathBuf,
    pub format: SubtitleFormat,
    pub cues: CueSequence,
}

/// Try each candidate in order and keep the first one that exists and parses
/// to at least one cue.
///
/// Unreadable files and files without cues are skipped with a warning.
pub fn find_subtitles<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedSubtitles, LoadError> {
    for candidate in candidates {
        let path = candidate.as_ref();
        if !FileManager::file_exists(path) {
            debug!("Subtitle candidate not found: {:?}", path);
            continue;
        }

        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(source) => {
                warn!("{}", LoadError::Io { path: path.to_path_buf(), source });
                continue;
            }
        };

        let cues = parse_subtitles(&raw);
        if cues.is_empty() {
            warn!("Subtitle file {:?} contains no usable cues", path);
            continue;
        }

        let format = FileManager::detect_subtitle_format(path, &raw);
        debug!("Loaded {} cues from {:?} ({:?})", cues.len(), path, format);
        return Ok(LoadedSubtitles {
            path: path.to_path_buf(),
            format,
            cues,
        });
    }

    Err(LoadError::Absent {
        tried: candidates.iter().map(|c| c.as_ref().to_path_buf()).collect(),
    })
}

/// Like [`find_subtitles`], but absence degrades to an empty sequence
pub fn load_subtitles_or_empty<P: AsRef<Path>>(candidates: &[P]) -> CueSequence {
    match find_subtitles(candidates) {
        Ok(loaded) => loaded.cues,
        Err(e) => {
            warn!("No subtitles loaded: {}", e);
            CueSequence::empty()
        }
    }
}
