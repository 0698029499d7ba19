/*!
 * Tests for error types
 */

use std::path::PathBuf;

use pixelwalk::errors::{AppError, CueError, LoadError, SampleError};

#[test]
fn test_cueError_display_shouldDescribeProblem() {
    assert_eq!(CueError::MissingSeparator.to_string(), "missing '-->' range separator");
    assert_eq!(
        CueError::InvalidTimestamp("00:xx".to_string()).to_string(),
        "invalid timestamp: \"00:xx\""
    );
}

#[test]
fn test_loadError_absent_shouldCountCandidates() {
    let error = LoadError::Absent {
        tried: vec![PathBuf::from("a.vtt"), PathBuf::from("b.srt")],
    };
    assert_eq!(error.to_string(), "no usable subtitle file among 2 candidates");
}

#[test]
fn test_appError_conversions_shouldWrapSources() {
    let app: AppError = SampleError::Negative(-1.0).into();
    assert!(matches!(app, AppError::Sample(SampleError::Negative(_))));
    assert!(app.to_string().starts_with("Sample error:"));

    let app: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(app, AppError::File(_)));

    let app: AppError = anyhow::anyhow!("boom").into();
    assert_eq!(app.to_string(), "Unknown error: boom");
}
