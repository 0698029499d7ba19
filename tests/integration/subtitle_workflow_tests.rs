/*!
 * Integration tests for the subtitle workflow: files on disk to highlighted line
 */

use anyhow::Result;
use pixelwalk::app_config::Config;
use pixelwalk::app_controller::Controller;
use pixelwalk::cue_resolver::CueTimeline;
use pixelwalk::file_utils::FileManager;
use pixelwalk::subtitle_processor::parse_subtitles;
use crate::common;

/// Load through the configured candidates, then resolve lines by position
#[test]
fn test_subtitle_workflow_withAssetRoot_shouldResolveLines() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "assets/song.srt", common::SAMPLE_SRT)?;

    let mut config = Config::default();
    config.subtitles.asset_root = temp_dir.path().to_path_buf();
    let controller = Controller::with_config(config)?;

    let timeline = CueTimeline::new(controller.load_cues());
    assert_eq!(timeline.len(), 3);
    assert_eq!(timeline.active_at_seconds(0.5), None);
    assert_eq!(timeline.active_at_seconds(4.0), Some(0));
    assert_eq!(timeline.active_at_seconds(7.25), Some(1));
    assert_eq!(timeline.active_at_seconds(9.5), None);
    assert_eq!(
        timeline.cue(1).map(|c| c.text.as_str()),
        Some("Second line continues here")
    );
    Ok(())
}

#[test]
fn test_subtitle_workflow_noFiles_shouldGiveEmptyTimeline() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = Config::default();
    config.subtitles.asset_root = temp_dir.path().to_path_buf();

    let controller = Controller::with_config(config)?;
    assert!(controller.load_cues().is_empty());
    Ok(())
}

/// Write the parsed cues back out and parse them again
#[test]
fn test_subtitle_workflow_srtToVtt_shouldPreserveCues() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let cues = parse_subtitles(common::SAMPLE_SRT);

    let out = temp_dir.path().join("converted/song.vtt");
    FileManager::write_to_file(&out, &cues.to_string())?;

    let reparsed = parse_subtitles(&FileManager::read_to_string(&out)?);
    assert_eq!(reparsed, cues);
    Ok(())
}

#[test]
fn test_controller_invalidConfig_shouldBeRejected() {
    let mut config = Config::default();
    config.choreography.establish_ms = 0;
    assert!(Controller::with_config(config).is_err());
}
