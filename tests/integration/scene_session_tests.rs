/*!
 * Integration tests for the scene session, driven through its channels on a
 * paused tokio clock
 */

use std::time::Duration;

use anyhow::Result;
use pixelwalk::app_config::Config;
use pixelwalk::app_controller::{Controller, SceneEvent, SceneSession};
use pixelwalk::choreography::{ChoreographyEvent, Effect, Stage};
use pixelwalk::subtitle_processor::parse_subtitles;
use crate::common::{self, ms};

fn controller() -> Controller {
    common::init_logging();
    Controller::with_config(Config::default()).unwrap()
}

/// Let the session task run everything that is ready
async fn settle() {
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_session_timedStages_shouldReachBefore() -> Result<()> {
    let handle = controller().start(parse_subtitles(common::SAMPLE_VTT));
    assert_eq!(handle.snapshot().choreography.stage, Stage::Establish);

    tokio::time::sleep(ms(1_450)).await;
    settle().await;
    assert_eq!(handle.snapshot().choreography.stage, Stage::Vows);

    tokio::time::sleep(ms(1_500)).await;
    settle().await;
    assert_eq!(handle.snapshot().choreography.stage, Stage::Before);

    tokio::time::sleep(Duration::from_secs(60)).await;
    settle().await;
    assert_eq!(handle.snapshot().choreography.stage, Stage::Before);

    let summary = handle.shutdown().await?;
    assert_eq!(summary.stage_changes, 2);
    assert_eq!(summary.final_stage, Stage::Before);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_session_ceremony_shouldRunToFreezeAndBack() -> Result<()> {
    let handle = controller().start(parse_subtitles(common::SAMPLE_VTT));

    tokio::time::sleep(ms(3_000)).await;
    handle.send(SceneEvent::Advance).await?;
    settle().await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.choreography.stage, Stage::Singing);
    assert!(snapshot.choreography.finale_active);
    assert!(snapshot.choreography.fireworks_visible);

    tokio::time::sleep(ms(1_800 + 1_800 + 3_200 + 50)).await;
    settle().await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.choreography.stage, Stage::Freeze);
    assert_eq!(snapshot.choreography.action_label, Config::default().labels.replay);
    assert!(!snapshot.choreography.finale_active);

    handle.send(SceneEvent::Reset).await?;
    settle().await;
    assert_eq!(handle.snapshot().choreography.stage, Stage::Establish);

    let summary = handle.shutdown().await?;
    assert_eq!(summary.stage_changes, 2 + 4 + 1);
    assert_eq!(summary.effects, 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_session_playback_shouldHighlightLinesAndFireFinale() -> Result<()> {
    let handle = controller().start(parse_subtitles(common::SAMPLE_VTT));
    let mut snapshots = handle.subscribe();

    handle.send(SceneEvent::Duration(210.0)).await?;
    handle.send(SceneEvent::Play).await?;
    handle.send(SceneEvent::TimeUpdate(5.5)).await?;
    settle().await;
    let snapshot = snapshots.borrow_and_update().clone();
    assert!(snapshot.is_playing);
    assert_eq!(snapshot.active_line, Some(1));
    assert_eq!(snapshot.active_text.as_deref(), Some("Second line continues here"));
    assert!(snapshot.has_subtitles);

    handle.send(SceneEvent::Seek(169.5)).await?;
    handle.send(SceneEvent::TimeUpdate(169.75)).await?;
    settle().await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.active_line, None);
    assert!(snapshot.choreography.finale_window);
    assert!(snapshot.choreography.fireworks_visible);

    // an invalid tick is ignored
    handle.send(SceneEvent::TimeUpdate(f64::NAN)).await?;
    settle().await;
    assert_eq!(handle.snapshot().position, 169.75);

    let summary = handle.shutdown().await?;
    assert_eq!(summary.effects, 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_session_immediateShutdown_shouldReportNoChanges() -> Result<()> {
    let handle = controller().start(parse_subtitles(""));
    assert!(!handle.snapshot().has_subtitles);

    let summary = handle.shutdown().await?;
    assert_eq!(summary.final_stage, Stage::Establish);
    assert_eq!(summary.stage_changes, 0);
    Ok(())
}

#[test]
fn test_sceneSession_seekToLine_shouldRecenterClock() {
    common::init_logging();
    let config = Config::default();
    let mut session = SceneSession::new(&config, parse_subtitles(common::SAMPLE_VTT), Duration::ZERO);

    session.handle(SceneEvent::Play, ms(0));
    session.handle(SceneEvent::SeekToLine(2), ms(10));
    let snapshot = session.snapshot();
    assert_eq!(snapshot.position, 10.0);
    assert_eq!(snapshot.active_line, Some(2));

    // missing line changes nothing
    session.handle(SceneEvent::SeekToLine(42), ms(20));
    assert_eq!(session.snapshot().position, 10.0);
}

#[test]
fn test_sceneSession_seekBackAcrossFinale_shouldRearmWatcher() {
    let config = Config::default();
    let mut session = SceneSession::new(&config, parse_subtitles(""), Duration::ZERO);
    let fireworks = ChoreographyEvent::Effect(Effect::Fireworks { bursts: 8 });

    session.handle(SceneEvent::Play, ms(0));
    session.handle(SceneEvent::Seek(169.0), ms(0));
    assert_eq!(session.handle(SceneEvent::TimeUpdate(170.0), ms(100)), vec![fireworks.clone()]);
    assert!(session.handle(SceneEvent::TimeUpdate(170.5), ms(200)).is_empty());

    session.handle(SceneEvent::Seek(30.0), ms(300));
    session.handle(SceneEvent::Seek(169.4), ms(400));
    assert_eq!(session.handle(SceneEvent::TimeUpdate(169.9), ms(500)), vec![fireworks]);
}

#[test]
fn test_sceneSession_unseal_shouldOpenEnvelope() {
    let config = Config::default();
    let mut session = SceneSession::new(&config, parse_subtitles(""), Duration::ZERO);
    assert!(session.snapshot().sealed);

    session.handle(SceneEvent::Unseal, ms(0));
    assert!(!session.snapshot().sealed);
}
