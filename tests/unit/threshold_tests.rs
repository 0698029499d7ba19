/*!
 * Tests for threshold watchers and the playback clock
 */

use pixelwalk::choreography::{PlaybackClock, PlaybackSample, ThresholdWatcher};

fn playing(previous: f64, current: f64) -> PlaybackSample {
    PlaybackSample::new(previous, current, true)
}

#[test]
fn test_watcher_holdingPlayThroughThreshold_shouldFireOnce() {
    let mut watcher = ThresholdWatcher::new(10.0, "fireworks");

    let fired: Vec<Option<&str>> = [playing(9.0, 9.5), playing(9.5, 10.2), playing(10.2, 10.6)]
        .iter()
        .map(|sample| watcher.observe(sample))
        .collect();

    assert_eq!(fired, vec![None, Some("fireworks"), None]);
}

#[test]
fn test_watcher_backwardSeekThenForward_shouldFireAgain() {
    let mut watcher = ThresholdWatcher::new(10.0, 1u32);
    watcher.observe(&playing(9.5, 10.2));
    watcher.observe(&playing(10.2, 10.6));
    assert!(watcher.has_fired());

    assert_eq!(watcher.observe(&playing(10.6, 3.0)), None);
    assert!(!watcher.has_fired());
    assert_eq!(watcher.observe(&playing(3.0, 10.1)), Some(1));
}

#[test]
fn test_watcher_landingExactlyOnThreshold_shouldFire() {
    let mut watcher = ThresholdWatcher::new(10.0, ());
    assert_eq!(watcher.observe(&playing(9.9, 10.0)), Some(()));
}

#[test]
fn test_watcher_paused_shouldNotFire() {
    let mut watcher = ThresholdWatcher::new(10.0, ());
    assert_eq!(watcher.observe(&PlaybackSample::new(9.0, 11.0, false)), None);

    // no crossing is left to detect once already past the threshold
    assert_eq!(watcher.observe(&playing(11.0, 11.5)), None);
}

#[test]
fn test_watcher_invalidSamples_shouldBeIgnored() {
    let mut watcher = ThresholdWatcher::new(10.0, ());
    assert_eq!(watcher.observe(&playing(9.0, f64::INFINITY)), None);
    assert_eq!(watcher.observe(&playing(f64::NAN, 10.5)), None);
    assert_eq!(watcher.observe(&playing(-1.0, 10.5)), None);
    assert!(!watcher.has_fired());

    assert_eq!(watcher.observe(&playing(9.0, 10.5)), Some(()));
}

#[test]
fn test_clock_seekAcrossThreshold_shouldNotFire() {
    let mut clock = PlaybackClock::new();
    let mut watcher = ThresholdWatcher::new(169.6, ());
    clock.play();
    watcher.observe(&clock.time_update(10.0).unwrap());

    let seek = clock.seek(180.0).unwrap();
    assert_eq!(watcher.observe(&seek), None);

    let tick = clock.time_update(180.25).unwrap();
    assert_eq!(watcher.observe(&tick), None);
}

#[test]
fn test_clock_seekJustBeforeThreshold_shouldFireOnNextTick() {
    let mut clock = PlaybackClock::new();
    let mut watcher = ThresholdWatcher::new(169.6, ());
    clock.play();

    watcher.observe(&clock.seek(169.5).unwrap());
    let tick = clock.time_update(169.75).unwrap();
    assert_eq!(watcher.observe(&tick), Some(()));
}

#[test]
fn test_clock_pausedTicks_shouldCarryPausedFlag() {
    let mut clock = PlaybackClock::new();
    let sample = clock.time_update(5.0).unwrap();
    assert!(!sample.is_playing);

    let play = clock.play();
    assert_eq!(play, PlaybackSample::at(5.0, true));
    assert!(clock.is_playing());
}

#[test]
fn test_clock_zeroDuration_shouldMeanUnknown() {
    let mut clock = PlaybackClock::new();
    clock.set_duration(0.0).unwrap();
    assert_eq!(clock.duration(), None);
    assert!(clock.time_update(500.0).is_ok());

    assert!(clock.set_duration(f64::NAN).is_err());
}
