/*!
 * Tests for active line resolution
 */

use pixelwalk::cue_resolver::{active_index, CueTimeline};
use pixelwalk::subtitle_processor::{CueSequence, TimedCue};

fn sequence(ranges: &[(u64, u64)]) -> CueSequence {
    CueSequence::from_unsorted(
        ranges
            .iter()
            .map(|&(start, end)| TimedCue::new(start, end, format!("{}-{}", start, end)))
            .collect(),
    )
}

#[test]
fn test_activeIndex_overlappingCues_shouldPickFirst() {
    let cues = sequence(&[(0, 1_000), (500, 1_500)]);

    assert_eq!(active_index(&cues, 700), Some(0));
    assert_eq!(active_index(&cues, 1_200), Some(1));
    assert_eq!(CueTimeline::new(cues).active_index(700), Some(0));
}

#[test]
fn test_activeIndex_boundaries_shouldBeInclusive() {
    let cues = sequence(&[(1_000, 4_000), (5_000, 9_000)]);
    let timeline = CueTimeline::new(cues.clone());

    for (t, expected) in [
        (999, None),
        (1_000, Some(0)),
        (4_000, Some(0)),
        (4_001, None),
        (5_000, Some(1)),
        (9_000, Some(1)),
        (9_001, None),
    ] {
        assert_eq!(active_index(&cues, t), expected, "linear at {}", t);
        assert_eq!(timeline.active_index(t), expected, "indexed at {}", t);
    }
}

#[test]
fn test_activeIndex_emptySequence_shouldBeNone() {
    let cues = CueSequence::empty();
    assert_eq!(active_index(&cues, 0), None);
    assert_eq!(CueTimeline::new(cues).active_index(0), None);
}

#[test]
fn test_timeline_agreesWithLinearScan_onIrregularCues() {
    // long cues hiding short ones, gaps, equal starts and zero-length cues
    let cues = sequence(&[
        (0, 500),
        (200, 5_000),
        (300, 400),
        (300, 350),
        (1_000, 1_000),
        (4_800, 6_000),
        (7_000, 7_500),
        (7_000, 9_000),
        (12_000, 11_000),
        (12_500, 13_000),
    ]);
    let timeline = CueTimeline::new(cues.clone());

    for t in (0..14_000).step_by(25) {
        assert_eq!(timeline.active_index(t), active_index(&cues, t), "at {} ms", t);
    }
}

#[test]
fn test_timeline_activeAtSeconds_shouldTruncateToMillis() {
    let timeline = CueTimeline::new(sequence(&[(62_500, 65_000)]));

    assert_eq!(timeline.active_at_seconds(62.5), Some(0));
    assert_eq!(timeline.active_at_seconds(62.4999), None);
    assert_eq!(timeline.active_at_seconds(65.0009), Some(0));
    assert_eq!(timeline.active_at_seconds(f64::NAN), None);
}

#[test]
fn test_timeline_repeatedCalls_shouldBeStable() {
    let timeline = CueTimeline::new(sequence(&[(0, 1_000), (2_000, 3_000)]));
    for _ in 0..3 {
        assert_eq!(timeline.active_index(2_500), Some(1));
    }
    assert_eq!(timeline.cue(1).map(|c| c.start_ms), Some(2_000));
    assert_eq!(timeline.len(), 2);
}
