//! End-to-end alignment scenarios for releasepoint-align.
//!
//! Each test builds a small in-memory game and checks the per-shot outcome
//! the pipeline reports, without touching the filesystem.

use releasepoint_align::{
    AlignConfig, AlignmentPipeline, ERROR_FEATURE, FeatureValue, Frame, GameId, NO_EVENT_MATCH,
    PassthroughCleaner, ReleaseSnapshot, ShotRecord, ShotTable, TrackingEvent,
};

const GAME: GameId = GameId::new(21_500_491);

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Event whose clock runs from `start` down to `end` over `n` frames.
fn event(quarter: u8, start: f64, end: f64, n: usize) -> TrackingEvent {
    let step = (start - end) / (n - 1) as f64;
    let frames = (0..n)
        .map(|i| Frame {
            frame_id: Some(i as u64),
            ..Frame::with_clock(Some(start - i as f64 * step))
        })
        .collect();
    TrackingEvent::new(GAME, quarter, frames)
}

fn shots(specs: &[(u8, f64)]) -> ShotTable {
    let header = vec!["GAME_ID".into(), "PERIOD".into(), "game_clock".into()];
    let rows = specs
        .iter()
        .map(|&(period, clock)| ShotRecord::new(GAME, period, 2544, 1_610_612_739, Some(clock)))
        .collect();
    ShotTable::new(header, rows)
}

fn pipeline(config: AlignConfig) -> AlignmentPipeline<PassthroughCleaner, ReleaseSnapshot> {
    AlignmentPipeline::new(config, PassthroughCleaner, ReleaseSnapshot).expect("valid config")
}

// ---------------------------------------------------------------------------
// Event-level outcomes
// ---------------------------------------------------------------------------

#[test]
fn shot_inside_span_matches_exactly() {
    let output = pipeline(AlignConfig::new())
        .align(vec![event(1, 24.0, 18.0, 13)], &shots(&[(1, 21.0)]))
        .unwrap();

    let row = &output.debug[0];
    assert_eq!(row.reason, "ok");
    assert_eq!(row.event_list_idx, Some(0));
    assert_eq!(row.center_diff, Some(0.0));
    assert_eq!(row.gc_start, Some(24.0));
    assert_eq!(row.gc_end, Some(18.0));
}

#[test]
fn shot_far_outside_span_is_rejected_by_fallback() {
    let config = AlignConfig::new().with_max_fallback_diff(4.0);
    let output = pipeline(config)
        .align(vec![event(1, 24.0, 18.0, 13)], &shots(&[(1, 30.0)]))
        .unwrap();

    let row = &output.debug[0];
    assert_eq!(row.reason, "fallback_center_diff_too_large");
    assert_eq!(row.event_list_idx, None);
    assert_eq!(row.center_diff, Some(9.0));
    assert_eq!(row.tolerance, Some(4.0));
    assert_eq!(
        output.shots.rows()[0].features[ERROR_FEATURE],
        FeatureValue::Text(NO_EVENT_MATCH.into())
    );
}

#[test]
fn sparse_event_is_not_indexed() {
    let output = pipeline(AlignConfig::new())
        .align(vec![event(1, 24.0, 18.0, 5)], &shots(&[(1, 21.0)]))
        .unwrap();

    assert!(output.index.is_empty());
    assert_eq!(output.debug[0].reason, "no_events_for_game_quarter");
}

#[test]
fn quarter_without_events_keeps_shot_fields() {
    let output = pipeline(AlignConfig::new())
        .align(vec![event(1, 24.0, 18.0, 13)], &shots(&[(1, 21.0), (4, 95.5)]))
        .unwrap();

    let row = &output.debug[1];
    assert_eq!(row.shot_row, 1);
    assert_eq!(row.period, Some(4));
    assert_eq!(row.shot_gc, Some(95.5));
    assert_eq!(row.reason, "no_events_for_game_quarter");
    assert_eq!(output.shots.rows()[1].shot.period, Some(4));
    assert_eq!(output.shots.rows()[1].shot.columns, vec!["21500491", "4", "95.5"]);
}

#[test]
fn closest_center_wins_among_overlapping_windows() {
    // Windows [17, 25] and [15.5, 22.5] both contain 20.5; centers 21 and 19.
    let events = vec![event(1, 24.0, 18.0, 13), event(1, 21.5, 16.5, 11)];
    let output = pipeline(AlignConfig::new()).align(events, &shots(&[(1, 20.5)])).unwrap();

    assert_eq!(output.debug[0].event_list_idx, Some(0));
    assert_eq!(output.debug[0].center_diff, Some(0.5));
}

// ---------------------------------------------------------------------------
// Frame-level outcomes
// ---------------------------------------------------------------------------

#[test]
fn release_frame_is_nearest_clock() {
    // Frames every 0.5s from 24.0: 21.0 is frame 6.
    let output = pipeline(AlignConfig::new())
        .align(vec![event(1, 24.0, 18.0, 13)], &shots(&[(1, 21.1)]))
        .unwrap();

    let row = &output.debug[0];
    assert_eq!(row.release_reason, Some("ok"));
    assert_eq!(row.release_idx, Some(6));
    assert_eq!(row.release_frame_id, Some(6));
    assert_eq!(row.release_n_frames_gc, Some(13));
}

// ---------------------------------------------------------------------------
// Whole-table properties
// ---------------------------------------------------------------------------

#[test]
fn output_is_complete_and_ordered() {
    let events = vec![event(1, 700.0, 680.0, 50), event(2, 500.0, 470.0, 50), event(3, 100.0, 90.0, 20)];
    let specs: Vec<(u8, f64)> = (0..40).map(|i| ((i % 4 + 1) as u8, 710.0 - i as f64 * 17.0)).collect();
    let output = pipeline(AlignConfig::new()).align(events, &shots(&specs)).unwrap();

    assert_eq!(output.debug.len(), specs.len());
    assert_eq!(output.shots.len(), specs.len());
    for (i, (row, shot_row)) in output.debug.iter().zip(output.shots.rows()).enumerate() {
        assert_eq!(row.shot_row, i);
        assert_eq!(row.period, Some(specs[i].0));
        assert_eq!(shot_row.shot.game_clock, Some(specs[i].1));
    }
    assert_eq!(output.reason_counts().values().sum::<usize>(), specs.len());
}

#[test]
fn alignment_is_deterministic() {
    let events = vec![event(1, 24.0, 18.0, 13), event(1, 18.0, 6.0, 30), event(2, 400.0, 380.0, 40)];
    let specs: Vec<(u8, f64)> = (0..25).map(|i| ((i % 2 + 1) as u8, 30.0 - i as f64)).collect();
    let table = shots(&specs);

    let first = pipeline(AlignConfig::new()).align(events.clone(), &table).unwrap();
    let second = pipeline(AlignConfig::new()).align(events, &table).unwrap();
    assert_eq!(first.debug, second.debug);
    assert_eq!(first.shots, second.shots);
}

#[test]
fn header_is_carried_through() {
    let output = pipeline(AlignConfig::new())
        .align(vec![event(1, 24.0, 18.0, 13)], &shots(&[(1, 21.0)]))
        .unwrap();
    assert_eq!(output.shots.header(), ["GAME_ID", "PERIOD", "game_clock"]);
}
