//! End-to-end integration tests: JSON + CSV -> alignment -> CSV/JSON -> read back.

use std::fs;
use std::path::Path;

use releasepoint_align::{AlignConfig, AlignmentPipeline, DropEmptyEvents, PassthroughCleaner, ReleaseSnapshot};
use releasepoint_io::{IoError, ResultWriter, RunName, ShotReader, TrackingReader};
use tempfile::TempDir;

/// Path to the test fixture directory.
fn fixture_path(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Read a CSV into its header and rows of strings.
fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    let header = rdr.headers().unwrap().iter().map(String::from).collect();
    let rows = rdr
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    (header, rows)
}

fn column(header: &[String], name: &str) -> usize {
    header
        .iter()
        .position(|h| h == name)
        .unwrap_or_else(|| panic!("missing column {name}"))
}

#[test]
fn align_round_trip() {
    // 1. Read inputs
    let events = TrackingReader::new(&fixture_path("game_tracking.json"))
        .read()
        .expect("tracking fixture should parse");
    let shots = ShotReader::new(&fixture_path("shots.csv"))
        .read()
        .expect("shot fixture should parse");
    assert_eq!(events.len(), 4);
    assert_eq!(shots.len(), 6);
    // The other game's row has an empty TEAM_ID; it is read, not rejected.
    assert_eq!(shots.shots()[4].team_id, None);

    // 2. Align with default tolerances
    let pipeline = AlignmentPipeline::new(AlignConfig::new(), PassthroughCleaner, ReleaseSnapshot).unwrap();
    let output = pipeline.align(events, &shots).unwrap();
    assert_eq!(output.game_id.value(), 21_500_491);

    // 3. Write every artifact
    let dir = TempDir::new().unwrap();
    let writer = ResultWriter::new(dir.path(), RunName::new("g491".into()).unwrap()).unwrap();
    writer.write_shots(&output.shots).unwrap();
    writer.write_debug(&output.debug).unwrap();
    writer.write_event_index(&output.index).unwrap();
    writer.write_summary(&output).unwrap();

    // 4. Debug table: one row per shot of the game, in file order
    let (header, rows) = read_csv(&dir.path().join("g491_alignment_debug.csv"));
    assert_eq!(rows.len(), 5);
    let reason = column(&header, "reason");
    let reasons: Vec<&str> = rows.iter().map(|r| r[reason].as_str()).collect();
    assert_eq!(
        reasons,
        vec![
            "ok",
            "ok",
            "fallback_center_diff_too_large",
            "no_events_for_game_quarter",
            "invalid_shot_clock",
        ]
    );
    let shot_row = column(&header, "shot_row");
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row[shot_row], i.to_string());
    }
    let release_frame_id = column(&header, "release_frame_id");
    assert_eq!(rows[0][release_frame_id], "1006");
    assert_eq!(rows[1][release_frame_id], "2005");
    let release_max = column(&header, "release_max_time_diff");
    assert_eq!(rows[0][release_max].parse::<f64>().unwrap(), 1.5);
    assert_eq!(rows[3][release_max], "");
    let possession = column(&header, "event_possession_team_id");
    assert_eq!(rows[1][possession], "1610612744");
    let center_diff = column(&header, "center_diff");
    assert_eq!(rows[2][center_diff].parse::<f64>().unwrap(), 15.0);
    let event_idx = column(&header, "event_list_idx");
    assert_eq!(rows[3][event_idx], "");

    // 5. Shots table: source columns verbatim, features appended
    let (header, rows) = read_csv(&dir.path().join("g491_shots.csv"));
    assert_eq!(rows.len(), 5);
    assert_eq!(header[0], "GAME_ID");
    assert_eq!(header[8], "SHOT_MADE_FLAG");
    assert_eq!(rows[0][0], "0021500491");
    assert_eq!(rows[0][3], "Stephen Curry");
    let release_gc = column(&header, "release_game_clock");
    let dist = column(&header, "shooter_ball_dist");
    let error = column(&header, "error");
    assert_eq!(error, header.len() - 1);
    assert_eq!(rows[0][release_gc], "697");
    assert_eq!(rows[0][dist], "0.5");
    assert_eq!(rows[0][error], "");
    assert_eq!(rows[2][error], "no_event_match");
    assert_eq!(rows[4][error], "no_event_match");

    // 6. Event index: the two Q1 events survive, the sparse and empty Q2 ones do not
    let (header, rows) = read_csv(&dir.path().join("g491_event_index.csv"));
    assert_eq!(rows.len(), 2);
    let idx = column(&header, "event_list_idx");
    assert_eq!(rows[0][idx], "0");
    assert_eq!(rows[1][idx], "1");

    // 7. Summary
    let content: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("g491_summary.json")).unwrap()).unwrap();
    assert_eq!(content["run"], "g491");
    assert_eq!(content["n_shots"], 5);
    assert_eq!(content["n_matched"], 2);
    assert_eq!(content["n_events"], 4);
    assert_eq!(content["n_indexed_events"], 2);
    assert_eq!(content["reasons"]["ok"], 2);
}

#[test]
fn wide_fallback_matches_but_release_misses() {
    let events = TrackingReader::new(&fixture_path("game_tracking.json")).read().unwrap();
    let shots = ShotReader::new(&fixture_path("shots.csv")).read().unwrap();

    let config = AlignConfig::new().with_max_fallback_diff(20.0);
    let pipeline = AlignmentPipeline::new(config, DropEmptyEvents, ReleaseSnapshot).unwrap();
    let output = pipeline.align(events, &shots).unwrap();

    // The empty Q2 event is gone, so positions refer to the three left.
    assert_eq!(output.events.len(), 3);

    let debug = &output.debug[2];
    assert_eq!(debug.reason, "fallback_closest_center");
    assert_eq!(debug.event_list_idx, Some(1));
    assert_eq!(debug.release_reason, Some("time_diff_too_large"));
    assert_eq!(debug.release_time_diff, Some(10.0));
}

#[test]
fn unreadable_shot_cells_do_not_stop_the_game() {
    let events = TrackingReader::new(&fixture_path("game_tracking.json")).read().unwrap();
    let shots = ShotReader::new(&fixture_path("shots_bad_cells.csv"))
        .read()
        .expect("bad cells should not fail the read");
    // The row without a GAME_ID belongs to no game.
    assert_eq!(shots.len(), 3);

    let pipeline = AlignmentPipeline::new(AlignConfig::new(), PassthroughCleaner, ReleaseSnapshot).unwrap();
    let output = pipeline.align(events, &shots).unwrap();
    let reasons: Vec<&str> = output.debug.iter().map(|r| r.reason).collect();
    assert_eq!(reasons, vec!["ok", "invalid_shot_fields", "invalid_shot_fields"]);
    assert_eq!(output.debug[1].period, None);

    let dir = TempDir::new().unwrap();
    let writer = ResultWriter::new(dir.path(), RunName::new("bad_cells".into()).unwrap()).unwrap();
    writer.write_shots(&output.shots).unwrap();
    let (header, rows) = read_csv(&dir.path().join("bad_cells_shots.csv"));
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1][column(&header, "PERIOD")], "OT");
    assert_eq!(rows[2][column(&header, "PLAYER_ID")], "unknown");
    assert_eq!(rows[2][column(&header, "error")], "no_event_match");
}

#[test]
fn reader_fixture_files_match_expected_errors() {
    // shots_missing_team.csv -> MissingColumn
    let result = ShotReader::new(&fixture_path("shots_missing_team.csv")).read();
    assert!(
        matches!(result, Err(IoError::MissingColumn { column: "TEAM_ID", .. })),
        "shots_missing_team.csv should give MissingColumn, got: {:?}",
        result
    );

    // a CSV is not tracking JSON -> JsonParse
    let result = TrackingReader::new(&fixture_path("shots.csv")).read();
    assert!(
        matches!(result, Err(IoError::JsonParse { .. })),
        "shots.csv should give JsonParse, got: {:?}",
        result
    );
}
