//! End-to-end alignment of one game's shots against its tracking events.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::cleaner::EventCleaner;
use crate::config::AlignConfig;
use crate::error::AlignError;
use crate::event::{GameId, TrackingEvent};
use crate::features::{ERROR_FEATURE, FeatureExtractor, FeatureMap, FeatureRequest};
use crate::index::EventIndex;
use crate::matcher::{ClockMatcher, EventMatch, NoMatchReason};
use crate::release::{ReleaseLocator, ReleaseMatch};
use crate::shot::{ShotRecord, ShotTable};

/// Error marker for shots that could not be matched to any event.
pub const NO_EVENT_MATCH: &str = "no_event_match";

/// Audit record of every decision taken for one shot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShotAlignmentDebugRow {
    /// Position of the shot in the game-filtered shot table.
    pub shot_row: usize,
    /// Game id of the shot.
    #[serde(rename = "GAME_ID")]
    pub game_id: GameId,
    /// Period of the shot, when readable.
    #[serde(rename = "PERIOD")]
    pub period: Option<u8>,
    /// Shot clock reading from the shot log.
    pub shot_gc: Option<f64>,
    /// Matched event position, if any.
    pub event_list_idx: Option<usize>,
    /// Event-level outcome.
    pub reason: &'static str,
    /// Center distance of the considered event.
    pub center_diff: Option<f64>,
    /// Span start of the considered event.
    pub gc_start: Option<f64>,
    /// Span end of the considered event.
    pub gc_end: Option<f64>,
    /// Tolerance the center distance was tested against.
    pub tolerance: Option<f64>,
    /// Recorded or inferred possession team of the matched event.
    pub event_possession_team_id: Option<u64>,
    /// Located release frame position, if any.
    pub release_idx: Option<usize>,
    /// Frame-level outcome, when a release search ran.
    pub release_reason: Option<&'static str>,
    /// Clock distance between the shot and the considered frame.
    pub release_time_diff: Option<f64>,
    /// Tolerance the release clock distance was tested against.
    pub release_max_time_diff: Option<f64>,
    /// Game clock of the considered frame.
    pub release_frame_game_clock: Option<f64>,
    /// Archive id of the considered frame.
    pub release_frame_id: Option<u64>,
    /// Frames of the matched event with a valid clock.
    pub release_n_frames_gc: Option<usize>,
}

impl ShotAlignmentDebugRow {
    fn new(shot_row: usize, shot: &ShotRecord, event_match: &EventMatch) -> Self {
        let span = event_match.diagnostics();
        Self {
            shot_row,
            game_id: shot.game_id,
            period: shot.period,
            shot_gc: shot.game_clock,
            event_list_idx: event_match.event_list_idx(),
            reason: event_match.reason(),
            center_diff: span.map(|d| d.center_diff),
            gc_start: span.map(|d| d.gc_start),
            gc_end: span.map(|d| d.gc_end),
            tolerance: span.map(|d| d.tolerance),
            event_possession_team_id: None,
            release_idx: None,
            release_reason: None,
            release_time_diff: None,
            release_max_time_diff: None,
            release_frame_game_clock: None,
            release_frame_id: None,
            release_n_frames_gc: None,
        }
    }

    fn record_release(&mut self, release: &ReleaseMatch) {
        let diag = release.diagnostics();
        self.release_idx = release.frame_idx();
        self.release_reason = Some(release.reason());
        self.release_time_diff = diag.map(|d| d.time_diff);
        self.release_max_time_diff = diag.map(|d| d.max_time_diff);
        self.release_frame_game_clock = diag.map(|d| d.frame_game_clock);
        self.release_frame_id = diag.and_then(|d| d.frame_id);
        self.release_n_frames_gc = diag.map(|d| d.n_frames_gc);
    }
}

/// One output row: the source shot plus its extracted features.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotFeatureRow {
    /// The shot as read from the shot log.
    pub shot: ShotRecord,
    /// Extracted features, or `error = "no_event_match"`.
    pub features: FeatureMap,
}

/// Game-filtered shots with appended feature columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShotFeatureTable {
    header: Vec<String>,
    rows: Vec<ShotFeatureRow>,
}

impl ShotFeatureTable {
    /// Return the source shot-log column names.
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Return the rows in shot order.
    #[must_use]
    pub fn rows(&self) -> &[ShotFeatureRow] {
        &self.rows
    }

    /// Return the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Return true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Return every feature name present in any row, sorted, with the
    /// error column last.
    #[must_use]
    pub fn feature_names(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self
            .rows
            .iter()
            .flat_map(|r| r.features.keys().map(String::as_str))
            .collect();
        let has_error = names.contains(ERROR_FEATURE);
        let mut ordered: Vec<String> = names
            .into_iter()
            .filter(|n| *n != ERROR_FEATURE)
            .map(String::from)
            .collect();
        if has_error {
            ordered.push(ERROR_FEATURE.to_string());
        }
        ordered
    }
}

/// Result of aligning one game.
#[derive(Debug, Clone)]
pub struct AlignmentOutput {
    /// Game id resolved from the tracking data.
    pub game_id: GameId,
    /// Shots of the game with features appended, in shot order.
    pub shots: ShotFeatureTable,
    /// The cleaned tracking events that `event_list_idx` refers to.
    pub events: Vec<TrackingEvent>,
    /// The clock index built over `events`.
    pub index: EventIndex,
    /// One audit row per shot, in shot order.
    pub debug: Vec<ShotAlignmentDebugRow>,
}

impl AlignmentOutput {
    /// Count shots per event-level reason.
    #[must_use]
    pub fn reason_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.debug {
            *counts.entry(row.reason).or_insert(0) += 1;
        }
        counts
    }

    /// Count matched shots per frame-level reason.
    #[must_use]
    pub fn release_reason_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for reason in self.debug.iter().filter_map(|r| r.release_reason) {
            *counts.entry(reason).or_insert(0) += 1;
        }
        counts
    }

    /// Return the number of shots matched to an event.
    #[must_use]
    pub fn n_matched(&self) -> usize {
        self.debug.iter().filter(|r| r.event_list_idx.is_some()).count()
    }
}

/// Aligns a game's shot log with its tracking events.
///
/// Holds a validated [`AlignConfig`] and the two external collaborators:
/// an [`EventCleaner`] applied to raw events before indexing and a
/// [`FeatureExtractor`] invoked per matched shot.
#[derive(Debug)]
pub struct AlignmentPipeline<C, E> {
    config: AlignConfig,
    matcher: ClockMatcher,
    locator: ReleaseLocator,
    cleaner: C,
    extractor: E,
}

impl<C: EventCleaner, E: FeatureExtractor> AlignmentPipeline<C, E> {
    /// Create a pipeline.
    ///
    /// # Errors
    ///
    /// Returns any error from [`AlignConfig::validate`].
    pub fn new(config: AlignConfig, cleaner: C, extractor: E) -> Result<Self, AlignError> {
        config.validate()?;
        Ok(Self {
            matcher: ClockMatcher::from_config(&config),
            locator: ReleaseLocator::from_config(&config),
            config,
            cleaner,
            extractor,
        })
    }

    /// Return the configuration.
    #[must_use]
    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    /// Align `shots` against `game_events`.
    ///
    /// The game id is taken from the first tracking event; shots of other
    /// games are ignored. Every shot of the game yields exactly one feature
    /// row and one debug row, in shot-log order, whether or not it matched.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`AlignError::NoTrackingEvents`] | `game_events` is empty |
    /// | [`AlignError::NoShotsForGame`] | no shot carries the tracked game id |
    #[instrument(skip_all, fields(n_events = game_events.len(), n_shots = shots.len()))]
    pub fn align(&self, game_events: Vec<TrackingEvent>, shots: &ShotTable) -> Result<AlignmentOutput, AlignError> {
        let game_id = game_events.first().ok_or(AlignError::NoTrackingEvents)?.gameid;
        let game_shots = shots.for_game(game_id);
        if game_shots.is_empty() {
            return Err(AlignError::NoShotsForGame { game_id });
        }
        debug!(%game_id, n_game_shots = game_shots.len(), "shots filtered to game");

        let events = self.cleaner.clean(game_events);
        let index = EventIndex::build(&events);

        let results: Vec<(FeatureMap, ShotAlignmentDebugRow)> = game_shots
            .shots()
            .par_iter()
            .enumerate()
            .map(|(shot_row, shot)| self.align_shot(shot_row, shot, &events, &index))
            .collect();

        let mut rows = Vec::with_capacity(results.len());
        let mut debug = Vec::with_capacity(results.len());
        for (shot, (features, debug_row)) in game_shots.shots().iter().zip(results) {
            rows.push(ShotFeatureRow {
                shot: shot.clone(),
                features,
            });
            debug.push(debug_row);
        }

        let output = AlignmentOutput {
            game_id,
            shots: ShotFeatureTable {
                header: game_shots.header().to_vec(),
                rows,
            },
            events,
            index,
            debug,
        };

        let n_matched = output.n_matched();
        if n_matched == 0 {
            warn!(%game_id, "no shot could be matched to a tracking event");
        }
        info!(
            %game_id,
            n_shots = output.debug.len(),
            n_matched,
            reasons = ?output.reason_counts(),
            "alignment complete"
        );
        Ok(output)
    }

    fn align_shot(
        &self,
        shot_row: usize,
        shot: &ShotRecord,
        events: &[TrackingEvent],
        index: &EventIndex,
    ) -> (FeatureMap, ShotAlignmentDebugRow) {
        let (Some(period), Some(shooter_id), Some(offense_team_id)) = (shot.period, shot.player_id, shot.team_id)
        else {
            let event_match = EventMatch::Unmatched {
                reason: NoMatchReason::InvalidShotFields,
                diagnostics: None,
            };
            return unmatched(ShotAlignmentDebugRow::new(shot_row, shot, &event_match));
        };

        let shot_gc = shot.game_clock.unwrap_or(f64::NAN);
        let event_match = self.matcher.find(index, shot.game_id, period, shot_gc);
        let mut debug_row = ShotAlignmentDebugRow::new(shot_row, shot, &event_match);

        let Some(event) = event_match.event_list_idx().and_then(|i| events.get(i)) else {
            return unmatched(debug_row);
        };

        let release = self.locator.locate(&event.frames, shot_gc);
        debug_row.record_release(&release);
        debug_row.event_possession_team_id = event.possession_team();
        debug!(
            shot_row,
            event_list_idx = debug_row.event_list_idx,
            reason = debug_row.reason,
            release_reason = release.reason(),
            "shot matched"
        );

        let features = self.extractor.extract(&FeatureRequest {
            frames: &event.frames,
            release_frame_idx: release.frame_idx(),
            shooter_id,
            offense_team_id,
            fps: self.config.fps,
            window_seconds: self.config.window_seconds,
            smooth_window: self.config.smooth_window,
        });
        (features, debug_row)
    }
}

/// Features and debug row for a shot with no matched event.
fn unmatched(debug_row: ShotAlignmentDebugRow) -> (FeatureMap, ShotAlignmentDebugRow) {
    debug!(shot_row = debug_row.shot_row, reason = debug_row.reason, "shot not matched");
    let mut features = FeatureMap::new();
    features.insert(ERROR_FEATURE.to_string(), NO_EVENT_MATCH.into());
    (features, debug_row)
}
