//! Per-event game-clock index over a tracking event list.

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::event::{GameId, TrackingEvent};

/// Minimum number of valid clock readings needed to establish a span.
pub const MIN_CLOCKS_FOR_SPAN: usize = 2;

/// Minimum number of valid clock readings for an event to be indexed.
pub const MIN_VALID_CLOCK_FRAMES: usize = 10;

/// Below this fraction of non-increasing steps a retained event's clock is
/// reported as suspicious.
const LOW_MONOTONE_FRAC: f64 = 0.9;

/// Clock summary of one usable tracking event.
///
/// The game clock counts down, so the live interval of an event is
/// `[gc_end, gc_start]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventIndexRow {
    /// Game the event belongs to.
    pub gameid: GameId,
    /// Period the event belongs to.
    pub quarter: u8,
    /// Position of the event in the list the index was built from.
    pub event_list_idx: usize,
    /// Largest valid clock reading.
    pub gc_start: f64,
    /// Smallest valid clock reading.
    pub gc_end: f64,
    /// Midpoint of `gc_start` and `gc_end`.
    pub gc_center: f64,
    /// `gc_start - gc_end`.
    pub gc_span: f64,
    /// Number of frames in the event.
    pub n_frames_total: usize,
    /// Number of frames with a valid clock reading.
    pub n_frames_gc: usize,
    /// Fraction of consecutive valid readings that do not increase.
    pub gc_monotone_frac: f64,
}

impl EventIndexRow {
    /// Create a row from explicit clock extrema and frame counts.
    ///
    /// Center and span are derived. `gc_monotone_frac` is set to 1.0.
    #[must_use]
    pub fn from_span(
        gameid: GameId,
        quarter: u8,
        event_list_idx: usize,
        gc_start: f64,
        gc_end: f64,
        n_frames_gc: usize,
    ) -> Self {
        Self {
            gameid,
            quarter,
            event_list_idx,
            gc_start,
            gc_end,
            gc_center: 0.5 * (gc_start + gc_end),
            gc_span: gc_start - gc_end,
            n_frames_total: n_frames_gc,
            n_frames_gc,
            gc_monotone_frac: 1.0,
        }
    }
}

/// Why an event was left out of the index.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Excluded {
    NoFrames,
    TooFewClocks { n_frames_gc: usize },
    DegenerateSpan { gc_span: f64 },
    TooFewClockFrames { n_frames_gc: usize },
}

fn summarize(event_list_idx: usize, event: &TrackingEvent) -> Result<EventIndexRow, Excluded> {
    if event.frames.is_empty() {
        return Err(Excluded::NoFrames);
    }

    let clocks: Vec<f64> = event
        .frames
        .iter()
        .filter_map(|f| f.valid_game_clock())
        .collect();
    let n_frames_gc = clocks.len();
    if n_frames_gc < MIN_CLOCKS_FOR_SPAN {
        return Err(Excluded::TooFewClocks { n_frames_gc });
    }

    let gc_start = clocks.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let gc_end = clocks.iter().copied().fold(f64::INFINITY, f64::min);
    let non_increasing = clocks.windows(2).filter(|w| w[1] - w[0] <= 0.0).count();

    let row = EventIndexRow {
        gameid: event.gameid,
        quarter: event.quarter,
        event_list_idx,
        gc_start,
        gc_end,
        gc_center: 0.5 * (gc_start + gc_end),
        gc_span: gc_start - gc_end,
        n_frames_total: event.frames.len(),
        n_frames_gc,
        gc_monotone_frac: non_increasing as f64 / (n_frames_gc - 1) as f64,
    };

    if row.gc_span <= 0.0 {
        return Err(Excluded::DegenerateSpan { gc_span: row.gc_span });
    }
    if row.n_frames_gc < MIN_VALID_CLOCK_FRAMES {
        return Err(Excluded::TooFewClockFrames { n_frames_gc });
    }
    Ok(row)
}

/// Flat clock index over a tracking event list, one row per usable event.
///
/// Rows keep the order of the source list. Events with no frames, fewer
/// than [`MIN_CLOCKS_FOR_SPAN`] valid clocks, a non-positive span, or
/// fewer than [`MIN_VALID_CLOCK_FRAMES`] valid clocks are left out; they
/// stay addressable by position in the source list but can never be
/// matched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventIndex {
    rows: Vec<EventIndexRow>,
}

impl EventIndex {
    /// Build the index over `events`. `event_list_idx` is each event's
    /// position in `events`.
    #[instrument(skip_all, fields(n_events = events.len()))]
    pub fn build(events: &[TrackingEvent]) -> Self {
        let mut rows = Vec::with_capacity(events.len());
        let mut n_excluded = 0usize;

        for (event_list_idx, event) in events.iter().enumerate() {
            match summarize(event_list_idx, event) {
                Ok(row) => {
                    if row.gc_monotone_frac < LOW_MONOTONE_FRAC {
                        warn!(
                            event_list_idx,
                            gc_monotone_frac = row.gc_monotone_frac,
                            "event clock is not monotone"
                        );
                    }
                    rows.push(row);
                }
                Err(cause) => {
                    n_excluded += 1;
                    debug!(event_list_idx, ?cause, "event excluded from clock index");
                }
            }
        }

        info!(n_indexed = rows.len(), n_excluded, "event clock index built");
        Self { rows }
    }

    /// Create an index from prebuilt rows, in the given order.
    #[must_use]
    pub fn from_rows(rows: Vec<EventIndexRow>) -> Self {
        Self { rows }
    }

    /// Return the rows in source order.
    #[must_use]
    pub fn rows(&self) -> &[EventIndexRow] {
        &self.rows
    }

    /// Return the number of indexed events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Return true if no event was usable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Return the rows for one game and period, in index order.
    pub fn rows_for(&self, gameid: GameId, quarter: u8) -> impl Iterator<Item = &EventIndexRow> {
        self.rows
            .iter()
            .filter(move |r| r.gameid == gameid && r.quarter == quarter)
    }
}
