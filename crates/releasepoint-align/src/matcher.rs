//! Shot-to-event matching by game clock.
//!
//! A shot is matched against the index rows of its game and period by a
//! list of strategies evaluated in order. The first strategy that admits
//! at least one row decides the outcome: its closest row (by distance
//! between the row's clock center and the shot clock) is accepted if it is
//! within the strategy's tolerance, and rejected with a strategy-specific
//! reason otherwise. Later strategies are not consulted after a rejection.

use std::fmt;

use crate::config::AlignConfig;
use crate::event::GameId;
use crate::index::{EventIndex, EventIndexRow};

/// Identity of a matching strategy, independent of its tolerances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Shot clock inside the padded `[gc_end, gc_start]` span.
    ExactWindow,
    /// Nearest center across all rows of the game and period.
    FallbackNearest,
}

impl StrategyKind {
    /// Return the strategy's name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::ExactWindow => "exact_window",
            StrategyKind::FallbackNearest => "fallback_nearest",
        }
    }

    /// Return the reason reported when this strategy produces a match.
    #[must_use]
    pub fn success_reason(self) -> &'static str {
        match self {
            StrategyKind::ExactWindow => "ok",
            StrategyKind::FallbackNearest => "fallback_closest_center",
        }
    }

    fn rejection(self) -> NoMatchReason {
        match self {
            StrategyKind::ExactWindow => NoMatchReason::CenterDiffTooLarge,
            StrategyKind::FallbackNearest => NoMatchReason::FallbackCenterDiffTooLarge,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A matching strategy with its admission predicate and tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchStrategy {
    /// Admit rows whose span, widened by `span_pad` on both ends, contains
    /// the shot clock; accept the closest if within `max_center_diff`.
    ExactWindow {
        /// Padding applied to both ends of the span.
        span_pad: f64,
        /// Largest accepted center distance.
        max_center_diff: f64,
    },
    /// Admit every row; accept the closest if within `max_fallback_diff`.
    FallbackNearest {
        /// Largest accepted center distance.
        max_fallback_diff: f64,
    },
}

impl MatchStrategy {
    /// Return the strategy's identity.
    #[must_use]
    pub fn kind(&self) -> StrategyKind {
        match self {
            MatchStrategy::ExactWindow { .. } => StrategyKind::ExactWindow,
            MatchStrategy::FallbackNearest { .. } => StrategyKind::FallbackNearest,
        }
    }

    /// Return the largest center distance this strategy accepts.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        match *self {
            MatchStrategy::ExactWindow { max_center_diff, .. } => max_center_diff,
            MatchStrategy::FallbackNearest { max_fallback_diff } => max_fallback_diff,
        }
    }

    fn admits(&self, row: &EventIndexRow, shot_clock: f64) -> bool {
        match *self {
            MatchStrategy::ExactWindow { span_pad, .. } => {
                shot_clock <= row.gc_start + span_pad && shot_clock >= row.gc_end - span_pad
            }
            MatchStrategy::FallbackNearest { .. } => true,
        }
    }
}

/// Why a shot could not be matched to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoMatchReason {
    /// The index has no rows for the shot's game and period.
    NoEventsForGameQuarter,
    /// No row of the game and period has finite clock bounds.
    NoValidGcSpans,
    /// The shot clock is missing or non-finite.
    InvalidShotClock,
    /// The shot's period, shooter or team could not be read.
    InvalidShotFields,
    /// The closest in-window row is too far from the shot clock.
    CenterDiffTooLarge,
    /// The closest row overall is too far from the shot clock.
    FallbackCenterDiffTooLarge,
    /// No strategy admitted any row (only possible without a fallback strategy).
    OutsideAllWindows,
}

impl NoMatchReason {
    /// Return the reason as reported in debug output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NoMatchReason::NoEventsForGameQuarter => "no_events_for_game_quarter",
            NoMatchReason::NoValidGcSpans => "no_valid_gc_spans",
            NoMatchReason::InvalidShotClock => "invalid_shot_clock",
            NoMatchReason::InvalidShotFields => "invalid_shot_fields",
            NoMatchReason::CenterDiffTooLarge => "center_diff_too_large",
            NoMatchReason::FallbackCenterDiffTooLarge => "fallback_center_diff_too_large",
            NoMatchReason::OutsideAllWindows => "outside_all_windows",
        }
    }
}

impl fmt::Display for NoMatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance of the row a strategy settled on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanDiagnostics {
    /// `|gc_center - shot_clock|` for the chosen row.
    pub center_diff: f64,
    /// The chosen row's span start.
    pub gc_start: f64,
    /// The chosen row's span end.
    pub gc_end: f64,
    /// The tolerance the center distance was tested against.
    pub tolerance: f64,
}

/// Outcome of matching one shot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventMatch {
    /// The shot was matched to the event at `event_list_idx`.
    Matched {
        /// Position of the event in the indexed list.
        event_list_idx: usize,
        /// Strategy that produced the match.
        strategy: StrategyKind,
        /// The matched row's provenance.
        diagnostics: SpanDiagnostics,
    },
    /// No event was accepted.
    Unmatched {
        /// Why no event was accepted.
        reason: NoMatchReason,
        /// The rejected row's provenance, when a row was considered.
        diagnostics: Option<SpanDiagnostics>,
    },
}

impl EventMatch {
    /// Return the matched event position, if any.
    #[must_use]
    pub fn event_list_idx(&self) -> Option<usize> {
        match *self {
            EventMatch::Matched { event_list_idx, .. } => Some(event_list_idx),
            EventMatch::Unmatched { .. } => None,
        }
    }

    /// Return the outcome reason as reported in debug output.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            EventMatch::Matched { strategy, .. } => strategy.success_reason(),
            EventMatch::Unmatched { reason, .. } => reason.as_str(),
        }
    }

    /// Return the provenance of the considered row, if any.
    #[must_use]
    pub fn diagnostics(&self) -> Option<&SpanDiagnostics> {
        match self {
            EventMatch::Matched { diagnostics, .. } => Some(diagnostics),
            EventMatch::Unmatched { diagnostics, .. } => diagnostics.as_ref(),
        }
    }

    /// Return true if an event was matched.
    #[must_use]
    pub fn is_matched(&self) -> bool {
        matches!(self, EventMatch::Matched { .. })
    }
}

/// Matches shots to indexed events with an ordered list of strategies.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockMatcher {
    strategies: Vec<MatchStrategy>,
}

impl ClockMatcher {
    /// Create the standard two-tier matcher: an exact padded window, then a
    /// nearest-center fallback with its own, looser tolerance.
    #[must_use]
    pub fn new(span_pad: f64, max_center_diff: f64, max_fallback_diff: f64) -> Self {
        Self::with_strategies(vec![
            MatchStrategy::ExactWindow {
                span_pad,
                max_center_diff,
            },
            MatchStrategy::FallbackNearest { max_fallback_diff },
        ])
    }

    /// Create the standard matcher from a config's tolerances.
    #[must_use]
    pub fn from_config(config: &AlignConfig) -> Self {
        Self::new(config.span_pad, config.max_center_diff, config.max_fallback_diff)
    }

    /// Create a matcher with a custom strategy list, evaluated in order.
    #[must_use]
    pub fn with_strategies(strategies: Vec<MatchStrategy>) -> Self {
        Self { strategies }
    }

    /// Return the strategies in evaluation order.
    #[must_use]
    pub fn strategies(&self) -> &[MatchStrategy] {
        &self.strategies
    }

    /// Match a shot at `shot_clock` in `gameid`/`quarter` against `index`.
    ///
    /// Never fails; every outcome, including no match, is reported through
    /// [`EventMatch`].
    #[must_use]
    pub fn find(&self, index: &EventIndex, gameid: GameId, quarter: u8, shot_clock: f64) -> EventMatch {
        let rows: Vec<&EventIndexRow> = index.rows_for(gameid, quarter).collect();
        if rows.is_empty() {
            return EventMatch::Unmatched {
                reason: NoMatchReason::NoEventsForGameQuarter,
                diagnostics: None,
            };
        }

        let rows: Vec<&EventIndexRow> = rows
            .into_iter()
            .filter(|r| r.gc_start.is_finite() && r.gc_end.is_finite())
            .collect();
        if rows.is_empty() {
            return EventMatch::Unmatched {
                reason: NoMatchReason::NoValidGcSpans,
                diagnostics: None,
            };
        }

        if !shot_clock.is_finite() {
            return EventMatch::Unmatched {
                reason: NoMatchReason::InvalidShotClock,
                diagnostics: None,
            };
        }

        for strategy in &self.strategies {
            let admitted = rows.iter().copied().filter(|r| strategy.admits(r, shot_clock));
            let Some((row, center_diff)) = closest_center(admitted, shot_clock) else {
                continue;
            };

            let diagnostics = SpanDiagnostics {
                center_diff,
                gc_start: row.gc_start,
                gc_end: row.gc_end,
                tolerance: strategy.tolerance(),
            };
            let kind = strategy.kind();
            return if center_diff > strategy.tolerance() {
                EventMatch::Unmatched {
                    reason: kind.rejection(),
                    diagnostics: Some(diagnostics),
                }
            } else {
                EventMatch::Matched {
                    event_list_idx: row.event_list_idx,
                    strategy: kind,
                    diagnostics,
                }
            };
        }

        EventMatch::Unmatched {
            reason: NoMatchReason::OutsideAllWindows,
            diagnostics: None,
        }
    }
}

/// Return the row whose center is nearest `shot_clock`. Ties keep the
/// earliest row.
fn closest_center<'a>(
    rows: impl Iterator<Item = &'a EventIndexRow>,
    shot_clock: f64,
) -> Option<(&'a EventIndexRow, f64)> {
    rows.map(|r| (r, (0.5 * (r.gc_start + r.gc_end) - shot_clock).abs()))
        .fold(None, |best, (row, diff)| match best {
            Some((_, best_diff)) if best_diff <= diff => best,
            _ => Some((row, diff)),
        })
}
