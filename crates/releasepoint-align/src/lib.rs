//! Temporal alignment of basketball shot logs with player-tracking events.
//!
//! Pure library with no file I/O. Builds a game-clock index over tracking
//! events, matches each logged shot to the event whose clock span contains
//! it, locates the release frame inside that event, and hands the result to
//! a pluggable feature extractor.

mod cleaner;
mod coerce;
mod config;
mod error;
mod event;
mod features;
mod index;
mod matcher;
mod pipeline;
mod release;
mod shot;

pub use cleaner::{DropEmptyEvents, EventCleaner, PassthroughCleaner};
pub use coerce::{clock_from_str, id_from_str};
pub use config::{
    AlignConfig, DEFAULT_FPS, DEFAULT_MAX_CENTER_DIFF, DEFAULT_MAX_FALLBACK_DIFF, DEFAULT_MAX_TIME_DIFF,
    DEFAULT_SMOOTH_WINDOW, DEFAULT_SPAN_PAD, DEFAULT_WINDOW_SECONDS, ReleaseMode,
};
pub use error::AlignError;
pub use event::{Ball, Frame, GameId, PlayerPosition, TrackingEvent};
pub use features::{ERROR_FEATURE, FeatureExtractor, FeatureMap, FeatureRequest, FeatureValue, ReleaseSnapshot};
pub use index::{EventIndex, EventIndexRow, MIN_CLOCKS_FOR_SPAN, MIN_VALID_CLOCK_FRAMES};
pub use matcher::{ClockMatcher, EventMatch, MatchStrategy, NoMatchReason, SpanDiagnostics, StrategyKind};
pub use pipeline::{
    AlignmentOutput, AlignmentPipeline, NO_EVENT_MATCH, ShotAlignmentDebugRow, ShotFeatureRow, ShotFeatureTable,
};
pub use release::{ReleaseDiagnostics, ReleaseFailure, ReleaseLocator, ReleaseMatch};
pub use shot::{
    GAME_CLOCK_COLUMN, GAME_ID_COLUMN, PERIOD_COLUMN, PLAYER_ID_COLUMN, ShotRecord, ShotTable, TEAM_ID_COLUMN,
};
