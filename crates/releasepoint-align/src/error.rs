//! Error types for alignment configuration and pipeline preconditions.

use crate::event::GameId;

/// Errors from alignment configuration and pipeline invocation.
///
/// Data-quality problems (missing clocks, unmatched shots) are never
/// reported through this type; they surface as reasons in the debug table.
#[derive(Debug, thiserror::Error)]
pub enum AlignError {
    /// Returned when a release match mode string is not recognized.
    #[error("unknown match mode \"{mode}\" (expected \"closest\")")]
    UnknownMatchMode {
        /// The rejected mode string.
        mode: String,
    },

    /// Returned when a clock tolerance is negative, NaN, or infinite.
    #[error("{name} must be a finite, non-negative number of seconds, got {value}")]
    InvalidTolerance {
        /// Name of the offending option.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Returned when the tracking frame rate is zero.
    #[error("fps must be at least 1, got {fps}")]
    InvalidFps {
        /// The rejected frame rate.
        fps: u32,
    },

    /// Returned when the pre-release window is not a positive, finite duration.
    #[error("window_seconds must be positive and finite, got {window_seconds}")]
    InvalidWindow {
        /// The rejected window length.
        window_seconds: f64,
    },

    /// Returned when the smoothing window is zero frames.
    #[error("smooth_window must be at least 1 frame, got {smooth_window}")]
    InvalidSmoothWindow {
        /// The rejected smoothing window.
        smooth_window: usize,
    },

    /// Returned when the tracking event list is empty, so no game id can be resolved.
    #[error("tracking data contains no events; cannot resolve a game id")]
    NoTrackingEvents,

    /// Returned when the shot log has no rows for the tracked game.
    #[error("shot log contains no shots for game {game_id}")]
    NoShotsForGame {
        /// The game id resolved from the tracking data.
        game_id: GameId,
    },
}
