//! Release-frame location within one matched event.

use std::fmt;

use crate::config::{AlignConfig, ReleaseMode};
use crate::event::Frame;

/// Why no release frame was located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseFailure {
    /// No frame of the event has a valid game clock.
    NoValidFrameClocks,
    /// The shot clock is missing or non-finite.
    InvalidShotClock,
    /// The closest frame is further from the shot clock than the tolerance.
    TimeDiffTooLarge,
}

impl ReleaseFailure {
    /// Return the reason as reported in debug output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReleaseFailure::NoValidFrameClocks => "no_valid_frame_clocks",
            ReleaseFailure::InvalidShotClock => "invalid_shot_clock",
            ReleaseFailure::TimeDiffTooLarge => "time_diff_too_large",
        }
    }
}

impl fmt::Display for ReleaseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance of the frame the locator settled on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReleaseDiagnostics {
    /// `|frame clock - shot clock|`.
    pub time_diff: f64,
    /// The chosen frame's game clock.
    pub frame_game_clock: f64,
    /// The chosen frame's archive id, if recorded.
    pub frame_id: Option<u64>,
    /// Frames in the event with a valid game clock.
    pub n_frames_gc: usize,
    /// The tolerance `time_diff` was tested against.
    pub max_time_diff: f64,
}

/// Outcome of a release-frame search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReleaseMatch {
    /// The release frame is `frames[frame_idx]`.
    Located {
        /// Position of the release frame in the event's frame list.
        frame_idx: usize,
        /// The chosen frame's provenance.
        diagnostics: ReleaseDiagnostics,
    },
    /// No frame was accepted.
    Unlocated {
        /// Why no frame was accepted.
        reason: ReleaseFailure,
        /// The rejected frame's provenance, when a frame was considered.
        diagnostics: Option<ReleaseDiagnostics>,
    },
}

impl ReleaseMatch {
    /// Return the release frame position, if located.
    #[must_use]
    pub fn frame_idx(&self) -> Option<usize> {
        match *self {
            ReleaseMatch::Located { frame_idx, .. } => Some(frame_idx),
            ReleaseMatch::Unlocated { .. } => None,
        }
    }

    /// Return the outcome reason as reported in debug output.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            ReleaseMatch::Located { .. } => "ok",
            ReleaseMatch::Unlocated { reason, .. } => reason.as_str(),
        }
    }

    /// Return the considered frame's provenance, if any.
    #[must_use]
    pub fn diagnostics(&self) -> Option<&ReleaseDiagnostics> {
        match self {
            ReleaseMatch::Located { diagnostics, .. } => Some(diagnostics),
            ReleaseMatch::Unlocated { diagnostics, .. } => diagnostics.as_ref(),
        }
    }
}

/// Finds the frame of an event that corresponds to a shot's release.
///
/// Frames are dense, so there is no windowed first pass: the frame whose
/// valid game clock is nearest the shot clock wins (ties keep the earliest
/// frame) and is accepted if within `max_time_diff`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReleaseLocator {
    mode: ReleaseMode,
    max_time_diff: f64,
}

impl ReleaseLocator {
    /// Create a locator with the given mode and tolerance.
    #[must_use]
    pub fn new(mode: ReleaseMode, max_time_diff: f64) -> Self {
        Self { mode, max_time_diff }
    }

    /// Create a locator from a config's mode and tolerance.
    #[must_use]
    pub fn from_config(config: &AlignConfig) -> Self {
        Self::new(config.release_mode, config.max_time_diff)
    }

    /// Locate the release frame for a shot at `shot_clock` among `frames`.
    #[must_use]
    pub fn locate(&self, frames: &[Frame], shot_clock: f64) -> ReleaseMatch {
        let n_frames_gc = frames.iter().filter(|f| f.valid_game_clock().is_some()).count();
        if n_frames_gc == 0 {
            return ReleaseMatch::Unlocated {
                reason: ReleaseFailure::NoValidFrameClocks,
                diagnostics: None,
            };
        }
        if !shot_clock.is_finite() {
            return ReleaseMatch::Unlocated {
                reason: ReleaseFailure::InvalidShotClock,
                diagnostics: None,
            };
        }

        let nearest = match self.mode {
            ReleaseMode::Closest => nearest_frame(frames, shot_clock),
        };
        let Some((frame_idx, frame_game_clock, time_diff)) = nearest else {
            return ReleaseMatch::Unlocated {
                reason: ReleaseFailure::NoValidFrameClocks,
                diagnostics: None,
            };
        };

        let diagnostics = ReleaseDiagnostics {
            time_diff,
            frame_game_clock,
            frame_id: frames[frame_idx].frame_id,
            n_frames_gc,
            max_time_diff: self.max_time_diff,
        };
        if time_diff > self.max_time_diff {
            ReleaseMatch::Unlocated {
                reason: ReleaseFailure::TimeDiffTooLarge,
                diagnostics: Some(diagnostics),
            }
        } else {
            ReleaseMatch::Located {
                frame_idx,
                diagnostics,
            }
        }
    }
}

/// Return `(index, clock, |clock - target|)` of the frame nearest `target`.
fn nearest_frame(frames: &[Frame], target: f64) -> Option<(usize, f64, f64)> {
    frames
        .iter()
        .enumerate()
        .filter_map(|(i, f)| f.valid_game_clock().map(|gc| (i, gc, (gc - target).abs())))
        .fold(None, |best, candidate| match best {
            Some((_, _, best_diff)) if best_diff <= candidate.2 => best,
            _ => Some(candidate),
        })
}
