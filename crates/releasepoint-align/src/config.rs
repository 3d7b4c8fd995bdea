//! Alignment configuration with documented defaults.

use std::fmt;
use std::str::FromStr;

use crate::error::AlignError;

/// Default padding (seconds) applied to both ends of an event's clock span.
pub const DEFAULT_SPAN_PAD: f64 = 1.0;
/// Default tolerance (seconds) on center distance for in-window matches.
pub const DEFAULT_MAX_CENTER_DIFF: f64 = 2.0;
/// Default tolerance (seconds) on center distance for fallback matches.
pub const DEFAULT_MAX_FALLBACK_DIFF: f64 = 4.0;
/// Default tolerance (seconds) between a shot and its release frame.
pub const DEFAULT_MAX_TIME_DIFF: f64 = 1.5;
/// Default tracking frame rate.
pub const DEFAULT_FPS: u32 = 25;
/// Default pre-release window (seconds) handed to feature extraction.
pub const DEFAULT_WINDOW_SECONDS: f64 = 1.0;
/// Default smoothing window (frames) handed to feature extraction.
pub const DEFAULT_SMOOTH_WINDOW: usize = 5;

/// Strategy for picking the release frame within a matched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleaseMode {
    /// The frame whose game clock is nearest the shot clock.
    #[default]
    Closest,
}

impl ReleaseMode {
    /// Return the mode's configuration string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReleaseMode::Closest => "closest",
        }
    }
}

impl FromStr for ReleaseMode {
    type Err = AlignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "closest" => Ok(ReleaseMode::Closest),
            other => Err(AlignError::UnknownMatchMode {
                mode: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ReleaseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for shot-to-tracking alignment.
///
/// Construct via [`AlignConfig::new`], then chain `with_*` methods.
/// [`AlignConfig::validate`] runs when the config is handed to a
/// pipeline, so misconfiguration fails before any shot is processed.
///
/// # Defaults
///
/// | Parameter           | Default   |
/// |---------------------|-----------|
/// | `span_pad`          | 1.0       |
/// | `max_center_diff`   | 2.0       |
/// | `max_fallback_diff` | 4.0       |
/// | `max_time_diff`     | 1.5       |
/// | `release_mode`      | `Closest` |
/// | `fps`               | 25        |
/// | `window_seconds`    | 1.0       |
/// | `smooth_window`     | 5         |
#[derive(Debug, Clone, PartialEq)]
pub struct AlignConfig {
    pub(crate) span_pad: f64,
    pub(crate) max_center_diff: f64,
    pub(crate) max_fallback_diff: f64,
    pub(crate) max_time_diff: f64,
    pub(crate) release_mode: ReleaseMode,
    pub(crate) fps: u32,
    pub(crate) window_seconds: f64,
    pub(crate) smooth_window: usize,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AlignConfig {
    /// Create a config populated with the documented defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            span_pad: DEFAULT_SPAN_PAD,
            max_center_diff: DEFAULT_MAX_CENTER_DIFF,
            max_fallback_diff: DEFAULT_MAX_FALLBACK_DIFF,
            max_time_diff: DEFAULT_MAX_TIME_DIFF,
            release_mode: ReleaseMode::Closest,
            fps: DEFAULT_FPS,
            window_seconds: DEFAULT_WINDOW_SECONDS,
            smooth_window: DEFAULT_SMOOTH_WINDOW,
        }
    }

    // --- Setters ---

    /// Set the padding applied to both ends of each event span.
    #[must_use]
    pub fn with_span_pad(mut self, span_pad: f64) -> Self {
        self.span_pad = span_pad;
        self
    }

    /// Set the center-distance tolerance for in-window matches.
    #[must_use]
    pub fn with_max_center_diff(mut self, max_center_diff: f64) -> Self {
        self.max_center_diff = max_center_diff;
        self
    }

    /// Set the center-distance tolerance for fallback matches.
    #[must_use]
    pub fn with_max_fallback_diff(mut self, max_fallback_diff: f64) -> Self {
        self.max_fallback_diff = max_fallback_diff;
        self
    }

    /// Set the shot-to-frame clock tolerance for release location.
    #[must_use]
    pub fn with_max_time_diff(mut self, max_time_diff: f64) -> Self {
        self.max_time_diff = max_time_diff;
        self
    }

    /// Set the release-frame selection strategy.
    #[must_use]
    pub fn with_release_mode(mut self, release_mode: ReleaseMode) -> Self {
        self.release_mode = release_mode;
        self
    }

    /// Set the release-frame selection strategy from its string name.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::UnknownMatchMode`] for anything but `"closest"`.
    pub fn with_match_mode(self, mode: &str) -> Result<Self, AlignError> {
        Ok(self.with_release_mode(mode.parse()?))
    }

    /// Set the tracking frame rate.
    #[must_use]
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Set the pre-release window length in seconds.
    #[must_use]
    pub fn with_window_seconds(mut self, window_seconds: f64) -> Self {
        self.window_seconds = window_seconds;
        self
    }

    /// Set the smoothing window in frames.
    #[must_use]
    pub fn with_smooth_window(mut self, smooth_window: usize) -> Self {
        self.smooth_window = smooth_window;
        self
    }

    // --- Getters ---

    /// Return the span padding.
    #[must_use]
    pub fn span_pad(&self) -> f64 {
        self.span_pad
    }

    /// Return the in-window center tolerance.
    #[must_use]
    pub fn max_center_diff(&self) -> f64 {
        self.max_center_diff
    }

    /// Return the fallback center tolerance.
    #[must_use]
    pub fn max_fallback_diff(&self) -> f64 {
        self.max_fallback_diff
    }

    /// Return the release-frame tolerance.
    #[must_use]
    pub fn max_time_diff(&self) -> f64 {
        self.max_time_diff
    }

    /// Return the release-frame selection strategy.
    #[must_use]
    pub fn release_mode(&self) -> ReleaseMode {
        self.release_mode
    }

    /// Return the tracking frame rate.
    #[must_use]
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Return the pre-release window in seconds.
    #[must_use]
    pub fn window_seconds(&self) -> f64 {
        self.window_seconds
    }

    /// Return the smoothing window in frames.
    #[must_use]
    pub fn smooth_window(&self) -> usize {
        self.smooth_window
    }

    /// Check every option.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`AlignError::InvalidTolerance`] | a tolerance or pad is negative, NaN, or infinite |
    /// | [`AlignError::InvalidFps`] | `fps` is zero |
    /// | [`AlignError::InvalidWindow`] | `window_seconds` is not positive and finite |
    /// | [`AlignError::InvalidSmoothWindow`] | `smooth_window` is zero |
    pub fn validate(&self) -> Result<(), AlignError> {
        for (name, value) in [
            ("span_pad", self.span_pad),
            ("max_center_diff", self.max_center_diff),
            ("max_fallback_diff", self.max_fallback_diff),
            ("max_time_diff", self.max_time_diff),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AlignError::InvalidTolerance { name, value });
            }
        }
        if self.fps == 0 {
            return Err(AlignError::InvalidFps { fps: self.fps });
        }
        if !self.window_seconds.is_finite() || self.window_seconds <= 0.0 {
            return Err(AlignError::InvalidWindow {
                window_seconds: self.window_seconds,
            });
        }
        if self.smooth_window == 0 {
            return Err(AlignError::InvalidSmoothWindow {
                smooth_window: self.smooth_window,
            });
        }
        Ok(())
    }
}
