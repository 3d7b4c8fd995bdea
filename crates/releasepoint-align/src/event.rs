//! Tracking domain types: frames and the events that group them.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::coerce;

/// A game identifier shared by the shot log and the tracking archive.
///
/// Stored numerically so that zero-padded strings (`"0021500001"`) and
/// integers (`21500001`) compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct GameId(u64);

impl GameId {
    /// Wrap a numeric game id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Return the numeric game id.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for GameId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        coerce::required_id(deserializer).map(Self)
    }
}

/// Ball position in court coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Ball {
    /// Court x (feet).
    pub x: f64,
    /// Court y (feet).
    pub y: f64,
    /// Height (feet), when the archive records it.
    #[serde(default)]
    pub z: Option<f64>,
}

/// One player's position in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PlayerPosition {
    /// Player id.
    #[serde(deserialize_with = "coerce::required_id")]
    pub playerid: u64,
    /// Team id.
    #[serde(deserialize_with = "coerce::required_id")]
    pub teamid: u64,
    /// Court x (feet).
    pub x: f64,
    /// Court y (feet).
    pub y: f64,
}

impl PlayerPosition {
    /// Euclidean distance from this player to the ball in the court plane.
    #[must_use]
    pub fn distance_to(&self, ball: &Ball) -> f64 {
        (self.x - ball.x).hypot(self.y - ball.y)
    }
}

/// One sampled instant of tracking data.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Frame {
    /// Seconds remaining in the period. `None` when missing or unparseable.
    #[serde(default, deserialize_with = "coerce::optional_clock")]
    pub game_clock: Option<f64>,
    /// Seconds remaining on the shot clock, when recorded.
    #[serde(default, deserialize_with = "coerce::optional_clock")]
    pub shot_clock: Option<f64>,
    /// Archive frame identifier, when recorded.
    #[serde(default, deserialize_with = "coerce::optional_id")]
    pub frame_id: Option<u64>,
    /// Ball position, when recorded.
    #[serde(default)]
    pub ball: Option<Ball>,
    /// Player positions in archive order.
    #[serde(default)]
    pub players: Vec<PlayerPosition>,
}

impl Frame {
    /// Create a frame carrying only a game clock reading.
    #[must_use]
    pub fn with_clock(game_clock: Option<f64>) -> Self {
        Self {
            game_clock,
            ..Self::default()
        }
    }

    /// Return the game clock if it is present and finite.
    #[must_use]
    pub fn valid_game_clock(&self) -> Option<f64> {
        self.game_clock.filter(|v| v.is_finite())
    }
}

/// A contiguous stretch of tracking frames, typically one possession or play.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackingEvent {
    /// Game the event belongs to.
    pub gameid: GameId,
    /// Period (quarter or overtime) the event belongs to.
    #[serde(deserialize_with = "coerce::required_quarter")]
    pub quarter: u8,
    /// Team in possession, when the archive records it.
    #[serde(default, deserialize_with = "coerce::optional_id")]
    pub possession_team_id: Option<u64>,
    /// Frames in archive order.
    #[serde(default)]
    pub frames: Vec<Frame>,
}

impl TrackingEvent {
    /// Create an event without a recorded possession team.
    #[must_use]
    pub fn new(gameid: GameId, quarter: u8, frames: Vec<Frame>) -> Self {
        Self {
            gameid,
            quarter,
            possession_team_id: None,
            frames,
        }
    }

    /// Return the recorded possession team, or infer one from the first frame.
    #[must_use]
    pub fn possession_team(&self) -> Option<u64> {
        self.possession_team_id.or_else(|| self.infer_possession_team())
    }

    /// Infer the possessing team as the team of the player nearest the ball
    /// in the first frame.
    ///
    /// Returns `None` when there are no frames, or the first frame lacks a
    /// ball or players. Ties keep the first player in archive order.
    #[must_use]
    pub fn infer_possession_team(&self) -> Option<u64> {
        let first = self.frames.first()?;
        let ball = first.ball.as_ref()?;
        first
            .players
            .iter()
            .map(|p| (p.distance_to(ball), p.teamid))
            .fold(None, |best: Option<(f64, u64)>, (dist, team)| match best {
                Some((best_dist, _)) if best_dist <= dist => best,
                _ => Some((dist, team)),
            })
            .map(|(_, team)| team)
    }
}
