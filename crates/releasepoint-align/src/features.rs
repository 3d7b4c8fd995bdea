//! Per-shot feature extraction collaborators.
//!
//! The pipeline hands each located release frame to a [`FeatureExtractor`]
//! and merges the returned flat map verbatim into the shot's output row.

use std::collections::BTreeMap;
use std::fmt;

use crate::event::Frame;

/// One feature cell.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    /// A numeric feature.
    Number(f64),
    /// A textual marker, typically an error code.
    Text(String),
    /// No value.
    Missing,
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Number(value)
    }
}

impl From<Option<f64>> for FeatureValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(FeatureValue::Missing, FeatureValue::Number)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Text(value.to_string())
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Number(v) => write!(f, "{v}"),
            FeatureValue::Text(s) => f.write_str(s),
            FeatureValue::Missing => Ok(()),
        }
    }
}

/// Flat feature name → value map, ordered by name.
pub type FeatureMap = BTreeMap<String, FeatureValue>;

/// Name of the feature column carrying error markers.
pub const ERROR_FEATURE: &str = "error";

/// Everything an extractor gets to see about one shot.
#[derive(Debug, Clone, Copy)]
pub struct FeatureRequest<'a> {
    /// Frames of the matched event.
    pub frames: &'a [Frame],
    /// Position of the release frame in `frames`, if one was located.
    pub release_frame_idx: Option<usize>,
    /// Shooter id.
    pub shooter_id: u64,
    /// Offensive (shooting) team id.
    pub offense_team_id: u64,
    /// Tracking frame rate.
    pub fps: u32,
    /// Pre-release window length in seconds.
    pub window_seconds: f64,
    /// Smoothing window in frames.
    pub smooth_window: usize,
}

impl FeatureRequest<'_> {
    /// Number of frames spanned by `window_seconds` at `fps`.
    #[must_use]
    pub fn window_frames(&self) -> usize {
        (f64::from(self.fps) * self.window_seconds).round() as usize
    }
}

/// Computes a flat feature map for one shot.
pub trait FeatureExtractor: Sync {
    /// Compute the features for `request`.
    fn extract(&self, request: &FeatureRequest<'_>) -> FeatureMap;
}

impl<F> FeatureExtractor for F
where
    F: Fn(&FeatureRequest<'_>) -> FeatureMap + Sync,
{
    fn extract(&self, request: &FeatureRequest<'_>) -> FeatureMap {
        self(request)
    }
}

/// Records the tracking context at the release frame.
///
/// Emits `release_frame_id`, `release_game_clock`, `release_shot_clock`,
/// `ball_x`/`ball_y`/`ball_z`, `shooter_x`/`shooter_y`,
/// `shooter_ball_dist`, `offense_players`, and `window_frames` (frames
/// available in the pre-release window, release frame included). Without a
/// release frame it emits only `error = "no_release_frame"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReleaseSnapshot;

impl FeatureExtractor for ReleaseSnapshot {
    fn extract(&self, request: &FeatureRequest<'_>) -> FeatureMap {
        let mut features = FeatureMap::new();
        let located = request
            .release_frame_idx
            .and_then(|i| request.frames.get(i).map(|frame| (i, frame)));
        let Some((release_idx, frame)) = located else {
            features.insert(ERROR_FEATURE.to_string(), "no_release_frame".into());
            return features;
        };

        let shooter = frame.players.iter().find(|p| p.playerid == request.shooter_id);
        let ball = frame.ball.as_ref();
        let offense_players = frame
            .players
            .iter()
            .filter(|p| p.teamid == request.offense_team_id)
            .count();
        let window_start = release_idx.saturating_sub(request.window_frames());

        let mut put = |name: &str, value: FeatureValue| {
            features.insert(name.to_string(), value);
        };
        put("release_frame_id", frame.frame_id.map(|id| id as f64).into());
        put("release_game_clock", frame.valid_game_clock().into());
        put("release_shot_clock", frame.shot_clock.into());
        put("ball_x", ball.map(|b| b.x).into());
        put("ball_y", ball.map(|b| b.y).into());
        put("ball_z", ball.and_then(|b| b.z).into());
        put("shooter_x", shooter.map(|p| p.x).into());
        put("shooter_y", shooter.map(|p| p.y).into());
        put(
            "shooter_ball_dist",
            shooter.zip(ball).map(|(p, b)| p.distance_to(b)).into(),
        );
        put("offense_players", (offense_players as f64).into());
        put("window_frames", ((release_idx - window_start + 1) as f64).into());
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Ball, PlayerPosition};

    fn frames(n: usize) -> Vec<Frame> {
        (0..n)
            .map(|i| Frame {
                game_clock: Some(100.0 - i as f64 * 0.04),
                shot_clock: Some(20.0 - i as f64 * 0.04),
                frame_id: Some(i as u64),
                ball: Some(Ball { x: 3.0, y: 4.0, z: Some(8.0) }),
                players: vec![
                    PlayerPosition { playerid: 7, teamid: 1, x: 0.0, y: 0.0 },
                    PlayerPosition { playerid: 8, teamid: 1, x: 9.0, y: 9.0 },
                    PlayerPosition { playerid: 9, teamid: 2, x: 1.0, y: 1.0 },
                ],
            })
            .collect()
    }

    fn request(frames: &[Frame], release_frame_idx: Option<usize>) -> FeatureRequest<'_> {
        FeatureRequest {
            frames,
            release_frame_idx,
            shooter_id: 7,
            offense_team_id: 1,
            fps: 25,
            window_seconds: 1.0,
            smooth_window: 5,
        }
    }

    #[test]
    fn snapshot_at_release_frame() {
        let frames = frames(40);
        let features = ReleaseSnapshot.extract(&request(&frames, Some(30)));
        assert_eq!(features["release_frame_id"], FeatureValue::Number(30.0));
        assert_eq!(features["shooter_x"], FeatureValue::Number(0.0));
        assert_eq!(features["shooter_ball_dist"], FeatureValue::Number(5.0));
        assert_eq!(features["offense_players"], FeatureValue::Number(2.0));
        assert_eq!(features["ball_z"], FeatureValue::Number(8.0));
        assert_eq!(features["window_frames"], FeatureValue::Number(26.0));
        assert!(!features.contains_key(ERROR_FEATURE));
    }

    #[test]
    fn window_is_truncated_at_event_start() {
        let frames = frames(40);
        let features = ReleaseSnapshot.extract(&request(&frames, Some(3)));
        assert_eq!(features["window_frames"], FeatureValue::Number(4.0));
    }

    #[test]
    fn missing_shooter_gives_missing_cells() {
        let frames = frames(5);
        let mut req = request(&frames, Some(2));
        req.shooter_id = 99;
        let features = ReleaseSnapshot.extract(&req);
        assert_eq!(features["shooter_x"], FeatureValue::Missing);
        assert_eq!(features["shooter_ball_dist"], FeatureValue::Missing);
    }

    #[test]
    fn no_release_frame_is_an_error_marker() {
        let frames = frames(5);
        let features = ReleaseSnapshot.extract(&request(&frames, None));
        assert_eq!(features.len(), 1);
        assert_eq!(features[ERROR_FEATURE], FeatureValue::Text("no_release_frame".into()));
    }

    #[test]
    fn closures_are_extractors() {
        let extractor = |req: &FeatureRequest<'_>| {
            let mut m = FeatureMap::new();
            m.insert("n".into(), (req.frames.len() as f64).into());
            m
        };
        let frames = frames(3);
        assert_eq!(extractor.extract(&request(&frames, None))["n"], FeatureValue::Number(3.0));
    }

    #[test]
    fn display_formats_cells() {
        assert_eq!(FeatureValue::Number(1.5).to_string(), "1.5");
        assert_eq!(FeatureValue::Text("x".into()).to_string(), "x");
        assert_eq!(FeatureValue::Missing.to_string(), "");
    }
}
