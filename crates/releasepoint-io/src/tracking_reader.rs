//! JSON tracking-event reader.

use std::io::BufReader;
use std::path::{Path, PathBuf};

use releasepoint_align::TrackingEvent;
use tracing::{info, instrument, warn};

use crate::IoError;

/// Reads one game's tracking events from a JSON file.
///
/// Expected format: a JSON array of events,
/// `[{"gameid", "quarter", "possession_team_id"?, "frames": [...]}, ...]`,
/// where each frame carries `game_clock`, and optionally `shot_clock`,
/// `frame_id`, `ball` and `players`. Numeric fields may be numbers or
/// numeric strings; unreadable clocks are kept as missing.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::JsonParse`] | Not a JSON array of events, or an id is unreadable |
pub struct TrackingReader {
    path: PathBuf,
}

impl TrackingReader {
    /// Create a new reader for the given JSON file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read the file, returning events in file order.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Vec<TrackingEvent>, IoError> {
        // 1. Open file (FileNotFound on failure)
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // 2. Deserialize the whole array
        let events: Vec<TrackingEvent> =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| IoError::JsonParse {
                path: self.path.clone(),
                line: e.line(),
                column: e.column(),
                source: e,
            })?;

        // 3. Report mixed games; alignment only looks at the first event's game
        if let Some(first) = events.first() {
            let n_foreign = events.iter().filter(|e| e.gameid != first.gameid).count();
            if n_foreign > 0 {
                warn!(game_id = %first.gameid, n_foreign, "tracking file mixes games");
            }
        }

        let n_frames: usize = events.iter().map(|e| e.frames.len()).sum();
        info!(n_events = events.len(), n_frames, "tracking events loaded");
        Ok(events)
    }
}
