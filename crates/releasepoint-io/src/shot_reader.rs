//! CSV shot-log reader.

use std::path::{Path, PathBuf};

use releasepoint_align::{
    GAME_CLOCK_COLUMN, GAME_ID_COLUMN, GameId, PERIOD_COLUMN, PLAYER_ID_COLUMN, ShotRecord, ShotTable, TEAM_ID_COLUMN,
    clock_from_str, id_from_str,
};
use tracing::{debug, info, instrument, warn};

use crate::IoError;

/// Column positions of the required fields.
struct Columns {
    game_id: usize,
    period: usize,
    game_clock: usize,
    team_id: usize,
    player_id: usize,
}

/// Reads a shot log from a CSV file.
///
/// Expected CSV format:
/// - Header row required, names matched exactly
/// - Must contain `GAME_ID`, `PERIOD`, `game_clock`, `TEAM_ID`, `PLAYER_ID`
///   in any position; every other column is carried through verbatim
/// - Ids may be zero-padded (`0021500491`)
/// - An unreadable `game_clock`, `PERIOD`, `TEAM_ID` or `PLAYER_ID` cell
///   becomes a missing value rather than an error
/// - A row whose `GAME_ID` is unreadable belongs to no game and is skipped
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingColumn`] | A required column is absent from the header |
pub struct ShotReader {
    path: PathBuf,
}

impl ShotReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read the CSV file, returning a [`ShotTable`] in file order.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<ShotTable, IoError> {
        // 1. Open file (FileNotFound on failure)
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // 2. Build CSV reader with headers; short rows are padded below
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        // 3. Locate required columns
        let header: Vec<String> = rdr
            .headers()
            .map_err(|e| self.csv_error(e))?
            .iter()
            .map(String::from)
            .collect();
        let columns = self.locate_columns(&header)?;
        debug!(n_columns = header.len(), "read CSV header");

        // 4. Parse rows
        let mut shots = Vec::new();
        let mut n_missing_clock = 0usize;
        let mut n_invalid_fields = 0usize;
        let mut n_skipped = 0usize;
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.csv_error(e))?;
            let mut raw: Vec<String> = record.iter().map(String::from).collect();
            raw.resize(header.len(), String::new());

            let Some(game_id) = id_from_str(&raw[columns.game_id]) else {
                warn!(row_index, raw = %raw[columns.game_id], "skipping shot with unreadable GAME_ID");
                n_skipped += 1;
                continue;
            };

            let game_clock = clock_from_str(&raw[columns.game_clock]);
            if game_clock.is_none() {
                n_missing_clock += 1;
            }
            let period = read_field(&raw, row_index, columns.period, PERIOD_COLUMN)
                .and_then(|p| u8::try_from(p).ok());
            let player_id = read_field(&raw, row_index, columns.player_id, PLAYER_ID_COLUMN);
            let team_id = read_field(&raw, row_index, columns.team_id, TEAM_ID_COLUMN);
            if period.is_none() || player_id.is_none() || team_id.is_none() {
                n_invalid_fields += 1;
            }

            shots.push(ShotRecord {
                game_id: GameId::new(game_id),
                period,
                player_id,
                team_id,
                game_clock,
                columns: raw,
            });
        }

        if n_invalid_fields > 0 {
            warn!(n_invalid_fields, "shots with unreadable period or ids will not be matched");
        }
        info!(n_shots = shots.len(), n_missing_clock, n_skipped, "shot log loaded");
        Ok(ShotTable::new(header, shots))
    }

    fn locate_columns(&self, header: &[String]) -> Result<Columns, IoError> {
        let find = |column: &'static str| {
            header
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| IoError::MissingColumn {
                    path: self.path.clone(),
                    column,
                })
        };
        Ok(Columns {
            game_id: find(GAME_ID_COLUMN)?,
            period: find(PERIOD_COLUMN)?,
            game_clock: find(GAME_CLOCK_COLUMN)?,
            team_id: find(TEAM_ID_COLUMN)?,
            player_id: find(PLAYER_ID_COLUMN)?,
        })
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

/// Read an integer cell, logging the raw value when it is unreadable.
fn read_field(raw: &[String], row_index: usize, col: usize, column: &'static str) -> Option<u64> {
    let value = id_from_str(&raw[col]);
    if value.is_none() {
        debug!(row_index, column, raw = %raw[col], "unreadable shot field");
    }
    value
}
