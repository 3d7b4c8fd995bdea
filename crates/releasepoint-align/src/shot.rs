//! Shot-log domain types.

use crate::event::GameId;

/// Shot-log column holding the game id.
pub const GAME_ID_COLUMN: &str = "GAME_ID";
/// Shot-log column holding the period.
pub const PERIOD_COLUMN: &str = "PERIOD";
/// Shot-log column holding seconds remaining in the period.
pub const GAME_CLOCK_COLUMN: &str = "game_clock";
/// Shot-log column holding the shooting team id.
pub const TEAM_ID_COLUMN: &str = "TEAM_ID";
/// Shot-log column holding the shooter id.
pub const PLAYER_ID_COLUMN: &str = "PLAYER_ID";

/// One shot attempt from the shot log.
///
/// `columns` holds the raw cell values of the source row, parallel to
/// [`ShotTable::header`], so that output tables can reproduce every input
/// column verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotRecord {
    /// Game the shot belongs to.
    pub game_id: GameId,
    /// Period (quarter or overtime). `None` when unreadable.
    pub period: Option<u8>,
    /// Shooter id. `None` when unreadable.
    pub player_id: Option<u64>,
    /// Shooting (offensive) team id. `None` when unreadable.
    pub team_id: Option<u64>,
    /// Seconds remaining in the period at the shot. `None` when missing.
    pub game_clock: Option<f64>,
    /// Raw cell values of the source row.
    pub columns: Vec<String>,
}

impl ShotRecord {
    /// Create a shot with no raw columns attached.
    ///
    /// [`ShotTable::new`] fills the columns from these fields.
    #[must_use]
    pub fn new(game_id: GameId, period: u8, player_id: u64, team_id: u64, game_clock: Option<f64>) -> Self {
        Self {
            game_id,
            period: Some(period),
            player_id: Some(player_id),
            team_id: Some(team_id),
            game_clock,
            columns: Vec::new(),
        }
    }

    /// Truncate or extend `columns` to one cell per header name.
    ///
    /// Added cells under a known column name take the typed field's value;
    /// any other added cell is empty.
    fn fit_columns(&mut self, header: &[String]) {
        self.columns.truncate(header.len());
        for name in &header[self.columns.len()..] {
            let cell = self.field_text(name).unwrap_or_default();
            self.columns.push(cell);
        }
    }

    fn field_text(&self, column: &str) -> Option<String> {
        match column {
            GAME_ID_COLUMN => Some(self.game_id.to_string()),
            PERIOD_COLUMN => self.period.map(|p| p.to_string()),
            GAME_CLOCK_COLUMN => self.game_clock.map(|c| c.to_string()),
            TEAM_ID_COLUMN => self.team_id.map(|t| t.to_string()),
            PLAYER_ID_COLUMN => self.player_id.map(|p| p.to_string()),
            _ => None,
        }
    }
}

/// An ordered shot log with its source header.
///
/// Every shot carries exactly one raw cell per header column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShotTable {
    header: Vec<String>,
    shots: Vec<ShotRecord>,
}

impl ShotTable {
    /// Create a table from a header and shots in source order.
    ///
    /// Each shot's `columns` is fitted to the header: extra cells are
    /// dropped and missing ones are filled from the shot's fields.
    #[must_use]
    pub fn new(header: Vec<String>, mut shots: Vec<ShotRecord>) -> Self {
        for shot in &mut shots {
            shot.fit_columns(&header);
        }
        Self { header, shots }
    }

    /// Return the source column names.
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Return the shots in source order.
    #[must_use]
    pub fn shots(&self) -> &[ShotRecord] {
        &self.shots
    }

    /// Return the number of shots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shots.len()
    }

    /// Return true if the table has no shots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shots.is_empty()
    }

    /// Return a new table holding only the shots of `game_id`, in source order.
    #[must_use]
    pub fn for_game(&self, game_id: GameId) -> ShotTable {
        ShotTable {
            header: self.header.clone(),
            shots: self
                .shots
                .iter()
                .filter(|s| s.game_id == game_id)
                .cloned()
                .collect(),
        }
    }
}
