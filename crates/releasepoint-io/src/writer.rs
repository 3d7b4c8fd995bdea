//! CSV and JSON writers for alignment outputs.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use releasepoint_align::{AlignmentOutput, EventIndex, FeatureValue, ShotAlignmentDebugRow, ShotFeatureTable};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::RunName;

/// Writes alignment results into an output directory.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{run}_shots.csv`, `{run}_alignment_debug.csv`,
/// `{run}_event_index.csv` and `{run}_summary.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    run: RunName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and run name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), run = %run))]
    pub fn new(output_dir: &Path, run: RunName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            run,
        })
    }

    /// Return the path an output with the given suffix is written to.
    #[must_use]
    pub fn path_for(&self, suffix: &str) -> PathBuf {
        self.output_dir.join(self.run.file_name(suffix))
    }

    /// Write the shots with their features to `{run}_shots.csv`.
    ///
    /// Columns are the source shot-log columns followed by every feature
    /// name present in any row, sorted, with `error` last. Cells a row does
    /// not carry are left empty.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::WriteFile`] | File cannot be created or flushed |
    /// | [`IoError::CsvWrite`] | A record cannot be written |
    #[instrument(skip_all)]
    pub fn write_shots(&self, table: &ShotFeatureTable) -> Result<PathBuf, IoError> {
        let path = self.path_for("shots.csv");
        let feature_names = table.feature_names();

        let mut wtr = self.csv_writer(&path)?;
        let header = table.header().iter().map(String::as_str).chain(feature_names.iter().map(String::as_str));
        wtr.write_record(header).map_err(|e| csv_write(&path, e))?;

        for row in table.rows() {
            let features = feature_names.iter().map(|name| {
                row.features
                    .get(name)
                    .map_or_else(String::new, FeatureValue::to_string)
            });
            let record: Vec<String> = row.shot.columns.iter().cloned().chain(features).collect();
            wtr.write_record(&record).map_err(|e| csv_write(&path, e))?;
        }
        flush(wtr, &path)?;

        info!(path = %path.display(), n_rows = table.len(), n_features = feature_names.len(), "shots written");
        Ok(path)
    }

    /// Write the per-shot audit table to `{run}_alignment_debug.csv`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::WriteFile`] | File cannot be created or flushed |
    /// | [`IoError::CsvWrite`] | A record cannot be serialized |
    #[instrument(skip_all)]
    pub fn write_debug(&self, rows: &[ShotAlignmentDebugRow]) -> Result<PathBuf, IoError> {
        let path = self.path_for("alignment_debug.csv");
        self.write_serialized(&path, rows)?;
        info!(path = %path.display(), n_rows = rows.len(), "alignment debug written");
        Ok(path)
    }

    /// Write the event clock index to `{run}_event_index.csv`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::WriteFile`] | File cannot be created or flushed |
    /// | [`IoError::CsvWrite`] | A record cannot be serialized |
    #[instrument(skip_all)]
    pub fn write_event_index(&self, index: &EventIndex) -> Result<PathBuf, IoError> {
        let path = self.path_for("event_index.csv");
        self.write_serialized(&path, index.rows())?;
        info!(path = %path.display(), n_rows = index.len(), "event index written");
        Ok(path)
    }

    /// Write reason counts for an alignment run to `{run}_summary.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all)]
    pub fn write_summary(&self, output: &AlignmentOutput) -> Result<PathBuf, IoError> {
        let path = self.path_for("summary.json");

        let artifact = SummaryArtifact {
            run: self.run.as_str(),
            game_id: output.game_id.value(),
            n_shots: output.debug.len(),
            n_matched: output.n_matched(),
            n_events: output.events.len(),
            n_indexed_events: output.index.len(),
            reasons: output.reason_counts(),
            release_reasons: output.release_reason_counts(),
        };

        let json = serde_json::to_string_pretty(&artifact).expect("serialization cannot fail");
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "summary written");
        Ok(path)
    }

    fn csv_writer(&self, path: &Path) -> Result<csv::Writer<fs::File>, IoError> {
        let file = fs::File::create(path).map_err(|e| IoError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(csv::Writer::from_writer(file))
    }

    fn write_serialized<T: Serialize>(&self, path: &Path, rows: &[T]) -> Result<(), IoError> {
        let mut wtr = self.csv_writer(path)?;
        for row in rows {
            wtr.serialize(row).map_err(|e| csv_write(path, e))?;
        }
        flush(wtr, path)
    }
}

fn csv_write(path: &Path, source: csv::Error) -> IoError {
    IoError::CsvWrite {
        path: path.to_path_buf(),
        source,
    }
}

fn flush(mut wtr: csv::Writer<fs::File>, path: &Path) -> Result<(), IoError> {
    wtr.flush().map_err(|e| IoError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })
}

// --- Shadow structs for serialization ---

#[derive(Serialize)]
struct SummaryArtifact<'a> {
    run: &'a str,
    game_id: u64,
    n_shots: usize,
    n_matched: usize,
    n_events: usize,
    n_indexed_events: usize,
    reasons: BTreeMap<&'static str, usize>,
    release_reasons: BTreeMap<&'static str, usize>,
}
