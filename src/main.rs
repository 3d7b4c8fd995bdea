use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use releasepoint_align::{
    AlignConfig, AlignmentOutput, AlignmentPipeline, DEFAULT_FPS, DEFAULT_MAX_CENTER_DIFF, DEFAULT_MAX_FALLBACK_DIFF,
    DEFAULT_MAX_TIME_DIFF, DEFAULT_SMOOTH_WINDOW, DEFAULT_SPAN_PAD, DEFAULT_WINDOW_SECONDS, DropEmptyEvents,
    EventCleaner, EventIndex, PassthroughCleaner, ReleaseSnapshot,
};
use releasepoint_io::{ResultWriter, RunName, ShotReader, TrackingReader};

#[derive(Parser)]
#[command(name = "releasepoint")]
#[command(about = "Align basketball shot logs with player-tracking events")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Matching tolerances and feature-window parameters.
#[derive(Args, Debug, Clone)]
struct ToleranceArgs {
    /// Seconds added on both sides of an event's clock span
    #[arg(long, default_value_t = DEFAULT_SPAN_PAD)]
    span_pad: f64,

    /// Largest accepted center distance for a shot inside a padded span
    #[arg(long, default_value_t = DEFAULT_MAX_CENTER_DIFF)]
    max_center_diff: f64,

    /// Largest accepted center distance for the nearest-event fallback
    #[arg(long, default_value_t = DEFAULT_MAX_FALLBACK_DIFF)]
    max_fallback_diff: f64,

    /// Largest accepted clock distance between a shot and its release frame
    #[arg(long, default_value_t = DEFAULT_MAX_TIME_DIFF)]
    max_time_diff: f64,

    /// Release-frame selection mode: "closest"
    #[arg(long = "match", default_value = "closest")]
    match_mode: String,

    /// Tracking frame rate
    #[arg(long, default_value_t = DEFAULT_FPS)]
    fps: u32,

    /// Pre-release feature window in seconds
    #[arg(long, default_value_t = DEFAULT_WINDOW_SECONDS)]
    window_seconds: f64,

    /// Smoothing window in frames
    #[arg(long, default_value_t = DEFAULT_SMOOTH_WINDOW)]
    smooth_window: usize,
}

impl ToleranceArgs {
    fn to_config(&self) -> Result<AlignConfig> {
        let config = AlignConfig::new()
            .with_span_pad(self.span_pad)
            .with_max_center_diff(self.max_center_diff)
            .with_max_fallback_diff(self.max_fallback_diff)
            .with_max_time_diff(self.max_time_diff)
            .with_fps(self.fps)
            .with_window_seconds(self.window_seconds)
            .with_smooth_window(self.smooth_window)
            .with_match_mode(&self.match_mode)
            .context("invalid match mode")?;
        config.validate().context("invalid alignment configuration")?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Build the per-event game-clock index for a tracking file
    Index {
        /// Path to the tracking JSON file
        #[arg(long)]
        tracking: PathBuf,

        /// Run name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        run: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Match each shot to its tracking event and release frame
    Align {
        /// Path to the tracking JSON file
        #[arg(long)]
        tracking: PathBuf,

        /// Path to the shot-log CSV file
        #[arg(long)]
        shots: PathBuf,

        /// Run name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        run: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Drop tracking events without frames before indexing
        #[arg(long, default_value_t = false)]
        drop_empty: bool,

        #[command(flatten)]
        tolerance: ToleranceArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct IndexOutput {
    run: String,
    n_events: usize,
    n_indexed: usize,
    event_index: PathBuf,
}

#[derive(Serialize)]
struct AlignOutput {
    run: String,
    game_id: u64,
    n_shots: usize,
    n_matched: usize,
    n_events: usize,
    n_indexed: usize,
    reasons: BTreeMap<&'static str, usize>,
    release_reasons: BTreeMap<&'static str, usize>,
    shots: PathBuf,
    debug: PathBuf,
}

fn run_align<C: EventCleaner>(
    cleaner: C,
    config: AlignConfig,
    tracking: &Path,
    shots: &Path,
) -> Result<AlignmentOutput> {
    let events = TrackingReader::new(tracking)
        .read()
        .context("failed to read tracking events")?;
    let shot_table = ShotReader::new(shots).read().context("failed to read shot log")?;
    info!(n_events = events.len(), n_shots = shot_table.len(), "inputs loaded");

    let pipeline = AlignmentPipeline::new(config, cleaner, ReleaseSnapshot)
        .context("invalid alignment configuration")?;
    pipeline.align(events, &shot_table).context("alignment failed")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Index {
            tracking,
            run,
            output_dir,
        } => {
            let run_name = RunName::new(run.clone()).context("invalid run name")?;
            let events = TrackingReader::new(&tracking)
                .read()
                .context("failed to read tracking events")?;
            let index = EventIndex::build(&events);

            let writer = ResultWriter::new(&output_dir, run_name).context("failed to create output directory")?;
            let event_index = writer
                .write_event_index(&index)
                .context("failed to write event index")?;

            let output = IndexOutput {
                run,
                n_events: events.len(),
                n_indexed: index.len(),
                event_index,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Align {
            tracking,
            shots,
            run,
            output_dir,
            drop_empty,
            tolerance,
        } => {
            let run_name = RunName::new(run.clone()).context("invalid run name")?;
            let config = tolerance.to_config()?;

            let result = if drop_empty {
                run_align(DropEmptyEvents, config, &tracking, &shots)?
            } else {
                run_align(PassthroughCleaner, config, &tracking, &shots)?
            };

            let writer = ResultWriter::new(&output_dir, run_name).context("failed to create output directory")?;
            let shots_path = writer.write_shots(&result.shots).context("failed to write shots")?;
            let debug_path = writer
                .write_debug(&result.debug)
                .context("failed to write alignment debug table")?;
            writer.write_summary(&result).context("failed to write summary")?;

            let output = AlignOutput {
                run,
                game_id: result.game_id.value(),
                n_shots: result.debug.len(),
                n_matched: result.n_matched(),
                n_events: result.events.len(),
                n_indexed: result.index.len(),
                reasons: result.reason_counts(),
                release_reasons: result.release_reason_counts(),
                shots: shots_path,
                debug: debug_path,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
