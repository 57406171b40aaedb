//! CLI entry point for the update cutoff trial tools.
//!
//! Provides subcommands for classifying observations against the
//! assimilation cutoff, collecting per-cycle observation counts from the
//! archive, and summarising a whole trial into tables and plots.

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use update_cutoff::{
    analyzers::analyzer::analyze,
    archive::{ArchiveStore, LocalArchive, MooseArchive, RunType, instruments},
    config::TrialConfig,
    cutoff::{classify, hours, minutes},
    observations::{DelaySummary, classify_records, load_observations},
    output::{append_record, print_json},
    query::OdbSql,
    stats::{Collector, StatsStore},
    timestamp::parse_cycle_label,
};

#[derive(Parser)]
#[command(name = "update_cutoff")]
#[command(about = "Tools for the update run cutoff trial", long_about = None)]
struct Cli {
    /// JSON trial config overriding the built-in trial
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Project directory, overriding $DATADIR and the config file
    #[arg(long, global = true)]
    project_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one observation against the cycle cutoff
    Classify {
        /// Observation time, e.g. 2019-11-14T21:00:00
        #[arg(long)]
        ob_time: NaiveDateTime,

        /// Receipt time; defaults to now (UTC)
        #[arg(long)]
        rcpt_time: Option<NaiveDateTime>,

        #[arg(long, default_value_t = 6)]
        cycle_hours: i64,

        #[arg(long, default_value_t = 376)]
        cutoff_minutes: i64,
    },
    /// Classify every observation of a MetDB CSV export and summarise delays
    Delay {
        #[arg(value_name = "CSV")]
        source: PathBuf,

        #[arg(long, default_value_t = 6)]
        cycle_hours: i64,

        #[arg(long, default_value_t = 376)]
        cutoff_minutes: i64,

        /// CSV file to append classified observations to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the archived ODB2 files of one suite's cycle
    ListFiles {
        #[arg(long)]
        suite: String,

        /// Cycle label, e.g. 20190615T0600Z
        #[arg(long)]
        cycle: String,

        #[arg(long)]
        run_type: Option<RunType>,

        /// Read from a local copy of the archive instead of mass storage
        #[arg(long)]
        local_archive: Option<PathBuf>,
    },
    /// Count observations in every suite and cycle of the trial
    Collect {
        /// Recollect cycles that already have a record
        #[arg(long, default_value_t = false)]
        overwrite: bool,

        #[arg(long)]
        local_archive: Option<PathBuf>,

        /// odb executable
        #[arg(long)]
        odb: Option<String>,
    },
    /// Aggregate collected counts into tables and plots
    Summarize,
}

fn init_logging() -> Result<WorkerGuard> {
    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/update_cutoff.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("update_cutoff.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(guard)
}

/// Built-in trial, then the config file, then $DATADIR, then `--project-dir`.
fn load_config(path: Option<&Path>, project_dir: Option<PathBuf>) -> Result<TrialConfig> {
    let mut config = match path {
        Some(path) => TrialConfig::load(path)?,
        None => {
            let config = TrialConfig::default();
            match std::env::var("DATADIR") {
                Ok(data_dir) => config.with_data_dir(Path::new(&data_dir)),
                Err(_) => {
                    warn!("DATADIR not set, using a project directory relative to the working directory");
                    config
                }
            }
        }
    };

    if let Some(dir) = project_dir {
        config.project_dir = dir;
    }

    config.validate().context("invalid trial config")?;
    Ok(config)
}

fn archive_for(config: &TrialConfig, local_archive: Option<PathBuf>) -> Box<dyn ArchiveStore> {
    match local_archive {
        Some(root) => Box::new(LocalArchive::new(root)),
        None => Box::new(MooseArchive::new(config.archive_root.clone())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_logging()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Classify {
            ob_time,
            rcpt_time,
            cycle_hours,
            cutoff_minutes,
        } => {
            let rcpt_time = rcpt_time.unwrap_or_else(|| Utc::now().naive_utc());
            let c = classify(ob_time, rcpt_time, hours(cycle_hours), minutes(cutoff_minutes))?;

            info!(
                ob_time = %ob_time,
                rcpt_time = %rcpt_time,
                window_reference = %c.window_reference,
                deadline = %c.deadline,
                admitted = c.admitted,
                "Observation classified"
            );
        }
        Commands::Delay {
            source,
            cycle_hours,
            cutoff_minutes,
            output,
        } => {
            let records = load_observations(&source)?;
            let (classified, skipped) =
                classify_records(&records, hours(cycle_hours), minutes(cutoff_minutes))?;

            if let Some(output) = output {
                for c in &classified {
                    append_record(&output, c)?;
                }
                info!(path = %output.display(), count = classified.len(), "Classified observations written");
            }

            let summary = DelaySummary::from_classified(&classified, skipped);
            print_json(&summary)?;
            info!("{}", summary.in_time_line());
        }
        Commands::ListFiles {
            suite,
            cycle,
            run_type,
            local_archive,
        } => {
            let config = load_config(cli.config.as_deref(), cli.project_dir)?;
            let cycle = parse_cycle_label(&cycle)?;
            let run_type = run_type.unwrap_or(config.run_type);

            let archive = archive_for(&config, local_archive);
            let locators = archive.list(&suite, cycle, run_type).await?;

            for locator in &locators {
                info!(instrument = %locator.instrument, location = %locator.location, "File");
            }
            info!(total = locators.len(), instruments = ?instruments(&locators), "File list fetched");
        }
        Commands::Collect {
            overwrite,
            local_archive,
            odb,
        } => {
            let config = load_config(cli.config.as_deref(), cli.project_dir)?;
            let archive = archive_for(&config, local_archive);
            let tool = OdbSql::new(odb.unwrap_or_else(|| config.odb_program.clone()));
            let store = StatsStore::new(config.stats_dir());

            let collector = Collector {
                archive: archive.as_ref(),
                tool: &tool,
                store: &store,
                run_type: config.run_type,
                scratch_dir: config.scratch_dir(),
                failed_log: config.failed_log(),
            };

            let summary = collector
                .collect_trial(&config.suite_ids(), &config.cycles(), overwrite)
                .await?;
            print_json(&summary)?;
        }
        Commands::Summarize => {
            let config = load_config(cli.config.as_deref(), cli.project_dir)?;
            let summary = analyze(&config)?;
            info!(
                suites = summary.suites.len(),
                cycles = summary.cycles.len(),
                project_dir = %config.project_dir.display(),
                "Trial summarised"
            );
        }
    }

    Ok(())
}
