use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs;
use std::io::Write;
use std::path::Path;

use update_cutoff::analyzers::analyzer::analyze;
use update_cutoff::archive::{LocalArchive, RunType};
use update_cutoff::config::{CategoryConfig, SuiteConfig, TrialConfig};
use update_cutoff::error::FileError;
use update_cutoff::query::{Flag, QueryTool, Region};
use update_cutoff::stats::{Collector, StatsStore};
use update_cutoff::timestamp::{cycle_label, parse_cycle_label};

/// Answers every count with 5, except for files of one broken instrument.
struct FakeOdb {
    broken: &'static str,
}

#[async_trait]
impl QueryTool for FakeOdb {
    async fn run(&self, _query: &str, file: &Path) -> Result<String, FileError> {
        assert!(file.exists(), "query run on a missing file");
        if file.file_stem().and_then(|s| s.to_str()) == Some(self.broken) {
            return Err(FileError::QueryFailed {
                path: file.to_path_buf(),
                status: "exit status: 1".to_string(),
                stderr: "corrupt odb".to_string(),
            });
        }
        Ok("count(*)\n5\n".to_string())
    }
}

fn write_gz(path: &Path, content: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content).unwrap();
    fs::write(path, encoder.finish().unwrap()).unwrap();
}

fn trial(project_dir: &Path) -> TrialConfig {
    TrialConfig {
        project_dir: project_dir.to_path_buf(),
        start: parse_cycle_label("20190615T0600Z").unwrap(),
        end: parse_cycle_label("20190615T1200Z").unwrap(),
        control_suite: "u-ctrl".to_string(),
        suites: vec![
            SuiteConfig {
                id: "u-short".to_string(),
                cutoff_hours: 3.0,
                colour: "green".to_string(),
            },
            SuiteConfig {
                id: "u-ctrl".to_string(),
                cutoff_hours: 6.25,
                colour: "black".to_string(),
            },
        ],
        instruments: vec!["surface".to_string(), "sonde".to_string(), "iasi".to_string()],
        categories: vec![
            CategoryConfig {
                name: "in_situ".to_string(),
                instruments: vec!["surface".to_string(), "sonde".to_string()],
            },
            CategoryConfig {
                name: "hyperspectral_IR".to_string(),
                instruments: vec!["iasi".to_string()],
            },
        ],
        ..Default::default()
    }
}

/// Archive where every cycle has surface and sonde files, and the short
/// suite additionally has an iasi file.
fn populate_archive(root: &Path, config: &TrialConfig) {
    for suite in config.suite_ids() {
        for cycle in config.cycles() {
            let mut names = vec!["surface", "sonde"];
            if suite == "u-short" {
                names.push("iasi");
            }
            for name in names {
                let file = format!("{}_glu_{}_odb2.gz", cycle_label(cycle), name);
                write_gz(&root.join(&suite).join(file), b"ODB2 payload");
            }
        }
    }
}

#[tokio::test]
async fn test_collect_then_summarize() {
    let workspace = tempfile::tempdir().unwrap();
    let archive_root = workspace.path().join("archive");
    let config = trial(&workspace.path().join("project"));
    config.validate().unwrap();
    populate_archive(&archive_root, &config);

    let archive = LocalArchive::new(&archive_root);
    let tool = FakeOdb { broken: "iasi" };
    let store = StatsStore::new(config.stats_dir());
    let collector = Collector {
        archive: &archive,
        tool: &tool,
        store: &store,
        run_type: RunType::Glu,
        scratch_dir: config.scratch_dir(),
        failed_log: config.failed_log(),
    };

    let summary = collector
        .collect_trial(&config.suite_ids(), &config.cycles(), false)
        .await
        .unwrap();
    assert_eq!(summary.cycles_written, 4);
    assert_eq!(summary.cycles_failed, 0);
    assert_eq!(summary.files_processed, 8);
    assert_eq!(summary.files_failed, 2);

    // The failing iasi file contributes nothing and is listed as failed
    let cycle = config.start;
    let short = store.load("u-short", cycle).unwrap();
    assert_eq!(short.meta.files_found, 3);
    assert_eq!(short.meta.files_processed, 2);
    assert_eq!(short.meta.failed_files.len(), 1);
    assert!(short.meta.failed_files[0].ends_with("_glu_iasi_odb2.gz"));
    assert_eq!(short.get(Flag::Active, Region::Global, "surface"), Some(5.0));
    assert_eq!(short.get(Flag::Active, Region::Global, "iasi"), None);

    let failed_log = fs::read_to_string(config.failed_log()).unwrap();
    assert_eq!(failed_log.lines().count(), 2);
    assert!(failed_log.lines().all(|l| l.ends_with("_glu_iasi_odb2.gz")));

    // Scratch files are cleaned up after every file
    assert_eq!(fs::read_dir(config.scratch_dir()).unwrap().count(), 0);

    // A second run leaves existing records alone
    let again = collector
        .collect_trial(&config.suite_ids(), &config.cycles(), false)
        .await
        .unwrap();
    assert_eq!(again.cycles_skipped, 4);
    assert_eq!(again.cycles_written, 0);

    let trial_summary = analyze(&config).unwrap();
    let ctrl = trial_summary.control().unwrap();
    let global = ctrl.region(Flag::Active, Region::Global).unwrap();
    assert_eq!(global.total, 10.0);
    assert_eq!(global.category_total("in_situ"), Some(10.0));
    assert_eq!(global.category_total("hyperspectral_IR"), Some(0.0));
    assert_eq!(ctrl.files_processed, vec![Some(2), Some(2)]);

    let table = config
        .tables_dir()
        .join("GLOBAL")
        .join("active_mean_total_obs.csv");
    let content = fs::read_to_string(table).unwrap();
    assert_eq!(content.lines().next(), Some(",3,6.25"));
    assert_eq!(content.lines().last(), Some("total,10,10"));

    assert!(config.figures_dir().join("missing_odb2_files.html").exists());
    assert!(config.project_dir.join("data").join("trial_summary.json").exists());
}

#[tokio::test]
async fn test_missing_cycle_is_abandoned_not_fatal() {
    let workspace = tempfile::tempdir().unwrap();
    let archive_root = workspace.path().join("archive");
    let config = trial(&workspace.path().join("project"));

    // Only the control suite has been retrieved
    let cycle = cycle_label(config.start);
    write_gz(
        &archive_root.join("u-ctrl").join(format!("{cycle}_glu_surface_odb2.gz")),
        b"ODB2 payload",
    );

    let archive = LocalArchive::new(&archive_root);
    let tool = FakeOdb { broken: "none" };
    let store = StatsStore::new(config.stats_dir());
    let collector = Collector {
        archive: &archive,
        tool: &tool,
        store: &store,
        run_type: RunType::Glu,
        scratch_dir: config.scratch_dir(),
        failed_log: config.failed_log(),
    };

    let summary = collector
        .collect_trial(&config.suite_ids(), &[config.start], false)
        .await
        .unwrap();
    assert_eq!(summary.cycles_written, 1);
    assert_eq!(summary.cycles_failed, 1);
    assert!(!store.exists("u-short", config.start));
    assert!(store.exists("u-ctrl", config.start));
}

#[tokio::test]
async fn test_empty_cycle_is_retried_on_next_run() {
    let workspace = tempfile::tempdir().unwrap();
    let archive_root = workspace.path().join("archive");
    let config = trial(&workspace.path().join("project"));
    let suite_ids = vec!["u-ctrl".to_string()];

    // Suite has started archiving but not reached this cycle yet
    fs::create_dir_all(archive_root.join("u-ctrl")).unwrap();

    let archive = LocalArchive::new(&archive_root);
    let tool = FakeOdb { broken: "none" };
    let store = StatsStore::new(config.stats_dir());
    let collector = Collector {
        archive: &archive,
        tool: &tool,
        store: &store,
        run_type: RunType::Glu,
        scratch_dir: config.scratch_dir(),
        failed_log: config.failed_log(),
    };

    let first = collector
        .collect_trial(&suite_ids, &[config.start], false)
        .await
        .unwrap();
    assert_eq!(first.cycles_written, 0);
    assert_eq!(first.cycles_failed, 1);
    assert!(!store.exists("u-ctrl", config.start));

    let cycle = cycle_label(config.start);
    write_gz(
        &archive_root.join("u-ctrl").join(format!("{cycle}_glu_surface_odb2.gz")),
        b"ODB2 payload",
    );

    let second = collector
        .collect_trial(&suite_ids, &[config.start], false)
        .await
        .unwrap();
    assert_eq!(second.cycles_skipped, 0);
    assert_eq!(second.cycles_written, 1);

    let record = store.load("u-ctrl", config.start).unwrap();
    assert_eq!(record.meta.files_found, 1);
    assert_eq!(record.get(Flag::Active, Region::Global, "surface"), Some(5.0));
}

