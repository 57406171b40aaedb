use anyhow::Result;
use std::fs;
use tracing::{debug, info, warn};

use crate::analyzers::aggregate::summarize_trial;
use crate::analyzers::table::CountTable;
use crate::analyzers::types::TrialSummary;
use crate::config::TrialConfig;
use crate::output::{write_category_tables, write_json};
use crate::plot::write_plots;
use crate::stats::StatsStore;
use crate::timestamp::cycle_label;

/// Loads every stored cycle record of the trial into a [`CountTable`].
///
/// Missing or unreadable records leave their cells empty.
pub fn load_trial(store: &StatsStore, config: &TrialConfig) -> CountTable {
    let mut table = CountTable::new(config.suite_ids(), config.cycles(), config.instruments.clone());
    let mut loaded = 0usize;
    let mut missing = 0usize;

    for suite_id in config.suite_ids() {
        for cycle in config.cycles() {
            if !store.exists(&suite_id, cycle) {
                missing += 1;
                continue;
            }

            match store.load(&suite_id, cycle) {
                Ok(record) => {
                    let ignored = table.insert_record(&record);
                    if !ignored.is_empty() {
                        debug!(suite_id = %suite_id, cycle = %cycle_label(cycle), ?ignored, "Unconfigured instruments ignored");
                    }
                    loaded += 1;
                }
                Err(e) => {
                    warn!(suite_id = %suite_id, cycle = %cycle_label(cycle), error = %e, "Unreadable cycle record");
                    missing += 1;
                }
            }
        }
    }

    info!(loaded, missing, "Trial records loaded");
    table
}

/// Loads the trial, aggregates it and writes tables, plots and a JSON summary
/// under the project directory.
#[tracing::instrument(skip_all, fields(project_dir = %config.project_dir.display()))]
pub fn analyze(config: &TrialConfig) -> Result<TrialSummary> {
    let store = StatsStore::new(config.stats_dir());
    let table = load_trial(&store, config);
    let summary = summarize_trial(&table, config);

    let tables = write_category_tables(&summary, &config.categories, &config.tables_dir())?;
    info!(count = tables.len(), "Category tables written");

    let figures = config.figures_dir();
    fs::create_dir_all(&figures)?;
    let plots = write_plots(&summary, config, &figures)?;
    info!(count = plots.len(), "Plots written");

    write_json(&config.project_dir.join("data").join("trial_summary.json"), &summary)?;

    Ok(summary)
}
