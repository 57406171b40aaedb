use std::collections::BTreeMap;

use crate::analyzers::table::CountTable;
use crate::analyzers::types::{RegionSummary, SuiteSummary, SummaryStats, TrialSummary};
use crate::analyzers::utility::{nan_iqr, nan_mean, nan_median, nan_std, nan_sum, ratio};
use crate::config::{CategoryConfig, TrialConfig};
use crate::query::{Flag, Region};

/// Sampling statistics of a series of per-cycle counts. Missing cycles are
/// left out of every statistic.
pub fn summarize_series(values: &[Option<f64>]) -> SummaryStats {
    SummaryStats {
        mean: nan_mean(values),
        median: nan_median(values),
        stdev: nan_std(values),
        iqr: nan_iqr(values),
        total: nan_sum(values),
        samples: values.iter().flatten().filter(|v| !v.is_nan()).count(),
    }
}

/// Combines the per-instrument means of one region into region and
/// category totals.
pub fn summarize_region(
    instruments: &BTreeMap<String, SummaryStats>,
    categories: &[CategoryConfig],
) -> RegionSummary {
    let means: Vec<Option<f64>> = instruments.values().map(|s| s.mean).collect();

    let category_totals = categories
        .iter()
        .map(|cat| {
            let cat_means: Vec<Option<f64>> = cat
                .instruments
                .iter()
                .map(|name| instruments.get(name).and_then(|s| s.mean))
                .collect();
            (cat.name.clone(), nan_sum(&cat_means))
        })
        .collect();

    RegionSummary {
        total: nan_sum(&means),
        stdev: nan_std(&means),
        category_totals,
    }
}

/// Aggregates the whole count table into per-suite summaries.
pub fn summarize_trial(table: &CountTable, config: &TrialConfig) -> TrialSummary {
    let suites = config
        .suites
        .iter()
        .map(|suite| {
            let mut instruments = BTreeMap::new();
            let mut regions = BTreeMap::new();

            for flag in Flag::ALL {
                let mut flag_instruments = BTreeMap::new();
                let mut flag_regions = BTreeMap::new();

                for region in Region::ALL {
                    let stats: BTreeMap<String, SummaryStats> = table
                        .instruments()
                        .iter()
                        .map(|name| {
                            let series = table.series(&suite.id, flag, region, name);
                            (name.clone(), summarize_series(&series))
                        })
                        .collect();

                    flag_regions.insert(region, summarize_region(&stats, &config.categories));
                    flag_instruments.insert(region, stats);
                }

                instruments.insert(flag, flag_instruments);
                regions.insert(flag, flag_regions);
            }

            SuiteSummary {
                suite_id: suite.id.clone(),
                cutoff_hours: suite.cutoff_hours,
                instruments,
                regions,
                files_processed: table
                    .meta_series(&suite.id)
                    .into_iter()
                    .map(|m| m.map(|m| m.files_processed))
                    .collect(),
            }
        })
        .collect();

    TrialSummary {
        cycles: table.cycles().to_vec(),
        control_suite: config.control_suite.clone(),
        suites,
    }
}

/// Each suite's region total relative to the control suite's, in suite order.
pub fn totals_normed_to_control(summary: &TrialSummary, flag: Flag, region: Region) -> Vec<Option<f64>> {
    let control = summary
        .control()
        .and_then(|c| c.region(flag, region))
        .map(|r| r.total);

    summary
        .suites
        .iter()
        .map(|s| ratio(s.region(flag, region).map(|r| r.total), control))
        .collect()
}

/// Each suite's spread of instrument means relative to its own total.
pub fn relative_stdev(summary: &TrialSummary, flag: Flag, region: Region) -> Vec<Option<f64>> {
    summary
        .suites
        .iter()
        .map(|s| {
            let r = s.region(flag, region);
            ratio(r.and_then(|r| r.stdev), r.map(|r| r.total))
        })
        .collect()
}

/// Share of a suite's region total taken by each category, in category order.
pub fn category_shares(suite: &SuiteSummary, flag: Flag, region: Region) -> Vec<(String, Option<f64>)> {
    let Some(r) = suite.region(flag, region) else {
        return Vec::new();
    };

    r.category_totals
        .iter()
        .map(|(name, total)| (name.clone(), ratio(Some(*total), Some(r.total))))
        .collect()
}
