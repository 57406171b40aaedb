//! HTML plots of trial summaries.

use anyhow::{Context, Result};
use plotly::common::{DashType, Line, Mode, Title};
use plotly::layout::{Axis, BarMode};
use plotly::{Bar, Layout, Plot, Scatter};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analyzers::aggregate::{category_shares, relative_stdev, totals_normed_to_control};
use crate::analyzers::types::TrialSummary;
use crate::config::TrialConfig;
use crate::query::{Flag, Region};

fn region_colour(region: Region) -> &'static str {
    match region {
        Region::Sh => "purple",
        Region::Nh => "blue",
        Region::Tr => "green",
        Region::Aus => "red",
        Region::Eur => "gold",
        Region::Global => "black",
    }
}

fn layout(title: &str, x_label: &str, y_label: &str) -> Layout {
    Layout::new()
        .title(Title::with_text(title))
        .x_axis(Axis::new().title(Title::with_text(x_label)))
        .y_axis(Axis::new().title(Title::with_text(y_label)))
}

fn save(plot: &Plot, path: PathBuf) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, plot.to_html()).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// Files processed per cycle for every suite.
pub fn availability_plot(summary: &TrialSummary, config: &TrialConfig) -> Plot {
    let dates: Vec<String> = summary
        .cycles
        .iter()
        .map(|c| c.format("%Y-%m-%d %H:%M").to_string())
        .collect();

    let mut plot = Plot::new();
    for suite in &summary.suites {
        let colour = config
            .suite(&suite.suite_id)
            .map(|s| s.colour.clone())
            .unwrap_or_else(|| "grey".to_string());
        let trace = Scatter::new(dates.clone(), suite.files_processed.clone())
            .name(format!("{} ({})", suite.suite_id, suite.cutoff_hours).as_str())
            .mode(Mode::Lines)
            .line(Line::new().color(colour));
        plot.add_trace(trace);
    }
    plot.set_layout(layout("ODB2 files processed per cycle", "date [YYYY-MM-DD]", "Frequency"));
    plot
}

/// Region totals normalised to the control suite, with dashed ±2σ bounds.
pub fn normed_total_plot(summary: &TrialSummary, flag: Flag) -> Plot {
    let hours = summary.update_hours();
    let mut plot = Plot::new();

    for region in Region::ALL {
        let total = totals_normed_to_control(summary, flag, region);
        let spread = relative_stdev(summary, flag, region);
        let band = |sign: f64| -> Vec<Option<f64>> {
            total
                .iter()
                .zip(&spread)
                .map(|(t, s)| Some(t.as_ref()? + sign * 2.0 * s.as_ref()?))
                .collect()
        };

        let colour = region_colour(region);
        plot.add_trace(
            Scatter::new(hours.clone(), total.clone())
                .name(region.as_str())
                .mode(Mode::LinesMarkers)
                .line(Line::new().color(colour)),
        );
        for (sign, label) in [(1.0, "+2σ"), (-1.0, "-2σ")] {
            plot.add_trace(
                Scatter::new(hours.clone(), band(sign))
                    .name(format!("{} {}", region, label).as_str())
                    .mode(Mode::Lines)
                    .show_legend(false)
                    .line(Line::new().color(colour).dash(DashType::Dash)),
            );
        }
    }

    plot.set_layout(layout(
        &format!("total mean number of obs (normed to control): {flag}"),
        "update time [hours]",
        "number of obs",
    ));
    plot
}

/// Turns per-column category shares into one series per category.
fn by_category(columns: &[Vec<(String, Option<f64>)>]) -> Vec<(String, Vec<Option<f64>>)> {
    let names: Vec<String> = columns
        .iter()
        .find(|c| !c.is_empty())
        .map(|c| c.iter().map(|(name, _)| name.clone()).collect())
        .unwrap_or_default();

    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let values = columns
                .iter()
                .map(|c| c.get(i).and_then(|(_, v)| *v))
                .collect();
            (name, values)
        })
        .collect()
}

fn suite_shares(summary: &TrialSummary, flag: Flag, region: Region) -> Vec<Vec<(String, Option<f64>)>> {
    summary
        .suites
        .iter()
        .map(|s| category_shares(s, flag, region))
        .collect()
}

/// Category shares of each suite's total against update time, as stacked areas.
pub fn category_area_plot(summary: &TrialSummary, flag: Flag, region: Region) -> Plot {
    let hours = summary.update_hours();
    let mut plot = Plot::new();

    for (name, values) in by_category(&suite_shares(summary, flag, region)) {
        plot.add_trace(
            Scatter::new(hours.clone(), values)
                .name(name.as_str())
                .mode(Mode::Lines)
                .stack_group("categories"),
        );
    }

    plot.set_layout(layout(
        &format!("total mean number of obs by type (normed to suite): {flag}; {region}"),
        "update time [hours]",
        "number of obs",
    ));
    plot
}

/// Category shares of each suite's total for one region, stacked.
pub fn category_bar_plot(summary: &TrialSummary, flag: Flag, region: Region) -> Plot {
    let hours: Vec<String> = summary.update_hours().iter().map(|h| h.to_string()).collect();
    let mut plot = Plot::new();

    for (name, values) in by_category(&suite_shares(summary, flag, region)) {
        plot.add_trace(Bar::new(hours.clone(), values).name(name.as_str()));
    }

    plot.set_layout(
        layout(
            &format!("total mean number of obs by type (normed to suite): {flag}; {region}"),
            "update time [hours]",
            "number of obs",
        )
        .bar_mode(BarMode::Stack),
    );
    plot
}

/// Category shares of the control suite in every region, stacked.
pub fn control_regions_plot(summary: &TrialSummary, flag: Flag) -> Plot {
    let mut plot = Plot::new();
    let regions: Vec<String> = Region::ALL.iter().map(|r| r.to_string()).collect();

    if let Some(control) = summary.control() {
        let per_region: Vec<Vec<(String, Option<f64>)>> = Region::ALL
            .iter()
            .map(|r| category_shares(control, flag, *r))
            .collect();

        for (name, values) in by_category(&per_region) {
            plot.add_trace(Bar::new(regions.clone(), values).name(name.as_str()));
        }
    }

    plot.set_layout(
        layout(
            &format!("total mean number of obs by type: {flag}"),
            "Region",
            "proportion of total mean observations",
        )
        .bar_mode(BarMode::Stack),
    );
    plot
}

/// Writes every plot under `dir` and returns the paths written.
pub fn write_plots(summary: &TrialSummary, config: &TrialConfig, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = vec![save(
        &availability_plot(summary, config),
        dir.join("missing_odb2_files.html"),
    )?];

    for flag in Flag::ALL {
        written.push(save(
            &normed_total_plot(summary, flag),
            dir.join("total_mean_obs_normed").join(format!("{flag}.html")),
        )?);

        for region in Region::ALL {
            written.push(save(
                &category_area_plot(summary, flag, region),
                dir.join("total_cat_mean_normed_suite_id")
                    .join(region.as_str())
                    .join(format!("total_by_cat_{flag}.html")),
            )?);
            written.push(save(
                &category_bar_plot(summary, flag, region),
                dir.join("total_cat_mean_bar")
                    .join(region.as_str())
                    .join(format!("total_by_cat_{flag}.html")),
            )?);
        }

        written.push(save(
            &control_regions_plot(summary, flag),
            dir.join(format!("proportion_obs_cats_{}", summary.control_suite))
                .join(format!("total_by_region_{flag}.html")),
        )?);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::{RegionSummary, SuiteSummary};
    use std::collections::BTreeMap;

    fn suite(id: &str, hours: f64, total: f64) -> SuiteSummary {
        let mut regions = BTreeMap::new();
        regions.insert(
            Region::Nh,
            RegionSummary {
                total,
                stdev: Some(total / 10.0),
                category_totals: vec![("sonde".to_string(), total / 4.0), ("surface".to_string(), total * 0.75)],
            },
        );
        let mut by_flag = BTreeMap::new();
        by_flag.insert(Flag::Active, regions);

        SuiteSummary {
            suite_id: id.to_string(),
            cutoff_hours: hours,
            regions: by_flag,
            files_processed: vec![Some(20), None],
            ..Default::default()
        }
    }

    fn summary() -> TrialSummary {
        TrialSummary {
            cycles: vec![],
            control_suite: "u-ctrl".to_string(),
            suites: vec![suite("u-short", 3.0, 80.0), suite("u-ctrl", 6.25, 100.0)],
        }
    }

    #[test]
    fn test_write_plots_layout() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_plots(&summary(), &TrialConfig::default(), dir.path()).unwrap();

        let per_flag = 1 + 2 * Region::ALL.len() + 1;
        assert_eq!(written.len(), 1 + Flag::ALL.len() * per_flag);
        assert!(dir.path().join("missing_odb2_files.html").exists());
        assert!(dir.path().join("total_mean_obs_normed").join("active.html").exists());
        assert!(
            dir.path()
                .join("total_cat_mean_bar")
                .join("NH")
                .join("total_by_cat_thinned.html")
                .exists()
        );
        assert!(
            dir.path()
                .join("total_cat_mean_normed_suite_id")
                .join("GLOBAL")
                .join("total_by_cat_active.html")
                .exists()
        );
        assert!(
            dir.path()
                .join("proportion_obs_cats_u-ctrl")
                .join("total_by_region_rejected.html")
                .exists()
        );
    }

    #[test]
    fn test_normed_total_plot_title_names_flag() {
        let html = normed_total_plot(&summary(), Flag::Active).to_html();
        assert!(html.contains("normed to control): active"));
    }

    #[test]
    fn test_by_category_pivots_columns() {
        let columns = vec![
            vec![("sonde".to_string(), Some(0.25)), ("surface".to_string(), Some(0.75))],
            vec![],
            vec![("sonde".to_string(), Some(0.5)), ("surface".to_string(), None)],
        ];
        let series = by_category(&columns);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0], ("sonde".to_string(), vec![Some(0.25), None, Some(0.5)]));
        assert_eq!(series[1], ("surface".to_string(), vec![Some(0.75), None, None]));
    }

    #[test]
    fn test_category_area_plot_is_stacked() {
        let html = category_area_plot(&summary(), Flag::Active, Region::Nh).to_html();
        assert!(html.contains("stackgroup"));
        assert!(html.contains("surface"));
    }
}
