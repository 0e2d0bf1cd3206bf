//! Report Module
//! Chart catalogue, output folder layout and the run loop.
//!
//! Every chart is independent: it reads its inputs, builds a [`Figure`] and
//! writes one PNG per figure. A failing chart is logged and recorded in the
//! run summary; the remaining charts still run.

mod base_run;
mod inputs;
mod multi_scenario;
mod panels;
mod scenario;
mod sensitivity;

pub use base_run::BaseRunChart;
pub use multi_scenario::MultiScenarioChart;
pub use scenario::ScenarioChart;
pub use sensitivity::SensitivityChart;

use crate::charts::{Figure, Palette, RenderError, StaticChartRenderer};
use crate::config::Config;
use crate::data::{LoaderError, Observation, ProcessorError, ResultsLoader};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize summary: {0}")]
    Summary(#[from] serde_json::Error),
    #[error("Missing input: {0}")]
    MissingInput(String),
}

/// Top-level groups of the chart catalogue, matching `[charts.*]` in the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartGroup {
    BaseRun,
    ScenarioComparison,
    MultiScenario,
    Sensitivities,
}

impl ChartGroup {
    pub const ALL: [ChartGroup; 4] = [
        ChartGroup::BaseRun,
        ChartGroup::ScenarioComparison,
        ChartGroup::MultiScenario,
        ChartGroup::Sensitivities,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ChartGroup::BaseRun => "base_run",
            ChartGroup::ScenarioComparison => "scenario_comparison",
            ChartGroup::MultiScenario => "multi_scenario",
            ChartGroup::Sensitivities => "sensitivities",
        }
    }

    /// Config keys of every chart in the group.
    pub fn charts(self) -> Vec<&'static str> {
        match self {
            ChartGroup::BaseRun => BaseRunChart::ALL.iter().map(|c| c.key()).collect(),
            ChartGroup::ScenarioComparison => ScenarioChart::ALL.iter().map(|c| c.key()).collect(),
            ChartGroup::MultiScenario => MultiScenarioChart::ALL.iter().map(|c| c.key()).collect(),
            ChartGroup::Sensitivities => SensitivityChart::ALL.iter().map(|c| c.key()).collect(),
        }
    }
}

/// `<output_root>/<figures_folder>/{<run>/<country>, Comparison, Sensitivities}`
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(output_root: &Path, figures_folder: &str) -> Self {
        Self {
            root: output_root.join(figures_folder),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.output_root, &config.figures_folder)
    }

    pub fn run_dir(&self, run: &str) -> PathBuf {
        self.root.join(run)
    }

    pub fn country_dir(&self, run: &str, country: &str) -> PathBuf {
        self.run_dir(run).join(country)
    }

    pub fn comparison_dir(&self) -> PathBuf {
        self.root.join("Comparison")
    }

    pub fn sensitivities_dir(&self) -> PathBuf {
        self.root.join("Sensitivities")
    }

    pub fn summary_path(&self) -> PathBuf {
        self.root.join("summary.json")
    }

    /// Create the run and country folders up front.
    pub fn create(&self, runs: &[String], countries: &[String]) -> Result<(), ReportError> {
        fs::create_dir_all(&self.root)?;
        for run in runs {
            for country in countries {
                fs::create_dir_all(self.country_dir(run, country))?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartFailure {
    pub group: ChartGroup,
    pub chart: String,
    pub run: Option<String>,
    pub error: String,
}

/// Outcome of one report run, written to `summary.json`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub generated: Vec<PathBuf>,
    /// Charts that ran but had nothing to draw.
    pub skipped: Vec<String>,
    pub failures: Vec<ChartFailure>,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn write(&self, path: &Path) -> Result<(), ReportError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Everything a chart builder needs besides its own inputs.
pub struct ChartContext<'a> {
    pub config: &'a Config,
    pub palette: Palette,
    pub layout: OutputLayout,
    pub years: Vec<i32>,
}

impl<'a> ChartContext<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            palette: Palette::from_config(&config.colors),
            layout: OutputLayout::from_config(config),
            years: config.years(),
        }
    }

    /// Loader for a run below `results_folder`.
    pub fn loader(&self, run: &str) -> ResultsLoader {
        ResultsLoader::new(run, self.config.run_dir(run))
    }

    pub fn base(&self) -> ResultsLoader {
        self.loader(&self.config.base)
    }

    /// Keep horizon years and, when given, the listed countries.
    pub fn scope(&self, observations: Vec<Observation>, countries: Option<&[String]>) -> Vec<Observation> {
        let horizon = self.config.horizon();
        observations
            .into_iter()
            .filter(|o| o.year.map_or(true, |y| horizon.contains(&y)))
            .filter(|o| match countries {
                Some(list) => o.country().is_some_and(|c| list.iter().any(|k| k == c)),
                None => true,
            })
            .collect()
    }

    /// Render `figure` to `<dir>/<name>.png`.
    pub fn save(&self, figure: &Figure, dir: &Path, name: &str) -> Result<PathBuf, ReportError> {
        let path = dir.join(format!("{name}.png"));
        StaticChartRenderer::render_to_file(figure, &path)?;
        tracing::info!(path = %path.display(), "chart written");
        Ok(path)
    }

    /// Run `build` for each country in parallel; `None` means nothing to draw.
    pub fn per_country<F>(&self, countries: &[String], build: F) -> Result<Vec<PathBuf>, ReportError>
    where
        F: Fn(&str) -> Result<Option<PathBuf>, ReportError> + Sync,
    {
        let written: Vec<Option<PathBuf>> = countries
            .par_iter()
            .map(|country| build(country))
            .collect::<Result<_, _>>()?;
        Ok(written.into_iter().flatten().collect())
    }
}

/// Runs every enabled chart of a configuration.
pub struct Reporter<'a> {
    ctx: ChartContext<'a>,
}

impl<'a> Reporter<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            ctx: ChartContext::new(config),
        }
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.ctx.layout
    }

    pub fn run(&self) -> Result<RunSummary, ReportError> {
        let config = self.ctx.config;
        let toggles = &config.charts;

        let mut runs = vec![config.base.clone()];
        runs.extend(config.scenarios.keys().cloned());
        self.ctx.layout.create(&runs, &config.countries)?;

        let mut summary = RunSummary::default();

        for chart in BaseRunChart::ALL {
            if chart.enabled(&toggles.base_run) {
                self.execute(&mut summary, ChartGroup::BaseRun, chart.key(), None, || {
                    chart.build(&self.ctx)
                });
            }
        }

        for scenario in config.scenarios.keys() {
            for chart in ScenarioChart::ALL {
                if chart.enabled(&toggles.scenario_comparison) {
                    self.execute(
                        &mut summary,
                        ChartGroup::ScenarioComparison,
                        chart.key(),
                        Some(scenario),
                        || chart.build(&self.ctx, scenario),
                    );
                }
            }
        }

        let multi: Vec<MultiScenarioChart> = MultiScenarioChart::ALL
            .into_iter()
            .filter(|c| c.enabled(&toggles.multi_scenario))
            .collect();
        if !multi.is_empty() && config.scenarios.is_empty() {
            tracing::warn!("multi-scenario charts enabled but no scenarios configured");
        } else {
            for chart in multi {
                self.execute(&mut summary, ChartGroup::MultiScenario, chart.key(), None, || {
                    chart.build(&self.ctx)
                });
            }
        }

        let sensitivities: Vec<SensitivityChart> = SensitivityChart::ALL
            .into_iter()
            .filter(|c| c.enabled(&toggles.sensitivities))
            .collect();
        if !sensitivities.is_empty() && config.sensitivities.runs.is_empty() {
            tracing::warn!("sensitivity charts enabled but no sensitivity runs configured");
        } else {
            for chart in sensitivities {
                self.execute(&mut summary, ChartGroup::Sensitivities, chart.key(), None, || {
                    chart.build(&self.ctx)
                });
            }
        }

        summary.write(&self.ctx.layout.summary_path())?;
        tracing::info!(
            generated = summary.generated.len(),
            skipped = summary.skipped.len(),
            failed = summary.failed(),
            "report finished"
        );
        Ok(summary)
    }

    fn execute<F>(
        &self,
        summary: &mut RunSummary,
        group: ChartGroup,
        chart: &str,
        run: Option<&str>,
        build: F,
    ) where
        F: FnOnce() -> Result<Vec<PathBuf>, ReportError>,
    {
        let span = tracing::info_span!("chart", group = group.key(), chart, run = ?run);
        let _enter = span.enter();

        match build() {
            Ok(paths) if paths.is_empty() => {
                tracing::warn!("nothing to draw");
                let label = match run {
                    Some(run) => format!("{}/{chart}/{run}", group.key()),
                    None => format!("{}/{chart}", group.key()),
                };
                summary.skipped.push(label);
            }
            Ok(paths) => summary.generated.extend(paths),
            Err(err) => {
                tracing::error!(error = %err, "chart failed");
                summary.failures.push(ChartFailure {
                    group,
                    chart: chart.to_string(),
                    run: run.map(str::to_string),
                    error: err.to_string(),
                });
            }
        }
    }
}
