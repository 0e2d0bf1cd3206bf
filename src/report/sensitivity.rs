//! Charts comparing scenario deltas across sensitivity runs.
//!
//! Each sensitivity run is a results folder laid out like `results_folder`,
//! holding its own base run and scenario runs. Deltas are taken inside each
//! sensitivity run and drawn side by side, one bar group per run.

use super::{inputs, ChartContext, ReportError};
use crate::charts::{resolve_color, BarGroup, ColorMap, Figure, Panel, Series};
use crate::config::{SensitivityCharts, SensitivityRun};
use crate::data::{DeltaCalculator, Matrix, Observation, ResultsLoader};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensitivityChart {
    EmissionsDif,
    CostsDif,
    GenSharesDif,
    TransmissionCapacity,
    GeoSensitivity,
    MultiPlotSensitivities,
}

impl SensitivityChart {
    pub const ALL: [SensitivityChart; 6] = [
        SensitivityChart::EmissionsDif,
        SensitivityChart::CostsDif,
        SensitivityChart::GenSharesDif,
        SensitivityChart::TransmissionCapacity,
        SensitivityChart::GeoSensitivity,
        SensitivityChart::MultiPlotSensitivities,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SensitivityChart::EmissionsDif => "emissions_dif",
            SensitivityChart::CostsDif => "costs_dif",
            SensitivityChart::GenSharesDif => "gen_shares_dif",
            SensitivityChart::TransmissionCapacity => "transmission_capacity",
            SensitivityChart::GeoSensitivity => "geo_sensitivity",
            SensitivityChart::MultiPlotSensitivities => "multi_plot_sensitivities",
        }
    }

    pub fn enabled(self, toggles: &SensitivityCharts) -> bool {
        match self {
            SensitivityChart::EmissionsDif => toggles.emissions_dif,
            SensitivityChart::CostsDif => toggles.costs_dif,
            SensitivityChart::GenSharesDif => toggles.gen_shares_dif,
            SensitivityChart::TransmissionCapacity => toggles.transmission_capacity,
            SensitivityChart::GeoSensitivity => toggles.geo_sensitivity,
            SensitivityChart::MultiPlotSensitivities => toggles.multi_plot_sensitivities,
        }
    }

    pub fn build(self, ctx: &ChartContext) -> Result<Vec<PathBuf>, ReportError> {
        let runs = Sensitivities { ctx };

        let (figure, file) = match self {
            SensitivityChart::EmissionsDif => {
                let table = runs.horizon_table(emissions)?;
                (runs.grouped("Emissions Delta", "Mt CO2", &table), "emissions_dif")
            }
            SensitivityChart::CostsDif => {
                let table = runs.horizon_table(inputs::scoped_costs)?;
                (runs.grouped("System Costs Delta", "Billion $", &table), "costs_dif")
            }
            SensitivityChart::GenSharesDif => (runs.shares()?, "gen_shares_dif"),
            SensitivityChart::TransmissionCapacity => {
                let per_run = runs.per_run(|name, _, scenario| {
                    let techs = ctx
                        .config
                        .scenarios
                        .get(name)
                        .map(Vec::as_slice)
                        .unwrap_or_default();
                    Ok(inputs::transmission(scenario, techs)?.built)
                })?;
                let table = runs.table(&per_run);
                (runs.grouped("Transmission Capacity Built", "GW", &table), "transmission_capacity")
            }
            SensitivityChart::GeoSensitivity => {
                let table = runs.with_primary(emissions)?;
                (
                    runs.grouped("Emissions Delta by Model Setup", "Mt CO2", &table),
                    "geo_sensitivity",
                )
            }
            SensitivityChart::MultiPlotSensitivities => (runs.multi_plot()?, "multi_plot_sensitivities"),
        };

        if figure.panels.iter().all(|p| p.categories.is_empty()) {
            return Ok(Vec::new());
        }
        let path = ctx.save(&figure, &ctx.layout.sensitivities_dir(), file)?;
        Ok(vec![path])
    }
}

fn emissions(loader: &ResultsLoader, _: Option<&[String]>) -> Result<Vec<Observation>, ReportError> {
    inputs::emissions(loader)
}

/// Figure width for `scenarios` bar groups.
fn width(scenarios: usize) -> u32 {
    (200 + 120 * scenarios as u32).max(1000)
}

type PerRun<T> = Vec<(String, Vec<(String, T)>)>;

struct Sensitivities<'c, 'a> {
    ctx: &'c ChartContext<'a>,
}

impl Sensitivities<'_, '_> {
    fn runs(&self) -> &[SensitivityRun] {
        &self.ctx.config.sensitivities.runs
    }

    /// Base loader and the scenario loaders present below `root`.
    fn loaders(&self, label: &str, root: &Path) -> (ResultsLoader, Vec<(String, ResultsLoader)>) {
        let config = self.ctx.config;
        let loader = |name: &str| ResultsLoader::new(format!("{label}/{name}"), root.join(name));
        let scenarios = config
            .scenarios
            .keys()
            .filter_map(|name| {
                let scenario = loader(name);
                if scenario.paths().root().is_dir() {
                    Some((name.clone(), scenario))
                } else {
                    tracing::warn!(run = %label, scenario = %name, "scenario missing from sensitivity run");
                    None
                }
            })
            .collect();
        (loader(&config.base), scenarios)
    }

    /// `f(scenario, base, scenario loader)` for every scenario of every
    /// `(label, results folder)` column.
    fn collect<'r, T, F>(
        &self,
        columns: impl Iterator<Item = (&'r str, &'r Path)>,
        f: F,
    ) -> Result<PerRun<T>, ReportError>
    where
        T: Send,
        F: Fn(&str, &ResultsLoader, &ResultsLoader) -> Result<T, ReportError> + Sync,
    {
        columns
            .map(|(label, root)| {
                let (base, scenarios) = self.loaders(label, root);
                let values = scenarios
                    .par_iter()
                    .map(|(name, scenario)| Ok((name.clone(), f(name, &base, scenario)?)))
                    .collect::<Result<Vec<_>, ReportError>>()?;
                Ok((label.to_string(), values))
            })
            .collect()
    }

    fn per_run<T, F>(&self, f: F) -> Result<PerRun<T>, ReportError>
    where
        T: Send,
        F: Fn(&str, &ResultsLoader, &ResultsLoader) -> Result<T, ReportError> + Sync,
    {
        self.collect(
            self.runs()
                .iter()
                .map(|run| (run.name.as_str(), run.results_folder.as_path())),
            f,
        )
    }

    fn table(&self, per_run: &PerRun<f64>) -> Matrix {
        DeltaCalculator::sensitivity_table(
            per_run,
            self.ctx.config.sensitivity_reference(),
            self.ctx.config.axis_sort_delta,
        )
    }

    /// Horizon delta of one scenario, scoped like the multi-scenario charts.
    fn horizon_delta<F>(
        &self,
        read: &F,
        name: &str,
        base: &ResultsLoader,
        scenario: &ResultsLoader,
    ) -> Result<f64, ReportError>
    where
        F: Fn(&ResultsLoader, Option<&[String]>) -> Result<Vec<Observation>, ReportError>,
    {
        let countries = self.ctx.config.delta_countries(name);
        let countries = countries.as_deref();
        let base = self.ctx.scope(read(base, countries)?, countries);
        let scen = self.ctx.scope(read(scenario, countries)?, countries);
        Ok(DeltaCalculator::horizon_delta(&base, &scen))
    }

    /// Scenario x run table of horizon deltas.
    fn horizon_table<F>(&self, read: F) -> Result<Matrix, ReportError>
    where
        F: Fn(&ResultsLoader, Option<&[String]>) -> Result<Vec<Observation>, ReportError> + Sync,
    {
        let per_run = self.per_run(|name, base, scenario| self.horizon_delta(&read, name, base, scenario))?;
        Ok(self.table(&per_run))
    }

    /// Horizon deltas of the primary results (column named after the base
    /// run) followed by one column per sensitivity run. Sorting follows the
    /// primary column.
    fn with_primary<F>(&self, read: F) -> Result<Matrix, ReportError>
    where
        F: Fn(&ResultsLoader, Option<&[String]>) -> Result<Vec<Observation>, ReportError> + Sync,
    {
        let config = self.ctx.config;
        let primary = std::iter::once((config.base.as_str(), config.results_folder.as_path()));
        let runs = self
            .runs()
            .iter()
            .map(|run| (run.name.as_str(), run.results_folder.as_path()));
        let per_run = self.collect(primary.chain(runs), |name, base, scenario| {
            self.horizon_delta(&read, name, base, scenario)
        })?;
        Ok(DeltaCalculator::sensitivity_table(
            &per_run,
            Some(config.base.as_str()),
            config.axis_sort_delta,
        ))
    }

    fn run_colors(&self) -> ColorMap {
        let mut colors = ColorMap::default();
        for run in self.runs() {
            colors.insert(run.name.clone(), resolve_color(&run.color));
        }
        colors
    }

    /// One bar group per run column.
    fn grouped_panel(&self, title: &str, unit: &str, table: &Matrix) -> Panel {
        let colors = self.run_colors();
        let groups = table
            .columns
            .iter()
            .enumerate()
            .map(|(c, run)| BarGroup::single(Series::new(run.clone(), colors.get(run, c), table.column(c))))
            .collect();
        Panel::bars(title, unit, table.rows.clone(), groups)
    }

    fn grouped(&self, title: &str, unit: &str, table: &Matrix) -> Figure {
        Figure::new(title, vec![self.grouped_panel("", unit, table)])
            .with_legend_title("Sensitivity")
            .with_size(width(table.rows.len()), 600)
    }

    /// Diverging share deltas, one group per run in configured order.
    fn share_panel(&self, title: &str) -> Result<Panel, ReportError> {
        let per_run = self.per_run(|_, base, scenario| {
            Ok(inputs::headline_shares(scenario)?.delta(&inputs::headline_shares(base)?))
        })?;
        let sensitivity = DeltaCalculator::share_sensitivity(&per_run);
        let groups = sensitivity
            .runs
            .iter()
            .map(|(_, matrix)| BarGroup::diverging(matrix, &self.ctx.palette.gen_shares))
            .collect();
        Ok(Panel::bars(title, "%", sensitivity.scenarios, groups))
    }

    fn shares(&self) -> Result<Figure, ReportError> {
        let order: Vec<&str> = self.runs().iter().map(|run| run.name.as_str()).collect();
        let panel = self.share_panel("")?;
        let width = width(panel.categories.len());
        Ok(Figure::new(
            format!("Generation Shares Delta ({})", order.join(", ")),
            vec![panel],
        )
        .with_size(width, 600))
    }

    /// Emissions, costs and generation shares stacked in one column.
    fn multi_plot(&self) -> Result<Figure, ReportError> {
        let emissions = self.horizon_table(emissions)?;
        let costs = self.horizon_table(inputs::scoped_costs)?;
        let order: Vec<&str> = self.runs().iter().map(|run| run.name.as_str()).collect();
        let panels = vec![
            self.grouped_panel("Emissions", "Mt CO2", &emissions),
            self.grouped_panel("System Costs", "Billion $", &costs),
            self.share_panel(&format!("Generation Shares ({})", order.join(", ")))?,
        ];
        let scenarios = panels.iter().map(|p| p.categories.len()).max().unwrap_or(0);
        Ok(Figure::new("Sensitivity Comparison", panels)
            .with_grid(1, Vec::new())
            .with_legend_title("Sensitivity")
            .with_size(width(scenarios), 1500))
    }
}
