//! Charts comparing every scenario against the base run on one axis.

use super::panels::{self, TechDelta};
use super::{inputs, ChartContext, ReportError};
use crate::charts::{Figure, Panel, Series};
use crate::config::MultiScenarioCharts;
use crate::data::{DeltaCalculator, Observation, ResultsLoader, TransmissionCapacity};
use plotters::style::RGBColor;
use rayon::prelude::*;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiScenarioChart {
    EmissionsDif,
    CostsDif,
    GenSharesDif,
    CapacityDif,
    GenerationDif,
    TransmissionCapacity,
    MultiPlotScenComparison,
}

impl MultiScenarioChart {
    pub const ALL: [MultiScenarioChart; 7] = [
        MultiScenarioChart::EmissionsDif,
        MultiScenarioChart::CostsDif,
        MultiScenarioChart::GenSharesDif,
        MultiScenarioChart::CapacityDif,
        MultiScenarioChart::GenerationDif,
        MultiScenarioChart::TransmissionCapacity,
        MultiScenarioChart::MultiPlotScenComparison,
    ];

    pub fn key(self) -> &'static str {
        match self {
            MultiScenarioChart::EmissionsDif => "emissions_dif",
            MultiScenarioChart::CostsDif => "costs_dif",
            MultiScenarioChart::GenSharesDif => "gen_shares_dif",
            MultiScenarioChart::CapacityDif => "capacity_dif",
            MultiScenarioChart::GenerationDif => "generation_dif",
            MultiScenarioChart::TransmissionCapacity => "transmission_capacity",
            MultiScenarioChart::MultiPlotScenComparison => "multi_plot_scen_comparison",
        }
    }

    pub fn enabled(self, toggles: &MultiScenarioCharts) -> bool {
        match self {
            MultiScenarioChart::EmissionsDif => toggles.emissions_dif,
            MultiScenarioChart::CostsDif => toggles.costs_dif,
            MultiScenarioChart::GenSharesDif => toggles.gen_shares_dif,
            MultiScenarioChart::CapacityDif => toggles.capacity_dif,
            MultiScenarioChart::GenerationDif => toggles.generation_dif,
            MultiScenarioChart::TransmissionCapacity => toggles.transmission_capacity,
            MultiScenarioChart::MultiPlotScenComparison => toggles.multi_plot_scen_comparison,
        }
    }

    pub fn build(self, ctx: &ChartContext) -> Result<Vec<PathBuf>, ReportError> {
        let comparison = Comparison {
            ctx,
            base: ctx.base(),
        };
        let width = comparison.width();

        let (figure, file) = match self {
            MultiScenarioChart::EmissionsDif => (
                Figure::new("Emissions Delta", vec![comparison.emissions()?]),
                "emissions_dif",
            ),
            MultiScenarioChart::CostsDif => (
                Figure::new("System Costs Delta", vec![comparison.costs()?]),
                "costs_dif",
            ),
            MultiScenarioChart::GenSharesDif => (
                Figure::new("Generation Shares Delta", vec![comparison.shares()?]),
                "gen_shares_dif",
            ),
            MultiScenarioChart::CapacityDif => (
                Figure::new(
                    "Installed Capacity Delta",
                    vec![comparison.technology(inputs::capacity, "", "GW")?],
                )
                .with_legend_title("Technology"),
                "capacity_dif",
            ),
            MultiScenarioChart::GenerationDif => (
                Figure::new(
                    "Generation Delta",
                    vec![comparison.technology(inputs::generation, "", "TWh")?],
                )
                .with_legend_title("Technology"),
                "generation_dif",
            ),
            MultiScenarioChart::TransmissionCapacity => (
                Figure::new("Transmission Capacity", vec![comparison.transmission()?]),
                "transmission_capacity",
            ),
            MultiScenarioChart::MultiPlotScenComparison => {
                let panels = vec![
                    comparison.technology(inputs::capacity, "Installed Capacity", "GW")?,
                    comparison.technology(inputs::generation, "Generation", "TWh")?,
                    comparison.shares()?.with_title("Generation Shares"),
                    comparison.emissions()?.with_title("Emissions"),
                ];
                let figure = Figure::new("Scenario Comparison", panels)
                    .with_grid(2, Vec::new())
                    .with_size(width.max(1600), 1200);
                (figure, "multi_plot_scen_comparison")
            }
        };

        let figure = if figure.panels.len() == 1 {
            figure.with_size(width, 600)
        } else {
            figure
        };
        let path = ctx.save(&figure, &ctx.layout.comparison_dir(), file)?;
        Ok(vec![path])
    }
}

struct Comparison<'c, 'a> {
    ctx: &'c ChartContext<'a>,
    base: ResultsLoader,
}

impl Comparison<'_, '_> {
    /// Wider figures for many scenarios.
    fn width(&self) -> u32 {
        (200 + 90 * self.ctx.config.scenarios.len() as u32).max(1000)
    }

    /// `f(name, loader)` for every scenario, in parallel.
    fn per_scenario<T, F>(&self, f: F) -> Result<Vec<(String, T)>, ReportError>
    where
        T: Send,
        F: Fn(&str, &ResultsLoader) -> Result<T, ReportError> + Sync,
    {
        let names: Vec<&String> = self.ctx.config.scenarios.keys().collect();
        names
            .par_iter()
            .map(|name| Ok((name.to_string(), f(name, &self.ctx.loader(name))?)))
            .collect()
    }

    /// Horizon delta of a single-valued series per scenario, sorted for display.
    fn horizon_deltas<F>(&self, read: F) -> Result<Vec<(String, f64)>, ReportError>
    where
        F: Fn(&ResultsLoader, Option<&[String]>) -> Result<Vec<Observation>, ReportError> + Sync,
    {
        let values = self.per_scenario(|name, scenario| {
            let countries = self.ctx.config.delta_countries(name);
            let countries = countries.as_deref();
            let base = self.ctx.scope(read(&self.base, countries)?, countries);
            let scen = self.ctx.scope(read(scenario, countries)?, countries);
            Ok(DeltaCalculator::horizon_delta(&base, &scen))
        })?;
        Ok(DeltaCalculator::sort_scenarios(values, self.ctx.config.axis_sort_delta))
    }

    fn value_panel(
        title: &str,
        unit: &str,
        label: &str,
        color: RGBColor,
        values: Vec<(String, f64)>,
    ) -> Panel {
        let (names, values): (Vec<String>, Vec<f64>) = values.into_iter().unzip();
        panels::single(title, unit, names, Series::new(label, color, values))
    }

    fn emissions(&self) -> Result<Panel, ReportError> {
        let values = self.horizon_deltas(|loader, _| inputs::emissions(loader))?;
        Ok(Self::value_panel(
            "",
            "Mt CO2",
            "Emissions",
            self.ctx.palette.dual_emissions.get("bar", 0),
            values,
        ))
    }

    fn costs(&self) -> Result<Panel, ReportError> {
        let values = self.horizon_deltas(inputs::scoped_costs)?;
        Ok(Self::value_panel(
            "",
            "Billion $",
            "System Costs",
            self.ctx.palette.dual_costs.get("bar", 0),
            values,
        ))
    }

    fn shares(&self) -> Result<Panel, ReportError> {
        let base = inputs::headline_shares(&self.base)?;
        let deltas = self.per_scenario(|_, scenario| {
            Ok(inputs::headline_shares(scenario)?.delta(&base))
        })?;
        let matrix = DeltaCalculator::share_matrix(&deltas, self.ctx.config.axis_sort_delta);
        Ok(panels::diverging("", "%", &matrix, &self.ctx.palette.gen_shares))
    }

    /// Net horizon change per technology, one diverging bar per scenario.
    fn technology(
        &self,
        read: fn(&ResultsLoader) -> Result<Vec<Observation>, ReportError>,
        title: &str,
        unit: &str,
    ) -> Result<Panel, ReportError> {
        let base = read(&self.base)?;
        let deltas = self.per_scenario(|name, scenario| {
            let countries = self.ctx.config.delta_countries(name);
            let countries = countries.as_deref();
            let delta = TechDelta::new(
                &self.ctx.scope(base.clone(), countries),
                &self.ctx.scope(read(scenario)?, countries),
            );
            Ok(delta.horizon)
        })?;
        let matrix = DeltaCalculator::scenario_matrix(&deltas, self.ctx.config.axis_sort_delta);
        Ok(panels::diverging(title, unit, &matrix, &self.ctx.palette.technology))
    }

    /// Built capacity with the investment limit as a thin overlay bar.
    fn transmission(&self) -> Result<Panel, ReportError> {
        let capacities = self.per_scenario(|name, scenario| {
            let techs = self
                .ctx
                .config
                .scenarios
                .get(name)
                .map(Vec::as_slice)
                .unwrap_or_default();
            inputs::transmission(scenario, techs)
        })?;
        let capacities = sort_transmission(capacities, self.ctx.config.axis_sort_delta);

        let colors = &self.ctx.palette.transmission;
        let names: Vec<String> = capacities.iter().map(|(name, _)| name.clone()).collect();
        let built = capacities.iter().map(|(_, c)| c.built).collect();
        let max = capacities.iter().map(|(_, c)| c.max).collect();
        Ok(
            panels::single("", "GW", names, Series::new("Built", colors.get("new", 0), built))
                .with_overlay(Series::new("Max", colors.get("max", 1), max)),
        )
    }
}

/// Largest limit first when sorting by value, otherwise alphabetical.
fn sort_transmission(
    mut capacities: Vec<(String, TransmissionCapacity)>,
    by_value: bool,
) -> Vec<(String, TransmissionCapacity)> {
    if by_value {
        capacities.sort_by(|a, b| b.1.max.total_cmp(&a.1.max).then_with(|| a.0.cmp(&b.0)));
    } else {
        capacities.sort_by(|a, b| a.0.cmp(&b.0));
    }
    capacities
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capacity(name: &str, built: f64, max: f64) -> (String, TransmissionCapacity) {
        (name.to_string(), TransmissionCapacity { built, max })
    }

    #[test]
    fn transmission_sorts_by_limit_or_name() {
        let capacities = vec![
            capacity("ZMBXXZWEXX", 1.0, 2.0),
            capacity("BWAXXZWEXX", 0.5, 4.0),
            capacity("BWAXXZMBXX", 0.0, 3.0),
        ];
        let names = |v: Vec<(String, TransmissionCapacity)>| {
            v.into_iter().map(|(n, _)| n).collect::<Vec<_>>()
        };
        assert_eq!(
            names(sort_transmission(capacities.clone(), true)),
            vec!["BWAXXZWEXX", "BWAXXZMBXX", "ZMBXXZWEXX"]
        );
        assert_eq!(
            names(sort_transmission(capacities, false)),
            vec!["BWAXXZMBXX", "BWAXXZWEXX", "ZMBXXZWEXX"]
        );
    }

    #[test]
    fn value_panel_keeps_scenario_order() {
        let panel = Comparison::value_panel(
            "",
            "Mt CO2",
            "Emissions",
            RGBColor(0, 0, 128),
            vec![("B".to_string(), -2.0), ("A".to_string(), 1.0)],
        );
        assert_eq!(panel.categories, vec!["B", "A"]);
        assert_eq!(panel.y_range(), (-2.0 * 1.1, 1.0 * 1.1));
    }
}
