//! Charts of one scenario against the base run.

use super::panels::{self, TechDelta};
use super::{inputs, ChartContext, ReportError};
use crate::charts::{ColorMap, Figure, Panel, Series};
use crate::config::ScenarioCharts;
use crate::data::{DataProcessor, DeltaCalculator, Observation, ResultsLoader};
use std::collections::BTreeSet;
use std::path::PathBuf;

type Reader = fn(&ResultsLoader) -> Result<Vec<Observation>, ReportError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioChart {
    PwrCapBarDifGlobal,
    PwrGenBarDifGlobal,
    PwrCapBarDifCountry,
    PwrGenBarDifCountry,
    PwrCapBarDifNode,
    PwrGenBarDifNode,
    CostsDifGlobal,
    EmissionsDifGlobal,
    EmissionsDifCountry,
    PwrGenSharesDifGlobal,
    HeadlineMetrics,
}

impl ScenarioChart {
    pub const ALL: [ScenarioChart; 11] = [
        ScenarioChart::PwrCapBarDifGlobal,
        ScenarioChart::PwrGenBarDifGlobal,
        ScenarioChart::PwrCapBarDifCountry,
        ScenarioChart::PwrGenBarDifCountry,
        ScenarioChart::PwrCapBarDifNode,
        ScenarioChart::PwrGenBarDifNode,
        ScenarioChart::CostsDifGlobal,
        ScenarioChart::EmissionsDifGlobal,
        ScenarioChart::EmissionsDifCountry,
        ScenarioChart::PwrGenSharesDifGlobal,
        ScenarioChart::HeadlineMetrics,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ScenarioChart::PwrCapBarDifGlobal => "pwr_cap_bar_dif_global",
            ScenarioChart::PwrGenBarDifGlobal => "pwr_gen_bar_dif_global",
            ScenarioChart::PwrCapBarDifCountry => "pwr_cap_bar_dif_country",
            ScenarioChart::PwrGenBarDifCountry => "pwr_gen_bar_dif_country",
            ScenarioChart::PwrCapBarDifNode => "pwr_cap_bar_dif_node",
            ScenarioChart::PwrGenBarDifNode => "pwr_gen_bar_dif_node",
            ScenarioChart::CostsDifGlobal => "costs_dif_global",
            ScenarioChart::EmissionsDifGlobal => "emissions_dif_global",
            ScenarioChart::EmissionsDifCountry => "emissions_dif_country",
            ScenarioChart::PwrGenSharesDifGlobal => "pwr_gen_shares_dif_global",
            ScenarioChart::HeadlineMetrics => "headline_metrics",
        }
    }

    pub fn enabled(self, toggles: &ScenarioCharts) -> bool {
        match self {
            ScenarioChart::PwrCapBarDifGlobal => toggles.pwr_cap_bar_dif_global,
            ScenarioChart::PwrGenBarDifGlobal => toggles.pwr_gen_bar_dif_global,
            ScenarioChart::PwrCapBarDifCountry => toggles.pwr_cap_bar_dif_country,
            ScenarioChart::PwrGenBarDifCountry => toggles.pwr_gen_bar_dif_country,
            ScenarioChart::PwrCapBarDifNode => toggles.pwr_cap_bar_dif_node,
            ScenarioChart::PwrGenBarDifNode => toggles.pwr_gen_bar_dif_node,
            ScenarioChart::CostsDifGlobal => toggles.costs_dif_global,
            ScenarioChart::EmissionsDifGlobal => toggles.emissions_dif_global,
            ScenarioChart::EmissionsDifCountry => toggles.emissions_dif_country,
            ScenarioChart::PwrGenSharesDifGlobal => toggles.pwr_gen_shares_dif_global,
            ScenarioChart::HeadlineMetrics => toggles.headline_metrics,
        }
    }

    pub fn build(self, ctx: &ChartContext, scenario: &str) -> Result<Vec<PathBuf>, ReportError> {
        let run = ScenarioRun::new(ctx, scenario);

        match self {
            ScenarioChart::PwrCapBarDifGlobal => {
                let delta = run.tech_delta(inputs::capacity)?;
                if delta.is_empty() {
                    return Ok(Vec::new());
                }
                let pair = panels::tech_delta_pair("", "GW", &delta, &ctx.years, &ctx.palette.technology);
                run.save(
                    panels::pair_figure(format!("Installed Capacity Delta {scenario}"), pair),
                    "pwr_cap_bar_dif",
                )
            }
            ScenarioChart::PwrGenBarDifGlobal => {
                let delta = run.tech_delta(inputs::generation)?;
                if delta.is_empty() {
                    return Ok(Vec::new());
                }
                let pair = panels::tech_delta_pair("", "TWh", &delta, &ctx.years, &ctx.palette.technology);
                run.save(
                    panels::pair_figure(format!("Generation Delta {scenario}"), pair),
                    "pwr_gen_bar_dif",
                )
            }
            ScenarioChart::PwrCapBarDifCountry => run.country_grid(
                inputs::capacity,
                "GW",
                &format!("Installed Capacity Delta by Country {scenario}"),
                "pwr_cap_bar_dif_country",
            ),
            ScenarioChart::PwrGenBarDifCountry => run.country_grid(
                inputs::generation,
                "TWh",
                &format!("Generation Delta by Country {scenario}"),
                "pwr_gen_bar_dif_country",
            ),
            ScenarioChart::PwrCapBarDifNode => run.node_grids(
                inputs::node_capacity,
                "GW",
                "Installed Capacity",
                "pwr_cap_bar_dif_node",
            ),
            ScenarioChart::PwrGenBarDifNode => run.node_grids(
                inputs::node_generation,
                "TWh",
                "Generation",
                "pwr_gen_bar_dif_node",
            ),
            ScenarioChart::CostsDifGlobal => {
                let (base, scen) = run.costs()?;
                let pair = panels::value_delta_pair(
                    "",
                    "Billion $",
                    "System Costs",
                    ctx.palette.dual_costs.get("bar", 0),
                    DeltaCalculator::yearly_delta(&base, &scen, &ctx.years),
                    &ctx.years,
                );
                run.save(
                    panels::pair_figure(format!("System Costs Delta {scenario}"), pair),
                    "costs_dif",
                )
            }
            ScenarioChart::EmissionsDifGlobal => {
                let (base, scen) = run.scoped(inputs::emissions)?;
                let pair = panels::value_delta_pair(
                    "",
                    "Mt CO2",
                    "Emissions",
                    ctx.palette.dual_emissions.get("bar", 0),
                    DeltaCalculator::yearly_delta(&base, &scen, &ctx.years),
                    &ctx.years,
                );
                run.save(
                    panels::pair_figure(format!("Emissions Delta {scenario}"), pair),
                    "emissions_dif",
                )
            }
            ScenarioChart::EmissionsDifCountry => {
                let (base, scen) = run.scoped(inputs::emissions)?;
                let pairs = emission_pairs(&base, &scen, &ctx.years, &ctx.palette.countries);
                if pairs.is_empty() {
                    return Ok(Vec::new());
                }
                run.save(
                    panels::pair_grid(format!("Emissions Delta by Country {scenario}"), pairs),
                    "emissions_dif_country",
                )
            }
            ScenarioChart::PwrGenSharesDifGlobal => {
                let colors = &ctx.palette.gen_shares;
                let yearly = DeltaCalculator::share_deltas(
                    &inputs::shares(&run.base, None)?,
                    &inputs::shares(&run.scenario, None)?,
                    &ctx.years,
                );
                let horizon = inputs::headline_shares(&run.scenario)?
                    .delta(&inputs::headline_shares(&run.base)?);
                let figure = Figure::total_and_series(
                    format!("Generation Shares Delta {scenario}"),
                    Panel::total("%", &DeltaCalculator::diverging_share_totals(&horizon, "Total"), colors),
                    panels::diverging("", "%", &DeltaCalculator::diverging_shares(&yearly), colors),
                );
                run.save(figure, "pwr_gen_shares_dif")
            }
            ScenarioChart::HeadlineMetrics => run.save(run.headline_metrics()?, "headline_metrics"),
        }
    }
}

/// Base and scenario loaders plus the scenario's delta scope.
struct ScenarioRun<'c, 'a> {
    ctx: &'c ChartContext<'a>,
    name: &'c str,
    base: ResultsLoader,
    scenario: ResultsLoader,
    countries: Option<Vec<String>>,
}

impl<'c, 'a> ScenarioRun<'c, 'a> {
    fn new(ctx: &'c ChartContext<'a>, name: &'c str) -> Self {
        Self {
            ctx,
            name,
            base: ctx.base(),
            scenario: ctx.loader(name),
            countries: ctx.config.delta_countries(name),
        }
    }

    fn save(&self, figure: Figure, file: &str) -> Result<Vec<PathBuf>, ReportError> {
        let dir = self.ctx.layout.run_dir(self.name);
        Ok(vec![self.ctx.save(&figure, &dir, file)?])
    }

    /// Both runs, restricted to the horizon and the delta countries.
    fn scoped(&self, read: Reader) -> Result<(Vec<Observation>, Vec<Observation>), ReportError> {
        let countries = self.countries.as_deref();
        Ok((
            self.ctx.scope(read(&self.base)?, countries),
            self.ctx.scope(read(&self.scenario)?, countries),
        ))
    }

    fn tech_delta(&self, read: Reader) -> Result<TechDelta, ReportError> {
        let (base, scen) = self.scoped(read)?;
        let delta = TechDelta::new(&base, &scen);
        if delta.is_empty() {
            tracing::warn!(scenario = self.name, "no technology change against base");
        }
        Ok(delta)
    }

    fn costs(&self) -> Result<(Vec<Observation>, Vec<Observation>), ReportError> {
        let countries = self.countries.as_deref();
        Ok((
            self.ctx.scope(inputs::scoped_costs(&self.base, countries)?, None),
            self.ctx.scope(inputs::scoped_costs(&self.scenario, countries)?, None),
        ))
    }

    /// Countries drawn in per-country grids.
    fn grid_countries(&self) -> &[String] {
        self.countries.as_deref().unwrap_or(self.ctx.config.countries.as_slice())
    }

    fn country_grid(
        &self,
        read: Reader,
        unit: &str,
        title: &str,
        file: &str,
    ) -> Result<Vec<PathBuf>, ReportError> {
        let (base, scen) = self.scoped(read)?;
        let pairs: Vec<[Panel; 2]> = self
            .grid_countries()
            .iter()
            .filter_map(|country| {
                let delta = TechDelta::new(
                    &DataProcessor::filter_country(&base, country),
                    &DataProcessor::filter_country(&scen, country),
                );
                (!delta.yearly.is_empty()).then(|| {
                    panels::tech_delta_pair(
                        country,
                        unit,
                        &delta,
                        &self.ctx.years,
                        &self.ctx.palette.technology,
                    )
                })
            })
            .collect();

        if pairs.is_empty() {
            return Ok(Vec::new());
        }
        self.save(panels::pair_grid(title, pairs), file)
    }

    /// One node grid per country listed under `nodal_results` for this scenario,
    /// written to `<scenario>/<country>/<file>.png`.
    fn node_grids(
        &self,
        read: Reader,
        unit: &str,
        title: &str,
        file: &str,
    ) -> Result<Vec<PathBuf>, ReportError> {
        let Some(countries) = self.ctx.config.nodal_results.get(self.name) else {
            tracing::debug!(scenario = self.name, "no nodal results configured");
            return Ok(Vec::new());
        };
        let base = self.ctx.scope(read(&self.base)?, None);
        let scen = self.ctx.scope(read(&self.scenario)?, None);

        self.ctx.per_country(countries, |country| {
            let pairs = node_pairs(
                &DataProcessor::filter_country(&base, country),
                &DataProcessor::filter_country(&scen, country),
                unit,
                &self.ctx.years,
                &self.ctx.palette.technology,
            );
            if pairs.is_empty() {
                tracing::warn!(country, scenario = self.name, "no node-level change");
                return Ok(None);
            }
            let figure = panels::pair_grid(
                format!("{country} {title} Delta by Node {}", self.name),
                pairs,
            );
            self.ctx
                .save(&figure, &self.ctx.layout.country_dir(self.name, country), file)
                .map(Some)
        })
    }

    /// Capacity, generation, shares, emissions, costs and transmission in one grid.
    fn headline_metrics(&self) -> Result<Figure, ReportError> {
        let palette = &self.ctx.palette;
        let capacity = self.tech_delta(inputs::capacity)?;
        let generation = self.tech_delta(inputs::generation)?;
        let shares = inputs::headline_shares(&self.scenario)?
            .delta(&inputs::headline_shares(&self.base)?);
        let (base_em, scen_em) = self.scoped(inputs::emissions)?;
        let (base_costs, scen_costs) = self.costs()?;
        let techs = self
            .ctx
            .config
            .scenarios
            .get(self.name)
            .cloned()
            .unwrap_or_default();
        let transmission = inputs::transmission(&self.scenario, &techs)?;

        let total = || vec!["Total".to_string()];
        let panels = vec![
            Panel::total("GW", &capacity.totals(), &palette.technology).with_title("Capacity"),
            Panel::total("TWh", &generation.totals(), &palette.technology).with_title("Generation"),
            Panel::total(
                "%",
                &DeltaCalculator::diverging_share_totals(&shares, "Total"),
                &palette.gen_shares,
            )
            .with_title("Generation Shares"),
            panels::single(
                "Emissions",
                "Mt CO2",
                total(),
                Series::new(
                    "Emissions",
                    palette.dual_emissions.get("bar", 0),
                    vec![DeltaCalculator::horizon_delta(&base_em, &scen_em)],
                ),
            ),
            panels::single(
                "System Costs",
                "Billion $",
                total(),
                Series::new(
                    "System Costs",
                    palette.dual_costs.get("bar", 0),
                    vec![DeltaCalculator::horizon_delta(&base_costs, &scen_costs)],
                ),
            ),
            panels::single(
                "Transmission",
                "GW",
                total(),
                Series::new("Built", palette.transmission.get("new", 0), vec![transmission.built]),
            )
            .with_overlay(Series::new(
                "Max",
                palette.transmission.get("max", 1),
                vec![transmission.max],
            )),
        ];

        Ok(Figure::new(format!("Headline Metrics {}", self.name), panels)
            .with_grid(2, Vec::new())
            .with_size(1200, 1400))
    }
}

/// Total/series pairs of every node with a technology change.
fn node_pairs(
    base: &[Observation],
    scen: &[Observation],
    unit: &str,
    years: &[i32],
    colors: &ColorMap,
) -> Vec<[Panel; 2]> {
    let nodes: BTreeSet<&str> = base
        .iter()
        .chain(scen)
        .filter_map(|o| o.region.as_deref())
        .collect();
    let at = |obs: &[Observation], node: &str| -> Vec<Observation> {
        obs.iter()
            .filter(|o| o.region.as_deref() == Some(node))
            .cloned()
            .collect()
    };

    nodes
        .into_iter()
        .filter_map(|node| {
            let delta = TechDelta::new(&at(base, node), &at(scen, node));
            (!delta.yearly.is_empty())
                .then(|| panels::tech_delta_pair(node, unit, &delta, years, colors))
        })
        .collect()
}

/// Total/series pairs of every country whose emissions change.
fn emission_pairs(
    base: &[Observation],
    scen: &[Observation],
    years: &[i32],
    colors: &ColorMap,
) -> Vec<[Panel; 2]> {
    DeltaCalculator::country_deltas(base, scen, years)
        .into_iter()
        .enumerate()
        .map(|(i, (country, series))| {
            let color = colors.get(&country, i);
            panels::value_delta_pair(&country, "Mt CO2", &country, color, series, years)
        })
        .collect()
}
