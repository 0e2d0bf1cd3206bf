//! Charts of the base run: capacity, generation, shares, costs, emissions,
//! demand, emission limits, the node map and the overview grids.

use super::panels::{self, year_labels};
use super::{inputs, ChartContext, ReportError};
use crate::charts::{ColorMap, Figure, Marker, Panel, Series};
use crate::config::BaseRunCharts;
use crate::data::{DataProcessor, NodePoint, Observation, ResultsLoader, ShareRow, StackBy};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Limits at or below this value are drawn in the second panel.
const SMALL_LIMIT: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseRunChart {
    PwrCapBarGlobal,
    PwrCapBarCountry,
    PwrGenBarGlobal,
    PwrGenBarCountry,
    PwrGenSharesGlobal,
    PwrGenSharesCountry,
    DualCostsGlobal,
    DualCostsCountry,
    PwrCostsMultiCountry,
    DualEmissionsGlobal,
    DualEmissionsCountry,
    DualEmissionsStacked,
    DemandStacked,
    EmissionsLimit,
    SpatialMap,
    MultiPlotCapGenGensharesEmissions,
    MultiPlotCountryCharts,
}

impl BaseRunChart {
    pub const ALL: [BaseRunChart; 17] = [
        BaseRunChart::PwrCapBarGlobal,
        BaseRunChart::PwrCapBarCountry,
        BaseRunChart::PwrGenBarGlobal,
        BaseRunChart::PwrGenBarCountry,
        BaseRunChart::PwrGenSharesGlobal,
        BaseRunChart::PwrGenSharesCountry,
        BaseRunChart::DualCostsGlobal,
        BaseRunChart::DualCostsCountry,
        BaseRunChart::PwrCostsMultiCountry,
        BaseRunChart::DualEmissionsGlobal,
        BaseRunChart::DualEmissionsCountry,
        BaseRunChart::DualEmissionsStacked,
        BaseRunChart::DemandStacked,
        BaseRunChart::EmissionsLimit,
        BaseRunChart::SpatialMap,
        BaseRunChart::MultiPlotCapGenGensharesEmissions,
        BaseRunChart::MultiPlotCountryCharts,
    ];

    pub fn key(self) -> &'static str {
        match self {
            BaseRunChart::PwrCapBarGlobal => "pwr_cap_bar_global",
            BaseRunChart::PwrCapBarCountry => "pwr_cap_bar_country",
            BaseRunChart::PwrGenBarGlobal => "pwr_gen_bar_global",
            BaseRunChart::PwrGenBarCountry => "pwr_gen_bar_country",
            BaseRunChart::PwrGenSharesGlobal => "pwr_gen_shares_global",
            BaseRunChart::PwrGenSharesCountry => "pwr_gen_shares_country",
            BaseRunChart::DualCostsGlobal => "dual_costs_global",
            BaseRunChart::DualCostsCountry => "dual_costs_country",
            BaseRunChart::PwrCostsMultiCountry => "pwr_costs_multi_country",
            BaseRunChart::DualEmissionsGlobal => "dual_emissions_global",
            BaseRunChart::DualEmissionsCountry => "dual_emissions_country",
            BaseRunChart::DualEmissionsStacked => "dual_emissions_stacked",
            BaseRunChart::DemandStacked => "demand_stacked",
            BaseRunChart::EmissionsLimit => "emissions_limit",
            BaseRunChart::SpatialMap => "spatial_map",
            BaseRunChart::MultiPlotCapGenGensharesEmissions => {
                "multi_plot_cap_gen_genshares_emissions"
            }
            BaseRunChart::MultiPlotCountryCharts => "multi_plot_country_charts",
        }
    }

    pub fn enabled(self, toggles: &BaseRunCharts) -> bool {
        match self {
            BaseRunChart::PwrCapBarGlobal => toggles.pwr_cap_bar_global,
            BaseRunChart::PwrCapBarCountry => toggles.pwr_cap_bar_country,
            BaseRunChart::PwrGenBarGlobal => toggles.pwr_gen_bar_global,
            BaseRunChart::PwrGenBarCountry => toggles.pwr_gen_bar_country,
            BaseRunChart::PwrGenSharesGlobal => toggles.pwr_gen_shares_global,
            BaseRunChart::PwrGenSharesCountry => toggles.pwr_gen_shares_country,
            BaseRunChart::DualCostsGlobal => toggles.dual_costs_global,
            BaseRunChart::DualCostsCountry => toggles.dual_costs_country,
            BaseRunChart::PwrCostsMultiCountry => toggles.pwr_costs_multi_country,
            BaseRunChart::DualEmissionsGlobal => toggles.dual_emissions_global,
            BaseRunChart::DualEmissionsCountry => toggles.dual_emissions_country,
            BaseRunChart::DualEmissionsStacked => toggles.dual_emissions_stacked,
            BaseRunChart::DemandStacked => toggles.demand_stacked,
            BaseRunChart::EmissionsLimit => toggles.emissions_limit,
            BaseRunChart::SpatialMap => toggles.spatial_map,
            BaseRunChart::MultiPlotCapGenGensharesEmissions => {
                toggles.multi_plot_cap_gen_genshares_emissions
            }
            BaseRunChart::MultiPlotCountryCharts => toggles.multi_plot_country_charts,
        }
    }

    pub fn build(self, ctx: &ChartContext) -> Result<Vec<PathBuf>, ReportError> {
        let base = ctx.base();
        let countries = &ctx.config.countries;
        let charts = BaseCharts { ctx };
        let single = |figure: Figure, name: &str| save_run(ctx, &figure, name);

        match self {
            BaseRunChart::PwrCapBarGlobal => {
                let obs = ctx.scope(inputs::capacity(&base)?, None);
                single(charts.capacity(&obs, "Installed Capacity"), "pwr_cap_bar")
            }
            BaseRunChart::PwrCapBarCountry => {
                let obs = ctx.scope(inputs::capacity(&base)?, None);
                save_countries(ctx, "pwr_cap_bar", |country| {
                    let obs = DataProcessor::filter_country(&obs, country);
                    Ok((!obs.is_empty())
                        .then(|| charts.capacity(&obs, &format!("{country} Installed Capacity"))))
                })
            }
            BaseRunChart::PwrGenBarGlobal => {
                let obs = ctx.scope(inputs::generation(&base)?, None);
                single(charts.generation(&obs, "Generation"), "pwr_gen_bar")
            }
            BaseRunChart::PwrGenBarCountry => {
                let obs = ctx.scope(inputs::generation(&base)?, None);
                save_countries(ctx, "pwr_gen_bar", |country| {
                    let obs = DataProcessor::filter_country(&obs, country);
                    Ok((!obs.is_empty())
                        .then(|| charts.generation(&obs, &format!("{country} Generation"))))
                })
            }
            BaseRunChart::PwrGenSharesGlobal => {
                let rows = inputs::shares(&base, None)?;
                single(charts.shares(&rows, "Generation Shares"), "pwr_gen_shares")
            }
            BaseRunChart::PwrGenSharesCountry => save_countries(ctx, "pwr_gen_shares", |country| {
                let rows = inputs::shares(&base, Some(country))?;
                Ok((!rows.is_empty())
                    .then(|| charts.shares(&rows, &format!("{country} Generation Shares"))))
            }),
            BaseRunChart::DualCostsGlobal => {
                let costs = ctx.scope(inputs::system_costs(&base)?, None);
                let power = ctx.scope(inputs::system_power_cost(&base)?, None);
                single(charts.dual_costs(&costs, &power, "System Costs"), "dual_costs")
            }
            BaseRunChart::DualCostsCountry => {
                let costs = ctx.scope(inputs::country_costs(&base)?, None);
                let power = ctx.scope(inputs::country_power_cost(&base)?, None);
                save_countries(ctx, "dual_costs", |country| {
                    let costs = DataProcessor::filter_country(&costs, country);
                    let power = DataProcessor::filter_country(&power, country);
                    Ok((!costs.is_empty()).then(|| {
                        charts.dual_costs(&costs, &power, &format!("{country} System Costs"))
                    }))
                })
            }
            BaseRunChart::PwrCostsMultiCountry => {
                let power = ctx.scope(inputs::country_power_cost(&base)?, None);
                single(charts.multi_country_costs(&power), "multi_country_costs")
            }
            BaseRunChart::DualEmissionsGlobal => {
                let emissions = ctx.scope(inputs::emissions(&base)?, None);
                let intensity = ctx.scope(inputs::system_intensity(&base)?, None);
                let figure = Figure::new(
                    "Annual Emissions",
                    vec![charts.dual_emissions(&emissions, &intensity, "")],
                );
                single(figure, "dual_emissions")
            }
            BaseRunChart::DualEmissionsCountry => {
                let emissions = ctx.scope(inputs::emissions(&base)?, None);
                let intensity = ctx.scope(inputs::country_intensity(&base)?, None);
                save_countries(ctx, "dual_emissions", |country| {
                    let emissions = DataProcessor::filter_country(&emissions, country);
                    let intensity = DataProcessor::filter_country(&intensity, country);
                    Ok((!emissions.is_empty()).then(|| {
                        Figure::new(
                            format!("{country} Annual Emissions"),
                            vec![charts.dual_emissions(&emissions, &intensity, "")],
                        )
                    }))
                })
            }
            BaseRunChart::DualEmissionsStacked => {
                let emissions = ctx.scope(inputs::emissions(&base)?, None);
                let intensity = ctx.scope(inputs::system_intensity(&base)?, None);
                let figure = Figure::new(
                    "Annual Emissions",
                    vec![charts.stacked_emissions(&emissions, &intensity)],
                )
                .with_legend_title("Country");
                single(figure, "dual_emissions_stacked")
            }
            BaseRunChart::DemandStacked => {
                let demand = ctx.scope(inputs::demand(&base)?, None);
                let demand = DataProcessor::filter_countries(&demand, countries);
                single(charts.demand(&demand), "demand_stacked")
            }
            BaseRunChart::EmissionsLimit => {
                let limits = ctx.scope(inputs::emission_limits(&base)?, None);
                single(charts.emission_limits(&limits), "emissions_limit")
            }
            BaseRunChart::SpatialMap => single(charts.spatial_map()?, "spatial_map"),
            BaseRunChart::MultiPlotCapGenGensharesEmissions => {
                let figure = charts.overview(&base)?;
                single(figure, "multi_plot_cap_gen_genshares_emissions")
            }
            BaseRunChart::MultiPlotCountryCharts => {
                let capacity = ctx.scope(inputs::capacity(&base)?, None);
                let generation = ctx.scope(inputs::generation(&base)?, None);
                let emissions = ctx.scope(inputs::emissions(&base)?, None);
                let intensity = ctx.scope(inputs::country_intensity(&base)?, None);
                save_countries(ctx, "multi_plot_country_charts", |country| {
                    let capacity = DataProcessor::filter_country(&capacity, country);
                    if capacity.is_empty() {
                        return Ok(None);
                    }
                    let generation = DataProcessor::filter_country(&generation, country);
                    let shares = inputs::shares(&base, Some(country))?;
                    let emissions = DataProcessor::filter_country(&emissions, country);
                    let intensity = DataProcessor::filter_country(&intensity, country);
                    let panels = vec![
                        charts.capacity_panel(&capacity, "Installed Capacity"),
                        charts.generation_panel(&generation, "Generation"),
                        charts.shares_panel(&shares, "Generation Shares"),
                        charts.dual_emissions(&emissions, &intensity, "Annual Emissions"),
                    ];
                    Ok(Some(
                        Figure::new(country.to_string(), panels)
                            .with_grid(2, Vec::new())
                            .with_size(1600, 1200),
                    ))
                })
            }
        }
    }
}

fn save_run(ctx: &ChartContext, figure: &Figure, name: &str) -> Result<Vec<PathBuf>, ReportError> {
    let dir = ctx.layout.run_dir(&ctx.config.base);
    Ok(vec![ctx.save(figure, &dir, name)?])
}

/// One figure per configured country into `<base>/<country>/<name>.png`.
fn save_countries<F>(ctx: &ChartContext, name: &str, build: F) -> Result<Vec<PathBuf>, ReportError>
where
    F: Fn(&str) -> Result<Option<Figure>, ReportError> + Sync,
{
    let run = ctx.config.base.as_str();
    ctx.per_country(&ctx.config.countries, |country| match build(country)? {
        Some(figure) => ctx
            .save(&figure, &ctx.layout.country_dir(run, country), name)
            .map(Some),
        None => {
            tracing::warn!(country, chart = name, "no data for country");
            Ok(None)
        }
    })
}

/// Figure builders over already-scoped base-run data.
struct BaseCharts<'c, 'a> {
    ctx: &'c ChartContext<'a>,
}

impl BaseCharts<'_, '_> {
    fn years(&self) -> &[i32] {
        &self.ctx.years
    }

    fn capacity_panel(&self, obs: &[Observation], title: &str) -> Panel {
        let matrix = DataProcessor::year_matrix(obs, self.years(), StackBy::Tech);
        panels::stacked(title, "GW", &matrix, &self.ctx.palette.technology)
    }

    fn capacity(&self, obs: &[Observation], title: &str) -> Figure {
        Figure::new(title, vec![self.capacity_panel(obs, "")]).with_legend_title("Technology")
    }

    fn generation_panel(&self, obs: &[Observation], title: &str) -> Panel {
        let matrix = DataProcessor::year_matrix(obs, self.years(), StackBy::Tech);
        panels::stacked(title, "TWh", &matrix, &self.ctx.palette.technology)
    }

    fn generation(&self, obs: &[Observation], title: &str) -> Figure {
        Figure::new(title, vec![self.generation_panel(obs, "")]).with_legend_title("Technology")
    }

    fn shares_panel(&self, rows: &[ShareRow], title: &str) -> Panel {
        let matrix = DataProcessor::shares_by_year(rows, self.years());
        panels::stacked(title, "%", &matrix, &self.ctx.palette.gen_shares)
    }

    fn shares(&self, rows: &[ShareRow], title: &str) -> Figure {
        Figure::new(title, vec![self.shares_panel(rows, "")])
    }

    /// Total costs as bars, normalised power cost as a line.
    fn dual_costs(&self, costs: &[Observation], power: &[Observation], title: &str) -> Figure {
        let colors = &self.ctx.palette.dual_costs;
        let years = self.years();
        let panel = panels::single(
            "",
            "Billion $/Year",
            year_labels(years),
            Series::new("Total Costs", colors.get("bar", 0), DataProcessor::year_series(costs, years)),
        )
        .with_line(
            Series::new("Power Cost", colors.get("line", 1), DataProcessor::year_series(power, years)),
            "$/MWh",
        );
        Figure::new(title, vec![panel])
    }

    fn multi_country_costs(&self, power: &[Observation]) -> Figure {
        let years = self.years();
        let series = self
            .ctx
            .config
            .countries
            .iter()
            .enumerate()
            .map(|(i, country)| {
                let obs = DataProcessor::filter_country(power, country);
                Series::new(
                    country.clone(),
                    self.ctx.palette.countries.get(country, i),
                    DataProcessor::year_series(&obs, years),
                )
            })
            .collect();
        Figure::new(
            "Normalized Costs",
            vec![Panel::lines("", "$/MWh", year_labels(years), series)],
        )
        .with_legend_title("Country")
    }

    fn dual_emissions(&self, emissions: &[Observation], intensity: &[Observation], title: &str) -> Panel {
        let colors = &self.ctx.palette.dual_emissions;
        let years = self.years();
        panels::single(
            title,
            "Mt CO2",
            year_labels(years),
            Series::new("Emissions", colors.get("bar", 0), DataProcessor::year_series(emissions, years)),
        )
        .with_line(
            Series::new(
                "Emission Intensity",
                colors.get("line", 1),
                DataProcessor::year_series(intensity, years),
            ),
            "gCO2/kWh",
        )
    }

    /// Emissions stacked by country with the system intensity on a twin axis.
    fn stacked_emissions(&self, emissions: &[Observation], intensity: &[Observation]) -> Panel {
        let years = self.years();
        let emissions = DataProcessor::filter_countries(emissions, &self.ctx.config.countries);
        let matrix = DataProcessor::year_matrix(&emissions, years, StackBy::Region);
        panels::stacked("", "Mt CO2", &matrix, &self.ctx.palette.countries).with_line(
            Series::new(
                "Emission Intensity",
                self.ctx.palette.dual_emissions.get("line", 1),
                DataProcessor::year_series(intensity, years),
            ),
            "gCO2/kWh (system)",
        )
    }

    fn demand(&self, demand: &[Observation]) -> Figure {
        let matrix = DataProcessor::year_matrix(demand, self.years(), StackBy::Region);
        Figure::new(
            "Electricity Demand",
            vec![panels::stacked("", "TWh", &matrix, &self.ctx.palette.countries)],
        )
        .with_legend_title("Country")
    }

    /// One line per limit; limits never above 100 Mt get their own panel so
    /// they stay readable next to the large ones.
    fn emission_limits(&self, limits: &[Observation]) -> Figure {
        let years = self.years();
        let mut by_label: BTreeMap<&str, Vec<Observation>> = BTreeMap::new();
        for obs in limits {
            if let Some(label) = obs.tech.as_deref() {
                by_label.entry(label).or_default().push(obs.clone());
            }
        }

        let mut large = Vec::new();
        let mut small = Vec::new();
        for (i, (label, obs)) in by_label.into_iter().enumerate() {
            let values = DataProcessor::year_series(&obs, years);
            let series = Series::new(label, self.ctx.palette.countries.get(label, i), values);
            if obs.iter().all(|o| o.value <= SMALL_LIMIT) {
                small.push(series);
            } else {
                large.push(series);
            }
        }

        Figure::new(
            "Emission Limits",
            vec![
                Panel::lines("", "Mt CO2", year_labels(years), large),
                Panel::lines("", "Mt CO2", year_labels(years), small),
            ],
        )
        .with_grid(2, vec![1, 1])
        .with_size(1400, 600)
    }

    fn spatial_map(&self) -> Result<Figure, ReportError> {
        let map = &self.ctx.config.map;
        let path = map
            .nodes_file
            .as_ref()
            .ok_or_else(|| ReportError::MissingInput("map.nodes_file is not set".to_string()))?;
        let df = ResultsLoader::load_csv(path)?;
        let points = DataProcessor::node_points(&df, &map.nodes)?;
        let markers = node_markers(&points, &self.ctx.palette.countries);

        let title = if map.label.is_empty() {
            "Model Nodes"
        } else {
            map.label.as_str()
        };
        Ok(Figure::new(title, vec![Panel::map("", map.extent, markers)]).with_size(900, 900))
    }

    /// Capacity, generation, shares and stacked emissions in a 2x2 grid.
    fn overview(&self, base: &ResultsLoader) -> Result<Figure, ReportError> {
        let capacity = self.ctx.scope(inputs::capacity(base)?, None);
        let generation = self.ctx.scope(inputs::generation(base)?, None);
        let shares = inputs::shares(base, None)?;
        let emissions = self.ctx.scope(inputs::emissions(base)?, None);
        let intensity = self.ctx.scope(inputs::system_intensity(base)?, None);

        let panels = vec![
            self.capacity_panel(&capacity, "Installed Capacity"),
            self.generation_panel(&generation, "Generation"),
            self.shares_panel(&shares, "Generation Shares"),
            self.stacked_emissions(&emissions, &intensity)
                .with_title("Annual Emissions"),
        ];
        Ok(Figure::new("System Overview", panels)
            .with_grid(2, Vec::new())
            .with_size(1600, 1200))
    }
}

/// Markers coloured by the country prefix of each node.
fn node_markers(points: &[NodePoint], colors: &ColorMap) -> Vec<Marker> {
    let mut countries: Vec<&str> = points.iter().filter_map(|p| p.region.get(..3)).collect();
    countries.dedup();
    points
        .iter()
        .map(|p| {
            let country = p.region.get(..3).unwrap_or(p.region.as_str());
            let index = countries.iter().position(|c| *c == country).unwrap_or(0);
            Marker {
                label: p.region.clone(),
                x: p.long,
                y: p.lat,
                color: colors.get(country, index),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{PanelBody, PALETTE};
    use crate::config::Config;

    fn config() -> Config {
        Config::from_toml_str(
            "countries = [\"BWA\", \"ZWE\"]\nstart_year = 2023\nend_year = 2025\n",
        )
        .unwrap()
    }

    fn limit(label: &str, year: i32, value: f64) -> Observation {
        Observation::new(Some(label), None, Some(year), value)
    }

    #[test]
    fn emission_limits_split_by_size() {
        let config = config();
        let ctx = ChartContext::new(&config);
        let charts = BaseCharts { ctx: &ctx };
        let figure = charts.emission_limits(&[
            limit("BWA", 2023, 250.0),
            limit("BWA", 2024, 90.0),
            limit("ZWE", 2023, 40.0),
            limit("ZWE", 2025, 100.0),
        ]);

        let labels = |panel: &Panel| match &panel.body {
            PanelBody::Lines { series } => series.iter().map(|s| s.label.clone()).collect::<Vec<_>>(),
            _ => Vec::new(),
        };
        assert_eq!(labels(&figure.panels[0]), vec!["BWA"]);
        assert_eq!(labels(&figure.panels[1]), vec!["ZWE"]);
        assert_eq!(figure.width_ratios, vec![1, 1]);
    }

    #[test]
    fn capacity_panel_covers_horizon() {
        let config = config();
        let ctx = ChartContext::new(&config);
        let charts = BaseCharts { ctx: &ctx };
        let panel = charts.capacity_panel(
            &[Observation::new(Some("SPV"), Some("BWA"), Some(2024), 2.0)],
            "",
        );
        assert_eq!(panel.categories, vec!["2023", "2024", "2025"]);
        assert_eq!(panel.bar_rects().len(), 1);
        assert_eq!(panel.y_label, "GW");
    }

    #[test]
    fn dual_costs_has_a_twin_line() {
        let config = config();
        let ctx = ChartContext::new(&config);
        let charts = BaseCharts { ctx: &ctx };
        let costs = [Observation::new(None, None, Some(2023), 1.5)];
        let power = [Observation::new(None, None, Some(2023), 60.0)];
        let figure = charts.dual_costs(&costs, &power, "System Costs");
        assert_eq!(figure.panels[0].secondary_range(), Some((0.0, 60.0 * 1.1)));
    }

    #[test]
    fn node_markers_are_coloured_per_country() {
        let points = vec![
            NodePoint { region: "BWAXX".into(), lat: -22.0, long: 24.0 },
            NodePoint { region: "ZWEHA".into(), lat: -17.8, long: 31.0 },
            NodePoint { region: "ZWEBU".into(), lat: -20.1, long: 28.6 },
        ];
        let markers = node_markers(&points, &ColorMap::default());
        assert_eq!(markers[0].color, PALETTE[0]);
        assert_eq!(markers[1].color, PALETTE[1]);
        assert_eq!(markers[2].color, PALETTE[1]);
        assert_eq!((markers[1].x, markers[1].y), (31.0, -17.8));
    }
}
