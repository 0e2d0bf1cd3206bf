//! Panel and figure builders shared by the chart groups.

use crate::charts::{BarGroup, ColorMap, Figure, Panel, Series};
use crate::data::{DeltaCalculator, DeltaRow, DivergingMatrix, KeySpec, Matrix, Observation};
use plotters::style::RGBColor;

/// Column ratios of a grid of total/series pairs, two pairs per row.
const PAIR_GRID: [u32; 4] = [1, 10, 1, 10];
const PAIR_ROW_HEIGHT: u32 = 320;

/// Technology deltas of one scenario against the base run.
#[derive(Debug, Clone, Default)]
pub struct TechDelta {
    /// Keyed by technology and year.
    pub yearly: Vec<DeltaRow>,
    /// Keyed by technology, summed over the horizon.
    pub horizon: Vec<DeltaRow>,
}

impl TechDelta {
    pub fn new(base: &[Observation], scenario: &[Observation]) -> Self {
        Self {
            yearly: DeltaCalculator::calculate_results_delta(base, scenario, KeySpec::TECH_YEAR),
            horizon: DeltaCalculator::calculate_results_delta(base, scenario, KeySpec::TECH),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.yearly.is_empty() && self.horizon.is_empty()
    }

    pub fn totals(&self) -> DivergingMatrix {
        DeltaCalculator::diverging_totals(&self.horizon, "Total")
    }
}

pub fn year_labels(years: &[i32]) -> Vec<String> {
    years.iter().map(|y| y.to_string()).collect()
}

/// Stacked bars, one category per matrix row.
pub fn stacked(title: &str, unit: &str, matrix: &Matrix, colors: &ColorMap) -> Panel {
    Panel::bars(
        title,
        unit,
        matrix.rows.clone(),
        vec![BarGroup::from_matrix(matrix, colors)],
    )
}

/// Decreases stacked below zero, increases above.
pub fn diverging(title: &str, unit: &str, matrix: &DivergingMatrix, colors: &ColorMap) -> Panel {
    Panel::bars(
        title,
        unit,
        matrix.rows().to_vec(),
        vec![BarGroup::diverging(matrix, colors)],
    )
}

pub fn single(title: &str, unit: &str, categories: Vec<String>, series: Series) -> Panel {
    Panel::bars(title, unit, categories, vec![BarGroup::single(series)])
}

/// Horizon total next to the yearly diverging bars of a technology delta.
pub fn tech_delta_pair(
    title: &str,
    unit: &str,
    delta: &TechDelta,
    years: &[i32],
    colors: &ColorMap,
) -> [Panel; 2] {
    let total = Panel::total(unit, &delta.totals(), colors);
    let yearly = DeltaCalculator::diverging_by_year(&delta.yearly, years);
    [total, diverging(title, unit, &yearly, colors)]
}

/// Horizon total next to the yearly bars of a single-valued delta.
pub fn value_delta_pair(
    title: &str,
    unit: &str,
    label: &str,
    color: RGBColor,
    yearly: Vec<f64>,
    years: &[i32],
) -> [Panel; 2] {
    let total: f64 = yearly.iter().sum();
    [
        single("", unit, vec!["Total".to_string()], Series::new(label, color, vec![total])),
        single(title, unit, year_labels(years), Series::new(label, color, yearly)),
    ]
}

pub fn pair_figure(title: impl Into<String>, pair: [Panel; 2]) -> Figure {
    let [total, series] = pair;
    Figure::total_and_series(title, total, series)
}

/// Total/series pairs laid out two per row.
pub fn pair_grid(title: impl Into<String>, pairs: Vec<[Panel; 2]>) -> Figure {
    let rows = pairs.len().div_ceil(2).max(1) as u32;
    let panels: Vec<Panel> = pairs.into_iter().flatten().collect();
    Figure::new(title, panels)
        .with_grid(PAIR_GRID.len(), PAIR_GRID.to_vec())
        .with_size(1600, PAIR_ROW_HEIGHT * rows + 120)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::PanelBody;

    fn obs(tech: &str, year: i32, value: f64) -> Observation {
        Observation::new(Some(tech), Some("BWA"), Some(year), value)
    }

    #[test]
    fn tech_delta_nets_the_horizon_per_technology() {
        let base = vec![obs("COA", 2023, 5.0), obs("SPV", 2024, 1.0)];
        let scenario = vec![obs("COA", 2023, 2.0), obs("COA", 2024, 4.0), obs("SPV", 2024, 1.0)];
        let delta = TechDelta::new(&base, &scenario);

        assert_eq!(delta.yearly.len(), 2);
        assert_eq!(delta.horizon.len(), 1);
        let totals = delta.totals();
        assert_eq!(totals.increase.values, vec![vec![1.0]]);
        assert_eq!(totals.decrease.values, vec![vec![0.0]]);
    }

    #[test]
    fn tech_delta_pair_spans_the_horizon() {
        let delta = TechDelta::new(&[obs("COA", 2023, 5.0)], &[obs("COA", 2023, 2.0)]);
        let [total, yearly] = tech_delta_pair("BWA", "GW", &delta, &[2023, 2024], &ColorMap::default());
        assert_eq!(total.categories, vec!["Total"]);
        assert_eq!(yearly.categories, vec!["2023", "2024"]);
        assert_eq!(yearly.title, "BWA");
        assert_eq!(yearly.y_range().0, -3.0 * 1.1);
    }

    #[test]
    fn value_delta_total_is_the_yearly_sum() {
        let [total, _] = value_delta_pair("", "Mt", "CO2", RGBColor(0, 0, 0), vec![1.0, -3.0], &[2023, 2024]);
        match total.body {
            PanelBody::Bars { groups, .. } => assert_eq!(groups[0].layers[0].values, vec![-2.0]),
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn pair_grid_puts_two_pairs_per_row() {
        let pair = || value_delta_pair("", "", "", RGBColor(0, 0, 0), vec![1.0], &[2023]);
        let figure = pair_grid("Emissions", vec![pair(), pair(), pair()]);
        assert_eq!(figure.panels.len(), 6);
        assert_eq!(figure.rows(), 2);
        assert_eq!(figure.width_ratios, vec![1, 10, 1, 10]);
        assert_eq!(figure.size, (1600, 760));
    }

    #[test]
    fn diverging_pair_grid_renders_to_png() {
        let base = vec![obs("COA", 2023, 5.0), obs("SPV", 2024, 1.0)];
        let scenario = vec![obs("COA", 2023, 2.0), obs("SPV", 2024, 4.0)];
        let delta = TechDelta::new(&base, &scenario);
        let years = [2023, 2024];
        let colors = ColorMap::default();
        let figure = pair_grid(
            "Power Capacity Delta",
            vec![
                tech_delta_pair("BWA", "GW", &delta, &years, &colors),
                tech_delta_pair("ZMB", "GW", &delta, &years, &colors),
                tech_delta_pair("ZWE", "GW", &delta, &years, &colors),
            ],
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pwr_cap_bar_dif.png");
        crate::charts::StaticChartRenderer::render_to_file(&figure, &path).unwrap();
        let image = image::open(&path).unwrap();
        assert_eq!((image.width(), image.height()), figure.size);
        assert_eq!(figure.size, (1600, 760));
    }
}
