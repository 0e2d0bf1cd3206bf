//! Delta Module
//! Scenario-minus-base differences and the sign split behind diverging bars.

use super::processor::{Observation, ShareRow, ShareTotals};
use std::collections::{BTreeMap, BTreeSet};

/// Dimensions an observation is projected onto before aligning two runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    pub tech: bool,
    pub region: bool,
    pub year: bool,
}

impl KeySpec {
    pub const TECH_YEAR: KeySpec = KeySpec { tech: true, region: false, year: true };
    pub const TECH: KeySpec = KeySpec { tech: true, region: false, year: false };
    pub const REGION_YEAR: KeySpec = KeySpec { tech: false, region: true, year: true };
    pub const YEAR: KeySpec = KeySpec { tech: false, region: false, year: true };
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeltaKey {
    pub tech: Option<String>,
    pub region: Option<String>,
    pub year: Option<i32>,
}

impl DeltaKey {
    pub fn project(obs: &Observation, spec: KeySpec) -> Self {
        Self {
            tech: obs.tech.clone().filter(|_| spec.tech),
            region: obs.region.clone().filter(|_| spec.region),
            year: obs.year.filter(|_| spec.year),
        }
    }
}

/// One aligned key with both sides and their difference.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaRow {
    pub key: DeltaKey,
    pub base: f64,
    pub scenario: f64,
    pub delta: f64,
}

/// Dense `rows x columns` table of values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Matrix {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    /// `values[row][column]`
    pub values: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: Vec<String>, columns: Vec<String>) -> Self {
        let values = vec![vec![0.0; columns.len()]; rows.len()];
        Self { rows, columns, values }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn column(&self, index: usize) -> Vec<f64> {
        self.values.iter().map(|row| row[index]).collect()
    }

    pub fn row_sums(&self) -> Vec<f64> {
        self.values.iter().map(|row| row.iter().sum()).collect()
    }

    /// Reorder rows to follow `order`; labels not present are skipped.
    pub fn reorder_rows(&mut self, order: &[String]) {
        let mut rows = Vec::with_capacity(order.len());
        let mut values = Vec::with_capacity(order.len());
        for label in order {
            if let Some(i) = self.rows.iter().position(|r| r == label) {
                rows.push(self.rows[i].clone());
                values.push(self.values[i].clone());
            }
        }
        self.rows = rows;
        self.values = values;
    }
}

/// Decrease (`<= 0`) and increase (`>= 0`) halves sharing a row index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DivergingMatrix {
    pub decrease: Matrix,
    pub increase: Matrix,
}

impl DivergingMatrix {
    /// Split a signed matrix cell-wise into its negative and positive parts.
    pub fn clip(matrix: &Matrix) -> Self {
        let clip_with = |f: fn(f64) -> f64| Matrix {
            rows: matrix.rows.clone(),
            columns: matrix.columns.clone(),
            values: matrix
                .values
                .iter()
                .map(|row| row.iter().map(|v| f(*v)).collect())
                .collect(),
        };
        Self {
            decrease: clip_with(|v| v.min(0.0)),
            increase: clip_with(|v| v.max(0.0)),
        }
    }

    pub fn rows(&self) -> &[String] {
        if self.decrease.rows.is_empty() {
            &self.increase.rows
        } else {
            &self.decrease.rows
        }
    }

    pub fn is_empty(&self) -> bool {
        self.decrease.is_empty() && self.increase.is_empty()
    }

    /// `-sum(decrease) + sum(increase)` per row.
    pub fn magnitudes(&self) -> Vec<f64> {
        let dec = self.decrease.row_sums();
        let inc = self.increase.row_sums();
        self.rows()
            .iter()
            .enumerate()
            .map(|(i, _)| -dec.get(i).copied().unwrap_or(0.0) + inc.get(i).copied().unwrap_or(0.0))
            .collect()
    }

    pub fn reorder_rows(&mut self, order: &[String]) {
        self.decrease.reorder_rows(order);
        self.increase.reorder_rows(order);
    }
}

/// Multi-scenario diverging matrix, one row per scenario.
pub type ScenarioMatrix = DivergingMatrix;

/// Grouped share deltas per sensitivity run, indexed by scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareSensitivity {
    pub scenarios: Vec<String>,
    pub runs: Vec<(String, DivergingMatrix)>,
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Computes deltas between a base run and a scenario run.
pub struct DeltaCalculator;

impl DeltaCalculator {
    fn group(observations: &[Observation], spec: KeySpec) -> BTreeMap<DeltaKey, f64> {
        let mut grouped = BTreeMap::new();
        for obs in observations {
            *grouped.entry(DeltaKey::project(obs, spec)).or_insert(0.0) += obs.value;
        }
        grouped
    }

    /// Group-sum both sides on `spec` and outer-join them, zero-filling the
    /// side a key is missing from. Deltas are neither rounded nor filtered.
    pub fn aligned(base: &[Observation], scenario: &[Observation], spec: KeySpec) -> Vec<DeltaRow> {
        let base = Self::group(base, spec);
        let scenario = Self::group(scenario, spec);
        let keys: BTreeSet<&DeltaKey> = base.keys().chain(scenario.keys()).collect();

        keys.into_iter()
            .map(|key| {
                let b = base.get(key).copied().unwrap_or(0.0);
                let s = scenario.get(key).copied().unwrap_or(0.0);
                DeltaRow {
                    key: key.clone(),
                    base: b,
                    scenario: s,
                    delta: s - b,
                }
            })
            .collect()
    }

    /// Aligned rows with the delta rounded to two decimals; unchanged keys
    /// are dropped.
    pub fn calculate_results_delta(
        base: &[Observation],
        scenario: &[Observation],
        spec: KeySpec,
    ) -> Vec<DeltaRow> {
        Self::aligned(base, scenario, spec)
            .into_iter()
            .map(|mut row| {
                row.delta = round_to(row.delta, 2);
                row
            })
            .filter(|row| row.delta != 0.0)
            .collect()
    }

    /// `(decrease, increase)`; zero deltas land in neither half.
    pub fn split_by_sign(rows: &[DeltaRow]) -> (Vec<DeltaRow>, Vec<DeltaRow>) {
        let decrease = rows.iter().filter(|r| r.delta < 0.0).cloned().collect();
        let increase = rows.iter().filter(|r| r.delta > 0.0).cloned().collect();
        (decrease, increase)
    }

    fn technologies(rows: &[DeltaRow]) -> Vec<String> {
        rows.iter()
            .filter_map(|r| r.key.tech.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Years x technologies, every horizon year present. Rows outside the
    /// horizon are ignored.
    pub fn pivot(rows: &[DeltaRow], years: &[i32]) -> Matrix {
        let columns = Self::technologies(rows);
        let mut matrix = Matrix::zeros(years.iter().map(|y| y.to_string()).collect(), columns);
        for row in rows {
            let (Some(tech), Some(year)) = (&row.key.tech, row.key.year) else {
                continue;
            };
            let Some(r) = years.iter().position(|y| *y == year) else {
                continue;
            };
            if let Some(c) = matrix.columns.iter().position(|t| t == tech) {
                matrix.values[r][c] += row.delta;
            }
        }
        matrix
    }

    /// Horizon sum per technology, zero for every technology in `technologies`
    /// that has no row.
    pub fn horizon_totals(rows: &[DeltaRow], technologies: &[String]) -> Vec<(String, f64)> {
        technologies
            .iter()
            .map(|tech| {
                let total = rows
                    .iter()
                    .filter(|r| r.key.tech.as_deref() == Some(tech.as_str()))
                    .map(|r| r.delta)
                    .sum();
                (tech.clone(), total)
            })
            .collect()
    }

    /// Diverging years x technologies matrices for the time-series panel.
    pub fn diverging_by_year(rows: &[DeltaRow], years: &[i32]) -> DivergingMatrix {
        let (decrease, increase) = Self::split_by_sign(rows);
        DivergingMatrix {
            decrease: Self::pivot(&decrease, years),
            increase: Self::pivot(&increase, years),
        }
    }

    /// Single `label` row of horizon totals per technology, split by sign.
    pub fn diverging_totals(rows: &[DeltaRow], label: &str) -> DivergingMatrix {
        let techs = Self::technologies(rows);
        let (decrease, increase) = Self::split_by_sign(rows);
        let to_matrix = |half: &[DeltaRow]| Matrix {
            rows: vec![label.to_string()],
            columns: techs.clone(),
            values: vec![Self::horizon_totals(half, &techs)
                .into_iter()
                .map(|(_, v)| v)
                .collect()],
        };
        DivergingMatrix {
            decrease: to_matrix(&decrease),
            increase: to_matrix(&increase),
        }
    }

    /// Yearly `scenario - base` for a single-value series, zero-filled over
    /// `years`.
    pub fn yearly_delta(base: &[Observation], scenario: &[Observation], years: &[i32]) -> Vec<f64> {
        let rows = Self::aligned(base, scenario, KeySpec::YEAR);
        years
            .iter()
            .map(|year| {
                rows.iter()
                    .find(|r| r.key.year == Some(*year))
                    .map(|r| r.delta)
                    .unwrap_or(0.0)
            })
            .collect()
    }

    /// Horizon `scenario - base` for a single-value series.
    pub fn horizon_delta(base: &[Observation], scenario: &[Observation]) -> f64 {
        let base: f64 = base.iter().map(|o| o.value).sum();
        let scenario: f64 = scenario.iter().map(|o| o.value).sum();
        scenario - base
    }

    /// Per-country yearly deltas over `years`, keeping only countries whose
    /// horizon delta rounded to three decimals is non-zero.
    pub fn country_deltas(
        base: &[Observation],
        scenario: &[Observation],
        years: &[i32],
    ) -> Vec<(String, Vec<f64>)> {
        let rows = Self::aligned(base, scenario, KeySpec::REGION_YEAR);
        let mut by_country: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for row in &rows {
            let (Some(country), Some(year)) = (&row.key.region, row.key.year) else {
                continue;
            };
            let series = by_country
                .entry(country.clone())
                .or_insert_with(|| vec![0.0; years.len()]);
            if let Some(i) = years.iter().position(|y| *y == year) {
                series[i] += row.delta;
            }
        }
        by_country
            .into_iter()
            .filter(|(_, series)| round_to(series.iter().sum(), 3) != 0.0)
            .collect()
    }

    /// Yearly share deltas (`scenario - base` per component), zero-filled
    /// over `years`.
    pub fn share_deltas(base: &[ShareRow], scenario: &[ShareRow], years: &[i32]) -> Vec<ShareRow> {
        let find = |rows: &[ShareRow], year: i32| {
            rows.iter()
                .find(|r| r.year == year)
                .map(|r| (r.renewable, r.fossil, r.other))
                .unwrap_or((0.0, 0.0, 0.0))
        };
        years
            .iter()
            .map(|&year| {
                let (br, bf, bo) = find(base, year);
                let (sr, sf, so) = find(scenario, year);
                ShareRow {
                    year,
                    renewable: sr - br,
                    fossil: sf - bf,
                    other: so - bo,
                }
            })
            .collect()
    }

    /// Years x {Renewable, Fossil, Other} share deltas split cell-wise.
    pub fn diverging_shares(deltas: &[ShareRow]) -> DivergingMatrix {
        let matrix = Matrix {
            rows: deltas.iter().map(|r| r.year.to_string()).collect(),
            columns: share_columns(),
            values: deltas
                .iter()
                .map(|r| vec![r.renewable, r.fossil, r.other])
                .collect(),
        };
        DivergingMatrix::clip(&matrix)
    }

    /// `label` x {Renewable, Fossil, Other} horizon share delta split cell-wise.
    pub fn diverging_share_totals(delta: &ShareTotals, label: &str) -> DivergingMatrix {
        Self::share_matrix(&[(label.to_string(), *delta)], false)
    }

    /// Scenario x {Renewable, Fossil, Other}; with `axis_sort` rows are ordered
    /// by their decrease sum, largest decrease first.
    pub fn share_matrix(deltas: &[(String, ShareTotals)], axis_sort: bool) -> DivergingMatrix {
        let mut sorted: Vec<&(String, ShareTotals)> = deltas.iter().collect();
        if axis_sort {
            let decrease = |s: &ShareTotals| -> f64 {
                s.components().iter().map(|(_, v)| v.min(0.0)).sum()
            };
            sorted.sort_by(|a, b| decrease(&a.1).total_cmp(&decrease(&b.1)));
        } else {
            sorted.sort_by(|a, b| a.0.cmp(&b.0));
        }

        let matrix = Matrix {
            rows: sorted.iter().map(|(name, _)| name.clone()).collect(),
            columns: share_columns(),
            values: sorted
                .iter()
                .map(|(_, s)| s.components().iter().map(|(_, v)| *v).collect())
                .collect(),
        };
        DivergingMatrix::clip(&matrix)
    }

    /// Scenario x technology horizon deltas. Rows are alphabetical, or by
    /// `-decrease + increase` descending when `axis_sort` is set; technology
    /// columns are shared by both halves and sorted.
    pub fn scenario_matrix(deltas: &[(String, Vec<DeltaRow>)], axis_sort: bool) -> ScenarioMatrix {
        let techs: Vec<String> = deltas
            .iter()
            .flat_map(|(_, rows)| Self::technologies(rows))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let mut scenarios: Vec<String> = deltas.iter().map(|(name, _)| name.clone()).collect();
        scenarios.sort();

        let mut matrix = DivergingMatrix {
            decrease: Matrix::zeros(scenarios.clone(), techs.clone()),
            increase: Matrix::zeros(scenarios.clone(), techs.clone()),
        };
        for (name, rows) in deltas {
            let Some(r) = scenarios.iter().position(|s| s == name) else {
                continue;
            };
            let (decrease, increase) = Self::split_by_sign(rows);
            for (c, (_, v)) in Self::horizon_totals(&decrease, &techs).into_iter().enumerate() {
                matrix.decrease.values[r][c] += v;
            }
            for (c, (_, v)) in Self::horizon_totals(&increase, &techs).into_iter().enumerate() {
                matrix.increase.values[r][c] += v;
            }
        }

        if axis_sort {
            let magnitudes = matrix.magnitudes();
            let mut order: Vec<(String, f64)> =
                scenarios.iter().cloned().zip(magnitudes).collect();
            order.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            let order: Vec<String> = order.into_iter().map(|(name, _)| name).collect();
            matrix.reorder_rows(&order);
        }
        matrix
    }

    /// Labelled values ascending by value when `by_value`, otherwise by label.
    pub fn sort_scenarios(mut values: Vec<(String, f64)>, by_value: bool) -> Vec<(String, f64)> {
        if by_value {
            values.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        } else {
            values.sort_by(|a, b| a.0.cmp(&b.0));
        }
        values
    }

    /// Scenario x run table from per-run `(scenario, value)` lists. Absent
    /// combinations are zero. Rows are alphabetical, or ascending by the
    /// `reference` run's column when `axis_sort` is set.
    pub fn sensitivity_table(
        per_run: &[(String, Vec<(String, f64)>)],
        reference: Option<&str>,
        axis_sort: bool,
    ) -> Matrix {
        let scenarios: Vec<String> = per_run
            .iter()
            .flat_map(|(_, values)| values.iter().map(|(s, _)| s.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let runs: Vec<String> = per_run.iter().map(|(run, _)| run.clone()).collect();

        let mut table = Matrix::zeros(scenarios, runs);
        for (c, (_, values)) in per_run.iter().enumerate() {
            for (scenario, value) in values {
                if let Some(r) = table.rows.iter().position(|s| s == scenario) {
                    table.values[r][c] += value;
                }
            }
        }

        if axis_sort {
            if let Some(c) = reference.and_then(|name| table.columns.iter().position(|r| r == name)) {
                let column = table.column(c);
                let order: Vec<String> = Self::sort_scenarios(
                    table.rows.iter().cloned().zip(column).collect(),
                    true,
                )
                .into_iter()
                .map(|(name, _)| name)
                .collect();
                table.reorder_rows(&order);
            }
        }
        table
    }

    /// Share deltas per sensitivity run. Scenarios whose decrease part sums to
    /// zero across every run are dropped; missing combinations are zero.
    pub fn share_sensitivity(per_run: &[(String, Vec<(String, ShareTotals)>)]) -> ShareSensitivity {
        let all: BTreeSet<String> = per_run
            .iter()
            .flat_map(|(_, values)| values.iter().map(|(s, _)| s.clone()))
            .collect();

        let decrease_sum = |scenario: &str| -> f64 {
            per_run
                .iter()
                .flat_map(|(_, values)| values.iter())
                .filter(|(s, _)| s == scenario)
                .flat_map(|(_, t)| t.components())
                .map(|(_, v)| v.min(0.0))
                .sum()
        };
        let scenarios: Vec<String> = all.into_iter().filter(|s| decrease_sum(s.as_str()) < 0.0).collect();

        let runs = per_run
            .iter()
            .map(|(run, values)| {
                let filled: Vec<(String, ShareTotals)> = scenarios
                    .iter()
                    .map(|s| {
                        let totals = values
                            .iter()
                            .find(|(name, _)| name == s)
                            .map(|(_, t)| *t)
                            .unwrap_or(ShareTotals {
                                renewable: 0.0,
                                fossil: 0.0,
                                other: 0.0,
                            });
                        (s.clone(), totals)
                    })
                    .collect();
                (run.clone(), Self::share_matrix(&filled, false))
            })
            .collect();

        ShareSensitivity { scenarios, runs }
    }
}

fn share_columns() -> Vec<String> {
    ["Renewable", "Fossil", "Other"].iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(tech: &str, region: &str, year: i32, value: f64) -> Observation {
        Observation::new(Some(tech), Some(region), Some(year), value)
    }

    fn yearly(year: i32, value: f64) -> Observation {
        Observation::new(None, None, Some(year), value)
    }

    fn delta(tech: &str, year: i32, value: f64) -> DeltaRow {
        DeltaRow {
            key: DeltaKey {
                tech: Some(tech.to_string()),
                region: None,
                year: Some(year),
            },
            base: 0.0,
            scenario: value,
            delta: value,
        }
    }

    #[test]
    fn outer_join_zero_fills_both_sides() {
        let base = vec![obs("COA", "BWA", 2023, 5.0), obs("SPV", "BWA", 2023, 1.0)];
        let scenario = vec![obs("COA", "BWA", 2023, 3.0), obs("WON", "BWA", 2023, 2.0)];
        let rows = DeltaCalculator::calculate_results_delta(&base, &scenario, KeySpec::TECH_YEAR);

        let by_tech: Vec<(&str, f64)> = rows
            .iter()
            .map(|r| (r.key.tech.as_deref().unwrap(), r.delta))
            .collect();
        assert_eq!(by_tech, vec![("COA", -2.0), ("SPV", -1.0), ("WON", 2.0)]);
        assert_eq!(rows[1].scenario, 0.0);
        assert_eq!(rows[2].base, 0.0);
    }

    #[test]
    fn unchanged_keys_are_dropped_and_deltas_rounded() {
        let base = vec![obs("COA", "BWA", 2023, 1.0), obs("HYD", "BWA", 2023, 1.0)];
        let scenario = vec![obs("COA", "BWA", 2023, 1.001), obs("HYD", "BWA", 2023, 1.126)];
        let rows = DeltaCalculator::calculate_results_delta(&base, &scenario, KeySpec::TECH_YEAR);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key.tech.as_deref(), Some("HYD"));
        assert_eq!(rows[0].delta, 0.13);
    }

    #[test]
    fn key_projection_sums_regions() {
        let base = vec![obs("COA", "BWA", 2023, 1.0), obs("COA", "ZWE", 2023, 1.0)];
        let scenario = vec![obs("COA", "BWA", 2023, 4.0)];
        let rows = DeltaCalculator::calculate_results_delta(&base, &scenario, KeySpec::TECH);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key.year, None);
        assert_eq!(rows[0].key.region, None);
        assert_eq!(rows[0].delta, 2.0);
    }

    #[test]
    fn sign_split_partitions_rows() {
        let rows = vec![delta("COA", 2023, -1.0), delta("SPV", 2023, 2.0), delta("WON", 2024, 0.5)];
        let (dec, inc) = DeltaCalculator::split_by_sign(&rows);
        assert_eq!(dec.len(), 1);
        assert_eq!(inc.len(), 2);
        assert_eq!(dec.len() + inc.len(), rows.len());
    }

    #[test]
    fn pivot_fills_every_horizon_year() {
        let rows = vec![delta("SPV", 2025, 2.0), delta("COA", 2023, -1.0)];
        let years = vec![2023, 2024, 2025];
        let matrix = DeltaCalculator::pivot(&rows, &years);
        assert_eq!(matrix.rows, vec!["2023", "2024", "2025"]);
        assert_eq!(matrix.columns, vec!["COA", "SPV"]);
        assert_eq!(matrix.values, vec![vec![-1.0, 0.0], vec![0.0, 0.0], vec![0.0, 2.0]]);
    }

    #[test]
    fn diverging_by_year_shares_the_year_index() {
        let rows = vec![delta("COA", 2023, -1.0), delta("SPV", 2024, 2.0)];
        let matrix = DeltaCalculator::diverging_by_year(&rows, &[2023, 2024]);
        assert_eq!(matrix.decrease.rows, matrix.increase.rows);
        assert_eq!(matrix.decrease.columns, vec!["COA"]);
        assert_eq!(matrix.increase.values, vec![vec![0.0], vec![2.0]]);
    }

    #[test]
    fn horizon_totals_zero_fill_other_side() {
        let rows = vec![delta("COA", 2023, -1.0), delta("COA", 2024, -2.0), delta("SPV", 2024, 3.0)];
        let totals = DeltaCalculator::diverging_totals(&rows, "Total");
        assert_eq!(totals.decrease.columns, vec!["COA", "SPV"]);
        assert_eq!(totals.decrease.values, vec![vec![-3.0, 0.0]]);
        assert_eq!(totals.increase.values, vec![vec![0.0, 3.0]]);
    }

    #[test]
    fn yearly_delta_is_zero_filled() {
        let base = vec![yearly(2023, 10.0), yearly(2024, 10.0)];
        let scenario = vec![yearly(2023, 12.0)];
        let deltas = DeltaCalculator::yearly_delta(&base, &scenario, &[2023, 2024, 2025]);
        assert_eq!(deltas, vec![2.0, -10.0, 0.0]);
        assert_eq!(DeltaCalculator::horizon_delta(&base, &scenario), -8.0);
    }

    #[test]
    fn country_deltas_drop_unchanged_countries() {
        let base = vec![
            Observation::new(None, Some("BWA"), Some(2023), 1.0),
            Observation::new(None, Some("ZWE"), Some(2023), 1.0),
            Observation::new(None, Some("ZMB"), Some(2023), 1.0),
        ];
        let scenario = vec![
            Observation::new(None, Some("BWA"), Some(2023), 1.0004),
            Observation::new(None, Some("ZWE"), Some(2023), 3.0),
            Observation::new(None, Some("ZMB"), Some(2024), 2.0),
        ];
        let deltas = DeltaCalculator::country_deltas(&base, &scenario, &[2023, 2024]);
        let countries: Vec<&str> = deltas.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(countries, vec!["ZMB", "ZWE"]);
        assert_eq!(deltas[1].1, vec![2.0, 0.0]);
    }

    #[test]
    fn share_deltas_split_per_component() {
        let base = vec![ShareRow::new(2023, 20.0, 70.0)];
        let scenario = vec![ShareRow::new(2023, 30.0, 65.0)];
        let deltas = DeltaCalculator::share_deltas(&base, &scenario, &[2023]);
        assert_eq!(deltas[0].renewable, 10.0);
        assert_eq!(deltas[0].fossil, -5.0);
        assert_eq!(deltas[0].other, -5.0);

        let matrix = DeltaCalculator::diverging_shares(&deltas);
        assert_eq!(matrix.decrease.values, vec![vec![0.0, -5.0, -5.0]]);
        assert_eq!(matrix.increase.values, vec![vec![10.0, 0.0, 0.0]]);
    }

    fn scenario_deltas() -> Vec<(String, Vec<DeltaRow>)> {
        vec![
            ("ZWEXX".to_string(), vec![delta("COA", 2023, -1.0)]),
            ("BWAXX".to_string(), vec![delta("COA", 2023, -2.0), delta("SPV", 2023, 4.0)]),
            ("MOZXX".to_string(), vec![delta("HYD", 2023, 0.5)]),
        ]
    }

    #[test]
    fn scenario_matrix_defaults_to_alphabetical() {
        let matrix = DeltaCalculator::scenario_matrix(&scenario_deltas(), false);
        assert_eq!(matrix.rows(), ["BWAXX", "MOZXX", "ZWEXX"]);
        assert_eq!(matrix.decrease.columns, vec!["COA", "HYD", "SPV"]);
        assert_eq!(matrix.decrease.values[0], vec![-2.0, 0.0, 0.0]);
        assert_eq!(matrix.increase.values[0], vec![0.0, 0.0, 4.0]);
    }

    #[test]
    fn scenario_matrix_sorts_by_magnitude() {
        let matrix = DeltaCalculator::scenario_matrix(&scenario_deltas(), true);
        assert_eq!(matrix.rows(), ["BWAXX", "ZWEXX", "MOZXX"]);
        assert_eq!(matrix.magnitudes(), vec![6.0, 1.0, 0.5]);
    }

    #[test]
    fn sort_scenarios_by_value_or_name() {
        let values = vec![("B".to_string(), 2.0), ("A".to_string(), 3.0), ("C".to_string(), -1.0)];
        let by_name: Vec<String> = DeltaCalculator::sort_scenarios(values.clone(), false)
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(by_name, vec!["A", "B", "C"]);
        let by_value: Vec<String> = DeltaCalculator::sort_scenarios(values, true)
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(by_value, vec!["C", "B", "A"]);
    }

    #[test]
    fn sensitivity_table_outer_joins_runs() {
        let per_run = vec![
            ("Low".to_string(), vec![("A".to_string(), 3.0), ("B".to_string(), 1.0)]),
            ("High".to_string(), vec![("B".to_string(), 5.0), ("C".to_string(), 2.0)]),
        ];
        let table = DeltaCalculator::sensitivity_table(&per_run, Some("Low"), false);
        assert_eq!(table.rows, vec!["A", "B", "C"]);
        assert_eq!(table.columns, vec!["Low", "High"]);
        assert_eq!(table.values[0], vec![3.0, 0.0]);
        assert_eq!(table.values[2], vec![0.0, 2.0]);

        let sorted = DeltaCalculator::sensitivity_table(&per_run, Some("Low"), true);
        assert_eq!(sorted.rows, vec!["C", "B", "A"]);
    }

    fn share_delta(renewable: f64, fossil: f64, other: f64) -> ShareTotals {
        ShareTotals {
            renewable,
            fossil,
            other,
        }
    }

    #[test]
    fn share_sensitivity_drops_scenarios_without_decrease() {
        let per_run = vec![
            (
                "Low".to_string(),
                vec![
                    ("A".to_string(), share_delta(5.0, -5.0, 0.0)),
                    ("B".to_string(), share_delta(1.0, 0.0, 0.0)),
                ],
            ),
            ("High".to_string(), vec![("A".to_string(), share_delta(2.0, -1.0, -1.0))]),
        ];
        let shares = DeltaCalculator::share_sensitivity(&per_run);
        assert_eq!(shares.scenarios, vec!["A"]);
        assert_eq!(shares.runs.len(), 2);
        assert_eq!(shares.runs[1].1.decrease.values, vec![vec![0.0, -1.0, -1.0]]);
    }
}
