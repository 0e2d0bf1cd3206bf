//! Data Processor Module
//! Reshapes model result frames into keyed observations.

use super::delta::Matrix;
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// PJ in one TWh.
pub const PJ_PER_TWH: f64 = 3.6;

const RENEWABLE_METRIC: &str = "Renewable energy share";
const FOSSIL_METRIC: &str = "Fossil energy share";

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Metric '{0}' missing from headline metrics")]
    MissingMetric(String),
}

/// One `(technology, region, year, value)` tuple. Absent dimensions are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub tech: Option<String>,
    pub region: Option<String>,
    pub year: Option<i32>,
    pub value: f64,
}

impl Observation {
    pub fn new(tech: Option<&str>, region: Option<&str>, year: Option<i32>, value: f64) -> Self {
        Self {
            tech: tech.map(str::to_string),
            region: region.map(str::to_string),
            year,
            value,
        }
    }

    /// Country part of the region, which may be a country or a node code.
    pub fn country(&self) -> Option<&str> {
        self.region.as_deref().and_then(|r| r.get(0..3))
    }
}

/// Granularity at which technology codes are split into regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionLevel {
    Country,
    Node,
}

/// Observation field that becomes the stacked layer of a year matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackBy {
    Tech,
    Region,
}

/// Generation shares for one year, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShareRow {
    pub year: i32,
    pub renewable: f64,
    pub fossil: f64,
    pub other: f64,
}

impl ShareRow {
    pub fn new(year: i32, renewable: f64, fossil: f64) -> Self {
        Self {
            year,
            renewable,
            fossil,
            other: 100.0 - renewable - fossil,
        }
    }
}

/// Horizon-wide generation shares from the headline metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShareTotals {
    pub renewable: f64,
    pub fossil: f64,
    pub other: f64,
}

impl ShareTotals {
    pub fn new(renewable: f64, fossil: f64) -> Self {
        Self {
            renewable,
            fossil,
            other: 100.0 - renewable - fossil,
        }
    }

    /// `self - base`, component-wise.
    pub fn delta(&self, base: &ShareTotals) -> ShareTotals {
        ShareTotals {
            renewable: self.renewable - base.renewable,
            fossil: self.fossil - base.fossil,
            other: self.other - base.other,
        }
    }

    /// `(label, value)` in stacking order.
    pub fn components(&self) -> [(&'static str, f64); 3] {
        [
            ("Renewable", self.renewable),
            ("Fossil", self.fossil),
            ("Other", self.other),
        ]
    }
}

/// Built and maximum transmission capacity of a scenario's projects.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransmissionCapacity {
    pub built: f64,
    pub max: f64,
}

/// Map marker position for a node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePoint {
    pub region: String,
    pub lat: f64,
    pub long: f64,
}

/// Handles reshaping of result frames into observations.
pub struct DataProcessor;

impl DataProcessor {
    fn str_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, ProcessorError> {
        let column = df.column(name)?.cast(&DataType::String)?;
        let ca = column.str()?;
        Ok(ca
            .into_iter()
            .map(|v| v.map(|s| s.trim_matches('"').to_string()))
            .collect())
    }

    fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, ProcessorError> {
        let column = df.column(name)?.cast(&DataType::Float64)?;
        let ca = column.f64()?;
        Ok(ca.into_iter().map(|v| v.filter(|x| !x.is_nan())).collect())
    }

    fn year_column(df: &DataFrame) -> Result<Vec<Option<i32>>, ProcessorError> {
        let column = df.column("YEAR")?.cast(&DataType::Int32)?;
        let ca = column.i32()?;
        Ok(ca.into_iter().collect())
    }

    /// Sum observations that share the same key.
    pub fn group_sum(observations: Vec<Observation>) -> Vec<Observation> {
        let mut grouped: BTreeMap<(Option<String>, Option<String>, Option<i32>), f64> =
            BTreeMap::new();
        for obs in observations {
            *grouped.entry((obs.tech, obs.region, obs.year)).or_insert(0.0) += obs.value;
        }
        grouped
            .into_iter()
            .map(|((tech, region, year), value)| Observation {
                tech,
                region,
                year,
                value,
            })
            .collect()
    }

    /// Power technologies from a `TECHNOLOGY` column such as `PWRCOABWAXX01`.
    ///
    /// Transmission (`TRN`) technologies are dropped; the technology code is
    /// characters 3..6 and the country (or node) starts at character 6.
    pub fn technology_observations(
        df: &DataFrame,
        level: RegionLevel,
    ) -> Result<Vec<Observation>, ProcessorError> {
        let techs = Self::str_values(df, "TECHNOLOGY")?;
        let years = Self::year_column(df)?;
        let values = Self::f64_values(df, "VALUE")?;
        let region_end = match level {
            RegionLevel::Country => 9,
            RegionLevel::Node => 11,
        };

        let mut observations = Vec::new();
        for ((tech, year), value) in techs.iter().zip(years).zip(values) {
            let (Some(code), Some(year), Some(value)) = (tech, year, value) else {
                continue;
            };
            if !code.starts_with("PWR") || code.contains("TRN") {
                continue;
            }
            if let (Some(tech), Some(region)) = (code.get(3..6), code.get(6..region_end)) {
                observations.push(Observation::new(Some(tech), Some(region), Some(year), value));
            }
        }

        Ok(Self::group_sum(observations))
    }

    /// Summary files already split into `TECH` and `COUNTRY` columns.
    pub fn capacity_observations(df: &DataFrame) -> Result<Vec<Observation>, ProcessorError> {
        let techs = Self::str_values(df, "TECH")?;
        let countries = Self::str_values(df, "COUNTRY")?;
        let years = Self::year_column(df)?;
        let values = Self::f64_values(df, "VALUE")?;

        let observations = techs
            .into_iter()
            .zip(countries)
            .zip(years.into_iter().zip(values))
            .filter_map(|((tech, country), (year, value))| {
                Some(Observation {
                    tech: Some(tech?),
                    region: Some(country?),
                    year: Some(year?),
                    value: value?,
                })
            })
            .collect();

        Ok(Self::group_sum(observations))
    }

    /// Emissions keyed by the country embedded in the `EMISSION` code
    /// (`CO2BWA` -> `BWA`).
    pub fn emission_observations(df: &DataFrame) -> Result<Vec<Observation>, ProcessorError> {
        Self::coded_region_observations(df, "EMISSION")
    }

    /// Demand keyed by the country embedded in the `FUEL` code
    /// (`ELCBWAXX02` -> `BWA`).
    pub fn demand_observations(df: &DataFrame) -> Result<Vec<Observation>, ProcessorError> {
        Self::coded_region_observations(df, "FUEL")
    }

    fn coded_region_observations(
        df: &DataFrame,
        code_col: &str,
    ) -> Result<Vec<Observation>, ProcessorError> {
        let codes = Self::str_values(df, code_col)?;
        let years = Self::year_column(df)?;
        let values = Self::f64_values(df, "VALUE")?;

        let observations = codes
            .iter()
            .zip(years)
            .zip(values)
            .filter_map(|((code, year), value)| {
                let country = code.as_deref()?.get(3..6)?;
                Some(Observation::new(None, Some(country), Some(year?), value?))
            })
            .collect();

        Ok(Self::group_sum(observations))
    }

    /// Emission limits labelled by the emission code with `CO2` removed.
    pub fn emission_limits(
        df: &DataFrame,
    ) -> Result<Vec<Observation>, ProcessorError> {
        let codes = Self::str_values(df, "EMISSION")?;
        let years = Self::year_column(df)?;
        let values = Self::f64_values(df, "VALUE")?;

        let observations = codes
            .into_iter()
            .zip(years)
            .zip(values)
            .filter_map(|((code, year), value)| {
                let label = code?.replace("CO2", "");
                Some(Observation::new(Some(label.as_str()), None, Some(year?), value?))
            })
            .collect();

        Ok(Self::group_sum(observations))
    }

    /// `YEAR, VALUE` series, summed per year.
    pub fn year_values(df: &DataFrame) -> Result<Vec<Observation>, ProcessorError> {
        let years = Self::year_column(df)?;
        let values = Self::f64_values(df, "VALUE")?;

        let observations = years
            .into_iter()
            .zip(values)
            .filter_map(|(year, value)| Some(Observation::new(None, None, Some(year?), value?)))
            .collect();

        Ok(Self::group_sum(observations))
    }

    /// `COUNTRY, YEAR, VALUE` series.
    pub fn country_year_values(
        df: &DataFrame,
    ) -> Result<Vec<Observation>, ProcessorError> {
        let countries = Self::str_values(df, "COUNTRY")?;
        let years = Self::year_column(df)?;
        let values = Self::f64_values(df, "VALUE")?;

        let observations = countries
            .into_iter()
            .zip(years)
            .zip(values)
            .filter_map(|((country, year), value)| {
                Some(Observation {
                    tech: None,
                    region: Some(country?),
                    year: Some(year?),
                    value: value?,
                })
            })
            .collect();

        Ok(Self::group_sum(observations))
    }

    /// Generation shares per year, optionally for one country.
    pub fn generation_shares(
        df: &DataFrame,
        country: Option<&str>,
    ) -> Result<Vec<ShareRow>, ProcessorError> {
        let df = match country {
            Some(country) => df
                .clone()
                .lazy()
                .filter(col("COUNTRY").cast(DataType::String).eq(lit(country)))
                .collect()?,
            None => df.clone(),
        };

        let years = Self::year_column(&df)?;
        let renewable = Self::f64_values(&df, "RENEWABLE")?;
        let fossil = Self::f64_values(&df, "FOSSIL")?;

        let mut by_year: BTreeMap<i32, (f64, f64)> = BTreeMap::new();
        for ((year, r), f) in years.into_iter().zip(renewable).zip(fossil) {
            if let (Some(year), Some(r), Some(f)) = (year, r, f) {
                let entry = by_year.entry(year).or_insert((0.0, 0.0));
                entry.0 += r;
                entry.1 += f;
            }
        }

        Ok(by_year
            .into_iter()
            .map(|(year, (r, f))| ShareRow::new(year, r, f))
            .collect())
    }

    /// Renewable and fossil shares from a `Metric, Unit, Value` table.
    pub fn headline_shares(df: &DataFrame) -> Result<ShareTotals, ProcessorError> {
        let metrics = Self::str_values(df, "Metric")?;
        let values = Self::f64_values(df, "Value")?;

        let lookup = |name: &str| -> Result<f64, ProcessorError> {
            metrics
                .iter()
                .zip(&values)
                .find_map(|(m, v)| match (m.as_deref(), v) {
                    (Some(m), Some(v)) if m == name => Some(*v),
                    _ => None,
                })
                .ok_or_else(|| ProcessorError::MissingMetric(name.to_string()))
        };

        Ok(ShareTotals::new(lookup(RENEWABLE_METRIC)?, lookup(FOSSIL_METRIC)?))
    }

    /// Transmission capacity built for the given technologies over the horizon,
    /// against the first non-zero maximum investment of each technology.
    pub fn transmission_capacity(
        new_capacity: &DataFrame,
        max_investment: &DataFrame,
        techs: &[String],
    ) -> Result<TransmissionCapacity, ProcessorError> {
        let mut capacity = TransmissionCapacity::default();

        let built_techs = Self::str_values(new_capacity, "TECHNOLOGY")?;
        let built_values = Self::f64_values(new_capacity, "VALUE")?;
        for (tech, value) in built_techs.iter().zip(built_values) {
            if let (Some(tech), Some(value)) = (tech, value) {
                if techs.contains(tech) {
                    capacity.built += value;
                }
            }
        }

        let max_techs = Self::str_values(max_investment, "TECHNOLOGY")?;
        let max_years = Self::year_column(max_investment)?;
        let max_values = Self::f64_values(max_investment, "VALUE")?;
        let mut first_limit: BTreeMap<&str, (i32, f64)> = BTreeMap::new();
        for ((tech, year), value) in max_techs.iter().zip(max_years).zip(max_values) {
            let (Some(tech), Some(year), Some(value)) = (tech, year, value) else {
                continue;
            };
            if value == 0.0 || !techs.contains(tech) {
                continue;
            }
            let entry = first_limit.entry(tech.as_str()).or_insert((year, value));
            if year < entry.0 {
                *entry = (year, value);
            }
        }
        capacity.max = first_limit.values().map(|(_, v)| v).sum();

        Ok(capacity)
    }

    /// Node coordinates, restricted to `nodes` unless it is empty.
    pub fn node_points(df: &DataFrame, nodes: &[String]) -> Result<Vec<NodePoint>, ProcessorError> {
        let regions = Self::str_values(df, "region")?;
        let lats = Self::f64_values(df, "lat")?;
        let longs = Self::f64_values(df, "long")?;

        let mut points: Vec<NodePoint> = regions
            .into_iter()
            .zip(lats)
            .zip(longs)
            .filter_map(|((region, lat), long)| {
                Some(NodePoint {
                    region: region?,
                    lat: lat?,
                    long: long?,
                })
            })
            .filter(|p| nodes.is_empty() || nodes.contains(&p.region))
            .collect();

        points.sort_by(|a, b| a.region.cmp(&b.region));
        Ok(points)
    }

    /// Scale every value, e.g. PJ to TWh.
    pub fn scale(mut observations: Vec<Observation>, factor: f64) -> Vec<Observation> {
        for obs in &mut observations {
            obs.value *= factor;
        }
        observations
    }

    pub fn convert_pj_to_twh(observations: Vec<Observation>) -> Vec<Observation> {
        Self::scale(observations, 1.0 / PJ_PER_TWH)
    }

    pub fn convert_million_to_billion(observations: Vec<Observation>) -> Vec<Observation> {
        Self::scale(observations, 1.0 / 1000.0)
    }

    /// Observations whose region belongs to `country` (country or node level).
    pub fn filter_country(observations: &[Observation], country: &str) -> Vec<Observation> {
        observations
            .iter()
            .filter(|o| o.country() == Some(country))
            .cloned()
            .collect()
    }

    /// Observations whose region belongs to any of `countries`.
    pub fn filter_countries(observations: &[Observation], countries: &[String]) -> Vec<Observation> {
        observations
            .iter()
            .filter(|o| o.country().is_some_and(|c| countries.iter().any(|k| k == c)))
            .cloned()
            .collect()
    }

    /// Years x layers, summed and zero-filled over `years`. Layers are sorted
    /// and only include those with an observation inside `years`.
    pub fn year_matrix(observations: &[Observation], years: &[i32], stack: StackBy) -> Matrix {
        let layer = |o: &Observation| match stack {
            StackBy::Tech => o.tech.clone(),
            StackBy::Region => o.region.clone(),
        };
        let cells: Vec<(usize, String, f64)> = observations
            .iter()
            .filter_map(|o| {
                let row = years.iter().position(|y| Some(*y) == o.year)?;
                Some((row, layer(o)?, o.value))
            })
            .collect();
        let columns: Vec<String> = cells
            .iter()
            .map(|(_, name, _)| name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut matrix = Matrix::zeros(years.iter().map(|y| y.to_string()).collect(), columns);
        for (r, name, value) in cells {
            if let Some(c) = matrix.columns.iter().position(|n| *n == name) {
                matrix.values[r][c] += value;
            }
        }
        matrix
    }

    /// Yearly totals zero-filled over `years`.
    pub fn year_series(observations: &[Observation], years: &[i32]) -> Vec<f64> {
        years
            .iter()
            .map(|year| {
                observations
                    .iter()
                    .filter(|o| o.year == Some(*year))
                    .map(|o| o.value)
                    .sum()
            })
            .collect()
    }

    /// Years x {Renewable, Fossil, Other}; years without a row are zero.
    pub fn shares_by_year(rows: &[ShareRow], years: &[i32]) -> Matrix {
        let columns = ["Renewable", "Fossil", "Other"].map(String::from).to_vec();
        let mut matrix = Matrix::zeros(years.iter().map(|y| y.to_string()).collect(), columns);
        for row in rows {
            if let Some(r) = years.iter().position(|y| *y == row.year) {
                matrix.values[r] = vec![row.renewable, row.fossil, row.other];
            }
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn technology_frame() -> DataFrame {
        df! {
            "REGION" => ["GLOBAL", "GLOBAL", "GLOBAL", "GLOBAL", "GLOBAL"],
            "TECHNOLOGY" => [
                "PWRCOABWAXX01",
                "PWRCOABWAXX02",
                "PWRSPVZWEXX01",
                "PWRTRNBWAXXZWEXX",
                "MINCOABWA",
            ],
            "YEAR" => [2023i64, 2023, 2024, 2023, 2023],
            "VALUE" => [3.5, 7.25, 1.0, 5.0, 9.0],
        }
        .unwrap()
    }

    #[test]
    fn technology_codes_are_split() {
        let obs =
            DataProcessor::technology_observations(&technology_frame(), RegionLevel::Country)
                .unwrap();
        assert_eq!(
            obs,
            vec![
                Observation::new(Some("COA"), Some("BWA"), Some(2023), 10.75),
                Observation::new(Some("SPV"), Some("ZWE"), Some(2024), 1.0),
            ]
        );
    }

    #[test]
    fn node_level_keeps_node_suffix() {
        let obs =
            DataProcessor::technology_observations(&technology_frame(), RegionLevel::Node)
                .unwrap();
        assert_eq!(obs[0].region.as_deref(), Some("BWAXX"));
        assert_eq!(obs[0].country(), Some("BWA"));
    }

    #[test]
    fn pj_to_twh() {
        let obs = vec![Observation::new(Some("COA"), None, Some(2023), 36.0)];
        let converted = DataProcessor::convert_pj_to_twh(obs);
        assert!((converted[0].value - 10.0).abs() < 1e-9);
    }

    #[test]
    fn emissions_take_country_from_code() {
        let df = df! {
            "REGION" => ["GLOBAL", "GLOBAL", "GLOBAL"],
            "EMISSION" => ["CO2BWA", "CO2BWA", "CO2ZWE"],
            "YEAR" => [2023i64, 2023, 2023],
            "VALUE" => [1.0, 2.0, 4.0],
        }
        .unwrap();
        let obs = DataProcessor::emission_observations(&df).unwrap();
        assert_eq!(
            obs,
            vec![
                Observation::new(None, Some("BWA"), Some(2023), 3.0),
                Observation::new(None, Some("ZWE"), Some(2023), 4.0),
            ]
        );
    }

    #[test]
    fn generation_shares_derive_other() {
        let df = df! {
            "COUNTRY" => ["BWA", "BWA", "ZWE"],
            "YEAR" => [2023i64, 2024, 2023],
            "RENEWABLE" => [20.0, 30.0, 80.0],
            "FOSSIL" => [70.0, 60.0, 15.0],
        }
        .unwrap();
        let shares = DataProcessor::generation_shares(&df, Some("BWA")).unwrap();
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0], ShareRow::new(2023, 20.0, 70.0));
        assert!((shares[0].other - 10.0).abs() < 1e-9);
        assert!((shares[1].other - 10.0).abs() < 1e-9);
    }

    #[test]
    fn headline_shares_read_metric_rows() {
        let df = df! {
            "Metric" => ["Total cost", "Renewable energy share", "Fossil energy share"],
            "Unit" => ["$", "%", "%"],
            "Value" => [100.0, 45.0, 50.0],
        }
        .unwrap();
        let shares = DataProcessor::headline_shares(&df).unwrap();
        assert_eq!(shares, ShareTotals::new(45.0, 50.0));
        assert!((shares.other - 5.0).abs() < 1e-9);
    }

    #[test]
    fn headline_shares_require_both_metrics() {
        let df = df! {
            "Metric" => ["Renewable energy share"],
            "Unit" => ["%"],
            "Value" => [45.0],
        }
        .unwrap();
        assert!(matches!(
            DataProcessor::headline_shares(&df),
            Err(ProcessorError::MissingMetric(m)) if m == FOSSIL_METRIC
        ));
    }

    #[test]
    fn transmission_capacity_sums_projects() {
        let new_capacity = df! {
            "TECHNOLOGY" => ["TRNBWAXXZWEXX", "TRNBWAXXZWEXX", "TRNZMBXXZWEXX"],
            "YEAR" => [2025i64, 2030, 2030],
            "VALUE" => [0.5, 0.25, 2.0],
        }
        .unwrap();
        let max_investment = df! {
            "TECHNOLOGY" => ["TRNBWAXXZWEXX", "TRNBWAXXZWEXX", "TRNBWAXXZWEXX"],
            "YEAR" => [2023i64, 2024, 2025],
            "VALUE" => [0.0, 1.5, 3.0],
        }
        .unwrap();
        let techs = vec!["TRNBWAXXZWEXX".to_string()];
        let capacity =
            DataProcessor::transmission_capacity(&new_capacity, &max_investment, &techs).unwrap();
        assert_eq!(capacity, TransmissionCapacity { built: 0.75, max: 1.5 });
    }

    #[test]
    fn node_points_are_filtered_and_sorted() {
        let df = df! {
            "region" => ["ZWEXX", "BWAXX", "ZMBXX"],
            "lat" => [-19.0, -22.0, -13.0],
            "long" => [29.0, 24.0, 27.0],
        }
        .unwrap();
        let nodes = vec!["ZWEXX".to_string(), "BWAXX".to_string()];
        let points = DataProcessor::node_points(&df, &nodes).unwrap();
        let regions: Vec<&str> = points.iter().map(|p| p.region.as_str()).collect();
        assert_eq!(regions, vec!["BWAXX", "ZWEXX"]);
    }

    #[test]
    fn year_matrix_zero_fills_horizon() {
        let obs = vec![
            Observation::new(Some("SPV"), Some("BWA"), Some(2024), 2.0),
            Observation::new(Some("COA"), Some("BWA"), Some(2023), 1.0),
            Observation::new(Some("COA"), Some("ZWE"), Some(2023), 3.0),
            Observation::new(Some("COA"), Some("ZWE"), Some(2060), 9.0),
        ];
        let years = [2023, 2024, 2025];
        let by_tech = DataProcessor::year_matrix(&obs, &years, StackBy::Tech);
        assert_eq!(by_tech.columns, vec!["COA", "SPV"]);
        assert_eq!(
            by_tech.values,
            vec![vec![4.0, 0.0], vec![0.0, 2.0], vec![0.0, 0.0]]
        );

        let by_region = DataProcessor::year_matrix(&obs, &years, StackBy::Region);
        assert_eq!(by_region.columns, vec!["BWA", "ZWE"]);
        assert_eq!(DataProcessor::year_series(&obs, &years), vec![4.0, 2.0, 0.0]);
    }

    #[test]
    fn year_matrix_ignores_layers_outside_horizon() {
        let obs = vec![
            Observation::new(Some("SPV"), Some("BWA"), Some(2023), 1.0),
            Observation::new(Some("WON"), Some("BWA"), Some(2055), 5.0),
            Observation::new(Some("HYD"), Some("ZMB"), None, 2.0),
        ];
        let matrix = DataProcessor::year_matrix(&obs, &[2023, 2024], StackBy::Tech);
        assert_eq!(matrix.columns, vec!["SPV"]);
        assert_eq!(matrix.values, vec![vec![1.0], vec![0.0]]);

        let regions = DataProcessor::year_matrix(&obs, &[2023, 2024], StackBy::Region);
        assert_eq!(regions.columns, vec!["BWA"]);
    }

    #[test]
    fn shares_by_year_fills_missing_years() {
        let rows = vec![ShareRow::new(2024, 40.0, 50.0)];
        let matrix = DataProcessor::shares_by_year(&rows, &[2023, 2024]);
        assert_eq!(matrix.values[0], vec![0.0, 0.0, 0.0]);
        assert_eq!(matrix.values[1], vec![40.0, 50.0, 10.0]);
    }

    #[test]
    fn filter_countries_matches_node_prefix() {
        let obs = vec![
            Observation::new(Some("COA"), Some("BWAXX"), Some(2023), 1.0),
            Observation::new(Some("COA"), Some("ZMBXX"), Some(2023), 1.0),
        ];
        let kept = DataProcessor::filter_countries(&obs, &["BWA".to_string()]);
        assert_eq!(kept.len(), 1);
        assert_eq!(DataProcessor::filter_country(&obs, "ZMB").len(), 1);
    }
}
