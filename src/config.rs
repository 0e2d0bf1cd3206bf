//! Chart Configuration Module
//! TOML-based run selection, geography and chart toggles.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration parsed from TOML.
///
/// Every field has a default; a minimal file only needs `results_folder`,
/// `countries` and the chart toggles it wants enabled.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Folder holding one sub-folder per run (`Base`, each scenario).
    pub results_folder: PathBuf,
    /// Root of the figure tree.
    pub output_root: PathBuf,
    /// Name of the figure folder below `output_root`.
    pub figures_folder: String,
    /// Name of the base run folder.
    pub base: String,
    pub start_year: i32,
    pub end_year: i32,
    pub countries: Vec<String>,
    /// Scenario name -> transmission technologies assessed in it.
    pub scenarios: BTreeMap<String, Vec<String>>,
    /// Scenario name -> countries that need node-level delta charts.
    pub nodal_results: BTreeMap<String, Vec<String>>,
    /// Compute deltas for the whole system instead of only the countries
    /// connected by a scenario's transmission projects.
    pub system_delta: bool,
    /// Order multi-scenario axes by delta size instead of alphabetically.
    pub axis_sort_delta: bool,
    pub map: MapConfig,
    pub charts: ChartToggles,
    pub colors: ColorConfig,
    pub sensitivities: SensitivityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            results_folder: PathBuf::from("results"),
            output_root: PathBuf::from("Figures"),
            figures_folder: "Model".to_string(),
            base: "Base".to_string(),
            start_year: 2023,
            end_year: 2050,
            countries: Vec::new(),
            scenarios: BTreeMap::new(),
            nodal_results: BTreeMap::new(),
            system_delta: true,
            axis_sort_delta: false,
            map: MapConfig::default(),
            charts: ChartToggles::default(),
            colors: ColorConfig::default(),
            sensitivities: SensitivityConfig::default(),
        }
    }
}

impl Config {
    /// Load and validate a configuration file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(text)?;
        config.colors = config.colors.over_defaults();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_year > self.end_year {
            return Err(ConfigError::Invalid(format!(
                "start_year {} is after end_year {}",
                self.start_year, self.end_year
            )));
        }
        if self.countries.is_empty() {
            return Err(ConfigError::Invalid("countries must not be empty".into()));
        }
        if let Some(code) = self.countries.iter().find(|c| c.len() != 3) {
            return Err(ConfigError::Invalid(format!(
                "country code '{code}' must have three letters"
            )));
        }
        if self.figures_folder.trim().is_empty() {
            return Err(ConfigError::Invalid("figures_folder must not be empty".into()));
        }
        if let Some(scenario) = self
            .nodal_results
            .keys()
            .find(|s| !self.scenarios.contains_key(*s))
        {
            return Err(ConfigError::Invalid(format!(
                "nodal_results names unknown scenario '{scenario}'"
            )));
        }
        let [lon_min, lon_max, lat_min, lat_max] = self.map.extent;
        if lon_min >= lon_max || lat_min >= lat_max {
            return Err(ConfigError::Invalid(format!(
                "map.extent {:?} must be [lon_min, lon_max, lat_min, lat_max] with min < max",
                self.map.extent
            )));
        }
        if let Some(reference) = &self.sensitivities.reference {
            if !self.sensitivities.runs.iter().any(|r| &r.name == reference) {
                return Err(ConfigError::Invalid(format!(
                    "sensitivity reference '{reference}' is not a configured run"
                )));
            }
        }
        Ok(())
    }

    pub fn horizon(&self) -> RangeInclusive<i32> {
        self.start_year..=self.end_year
    }

    pub fn years(&self) -> Vec<i32> {
        self.horizon().collect()
    }

    /// Folder of a run below `results_folder`.
    pub fn run_dir(&self, run: &str) -> PathBuf {
        self.results_folder.join(run)
    }

    /// Countries a scenario's deltas are restricted to, or `None` for the
    /// whole system.
    pub fn delta_countries(&self, scenario: &str) -> Option<Vec<String>> {
        if self.system_delta {
            return None;
        }
        let techs = self.scenarios.get(scenario)?;
        Some(project_countries(techs))
    }

    /// Run used to order sensitivity axes.
    pub fn sensitivity_reference(&self) -> Option<&str> {
        self.sensitivities
            .reference
            .as_deref()
            .or_else(|| self.sensitivities.runs.first().map(|r| r.name.as_str()))
    }
}

/// Countries connected by transmission technologies such as `TRNBWAXXZWEXX`.
pub fn project_countries(techs: &[String]) -> Vec<String> {
    let mut countries: Vec<String> = techs
        .iter()
        .filter(|t| t.starts_with("TRN"))
        .flat_map(|t| [t.get(3..6), t.get(8..11)])
        .flatten()
        .map(str::to_string)
        .collect();
    countries.sort();
    countries.dedup();
    countries
}

/// Spatial map settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    /// CSV with `region,lat,long` columns.
    pub nodes_file: Option<PathBuf>,
    /// Nodes to draw; empty draws every node in the file.
    pub nodes: Vec<String>,
    /// `[lon_min, lon_max, lat_min, lat_max]`.
    pub extent: [f64; 4],
    pub label: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            nodes_file: None,
            nodes: Vec::new(),
            extent: [5.0, 45.0, -35.0, 10.0],
            label: String::new(),
        }
    }
}

/// Chart toggles, grouped the way the output tree is grouped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartToggles {
    pub base_run: BaseRunCharts,
    pub scenario_comparison: ScenarioCharts,
    pub multi_scenario: MultiScenarioCharts,
    pub sensitivities: SensitivityCharts,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BaseRunCharts {
    pub pwr_cap_bar_global: bool,
    pub pwr_cap_bar_country: bool,
    pub pwr_gen_bar_global: bool,
    pub pwr_gen_bar_country: bool,
    pub pwr_gen_shares_global: bool,
    pub pwr_gen_shares_country: bool,
    pub dual_costs_global: bool,
    pub dual_costs_country: bool,
    pub pwr_costs_multi_country: bool,
    pub dual_emissions_global: bool,
    pub dual_emissions_country: bool,
    pub dual_emissions_stacked: bool,
    pub demand_stacked: bool,
    pub emissions_limit: bool,
    pub spatial_map: bool,
    pub multi_plot_cap_gen_genshares_emissions: bool,
    pub multi_plot_country_charts: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioCharts {
    pub pwr_cap_bar_dif_global: bool,
    pub pwr_gen_bar_dif_global: bool,
    pub pwr_cap_bar_dif_country: bool,
    pub pwr_gen_bar_dif_country: bool,
    pub pwr_cap_bar_dif_node: bool,
    pub pwr_gen_bar_dif_node: bool,
    pub costs_dif_global: bool,
    pub emissions_dif_global: bool,
    pub emissions_dif_country: bool,
    pub pwr_gen_shares_dif_global: bool,
    pub headline_metrics: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MultiScenarioCharts {
    pub emissions_dif: bool,
    pub costs_dif: bool,
    pub gen_shares_dif: bool,
    pub capacity_dif: bool,
    pub generation_dif: bool,
    pub transmission_capacity: bool,
    pub multi_plot_scen_comparison: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SensitivityCharts {
    pub emissions_dif: bool,
    pub costs_dif: bool,
    pub gen_shares_dif: bool,
    pub transmission_capacity: bool,
    /// Primary results next to every sensitivity run, per scenario.
    pub geo_sensitivity: bool,
    pub multi_plot_sensitivities: bool,
}

/// Sensitivity runs compared side by side.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SensitivityConfig {
    /// Run whose deltas order the axis when `axis_sort_delta` is set.
    pub reference: Option<String>,
    pub runs: Vec<SensitivityRun>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensitivityRun {
    pub name: String,
    /// Folder laid out like `results_folder` (base plus scenario runs).
    pub results_folder: PathBuf,
    #[serde(default = "default_run_color")]
    pub color: String,
}

fn default_run_color() -> String {
    "grey".to_string()
}

/// Colour maps; values are matplotlib colour names or `#rrggbb`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub technology: BTreeMap<String, String>,
    pub gen_shares: BTreeMap<String, String>,
    pub dual_costs: BTreeMap<String, String>,
    pub dual_emissions: BTreeMap<String, String>,
    pub transmission: BTreeMap<String, String>,
    pub countries: BTreeMap<String, String>,
}

impl ColorConfig {
    /// Configured entries layered over the built-in maps.
    fn over_defaults(self) -> Self {
        let merge = |mut base: BTreeMap<String, String>, user: BTreeMap<String, String>| {
            base.extend(user);
            base
        };
        let defaults = Self::default();
        Self {
            technology: merge(defaults.technology, self.technology),
            gen_shares: merge(defaults.gen_shares, self.gen_shares),
            dual_costs: merge(defaults.dual_costs, self.dual_costs),
            dual_emissions: merge(defaults.dual_emissions, self.dual_emissions),
            transmission: merge(defaults.transmission, self.transmission),
            countries: merge(defaults.countries, self.countries),
        }
    }
}

fn color_map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            technology: color_map(&[
                ("BIO", "darkgreen"),
                ("CCG", "brown"),
                ("CCS", "khaki"),
                ("COA", "black"),
                ("GEO", "darkseagreen"),
                ("HYD", "dodgerblue"),
                ("OCG", "lightsalmon"),
                ("OIL", "lightgrey"),
                ("SPV", "gold"),
                ("URN", "mediumseagreen"),
                ("WAS", "darkkhaki"),
                ("WOF", "violet"),
                ("WON", "blueviolet"),
                ("SDS", "navy"),
            ]),
            gen_shares: color_map(&[
                ("Fossil", "lightcoral"),
                ("Renewable", "palegreen"),
                ("Other", "lightgrey"),
            ]),
            dual_costs: color_map(&[("bar", "cadetblue"), ("line", "lightcoral")]),
            dual_emissions: color_map(&[("bar", "navy"), ("line", "lightcoral")]),
            transmission: color_map(&[("new", "maroon"), ("max", "aqua")]),
            countries: color_map(&[
                ("BRN", "darkgreen"),
                ("IDN", "lightcoral"),
                ("KHM", "black"),
                ("LAO", "peru"),
                ("MMR", "dodgerblue"),
                ("MYS", "firebrick"),
                ("PHL", "lightgrey"),
                ("SGP", "navy"),
                ("THA", "violet"),
                ("VNM", "gold"),
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
        results_folder = "runs"
        figures_folder = "ZiZaBoNa"
        countries = ["BWA", "ZMB", "ZWE"]

        [scenarios]
        BWAXXZWEXX = ["TRNBWAXXZWEXX"]

        [charts.base_run]
        pwr_cap_bar_global = true
    "#;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.base, "Base");
        assert_eq!(config.start_year, 2023);
        assert_eq!(config.end_year, 2050);
        assert!(config.system_delta);
        assert!(config.charts.base_run.pwr_cap_bar_global);
        assert!(!config.charts.base_run.pwr_gen_bar_global);
        assert_eq!(config.colors.technology.get("SPV").unwrap(), "gold");
        assert_eq!(config.run_dir("Base"), PathBuf::from("runs/Base"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let text = format!("{MINIMAL}\nunknown_flag = true\n");
        assert!(matches!(
            Config::from_toml_str(&text),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn unknown_chart_toggle_is_rejected() {
        let text = r#"
            countries = ["BWA"]
            [charts.base_run]
            pwr_cap_bar_globl = true
        "#;
        assert!(Config::from_toml_str(text).is_err());
    }

    #[test]
    fn inverted_horizon_is_invalid() {
        let text = r#"
            countries = ["BWA"]
            start_year = 2050
            end_year = 2023
        "#;
        assert!(matches!(
            Config::from_toml_str(text),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn empty_countries_is_invalid() {
        assert!(matches!(
            Config::from_toml_str("base = \"Base\""),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn nodal_results_must_name_a_scenario() {
        let text = r#"
            countries = ["BWA"]
            [nodal_results]
            MISSING = ["BWA"]
        "#;
        assert!(matches!(
            Config::from_toml_str(text),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn sensitivity_reference_must_exist() {
        let text = r#"
            countries = ["BWA"]
            [sensitivities]
            reference = "High"
            [[sensitivities.runs]]
            name = "Low"
            results_folder = "low"
        "#;
        assert!(Config::from_toml_str(text).is_err());
    }

    #[test]
    fn sensitivity_reference_defaults_to_first_run() {
        let text = r#"
            countries = ["BWA"]
            [[sensitivities.runs]]
            name = "Low"
            results_folder = "low"
            color = "navy"
            [[sensitivities.runs]]
            name = "High"
            results_folder = "high"
        "#;
        let config = Config::from_toml_str(text).unwrap();
        assert_eq!(config.sensitivity_reference(), Some("Low"));
        assert_eq!(config.sensitivities.runs[1].color, "grey");
    }

    #[test]
    fn project_countries_come_from_transmission_codes() {
        let techs = vec![
            "TRNBWAXXZWEXX".to_string(),
            "TRNZMBXXZWEXX".to_string(),
            "PWRCOABWAXX01".to_string(),
        ];
        assert_eq!(project_countries(&techs), vec!["BWA", "ZMB", "ZWE"]);
    }

    #[test]
    fn delta_countries_respect_system_delta() {
        let mut config = Config::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.delta_countries("BWAXXZWEXX"), None);
        config.system_delta = false;
        assert_eq!(
            config.delta_countries("BWAXXZWEXX"),
            Some(vec!["BWA".to_string(), "ZWE".to_string()])
        );
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();
        let config = Config::from_toml_file(file.path()).unwrap();
        assert_eq!(config.countries.len(), 3);
        assert_eq!(config.years().len(), 28);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Config::from_toml_file(Path::new("/nonexistent/charts.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/charts.toml"));
    }

    #[test]
    fn bundled_example_is_valid() {
        let config = Config::from_toml_str(include_str!("../config/example.toml")).unwrap();
        assert_eq!(config.scenarios.len(), 2);
        assert_eq!(config.sensitivity_reference(), Some("Reference"));
        assert!(config.charts.multi_scenario.capacity_dif);
    }

    #[test]
    fn inverted_map_extent_is_invalid() {
        let text = format!("{MINIMAL}\n[map]\nextent = [40.0, 10.0, -35.0, -4.0]\n");
        let err = Config::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("map.extent")));

        let flat = format!("{MINIMAL}\n[map]\nextent = [10.0, 40.0, -4.0, -4.0]\n");
        assert!(Config::from_toml_str(&flat).is_err());
    }

    #[test]
    fn colour_tables_merge_over_defaults() {
        let text = format!("{MINIMAL}\n[colors.technology]\nSPV = \"orange\"\nNEW = \"teal\"\n");
        let config = Config::from_toml_str(&text).unwrap();
        let technology = &config.colors.technology;
        assert_eq!(technology.get("SPV").map(String::as_str), Some("orange"));
        assert_eq!(technology.get("NEW").map(String::as_str), Some("teal"));
        assert_eq!(technology.get("COA").map(String::as_str), Some("black"));
        assert_eq!(config.colors.gen_shares, ColorConfig::default().gen_shares);
    }
}
