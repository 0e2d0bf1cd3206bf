//! Result File Loader Module
//! Locates model result CSVs for a run and loads them using Polars.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Result file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Column '{column}' missing from {file}")]
    MissingColumn { file: String, column: String },
}

/// Sub-folder of a run directory a result file lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultFolder {
    Results,
    Summaries,
    Data,
}

impl ResultFolder {
    pub fn dir_name(self) -> &'static str {
        match self {
            ResultFolder::Results => "results",
            ResultFolder::Summaries => "result_summaries",
            ResultFolder::Data => "data",
        }
    }
}

/// Every model output the charts read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultFile {
    PowerCapacityCountry,
    NewCapacity,
    TotalCapacityAnnual,
    TotalTechnologyAnnualActivity,
    GenerationSharesCountry,
    GenerationSharesGlobal,
    PowerCostCountry,
    TotalCostCountry,
    PowerCostGlobal,
    TotalCostGlobal,
    TotalDiscountedCost,
    AnnualEmissions,
    AnnualEmissionIntensity,
    AnnualEmissionIntensityGlobal,
    Metrics,
    TotalAnnualMaxCapacityInvestment,
    SpecifiedAnnualDemand,
    AnnualEmissionLimit,
}

impl ResultFile {
    pub fn file_name(self) -> &'static str {
        match self {
            ResultFile::PowerCapacityCountry => "PowerCapacityCountry.csv",
            ResultFile::NewCapacity => "NewCapacity.csv",
            ResultFile::TotalCapacityAnnual => "TotalCapacityAnnual.csv",
            ResultFile::TotalTechnologyAnnualActivity => "TotalTechnologyAnnualActivity.csv",
            ResultFile::GenerationSharesCountry => "GenerationSharesCountry.csv",
            ResultFile::GenerationSharesGlobal => "GenerationSharesGlobal.csv",
            ResultFile::PowerCostCountry => "PowerCostCountry.csv",
            ResultFile::TotalCostCountry => "TotalCostCountry.csv",
            ResultFile::PowerCostGlobal => "PowerCostGlobal.csv",
            ResultFile::TotalCostGlobal => "TotalCostGlobal.csv",
            ResultFile::TotalDiscountedCost => "TotalDiscountedCost.csv",
            ResultFile::AnnualEmissions => "AnnualEmissions.csv",
            ResultFile::AnnualEmissionIntensity => "AnnualEmissionIntensity.csv",
            ResultFile::AnnualEmissionIntensityGlobal => "AnnualEmissionIntensityGlobal.csv",
            ResultFile::Metrics => "Metrics.csv",
            ResultFile::TotalAnnualMaxCapacityInvestment => {
                "TotalAnnualMaxCapacityInvestment.csv"
            }
            ResultFile::SpecifiedAnnualDemand => "SpecifiedAnnualDemand.csv",
            ResultFile::AnnualEmissionLimit => "AnnualEmissionLimit.csv",
        }
    }

    pub fn folder(self) -> ResultFolder {
        match self {
            ResultFile::NewCapacity
            | ResultFile::TotalCapacityAnnual
            | ResultFile::TotalTechnologyAnnualActivity
            | ResultFile::TotalDiscountedCost
            | ResultFile::AnnualEmissions => ResultFolder::Results,
            ResultFile::TotalAnnualMaxCapacityInvestment
            | ResultFile::SpecifiedAnnualDemand
            | ResultFile::AnnualEmissionLimit => ResultFolder::Data,
            _ => ResultFolder::Summaries,
        }
    }

    /// Columns the processors read from this file.
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            ResultFile::PowerCapacityCountry => &["TECH", "COUNTRY", "YEAR", "VALUE"],
            ResultFile::NewCapacity
            | ResultFile::TotalCapacityAnnual
            | ResultFile::TotalTechnologyAnnualActivity
            | ResultFile::TotalAnnualMaxCapacityInvestment => &["TECHNOLOGY", "YEAR", "VALUE"],
            ResultFile::GenerationSharesCountry => &["COUNTRY", "YEAR", "RENEWABLE", "FOSSIL"],
            ResultFile::GenerationSharesGlobal => &["YEAR", "RENEWABLE", "FOSSIL"],
            ResultFile::PowerCostCountry | ResultFile::TotalCostCountry => {
                &["COUNTRY", "YEAR", "VALUE"]
            }
            ResultFile::PowerCostGlobal
            | ResultFile::TotalCostGlobal
            | ResultFile::TotalDiscountedCost
            | ResultFile::AnnualEmissionIntensityGlobal => &["YEAR", "VALUE"],
            ResultFile::AnnualEmissions
            | ResultFile::AnnualEmissionIntensity
            | ResultFile::AnnualEmissionLimit => &["EMISSION", "YEAR", "VALUE"],
            ResultFile::Metrics => &["Metric", "Unit", "Value"],
            ResultFile::SpecifiedAnnualDemand => &["FUEL", "YEAR", "VALUE"],
        }
    }
}

/// Directory layout of a single model run.
#[derive(Debug, Clone)]
pub struct RunPaths {
    root: PathBuf,
}

impl RunPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn folder(&self, folder: ResultFolder) -> PathBuf {
        self.root.join(folder.dir_name())
    }

    pub fn file(&self, file: ResultFile) -> PathBuf {
        self.folder(file.folder()).join(file.file_name())
    }
}

/// Loads result files of one run with Polars.
#[derive(Debug, Clone)]
pub struct ResultsLoader {
    name: String,
    paths: RunPaths,
}

impl ResultsLoader {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            paths: RunPaths::new(root),
        }
    }

    /// Run name used in chart titles and logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn paths(&self) -> &RunPaths {
        &self.paths
    }

    /// Load a result file and check it carries the columns the charts read.
    pub fn read(&self, file: ResultFile) -> Result<DataFrame, LoaderError> {
        let path = self.paths.file(file);
        let df = Self::load_csv(&path)?;
        Self::require_columns(&df, file.file_name(), file.required_columns())?;
        tracing::debug!(
            run = %self.name,
            file = file.file_name(),
            rows = df.height(),
            "loaded result file"
        );
        Ok(df)
    }

    /// Load any CSV file using Polars.
    pub fn load_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        Ok(df)
    }

    pub fn require_columns(
        df: &DataFrame,
        file: &str,
        columns: &[&str],
    ) -> Result<(), LoaderError> {
        let present: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        match columns.iter().find(|c| !present.iter().any(|p| p == *c)) {
            Some(missing) => Err(LoaderError::MissingColumn {
                file: file.to_string(),
                column: missing.to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_run_file(root: &Path, file: ResultFile, body: &str) {
        let dir = root.join(file.folder().dir_name());
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file.file_name()), body).unwrap();
    }

    #[test]
    fn files_resolve_to_their_folders() {
        let paths = RunPaths::new("/runs/Base");
        assert_eq!(
            paths.file(ResultFile::AnnualEmissions),
            PathBuf::from("/runs/Base/results/AnnualEmissions.csv")
        );
        assert_eq!(
            paths.file(ResultFile::Metrics),
            PathBuf::from("/runs/Base/result_summaries/Metrics.csv")
        );
        assert_eq!(
            paths.file(ResultFile::TotalAnnualMaxCapacityInvestment),
            PathBuf::from("/runs/Base/data/TotalAnnualMaxCapacityInvestment.csv")
        );
    }

    #[test]
    fn reads_result_file() {
        let dir = tempfile::tempdir().unwrap();
        write_run_file(
            dir.path(),
            ResultFile::TotalCostGlobal,
            "YEAR,VALUE\n2023,10.5\n2024,11.0\n",
        );
        let loader = ResultsLoader::new("Base", dir.path());
        let df = loader.read(ResultFile::TotalCostGlobal).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(loader.name(), "Base");
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ResultsLoader::new("Base", dir.path());
        let err = loader.read(ResultFile::Metrics).unwrap_err();
        assert!(matches!(err, LoaderError::NotFound(_)));
        assert!(err.to_string().contains("Metrics.csv"));
    }

    #[test]
    fn missing_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        write_run_file(
            dir.path(),
            ResultFile::PowerCapacityCountry,
            "TECH,YEAR,VALUE\nCOA,2023,1.0\n",
        );
        let loader = ResultsLoader::new("Base", dir.path());
        match loader.read(ResultFile::PowerCapacityCountry) {
            Err(LoaderError::MissingColumn { file, column }) => {
                assert_eq!(file, "PowerCapacityCountry.csv");
                assert_eq!(column, "COUNTRY");
            }
            other => panic!("expected missing column, got {other:?}"),
        }
    }
}
