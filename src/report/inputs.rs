//! Typed series read from one run folder.

use super::ReportError;
use crate::data::{
    DataProcessor, Observation, RegionLevel, ResultFile, ResultsLoader, ShareRow, ShareTotals,
    TransmissionCapacity,
};

/// Installed power capacity per technology and country, GW.
pub fn capacity(loader: &ResultsLoader) -> Result<Vec<Observation>, ReportError> {
    let df = loader.read(ResultFile::PowerCapacityCountry)?;
    Ok(DataProcessor::capacity_observations(&df)?)
}

/// Power generation per technology and country, TWh.
pub fn generation(loader: &ResultsLoader) -> Result<Vec<Observation>, ReportError> {
    let df = loader.read(ResultFile::TotalTechnologyAnnualActivity)?;
    let obs = DataProcessor::technology_observations(&df, RegionLevel::Country)?;
    Ok(DataProcessor::convert_pj_to_twh(obs))
}

pub fn node_capacity(loader: &ResultsLoader) -> Result<Vec<Observation>, ReportError> {
    let df = loader.read(ResultFile::TotalCapacityAnnual)?;
    Ok(DataProcessor::technology_observations(&df, RegionLevel::Node)?)
}

pub fn node_generation(loader: &ResultsLoader) -> Result<Vec<Observation>, ReportError> {
    let df = loader.read(ResultFile::TotalTechnologyAnnualActivity)?;
    let obs = DataProcessor::technology_observations(&df, RegionLevel::Node)?;
    Ok(DataProcessor::convert_pj_to_twh(obs))
}

/// Annual CO2 emissions per country, Mt.
pub fn emissions(loader: &ResultsLoader) -> Result<Vec<Observation>, ReportError> {
    let df = loader.read(ResultFile::AnnualEmissions)?;
    Ok(DataProcessor::emission_observations(&df)?)
}

pub fn country_intensity(loader: &ResultsLoader) -> Result<Vec<Observation>, ReportError> {
    let df = loader.read(ResultFile::AnnualEmissionIntensity)?;
    Ok(DataProcessor::emission_observations(&df)?)
}

pub fn system_intensity(loader: &ResultsLoader) -> Result<Vec<Observation>, ReportError> {
    let df = loader.read(ResultFile::AnnualEmissionIntensityGlobal)?;
    Ok(DataProcessor::year_values(&df)?)
}

/// Total system costs, billion $ per year.
pub fn system_costs(loader: &ResultsLoader) -> Result<Vec<Observation>, ReportError> {
    let df = loader.read(ResultFile::TotalCostGlobal)?;
    let obs = DataProcessor::year_values(&df)?;
    Ok(DataProcessor::convert_million_to_billion(obs))
}

pub fn country_costs(loader: &ResultsLoader) -> Result<Vec<Observation>, ReportError> {
    let df = loader.read(ResultFile::TotalCostCountry)?;
    let obs = DataProcessor::country_year_values(&df)?;
    Ok(DataProcessor::convert_million_to_billion(obs))
}

/// Costs for a delta: system-wide, or summed over `countries` when given.
pub fn scoped_costs(
    loader: &ResultsLoader,
    countries: Option<&[String]>,
) -> Result<Vec<Observation>, ReportError> {
    match countries {
        Some(countries) => Ok(DataProcessor::filter_countries(&country_costs(loader)?, countries)),
        None => system_costs(loader),
    }
}

/// Normalised power cost, $/MWh.
pub fn system_power_cost(loader: &ResultsLoader) -> Result<Vec<Observation>, ReportError> {
    let df = loader.read(ResultFile::PowerCostGlobal)?;
    Ok(DataProcessor::year_values(&df)?)
}

pub fn country_power_cost(loader: &ResultsLoader) -> Result<Vec<Observation>, ReportError> {
    let df = loader.read(ResultFile::PowerCostCountry)?;
    Ok(DataProcessor::country_year_values(&df)?)
}

pub fn shares(loader: &ResultsLoader, country: Option<&str>) -> Result<Vec<ShareRow>, ReportError> {
    let file = match country {
        Some(_) => ResultFile::GenerationSharesCountry,
        None => ResultFile::GenerationSharesGlobal,
    };
    let df = loader.read(file)?;
    Ok(DataProcessor::generation_shares(&df, country)?)
}

pub fn headline_shares(loader: &ResultsLoader) -> Result<ShareTotals, ReportError> {
    let df = loader.read(ResultFile::Metrics)?;
    Ok(DataProcessor::headline_shares(&df)?)
}

pub fn transmission(
    loader: &ResultsLoader,
    techs: &[String],
) -> Result<TransmissionCapacity, ReportError> {
    let new_capacity = loader.read(ResultFile::NewCapacity)?;
    let max_investment = loader.read(ResultFile::TotalAnnualMaxCapacityInvestment)?;
    Ok(DataProcessor::transmission_capacity(
        &new_capacity,
        &max_investment,
        techs,
    )?)
}

/// Electricity demand per country, TWh.
pub fn demand(loader: &ResultsLoader) -> Result<Vec<Observation>, ReportError> {
    let df = loader.read(ResultFile::SpecifiedAnnualDemand)?;
    let obs = DataProcessor::demand_observations(&df)?;
    Ok(DataProcessor::convert_pj_to_twh(obs))
}

pub fn emission_limits(loader: &ResultsLoader) -> Result<Vec<Observation>, ReportError> {
    let df = loader.read(ResultFile::AnnualEmissionLimit)?;
    Ok(DataProcessor::emission_limits(&df)?)
}
