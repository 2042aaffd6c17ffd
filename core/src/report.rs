//! The output contract consumed by the presentation layer.
//!
//! Field names here are a stable external contract: `iso2`, `births`,
//! `probability`, `gdpPerCapita`, `birthRate` and the rest are emitted
//! verbatim. Never rename without a matching client change.

use crate::{
    distribution::{Distribution, DistributionEntry},
    error::LotteryResult,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryRow {
    pub id:             String,
    pub name:           String,
    pub iso2:           String,
    pub region:         String,
    pub income_level:   String,
    pub capital:        String,
    pub longitude:      f64,
    pub latitude:       f64,
    pub birth_rate:     f64,
    pub population:     f64,
    pub gdp_per_capita: f64,
    pub births:         f64,
    pub probability:    f64,
    pub eligible:       bool,
}

impl From<&DistributionEntry> for CountryRow {
    fn from(entry: &DistributionEntry) -> Self {
        let r = &entry.record;
        Self {
            id:             r.id.clone(),
            name:           r.name.clone(),
            iso2:           r.iso2.clone(),
            region:         r.region.clone(),
            income_level:   r.income_level.clone(),
            capital:        r.capital.clone(),
            longitude:      r.longitude,
            latitude:       r.latitude,
            birth_rate:     r.birth_rate_per_mille,
            population:     r.population,
            gdp_per_capita: r.gdp_per_capita,
            births:         r.births,
            probability:    entry.probability,
            eligible:       entry.eligible,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionReport {
    pub success:         bool,
    /// Countries open to the draw; excluded rows are listed but not counted.
    pub total_countries: usize,
    pub total_births:    f64,
    pub countries:       Vec<CountryRow>,
}

impl DistributionReport {
    pub fn from_distribution(distribution: &Distribution) -> Self {
        Self {
            success:         true,
            total_countries: distribution.eligible_count(),
            total_births:    distribution.total_weight().round(),
            countries:       distribution.entries().iter().map(CountryRow::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureReport {
    pub success: bool,
    pub error:   String,
}

/// Either shape of the contract; serializes without a wrapper tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataResponse {
    Success(DistributionReport),
    Failure(FailureReport),
}

impl DataResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(FailureReport { success: false, error: message.into() })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// One country in the contract shape, found by ISO3 or ISO2 code.
pub fn lookup_row(distribution: &Distribution, code: &str) -> LotteryResult<CountryRow> {
    distribution.lookup(code).map(CountryRow::from)
}

/// Map a pipeline result onto the contract. Errors keep their message.
pub fn respond(result: &LotteryResult<Distribution>) -> DataResponse {
    match result {
        Ok(distribution) => DataResponse::Success(DistributionReport::from_distribution(distribution)),
        Err(e) => {
            log::warn!("data request failed: {e}");
            DataResponse::failure(e.to_string())
        }
    }
}
