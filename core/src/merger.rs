//! Indicator merger.
//!
//! Joins the birth-rate, population and GDP-per-capita tables with the
//! country metadata table, all keyed by the 3-letter code, and derives the
//! absolute births weight for each country.
//!
//! RULES:
//!   - Birth rate, population and metadata are required; GDP is optional
//!     and defaults to 0 when absent.
//!   - `weight` keeps the unrounded births; only the display `births`
//!     field is rounded.
//!   - Pure function of its inputs.

use crate::{
    indicator::{IndicatorTable, MetadataTable},
    types::CountryCode,
};
use serde::{Deserialize, Serialize};

/// One country after the join, with its derived births weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedCountryRecord {
    pub id:                   CountryCode,
    pub name:                 String,
    pub iso2:                 String,
    pub region:               String,
    pub income_level:         String,
    pub capital:              String,
    pub longitude:            f64,
    pub latitude:             f64,
    pub birth_rate_per_mille: f64,
    pub population:           f64,
    pub gdp_per_capita:       f64,
    /// Births rounded to the nearest integer, for display only.
    pub births:               f64,
    /// Unrounded births; the sampling weight.
    pub weight:               f64,
}

/// Annual births from a crude birth rate (per 1000) and a population.
pub fn births_from(birth_rate_per_mille: f64, population: f64) -> f64 {
    (birth_rate_per_mille * population) / 1000.0
}

/// Metadata-level exclusion: aggregates carry no code or a longer pseudo-code.
fn has_usable_iso2(iso2: &str) -> bool {
    !iso2.is_empty() && iso2.chars().count() <= 2
}

pub fn merge(
    birth_rates: &IndicatorTable,
    population:  &IndicatorTable,
    gdp:         &IndicatorTable,
    metadata:    &MetadataTable,
) -> Vec<MergedCountryRecord> {
    let mut skipped_missing = 0usize;
    let mut skipped_iso2 = 0usize;
    let mut skipped_zero = 0usize;

    let mut merged: Vec<MergedCountryRecord> = metadata
        .values()
        .filter_map(|meta| {
            let code = meta.country_code.as_str();
            let (Some(rate), Some(pop)) = (birth_rates.get(code), population.get(code)) else {
                skipped_missing += 1;
                return None;
            };
            if !has_usable_iso2(&meta.iso2_code) {
                skipped_iso2 += 1;
                return None;
            }

            let weight = births_from(rate, pop);
            if !(weight > 0.0 && pop > 0.0) {
                skipped_zero += 1;
                return None;
            }

            Some(MergedCountryRecord {
                id:                   meta.country_code.clone(),
                name:                 meta.display_name.clone(),
                iso2:                 meta.iso2_code.clone(),
                region:               meta.region.clone(),
                income_level:         meta.income_level.clone(),
                capital:              meta.capital.clone(),
                longitude:            meta.longitude,
                latitude:             meta.latitude,
                birth_rate_per_mille: rate,
                population:           pop,
                gdp_per_capita:       gdp.get(code).unwrap_or(0.0),
                births:               weight.round(),
                weight,
            })
        })
        .collect();

    merged.sort_by(|a, b| b.births.total_cmp(&a.births).then_with(|| a.id.cmp(&b.id)));

    log::debug!(
        "merge: {} records kept, {skipped_missing} missing indicators, \
         {skipped_iso2} without iso2, {skipped_zero} without births",
        merged.len()
    );
    merged
}
