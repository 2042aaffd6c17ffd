//! Fetch → merge → build.
//!
//! Data flows one way: raw tables from the source, through the merger,
//! into the distribution builder. Every failure propagates unchanged.

use crate::{
    config::LotteryConfig,
    distribution::{build_distribution, Distribution},
    error::LotteryResult,
    merger::merge,
    source::DataSource,
};

pub fn build_from_source(source: &dyn DataSource, config: &LotteryConfig) -> LotteryResult<Distribution> {
    let selection = config.year_selection();
    let codes = &config.indicators;

    let birth_rates = source.fetch_indicator(&codes.birth_rate, selection)?;
    let population = source.fetch_indicator(&codes.population, selection)?;
    let gdp = source.fetch_indicator(&codes.gdp_per_capita, selection)?;
    let metadata = source.fetch_countries()?;

    log::debug!(
        "pipeline: fetched {} birth rates, {} populations, {} gdp values, {} countries",
        birth_rates.len(),
        population.len(),
        gdp.len(),
        metadata.len()
    );

    let merged = merge(&birth_rates, &population, &gdp, &metadata);
    build_distribution(merged)
}
